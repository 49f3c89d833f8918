//! Library backend that answers from a JSON dump.
//!
//! The snapshot holds the results of the three library calls the albums
//! controller makes:
//!
//! ```json
//! {
//!   "albums": [{"uri": "local:album:1", "name": "Blue"}],
//!   "images": {"local:album:1": [{"uri": "file:///covers/blue.jpg"}]},
//!   "tracks": {"local:album:1": [{"uri": "local:track:1", "name": "Intro"}]}
//! }
//! ```
//!
//! Images can only be "downloaded" from `file://` uris. Relative paths are
//! resolved against the snapshot's directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::{ImageDownloader, LibraryApi};
use crate::error::{Error, Result, ResultExt};
use crate::model::{AlbumRef, ImageRef, TrackRecord};

/// Deserialized snapshot contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibrarySnapshot {
    pub albums: Vec<AlbumRef>,
    pub images: HashMap<String, Vec<ImageRef>>,
    pub tracks: HashMap<String, Vec<TrackRecord>>,
}

/// [`LibraryApi`] over a [`LibrarySnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotLibrary {
    snapshot: LibrarySnapshot,
    base_dir: PathBuf,
}

impl SnapshotLibrary {
    /// Load a snapshot file.
    pub fn open(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(format!("reading snapshot {}", path.display()))?;
        let snapshot: LibrarySnapshot = serde_json::from_str(&contents)
            .with_context(format!("parsing snapshot {}", path.display()))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        tracing::info!("Loaded library snapshot from {:?}", path);
        Ok(Self { snapshot, base_dir })
    }

    pub fn new(snapshot: LibrarySnapshot, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot,
            base_dir: base_dir.into(),
        }
    }

    pub fn snapshot(&self) -> &LibrarySnapshot {
        &self.snapshot
    }

    fn local_path(&self, image_uri: &str) -> Option<PathBuf> {
        let path = Path::new(image_uri.strip_prefix("file://")?);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        })
    }
}

fn select<T: Clone>(map: &HashMap<String, Vec<T>>, uris: &[String]) -> HashMap<String, Vec<T>> {
    uris.iter()
        .filter_map(|uri| map.get(uri).map(|v| (uri.clone(), v.clone())))
        .collect()
}

#[async_trait]
impl LibraryApi for SnapshotLibrary {
    async fn browse_albums(&self) -> Result<Vec<AlbumRef>> {
        Ok(self.snapshot.albums.clone())
    }

    async fn get_images(&self, uris: &[String]) -> Result<HashMap<String, Vec<ImageRef>>> {
        Ok(select(&self.snapshot.images, uris))
    }

    async fn lookup_library(&self, uris: &[String]) -> Result<HashMap<String, Vec<TrackRecord>>> {
        Ok(select(&self.snapshot.tracks, uris))
    }
}

#[async_trait]
impl ImageDownloader for SnapshotLibrary {
    async fn download(&self, image_uri: &str) -> Result<Vec<u8>> {
        let path = self
            .local_path(image_uri)
            .ok_or_else(|| Error::library(format!("unsupported image uri {}", image_uri)))?;
        tokio::fs::read(&path)
            .await
            .with_context(format!("reading image {}", path.display()))
    }
}
