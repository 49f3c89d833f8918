//! Albums controller.
//!
//! Reacts to UI messages by querying the library and pushing the results
//! into the model:
//! 1. `BrowseAlbums`: album list with image uris and cache paths
//! 2. `FetchAlbumImages`: download missing album images into the cache
//! 3. `CompleteAlbumDescription`: aggregate an album's tracks
//!
//! Library access goes through [`LibraryApi`] and [`ImageDownloader`] so
//! tests (and the CLI) can substitute their own backends.

mod snapshot;

pub use snapshot::{LibrarySnapshot, SnapshotLibrary};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use crossbeam_channel::Sender;
use futures::StreamExt;

use crate::album::{self, AlbumError};
use crate::cover::CoverCache;
use crate::error::{Result, ResultExt};
use crate::model::{Album, AlbumRef, ImageRef, TrackRecord};
use crate::state::{AppState, Property, StateHandle};

/// Images downloaded at once
pub const DEFAULT_MAX_DOWNLOADS: usize = 4;

/// Messages sent from the UI to the controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    BrowseAlbums,
    FetchAlbumImages,
    CompleteAlbumDescription { album_uri: String },
    TogglePlaybackState,
    PlayNextTrack,
    PlayPrevTrack,
}

/// Mopidy `core.library` calls used by the albums controller.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// Albums of the library root (`library.browse`).
    async fn browse_albums(&self) -> Result<Vec<AlbumRef>>;

    /// Images per uri (`library.get_images`).
    async fn get_images(&self, uris: &[String]) -> Result<HashMap<String, Vec<ImageRef>>>;

    /// Tracks per uri (`library.lookup`).
    async fn lookup_library(&self, uris: &[String]) -> Result<HashMap<String, Vec<TrackRecord>>>;
}

/// Fetches image bytes by uri.
#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, image_uri: &str) -> Result<Vec<u8>>;
}

/// Controller for everything album related.
pub struct AlbumsController {
    library: Arc<dyn LibraryApi>,
    downloader: Arc<dyn ImageDownloader>,
    state: StateHandle,
    cache: CoverCache,
    max_downloads: usize,
}

impl AlbumsController {
    pub fn new(
        library: Arc<dyn LibraryApi>,
        downloader: Arc<dyn ImageDownloader>,
        state: StateHandle,
        cache: CoverCache,
    ) -> Self {
        Self {
            library,
            downloader,
            state,
            cache,
            max_downloads: DEFAULT_MAX_DOWNLOADS,
        }
    }

    /// Limit concurrent image downloads (minimum 1).
    pub fn with_max_downloads(mut self, max: usize) -> Self {
        self.max_downloads = max.max(1);
        self
    }

    /// Handle a message. Returns false if it is not for this controller.
    pub async fn process_message(&self, message: &Message) -> Result<bool> {
        match message {
            Message::BrowseAlbums => {
                self.browse_albums().await.with_context("browsing albums")?;
                Ok(true)
            }
            Message::FetchAlbumImages => {
                self.fetch_album_images().await;
                Ok(true)
            }
            Message::CompleteAlbumDescription { album_uri } => {
                if !album_uri.is_empty() {
                    self.describe_album(album_uri)
                        .await
                        .with_context(format!("describing album {}", album_uri))?;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn browse_albums(&self) -> Result<()> {
        tracing::debug!("Starting to browse albums...");
        let albums = self.library.browse_albums().await?;
        if albums.is_empty() {
            return Ok(());
        }

        let album_uris: Vec<String> = albums.iter().filter_map(|a| a.uri.clone()).collect();
        let images = self.library.get_images(&album_uris).await?;
        if images.is_empty() {
            return Ok(());
        }

        let albums = albums
            .into_iter()
            .map(|a| {
                let uri = a.uri.unwrap_or_default();
                let mut album = Album {
                    name: a.name.unwrap_or_default(),
                    ..Default::default()
                };
                if let Some(image) = images.get(&uri).and_then(|imgs| imgs.first()) {
                    album.image_path = self.cache.image_path(&image.uri).display().to_string();
                    album.image_uri = image.uri.clone();
                }
                album.uri = uri;
                album
            })
            .collect();

        self.state.update_albums(albums);
        Ok(())
    }

    async fn fetch_album_images(&self) {
        tracing::debug!("Starting album image download...");
        let mut pending: Vec<String> = self
            .state
            .albums()
            .into_iter()
            .map(|a| a.image_uri)
            .filter(|uri| !uri.is_empty() && !self.cache.contains(uri))
            .collect();
        pending.sort();
        pending.dedup();

        let total = pending.len();
        let stored = futures::stream::iter(pending)
            .map(|uri| async move {
                let result = self.downloader.download(&uri).await;
                (uri, result)
            })
            .buffer_unordered(self.max_downloads)
            .filter_map(|(uri, result)| async move {
                let stored = result.and_then(|data| {
                    self.cache
                        .put(&uri, &data)
                        .with_context(format!("caching image {}", uri))
                });
                match stored {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Failed to fetch album image {}: {}", uri, e);
                        None
                    }
                }
            })
            .count()
            .await;

        tracing::info!("Downloaded {}/{} album images", stored, total);
        self.state.set(Property::AlbumsImagesLoaded, true);
    }

    async fn describe_album(&self, uri: &str) -> Result<()> {
        tracing::debug!("Completing description of album with uri {:?}", uri);
        let tracks = self.library.lookup_library(&[uri.to_string()]).await?;

        let summary = match album::aggregate(&tracks, uri) {
            Ok(summary) => summary,
            Err(AlbumError::NotFound(_)) => {
                tracing::debug!("No tracks found for album {:?}", uri);
                return Ok(());
            }
        };
        if !summary.has_album_info() {
            tracing::debug!("Tracks of {:?} carry no album info, skipping", uri);
            return Ok(());
        }

        self.state.complete_album_description(summary);
        Ok(())
    }
}

/// Queue an image fetch whenever a fresh album list is loaded.
pub fn connect_album_images(state: &mut AppState, messages: Sender<Message>) {
    state.subscribe(Property::AlbumsLoaded, move |snapshot| {
        if snapshot.flag(Property::AlbumsLoaded) && messages.send(Message::FetchAlbumImages).is_err() {
            tracing::debug!("Message queue closed, not fetching album images");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TotalLength;
    use crate::test_utils::{MockLibrary, lookup_result, mock_album_ref, mock_track};
    use tempfile::TempDir;

    fn album_ref(name: &str, uri: &str) -> AlbumRef {
        AlbumRef {
            uri: Some(uri.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn image(uri: &str) -> ImageRef {
        ImageRef {
            uri: uri.to_string(),
            width: None,
            height: None,
        }
    }

    fn controller(lib: MockLibrary, temp: &TempDir) -> (AlbumsController, AppState, Arc<MockLibrary>) {
        let lib = Arc::new(lib);
        let (state, handle) = AppState::new();
        let controller = AlbumsController::new(
            lib.clone(),
            lib.clone(),
            handle,
            CoverCache::new(temp.path()),
        );
        (controller, state, lib)
    }

    #[tokio::test]
    async fn test_browse_attaches_images() {
        let temp = TempDir::new().unwrap();
        let lib = MockLibrary {
            albums: vec![album_ref("Blue", "local:album:blue"), album_ref("Red", "local:album:red")],
            images: HashMap::from([(
                "local:album:blue".to_string(),
                vec![image("/images/blue.png"), image("/images/blue-2.png")],
            )]),
            ..Default::default()
        };
        let (controller, mut state, _) = controller(lib, &temp);

        assert!(controller.process_message(&Message::BrowseAlbums).await.unwrap());
        state.dispatch_pending();

        let snap = state.snapshot();
        let albums = snap.albums();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].image_uri, "/images/blue.png");
        assert!(albums[0].image_path.ends_with(".png"));
        assert!(albums[1].image_uri.is_empty());
        assert!(albums[1].image_path.is_empty());
        assert!(snap.flag(Property::AlbumsLoaded));
    }

    #[tokio::test]
    async fn test_browse_without_images_skips_update() {
        let temp = TempDir::new().unwrap();
        let lib = MockLibrary {
            albums: vec![album_ref("Blue", "local:album:blue")],
            ..Default::default()
        };
        let (controller, mut state, _) = controller(lib, &temp);

        controller.process_message(&Message::BrowseAlbums).await.unwrap();
        assert_eq!(state.dispatch_pending(), 0);
    }

    #[tokio::test]
    async fn test_fetch_images_fills_cache() {
        let temp = TempDir::new().unwrap();
        let lib = MockLibrary {
            albums: vec![
                album_ref("Blue", "local:album:blue"),
                album_ref("Red", "local:album:red"),
                album_ref("Green", "local:album:green"),
            ],
            images: HashMap::from([
                ("local:album:blue".to_string(), vec![image("/images/blue.png")]),
                ("local:album:red".to_string(), vec![image("/images/red.png")]),
                ("local:album:green".to_string(), vec![image("/images/missing.png")]),
            ]),
            image_data: HashMap::from([
                ("/images/blue.png".to_string(), b"blue".to_vec()),
                ("/images/red.png".to_string(), b"red".to_vec()),
            ]),
            ..Default::default()
        };
        let (controller, mut state, lib) = controller(lib, &temp);
        let (tx, rx) = crossbeam_channel::unbounded();
        connect_album_images(&mut state, tx);

        controller.process_message(&Message::BrowseAlbums).await.unwrap();
        state.dispatch_pending();
        assert_eq!(rx.try_recv(), Ok(Message::FetchAlbumImages));

        controller.process_message(&Message::FetchAlbumImages).await.unwrap();
        state.dispatch_pending();

        let cache = CoverCache::new(temp.path());
        assert_eq!(cache.get("/images/blue.png").unwrap(), b"blue");
        assert_eq!(cache.get("/images/red.png").unwrap(), b"red");
        assert!(!cache.contains("/images/missing.png"));
        assert_eq!(lib.downloads.lock().len(), 3);
        assert!(state.snapshot().flag(Property::AlbumsImagesLoaded));

        // Cached images are not downloaded again
        controller.process_message(&Message::FetchAlbumImages).await.unwrap();
        assert_eq!(lib.downloads.lock().len(), 4);
    }

    #[tokio::test]
    async fn test_describe_album() {
        let temp = TempDir::new().unwrap();
        let tracks = vec![
            TrackRecord {
                album: Some(mock_album_ref()),
                ..mock_track("a", Some(1), Some(2), Some(200_000))
            },
            mock_track("b", Some(1), Some(1), Some(180_000)),
        ];
        let lib = MockLibrary {
            tracks: lookup_result("local:album:test", tracks),
            ..Default::default()
        };
        let (controller, mut state, _) = controller(lib, &temp);

        let message = Message::CompleteAlbumDescription {
            album_uri: "local:album:test".to_string(),
        };
        assert!(controller.process_message(&message).await.unwrap());
        state.dispatch_pending();

        let snap = state.snapshot();
        let summary = snap.album_description("local:album:test").unwrap();
        assert_eq!(summary.total_length, TotalLength::Known(380_000));
        assert_eq!(summary.tracks[0].uri, "b");
        assert_eq!(summary.artist_name.as_deref(), Some("Test Artist"));
    }

    #[tokio::test]
    async fn test_describe_unknown_album_leaves_model_untouched() {
        let temp = TempDir::new().unwrap();
        let (controller, mut state, lib) = controller(MockLibrary::default(), &temp);

        let message = Message::CompleteAlbumDescription {
            album_uri: "local:album:nope".to_string(),
        };
        assert!(controller.process_message(&message).await.unwrap());
        assert_eq!(state.dispatch_pending(), 0);
        assert_eq!(*lib.lookups.lock(), vec!["local:album:nope".to_string()]);
    }

    #[tokio::test]
    async fn test_describe_without_album_info_is_skipped() {
        let temp = TempDir::new().unwrap();
        let lib = MockLibrary {
            tracks: lookup_result("local:album:bare", vec![mock_track("a", Some(1), Some(1), None)]),
            ..Default::default()
        };
        let (controller, mut state, _) = controller(lib, &temp);

        let message = Message::CompleteAlbumDescription {
            album_uri: "local:album:bare".to_string(),
        };
        controller.process_message(&message).await.unwrap();
        assert_eq!(state.dispatch_pending(), 0);
    }

    #[tokio::test]
    async fn test_describe_album_ref_with_only_uri() {
        let temp = TempDir::new().unwrap();
        let track = TrackRecord {
            album: Some(AlbumRef {
                uri: Some("local:album:u".to_string()),
                ..Default::default()
            }),
            ..mock_track("a", Some(1), Some(1), Some(1000))
        };
        let lib = MockLibrary {
            tracks: lookup_result("local:album:u", vec![track]),
            ..Default::default()
        };
        let (controller, mut state, _) = controller(lib, &temp);

        let message = Message::CompleteAlbumDescription {
            album_uri: "local:album:u".to_string(),
        };
        controller.process_message(&message).await.unwrap();
        assert_eq!(state.dispatch_pending(), 1);

        let snap = state.snapshot();
        let summary = snap.album_description("local:album:u").unwrap();
        assert_eq!(summary.album_uri.as_deref(), Some("local:album:u"));
        assert_eq!(summary.name, None);
        assert_eq!(summary.total_length, TotalLength::Known(1000));
    }

    #[tokio::test]
    async fn test_describe_empty_uri_does_nothing() {
        let temp = TempDir::new().unwrap();
        let (controller, _state, lib) = controller(MockLibrary::default(), &temp);

        let message = Message::CompleteAlbumDescription {
            album_uri: String::new(),
        };
        assert!(controller.process_message(&message).await.unwrap());
        assert!(lib.lookups.lock().is_empty());
    }

    #[tokio::test]
    async fn test_other_messages_are_not_handled() {
        let temp = TempDir::new().unwrap();
        let (controller, _state, _) = controller(MockLibrary::default(), &temp);
        assert!(!controller.process_message(&Message::PlayNextTrack).await.unwrap());
    }
}
