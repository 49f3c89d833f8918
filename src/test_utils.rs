//! Test utilities and fixtures for argos tests.
//!
//! Mock factories for library records, a scripted [`LibraryApi`] and a
//! helper for encoding small test images.
//!
//! # Example
//!
//! ```ignore
//! use argos::test_utils::{lookup_result, mock_track};
//!
//! let lookup = lookup_result("local:album:x", vec![mock_track("a", Some(1), Some(1), Some(1000))]);
//! ```

use std::collections::HashMap;
use std::io::Cursor;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;

use crate::controller::{ImageDownloader, LibraryApi};
use crate::error::{Error, Result};
use crate::model::{AlbumRef, ArtistRef, ImageRef, TrackRecord};

/// Creates a mock AlbumRef with sensible defaults.
pub fn mock_album_ref() -> AlbumRef {
    AlbumRef {
        uri: Some("local:album:test".to_string()),
        name: Some("Test Album".to_string()),
        num_tracks: Some(10),
        num_discs: Some(1),
        date: Some("2004".to_string()),
    }
}

/// Creates a mock TrackRecord by disc, track number and length.
///
/// The track has one artist ("Test Artist") and no album reference.
/// Customize with struct update syntax:
///
/// ```ignore
/// let track = TrackRecord {
///     album: Some(mock_album_ref()),
///     ..mock_track("a", Some(1), Some(1), Some(1000))
/// };
/// ```
pub fn mock_track(
    uri: &str,
    disc_no: Option<u32>,
    track_no: Option<u32>,
    length: Option<u64>,
) -> TrackRecord {
    TrackRecord {
        uri: uri.to_string(),
        name: format!("Track {}", uri),
        track_no,
        disc_no,
        length,
        album: None,
        artists: vec![ArtistRef {
            uri: Some("local:artist:test".to_string()),
            name: Some("Test Artist".to_string()),
        }],
    }
}

/// Wraps tracks into a single-album lookup result.
pub fn lookup_result(album_uri: &str, tracks: Vec<TrackRecord>) -> HashMap<String, Vec<TrackRecord>> {
    HashMap::from([(album_uri.to_string(), tracks)])
}

/// Encodes a solid-color RGB image of the given size in `format`.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)
        .expect("Failed to encode test image");
    bytes
}

/// Scripted library that answers from fixed data and records lookups.
#[derive(Default)]
pub struct MockLibrary {
    pub albums: Vec<AlbumRef>,
    pub images: HashMap<String, Vec<ImageRef>>,
    pub tracks: HashMap<String, Vec<TrackRecord>>,
    /// Image bytes served by `download`, keyed by image uri
    pub image_data: HashMap<String, Vec<u8>>,
    /// Uris passed to `lookup_library`, in call order
    pub lookups: Mutex<Vec<String>>,
    /// Uris passed to `download`, in call order
    pub downloads: Mutex<Vec<String>>,
}

#[async_trait]
impl LibraryApi for MockLibrary {
    async fn browse_albums(&self) -> Result<Vec<AlbumRef>> {
        Ok(self.albums.clone())
    }

    async fn get_images(&self, uris: &[String]) -> Result<HashMap<String, Vec<ImageRef>>> {
        Ok(uris
            .iter()
            .filter_map(|uri| self.images.get(uri).map(|imgs| (uri.clone(), imgs.clone())))
            .collect())
    }

    async fn lookup_library(&self, uris: &[String]) -> Result<HashMap<String, Vec<TrackRecord>>> {
        self.lookups.lock().extend(uris.iter().cloned());
        Ok(uris
            .iter()
            .filter_map(|uri| self.tracks.get(uri).map(|t| (uri.clone(), t.clone())))
            .collect())
    }
}

#[async_trait]
impl ImageDownloader for MockLibrary {
    async fn download(&self, image_uri: &str) -> Result<Vec<u8>> {
        self.downloads.lock().push(image_uri.to_string());
        self.image_data
            .get(image_uri)
            .cloned()
            .ok_or_else(|| Error::library(format!("no image at {}", image_uri)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_track_defaults() {
        let track = mock_track("a", Some(1), Some(3), Some(1000));
        assert_eq!(track.uri, "a");
        assert_eq!(track.name, "Track a");
        assert_eq!(track.disc_no, Some(1));
        assert_eq!(track.track_no, Some(3));
        assert!(track.album.is_none());
        assert_eq!(track.artists.len(), 1);
    }

    #[test]
    fn test_encoded_image_decodes() {
        let bytes = encoded_image(8, 4, ImageFormat::Png);
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (8, 4));
    }

    #[tokio::test]
    async fn test_mock_library_records_lookups() {
        let lib = MockLibrary {
            tracks: lookup_result("local:album:x", vec![mock_track("a", None, None, None)]),
            ..Default::default()
        };
        let result = lib
            .lookup_library(&["local:album:x".to_string(), "local:album:y".to_string()])
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(lib.lookups.lock().len(), 2);
    }
}
