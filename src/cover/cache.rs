//! Album image disk cache.
//!
//! Images are stored under a name derived from their server URI, so the
//! path of an image is known before it has been downloaded. The model hands
//! that path to the UI, which shows a placeholder until the file exists.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Extensions kept as-is when deriving a cache file name
const KNOWN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Album image disk cache.
#[derive(Debug, Clone)]
pub struct CoverCache {
    cache_dir: PathBuf,
}

impl CoverCache {
    /// Create a new cache in the specified directory.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            tracing::warn!("Could not create image cache {:?}: {}", cache_dir, e);
        }
        Self { cache_dir }
    }

    /// Create a cache in the default location (user cache directory).
    pub fn default_location() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("argos")
            .join("images");
        Self::new(cache_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Local path for an image uri, whether or not it is cached yet.
    pub fn image_path(&self, image_uri: &str) -> PathBuf {
        let digest = Sha256::digest(image_uri.as_bytes());
        self.cache_dir
            .join(format!("{:x}.{}", digest, extension_of(image_uri)))
    }

    /// Check if an image is cached.
    pub fn contains(&self, image_uri: &str) -> bool {
        self.image_path(image_uri).is_file()
    }

    /// Get cached image bytes.
    pub fn get(&self, image_uri: &str) -> Option<Vec<u8>> {
        fs::read(self.image_path(image_uri)).ok()
    }

    /// Store image bytes in the cache.
    pub fn put(&self, image_uri: &str, data: &[u8]) -> Result<PathBuf, std::io::Error> {
        let path = self.image_path(image_uri);
        fs::write(&path, data)?;
        Ok(path)
    }

    /// Clear all cached images.
    pub fn clear(&self) -> Result<(), std::io::Error> {
        if self.cache_dir.exists() {
            for entry in fs::read_dir(&self.cache_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    fs::remove_file(entry.path())?;
                }
            }
        }
        Ok(())
    }

    /// Get the total size of the cache in bytes.
    pub fn size_bytes(&self) -> u64 {
        fs::read_dir(&self.cache_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0)
    }
}

/// Lowercase extension of the uri's last path segment, or "jpg".
fn extension_of(uri: &str) -> String {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| KNOWN_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| "jpg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_put_and_get() {
        let temp = TempDir::new().unwrap();
        let cache = CoverCache::new(temp.path());

        let path = cache.put("/local/abc.jpeg", b"fake jpeg data").unwrap();
        assert_eq!(path, cache.image_path("/local/abc.jpeg"));
        assert_eq!(cache.get("/local/abc.jpeg").unwrap(), b"fake jpeg data");
    }

    #[test]
    fn test_cache_miss() {
        let temp = TempDir::new().unwrap();
        let cache = CoverCache::new(temp.path());
        assert!(cache.get("/local/nothing.png").is_none());
        assert!(!cache.contains("/local/nothing.png"));
    }

    #[test]
    fn test_image_path_is_stable_and_distinct() {
        let temp = TempDir::new().unwrap();
        let cache = CoverCache::new(temp.path());

        let a = cache.image_path("http://host/a.png");
        assert_eq!(a, cache.image_path("http://host/a.png"));
        assert_ne!(a, cache.image_path("http://host/b.png"));
        assert!(a.starts_with(temp.path()));
        assert_eq!(a.extension().unwrap(), "png");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/local/0a1b.JPG"), "jpg");
        assert_eq!(extension_of("https://i.scdn.co/image/ab67616d0000b273"), "jpg");
        assert_eq!(extension_of("http://host/cover.webp?size=300"), "webp");
        assert_eq!(extension_of("http://host.example/dir/cover"), "jpg");
        assert_eq!(extension_of("file:///music/cover.exe"), "jpg");
    }

    #[test]
    fn test_cache_clear_and_size() {
        let temp = TempDir::new().unwrap();
        let cache = CoverCache::new(temp.path());

        assert_eq!(cache.size_bytes(), 0);
        cache.put("r1.png", &[0; 1000]).unwrap();
        cache.put("r2.png", &[0; 24]).unwrap();
        assert_eq!(cache.size_bytes(), 1024);

        cache.clear().unwrap();
        assert!(!cache.contains("r1.png"));
        assert_eq!(cache.size_bytes(), 0);
    }
}
