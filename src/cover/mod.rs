//! Album cover sizing, resampling and caching.
//!
//! - [`fit`]: aspect-ratio-preserving target size for an icon box
//! - [`resample`]: pixel resampling via the `image` crate, with a
//!   placeholder fallback for covers that fail to decode
//! - [`cache`]: on-disk cache keyed by image uri
//!
//! Sizing is pure and can be called from any thread. Decoding is the
//! expensive part, so batches go through [`load_thumbnails`], which fans out
//! over the rayon pool.

pub mod cache;
pub mod fit;
pub mod resample;

pub use cache::CoverCache;
pub use fit::{FitError, compute_target_size};
pub use resample::{DecodeError, Thumbnail, fit_image, load_thumbnail, load_thumbnails, resample};
