//! Core data models for the Mopidy library.
//!
//! Two families of types live here:
//! - Wire records ([`TrackRecord`], [`AlbumRef`], [`ArtistRef`], [`ImageRef`])
//!   as they come back from Mopidy's `core.library` methods
//! - Derived values ([`AlbumSummary`], [`TrackDescriptor`], [`Album`]) that the
//!   model exposes to the UI
//!
//! All of them are transient. They are rebuilt from scratch on every refresh.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Album reference attached to a track or returned by album browsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumRef {
    pub uri: Option<String>,
    pub name: Option<String>,
    /// Declared track count, independent of how many tracks were returned
    pub num_tracks: Option<u32>,
    pub num_discs: Option<u32>,
    /// Opaque release date ("YYYY" or "YYYY-MM-DD")
    pub date: Option<String>,
}

/// Artist reference attached to a track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistRef {
    pub uri: Option<String>,
    pub name: Option<String>,
}

/// One entry of a `library.get_images` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub uri: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Raw per-track metadata from a library lookup, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub track_no: Option<u32>,
    #[serde(default)]
    pub disc_no: Option<u32>,
    /// Length in milliseconds
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// Normalized track, ready for display in an album view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackDescriptor {
    pub uri: String,
    pub name: String,
    pub length_ms: Option<u64>,
    pub disc_no: u32,
    pub track_no: u32,
}

impl TrackDescriptor {
    /// Sort key: disc first, then position on the disc.
    pub fn position(&self) -> (u32, u32) {
        (self.disc_no, self.track_no)
    }
}

/// Total playback length of an album.
///
/// `Unknown` is not zero: it means at least one track did not report a
/// length, so no meaningful total exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalLength {
    Known(u64),
    Unknown,
}

impl fmt::Display for TotalLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(ms) => f.write_str(&format_length(*ms)),
            Self::Unknown => f.write_str("unknown duration"),
        }
    }
}

/// Complete description of one album, derived from its tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumSummary {
    pub uri: String,
    /// Uri reported by the tracks' album reference
    pub album_uri: Option<String>,
    pub name: Option<String>,
    pub artist_name: Option<String>,
    pub num_tracks: Option<u32>,
    pub num_discs: Option<u32>,
    pub date: Option<String>,
    pub total_length: TotalLength,
    pub tracks: Vec<TrackDescriptor>,
}

impl AlbumSummary {
    /// Whether any track carried album metadata.
    ///
    /// When it returns false, no track had a non-empty album reference and
    /// the description should not be shown.
    pub fn has_album_info(&self) -> bool {
        self.album_uri.is_some()
            || self.name.is_some()
            || self.num_tracks.is_some()
            || self.num_discs.is_some()
            || self.date.is_some()
    }
}

/// Album entry in the browse list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub uri: String,
    /// Empty when the server reported no image
    pub image_uri: String,
    /// Where the image is (or will be) cached locally
    pub image_path: String,
}

/// Playback state reported by Mopidy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Unknown,
    Playing,
    Paused,
    Stopped,
}

impl PlaybackState {
    /// Parse Mopidy's `playback.get_state` string.
    pub fn from_mopidy(value: &str) -> Self {
        match value {
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            "stopped" => Self::Stopped,
            other => {
                tracing::error!("Unexpected playback state {:?}", other);
                Self::Unknown
            }
        }
    }

    /// Integer code used when the state is stored as a model property.
    pub fn code(&self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Stopped => 3,
        }
    }
}

/// Format a length in milliseconds as M:SS or H:MM:SS.
pub fn format_length(ms: u64) -> String {
    let secs = ms / 1000;
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}
