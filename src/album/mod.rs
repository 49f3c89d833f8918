//! Album description aggregation.
//!
//! Turns the raw track records of a library lookup into an [`AlbumSummary`]:
//! album metadata taken from the first track that has any, the tracks in
//! disc/track order, and the total playback length.
//!
//! Everything here is pure. Fetching the records is the caller's job.

use std::collections::HashMap;

use crate::model::{AlbumSummary, TotalLength, TrackDescriptor, TrackRecord};

/// Position used for tracks that do not report a disc or track number.
///
/// Such tracks sort before every numbered track on the same disc (or before
/// every numbered disc).
pub const MISSING_POSITION: u32 = 0;

/// Errors from album aggregation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlbumError {
    /// The album was not in the lookup result, or had no tracks
    #[error("Album not found: {0}")]
    NotFound(String),
}

/// Running total of track lengths.
///
/// Once a track without a length is seen the total latches to unknown;
/// later lengths are still visited but ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LengthTotal {
    sum: u64,
    unknown: bool,
}

impl LengthTotal {
    const EMPTY: Self = Self {
        sum: 0,
        unknown: false,
    };

    fn add(self, length: Option<u64>) -> Self {
        match (self.unknown, length) {
            (true, _) => self,
            (false, Some(ms)) => Self {
                sum: self.sum.saturating_add(ms),
                unknown: false,
            },
            (false, None) => Self {
                sum: self.sum,
                unknown: true,
            },
        }
    }

    fn finish(self) -> TotalLength {
        if self.unknown {
            TotalLength::Unknown
        } else {
            TotalLength::Known(self.sum)
        }
    }
}

/// Sum track lengths in the order given.
pub fn total_length(tracks: &[TrackRecord]) -> TotalLength {
    tracks
        .iter()
        .fold(LengthTotal::EMPTY, |acc, t| acc.add(t.length))
        .finish()
}

/// Normalize records and sort them by `(disc_no, track_no)`.
///
/// The sort is stable, so tracks at the same position keep their input order.
pub fn sorted_tracks(tracks: &[TrackRecord]) -> Vec<TrackDescriptor> {
    let mut descriptors: Vec<TrackDescriptor> = tracks.iter().map(describe_track).collect();
    descriptors.sort_by_key(TrackDescriptor::position);
    descriptors
}

fn describe_track(track: &TrackRecord) -> TrackDescriptor {
    TrackDescriptor {
        uri: track.uri.clone(),
        name: track.name.clone(),
        length_ms: track.length,
        disc_no: track.disc_no.unwrap_or(MISSING_POSITION),
        track_no: track.track_no.unwrap_or(MISSING_POSITION),
    }
}

/// Build the description of `target_uri` from a lookup result.
///
/// `tracks_by_album_uri` is the shape Mopidy's `library.lookup(uris=[...])`
/// returns: album uri to the tracks on that album.
pub fn aggregate(
    tracks_by_album_uri: &HashMap<String, Vec<TrackRecord>>,
    target_uri: &str,
) -> Result<AlbumSummary, AlbumError> {
    let tracks = tracks_by_album_uri
        .get(target_uri)
        .filter(|tracks| !tracks.is_empty())
        .ok_or_else(|| AlbumError::NotFound(target_uri.to_string()))?;

    let album = tracks.iter().find_map(|t| t.album.as_ref());

    let artist_name = tracks
        .first()
        .and_then(|t| t.artists.first())
        .and_then(|a| a.name.clone());

    let total_length = total_length(tracks);
    let tracks = sorted_tracks(tracks);

    tracing::debug!(
        album = target_uri,
        tracks = tracks.len(),
        length = %total_length,
        "Aggregated album description"
    );

    Ok(AlbumSummary {
        uri: target_uri.to_string(),
        album_uri: album.and_then(|a| a.uri.clone()),
        name: album.and_then(|a| a.name.clone()),
        artist_name,
        num_tracks: album.and_then(|a| a.num_tracks),
        num_discs: album.and_then(|a| a.num_discs),
        date: album.and_then(|a| a.date.clone()),
        total_length,
        tracks,
    })
}
