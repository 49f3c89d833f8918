//! Album browsing and description commands.
//!
//! Both commands run the albums controller against a library snapshot and
//! drive the model the same way the UI would: process a message, dispatch
//! pending model updates, repeat until the queue is empty.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tokio::runtime::Runtime;

use super::OutputFormat;
use crate::config::Config;
use crate::controller::{AlbumsController, Message, SnapshotLibrary, connect_album_images};
use crate::model::{AlbumSummary, format_length};
use crate::state::{AppState, Property, StateHandle};

struct Session {
    controller: AlbumsController,
    state: AppState,
    handle: StateHandle,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl Session {
    fn open(config: &Config, snapshot: &Path) -> anyhow::Result<Self> {
        let library = Arc::new(SnapshotLibrary::open(snapshot)?);
        let (state, handle) = AppState::new();
        let controller = AlbumsController::new(
            library.clone(),
            library,
            handle.clone(),
            config.cache.open(),
        )
        .with_max_downloads(config.cache.max_downloads);
        let (tx, rx) = unbounded();
        Ok(Self {
            controller,
            state,
            handle,
            tx,
            rx,
        })
    }

    /// Process queued messages until none are left.
    fn run(&mut self, rt: &Runtime) -> anyhow::Result<()> {
        while let Ok(message) = self.rx.try_recv() {
            tracing::debug!("Processing {:?}", message);
            if !rt.block_on(self.controller.process_message(&message))? {
                tracing::warn!("No controller handled {:?}", message);
            }
            self.state.dispatch_pending();
        }
        Ok(())
    }

    fn send(&self, message: Message) -> anyhow::Result<()> {
        self.tx.send(message)?;
        Ok(())
    }
}

/// List albums from a snapshot
pub fn cmd_albums(
    rt: &Runtime,
    config: &Config,
    snapshot: &Path,
    fetch_images: bool,
) -> anyhow::Result<()> {
    let mut session = Session::open(config, snapshot)?;
    if fetch_images {
        connect_album_images(&mut session.state, session.tx.clone());
    }

    session.send(Message::BrowseAlbums)?;
    session.run(rt)?;

    let albums = session.handle.albums();
    if albums.is_empty() {
        println!("No albums.");
        return Ok(());
    }

    for album in &albums {
        if album.image_path.is_empty() {
            println!("{}\t{}", album.name, album.uri);
        } else {
            println!("{}\t{}\t{}", album.name, album.uri, album.image_path);
        }
    }
    println!("\n{} albums", albums.len());

    if fetch_images {
        let loaded = session
            .handle
            .get(Property::AlbumsImagesLoaded)
            .as_bool()
            .unwrap_or(false);
        println!("Album images loaded: {}", if loaded { "yes" } else { "no" });
    }
    Ok(())
}

/// Describe one album from a snapshot
pub fn cmd_describe(
    rt: &Runtime,
    config: &Config,
    snapshot: &Path,
    album_uri: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut session = Session::open(config, snapshot)?;
    session.send(Message::CompleteAlbumDescription {
        album_uri: album_uri.to_string(),
    })?;
    session.run(rt)?;

    let Some(summary) = session.handle.album_description(album_uri) else {
        anyhow::bail!("No description available for album {}", album_uri);
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", render_summary(&summary)),
    }
    Ok(())
}

/// Human-readable album description.
fn render_summary(summary: &AlbumSummary) -> String {
    let mut out = String::new();
    let name = summary.name.as_deref().unwrap_or("Unknown Album");
    out.push_str(&format!("{}\n", name));
    if let Some(artist) = &summary.artist_name {
        out.push_str(&format!("by {}\n", artist));
    }
    if let Some(date) = &summary.date {
        out.push_str(&format!("Released: {}\n", date));
    }

    let declared = summary
        .num_tracks
        .map(|n| format!(" of {}", n))
        .unwrap_or_default();
    out.push_str(&format!("Tracks: {}{}\n", summary.tracks.len(), declared));
    if let Some(discs) = summary.num_discs {
        out.push_str(&format!("Discs: {}\n", discs));
    }
    out.push_str(&format!("Length: {}\n\n", summary.total_length));

    for track in &summary.tracks {
        let length = track.length_ms.map(format_length).unwrap_or_default();
        out.push_str(&format!(
            "{:>2}-{:02}  {}  {}\n",
            track.disc_no, track.track_no, track.name, length
        ));
    }
    out
}
