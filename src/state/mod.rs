//! Observable application model.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────┐
//! │  Controllers (any thread)     │  StateHandle::set / update_albums / ...
//! └───────────────┬───────────────┘
//!                 │ crossbeam channel
//!                 ▼
//! ┌───────────────────────────────┐
//! │  AppState (UI thread)         │  dispatch_pending() applies updates,
//! │                               │  then fires listeners
//! └───────────────────────────────┘
//! ```
//!
//! Reads through a [`StateHandle`] see the snapshot as last applied on the
//! UI thread. Writes are compared against the last *requested* value so
//! that redundant sets are dropped before they reach the channel.

use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};

use crate::model::{Album, AlbumSummary, PlaybackState};

/// Scalar properties of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    NetworkAvailable,
    Connected,
    PlaybackState,
    Mute,
    Volume,
    TrackUri,
    TrackName,
    /// Milliseconds, -1 when unknown
    TrackLength,
    /// Milliseconds, -1 when unknown
    TimePosition,
    ArtistUri,
    ArtistName,
    ImagePath,
    AlbumsLoaded,
    AlbumsImagesLoaded,
}

impl Property {
    pub const ALL: [Property; 14] = [
        Property::NetworkAvailable,
        Property::Connected,
        Property::PlaybackState,
        Property::Mute,
        Property::Volume,
        Property::TrackUri,
        Property::TrackName,
        Property::TrackLength,
        Property::TimePosition,
        Property::ArtistUri,
        Property::ArtistName,
        Property::ImagePath,
        Property::AlbumsLoaded,
        Property::AlbumsImagesLoaded,
    ];

    /// Value a fresh model starts with.
    pub fn default_value(&self) -> Value {
        match self {
            Self::NetworkAvailable
            | Self::Connected
            | Self::Mute
            | Self::AlbumsLoaded
            | Self::AlbumsImagesLoaded => Value::Bool(false),
            Self::PlaybackState => Value::Int(PlaybackState::Unknown.code()),
            Self::Volume => Value::Int(0),
            Self::TrackLength | Self::TimePosition => Value::Int(-1),
            Self::TrackUri | Self::ArtistUri | Self::TrackName | Self::ArtistName | Self::ImagePath => {
                Value::Text(String::new())
            }
        }
    }
}

/// Anything a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Property(Property),
    /// The browse list was replaced
    Albums,
    /// An album description was completed
    AlbumDescription,
}

impl From<Property> for Field {
    fn from(p: Property) -> Self {
        Field::Property(p)
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Model contents as seen by the UI.
#[derive(Debug, Clone)]
pub struct Snapshot {
    properties: HashMap<Property, Value>,
    albums: Vec<Album>,
    descriptions: HashMap<String, AlbumSummary>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            properties: Property::ALL
                .iter()
                .map(|p| (*p, p.default_value()))
                .collect(),
            albums: Vec::new(),
            descriptions: HashMap::new(),
        }
    }
}

impl Snapshot {
    pub fn get(&self, property: Property) -> &Value {
        // Every property is seeded in Default and never removed
        &self.properties[&property]
    }

    /// Boolean property, false if it holds another type.
    pub fn flag(&self, property: Property) -> bool {
        self.get(property).as_bool().unwrap_or(false)
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn album_description(&self, uri: &str) -> Option<&AlbumSummary> {
        self.descriptions.get(uri)
    }
}

/// Change queued for the UI thread.
#[derive(Debug)]
enum Update {
    Set(Property, Value),
    Albums(Vec<Album>),
    AlbumDescription(AlbumSummary),
}

struct Shared {
    current: RwLock<Snapshot>,
    /// Latest value queued per property, used to drop redundant sets
    requested: Mutex<HashMap<Property, Value>>,
}

/// Thread-safe writer/reader for the model.
#[derive(Clone)]
pub struct StateHandle {
    shared: Arc<Shared>,
    tx: Sender<Update>,
}

type Listener = Box<dyn FnMut(&Snapshot)>;

/// Model owner. Lives on the UI thread.
pub struct AppState {
    shared: Arc<Shared>,
    rx: Receiver<Update>,
    listeners: Vec<(Field, Listener)>,
}

impl AppState {
    /// Create a model and the handle used to update it.
    pub fn new() -> (Self, StateHandle) {
        let snapshot = Snapshot::default();
        let shared = Arc::new(Shared {
            requested: Mutex::new(snapshot.properties.clone()),
            current: RwLock::new(snapshot),
        });
        let (tx, rx) = unbounded();

        let state = Self {
            shared: Arc::clone(&shared),
            rx,
            listeners: Vec::new(),
        };
        (state, StateHandle { shared, tx })
    }

    /// Register a callback fired after `field` changes.
    pub fn subscribe(&mut self, field: impl Into<Field>, listener: impl FnMut(&Snapshot) + 'static) {
        self.listeners.push((field.into(), Box::new(listener)));
    }

    /// Apply every queued update and notify listeners.
    ///
    /// Returns the number of updates that changed the model.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut changed = 0;
        while let Ok(update) = self.rx.try_recv() {
            let Some(field) = self.apply(update) else {
                continue;
            };
            changed += 1;

            let snapshot = self.shared.current.read();
            for (_, listener) in self.listeners.iter_mut().filter(|(f, _)| *f == field) {
                listener(&*snapshot);
            }
        }
        changed
    }

    /// Read the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.current.read().clone()
    }

    fn apply(&self, update: Update) -> Option<Field> {
        let mut current = self.shared.current.write();
        match update {
            Update::Set(property, value) => {
                let slot = current.properties.entry(property).or_insert_with(|| property.default_value());
                if *slot == value {
                    return None;
                }
                *slot = value;
                Some(Field::Property(property))
            }
            Update::Albums(albums) => {
                current.albums = albums;
                Some(Field::Albums)
            }
            Update::AlbumDescription(summary) => {
                current.descriptions.insert(summary.uri.clone(), summary);
                Some(Field::AlbumDescription)
            }
        }
    }
}

impl StateHandle {
    /// Current (UI-visible) value of a property.
    pub fn get(&self, property: Property) -> Value {
        self.shared.current.read().get(property).clone()
    }

    pub fn albums(&self) -> Vec<Album> {
        self.shared.current.read().albums.clone()
    }

    pub fn album_description(&self, uri: &str) -> Option<AlbumSummary> {
        self.shared.current.read().album_description(uri).cloned()
    }

    /// Queue a property change for the UI thread.
    ///
    /// Returns false if the value equals the last one requested.
    pub fn set(&self, property: Property, value: impl Into<Value>) -> bool {
        let value = value.into();
        {
            let mut requested = self.shared.requested.lock();
            if requested.get(&property) == Some(&value) {
                tracing::debug!("No need to set {:?} to {:?}", property, value);
                return false;
            }
            tracing::debug!(
                "Updating {:?} from {:?} to {:?}",
                property,
                requested.get(&property),
                value
            );
            requested.insert(property, value.clone());
        }
        self.send(Update::Set(property, value));
        true
    }

    /// Replace the browse list.
    ///
    /// Entries without a name or uri are dropped. Listeners on
    /// `AlbumsLoaded` see it go false (if it was set) and then true.
    pub fn update_albums(&self, albums: Vec<Album>) {
        let was_loaded = self.shared.requested.lock().get(&Property::AlbumsLoaded) == Some(&Value::Bool(true));
        if was_loaded {
            self.set(Property::AlbumsLoaded, false);
            self.set(Property::AlbumsImagesLoaded, false);
        }

        let albums: Vec<Album> = albums
            .into_iter()
            .filter(|a| !a.name.is_empty() && !a.uri.is_empty())
            .collect();
        tracing::debug!("Updating albums ({} entries)", albums.len());
        self.send(Update::Albums(albums));

        self.set(Property::AlbumsLoaded, true);
    }

    /// Store the full description of an album.
    pub fn complete_album_description(&self, summary: AlbumSummary) {
        tracing::debug!("Completing description of album {:?}", summary.uri);
        self.send(Update::AlbumDescription(summary));
    }

    /// Reset every field describing the current track.
    pub fn clear_track_list(&self) {
        for property in [
            Property::TrackUri,
            Property::TrackName,
            Property::TrackLength,
            Property::TimePosition,
            Property::ArtistUri,
            Property::ArtistName,
            Property::ImagePath,
        ] {
            self.set(property, property.default_value());
        }
    }

    fn send(&self, update: Update) {
        // The receiver only goes away when the UI shuts down
        if self.tx.send(update).is_err() {
            tracing::debug!("Model owner is gone, dropping update");
        }
    }
}
