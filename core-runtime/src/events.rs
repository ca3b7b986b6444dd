//! # Event Bus System
//!
//! Provides an event-driven architecture for the frequency player core using
//! `tokio::sync::broadcast`. The playback controller and the library store
//! publish typed events here; hosts subscribe to refresh their UI without
//! polling.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  emit   ┌───────────┐
//! │PlaybackController├────────>│           │  subscribe  ┌────────────┐
//! └──────────────────┘         │ EventBus  ├────────────>│ Subscriber │
//! ┌──────────────────┐  emit   │ (broadcast│             └────────────┘
//! │   LibraryStore   ├────────>│  channel) │
//! └──────────────────┘         └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::TimerSet { minutes: 15 })).ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Sleep timer set");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; it can keep
//!   receiving.
//! - **`RecvError::Closed`**: every sender was dropped; treat as shutdown.
//!
//! Emitting with no subscribers returns an error that publishers ignore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback session and sleep timer events
    Playback(PlaybackEvent),
    /// Favorites, recent history, and settings events
    Library(LibraryEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Library(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::TimerExpired { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Library(LibraryEvent::SnapshotImported { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A track became the active track and its tone was requested.
    Started {
        track_id: u32,
        name: String,
        frequency_hz: f64,
    },
    Paused {
        track_id: u32,
    },
    Resumed {
        track_id: u32,
    },
    /// Playback stopped; `track_id` is the track that was active, if any.
    Stopped {
        track_id: Option<u32>,
    },
    /// Session volume changed (already clamped to `0.0..=1.0`).
    VolumeChanged {
        volume: f32,
    },
    TimerSet {
        minutes: u32,
    },
    TimerCleared,
    /// The sleep timer ran out and stopped playback.
    TimerExpired {
        minutes: u32,
    },
    /// The tone output rejected an operation.
    Error {
        track_id: Option<u32>,
        message: String,
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::TimerSet { .. } => "Sleep timer set",
            PlaybackEvent::TimerCleared => "Sleep timer cleared",
            PlaybackEvent::TimerExpired { .. } => "Sleep timer expired",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Library Events
// ============================================================================

/// Events emitted by the library store and the settings manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    FavoriteAdded {
        track_id: u32,
        name: String,
    },
    FavoriteRemoved {
        track_id: u32,
    },
    /// A play was recorded at the front of the recent history.
    RecentRecorded {
        track_id: u32,
        played_at: DateTime<Utc>,
    },
    RecentCleared,
    /// A snapshot was applied. Counts are `None` for sections the snapshot
    /// did not carry.
    SnapshotImported {
        favorites: Option<usize>,
        recent: Option<usize>,
    },
    SettingChanged {
        key: String,
    },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::FavoriteAdded { .. } => "Favorite added",
            LibraryEvent::FavoriteRemoved { .. } => "Favorite removed",
            LibraryEvent::RecentRecorded { .. } => "Play recorded in recent history",
            LibraryEvent::RecentCleared => "Recent history cleared",
            LibraryEvent::SnapshotImported { .. } => "Library snapshot imported",
            LibraryEvent::SettingChanged { .. } => "Setting changed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel shared by the core components.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus holding at most `capacity` undelivered events
    /// per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0; `CoreConfig` validation rejects that value.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error when
    /// nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver wrapper that skips events rejected by an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Keeps only events for which `predicate` returns true.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive; `None` when no matching event is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
