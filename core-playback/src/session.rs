//! Session state shared by the controller operations.

use crate::timer::SleepTimer;
use bridge_traits::ToneHandle;
use chrono::{DateTime, Utc};
use core_library::Track;
use serde::Serialize;

/// Point-in-time copy of the playback session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub active_track: Option<Track>,
    pub playing: bool,
    pub volume: f32,
    pub queue: Vec<Track>,
    pub queue_index: usize,
    pub timer_minutes: Option<u32>,
    /// Wall-clock time the sleep timer fires; `None` while it is not counting
    pub timer_deadline: Option<DateTime<Utc>>,
}

pub(crate) struct SessionState {
    pub active_track: Option<Track>,
    pub playing: bool,
    pub volume: f32,
    pub queue: Vec<Track>,
    pub queue_index: usize,
    /// Bumped by every play and stop; a tone start only lands if its
    /// generation is still current.
    pub generation: u64,
    /// A tone start for the current generation has not completed yet.
    pub starting: bool,
    pub handle: Option<ToneHandle>,
    pub timer: SleepTimer,
}

impl SessionState {
    pub fn new(volume: f32) -> Self {
        Self {
            active_track: None,
            playing: false,
            volume,
            queue: Vec::new(),
            queue_index: 0,
            generation: 0,
            starting: false,
            handle: None,
            timer: SleepTimer::default(),
        }
    }

    pub fn active_track_id(&self) -> Option<u32> {
        self.active_track.as_ref().map(|track| track.id.0)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            active_track: self.active_track.clone(),
            playing: self.playing,
            volume: self.volume,
            queue: self.queue.clone(),
            queue_index: self.queue_index,
            timer_minutes: self.timer.minutes(),
            timer_deadline: self.timer.wall_deadline(),
        }
    }
}
