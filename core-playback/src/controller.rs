//! # Playback Controller
//!
//! Owns the single playback session: the active track, the play/pause flag,
//! volume, the queue, and the sleep timer.
//!
//! ## Concurrency
//!
//! Session state lives behind a `parking_lot` mutex that is never held across
//! an `.await`. Each operation mutates state synchronously, releases the lock,
//! then talks to the [`ToneOutput`]. Every `play` and `stop` bumps a
//! generation counter; a tone start that completes after a newer request is
//! discarded and its handle is released, so at most one tone is ever live.
//!
//! None of the operations return errors. Output failures are logged and
//! reported as [`PlaybackEvent::Error`].

use crate::error::{PlaybackError, Result};
use crate::recorder::PlayRecorder;
use crate::session::{PlaybackSnapshot, SessionState};
use crate::timer::ArmedTimer;
use bridge_traits::{Clock, ToneHandle, ToneOptions, ToneOutput};
use core_library::Track;
use core_runtime::config::PlaybackConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Handle to the playback session. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

struct Inner {
    output: Arc<dyn ToneOutput>,
    clock: Arc<dyn Clock>,
    config: PlaybackConfig,
    events: EventBus,
    recorder: Option<Arc<dyn PlayRecorder>>,
    state: Mutex<SessionState>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

enum StartOutcome {
    Keep { volume_changed: Option<f32> },
    KeepPaused,
    Discard,
}

enum ResumeAction {
    Output(ToneHandle, u32),
    AwaitStart(u32),
    Restart(Track),
}

impl PlaybackController {
    pub fn new(
        output: Arc<dyn ToneOutput>,
        clock: Arc<dyn Clock>,
        config: PlaybackConfig,
        events: EventBus,
        recorder: Option<Arc<dyn PlayRecorder>>,
    ) -> Self {
        let volume = config.initial_volume.clamp(0.0, 1.0);
        Self {
            inner: Arc::new(Inner {
                output,
                clock,
                config,
                events,
                recorder,
                state: Mutex::new(SessionState::new(volume)),
                background: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Configures the host audio session for background playback.
    pub async fn initialize(&self) {
        let options = self.inner.config.session_options;
        match self.inner.output.configure_session(options).await {
            Ok(()) => debug!(?options, "Audio session configured"),
            Err(e) => error!(error = %e, "Failed to configure audio session"),
        }
    }

    /// Makes `track` the active track and starts its tone.
    ///
    /// When `queue` is given it replaces the session queue and the position
    /// becomes `queue_index` (default 0).
    pub async fn play(&self, track: Track, queue: Option<Vec<Track>>, queue_index: Option<usize>) {
        if let Some(queue) = queue {
            let mut state = self.inner.state.lock();
            state.queue = queue;
            state.queue_index = queue_index.unwrap_or(0);
        }
        self.start_session(track, true).await;
    }

    /// Pauses the active tone. No-op unless playing.
    pub async fn pause(&self) {
        let (handle, track_id) = {
            let mut state = self.inner.state.lock();
            if !state.playing {
                return;
            }
            state.playing = false;
            state.timer.suspend();
            (state.handle, state.active_track_id())
        };

        if let Some(handle) = handle {
            if let Err(e) = self.inner.output.pause(handle).await {
                warn!(error = %e, "Failed to pause tone");
            }
        }

        if let Some(track_id) = track_id {
            debug!(track_id, "Playback paused");
            self.emit(PlaybackEvent::Paused { track_id });
        }
    }

    /// Resumes a paused session. No-op when already playing or idle.
    ///
    /// If the session has no live tone, because its start failed, the tone
    /// is started again.
    pub async fn resume(&self) {
        let action = {
            let mut state = self.inner.state.lock();
            let track = match (&state.active_track, state.playing) {
                (Some(track), false) => track.clone(),
                _ => return,
            };

            match (state.handle, state.starting) {
                (Some(handle), _) => {
                    state.playing = true;
                    let armed = state.timer.arm(self.inner.clock.now());
                    self.spawn_timer(armed);
                    ResumeAction::Output(handle, track.id.0)
                }
                (None, true) => {
                    state.playing = true;
                    let armed = state.timer.arm(self.inner.clock.now());
                    self.spawn_timer(armed);
                    ResumeAction::AwaitStart(track.id.0)
                }
                (None, false) => ResumeAction::Restart(track),
            }
        };

        match action {
            ResumeAction::Output(handle, track_id) => {
                if let Err(e) = self.inner.output.resume(handle).await {
                    self.rollback_resume(handle, track_id, e.into());
                    return;
                }
                debug!(track_id, "Playback resumed");
                self.emit(PlaybackEvent::Resumed { track_id });
            }
            ResumeAction::AwaitStart(track_id) => {
                debug!(track_id, "Playback resumed before tone start completed");
                self.emit(PlaybackEvent::Resumed { track_id });
            }
            ResumeAction::Restart(track) => {
                debug!(track_id = track.id.0, "No live tone, restarting");
                self.start_session(track, false).await;
            }
        }
    }

    /// Pause when playing, otherwise resume the active track.
    pub async fn toggle_play_pause(&self) {
        let playing = self.inner.state.lock().playing;
        if playing {
            self.pause().await;
        } else {
            self.resume().await;
        }
    }

    /// Ends the session: clears the track and the sleep timer and releases
    /// the tone. Idempotent.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let (handle, track_id) = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.starting = false;
            state.playing = false;
            state.timer.clear();
            (state.handle.take(), state.active_track.take().map(|t| t.id.0))
        };

        if let Some(handle) = handle {
            self.release(handle).await;
        }

        if track_id.is_some() {
            info!(?track_id, "Playback stopped");
            self.emit(PlaybackEvent::Stopped { track_id });
        }
    }

    /// Sets the session volume, clamped to `0.0..=1.0`. NaN is ignored.
    pub async fn set_volume(&self, volume: f32) {
        if volume.is_nan() {
            warn!("Ignoring NaN volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);

        let handle = {
            let mut state = self.inner.state.lock();
            state.volume = volume;
            state.handle
        };

        if let Some(handle) = handle {
            if let Err(e) = self.inner.output.set_volume(handle, volume).await {
                warn!(error = %e, "Failed to set tone volume");
            }
        }
        self.emit(PlaybackEvent::VolumeChanged { volume });
    }

    /// Sets the sleep timer. `minutes <= 0` clears it.
    ///
    /// The countdown starts from the full duration now if playing, or on the
    /// next resume otherwise.
    pub async fn set_timer(&self, minutes: i64) {
        if minutes <= 0 {
            let cleared = self.inner.state.lock().timer.clear();
            if cleared.is_some() {
                debug!("Sleep timer cleared");
                self.emit(PlaybackEvent::TimerCleared);
            }
            return;
        }

        let minutes = {
            let mut state = self.inner.state.lock();
            state
                .timer
                .set_minutes(u32::try_from(minutes).unwrap_or(u32::MAX));
            if state.playing {
                let armed = state.timer.arm(self.inner.clock.now());
                self.spawn_timer(armed);
            }
            state.timer.minutes().unwrap_or_default()
        };

        info!(minutes, "Sleep timer set");
        self.emit(PlaybackEvent::TimerSet { minutes });
    }

    /// Plays the next queue entry. No wraparound.
    pub async fn next(&self) {
        let track = {
            let mut state = self.inner.state.lock();
            let next = state.queue_index + 1;
            if next >= state.queue.len() {
                return;
            }
            state.queue_index = next;
            state.queue[next].clone()
        };
        self.start_session(track, true).await;
    }

    /// Plays the previous queue entry. No wraparound.
    pub async fn previous(&self) {
        let track = {
            let mut state = self.inner.state.lock();
            if state.queue_index == 0 || state.queue.is_empty() {
                return;
            }
            let previous = (state.queue_index - 1).min(state.queue.len() - 1);
            state.queue_index = previous;
            state.queue[previous].clone()
        };
        self.start_session(track, true).await;
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.state.lock().snapshot()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.lock().playing
    }

    pub fn active_track(&self) -> Option<Track> {
        self.inner.state.lock().active_track.clone()
    }

    /// Time left on the sleep timer; zero when it is not counting.
    pub fn timer_remaining(&self) -> Duration {
        self.inner.state.lock().timer.remaining()
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.events.subscribe()
    }

    /// Waits for every dispatched play-recording task to finish.
    pub async fn wait_for_background_tasks(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = self.inner.background.lock().drain(..).collect();
            if pending.is_empty() {
                return;
            }
            for task in pending {
                if let Err(e) = task.await {
                    warn!(error = %e, "Background task failed");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    #[instrument(skip(self, track), fields(track_id = track.id.0, frequency_hz = track.frequency_hz))]
    async fn start_session(&self, track: Track, record: bool) {
        let (generation, previous, volume) = {
            let mut state = self.inner.state.lock();
            let was_playing = state.playing;
            state.active_track = Some(track.clone());
            state.playing = true;
            state.starting = true;
            state.generation += 1;
            if !was_playing {
                let armed = state.timer.arm(self.inner.clock.now());
                self.spawn_timer(armed);
            }
            (state.generation, state.handle.take(), state.volume)
        };

        info!(name = %track.name, "Playback started");
        self.emit(PlaybackEvent::Started {
            track_id: track.id.0,
            name: track.name.clone(),
            frequency_hz: track.frequency_hz,
        });

        if record {
            self.dispatch_record(track.clone());
        }

        if let Some(handle) = previous {
            self.release(handle).await;
        }

        match self.start_tone(&track, generation, volume).await {
            Ok(()) => {}
            Err(PlaybackError::Superseded) => {
                debug!(generation, "Tone start superseded");
            }
            Err(e) => self.rollback_start(&track, generation, e),
        }
    }

    async fn start_tone(&self, track: &Track, generation: u64, volume: f32) -> Result<()> {
        let delay = self.inner.config.tone_settle_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if !self.is_current(generation) {
            return Err(PlaybackError::Superseded);
        }
        if !track.frequency_hz.is_finite() || track.frequency_hz <= 0.0 {
            return Err(PlaybackError::InvalidFrequency(track.frequency_hz));
        }

        let options = ToneOptions {
            looping: true,
            volume,
        };
        let handle = self
            .inner
            .output
            .start_tone(track.frequency_hz, options)
            .await?;

        let outcome = {
            let mut state = self.inner.state.lock();
            if state.generation != generation {
                StartOutcome::Discard
            } else {
                state.handle = Some(handle);
                state.starting = false;
                if state.playing {
                    let volume_changed = (state.volume != volume).then_some(state.volume);
                    StartOutcome::Keep { volume_changed }
                } else {
                    StartOutcome::KeepPaused
                }
            }
        };

        match outcome {
            StartOutcome::Keep { volume_changed } => {
                debug!(%handle, "Tone live");
                if let Some(volume) = volume_changed {
                    if let Err(e) = self.inner.output.set_volume(handle, volume).await {
                        warn!(%handle, error = %e, "Failed to sync volume on new tone");
                    }
                }
                Ok(())
            }
            StartOutcome::KeepPaused => {
                debug!(%handle, "Paused while starting");
                if let Err(e) = self.inner.output.pause(handle).await {
                    warn!(%handle, error = %e, "Failed to pause new tone");
                }
                Ok(())
            }
            StartOutcome::Discard => {
                debug!(%handle, "Discarding stale tone");
                self.release(handle).await;
                Err(PlaybackError::Superseded)
            }
        }
    }

    fn rollback_start(&self, track: &Track, generation: u64, e: PlaybackError) {
        {
            let mut state = self.inner.state.lock();
            if state.generation != generation {
                return;
            }
            state.playing = false;
            state.starting = false;
            state.timer.suspend();
        }

        error!(track_id = track.id.0, error = %e, "Failed to start tone");
        self.emit(PlaybackEvent::Error {
            track_id: Some(track.id.0),
            message: e.to_string(),
            recoverable: e.is_transient(),
        });
    }

    fn rollback_resume(&self, handle: ToneHandle, track_id: u32, e: PlaybackError) {
        {
            let mut state = self.inner.state.lock();
            if state.handle != Some(handle) {
                return;
            }
            state.playing = false;
            state.timer.suspend();
        }

        error!(track_id, error = %e, "Failed to resume tone");
        self.emit(PlaybackEvent::Error {
            track_id: Some(track_id),
            message: e.to_string(),
            recoverable: e.is_transient(),
        });
    }

    /// Stops and unloads a tone, logging failures.
    async fn release(&self, handle: ToneHandle) {
        if let Err(e) = self.inner.output.stop(handle).await {
            debug!(%handle, error = %e, "Failed to stop tone");
        }
        if let Err(e) = self.inner.output.unload(handle).await {
            debug!(%handle, error = %e, "Failed to unload tone");
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.state.lock().generation == generation
    }

    fn dispatch_record(&self, track: Track) {
        let Some(recorder) = self.inner.recorder.clone() else {
            return;
        };

        let task = tokio::spawn(async move {
            recorder.record_play(track).await;
        });

        let mut background = self.inner.background.lock();
        background.retain(|task| !task.is_finished());
        background.push(task);
    }

    fn spawn_timer(&self, armed: Option<ArmedTimer>) {
        let Some(armed) = armed else {
            return;
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = armed.cancel.cancelled() => {}
                _ = tokio::time::sleep_until(armed.deadline) => {
                    if let Some(inner) = weak.upgrade() {
                        PlaybackController { inner }.expire_timer(armed.epoch).await;
                    }
                }
            }
        });
    }

    async fn expire_timer(&self, epoch: u64) {
        let minutes = {
            let mut state = self.inner.state.lock();
            if !state.timer.is_current(epoch) {
                return;
            }
            state.timer.clear()
        };

        info!(?minutes, "Sleep timer expired");
        self.stop().await;
        self.emit(PlaybackEvent::TimerExpired {
            minutes: minutes.unwrap_or_default(),
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.inner.events.emit(CoreEvent::Playback(event));
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PlaybackController")
            .field("active_track", &state.active_track_id())
            .field("playing", &state.playing)
            .field("volume", &state.volume)
            .field("generation", &state.generation)
            .finish()
    }
}
