//! Integration tests for the playback controller.
//!
//! Time is paused in every test, so sleeps advance the tokio clock instantly
//! and timer expiries are deterministic.

use async_trait::async_trait;
use bridge_traits::{
    AudioSessionOptions, BridgeError, Clock, ManualClock, Result as BridgeResult, ToneHandle,
    ToneOptions, ToneOutput,
};
use chrono::{TimeZone, Utc};
use core_library::{Track, TrackId};
use core_playback::{BufferedToneOutput, PlayRecorder, PlaybackController};
use core_runtime::config::PlaybackConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use mockall::mock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tokio::sync::Mutex;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct CollectingRecorder {
    plays: Mutex<Vec<TrackId>>,
}

#[async_trait]
impl PlayRecorder for CollectingRecorder {
    async fn record_play(&self, track: Track) {
        self.plays.lock().await.push(track.id);
    }
}

/// Delays `start_tone` for selected frequencies.
struct SlowOutput {
    inner: BufferedToneOutput,
    delays: HashMap<u64, Duration>,
    reject_volume: bool,
}

impl SlowOutput {
    fn new(delays: &[(f64, Duration)]) -> Self {
        Self {
            inner: BufferedToneOutput::new(),
            delays: delays.iter().map(|(hz, d)| (hz.to_bits(), *d)).collect(),
            reject_volume: false,
        }
    }

    fn rejecting_volume(mut self) -> Self {
        self.reject_volume = true;
        self
    }
}

#[async_trait]
impl ToneOutput for SlowOutput {
    async fn configure_session(&self, options: AudioSessionOptions) -> BridgeResult<()> {
        self.inner.configure_session(options).await
    }

    async fn start_tone(&self, frequency_hz: f64, options: ToneOptions) -> BridgeResult<ToneHandle> {
        if let Some(delay) = self.delays.get(&frequency_hz.to_bits()) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.start_tone(frequency_hz, options).await
    }

    async fn pause(&self, handle: ToneHandle) -> BridgeResult<()> {
        self.inner.pause(handle).await
    }

    async fn resume(&self, handle: ToneHandle) -> BridgeResult<()> {
        self.inner.resume(handle).await
    }

    async fn stop(&self, handle: ToneHandle) -> BridgeResult<()> {
        self.inner.stop(handle).await
    }

    async fn unload(&self, handle: ToneHandle) -> BridgeResult<()> {
        self.inner.unload(handle).await
    }

    async fn set_volume(&self, handle: ToneHandle, volume: f32) -> BridgeResult<()> {
        if self.reject_volume {
            return Err(BridgeError::Audio("volume control unavailable".to_string()));
        }
        self.inner.set_volume(handle, volume).await
    }
}

mock! {
    pub Output {}

    #[async_trait]
    impl ToneOutput for Output {
        async fn configure_session(&self, options: AudioSessionOptions) -> BridgeResult<()>;
        async fn start_tone(&self, frequency_hz: f64, options: ToneOptions) -> BridgeResult<ToneHandle>;
        async fn pause(&self, handle: ToneHandle) -> BridgeResult<()>;
        async fn resume(&self, handle: ToneHandle) -> BridgeResult<()>;
        async fn stop(&self, handle: ToneHandle) -> BridgeResult<()>;
        async fn unload(&self, handle: ToneHandle) -> BridgeResult<()>;
        async fn set_volume(&self, handle: ToneHandle, volume: f32) -> BridgeResult<()>;
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn track(id: u32, frequency_hz: f64) -> Track {
    Track {
        id: TrackId(id),
        name: format!("Tone {}", id),
        frequency_hz,
        description: String::new(),
        duration_minutes: 30,
        category: "Chill Vibes Only".to_string(),
        icon: String::new(),
        is_recommended: false,
    }
}

fn love_frequency() -> Track {
    Track {
        name: "Love Frequency".to_string(),
        ..track(528, 528.0)
    }
}

struct Harness {
    controller: PlaybackController,
    events: Receiver<CoreEvent>,
    recorder: Arc<CollectingRecorder>,
    clock: Arc<ManualClock>,
}

fn harness(output: Arc<dyn ToneOutput>) -> Harness {
    let bus = EventBus::new(64);
    let events = bus.subscribe();
    let recorder = Arc::new(CollectingRecorder::default());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap(),
    ));
    let config = PlaybackConfig {
        tone_settle_delay: Duration::ZERO,
        ..PlaybackConfig::default()
    };

    let controller = PlaybackController::new(
        output,
        clock.clone(),
        config,
        bus,
        Some(recorder.clone() as Arc<dyn PlayRecorder>),
    );

    Harness {
        controller,
        events,
        recorder,
        clock,
    }
}

fn drain(events: &mut Receiver<CoreEvent>) -> Vec<PlaybackEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Playback(event) = event {
            out.push(event);
        }
    }
    out
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_love_frequency_play_pause_stop() {
    let output = Arc::new(BufferedToneOutput::new());
    let h = harness(output.clone());

    h.controller.play(love_frequency(), None, None).await;
    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.active_track.as_ref().map(|t| t.id), Some(TrackId(528)));
    assert!(snapshot.playing);
    assert_eq!(output.playing_count(), 1);

    h.controller.pause().await;
    let snapshot = h.controller.snapshot();
    assert!(!snapshot.playing);
    assert_eq!(snapshot.active_track.as_ref().map(|t| t.id), Some(TrackId(528)));
    assert_eq!(output.playing_count(), 0);
    assert_eq!(output.loaded_handles().len(), 1);

    h.controller.stop().await;
    let snapshot = h.controller.snapshot();
    assert!(snapshot.active_track.is_none());
    assert!(!snapshot.playing);
    assert!(output.loaded_handles().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_play_then_play_leaves_one_tone() {
    let output = Arc::new(BufferedToneOutput::new());
    let h = harness(output.clone());

    h.controller.play(track(1, 432.0), None, None).await;
    h.controller.play(track(2, 528.0), None, None).await;

    assert_eq!(h.controller.active_track().map(|t| t.id), Some(TrackId(2)));
    let handles = output.loaded_handles();
    assert_eq!(handles.len(), 1);
    assert_eq!(output.tone_state(handles[0]).unwrap().frequency_hz, 528.0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_start_releases_its_handle() {
    let output = Arc::new(SlowOutput::new(&[(100.0, Duration::from_millis(500))]));
    let h = harness(output.clone());
    let other = h.controller.clone();

    tokio::join!(h.controller.play(track(1, 100.0), None, None), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        other.play(track(2, 200.0), None, None).await;
    });

    assert_eq!(h.controller.active_track().map(|t| t.id), Some(TrackId(2)));
    let handles = output.inner.loaded_handles();
    assert_eq!(handles.len(), 1);
    assert_eq!(output.inner.tone_state(handles[0]).unwrap().frequency_hz, 200.0);

    let mut events = h.events;
    assert!(!drain(&mut events)
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_pause_while_starting_keeps_tone_paused() {
    let output = Arc::new(SlowOutput::new(&[(100.0, Duration::from_millis(500))]));
    let h = harness(output.clone());
    let other = h.controller.clone();

    tokio::join!(h.controller.play(track(1, 100.0), None, None), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        other.pause().await;
    });

    assert!(!h.controller.is_playing());
    assert_eq!(output.inner.loaded_handles().len(), 1);
    assert_eq!(output.inner.playing_count(), 0);

    h.controller.resume().await;
    assert!(h.controller.is_playing());
    assert_eq!(output.inner.playing_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_volume_sync_failure_keeps_started_tone() {
    let output = Arc::new(
        SlowOutput::new(&[(528.0, Duration::from_millis(50))]).rejecting_volume(),
    );
    let mut h = harness(output.clone());
    let other = h.controller.clone();

    tokio::join!(h.controller.play(love_frequency(), None, None), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        other.set_volume(0.9).await;
    });

    assert!(h.controller.is_playing());
    assert_eq!(h.controller.active_track().map(|t| t.id), Some(TrackId(528)));
    assert_eq!(output.inner.playing_count(), 1);
    assert!(!drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { .. })));

    // The timer still owns the live tone
    h.controller.set_timer(1).await;
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert!(h.controller.active_track().is_none());
    assert!(output.inner.loaded_handles().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_start_failure_rolls_back_and_resume_retries() {
    let mut output = MockOutput::new();
    output
        .expect_start_tone()
        .times(2)
        .returning(|_, _| Err(BridgeError::Audio("device busy".to_string())));
    let mut h = harness(Arc::new(output));

    h.controller.play(love_frequency(), None, None).await;

    assert!(!h.controller.is_playing());
    assert_eq!(h.controller.active_track().map(|t| t.id), Some(TrackId(528)));
    let events = drain(&mut h.events);
    assert!(events.iter().any(|e| matches!(
        e,
        PlaybackEvent::Error {
            track_id: Some(528),
            recoverable: true,
            ..
        }
    )));

    // No live tone, so resume starts it again
    h.controller.resume().await;
    assert!(!h.controller.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let mut h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.stop().await;
    h.controller.play(track(3, 396.0), None, None).await;
    h.controller.stop().await;
    h.controller.stop().await;

    let stops = drain(&mut h.events)
        .into_iter()
        .filter(|e| matches!(e, PlaybackEvent::Stopped { .. }))
        .count();
    assert_eq!(stops, 1);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_play_pause() {
    let h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.toggle_play_pause().await;
    assert!(h.controller.active_track().is_none());

    h.controller.play(track(4, 174.0), None, None).await;
    h.controller.toggle_play_pause().await;
    assert!(!h.controller.is_playing());
    h.controller.toggle_play_pause().await;
    assert!(h.controller.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_volume_is_clamped_and_propagated() {
    let output = Arc::new(BufferedToneOutput::new());
    let h = harness(output.clone());
    assert_eq!(h.controller.snapshot().volume, 0.5);

    h.controller.play(track(5, 285.0), None, None).await;
    let handle = output.loaded_handles()[0];

    h.controller.set_volume(1.5).await;
    assert_eq!(h.controller.snapshot().volume, 1.0);
    assert_eq!(output.tone_state(handle).unwrap().volume, 1.0);

    h.controller.set_volume(-0.2).await;
    assert_eq!(h.controller.snapshot().volume, 0.0);

    h.controller.set_volume(f32::NAN).await;
    assert_eq!(h.controller.snapshot().volume, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_initialize_configures_session() {
    let output = Arc::new(BufferedToneOutput::new());
    let h = harness(output.clone());

    h.controller.initialize().await;
    assert_eq!(output.session_options(), Some(AudioSessionOptions::default()));
}

// ============================================================================
// Queue
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_next_and_previous_without_wraparound() {
    let h = harness(Arc::new(BufferedToneOutput::new()));
    let queue = vec![track(10, 110.0), track(11, 111.0), track(12, 112.0)];

    h.controller
        .play(queue[0].clone(), Some(queue.clone()), Some(0))
        .await;

    h.controller.previous().await;
    assert_eq!(h.controller.active_track().map(|t| t.id), Some(TrackId(10)));

    h.controller.next().await;
    h.controller.next().await;
    assert_eq!(h.controller.snapshot().queue_index, 2);
    h.controller.next().await;
    assert_eq!(h.controller.active_track().map(|t| t.id), Some(TrackId(12)));

    h.controller.previous().await;
    assert_eq!(h.controller.active_track().map(|t| t.id), Some(TrackId(11)));
    assert_eq!(h.controller.snapshot().queue_index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_play_without_queue_keeps_queue() {
    let h = harness(Arc::new(BufferedToneOutput::new()));
    let queue = vec![track(10, 110.0), track(11, 111.0)];

    h.controller
        .play(queue[1].clone(), Some(queue.clone()), Some(1))
        .await;
    h.controller.play(track(99, 999.0), None, None).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.queue, queue);
    assert_eq!(snapshot.queue_index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_plays_are_recorded_in_order() {
    let h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.play(track(1, 432.0), None, None).await;
    h.controller.play(track(2, 528.0), None, None).await;
    h.controller.wait_for_background_tasks().await;

    assert_eq!(*h.recorder.plays.lock().await, vec![TrackId(1), TrackId(2)]);
}

// ============================================================================
// Sleep timer
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_timer_expiry_stops_exactly_once() {
    let output = Arc::new(BufferedToneOutput::new());
    let mut h = harness(output.clone());

    h.controller.play(love_frequency(), None, None).await;
    h.controller.set_timer(1).await;
    assert_eq!(
        h.controller.snapshot().timer_deadline,
        Some(h.clock.now() + chrono::Duration::minutes(1))
    );

    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(!h.controller.is_playing());
    assert!(h.controller.active_track().is_none());
    assert!(output.loaded_handles().is_empty());
    assert_eq!(h.controller.snapshot().timer_minutes, None);

    let tail: Vec<PlaybackEvent> = drain(&mut h.events)
        .into_iter()
        .filter(|e| {
            matches!(
                e,
                PlaybackEvent::Stopped { .. } | PlaybackEvent::TimerExpired { .. }
            )
        })
        .collect();
    assert_eq!(
        tail,
        vec![
            PlaybackEvent::Stopped {
                track_id: Some(528)
            },
            PlaybackEvent::TimerExpired { minutes: 1 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_timer() {
    let mut h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.play(track(1, 432.0), None, None).await;
    h.controller.set_timer(1).await;
    h.controller.stop().await;

    h.controller.play(track(2, 528.0), None, None).await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert!(h.controller.is_playing());
    assert!(!drain(&mut h.events)
        .iter()
        .any(|e| matches!(e, PlaybackEvent::TimerExpired { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_timer_set_while_paused_counts_from_resume() {
    let h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.play(track(1, 432.0), None, None).await;
    h.controller.pause().await;
    h.controller.set_timer(1).await;
    assert_eq!(h.controller.timer_remaining(), Duration::ZERO);

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(h.controller.active_track().is_some());

    h.controller.resume().await;
    assert_eq!(h.controller.timer_remaining(), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(h.controller.is_playing());
    assert_eq!(h.controller.timer_remaining(), Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!h.controller.is_playing());
    assert!(h.controller.active_track().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_pause_suspends_and_resume_restarts_full_duration() {
    let h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.play(track(1, 432.0), None, None).await;
    h.controller.set_timer(1).await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    h.controller.pause().await;
    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.timer_minutes, Some(1));
    assert_eq!(snapshot.timer_deadline, None);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(h.controller.active_track().is_some());

    h.controller.resume().await;
    assert_eq!(h.controller.timer_remaining(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_play_while_playing_keeps_countdown() {
    let h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.play(track(1, 432.0), None, None).await;
    h.controller.set_timer(1).await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    h.controller.play(track(2, 528.0), None, None).await;
    assert_eq!(h.controller.timer_remaining(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_set_timer_zero_clears() {
    let mut h = harness(Arc::new(BufferedToneOutput::new()));

    h.controller.play(track(1, 432.0), None, None).await;
    h.controller.set_timer(5).await;
    h.controller.set_timer(0).await;
    h.controller.set_timer(-3).await;

    assert_eq!(h.controller.snapshot().timer_minutes, None);
    assert_eq!(h.controller.timer_remaining(), Duration::ZERO);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert!(h.controller.is_playing());

    let cleared = drain(&mut h.events)
        .into_iter()
        .filter(|e| matches!(e, PlaybackEvent::TimerCleared))
        .count();
    assert_eq!(cleared, 1);
}
