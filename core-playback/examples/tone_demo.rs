//! # Tone Playback Example
//!
//! Plays a catalog track through the in-memory tone output, sets a sleep
//! timer, and prints the events the controller publishes.
//!
//! Run with: `cargo run --example tone_demo --package core-playback`

use bridge_traits::SystemClock;
use core_library::catalog;
use core_playback::{format_frequency, frequency_to_note, BufferedToneOutput, PlaybackController};
use core_runtime::config::PlaybackConfig;
use core_runtime::events::EventBus;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let output = Arc::new(BufferedToneOutput::new());
    let events = EventBus::default();
    let mut receiver = events.subscribe();

    let controller = PlaybackController::new(
        output.clone(),
        Arc::new(SystemClock),
        PlaybackConfig::default(),
        events,
        None,
    );
    controller.initialize().await;

    let track = catalog::popular_tracks()
        .into_iter()
        .next()
        .expect("catalog has popular tracks");
    println!(
        "Playing {} at {} ({})",
        track.name,
        format_frequency(track.frequency_hz),
        frequency_to_note(track.frequency_hz)
    );

    controller.play(track, None, None).await;
    controller.set_timer(15).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("Live tones: {}", output.playing_count());
    println!("Timer remaining: {:?}", controller.timer_remaining());

    controller.pause().await;
    controller.stop().await;

    while let Ok(event) = receiver.try_recv() {
        println!("  event: {}", event.description());
    }
}
