//! Integration tests for the runtime crate: global logging setup and event
//! delivery as seen from another crate.

use bridge_traits::{ConsoleLogger, LogLevel};
use core_runtime::events::{CoreEvent, EventBus, EventStream, LibraryEvent, PlaybackEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::Arc;

#[test]
fn test_init_logging_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(ConsoleLogger::default()));

    assert!(init_logging(config.clone()).is_ok());

    // The global subscriber is already installed.
    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}

#[test]
fn test_default_format_follows_build_profile() {
    let config = LoggingConfig::default();

    #[cfg(debug_assertions)]
    assert_eq!(config.format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(config.format, LogFormat::Json);
}

#[tokio::test]
async fn test_subscriber_sees_playback_sequence_in_order() {
    let bus = EventBus::default();
    let mut stream =
        EventStream::new(bus.subscribe()).filter(|event| matches!(event, CoreEvent::Playback(_)));

    let sequence = vec![
        CoreEvent::Playback(PlaybackEvent::Started {
            track_id: 528,
            name: "Love Frequency".to_string(),
            frequency_hz: 528.0,
        }),
        CoreEvent::Library(LibraryEvent::RecentCleared),
        CoreEvent::Playback(PlaybackEvent::Paused { track_id: 528 }),
        CoreEvent::Playback(PlaybackEvent::Stopped {
            track_id: Some(528),
        }),
    ];
    for event in &sequence {
        bus.emit(event.clone()).ok();
    }

    assert_eq!(stream.recv().await.unwrap(), sequence[0]);
    assert_eq!(stream.recv().await.unwrap(), sequence[2]);
    assert_eq!(stream.recv().await.unwrap(), sequence[3]);
    assert!(stream.try_recv().is_none());
}
