//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the frequency player core and the
//! platform-specific implementations. Each trait is a capability the core
//! needs but cannot provide itself:
//!
//! - [`ToneOutput`](playback::ToneOutput) - start/pause/resume/stop a looping tone
//! - [`KeyValueStore`](storage::KeyValueStore) - string key-value persistence
//! - [`Clock`](time::Clock) - time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform-specific errors and include context (key names,
//! handle ids) in the message. The core never surfaces these errors to the UI;
//! it logs them and falls back to a safe state.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single instance can be shared
//! behind an `Arc` between the playback controller, its timer task, and the
//! library store.

pub mod error;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::{BridgeError, Result};

pub use playback::{AudioSessionOptions, InterruptionMode, ToneHandle, ToneOptions, ToneOutput};
pub use storage::{KeyValueStore, MemoryKeyValueStore};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
