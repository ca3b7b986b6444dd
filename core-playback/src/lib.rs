//! # Playback Module
//!
//! Tone playback for the frequency player.
//!
//! ## Overview
//!
//! This crate handles:
//! - The playback session ([`PlaybackController`]): play, pause, resume,
//!   stop, volume, queue stepping, and the sleep timer
//! - Tone synthesis: sine-wave rendering and WAV encoding
//! - [`BufferedToneOutput`], an in-memory [`ToneOutput`](bridge_traits::ToneOutput)
//!   for desktop builds and tests
//! - Frequency display helpers (note names, audible range, formatting)
//!
//! Plays are reported to the library through the [`PlayRecorder`] hook; this
//! crate never touches favorites or history directly.

pub mod controller;
pub mod error;
pub mod output;
pub mod recorder;
pub mod session;
pub mod tone;
mod timer;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use output::{BufferedToneOutput, ToneState};
pub use recorder::PlayRecorder;
pub use session::PlaybackSnapshot;
pub use timer::MAX_TIMER_MINUTES;
pub use tone::{format_frequency, frequency_to_note, is_valid_frequency};
