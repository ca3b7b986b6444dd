//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the frequency player core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! The playback and library crates depend on this one for their shared
//! configuration types, the event types they publish, and the logging setup
//! hosts call once at startup.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
