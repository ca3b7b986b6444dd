//! Workspace façade crate.
//!
//! Re-exports the workspace crates so host applications can depend on
//! `frequency-workspace` alone. The `desktop-shims` feature (on by default)
//! pulls in the SQLite key-value store and `core_service::bootstrap_desktop`.

pub use bridge_traits;
pub use core_library;
pub use core_playback;
pub use core_runtime;
pub use core_service;

pub use core_service::{CoreError, CoreService};

#[cfg(feature = "desktop-shims")]
pub use core_service::bootstrap_desktop;
