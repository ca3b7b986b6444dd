//! Hook through which the controller reports plays to the library.

use core_library::Track;

/// Receives a copy of every track the controller starts.
///
/// Called from a detached task; implementations swallow their own failures.
#[async_trait::async_trait]
pub trait PlayRecorder: Send + Sync {
    async fn record_play(&self, track: Track);
}
