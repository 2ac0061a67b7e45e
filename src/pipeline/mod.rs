//! Pipeline orchestrator module.
//!
//! Wires hot-key triggers to the capture → resolve → request → deliver →
//! record cycle and exposes the state observers can read.
//!
//! # Architecture
//!
//! ```text
//! HotkeyEvent (mpsc)
//!        │
//!        ▼
//! PipelineOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ spawn_blocking(SelectionBridge::capture_selection)
//!        ├─ intent::resolve
//!        ├─ ProviderClient::complete (async)
//!        ├─ spawn_blocking(SelectionBridge::deliver_result)
//!        └─ ConfigStore::record_history
//!        │
//!        ▼
//! PipelineEvent (mpsc) ──▶ feedback thread (sounds, notifications)
//!
//! SharedState (Arc<Mutex<AppState>>) ←─── read by the daemon at shutdown
//! ```

pub mod events;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use events::{PipelineEvent, ProcessingStatus, ProviderStatus, SoundCue};
pub use runner::{PipelineError, PipelineOrchestrator, RunOutcome};
pub use state::{new_shared_state, wait_until_idle, AppState, PipelineState, SharedState};
