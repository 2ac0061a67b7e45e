//! Outbound feedback events.
//!
//! The orchestrator never plays sounds or shows notifications itself; it
//! describes what should happen and the feedback host acts on it.

/// Start/end bracket around a provider request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Start,
    End,
}

/// Which audible cue to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Start,
    Success,
    Error,
}

/// Reachability of the configured backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Online,
    Offline,
}

/// Everything observers may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    ProcessingStatus(ProcessingStatus),
    PlaySound(SoundCue),
    /// Desktop notification. `silent` ones must not make a sound of their own.
    Notify {
        title: String,
        body: String,
        silent: bool,
    },
    /// A history entry was recorded and persisted.
    HistoryUpdated,
    ProviderStatus(ProviderStatus),
}
