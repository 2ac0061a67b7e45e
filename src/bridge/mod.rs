//! Capture / deliver bridge: the only code that touches the OS clipboard.
//!
//! # Capture
//!
//! 1. **Snapshot** the current clipboard text.
//! 2. **Clear** the clipboard so stale content cannot be mistaken for the
//!    selection.
//! 3. **Simulate** Ctrl+C (⌘C on macOS) in the focused window.
//! 4. **Wait** the settle delay; the target application fills the clipboard
//!    asynchronously.
//! 5. **Read** the clipboard. Still empty means nothing was selected.
//!
//! # Deliver
//!
//! Write the result, then (unless copy-only) simulate Ctrl+V / ⌘V.
//!
//! # Restore
//!
//! Put the snapshot back. A clipboard failure inside capture restores the
//! snapshot before the error is returned; the pipeline restores it on every
//! later abort that happens before a request is sent. A failed copy chord is
//! the one abort that leaves the clipboard as it is.
//!
//! [`SystemBridge`] drives these steps through [`ClipboardBackend`] and
//! [`KeyboardBackend`], which default to the OS implementations.
//!
//! All operations block (sleeps, OS calls); callers on an async runtime run
//! them through `tokio::task::spawn_blocking`.

pub mod clipboard;
pub mod keyboard;

pub use clipboard::{
    clear_clipboard, read_clipboard, restore_clipboard, set_clipboard, OsClipboard,
};
pub use keyboard::{simulate_copy, simulate_paste, OsKeyboard};

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// BridgeError
// ---------------------------------------------------------------------------

/// All errors that can surface while capturing or delivering text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not write to the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    ClipboardSet(String),

    /// Could not simulate a key press/release event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),

    /// The blocking task running a bridge call panicked or was cancelled.
    #[error("bridge task failed: {0}")]
    Task(String),
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// Result of a capture attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    /// Clipboard text before the capture started (`None`: empty or non-text).
    pub snapshot: Option<String>,
    /// Text that landed in the clipboard after the copy chord.
    pub selection: Option<String>,
}

impl Capture {
    /// The selection, unless it is missing or whitespace-only.
    pub fn text(&self) -> Option<&str> {
        self.selection
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Plain-text clipboard.
pub trait ClipboardBackend: Send + Sync {
    /// Current text; `None` when empty or not text.
    fn read(&self) -> Result<Option<String>, BridgeError>;
    fn write(&self, text: &str) -> Result<(), BridgeError>;
    fn clear(&self) -> Result<(), BridgeError>;
}

/// Copy and paste chords sent to the focused window.
pub trait KeyboardBackend: Send + Sync {
    fn copy(&self) -> Result<(), BridgeError>;
    fn paste(&self) -> Result<(), BridgeError>;
}

// ---------------------------------------------------------------------------
// SelectionBridge trait
// ---------------------------------------------------------------------------

/// Clipboard-and-keyboard side of a pipeline run.
///
/// Implementors must be `Send + Sync` so an `Arc<dyn SelectionBridge>` can be
/// moved into `spawn_blocking` closures.
pub trait SelectionBridge: Send + Sync {
    /// Snapshot, clear, copy, settle, read.
    ///
    /// # Errors
    ///
    /// [`BridgeError::KeySimulation`] when the copy chord could not be sent;
    /// clipboard errors otherwise. A clipboard error after the snapshot was
    /// taken has already restored it. "Nothing selected" is *not* an error:
    /// it comes back as `Capture { selection: None, .. }`.
    fn capture_selection(&self) -> Result<Capture, BridgeError>;

    /// Write `text` to the clipboard and paste it when `auto_paste` is set.
    fn deliver_result(&self, text: &str, auto_paste: bool) -> Result<(), BridgeError>;

    /// Put the pre-capture clipboard back.
    fn restore_original(&self, snapshot: Option<&str>) -> Result<(), BridgeError>;
}

// ---------------------------------------------------------------------------
// SystemBridge
// ---------------------------------------------------------------------------

/// [`SelectionBridge`] over a clipboard and a keyboard, by default the OS
/// ones.
#[derive(Debug, Clone)]
pub struct SystemBridge<C = OsClipboard, K = OsKeyboard> {
    /// Wait between the copy chord and reading the clipboard.
    pub settle_delay: Duration,
    /// Wait between writing the result and sending the paste chord.
    pub paste_delay: Duration,
    clipboard: C,
    keyboard: K,
}

impl Default for SystemBridge {
    fn default() -> Self {
        Self::with_backends(OsClipboard, OsKeyboard)
    }
}

impl SystemBridge {
    /// Create a bridge with the given settle delay in milliseconds.
    pub fn new(settle_delay_ms: u64) -> Self {
        Self {
            settle_delay: Duration::from_millis(settle_delay_ms),
            ..Self::default()
        }
    }
}

impl<C: ClipboardBackend, K: KeyboardBackend> SystemBridge<C, K> {
    /// Bridge over the given backends with the default delays.
    pub fn with_backends(clipboard: C, keyboard: K) -> Self {
        Self {
            settle_delay: Duration::from_millis(200),
            paste_delay: Duration::from_millis(50),
            clipboard,
            keyboard,
        }
    }

    /// Put `snapshot` back after a failed capture and hand `error` on.
    fn abandon(&self, snapshot: Option<&str>, error: BridgeError) -> BridgeError {
        if let Err(e) = self.restore_original(snapshot) {
            log::warn!("bridge: clipboard not restored after {error}: {e}");
        }
        error
    }
}

impl<C: ClipboardBackend, K: KeyboardBackend> SelectionBridge for SystemBridge<C, K> {
    fn capture_selection(&self) -> Result<Capture, BridgeError> {
        let snapshot = self.clipboard.read()?;

        self.clipboard
            .clear()
            .map_err(|e| self.abandon(snapshot.as_deref(), e))?;

        self.keyboard.copy()?;

        std::thread::sleep(self.settle_delay);

        let selection = self
            .clipboard
            .read()
            .map_err(|e| self.abandon(snapshot.as_deref(), e))?;
        log::debug!(
            "bridge: captured {} chars",
            selection.as_deref().map_or(0, |s| s.chars().count())
        );

        Ok(Capture {
            snapshot,
            selection,
        })
    }

    fn deliver_result(&self, text: &str, auto_paste: bool) -> Result<(), BridgeError> {
        self.clipboard.write(text)?;

        if auto_paste {
            // Let clipboard managers see the new content before the target reads it.
            std::thread::sleep(self.paste_delay);
            self.keyboard.paste()?;
        }

        Ok(())
    }

    fn restore_original(&self, snapshot: Option<&str>) -> Result<(), BridgeError> {
        match snapshot {
            Some(text) => self.clipboard.write(text),
            None => self.clipboard.clear(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
