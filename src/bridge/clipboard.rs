//! Clipboard helpers backed by the `arboard` crate.
//!
//! Every function creates a short-lived [`arboard::Clipboard`] handle rather
//! than sharing one across calls, because `arboard::Clipboard` is not `Send`
//! on all platforms and the handle is cheap to create.

use arboard::Clipboard;

use super::{BridgeError, ClipboardBackend};

/// The system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsClipboard;

impl ClipboardBackend for OsClipboard {
    fn read(&self) -> Result<Option<String>, BridgeError> {
        read_clipboard()
    }

    fn write(&self, text: &str) -> Result<(), BridgeError> {
        set_clipboard(text)
    }

    fn clear(&self) -> Result<(), BridgeError> {
        clear_clipboard()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read the current clipboard plain-text content.
///
/// Returns `Ok(None)` when the clipboard is empty or holds non-text data
/// (e.g. an image). Never returns an error just because the clipboard is
/// empty.
///
/// # Errors
///
/// Returns [`BridgeError::ClipboardAccess`] if the OS clipboard cannot be
/// opened.
pub fn read_clipboard() -> Result<Option<String>, BridgeError> {
    let mut clipboard = open_clipboard()?;
    // `get_text` returns Err if empty or non-text; treat both as None
    Ok(clipboard.get_text().ok())
}

/// Write `text` into the system clipboard, replacing whatever was there.
///
/// # Errors
///
/// Returns [`BridgeError::ClipboardAccess`] if the clipboard cannot be
/// opened, or [`BridgeError::ClipboardSet`] if writing fails.
pub fn set_clipboard(text: &str) -> Result<(), BridgeError> {
    let mut clipboard = open_clipboard()?;
    clipboard
        .set_text(text)
        .map_err(|e| BridgeError::ClipboardSet(e.to_string()))
}

/// Empty the clipboard so a later read only sees freshly copied text.
pub fn clear_clipboard() -> Result<(), BridgeError> {
    let mut clipboard = open_clipboard()?;
    clipboard
        .clear()
        .map_err(|e| BridgeError::ClipboardSet(e.to_string()))
}

/// Put a previously read value back.
///
/// * `Some(text)`: writes `text` back.
/// * `None`: the clipboard held no text before; it is cleared again.
pub fn restore_clipboard(saved: Option<&str>) -> Result<(), BridgeError> {
    match saved {
        Some(text) => set_clipboard(text),
        None => clear_clipboard(),
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Open an `arboard::Clipboard` handle, mapping the error to [`BridgeError`].
fn open_clipboard() -> Result<Clipboard, BridgeError> {
    Clipboard::new().map_err(|e| BridgeError::ClipboardAccess(e.to_string()))
}
