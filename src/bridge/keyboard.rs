//! Keyboard simulation helpers backed by the `enigo` crate.
//!
//! Sends the OS-appropriate copy / paste chord to the focused window:
//!
//! | Platform | Copy | Paste |
//! |----------|------|-------|
//! | macOS    | ⌘C   | ⌘V    |
//! | Windows  | Ctrl+C | Ctrl+V |
//! | Linux    | Ctrl+C | Ctrl+V |

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::{BridgeError, KeyboardBackend};

#[cfg(target_os = "macos")]
const CHORD_MODIFIER: Key = Key::Meta;

#[cfg(not(target_os = "macos"))]
const CHORD_MODIFIER: Key = Key::Control;

/// Modifiers the user may still be holding from the hot-key. Left down they
/// would turn Ctrl+C into Ctrl+Shift+C, which many applications bind.
const STRAY_MODIFIERS: [Key; 2] = [Key::Shift, Key::Alt];

/// The real keyboard of the focused window.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeyboard;

impl KeyboardBackend for OsKeyboard {
    fn copy(&self) -> Result<(), BridgeError> {
        simulate_copy()
    }

    fn paste(&self) -> Result<(), BridgeError> {
        simulate_paste()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate the system copy shortcut in the currently focused window.
pub fn simulate_copy() -> Result<(), BridgeError> {
    send_chord('c')
}

/// Simulate the system paste shortcut in the currently focused window.
pub fn simulate_paste() -> Result<(), BridgeError> {
    send_chord('v')
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Press the platform modifier, click `letter`, release the modifier.
///
/// A new [`Enigo`] instance is created for each call because `Enigo` is not
/// `Send` and the handle is cheap to construct. The modifier is released
/// even when the letter click fails so it never stays stuck down.
fn send_chord(letter: char) -> Result<(), BridgeError> {
    let mut enigo =
        Enigo::new(&Settings::default()).map_err(|e| BridgeError::KeySimulation(e.to_string()))?;

    for key in STRAY_MODIFIERS {
        if let Err(e) = enigo.key(key, Direction::Release) {
            log::debug!("bridge: could not release {key:?}: {e}");
        }
    }

    enigo
        .key(CHORD_MODIFIER, Direction::Press)
        .map_err(|e| BridgeError::KeySimulation(e.to_string()))?;

    let clicked = enigo.key(Key::Unicode(letter), Direction::Click);
    let released = enigo.key(CHORD_MODIFIER, Direction::Release);

    clicked.map_err(|e| BridgeError::KeySimulation(e.to_string()))?;
    released.map_err(|e| BridgeError::KeySimulation(e.to_string()))?;
    Ok(())
}
