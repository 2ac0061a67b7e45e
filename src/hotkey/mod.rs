//! Global hotkey trigger, backed by `rdev`.
//!
//! # Design
//!
//! `rdev::listen()` is a blocking OS-level call that never returns while the
//! process is alive.  It must run on a **dedicated OS thread**; it cannot be
//! used inside a tokio task.
//!
//! The pieces:
//!
//! * [`HotkeyCombo`]: parsed `Modifier+...+Key` binding.
//! * [`HotkeyRegistry`]: the currently armed combo; re-registering swaps it
//!   without restarting the listener thread.
//! * [`TriggerGate`]: suspended by the pipeline while a run is in flight so
//!   triggers fired meanwhile are dropped rather than queued.
//! * [`ComboMatcher`]: pure modifier/key state machine fed with rdev events.
//! * [`HotkeyListener`]: owns the listener thread.
//!
//! # Usage
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use glotkey::hotkey::{HotkeyListener, HotkeyRegistry, TriggerGate};
//!
//! let (tx, mut rx) = mpsc::channel(4);
//! let registry = HotkeyRegistry::new();
//! let gate = TriggerGate::new();
//! assert!(registry.register("CommandOrControl+Shift+F9"));
//! let _listener = HotkeyListener::start(registry, gate, tx);
//!
//! // In your async loop:
//! // while let Some(ev) = rx.recv().await { ... }
//! ```

pub mod listener;

pub use listener::HotkeyListener;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

// ---------------------------------------------------------------------------
// HotkeyEvent
// ---------------------------------------------------------------------------

/// Events emitted by the hotkey listener thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// The registered combination was pressed.
    Triggered,
}

// ---------------------------------------------------------------------------
// HotkeyError
// ---------------------------------------------------------------------------

/// Why a combo string could not be registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    /// No `+` between modifier(s) and key.
    #[error("shortcut {0:?} needs a modifier and a key separated by '+'")]
    MissingSeparator(String),

    /// A modifier name that is not recognised.
    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),

    /// A key name that is not recognised.
    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

// ---------------------------------------------------------------------------
// Modifier / HotkeyCombo
// ---------------------------------------------------------------------------

/// Modifier keys a combo can require. Left and right variants count alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Control,
    Shift,
    Alt,
    Meta,
}

impl Modifier {
    /// Parse a modifier name, ignoring case.
    ///
    /// `CommandOrControl` / `CmdOrCtrl` resolve to ⌘ on macOS and Ctrl
    /// elsewhere.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ctrl" | "control" => Some(Modifier::Control),
            "shift" => Some(Modifier::Shift),
            "alt" | "option" | "altgr" => Some(Modifier::Alt),
            "meta" | "super" | "cmd" | "command" | "win" => Some(Modifier::Meta),
            "commandorcontrol" | "cmdorctrl" => Some(Self::command_or_control()),
            _ => None,
        }
    }

    #[cfg(target_os = "macos")]
    fn command_or_control() -> Self {
        Modifier::Meta
    }

    #[cfg(not(target_os = "macos"))]
    fn command_or_control() -> Self {
        Modifier::Control
    }

    /// The modifier an rdev key belongs to, if any.
    pub fn from_rdev(key: rdev::Key) -> Option<Self> {
        match key {
            rdev::Key::ControlLeft | rdev::Key::ControlRight => Some(Modifier::Control),
            rdev::Key::ShiftLeft | rdev::Key::ShiftRight => Some(Modifier::Shift),
            rdev::Key::Alt | rdev::Key::AltGr => Some(Modifier::Alt),
            rdev::Key::MetaLeft | rdev::Key::MetaRight => Some(Modifier::Meta),
            _ => None,
        }
    }
}

/// A parsed `Modifier+...+Key` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct HotkeyCombo {
    pub modifiers: BTreeSet<Modifier>,
    pub key: rdev::Key,
}

impl HotkeyCombo {
    /// Parse strings like `"CommandOrControl+B"` or `"Ctrl+Shift+F9"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use glotkey::hotkey::{HotkeyCombo, HotkeyError};
    ///
    /// let combo = HotkeyCombo::parse("Ctrl+Shift+T").unwrap();
    /// assert_eq!(combo.key, rdev::Key::KeyT);
    /// assert_eq!(combo.modifiers.len(), 2);
    ///
    /// assert!(matches!(HotkeyCombo::parse("F9"), Err(HotkeyError::MissingSeparator(_))));
    /// ```
    pub fn parse(combo: &str) -> Result<Self, HotkeyError> {
        let parts: Vec<&str> = combo.split('+').map(str::trim).collect();
        let Some((key_name, modifier_names)) = parts.split_last() else {
            return Err(HotkeyError::MissingSeparator(combo.to_string()));
        };
        if modifier_names.is_empty() {
            return Err(HotkeyError::MissingSeparator(combo.to_string()));
        }

        let modifiers = modifier_names
            .iter()
            .map(|name| Modifier::parse(name).ok_or_else(|| HotkeyError::UnknownModifier(name.to_string())))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let key = parse_key(key_name).ok_or_else(|| HotkeyError::UnknownKey(key_name.to_string()))?;

        Ok(Self { modifiers, key })
    }
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a key name from a config string into an [`rdev::Key`].
///
/// Supports F1–F12, common named keys, digits and single ASCII letters
/// (either case). Returns `None` for unrecognised names so callers can fall
/// back to a default or display an error to the user.
///
/// # Examples
///
/// ```
/// use glotkey::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"),      Some(rdev::Key::F9));
/// assert_eq!(parse_key("Escape"),  Some(rdev::Key::Escape));
/// assert_eq!(parse_key("b"),       Some(rdev::Key::KeyB));
/// assert_eq!(parse_key("7"),       Some(rdev::Key::Num7));
/// assert_eq!(parse_key("xyz"),     None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    match key_str {
        // Function keys
        "F1" => Some(rdev::Key::F1),
        "F2" => Some(rdev::Key::F2),
        "F3" => Some(rdev::Key::F3),
        "F4" => Some(rdev::Key::F4),
        "F5" => Some(rdev::Key::F5),
        "F6" => Some(rdev::Key::F6),
        "F7" => Some(rdev::Key::F7),
        "F8" => Some(rdev::Key::F8),
        "F9" => Some(rdev::Key::F9),
        "F10" => Some(rdev::Key::F10),
        "F11" => Some(rdev::Key::F11),
        "F12" => Some(rdev::Key::F12),

        // Navigation / control
        "Escape" | "Esc" => Some(rdev::Key::Escape),
        "Space" => Some(rdev::Key::Space),
        "Return" | "Enter" => Some(rdev::Key::Return),
        "Tab" => Some(rdev::Key::Tab),
        "Backspace" => Some(rdev::Key::Backspace),
        "Delete" | "Del" => Some(rdev::Key::Delete),
        "Insert" => Some(rdev::Key::Insert),
        "Home" => Some(rdev::Key::Home),
        "End" => Some(rdev::Key::End),
        "PageUp" => Some(rdev::Key::PageUp),
        "PageDown" => Some(rdev::Key::PageDown),
        "UpArrow" | "Up" => Some(rdev::Key::UpArrow),
        "DownArrow" | "Down" => Some(rdev::Key::DownArrow),
        "LeftArrow" | "Left" => Some(rdev::Key::LeftArrow),
        "RightArrow" | "Right" => Some(rdev::Key::RightArrow),

        // Digits
        "0" => Some(rdev::Key::Num0),
        "1" => Some(rdev::Key::Num1),
        "2" => Some(rdev::Key::Num2),
        "3" => Some(rdev::Key::Num3),
        "4" => Some(rdev::Key::Num4),
        "5" => Some(rdev::Key::Num5),
        "6" => Some(rdev::Key::Num6),
        "7" => Some(rdev::Key::Num7),
        "8" => Some(rdev::Key::Num8),
        "9" => Some(rdev::Key::Num9),

        // Letter keys (case-insensitive)
        "A" | "a" => Some(rdev::Key::KeyA),
        "B" | "b" => Some(rdev::Key::KeyB),
        "C" | "c" => Some(rdev::Key::KeyC),
        "D" | "d" => Some(rdev::Key::KeyD),
        "E" | "e" => Some(rdev::Key::KeyE),
        "F" | "f" => Some(rdev::Key::KeyF),
        "G" | "g" => Some(rdev::Key::KeyG),
        "H" | "h" => Some(rdev::Key::KeyH),
        "I" | "i" => Some(rdev::Key::KeyI),
        "J" | "j" => Some(rdev::Key::KeyJ),
        "K" | "k" => Some(rdev::Key::KeyK),
        "L" | "l" => Some(rdev::Key::KeyL),
        "M" | "m" => Some(rdev::Key::KeyM),
        "N" | "n" => Some(rdev::Key::KeyN),
        "O" | "o" => Some(rdev::Key::KeyO),
        "P" | "p" => Some(rdev::Key::KeyP),
        "Q" | "q" => Some(rdev::Key::KeyQ),
        "R" | "r" => Some(rdev::Key::KeyR),
        "S" | "s" => Some(rdev::Key::KeyS),
        "T" | "t" => Some(rdev::Key::KeyT),
        "U" | "u" => Some(rdev::Key::KeyU),
        "V" | "v" => Some(rdev::Key::KeyV),
        "W" | "w" => Some(rdev::Key::KeyW),
        "X" | "x" => Some(rdev::Key::KeyX),
        "Y" | "y" => Some(rdev::Key::KeyY),
        "Z" | "z" => Some(rdev::Key::KeyZ),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// HotkeyRegistry
// ---------------------------------------------------------------------------

/// The combo the listener thread currently reacts to.
///
/// Cloning shares the same slot, so the listener sees re-registrations
/// immediately.
#[derive(Debug, Clone, Default)]
pub struct HotkeyRegistry {
    combo: Arc<RwLock<Option<HotkeyCombo>>>,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered combo.
    ///
    /// Any previous binding is dropped first. Returns `false` (and logs)
    /// when `combo` is not a valid `Modifier+Key` string; the trigger then
    /// stays unregistered until a valid combo is supplied.
    pub fn register(&self, combo: &str) -> bool {
        self.unregister();

        match HotkeyCombo::parse(combo) {
            Ok(parsed) => {
                *self.combo.write().unwrap_or_else(PoisonError::into_inner) = Some(parsed);
                log::info!("hotkey: shortcut {combo} registered");
                true
            }
            Err(e) => {
                log::error!("hotkey: registration of {combo:?} skipped: {e}");
                false
            }
        }
    }

    /// Drop the current binding.
    pub fn unregister(&self) {
        *self.combo.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Copy of the registered combo, if any.
    pub fn current(&self) -> Option<HotkeyCombo> {
        self.combo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ---------------------------------------------------------------------------
// TriggerGate
// ---------------------------------------------------------------------------

/// Run-in-progress guard shared by the listener and the pipeline.
#[derive(Debug, Clone, Default)]
pub struct TriggerGate {
    suspended: Arc<AtomicBool>,
}

impl TriggerGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop forwarding triggers.
    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::SeqCst);
    }

    /// Forward triggers again.
    pub fn resume(&self) {
        self.suspended.store(false, Ordering::SeqCst);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// ComboMatcher
// ---------------------------------------------------------------------------

/// Tracks held modifiers and reports when a combo's key goes down.
///
/// Fires once per physical press: auto-repeat presses are ignored until the
/// key is released.
#[derive(Debug, Default)]
pub struct ComboMatcher {
    held: BTreeSet<Modifier>,
    fired: bool,
}

impl ComboMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key event; returns `true` when `combo` was just completed.
    pub fn feed(&mut self, event: &rdev::EventType, combo: Option<&HotkeyCombo>) -> bool {
        match event {
            &rdev::EventType::KeyPress(key) => {
                if let Some(modifier) = Modifier::from_rdev(key) {
                    self.held.insert(modifier);
                    return false;
                }
                let Some(combo) = combo else {
                    return false;
                };
                if key == combo.key && self.held == combo.modifiers && !self.fired {
                    self.fired = true;
                    return true;
                }
                false
            }
            &rdev::EventType::KeyRelease(key) => {
                if let Some(modifier) = Modifier::from_rdev(key) {
                    self.held.remove(&modifier);
                } else if combo.is_some_and(|c| c.key == key) {
                    self.fired = false;
                }
                false
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::EventType::{KeyPress, KeyRelease};
    use rdev::Key;

    #[test]
    fn parse_function_keys() {
        assert_eq!(parse_key("F9"), Some(Key::F9));
        assert_eq!(parse_key("F1"), Some(Key::F1));
        assert_eq!(parse_key("F12"), Some(Key::F12));
    }

    #[test]
    fn parse_named_keys() {
        assert_eq!(parse_key("Escape"), Some(Key::Escape));
        assert_eq!(parse_key("Esc"), Some(Key::Escape));
        assert_eq!(parse_key("Space"), Some(Key::Space));
        assert_eq!(parse_key("Return"), Some(Key::Return));
        assert_eq!(parse_key("Enter"), Some(Key::Return));
    }

    #[test]
    fn parse_letter_and_digit_keys() {
        assert_eq!(parse_key("A"), Some(Key::KeyA));
        assert_eq!(parse_key("a"), Some(Key::KeyA));
        assert_eq!(parse_key("Z"), Some(Key::KeyZ));
        assert_eq!(parse_key("0"), Some(Key::Num0));
    }

    #[test]
    fn parse_unknown_key_returns_none() {
        assert_eq!(parse_key("xyz"), None);
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("Ctrl+V"), None);
    }

    // --- combos -------------------------------------------------------------

    #[test]
    fn parse_command_or_control() {
        let combo = HotkeyCombo::parse("CommandOrControl+B").unwrap();
        assert_eq!(combo.key, Key::KeyB);
        assert_eq!(combo.modifiers.len(), 1);
        #[cfg(target_os = "macos")]
        assert!(combo.modifiers.contains(&Modifier::Meta));
        #[cfg(not(target_os = "macos"))]
        assert!(combo.modifiers.contains(&Modifier::Control));
    }

    #[test]
    fn default_shortcut_parses() {
        let shortcut = crate::config::HotkeyConfig::default().shortcut;
        let combo = HotkeyCombo::parse(&shortcut).unwrap();
        assert_eq!(combo.key, Key::F9);
        assert!(combo.modifiers.contains(&Modifier::Shift));
        assert_eq!(combo.modifiers.len(), 2);
    }

    #[test]
    fn parse_multi_modifier_combo_ignores_case_and_spaces() {
        let combo = HotkeyCombo::parse("ctrl + SHIFT + F9").unwrap();
        assert_eq!(combo.key, Key::F9);
        assert_eq!(
            combo.modifiers,
            BTreeSet::from([Modifier::Control, Modifier::Shift])
        );
    }

    #[test]
    fn combo_without_separator_is_rejected() {
        assert!(matches!(
            HotkeyCombo::parse("B"),
            Err(HotkeyError::MissingSeparator(_))
        ));
        assert!(matches!(
            HotkeyCombo::parse(""),
            Err(HotkeyError::MissingSeparator(_))
        ));
    }

    #[test]
    fn combo_with_unknown_parts_is_rejected() {
        assert!(matches!(
            HotkeyCombo::parse("Hyper+B"),
            Err(HotkeyError::UnknownModifier(_))
        ));
        assert!(matches!(
            HotkeyCombo::parse("Ctrl+Banana"),
            Err(HotkeyError::UnknownKey(_))
        ));
    }

    // --- registry -----------------------------------------------------------

    #[test]
    fn register_valid_combo() {
        let registry = HotkeyRegistry::new();
        assert!(registry.register("Alt+Space"));
        assert_eq!(registry.current().map(|c| c.key), Some(Key::Space));
    }

    #[test]
    fn invalid_register_leaves_trigger_unregistered() {
        let registry = HotkeyRegistry::new();
        assert!(registry.register("Ctrl+B"));
        assert!(!registry.register("B"));
        assert!(registry.current().is_none());
    }

    #[test]
    fn registry_clones_share_binding() {
        let registry = HotkeyRegistry::new();
        let listener_side = registry.clone();
        registry.register("Ctrl+Shift+T");
        assert_eq!(listener_side.current().map(|c| c.key), Some(Key::KeyT));
        registry.unregister();
        assert!(listener_side.current().is_none());
    }

    // --- gate ---------------------------------------------------------------

    #[test]
    fn gate_suspend_and_resume() {
        let gate = TriggerGate::new();
        let other = gate.clone();
        assert!(!other.is_suspended());
        gate.suspend();
        assert!(other.is_suspended());
        gate.resume();
        assert!(!other.is_suspended());
    }

    // --- matcher ------------------------------------------------------------

    fn ctrl_b() -> HotkeyCombo {
        HotkeyCombo {
            modifiers: BTreeSet::from([Modifier::Control]),
            key: Key::KeyB,
        }
    }

    #[test]
    fn matcher_fires_when_modifiers_held() {
        let combo = ctrl_b();
        let mut m = ComboMatcher::new();
        assert!(!m.feed(&KeyPress(Key::ControlLeft), Some(&combo)));
        assert!(m.feed(&KeyPress(Key::KeyB), Some(&combo)));
    }

    #[test]
    fn matcher_ignores_key_without_modifier() {
        let combo = ctrl_b();
        let mut m = ComboMatcher::new();
        assert!(!m.feed(&KeyPress(Key::KeyB), Some(&combo)));
    }

    #[test]
    fn matcher_requires_exact_modifier_set() {
        let combo = ctrl_b();
        let mut m = ComboMatcher::new();
        m.feed(&KeyPress(Key::ControlLeft), Some(&combo));
        m.feed(&KeyPress(Key::ShiftLeft), Some(&combo));
        assert!(!m.feed(&KeyPress(Key::KeyB), Some(&combo)));
    }

    #[test]
    fn matcher_ignores_auto_repeat_until_release() {
        let combo = ctrl_b();
        let mut m = ComboMatcher::new();
        m.feed(&KeyPress(Key::ControlRight), Some(&combo));
        assert!(m.feed(&KeyPress(Key::KeyB), Some(&combo)));
        assert!(!m.feed(&KeyPress(Key::KeyB), Some(&combo)));
        m.feed(&KeyRelease(Key::KeyB), Some(&combo));
        assert!(m.feed(&KeyPress(Key::KeyB), Some(&combo)));
    }

    #[test]
    fn matcher_tracks_modifier_release() {
        let combo = ctrl_b();
        let mut m = ComboMatcher::new();
        m.feed(&KeyPress(Key::ControlLeft), Some(&combo));
        m.feed(&KeyRelease(Key::ControlLeft), Some(&combo));
        assert!(!m.feed(&KeyPress(Key::KeyB), Some(&combo)));
    }

    #[test]
    fn matcher_without_combo_never_fires() {
        let mut m = ComboMatcher::new();
        m.feed(&KeyPress(Key::ControlLeft), None);
        assert!(!m.feed(&KeyPress(Key::KeyB), None));
    }
}
