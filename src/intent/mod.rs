//! Intent resolution: turn a captured selection into a prompt.
//!
//! A selection may end with an inline directive `::token`:
//!
//! ```text
//! Bom dia a todos::en        → translate "Bom dia a todos" into English
//! i has a apple::fix         → built-in grammar fix
//! Meeting moved to 3pm::dev  → user-defined action "dev"
//! Plain text                 → translate into the default target language
//! ```
//!
//! The token is tried against an ordered list of resolvers (custom actions,
//! built-in actions, language aliases); the first hit wins. An unknown token
//! is not an error: the whole selection, suffix included, is translated into
//! the default language.

pub mod language;
pub mod prompt;

use std::sync::OnceLock;

use regex::Regex;

use crate::config::AppConfig;

pub use language::{default_language_name, language_for_alias, TargetLanguage, LANGUAGE_ALIASES};
pub use prompt::{custom_prompt, translation_prompt, BuiltinAction, BUILTIN_ACTIONS};

// ---------------------------------------------------------------------------
// Directive
// ---------------------------------------------------------------------------

/// What kind of instruction a [`Directive`] carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    /// Translate into the named language.
    Translation { target: String },
    /// One of the shipped rewrite actions.
    BuiltinAction(BuiltinAction),
    /// A user-defined template, by its key.
    CustomAction { key: String },
}

/// Resolved instruction for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Text the instruction applies to (suffix stripped when one matched).
    pub payload: String,
    pub kind: InstructionKind,
    /// Complete prompt sent to the provider.
    pub prompt: String,
}

impl Directive {
    fn translation(payload: &str, target: &str) -> Self {
        Self {
            payload: payload.to_string(),
            kind: InstructionKind::Translation {
                target: target.to_string(),
            },
            prompt: translation_prompt(payload, target),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------

/// A pure suffix resolver: `(token, payload, settings) -> directive`.
type Resolver = fn(&str, &str, &AppConfig) -> Option<Directive>;

/// Tried in order; the first `Some` wins.
const RESOLVERS: [Resolver; 3] = [resolve_custom, resolve_builtin, resolve_language];

fn resolve_custom(token: &str, payload: &str, config: &AppConfig) -> Option<Directive> {
    let template = config.custom_action(token)?;
    Some(Directive {
        payload: payload.to_string(),
        kind: InstructionKind::CustomAction {
            key: token.to_string(),
        },
        prompt: custom_prompt(template, payload),
    })
}

fn resolve_builtin(token: &str, payload: &str, _config: &AppConfig) -> Option<Directive> {
    let action = BuiltinAction::from_token(token)?;
    Some(Directive {
        payload: payload.to_string(),
        kind: InstructionKind::BuiltinAction(action),
        prompt: action.prompt(payload),
    })
}

fn resolve_language(token: &str, payload: &str, _config: &AppConfig) -> Option<Directive> {
    let lang = language_for_alias(token)?;
    Some(Directive::translation(payload, lang.prompt_name()))
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

fn suffix_regex() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| Regex::new(r"::([A-Za-z0-9_]+)$").expect("suffix pattern is valid"))
}

/// Split `text` into `(payload, lowercased token)` when it ends in `::token`.
pub fn split_suffix(text: &str) -> Option<(&str, String)> {
    let caps = suffix_regex().captures(text)?;
    let whole = caps.get(0)?;
    let token = caps.get(1)?.as_str().to_lowercase();
    Some((text[..whole.start()].trim(), token))
}

/// Resolve `captured` into a [`Directive`]. Never fails.
///
/// An empty payload (e.g. the selection was just `::en`) still produces a
/// directive; deciding whether that is worth a request is up to the caller.
///
/// # Example
///
/// ```
/// use glotkey::config::AppConfig;
/// use glotkey::intent::{resolve, InstructionKind};
///
/// let mut config = AppConfig::default();
/// config.translation.default_target_language = "Spanish".into();
///
/// let directive = resolve("Hello::en", &config);
/// assert_eq!(directive.payload, "Hello");
/// assert_eq!(
///     directive.kind,
///     InstructionKind::Translation { target: "English".into() }
/// );
/// ```
pub fn resolve(captured: &str, config: &AppConfig) -> Directive {
    if let Some((payload, token)) = split_suffix(captured) {
        if let Some(directive) = RESOLVERS
            .iter()
            .find_map(|resolver| resolver(&token, payload, config))
        {
            return directive;
        }
        log::debug!("intent: unknown suffix ::{token}, using default translation");
    }

    let target = default_language_name(&config.translation.default_target_language);
    Directive::translation(captured, &target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
