//! Prompt templates for translations, built-in actions and custom actions.

// ---------------------------------------------------------------------------
// Shared framing
// ---------------------------------------------------------------------------

/// Appended to every built-in instruction so the model answers with the
/// transformed text only.
const ANSWER_ONLY: &str = "Respond with only the resulting text. \
Do not add explanations, notes, quotes or any other commentary.";

/// Fence the payload so instructions and user text cannot blur together.
fn fenced(text: &str) -> String {
    format!("Text:\n\"\"\"\n{text}\n\"\"\"")
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Ask the model to translate `text` into `language`.
pub fn translation_prompt(text: &str, language: &str) -> String {
    format!(
        "Translate the following text into {language}. \
Preserve the original tone, formatting and line breaks. \
Respond with only the translated text, without any commentary or explanation.\n\n{}",
        fenced(text)
    )
}

// ---------------------------------------------------------------------------
// Built-in actions
// ---------------------------------------------------------------------------

/// Rewrite actions that ship with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinAction {
    FixGrammar,
    Formal,
    Informal,
    Friendly,
    Summarize,
    Shorten,
    Expand,
}

/// Suffix tokens for [`BuiltinAction`]s, in display order.
pub const BUILTIN_ACTIONS: &[(&str, BuiltinAction)] = &[
    ("fix", BuiltinAction::FixGrammar),
    ("formal", BuiltinAction::Formal),
    ("informal", BuiltinAction::Informal),
    ("friendly", BuiltinAction::Friendly),
    ("summarize", BuiltinAction::Summarize),
    ("summary", BuiltinAction::Summarize),
    ("shorten", BuiltinAction::Shorten),
    ("expand", BuiltinAction::Expand),
];

impl BuiltinAction {
    /// Look up a suffix token, ignoring case.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        BUILTIN_ACTIONS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, action)| *action)
    }

    fn instruction(&self) -> &'static str {
        match self {
            BuiltinAction::FixGrammar => {
                "Correct the spelling, grammar and punctuation of the following text. \
Keep its language, meaning and style unchanged."
            }
            BuiltinAction::Formal => {
                "Rewrite the following text in a formal, professional tone. \
Keep its language and meaning."
            }
            BuiltinAction::Informal => {
                "Rewrite the following text in a casual, informal tone. \
Keep its language and meaning."
            }
            BuiltinAction::Friendly => {
                "Rewrite the following text so it sounds warm and friendly. \
Keep its language and meaning."
            }
            BuiltinAction::Summarize => {
                "Summarize the following text, keeping only the key points. \
Write the summary in the same language as the text."
            }
            BuiltinAction::Shorten => {
                "Make the following text shorter and more concise without losing its meaning. \
Keep its language."
            }
            BuiltinAction::Expand => {
                "Expand the following text with more detail and context while keeping its intent. \
Keep its language."
            }
        }
    }

    /// Full prompt for `text`.
    pub fn prompt(&self, text: &str) -> String {
        format!(
            "{} {}\n\n{}",
            self.instruction(),
            ANSWER_ONLY,
            fenced(text)
        )
    }
}

// ---------------------------------------------------------------------------
// Custom actions
// ---------------------------------------------------------------------------

/// Placeholder a custom template uses for the selection.
pub const TEXT_PLACEHOLDER: &str = "${text}";

/// Fill a user template with `text`.
///
/// The first `${text}` is replaced. When the result does not contain `text`
/// verbatim (no placeholder, or one the model would not see as-is), the raw
/// template is sent with the text fenced after it so the selection is never
/// dropped.
pub fn custom_prompt(template: &str, text: &str) -> String {
    let filled = template.replacen(TEXT_PLACEHOLDER, text, 1);
    if filled.contains(text) {
        filled
    } else {
        format!("{template}\n\n{}", fenced(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_prompt_names_language_and_fences_text() {
        let prompt = translation_prompt("Olá mundo", "English");
        assert!(prompt.contains("into English"));
        assert!(prompt.contains("\"\"\"\nOlá mundo\n\"\"\""));
        assert!(prompt.contains("only the translated text"));
    }

    #[test]
    fn every_builtin_token_resolves_and_embeds_text() {
        for (token, action) in BUILTIN_ACTIONS {
            assert_eq!(BuiltinAction::from_token(token), Some(*action));
            assert!(action.prompt("payload 42").contains("payload 42"));
        }
    }

    #[test]
    fn builtin_tokens_ignore_case() {
        assert_eq!(BuiltinAction::from_token("FIX"), Some(BuiltinAction::FixGrammar));
        assert_eq!(BuiltinAction::from_token("Summary"), Some(BuiltinAction::Summarize));
        assert_eq!(BuiltinAction::from_token("rewrite"), None);
    }

    #[test]
    fn custom_placeholder_is_substituted_once() {
        let prompt = custom_prompt("Reply to: ${text} (not ${text})", "hi there");
        assert_eq!(prompt, "Reply to: hi there (not ${text})");
    }

    #[test]
    fn custom_template_without_placeholder_appends_text() {
        let prompt = custom_prompt("Write a haiku about it.", "autumn rain");
        assert!(prompt.starts_with("Write a haiku about it."));
        assert!(prompt.ends_with("Text:\n\"\"\"\nautumn rain\n\"\"\""));
    }

    #[test]
    fn custom_prompt_always_contains_payload() {
        let templates = [
            "${text}",
            "Translate ${text} to Klingon",
            "no placeholder at all",
            "${TEXT} wrong case",
            "",
        ];
        let payloads = ["hello", "multi\nline", "${text}", "ünïcødé", ""];
        for template in templates {
            for payload in payloads {
                let prompt = custom_prompt(template, payload);
                assert!(
                    prompt.contains(payload),
                    "template {template:?} dropped payload {payload:?}"
                );
            }
        }
    }
}
