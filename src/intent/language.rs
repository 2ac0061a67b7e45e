//! Target languages and the `::suffix` alias table.

/// Languages the alias table can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLanguage {
    PortugueseBrazil,
    PortuguesePortugal,
    English,
    Spanish,
    Chinese,
}

impl TargetLanguage {
    /// Name used inside prompts.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            TargetLanguage::PortugueseBrazil => "Portuguese (Brazil)",
            TargetLanguage::PortuguesePortugal => "Portuguese (Portugal)",
            TargetLanguage::English => "English",
            TargetLanguage::Spanish => "Spanish",
            TargetLanguage::Chinese => "Chinese",
        }
    }
}

/// Every accepted suffix spelling, in display order.
pub const LANGUAGE_ALIASES: &[(&str, TargetLanguage)] = &[
    ("pt", TargetLanguage::PortuguesePortugal),
    ("ptbr", TargetLanguage::PortugueseBrazil),
    ("br", TargetLanguage::PortugueseBrazil),
    ("portugues", TargetLanguage::PortugueseBrazil),
    ("en", TargetLanguage::English),
    ("eng", TargetLanguage::English),
    ("english", TargetLanguage::English),
    ("zh", TargetLanguage::Chinese),
    ("chines", TargetLanguage::Chinese),
    ("chinese", TargetLanguage::Chinese),
    ("es", TargetLanguage::Spanish),
    ("esp", TargetLanguage::Spanish),
    ("espanol", TargetLanguage::Spanish),
    ("spanish", TargetLanguage::Spanish),
];

/// Look up a suffix token, ignoring case.
pub fn language_for_alias(token: &str) -> Option<TargetLanguage> {
    let token = token.to_lowercase();
    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, lang)| *lang)
}

/// Turn the configured default-language label into the name sent to the model.
///
/// Labels saved by older builds in Portuguese are mapped to their English
/// names; anything unrecognised is passed through unchanged.
pub fn default_language_name(label: &str) -> String {
    let known = match label.trim().to_lowercase().as_str() {
        "português brasileiro" | "portugues brasileiro" | "portuguese (brazil)" => {
            Some(TargetLanguage::PortugueseBrazil)
        }
        "portuguese (portugal)" => Some(TargetLanguage::PortuguesePortugal),
        "inglês" | "ingles" | "english" => Some(TargetLanguage::English),
        "espanhol" | "spanish" => Some(TargetLanguage::Spanish),
        "chinês" | "chines" | "chinese" => Some(TargetLanguage::Chinese),
        _ => None,
    };

    match known {
        Some(lang) => lang.prompt_name().to_string(),
        None => label.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_alias_resolves() {
        for (alias, lang) in LANGUAGE_ALIASES {
            assert_eq!(language_for_alias(alias), Some(*lang), "alias {alias}");
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!(language_for_alias("EN"), Some(TargetLanguage::English));
        assert_eq!(language_for_alias("PtBr"), Some(TargetLanguage::PortugueseBrazil));
        assert_eq!(language_for_alias("Espanol"), Some(TargetLanguage::Spanish));
        assert_eq!(language_for_alias("ZH"), Some(TargetLanguage::Chinese));
    }

    #[test]
    fn portuguese_family() {
        for alias in ["ptbr", "br", "portugues"] {
            assert_eq!(language_for_alias(alias), Some(TargetLanguage::PortugueseBrazil));
        }
        assert_eq!(language_for_alias("pt"), Some(TargetLanguage::PortuguesePortugal));
    }

    #[test]
    fn unlisted_tokens_do_not_resolve() {
        for token in ["fr", "de", "portuguese", "", "en_us"] {
            assert_eq!(language_for_alias(token), None, "token {token}");
        }
    }

    #[test]
    fn legacy_labels_are_normalised() {
        assert_eq!(default_language_name("Português Brasileiro"), "Portuguese (Brazil)");
        assert_eq!(default_language_name("Inglês"), "English");
        assert_eq!(default_language_name("Espanhol"), "Spanish");
        assert_eq!(default_language_name("Chinês"), "Chinese");
    }

    #[test]
    fn unknown_labels_pass_through() {
        assert_eq!(default_language_name("French"), "French");
        assert_eq!(default_language_name(" Japanese "), "Japanese");
    }
}
