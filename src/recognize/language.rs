//! The fixed set of locales the recognition backends understand.

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Locale tags supported by both recognition strategies.
///
/// The set is closed: the speech-to-text backend is configured with exactly
/// these alternative codes and the language keyboard offers exactly these
/// choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    EnUs,
    UkUa,
    RuRu,
}

impl Language {
    /// All supported locales, in keyboard/tally order.
    pub const ALL: [Language; 3] = [Language::EnUs, Language::UkUa, Language::RuRu];

    /// The wire-format locale tag.
    pub fn code(self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::UkUa => "uk-UA",
            Language::RuRu => "ru-RU",
        }
    }

    /// Flag glyph shown on the language keyboard and entry cards.
    pub fn flag(self) -> &'static str {
        match self {
            Language::EnUs => "🇺🇸",
            Language::UkUa => "🇺🇦",
            Language::RuRu => "🇷🇺",
        }
    }

    /// Parse a locale tag.
    ///
    /// The speech-to-text API reports codes in lowercase (`en-us`), so the
    /// match is case-insensitive.
    pub fn from_code(code: &str) -> Option<Language> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    /// Parse a language choice typed or tapped by the user.
    ///
    /// Keyboard buttons carry a decorative flag prefix (`🇺🇸 en-US`); only
    /// the final whitespace-separated token is significant.
    pub fn from_user_input(input: &str) -> Option<Language> {
        input.split_whitespace().last().and_then(Language::from_code)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn lowercase_wire_form_parses() {
        assert_eq!(Language::from_code("en-us"), Some(Language::EnUs));
        assert_eq!(Language::from_code("uk-ua"), Some(Language::UkUa));
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(Language::from_code("fr-FR"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn keyboard_input_strips_flag_prefix() {
        assert_eq!(Language::from_user_input("🇺🇸 en-US"), Some(Language::EnUs));
        assert_eq!(Language::from_user_input("en-US"), Some(Language::EnUs));
        assert_eq!(Language::from_user_input("🇺🇦 uk-UA"), Some(Language::UkUa));
    }

    #[test]
    fn nonsense_keyboard_input_is_rejected() {
        assert_eq!(Language::from_user_input("🇺🇸"), None);
        assert_eq!(Language::from_user_input("whatever"), None);
    }
}
