//! UI string translation.
//!
//! A [`Locale`] is an explicit context value; whoever renders owns one and
//! passes it along. Lookups use dotted paths such as `pagination.next` and
//! fall back to the path itself when no translation exists. The strings live
//! in `locales/*.yml`.

use std::fmt;
use std::str::FromStr;

use rust_i18n::t;

/// Supported UI languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    En,
    Fr,
    Es,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Es];

    /// Two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Es => "es",
        }
    }

    /// Parses a language tag by its primary subtag (`fr-CA` is French).
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|l| l.code() == primary)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported language '{s}' (expected en, fr or es)"))
    }
}

/// Current language plus translation lookup.
///
/// # Example
///
/// ```
/// use gridline_lib::locale::{Language, Locale};
///
/// let mut locale = Locale::default();
/// assert_eq!(locale.translate("pagination.next"), "Next page");
///
/// locale.set_language(Language::Fr);
/// assert_eq!(locale.translate("pagination.next"), "Page suivante");
/// assert_eq!(locale.translate("pagination.missing"), "pagination.missing");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Locale {
    language: Language,
}

impl Locale {
    /// Creates a locale for `language`.
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// The current language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Switches language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Translates a dotted key, or returns the key when unknown.
    pub fn translate(&self, key: &str) -> String {
        let code = self.language.code();
        let text = t!(key, locale = code);
        // Misses come back as the key, possibly prefixed with the locale.
        let missed = text == key
            || text
                .strip_prefix(code)
                .and_then(|rest| rest.strip_prefix('.'))
                == Some(key);
        if missed { key.to_string() } else { text.into_owned() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 8] = [
        "multiselect.placeholder",
        "multiselect.empty",
        "datatable.noResults",
        "pagination.showing",
        "pagination.of",
        "filters.resetAll",
        "export.exportAsCSV",
        "export.exportAsExcel",
    ];

    #[test]
    fn test_parse_primary_subtag() {
        assert_eq!(Language::parse("fr-CA"), Some(Language::Fr));
        assert_eq!(Language::parse("ES"), Some(Language::Es));
        assert_eq!(Language::parse("de"), None);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn test_fallback_to_key() {
        let locale = Locale::new(Language::Es);
        assert_eq!(locale.translate("pagination.showing"), "Mostrando");
        assert_eq!(locale.translate("pagination"), "pagination");
        assert_eq!(locale.translate("nope.nothing"), "nope.nothing");
        assert_eq!(locale.translate("Name"), "Name");
    }

    #[test]
    fn test_every_language_covers_known_keys() {
        for language in Language::ALL {
            let locale = Locale::new(language);
            for key in KEYS {
                assert_ne!(locale.translate(key), key, "{language} lacks {key}");
            }
        }
        assert_eq!(Locale::new(Language::Fr).translate("pagination.of"), "sur");
        assert_eq!(Locale::new(Language::Es).translate("multiselect.empty"), "(Vacío)");
    }

    #[test]
    fn test_locale_files_match_languages() {
        let mut available = rust_i18n::available_locales!();
        available.sort();
        let mut expected: Vec<&str> = Language::ALL.iter().map(Language::code).collect();
        expected.sort();
        assert_eq!(available, expected);
    }
}
