//! Display language selection.
//!
//! The locale is decided once per document load, before any label is looked up:
//! document metadata, then the persisted preference, then the runtime language,
//! then the fixed fallback. Every candidate is normalized to its first two
//! characters, lowercased.

pub mod i18n;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::model::Meta;

pub use i18n::{Labels, Translations};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Fr,
}

impl Locale {
    pub const SUPPORTED: [Locale; 2] = [Locale::En, Locale::Fr];
    pub const FALLBACK: Locale = Locale::Fr;

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    /// Maps any language tag (`"en-US"`, `"FR"`, `"fr_CA"`) to a supported locale.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let prefix: String = tag.trim().chars().take(2).collect::<String>().to_lowercase();
        Locale::SUPPORTED.into_iter().find(|l| l.code() == prefix)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Picks the display locale. Total: unsupported or missing inputs fall through.
pub fn select_locale(meta: &Meta, persisted: Option<&str>, runtime: Option<&str>) -> Locale {
    meta.declared_locale()
        .and_then(Locale::from_tag)
        .or_else(|| persisted.and_then(Locale::from_tag))
        .or_else(|| runtime.and_then(Locale::from_tag))
        .unwrap_or(Locale::FALLBACK)
}

/// First language tag of an `Accept-Language` header value.
pub fn primary_language(accept_language: &str) -> Option<&str> {
    accept_language
        .split(',')
        .next()
        .map(|tag| tag.split(';').next().unwrap_or(tag).trim())
        .filter(|tag| !tag.is_empty() && *tag != "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(locale: Option<&str>) -> Meta {
        Meta {
            locale: locale.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_tag_normalizes() {
        assert_eq!(Locale::from_tag("en-US"), Some(Locale::En));
        assert_eq!(Locale::from_tag(" FR "), Some(Locale::Fr));
        assert_eq!(Locale::from_tag("fra"), Some(Locale::Fr));
        assert_eq!(Locale::from_tag("de"), None);
        assert_eq!(Locale::from_tag("e"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_unsupported_meta_uses_persisted() {
        assert_eq!(
            select_locale(&meta(Some("de")), Some("en"), Some("fr-FR")),
            Locale::En
        );
    }

    #[test]
    fn test_selection_is_total_and_follows_precedence() {
        let metas = [Some("en"), Some("de"), None];
        let persisted = [Some("fr"), Some("es"), None];
        let runtimes = [Some("en-GB"), Some("ja")];

        for m in metas {
            for p in persisted {
                for r in runtimes {
                    let expected = m
                        .and_then(Locale::from_tag)
                        .or(p.and_then(Locale::from_tag))
                        .or(r.and_then(Locale::from_tag))
                        .unwrap_or(Locale::Fr);
                    let got = select_locale(&meta(m), p, r);
                    assert_eq!(got, expected, "meta={m:?} persisted={p:?} runtime={r:?}");
                    assert!(Locale::SUPPORTED.contains(&got));
                    // Deterministic.
                    assert_eq!(got, select_locale(&meta(m), p, r));
                }
            }
        }
    }

    #[test]
    fn test_precedence_examples() {
        assert_eq!(select_locale(&meta(Some("en")), Some("fr"), Some("fr")), Locale::En);
        assert_eq!(select_locale(&meta(None), Some("fr"), Some("en")), Locale::Fr);
        assert_eq!(select_locale(&meta(None), None, Some("en-US")), Locale::En);
        assert_eq!(select_locale(&meta(None), Some("xx"), Some("ja")), Locale::Fr);
    }

    #[test]
    fn test_meta_lang_alias_is_honoured() {
        let meta = Meta {
            lang: Some("EN".to_string()),
            ..Default::default()
        };
        assert_eq!(select_locale(&meta, Some("fr"), None), Locale::En);
    }

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("fr-CH, fr;q=0.9, en;q=0.8"), Some("fr-CH"));
        assert_eq!(primary_language("en;q=0.5"), Some("en"));
        assert_eq!(primary_language("*"), None);
        assert_eq!(primary_language(""), None);
    }
}
