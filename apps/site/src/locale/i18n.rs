//! Label tables. Loaded once at startup from `<i18n dir>/<locale>.json` (flat
//! key → string maps), layered over built-in defaults.

use std::collections::HashMap;
use std::path::Path;

use tracing::{error, info};

use crate::locale::Locale;

type Table = HashMap<String, String>;

const EN: &[(&str, &str)] = &[
    ("education", "Education"),
    ("experience", "Experience"),
    ("skills", "Skills"),
    ("projects", "Projects"),
    ("awards", "Awards"),
    ("languages", "Languages"),
    ("choose_source", "Choose a CV..."),
    ("print", "Print"),
    ("load_error", "The CV could not be loaded."),
];

const FR: &[(&str, &str)] = &[
    ("education", "Formation"),
    ("experience", "Expérience"),
    ("skills", "Compétences"),
    ("projects", "Projets"),
    ("awards", "Distinctions"),
    ("languages", "Langues"),
    ("choose_source", "Choisir un CV..."),
    ("print", "Imprimer"),
    ("load_error", "Le CV n'a pas pu être chargé."),
];

#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<Locale, Table>,
}

impl Translations {
    pub fn builtin() -> Self {
        let tables = Locale::SUPPORTED
            .into_iter()
            .map(|locale| {
                let pairs = match locale {
                    Locale::En => EN,
                    Locale::Fr => FR,
                };
                let table = pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (locale, table)
            })
            .collect();
        Self { tables }
    }

    /// Reads every supported locale's file from `dir`. A missing or invalid file
    /// is logged and leaves the built-in labels for that locale in place.
    pub async fn load(dir: &Path) -> Self {
        let mut translations = Self::builtin();
        for locale in Locale::SUPPORTED {
            let path = dir.join(format!("{}.json", locale.code()));
            let overlay = match tokio::fs::read_to_string(&path).await {
                Ok(text) => serde_json::from_str::<Table>(&text).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match overlay {
                Ok(overlay) => {
                    info!("Loaded {} labels from {}", overlay.len(), path.display());
                    translations.tables.entry(locale).or_default().extend(overlay);
                }
                Err(e) => error!("Failed to load translations from {}: {e}", path.display()),
            }
        }
        translations
    }

    /// Label lookups bound to one already-selected locale.
    pub fn labels(&self, locale: Locale) -> Labels<'_> {
        Labels {
            table: self.tables.get(&locale),
            locale,
        }
    }
}

/// Read-only view of one locale's labels. Unknown keys render as the key.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    table: Option<&'a Table>,
    locale: Locale,
}

impl<'a> Labels<'a> {
    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn t<'k>(&self, key: &'k str) -> &'k str
    where
        'a: 'k,
    {
        self.table
            .and_then(|t| t.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_section_keys_in_every_locale() {
        let translations = Translations::builtin();
        for locale in Locale::SUPPORTED {
            let labels = translations.labels(locale);
            for key in ["education", "experience", "skills", "projects", "awards", "languages"] {
                assert_ne!(labels.t(key), key, "{locale} is missing {key}");
            }
        }
        assert_eq!(translations.labels(Locale::Fr).t("skills"), "Compétences");
    }

    #[test]
    fn test_unknown_key_renders_as_key() {
        let translations = Translations::builtin();
        assert_eq!(translations.labels(Locale::En).t("nope"), "nope");
    }

    #[tokio::test]
    async fn test_files_override_builtin_and_bad_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"skills": "Tooling", "extra": "More"}"#)
            .unwrap();
        std::fs::write(dir.path().join("fr.json"), "not json").unwrap();

        let translations = Translations::load(dir.path()).await;
        let en = translations.labels(Locale::En);
        assert_eq!(en.t("skills"), "Tooling");
        assert_eq!(en.t("extra"), "More");
        assert_eq!(en.t("education"), "Education");
        assert_eq!(translations.labels(Locale::Fr).t("skills"), "Compétences");
    }
}
