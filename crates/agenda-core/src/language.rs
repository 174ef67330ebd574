//! Language reference data.
//!
//! Languages are read-mostly data: loaded once at process startup into an
//! immutable [`LanguageRegistry`] snapshot and shared by reference, so
//! concurrent readers need no locking.

use std::collections::BTreeMap;

use crate::document::{Document, DocumentKey, Kind};
use crate::error::DomainError;
use crate::store::{DocumentStore, Query};

/// A display language of the agenda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// ISO-style language code, e.g. `"de"` or `"fr"`.
    pub code: String,
    /// Native display name.
    pub name: String,
    /// German display name.
    pub german_name: String,
    /// Weekday names, Monday first, seven entries.
    pub days_of_week: Vec<String>,
    /// Whether the script runs right to left.
    pub is_right_to_left: bool,
    /// Whether the language is shown in the public language switcher.
    pub is_in_agenda: bool,
    /// Whether the newsletter uses a language-specific format.
    pub has_specific_format: bool,
}

impl Language {
    /// Exports this language into a document keyed by its code.
    #[must_use]
    pub fn to_document(&self) -> Document {
        Document::new(DocumentKey::Named(Kind::Language, self.code.clone()))
            .with("code", self.code.as_str())
            .with("name", self.name.as_str())
            .with("german_name", self.german_name.as_str())
            .with("days_of_week", self.days_of_week.clone())
            .with("is_right_to_left", self.is_right_to_left)
            .with("is_in_agenda", self.is_in_agenda)
            .with("has_specific_format", self.has_specific_format)
    }

    /// Parses a language from a document, defaulting absent fields.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let code = match &document.key {
            DocumentKey::Named(_, name) => name.clone(),
            _ => document.str_or_default("code"),
        };
        Self {
            code,
            name: document.str_or_default("name"),
            german_name: document.str_or_default("german_name"),
            days_of_week: document.str_array("days_of_week"),
            is_right_to_left: document.bool_or_default("is_right_to_left"),
            is_in_agenda: document.bool_or_default("is_in_agenda"),
            has_specific_format: document.bool_or_default("has_specific_format"),
        }
    }
}

fn days(names: [&str; 7]) -> Vec<String> {
    names.iter().map(|&d| d.to_owned()).collect()
}

/// Immutable snapshot of the configured languages, including which one is
/// the canonical (source-of-truth) language.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: BTreeMap<String, Language>,
    canonical: String,
}

impl LanguageRegistry {
    /// Builds a registry from a language list and the canonical code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the canonical code is not in
    /// the list.
    pub fn new(
        languages: Vec<Language>,
        canonical: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let canonical = canonical.into();
        let languages: BTreeMap<String, Language> = languages
            .into_iter()
            .map(|language| (language.code.clone(), language))
            .collect();
        if !languages.contains_key(&canonical) {
            return Err(DomainError::Validation(vec![format!(
                "canonical language '{canonical}' is not configured"
            )]));
        }
        Ok(Self {
            languages,
            canonical,
        })
    }

    /// Returns the built-in default set with German as the canonical
    /// language, used when the store holds no language documents.
    #[must_use]
    pub fn builtin() -> Self {
        let languages = vec![
            Language {
                code: "de".to_owned(),
                name: "Deutsch".to_owned(),
                german_name: "Deutsch".to_owned(),
                days_of_week: days([
                    "Montag",
                    "Dienstag",
                    "Mittwoch",
                    "Donnerstag",
                    "Freitag",
                    "Samstag",
                    "Sonntag",
                ]),
                is_right_to_left: false,
                is_in_agenda: true,
                has_specific_format: false,
            },
            Language {
                code: "en".to_owned(),
                name: "English".to_owned(),
                german_name: "Englisch".to_owned(),
                days_of_week: days([
                    "Monday",
                    "Tuesday",
                    "Wednesday",
                    "Thursday",
                    "Friday",
                    "Saturday",
                    "Sunday",
                ]),
                is_right_to_left: false,
                is_in_agenda: true,
                has_specific_format: false,
            },
            Language {
                code: "fr".to_owned(),
                name: "Français".to_owned(),
                german_name: "Französisch".to_owned(),
                days_of_week: days([
                    "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
                ]),
                is_right_to_left: false,
                is_in_agenda: true,
                has_specific_format: false,
            },
            Language {
                code: "ar".to_owned(),
                name: "العربية".to_owned(),
                german_name: "Arabisch".to_owned(),
                days_of_week: days([
                    "الاثنين",
                    "الثلاثاء",
                    "الأربعاء",
                    "الخميس",
                    "الجمعة",
                    "السبت",
                    "الأحد",
                ]),
                is_right_to_left: true,
                is_in_agenda: true,
                has_specific_format: true,
            },
        ];
        let languages = languages
            .into_iter()
            .map(|language| (language.code.clone(), language))
            .collect();
        Self {
            languages,
            canonical: "de".to_owned(),
        }
    }

    /// Loads the registry from the store's language documents, falling back
    /// to the built-in set when none exist.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure and
    /// `DomainError::Validation` when the canonical code is missing from
    /// the loaded set.
    pub async fn load(
        store: &dyn DocumentStore,
        canonical: &str,
    ) -> Result<Self, DomainError> {
        let page = store.query(&Query::new(Kind::Language, "code")).await?;
        if page.documents.is_empty() {
            tracing::info!("no language documents in store, using built-in set");
            let builtin = Self::builtin();
            if canonical == builtin.canonical {
                return Ok(builtin);
            }
            return Self::new(builtin.languages.into_values().collect(), canonical);
        }
        let languages = page
            .documents
            .iter()
            .map(Language::from_document)
            .collect();
        Self::new(languages, canonical)
    }

    /// Looks up a language by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Language> {
        self.languages.get(code)
    }

    /// Returns the canonical language code.
    #[must_use]
    pub fn canonical_code(&self) -> &str {
        &self.canonical
    }

    /// Returns the canonical language.
    ///
    /// # Panics
    ///
    /// Never panics: construction guarantees the canonical code is present.
    #[must_use]
    pub fn canonical(&self) -> &Language {
        self.languages
            .get(&self.canonical)
            .expect("canonical language is validated at construction")
    }

    /// Iterates over all configured languages, ordered by code.
    pub fn all(&self) -> impl Iterator<Item = &Language> {
        self.languages.values()
    }
}
