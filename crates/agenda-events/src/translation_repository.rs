//! Translation storage and language fallback resolution.

use std::sync::Arc;

use agenda_core::document::Kind;
use agenda_core::error::DomainError;
use agenda_core::store::DocumentStore;

use crate::event::EventId;
use crate::translation::Translation;

/// Repository for per-(event, language) translation documents, including
/// the fallback resolution used by the feed and the newsletter exporter.
#[derive(Clone)]
pub struct TranslationRepository {
    store: Arc<dyn DocumentStore>,
    canonical: String,
}

impl TranslationRepository {
    /// Creates a repository over `store` with the given canonical language
    /// code.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, canonical: impl Into<String>) -> Self {
        Self {
            store,
            canonical: canonical.into(),
        }
    }

    /// Returns the canonical language code.
    #[must_use]
    pub fn canonical_code(&self) -> &str {
        &self.canonical
    }

    /// Upserts a translation by its composite key, overwriting silently
    /// (no optimistic concurrency).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the translation is invalid
    /// or has no parent event id, and `DomainError::Store` on backend
    /// failure.
    pub async fn save(&self, translation: &Translation) -> Result<(), DomainError> {
        if !translation.validity().is_ok() {
            return Err(DomainError::Validation(
                translation.validity().errors().to_vec(),
            ));
        }
        let event_id = translation.event_id().ok_or_else(|| {
            DomainError::Validation(vec!["translation has no parent event".to_owned()])
        })?;
        self.store.put(&translation.to_document(event_id)).await?;
        Ok(())
    }

    /// Fetches the translation of one event in one language. A miss is
    /// `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn get(
        &self,
        event_id: EventId,
        lang: &str,
    ) -> Result<Option<Translation>, DomainError> {
        match self
            .store
            .get(&Translation::document_key(event_id, lang))
            .await
        {
            Ok(document) => Ok(Some(Translation::from_document(&document))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Fetches the mandatory canonical translation of an event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the canonical translation is
    /// missing. Callers treat this as a non-fatal data-quality warning:
    /// the event remains usable with empty text fields.
    pub async fn get_canonical(&self, event_id: EventId) -> Result<Translation, DomainError> {
        self.get(event_id, &self.canonical).await?.ok_or_else(|| {
            DomainError::not_found(
                Kind::Translation,
                Translation::document_key(event_id, &self.canonical).to_string(),
            )
        })
    }

    /// Resolves the best available translation for `lang`: the requested
    /// language when present, else the canonical one. Never reports "no
    /// translation" for an event that has at least a canonical
    /// translation. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` only when even the canonical
    /// translation is missing, and `DomainError::Store` on backend
    /// failure.
    pub async fn resolve(
        &self,
        event_id: EventId,
        lang: &str,
    ) -> Result<Translation, DomainError> {
        if lang != self.canonical {
            if let Some(translation) = self.get(event_id, lang).await? {
                return Ok(translation);
            }
        }
        self.get_canonical(event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use agenda_test_support::{FailingDocumentStore, InMemoryDocumentStore};

    fn repo(store: Arc<dyn DocumentStore>) -> TranslationRepository {
        TranslationRepository::new(store, "de")
    }

    fn translation(event_id: EventId, lang: &str, title: &str) -> Translation {
        Translation::new(Some(event_id), lang, title, "Text", "", "", "")
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips_by_composite_key() {
        let repo = repo(Arc::new(InMemoryDocumentStore::new()));
        repo.save(&translation(7, "fr", "Fête")).await.unwrap();

        let fetched = repo.get(7, "fr").await.unwrap().unwrap();
        assert_eq!(fetched.title(), "Fête");
        assert_eq!(repo.get(7, "it").await.unwrap(), None);
        assert_eq!(repo.get(8, "fr").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_silently() {
        let repo = repo(Arc::new(InMemoryDocumentStore::new()));
        repo.save(&translation(7, "de", "Alt")).await.unwrap();
        repo.save(&translation(7, "de", "Neu")).await.unwrap();

        let fetched = repo.get_canonical(7).await.unwrap();
        assert_eq!(fetched.title(), "Neu");
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_or_parentless_translations() {
        let repo = repo(Arc::new(InMemoryDocumentStore::new()));

        let invalid = Translation::new(Some(7), "de", "", "", "", "", "");
        assert!(matches!(
            repo.save(&invalid).await.unwrap_err(),
            DomainError::Validation(_)
        ));

        let parentless = Translation::new(None, "de", "Titel", "", "", "", "");
        assert!(matches!(
            repo.save(&parentless).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_canonical() {
        let repo = repo(Arc::new(InMemoryDocumentStore::new()));
        repo.save(&translation(7, "de", "Frühlingsfest")).await.unwrap();

        // No French translation: the German text is returned, not an error.
        let resolved = repo.resolve(7, "fr").await.unwrap();
        assert_eq!(resolved.lang(), "de");
        assert_eq!(resolved.title(), "Frühlingsfest");

        // Idempotent.
        let again = repo.resolve(7, "fr").await.unwrap();
        assert_eq!(again, resolved);
    }

    #[tokio::test]
    async fn test_resolve_prefers_the_requested_language() {
        let repo = repo(Arc::new(InMemoryDocumentStore::new()));
        repo.save(&translation(7, "de", "Frühlingsfest")).await.unwrap();
        repo.save(&translation(7, "fr", "Fête du printemps")).await.unwrap();

        let resolved = repo.resolve(7, "fr").await.unwrap();
        assert_eq!(resolved.lang(), "fr");
        assert_eq!(resolved.title(), "Fête du printemps");
    }

    #[tokio::test]
    async fn test_missing_canonical_is_not_found() {
        let repo = repo(Arc::new(InMemoryDocumentStore::new()));
        assert!(repo.get_canonical(7).await.unwrap_err().is_not_found());
        assert!(repo.resolve(7, "fr").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_store_failures_are_not_swallowed_as_misses() {
        let repo = repo(Arc::new(FailingDocumentStore));
        assert!(matches!(
            repo.get(7, "fr").await.unwrap_err(),
            DomainError::Store(_)
        ));
    }
}
