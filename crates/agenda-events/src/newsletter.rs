//! Monthly newsletter assembly.
//!
//! The assembler loads one month's events once in the canonical language,
//! then produces one rendering per registered language by cloning the
//! canonical collection and re-hydrating the clone's descriptions. The
//! canonical rendering has no translated collection at all; every other
//! language renders both, so the template can show the translated text
//! next to the canonical one.

use std::collections::BTreeMap;
use std::sync::Arc;

use agenda_core::error::DomainError;
use agenda_core::language::LanguageRegistry;

use crate::collection::Events;
use crate::event_repository::EventRepository;
use crate::subscriber::Subscriber;
use crate::translation_repository::TranslationRepository;

/// Everything a renderer needs to produce one language's newsletter.
pub struct NewsletterRequest<'a> {
    /// The month's events with canonical descriptions.
    pub canonical: &'a Events,
    /// The same events with descriptions for [`lang`](Self::lang), or
    /// `None` when rendering the canonical language itself.
    pub translated: Option<&'a Events>,
    /// Language code this rendering is for.
    pub lang: &'a str,
    /// Public base URL used for event and unsubscribe links.
    pub base_url: &'a str,
    pub year: i32,
    pub month: u32,
    /// The addressee, when rendering a personalized copy.
    pub subscriber: Option<&'a Subscriber>,
}

/// Turns an assembled request into the newsletter body. Implementations
/// own the markup; the assembler owns the data.
pub trait NewsletterRenderer: Send + Sync {
    fn render(&self, request: &NewsletterRequest<'_>) -> String;
}

/// Builds per-language newsletter bodies for one calendar month.
#[derive(Clone)]
pub struct NewsletterAssembler {
    events: EventRepository,
    translations: TranslationRepository,
    languages: Arc<LanguageRegistry>,
    renderer: Arc<dyn NewsletterRenderer>,
}

impl NewsletterAssembler {
    #[must_use]
    pub fn new(
        events: EventRepository,
        translations: TranslationRepository,
        languages: Arc<LanguageRegistry>,
        renderer: Arc<dyn NewsletterRenderer>,
    ) -> Self {
        Self {
            events,
            translations,
            languages,
            renderer,
        }
    }

    /// Renders the month's newsletter in every registered language,
    /// keyed by language code. The canonical event set is loaded exactly
    /// once; per-language work is a clone plus description re-hydration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an impossible month and
    /// `DomainError::Store` on backend failure.
    pub async fn render_month(
        &self,
        year: i32,
        month: u32,
        base_url: &str,
        subscriber: Option<&Subscriber>,
    ) -> Result<BTreeMap<String, String>, DomainError> {
        let canonical_code = self.languages.canonical_code();
        let canonical = Events::for_month(
            &self.events,
            &self.translations,
            year,
            month,
            canonical_code,
        )
        .await?;

        let mut bodies = BTreeMap::new();
        for language in self.languages.all() {
            let translated = if language.code == canonical_code {
                None
            } else {
                let mut clone = canonical.clone();
                clone
                    .load_descriptions(&language.code, &self.translations)
                    .await?;
                Some(clone)
            };
            let request = NewsletterRequest {
                canonical: &canonical,
                translated: translated.as_ref(),
                lang: &language.code,
                base_url,
                year,
                month,
                subscriber,
            };
            bodies.insert(language.code.clone(), self.renderer.render(&request));
        }
        Ok(bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use agenda_test_support::InMemoryDocumentStore;
    use chrono::NaiveDate;

    use crate::event::Event;
    use crate::translation::Translation;

    /// Records what it was asked to render and emits the titles it saw.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl NewsletterRenderer for RecordingRenderer {
        fn render(&self, request: &NewsletterRequest<'_>) -> String {
            self.calls
                .lock()
                .unwrap()
                .push((request.lang.to_owned(), request.translated.is_some()));
            let source = request.translated.unwrap_or(request.canonical);
            source
                .sorted()
                .iter()
                .filter_map(|e| e.description().map(|d| d.title.clone()))
                .collect::<Vec<_>>()
                .join("|")
        }
    }

    async fn assembler() -> (NewsletterAssembler, Arc<RecordingRenderer>) {
        let store: Arc<dyn agenda_core::store::DocumentStore> =
            Arc::new(InMemoryDocumentStore::new());
        let events = EventRepository::new(store.clone(), "de");
        let translations = TranslationRepository::new(store, "de");

        let date: NaiveDate = "2024-03-15".parse().unwrap();
        let event = Event::new(Some(date), "Kanzlei", "", "", BTreeSet::new());
        let canonical = Translation::new(None, "de", "Frühlingsfest", "Text", "", "", "");
        let (created, _) = events.create(event, canonical).await.unwrap();
        let french = Translation::new(
            created.id(),
            "fr",
            "Fête du printemps",
            "",
            "",
            "",
            "",
        );
        translations.save(&french).await.unwrap();

        let languages = Arc::new(LanguageRegistry::builtin());
        let renderer = Arc::new(RecordingRenderer::default());
        let assembler = NewsletterAssembler::new(
            events,
            translations,
            languages,
            renderer.clone(),
        );
        (assembler, renderer)
    }

    #[tokio::test]
    async fn test_renders_every_language_with_fallback() {
        let (assembler, _) = assembler().await;
        let bodies = assembler
            .render_month(2024, 3, "https://example.ch", None)
            .await
            .unwrap();

        assert_eq!(bodies["de"], "Frühlingsfest");
        assert_eq!(bodies["fr"], "Fête du printemps");
        // No Arabic or English translation: canonical text fills in.
        assert_eq!(bodies["ar"], "Frühlingsfest");
        assert_eq!(bodies["en"], "Frühlingsfest");
    }

    #[tokio::test]
    async fn test_canonical_language_renders_without_translated_collection() {
        let (assembler, renderer) = assembler().await;
        assembler
            .render_month(2024, 3, "https://example.ch", None)
            .await
            .unwrap();

        let calls = renderer.calls.lock().unwrap();
        for (lang, has_translated) in calls.iter() {
            assert_eq!(*has_translated, lang != "de", "language {lang}");
        }
    }

    #[tokio::test]
    async fn test_impossible_month_is_rejected() {
        let (assembler, _) = assembler().await;
        let err = assembler
            .render_month(2024, 13, "https://example.ch", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
