//! Shared application state.

use std::sync::Arc;

use agenda_core::clock::Clock;
use agenda_core::language::LanguageRegistry;
use agenda_core::store::DocumentStore;
use agenda_events::event_repository::EventRepository;
use agenda_events::newsletter::{NewsletterAssembler, NewsletterRenderer};
use agenda_events::subscriber::SubscriberRepository;
use agenda_events::translation_repository::TranslationRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub events: EventRepository,
    pub translations: TranslationRepository,
    pub subscribers: SubscriberRepository,
    pub newsletter: NewsletterAssembler,
    pub languages: Arc<LanguageRegistry>,
    pub clock: Arc<dyn Clock>,
    /// Public base URL used for links in rendered newsletters.
    pub base_url: String,
}

impl AppState {
    /// Wires the repositories and the newsletter assembler over one store.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        languages: Arc<LanguageRegistry>,
        clock: Arc<dyn Clock>,
        renderer: Arc<dyn NewsletterRenderer>,
        base_url: impl Into<String>,
    ) -> Self {
        let canonical = languages.canonical_code().to_owned();
        let events = EventRepository::new(store.clone(), canonical.clone());
        let translations = TranslationRepository::new(store.clone(), canonical);
        let subscribers = SubscriberRepository::new(store);
        let newsletter = NewsletterAssembler::new(
            events.clone(),
            translations.clone(),
            languages.clone(),
            renderer,
        );
        Self {
            events,
            translations,
            subscribers,
            newsletter,
            languages,
            clock,
            base_url: base_url.into(),
        }
    }
}
