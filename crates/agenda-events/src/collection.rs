//! In-memory ordered event collections.

use std::cmp::Ordering;

use agenda_core::error::DomainError;

use crate::event::{Event, EventDescription};
use crate::event_repository::EventRepository;
use crate::translation_repository::TranslationRepository;

/// An ordered, duplicate-free sequence of events for a bounded time
/// window, keyed by `(date, id)`. Cloning produces a deep copy; the clone
/// can be re-hydrated with a different language's descriptions, which is
/// how the newsletter renders one canonical event set in every language.
#[derive(Debug, Clone, Default)]
pub struct Events {
    items: Vec<Event>,
}

impl Events {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from events, sorting and dropping duplicates.
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut collection = Self::new();
        for event in events {
            collection.add(event);
        }
        collection
    }

    /// Inserts an event at its sort position. A duplicate (equal by event
    /// equality, i.e. same assigned id and date) is deterministically
    /// rejected; returns whether the event was inserted.
    pub fn add(&mut self, event: Event) -> bool {
        if self.items.iter().any(|existing| *existing == event) {
            return false;
        }
        let position = self
            .items
            .partition_point(|existing| existing.order(&event) != Ordering::Greater);
        self.items.insert(position, event);
        true
    }

    /// Returns the members in canonical `(date, id)` order. Never mutates.
    #[must_use]
    pub fn sorted(&self) -> &[Event] {
        &self.items
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the collection has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the members in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.items.iter()
    }

    /// Re-hydrates every member with the resolved translation for `lang`,
    /// overwriting only the description overlay; date, location and tags
    /// are untouched. Idempotent: applying the same language twice yields
    /// the same collection. A member without a canonical translation
    /// keeps an empty overlay (data-quality warning, not an error).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn load_descriptions(
        &mut self,
        lang: &str,
        translations: &TranslationRepository,
    ) -> Result<(), DomainError> {
        for event in &mut self.items {
            let Some(event_id) = event.id() else {
                continue;
            };
            match translations.resolve(event_id, lang).await {
                Ok(translation) => {
                    event.set_description(Some(EventDescription {
                        lang: translation.lang().to_owned(),
                        title: translation.title().to_owned(),
                        body: translation.body().to_owned(),
                    }));
                }
                Err(err) if err.is_not_found() => {
                    tracing::warn!(event_id, "event has no canonical translation");
                    event.set_description(None);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Loads the collection for one calendar month with descriptions
    /// resolved for `lang`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an impossible year/month and
    /// `DomainError::Store` on backend failure.
    pub async fn for_month(
        events: &EventRepository,
        translations: &TranslationRepository,
        year: i32,
        month: u32,
        lang: &str,
    ) -> Result<Self, DomainError> {
        let members = events.for_month(year, month).await?;
        let mut collection = Self::from_events(members);
        collection.load_descriptions(lang, translations).await?;
        Ok(collection)
    }
}

impl<'a> IntoIterator for &'a Events {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use agenda_test_support::InMemoryDocumentStore;
    use chrono::NaiveDate;

    use crate::translation::Translation;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn seeded_repos() -> (EventRepository, TranslationRepository, Vec<i64>) {
        let store: Arc<dyn agenda_core::store::DocumentStore> =
            Arc::new(InMemoryDocumentStore::new());
        let events = EventRepository::new(store.clone(), "de");
        let translations = TranslationRepository::new(store, "de");
        let mut ids = Vec::new();
        for (day, title) in [("2024-03-15", "Frühlingsfest"), ("2024-03-02", "Konzert")] {
            let event = Event::new(Some(date(day)), "", "", "", BTreeSet::new());
            let canonical = Translation::new(None, "de", title, "Text", "", "", "");
            let (created, _) = events.create(event, canonical).await.unwrap();
            ids.push(created.id().unwrap());
        }
        (events, translations, ids)
    }

    #[tokio::test]
    async fn test_add_rejects_duplicates_deterministically() {
        let (events, _, ids) = seeded_repos().await;
        let all = events.get_all().await.unwrap();
        let mut collection = Events::new();

        assert!(collection.add(all[0].clone()));
        assert!(!collection.add(all[0].clone()));
        assert!(collection.add(all[1].clone()));
        assert_eq!(collection.len(), 2);
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_sorted_keeps_date_then_id_order() {
        let (events, _, _) = seeded_repos().await;
        let all = events.get_all().await.unwrap();
        // Insert in reverse to prove `add` maintains order.
        let collection = Events::from_events(all.iter().rev().cloned());

        let days: Vec<_> = collection
            .sorted()
            .iter()
            .map(|e| e.date().unwrap().to_string())
            .collect();
        assert_eq!(days, ["2024-03-02", "2024-03-15"]);
    }

    #[tokio::test]
    async fn test_clone_is_deep_and_independent() {
        let (events, translations, _) = seeded_repos().await;
        let collection = Events::from_events(events.get_all().await.unwrap());
        let mut clone = collection.clone();

        clone.load_descriptions("de", &translations).await.unwrap();
        assert!(clone.sorted()[0].description().is_some());
        // The original is untouched by mutations of the clone.
        assert!(collection.sorted()[0].description().is_none());
    }

    #[tokio::test]
    async fn test_load_descriptions_falls_back_and_is_idempotent() {
        let (events, translations, ids) = seeded_repos().await;
        let french = Translation::new(Some(ids[0]), "fr", "Fête du printemps", "", "", "", "");
        translations.save(&french).await.unwrap();

        let mut collection = Events::from_events(events.get_all().await.unwrap());
        collection.load_descriptions("fr", &translations).await.unwrap();

        let titles: Vec<_> = collection
            .sorted()
            .iter()
            .map(|e| e.description().unwrap().title.clone())
            .collect();
        // The first event (by date) has no French translation: German text.
        assert_eq!(titles, ["Konzert", "Fête du printemps"]);

        let once = collection.clone();
        collection.load_descriptions("fr", &translations).await.unwrap();
        assert_eq!(collection.sorted().len(), once.sorted().len());
        for (a, b) in collection.sorted().iter().zip(once.sorted()) {
            assert_eq!(a.description(), b.description());
        }
    }

    #[tokio::test]
    async fn test_member_without_canonical_translation_keeps_empty_overlay() {
        let store: Arc<dyn agenda_core::store::DocumentStore> =
            Arc::new(InMemoryDocumentStore::new());
        let events = EventRepository::new(store.clone(), "de");
        let translations = TranslationRepository::new(store.clone(), "de");
        let event = Event::new(Some(date("2024-03-15")), "", "", "", BTreeSet::new());
        let canonical = Translation::new(None, "de", "Frühlingsfest", "", "", "", "");
        let (created, _) = events.create(event, canonical).await.unwrap();
        store
            .delete(&Translation::document_key(created.id().unwrap(), "de"))
            .await
            .unwrap();

        let mut collection = Events::from_events(events.get_all().await.unwrap());
        collection.load_descriptions("de", &translations).await.unwrap();
        assert_eq!(collection.sorted()[0].description(), None);
    }

    #[tokio::test]
    async fn test_for_month_loads_the_window_with_descriptions() {
        let (events, translations, _) = seeded_repos().await;
        let march = Events::for_month(&events, &translations, 2024, 3, "de")
            .await
            .unwrap();
        assert_eq!(march.len(), 2);
        assert_eq!(march.sorted()[0].description().unwrap().title, "Konzert");

        let april = Events::for_month(&events, &translations, 2024, 4, "de")
            .await
            .unwrap();
        assert!(april.is_empty());
    }
}
