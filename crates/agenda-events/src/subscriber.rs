//! Newsletter subscribers.

use std::collections::BTreeMap;
use std::sync::Arc;

use agenda_core::document::{Document, DocumentKey, Kind};
use agenda_core::error::DomainError;
use agenda_core::store::DocumentStore;
use rand::RngCore as _;
use sha2::{Digest as _, Sha256};

use crate::event::Validity;

/// A newsletter subscriber, keyed by email address. The `hash` is an
/// unguessable unsubscribe token embedded in newsletter links, derived
/// from the email, the language and a random nonce at signup time.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscriber {
    email: String,
    name: String,
    language: String,
    hash: String,
    validity: Validity,
}

fn unsubscribe_hash(email: &str, language: &str) -> String {
    let mut nonce = [0u8; 16];
    rand::rng().fill_bytes(&mut nonce);
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(language.as_bytes());
    hasher.update(nonce);
    format!("{:x}", hasher.finalize())
}

impl Subscriber {
    /// Creates a subscriber, accumulating all validation errors (empty
    /// email, empty language) and generating a fresh unsubscribe hash.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        let email = email.into();
        let language = language.into();
        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push("email is not defined".to_owned());
        }
        if language.is_empty() {
            errors.push("language is not defined".to_owned());
        }
        let hash = unsubscribe_hash(&email, &language);
        Self {
            email,
            name: name.into(),
            language,
            hash,
            validity: Validity::from_errors(errors),
        }
    }

    /// Returns the key a subscriber document is stored under.
    #[must_use]
    pub fn document_key(email: &str) -> DocumentKey {
        DocumentKey::Named(Kind::Subscriber, email.to_owned())
    }

    #[must_use]
    pub fn to_document(&self) -> Document {
        Document::new(Self::document_key(&self.email))
            .with("email", self.email.as_str())
            .with("name", self.name.as_str())
            .with("language", self.language.as_str())
            .with("hash", self.hash.as_str())
    }

    /// Parses a subscriber from a stored document, keeping the persisted
    /// hash instead of generating a new one.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let mut subscriber = Self::new(
            document.str_or_default("email"),
            document.str_or_default("name"),
            document.str_or_default("language"),
        );
        subscriber.hash = document.str_or_default("hash");
        subscriber
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name, possibly empty.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the preferred newsletter language code.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the unsubscribe token.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns the validation result produced at construction.
    #[must_use]
    pub const fn validity(&self) -> &Validity {
        &self.validity
    }
}

/// Repository for subscriber documents.
#[derive(Clone)]
pub struct SubscriberRepository {
    store: Arc<dyn DocumentStore>,
}

impl SubscriberRepository {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Upserts a subscriber by email. Re-subscribing replaces the stored
    /// record, including the unsubscribe hash.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the subscriber is invalid
    /// and `DomainError::Store` on backend failure.
    pub async fn save(&self, subscriber: &Subscriber) -> Result<(), DomainError> {
        if !subscriber.validity().is_ok() {
            return Err(DomainError::Validation(
                subscriber.validity().errors().to_vec(),
            ));
        }
        self.store.put(&subscriber.to_document()).await?;
        Ok(())
    }

    /// Fetches a subscriber by email. A miss is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn get(&self, email: &str) -> Result<Option<Subscriber>, DomainError> {
        match self.store.get(&Subscriber::document_key(email)).await {
            Ok(document) => Ok(Some(Subscriber::from_document(&document))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Returns all subscribers keyed by email, for the newsletter send
    /// fan-out.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn get_all(&self) -> Result<BTreeMap<String, Subscriber>, DomainError> {
        let query = agenda_core::store::Query::new(Kind::Subscriber, "email");
        let page = self.store.query(&query).await?;
        Ok(page
            .documents
            .iter()
            .map(Subscriber::from_document)
            .map(|s| (s.email.clone(), s))
            .collect())
    }

    /// Looks a subscriber up by unsubscribe token.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn find_by_hash(&self, hash: &str) -> Result<Option<Subscriber>, DomainError> {
        // Subscriber counts are small; a scan beats indexing the hash.
        let all = self.get_all().await?;
        Ok(all.into_values().find(|s| s.hash() == hash))
    }

    /// Removes a subscriber. Deleting an unknown email is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn delete(&self, email: &str) -> Result<(), DomainError> {
        self.store.delete(&Subscriber::document_key(email)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use agenda_test_support::InMemoryDocumentStore;

    fn repo() -> SubscriberRepository {
        SubscriberRepository::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[test]
    fn test_hash_is_hex_and_unguessable_per_signup() {
        let a = Subscriber::new("anna@example.ch", "Anna", "de");
        let b = Subscriber::new("anna@example.ch", "Anna", "de");
        assert_eq!(a.hash().len(), 64);
        assert!(a.hash().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_validation_accumulates_all_violations() {
        let subscriber = Subscriber::new("", "Anna", "");
        assert_eq!(
            subscriber.validity().errors(),
            ["email is not defined", "language is not defined"]
        );
    }

    #[tokio::test]
    async fn test_save_then_get_keeps_the_stored_hash() {
        let repo = repo();
        let subscriber = Subscriber::new("anna@example.ch", "Anna", "de");
        repo.save(&subscriber).await.unwrap();

        let fetched = repo.get("anna@example.ch").await.unwrap().unwrap();
        assert_eq!(fetched, subscriber);
        assert_eq!(fetched.hash(), subscriber.hash());
        assert_eq!(repo.get("unknown@example.ch").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_the_record() {
        let repo = repo();
        let first = Subscriber::new("anna@example.ch", "Anna", "de");
        repo.save(&first).await.unwrap();
        let second = Subscriber::new("anna@example.ch", "Anna", "fr");
        repo.save(&second).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["anna@example.ch"].language(), "fr");
        assert_ne!(all["anna@example.ch"].hash(), first.hash());
    }

    #[tokio::test]
    async fn test_find_by_hash_and_delete() {
        let repo = repo();
        let anna = Subscriber::new("anna@example.ch", "Anna", "de");
        let bruno = Subscriber::new("bruno@example.ch", "Bruno", "fr");
        repo.save(&anna).await.unwrap();
        repo.save(&bruno).await.unwrap();

        let found = repo.find_by_hash(bruno.hash()).await.unwrap().unwrap();
        assert_eq!(found.email(), "bruno@example.ch");
        assert_eq!(repo.find_by_hash("deadbeef").await.unwrap(), None);

        repo.delete("bruno@example.ch").await.unwrap();
        assert_eq!(repo.get("bruno@example.ch").await.unwrap(), None);
        // Deleting again is a no-op.
        repo.delete("bruno@example.ch").await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_subscribers() {
        let repo = repo();
        let invalid = Subscriber::new("", "", "de");
        assert!(matches!(
            repo.save(&invalid).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }
}
