//! Bundled plain-text newsletter renderer.
//!
//! A stand-in at the template system's boundary: one line per event,
//! preferring the translated text and falling back to the canonical one.

use agenda_events::newsletter::{NewsletterRenderer, NewsletterRequest};

/// Renders a newsletter as plain text.
#[derive(Debug, Default, Clone)]
pub struct PlainTextRenderer;

impl NewsletterRenderer for PlainTextRenderer {
    fn render(&self, request: &NewsletterRequest<'_>) -> String {
        let mut out = format!("Agenda {}-{:02} [{}]\n", request.year, request.month, request.lang);
        let source = request.translated.unwrap_or(request.canonical);
        for event in source.sorted() {
            let title = event.description().map_or("", |d| d.title.as_str());
            let date = event
                .date()
                .map(|d| d.to_string())
                .unwrap_or_default();
            out.push_str(&format!("{date}  {title}  {}\n", event.location()));
        }
        if let Some(subscriber) = request.subscriber {
            out.push_str(&format!(
                "\nUnsubscribe: {}/unsubscribe?hash={}\n",
                request.base_url,
                subscriber.hash()
            ));
        }
        out
    }
}
