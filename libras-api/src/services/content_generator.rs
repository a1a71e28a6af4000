//! Content generation orchestration
//!
//! Sequences the full topic → collection pipeline: user lookup, per-user
//! topic dedup, bilingual word and sentence generation through the text
//! model, and persistence of the resulting items. Image generation is a
//! separate on-demand step and never runs inline here.

use chrono::Utc;
use libras_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::models::{normalize_topic, Collection, ContentItem, ContentKind};

use super::chat_client::{ChatMessage, TextModel};
use super::json_extract::{extract_json, string_list};
use super::prompts;

/// Full collection payload returned to the client
#[derive(Debug, Clone, serde::Serialize)]
pub struct CollectionPayload {
    pub collection_id: Uuid,
    pub title: String,
    pub topic: String,
    pub created_at: chrono::DateTime<Utc>,
    /// True when the collection already existed and no generation ran
    pub is_existing: bool,
    pub words: Vec<ContentItem>,
    pub sentences: Vec<ContentItem>,
}

/// Topic → bilingual words → bilingual sentences → persisted collection
pub struct ContentGenerator {
    db: SqlitePool,
    model: Arc<dyn TextModel>,
}

impl ContentGenerator {
    pub fn new(db: SqlitePool, model: Arc<dyn TextModel>) -> Self {
        Self { db, model }
    }

    /// Generate (or return the existing) content collection for a topic.
    ///
    /// Topic lookup uses the normalized form, so case and surrounding
    /// whitespace variations of the same topic resolve to one collection.
    /// No rollback is performed on failure: a collection created here can
    /// outlive a failed word-generation step with zero items.
    pub async fn generate(&self, topic: &str, user_id: Uuid) -> Result<CollectionPayload> {
        db::users::get_user(&self.db, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", user_id)))?;

        let normalized = normalize_topic(topic);

        // Idempotent short-circuit: one collection per (user, topic)
        if let Some(existing) =
            db::collections::find_collection_by_topic(&self.db, user_id, &normalized).await?
        {
            tracing::info!(
                user_id = %user_id,
                collection_id = %existing.id,
                topic = %normalized,
                "Returning existing collection"
            );
            return self.load_payload(existing, true).await;
        }

        let collection = Collection {
            id: Uuid::new_v4(),
            user_id,
            title: format!("Coleção de {}", topic.trim()),
            topic: normalized.clone(),
            created_at: Utc::now(),
        };
        db::collections::create_collection(&self.db, &collection).await?;

        tracing::info!(
            user_id = %user_id,
            collection_id = %collection.id,
            topic = %normalized,
            "Created collection, generating content"
        );

        let words = self.generate_words(topic).await?;
        let sentences = self.generate_sentences(&words).await?;

        let now = Utc::now();
        let tagged = words
            .iter()
            .map(|pair| (ContentKind::Word, pair))
            .chain(sentences.iter().map(|pair| (ContentKind::Sentence, pair)));
        for (position, (kind, (text_pt, text_en))) in tagged.enumerate() {
            let item = ContentItem {
                id: Uuid::new_v4(),
                collection_id: collection.id,
                kind,
                position: position as i64,
                text_pt: text_pt.clone(),
                text_en: text_en.clone(),
                image_url: None,
                created_at: now,
                updated_at: now,
            };
            db::collections::create_content_item(&self.db, &item).await?;
        }

        tracing::info!(
            collection_id = %collection.id,
            words = words.len(),
            sentences = sentences.len(),
            "Content generation complete"
        );

        self.load_payload(collection, false).await
    }

    /// Generate the bilingual word list; unusable output is a hard failure
    async fn generate_words(&self, topic: &str) -> Result<Vec<(String, String)>> {
        let prompt = prompts::word_list_prompt(topic);
        let reply = self
            .model
            .complete(&[ChatMessage::user(prompt)])
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let value = extract_json(&reply)
            .ok_or_else(|| Error::ExtractionFailed("no word list was generated".to_string()))?;

        let words_pt = truncate(string_list(&value, "words_pt"), prompts::MAX_WORDS);
        let words_en = truncate(string_list(&value, "words_en"), prompts::MAX_WORDS);

        if words_pt.is_empty() || words_en.is_empty() {
            return Err(Error::ExtractionFailed(
                "no word list was generated".to_string(),
            ));
        }

        Ok(zip_aligned(words_pt, words_en))
    }

    /// Generate sentences from the word list; unusable output degrades to
    /// an empty list rather than failing the whole pass
    async fn generate_sentences(
        &self,
        words: &[(String, String)],
    ) -> Result<Vec<(String, String)>> {
        let words_pt: Vec<String> = words.iter().map(|(pt, _)| pt.clone()).collect();
        let words_en: Vec<String> = words.iter().map(|(_, en)| en.clone()).collect();

        let prompt = prompts::sentence_prompt(&words_pt, &words_en);
        let reply = self
            .model
            .complete(&[ChatMessage::user(prompt)])
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let Some(value) = extract_json(&reply) else {
            tracing::warn!("No sentences extracted from model output");
            return Ok(Vec::new());
        };

        let sentences_pt = truncate(string_list(&value, "sentences_pt"), prompts::MAX_SENTENCES);
        let sentences_en = truncate(string_list(&value, "sentences_en"), prompts::MAX_SENTENCES);

        Ok(zip_aligned(sentences_pt, sentences_en))
    }

    async fn load_payload(
        &self,
        collection: Collection,
        is_existing: bool,
    ) -> Result<CollectionPayload> {
        let items = db::collections::list_content_items(&self.db, collection.id).await?;
        let (words, sentences): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| item.kind == ContentKind::Word);

        Ok(CollectionPayload {
            collection_id: collection.id,
            title: collection.title,
            topic: collection.topic,
            created_at: collection.created_at,
            is_existing,
            words,
            sentences,
        })
    }
}

fn truncate(mut list: Vec<String>, max: usize) -> Vec<String> {
    list.truncate(max);
    list
}

/// Zip bilingual lists index-aligned; entries past the shorter list's
/// length are silently dropped.
fn zip_aligned(pt: Vec<String>, en: Vec<String>) -> Vec<(String, String)> {
    pt.into_iter().zip(en).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_drops_entries_past_shorter_list() {
        let pt = vec!["gato".to_string(), "cachorro".to_string(), "peixe".to_string()];
        let en = vec!["cat".to_string(), "dog".to_string()];
        let zipped = zip_aligned(pt, en);
        assert_eq!(zipped.len(), 2);
        assert_eq!(zipped[0], ("gato".to_string(), "cat".to_string()));
    }

    #[test]
    fn truncate_caps_list_length() {
        let list: Vec<String> = (0..9).map(|i| i.to_string()).collect();
        assert_eq!(truncate(list, 5).len(), 5);
    }
}
