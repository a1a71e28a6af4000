//! Roadmap generation orchestration

use chrono::Utc;
use libras_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::models::{Roadmap, RoadmapKind};

use super::chat_client::{ChatMessage, TextModel};
use super::json_extract::{extract_json, string_list};
use super::prompts;

/// Profile → ordered topic plan → persisted roadmap
pub struct RoadmapGenerator {
    db: SqlitePool,
    model: Arc<dyn TextModel>,
}

impl RoadmapGenerator {
    pub fn new(db: SqlitePool, model: Arc<dyn TextModel>) -> Self {
        Self { db, model }
    }

    /// Generate and persist a roadmap for a user.
    ///
    /// Unlike collections, roadmaps are not deduplicated: every call
    /// creates a new one.
    pub async fn generate(
        &self,
        kind: RoadmapKind,
        user_id: Uuid,
        interest: &str,
    ) -> Result<Roadmap> {
        let user = db::users::get_user(&self.db, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", user_id)))?;

        let prompt = prompts::roadmap_prompt(kind, &user, interest);
        let reply = self
            .model
            .complete(&[ChatMessage::user(prompt)])
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let value = extract_json(&reply)
            .ok_or_else(|| Error::ExtractionFailed("no roadmap was generated".to_string()))?;

        let topics = string_list(&value, "topics");
        if topics.is_empty() {
            return Err(Error::ExtractionFailed(
                "no roadmap was generated".to_string(),
            ));
        }

        let roadmap = Roadmap {
            id: Uuid::new_v4(),
            user_id,
            kind,
            topics,
            created_at: Utc::now(),
        };
        db::roadmaps::create_roadmap(&self.db, &roadmap).await?;

        tracing::info!(
            user_id = %user_id,
            roadmap_id = %roadmap.id,
            kind = %kind.as_str(),
            topics = roadmap.topics.len(),
            "Roadmap generated"
        );

        Ok(roadmap)
    }
}
