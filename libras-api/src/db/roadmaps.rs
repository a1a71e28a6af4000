//! Roadmap database operations
//!
//! Topics are stored as a JSON array in a TEXT column.

use libras_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Roadmap, RoadmapKind};

use super::users::{parse_timestamp, parse_uuid};

/// Insert a new roadmap record
pub async fn create_roadmap(pool: &SqlitePool, roadmap: &Roadmap) -> Result<()> {
    let topics = serde_json::to_string(&roadmap.topics)
        .map_err(|e| Error::Internal(format!("serialize topics: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO roadmaps (id, user_id, kind, topics, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(roadmap.id.to_string())
    .bind(roadmap.user_id.to_string())
    .bind(roadmap.kind.as_str())
    .bind(topics)
    .bind(roadmap.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// List all roadmaps belonging to a user, oldest first
pub async fn list_roadmaps(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Roadmap>> {
    let rows = sqlx::query("SELECT * FROM roadmaps WHERE user_id = ? ORDER BY created_at, id")
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_roadmap).collect()
}

/// Delete all of a user's roadmaps, returning how many were removed
pub async fn delete_roadmaps(pool: &SqlitePool, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM roadmaps WHERE user_id = ?")
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn row_to_roadmap(row: &sqlx::sqlite::SqliteRow) -> Result<Roadmap> {
    let kind: String = row.get("kind");
    let topics: String = row.get("topics");

    Ok(Roadmap {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
        kind: RoadmapKind::parse(&kind)
            .ok_or_else(|| Error::Internal(format!("unknown roadmap kind: {}", kind)))?,
        topics: serde_json::from_str(&topics)
            .map_err(|_| Error::Internal(format!("invalid topics in database: {}", topics)))?,
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}
