//! Collection and content item database operations

use chrono::Utc;
use libras_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Collection, ContentItem, ContentKind};

use super::users::{parse_timestamp, parse_uuid};

/// Insert a new collection record
pub async fn create_collection(pool: &SqlitePool, collection: &Collection) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO collections (id, user_id, title, topic, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(collection.id.to_string())
    .bind(collection.user_id.to_string())
    .bind(&collection.title)
    .bind(&collection.topic)
    .bind(collection.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a collection by id
pub async fn get_collection(pool: &SqlitePool, collection_id: Uuid) -> Result<Option<Collection>> {
    let row = sqlx::query("SELECT * FROM collections WHERE id = ?")
        .bind(collection_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_collection(&r)).transpose()
}

/// Find a user's collection by normalized topic
///
/// Callers pass the already-normalized topic; (user_id, topic) is unique.
pub async fn find_collection_by_topic(
    pool: &SqlitePool,
    user_id: Uuid,
    topic: &str,
) -> Result<Option<Collection>> {
    let row = sqlx::query("SELECT * FROM collections WHERE user_id = ? AND topic = ?")
        .bind(user_id.to_string())
        .bind(topic)
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_collection(&r)).transpose()
}

/// Insert a content item under a collection
pub async fn create_content_item(pool: &SqlitePool, item: &ContentItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO content_items (
            id, collection_id, kind, position, text_pt, text_en, image_url, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.id.to_string())
    .bind(item.collection_id.to_string())
    .bind(item.kind.as_str())
    .bind(item.position)
    .bind(&item.text_pt)
    .bind(&item.text_en)
    .bind(&item.image_url)
    .bind(item.created_at.to_rfc3339())
    .bind(item.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// List all content items of a collection, oldest first
pub async fn list_content_items(
    pool: &SqlitePool,
    collection_id: Uuid,
) -> Result<Vec<ContentItem>> {
    let rows = sqlx::query(
        "SELECT * FROM content_items WHERE collection_id = ? ORDER BY position, created_at",
    )
    .bind(collection_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_content_item).collect()
}

/// Find one content item by its target-language text within a collection
pub async fn find_content_item_by_text_en(
    pool: &SqlitePool,
    collection_id: Uuid,
    text_en: &str,
) -> Result<Option<ContentItem>> {
    let row = sqlx::query("SELECT * FROM content_items WHERE collection_id = ? AND text_en = ?")
        .bind(collection_id.to_string())
        .bind(text_en)
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_content_item(&r)).transpose()
}

/// Store a generated image URL on a content item
pub async fn set_content_item_image_url(
    pool: &SqlitePool,
    item_id: Uuid,
    url: &str,
) -> Result<()> {
    sqlx::query("UPDATE content_items SET image_url = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(Utc::now().to_rfc3339())
        .bind(item_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

fn row_to_collection(row: &sqlx::sqlite::SqliteRow) -> Result<Collection> {
    Ok(Collection {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
        title: row.get("title"),
        topic: row.get("topic"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

fn row_to_content_item(row: &sqlx::sqlite::SqliteRow) -> Result<ContentItem> {
    let kind: String = row.get("kind");

    Ok(ContentItem {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        collection_id: parse_uuid(&row.get::<String, _>("collection_id"))?,
        kind: ContentKind::parse(&kind)
            .ok_or_else(|| Error::Internal(format!("unknown content kind: {}", kind)))?,
        position: row.get("position"),
        text_pt: row.get("text_pt"),
        text_en: row.get("text_en"),
        image_url: row.get("image_url"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}
