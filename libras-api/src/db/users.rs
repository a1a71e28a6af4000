//! User database operations

use chrono::{DateTime, Utc};
use libras_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{ExperienceLevel, User};

/// Insert a new user record
pub async fn create_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (
            id, name, email, image_url, age, experience_level,
            interest, learning_time, roadmap_level, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.image_url)
    .bind(user.age as i64)
    .bind(user.experience_level.as_str())
    .bind(&user.interest)
    .bind(user.learning_time as i64)
    .bind(user.roadmap_level)
    .bind(user.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a user by id
pub async fn get_user(pool: &SqlitePool, user_id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_user(&r)).transpose()
}

/// Look up a user id by email
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Uuid>> {
    let row = sqlx::query("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.map(|r| parse_uuid(&r.get::<String, _>("id"))).transpose()
}

/// Set the roadmap progress level, returning the updated record
///
/// Returns `None` when the user does not exist.
pub async fn update_roadmap_level(
    pool: &SqlitePool,
    user_id: Uuid,
    roadmap_level: i64,
) -> Result<Option<User>> {
    let result = sqlx::query("UPDATE users SET roadmap_level = ? WHERE id = ?")
        .bind(roadmap_level)
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_user(pool, user_id).await
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let level: String = row.get("experience_level");

    Ok(User {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        name: row.get("name"),
        email: row.get("email"),
        image_url: row.get("image_url"),
        age: row.get::<i64, _>("age") as u32,
        experience_level: ExperienceLevel::parse(&level)
            .ok_or_else(|| Error::Internal(format!("unknown experience level: {}", level)))?,
        interest: row.get("interest"),
        learning_time: row.get::<i64, _>("learning_time") as u32,
        roadmap_level: row.get("roadmap_level"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    value
        .parse()
        .map_err(|_| Error::Internal(format!("invalid uuid in database: {}", value)))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Error::Internal(format!("invalid timestamp in database: {}", value)))
}
