//! Domain types for users, collections, content items and roadmaps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discrete learning-time choices offered during registration, in minutes.
/// 60 is a sentinel meaning "60 or more".
pub const LEARNING_TIMES: [u32; 6] = [10, 20, 30, 40, 50, 60];

/// Self-reported experience level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Intermediated,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediated => "intermediated",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    /// Parse the wire representation; `None` for anything else
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediated" => Some(ExperienceLevel::Intermediated),
            "advanced" => Some(ExperienceLevel::Advanced),
            _ => None,
        }
    }
}

/// Validate a learning-time value against the allowed set
pub fn is_valid_learning_time(minutes: u32) -> bool {
    LEARNING_TIMES.contains(&minutes)
}

/// Registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub age: u32,
    pub experience_level: ExperienceLevel,
    pub interest: String,
    pub learning_time: u32,
    pub roadmap_level: i64,
    pub created_at: DateTime<Utc>,
}

/// Normalize a topic for per-user collection dedup
pub fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}

/// A user- and topic-scoped bundle of generated content
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Normalized (trimmed, lower-cased) topic; unique per user
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

/// Kind of a generated content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Word,
    Sentence,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Word => "word",
            ContentKind::Sentence => "sentence",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "word" => Some(ContentKind::Word),
            "sentence" => Some(ContentKind::Sentence),
            _ => None,
        }
    }
}

/// One generated word or sentence, bilingual, optionally illustrated
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub kind: ContentKind,
    /// Stable ordering within the collection; not part of the wire shape
    #[serde(skip_serializing)]
    pub position: i64,
    pub text_pt: String,
    pub text_en: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who a roadmap was generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapKind {
    Student,
    Parent,
}

impl RoadmapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadmapKind::Student => "student",
            RoadmapKind::Parent => "parent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(RoadmapKind::Student),
            "parent" => Some(RoadmapKind::Parent),
            _ => None,
        }
    }
}

/// An ordered study plan of short topic strings
#[derive(Debug, Clone, Serialize)]
pub struct Roadmap {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: RoadmapKind,
    pub topics: Vec<String>,
    pub created_at: DateTime<Utc>,
}
