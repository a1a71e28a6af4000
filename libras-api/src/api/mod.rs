//! HTTP API handlers for the Libras backend

pub mod auth_middleware;
pub mod chat;
pub mod content;
pub mod health;
pub mod introductions;
pub mod roadmaps;
pub mod users;

pub use auth_middleware::{AuthLayer, AuthSettings, Claims};
pub use chat::chat_routes;
pub use content::content_routes;
pub use health::health_routes;
pub use introductions::introduction_routes;
pub use roadmaps::roadmap_routes;
pub use users::user_routes;
