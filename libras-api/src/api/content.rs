//! Content and image generation API handlers
//!
//! POST /generate/content, POST /generate/image, POST /generate/images

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::ContentItem;
use crate::services::content_generator::{CollectionPayload, ContentGenerator};
use crate::{db, AppState};

/// POST /generate/content request
#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub topic: String,
    pub user_id: Uuid,
}

/// POST /generate/image request
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub collection_id: Uuid,
    pub text_en: String,
}

/// POST /generate/image response
#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    pub url: String,
}

/// POST /generate/images request
#[derive(Debug, Deserialize)]
pub struct GenerateImagesRequest {
    pub collection_id: Uuid,
}

/// POST /generate/images response
#[derive(Debug, Serialize)]
pub struct GenerateImagesResponse {
    /// How many images were generated in this pass
    pub generated: usize,
    pub items: Vec<ContentItem>,
}

/// POST /generate/content
///
/// Generates (or returns the existing) word/sentence collection for a
/// topic. Images are not generated here; use the image endpoints.
pub async fn generate_content(
    State(state): State<AppState>,
    Json(request): Json<GenerateContentRequest>,
) -> ApiResult<Json<CollectionPayload>> {
    let generator = ContentGenerator::new(state.db.clone(), state.text_model.clone());
    let payload = generator.generate(&request.topic, request.user_id).await?;

    Ok(Json(payload))
}

/// POST /generate/image
///
/// On-demand illustration of one content item, memoized: the first call
/// generates and persists the URL, later calls serve it from the store.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<GenerateImageRequest>,
) -> ApiResult<Json<GenerateImageResponse>> {
    db::collections::get_collection(&state.db, request.collection_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Collection not found: {}", request.collection_id))
        })?;

    let item = db::collections::find_content_item_by_text_en(
        &state.db,
        request.collection_id,
        &request.text_en,
    )
    .await?
    .ok_or_else(|| {
        ApiError::NotFound(format!(
            "Text not found in collection: {}",
            request.text_en
        ))
    })?;

    if let Some(url) = item.image_url {
        tracing::debug!(item_id = %item.id, "Serving cached image URL");
        return Ok(Json(GenerateImageResponse { url }));
    }

    let url = state
        .image_fetcher
        .fetch_one(&item.text_en)
        .await
        .ok_or_else(|| {
            ApiError::Upstream(format!("Image generation failed for: {}", item.text_en))
        })?;

    db::collections::set_content_item_image_url(&state.db, item.id, &url).await?;

    tracing::info!(item_id = %item.id, "Image generated and cached");

    Ok(Json(GenerateImageResponse { url }))
}

/// POST /generate/images
///
/// Fills in every missing illustration of a collection through the
/// bounded fetcher. Already-illustrated items are skipped, so the pass is
/// resumable after partial failures.
pub async fn generate_images(
    State(state): State<AppState>,
    Json(request): Json<GenerateImagesRequest>,
) -> ApiResult<Json<GenerateImagesResponse>> {
    db::collections::get_collection(&state.db, request.collection_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Collection not found: {}", request.collection_id))
        })?;

    let items = db::collections::list_content_items(&state.db, request.collection_id).await?;
    let missing: Vec<&ContentItem> = items.iter().filter(|i| i.image_url.is_none()).collect();

    let pairs: Vec<(String, String)> = missing
        .iter()
        .map(|item| (item.text_pt.clone(), item.text_en.clone()))
        .collect();

    let illustrated = state.image_fetcher.fetch_batch(&pairs).await;
    let generated = illustrated.len();

    // Successful results preserve input order as a subsequence; walk both
    // lists in step to write each URL onto the item that produced it.
    let mut results = illustrated.into_iter().peekable();
    for item in &missing {
        let matched = results
            .peek()
            .map(|r| r.text_pt == item.text_pt && r.text_en == item.text_en)
            .unwrap_or(false);
        if matched {
            if let Some(result) = results.next() {
                db::collections::set_content_item_image_url(&state.db, item.id, &result.url)
                    .await?;
            }
        }
    }

    let items = db::collections::list_content_items(&state.db, request.collection_id).await?;

    tracing::info!(
        collection_id = %request.collection_id,
        generated,
        "Collection image pass complete"
    );

    Ok(Json(GenerateImagesResponse { generated, items }))
}

/// Build content generation routes
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/generate/content", post(generate_content))
        .route("/generate/image", post(generate_image))
        .route("/generate/images", post(generate_images))
}
