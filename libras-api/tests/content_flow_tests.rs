//! Content generation and illustration flow tests

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use helpers::{
    bearer_token, content_script, register_user, request, test_app, CountingImageProvider,
    ScriptedModel,
};

#[tokio::test]
async fn generate_content_produces_a_bilingual_collection() {
    let model = Arc::new(ScriptedModel::new(content_script()));
    let app = test_app(model.clone(), Arc::new(CountingImageProvider::new())).await;
    let token = bearer_token();

    let user_id = register_user(&app, "ana@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/generate/content",
        Some(&token),
        Some(json!({ "topic": "Animais", "user_id": user_id })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "generation failed: {}", body);
    assert_eq!(body["is_existing"], false);
    assert_eq!(body["topic"], "animais");
    assert_eq!(body["title"], "Coleção de Animais");

    let words = body["words"].as_array().unwrap();
    let sentences = body["sentences"].as_array().unwrap();
    assert!(!words.is_empty() && words.len() <= 5);
    assert!(!sentences.is_empty() && sentences.len() <= 5);

    for item in words.iter().chain(sentences) {
        assert!(!item["text_pt"].as_str().unwrap().is_empty());
        assert!(!item["text_en"].as_str().unwrap().is_empty());
        assert!(item["image_url"].is_null());
    }

    assert_eq!(words[0]["text_pt"], "gato");
    assert_eq!(words[0]["text_en"], "cat");
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn repeated_topic_returns_existing_collection_without_regenerating() {
    let model = Arc::new(ScriptedModel::new(content_script()));
    let app = test_app(model.clone(), Arc::new(CountingImageProvider::new())).await;
    let token = bearer_token();

    let user_id = register_user(&app, "ana@example.com").await;

    let (status, first) = request(
        &app,
        "POST",
        "/generate/content",
        Some(&token),
        Some(json!({ "topic": "Animais", "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(model.calls(), 2);

    // Case and whitespace variations normalize to the same topic
    let (status, second) = request(
        &app,
        "POST",
        "/generate/content",
        Some(&token),
        Some(json!({ "topic": "  animais ", "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["is_existing"], true);
    assert_eq!(second["collection_id"], first["collection_id"]);
    assert_eq!(
        second["words"].as_array().unwrap().len(),
        first["words"].as_array().unwrap().len()
    );

    // No new model calls on the second invocation
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn generate_content_404s_for_unknown_user() {
    let app = test_app(
        Arc::new(ScriptedModel::new(content_script())),
        Arc::new(CountingImageProvider::new()),
    )
    .await;

    let (status, _) = request(
        &app,
        "POST",
        "/generate/content",
        Some(&bearer_token()),
        Some(json!({ "topic": "Animais", "user_id": uuid::Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unusable_word_list_fails_with_500() {
    let app = test_app(
        Arc::new(ScriptedModel::new(vec!["I could not think of any words."])),
        Arc::new(CountingImageProvider::new()),
    )
    .await;
    let token = bearer_token();

    let user_id = register_user(&app, "ana@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/generate/content",
        Some(&token),
        Some(json!({ "topic": "Animais", "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("no word list"));
}

#[tokio::test]
async fn oversized_and_misaligned_lists_are_trimmed() {
    // 7 words per language and mismatched sentence list lengths
    let model = Arc::new(ScriptedModel::new(vec![
        r#"{
            "words_pt": ["um", "dois", "tres", "quatro", "cinco", "seis", "sete"],
            "words_en": ["one", "two", "three", "four", "five", "six", "seven"]
        }"#,
        r#"{
            "sentences_pt": ["um gato", "dois caes", "tres peixes"],
            "sentences_en": ["one cat", "two dogs"]
        }"#,
    ]));
    let app = test_app(model, Arc::new(CountingImageProvider::new())).await;
    let token = bearer_token();

    let user_id = register_user(&app, "ana@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/generate/content",
        Some(&token),
        Some(json!({ "topic": "Números", "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Words truncated to 5; sentence pairs capped at the shorter list
    assert_eq!(body["words"].as_array().unwrap().len(), 5);
    assert_eq!(body["sentences"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// On-demand image generation
// ---------------------------------------------------------------------------

async fn collection_with_content(
    app: &axum::Router,
    token: &str,
) -> (String, serde_json::Value) {
    let user_id = register_user(app, "ana@example.com").await;
    let (status, body) = request(
        app,
        "POST",
        "/generate/content",
        Some(token),
        Some(json!({ "topic": "Animais", "user_id": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (body["collection_id"].as_str().unwrap().to_string(), body)
}

#[tokio::test]
async fn image_generation_is_memoized_per_item() {
    let provider = Arc::new(CountingImageProvider::new());
    let app = test_app(Arc::new(ScriptedModel::new(content_script())), provider.clone()).await;
    let token = bearer_token();

    let (collection_id, _) = collection_with_content(&app, &token).await;

    let (status, body) = request(
        &app,
        "POST",
        "/generate/image",
        Some(&token),
        Some(json!({ "collection_id": collection_id, "text_en": "cat" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap().to_string();
    assert_eq!(provider.calls(), 1);

    // Second call serves the cached URL without touching the provider
    let (status, body) = request(
        &app,
        "POST",
        "/generate/image",
        Some(&token),
        Some(json!({ "collection_id": collection_id, "text_en": "cat" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], url.as_str());
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn image_generation_404s_for_unknown_collection_or_text() {
    let app = test_app(
        Arc::new(ScriptedModel::new(content_script())),
        Arc::new(CountingImageProvider::new()),
    )
    .await;
    let token = bearer_token();

    let (status, _) = request(
        &app,
        "POST",
        "/generate/image",
        Some(&token),
        Some(json!({ "collection_id": uuid::Uuid::new_v4(), "text_en": "cat" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (collection_id, _) = collection_with_content(&app, &token).await;
    let (status, body) = request(
        &app,
        "POST",
        "/generate/image",
        Some(&token),
        Some(json!({ "collection_id": collection_id, "text_en": "dragon" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("Text not found"));
}

#[tokio::test]
async fn provider_failure_surfaces_as_500() {
    let app = test_app(
        Arc::new(ScriptedModel::new(content_script())),
        Arc::new(CountingImageProvider::failing()),
    )
    .await;
    let token = bearer_token();

    let (collection_id, _) = collection_with_content(&app, &token).await;

    let (status, body) = request(
        &app,
        "POST",
        "/generate/image",
        Some(&token),
        Some(json!({ "collection_id": collection_id, "text_en": "cat" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("Image generation failed"));
}

#[tokio::test]
async fn batch_pass_fills_only_missing_images() {
    let provider = Arc::new(CountingImageProvider::new());
    let app = test_app(Arc::new(ScriptedModel::new(content_script())), provider.clone()).await;
    let token = bearer_token();

    let (collection_id, payload) = collection_with_content(&app, &token).await;
    let total_items = payload["words"].as_array().unwrap().len()
        + payload["sentences"].as_array().unwrap().len();

    let (status, body) = request(
        &app,
        "POST",
        "/generate/images",
        Some(&token),
        Some(json!({ "collection_id": collection_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generated"], total_items);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), total_items);
    assert!(items.iter().all(|item| item["image_url"].is_string()));

    // Everything is already illustrated; a second pass is a no-op
    let calls_after_first = provider.calls();
    let (status, body) = request(
        &app,
        "POST",
        "/generate/images",
        Some(&token),
        Some(json!({ "collection_id": collection_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generated"], 0);
    assert_eq!(provider.calls(), calls_after_first);
}
