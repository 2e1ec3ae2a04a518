use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tokenhub::serve::{router, AppState, LoadedTokenizer, TokenizerRegistry};
use tower::ServiceExt;

/// Build a minimal whitespace WordLevel tokenizer with the given vocabulary
///
/// Deterministic by construction: every known word maps to exactly its
/// vocabulary id, so routing mix-ups show up as wrong ids.
fn tokenizer_json(vocab: &[(&str, u32)]) -> String {
    let vocab_obj: serde_json::Map<String, Value> = vocab
        .iter()
        .map(|(word, id)| ((*word).to_string(), json!(id)))
        .collect();

    json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab_obj,
            "unk_token": "[UNK]"
        }
    })
    .to_string()
}

fn loaded(id: &str, vocab: &[(&str, u32)]) -> LoadedTokenizer {
    let tokenizer = tokenizers::Tokenizer::from_bytes(tokenizer_json(vocab).as_bytes()).unwrap();
    LoadedTokenizer::new(id, tokenizer)
}

/// Two models whose vocabularies disagree on purpose
fn two_model_state() -> AppState {
    let mut registry = TokenizerRegistry::new();
    registry.insert(loaded(
        "m1",
        &[("hello", 0), ("world", 1), ("[UNK]", 2), ("[PAD]", 3)],
    ));
    registry.insert(loaded(
        "m2",
        &[("hello", 5), ("world", 6), ("[UNK]", 7), ("[PAD]", 8)],
    ));

    AppState {
        registry: Arc::new(registry),
        default_model: "m1".to_string(),
        default_max_length: 512,
    }
}

fn empty_state() -> AppState {
    AppState {
        registry: Arc::new(TokenizerRegistry::new()),
        default_model: "m1".to_string(),
        default_max_length: 512,
    }
}

async fn post_tokenize(state: AppState, body: Value) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tokenize")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn tokenize_honors_fixed_length_contract() {
    let (status, body) = post_tokenize(
        two_model_state(),
        json!({"text": "hello world", "max_length": 16, "model": "m1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let input_ids = body["input_ids"].as_array().unwrap();
    let attention_mask = body["attention_mask"].as_array().unwrap();
    assert_eq!(input_ids.len(), 16);
    assert_eq!(attention_mask.len(), 16);

    let mask_sum: u64 = attention_mask.iter().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(body["token_count"].as_u64().unwrap(), mask_sum);
    assert_eq!(body["token_count"], 2);
    assert_eq!(body["model"], "m1");

    // Real tokens first, pad id (3 in m1's vocabulary) to the right.
    assert_eq!(input_ids[0], 0);
    assert_eq!(input_ids[1], 1);
    assert!(input_ids[2..].iter().all(|v| v.as_u64() == Some(3)));
    assert!(attention_mask[2..].iter().all(|v| v.as_u64() == Some(0)));
}

#[tokio::test]
async fn tokenize_routes_to_the_requested_model_only() {
    let (status, body) = post_tokenize(
        two_model_state(),
        json!({"text": "hello world", "max_length": 4, "model": "m2"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // m2's vocabulary, never m1's.
    assert_eq!(body["input_ids"][0], 5);
    assert_eq!(body["input_ids"][1], 6);
    assert_eq!(body["model"], "m2");
}

#[tokio::test]
async fn unknown_model_yields_400_listing_loaded_ids() {
    let (status, body) = post_tokenize(
        two_model_state(),
        json!({"text": "hello", "model": "m3"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("m3"));
    assert!(message.contains("m1, m2"));
}

#[tokio::test]
async fn omitted_model_and_max_length_use_defaults() {
    let (status, body) = post_tokenize(two_model_state(), json!({"text": "hello world"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "m1");
    assert_eq!(body["input_ids"].as_array().unwrap().len(), 512);
    assert_eq!(body["token_count"], 2);
}

#[tokio::test]
async fn long_input_is_truncated_to_max_length() {
    let (status, body) = post_tokenize(
        two_model_state(),
        json!({"text": "hello world hello world", "max_length": 2, "model": "m1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input_ids"], json!([0, 1]));
    assert_eq!(body["attention_mask"], json!([1, 1]));
    assert_eq!(body["token_count"], 2);
}

#[tokio::test]
async fn tokenize_without_loaded_models_is_503() {
    let (status, body) = post_tokenize(empty_state(), json!({"text": "hello"})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("No tokenizers"));
}

#[tokio::test]
async fn health_reports_loaded_models() {
    let (status, body) = get(two_model_state(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["available_models"], json!(["m1", "m2"]));
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_is_503_before_any_tokenizer_loads() {
    let (status, _body) = get(empty_state(), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn root_reports_service_info() {
    let (status, body) = get(two_model_state(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "tokenhub");
}
