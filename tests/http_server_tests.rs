//! HTTP surface integration tests
//!
//! Exercises `POST /analisar` and `GET /health` through the router with
//! stub providers behind the pipeline.

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cantoria::build_router;
use helpers::{stub_app_state, MultipartBuilder, TestEnv};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn analisar_request(content_type: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analisar")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn missing_audio_returns_400_with_no_side_effects() {
    let env = TestEnv::new();
    let (state, _) = stub_app_state(&env, Some("Hello world"), "hello word");
    let app = build_router(state);

    let (content_type, body) = MultipartBuilder::new()
        .text("titulo", "Hello World")
        .text("artista", "Someone")
        .build();
    let response = app.oneshot(analisar_request(&content_type, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["erro"].is_string());

    // No temp files, no cache writes.
    assert!(env.scratch_files().is_empty());
    assert!(!env.cache_path.exists());
}

#[tokio::test]
async fn missing_title_returns_400() {
    let env = TestEnv::new();
    let (state, _) = stub_app_state(&env, Some("Hello world"), "hello word");
    let app = build_router(state);

    let (content_type, body) = MultipartBuilder::new()
        .file("audio", "take.m4a", b"fake audio bytes")
        .text("artista", "Someone")
        .build();
    let response = app.oneshot(analisar_request(&content_type, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["erro"], "Campos 'titulo' e 'artista' são obrigatórios");
}

#[tokio::test]
async fn unknown_song_returns_404() {
    let env = TestEnv::new();
    let (state, _) = stub_app_state(&env, None, "hello word");
    let app = build_router(state);

    let (content_type, body) = MultipartBuilder::new()
        .file("audio", "take.m4a", b"fake audio bytes")
        .text("titulo", "Totally Unknown Song")
        .text("artista", "Nobody")
        .build();
    let response = app.oneshot(analisar_request(&content_type, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["erro"], "Não encontramos a letra dessa música.");
}

#[tokio::test]
async fn analysis_happy_path_returns_full_report() {
    let env = TestEnv::new();
    let (state, _) = stub_app_state(&env, Some("Hello world"), "hello word");
    let app = build_router(state);

    let (content_type, body) = MultipartBuilder::new()
        .file("audio", "take.m4a", b"fake audio bytes")
        .text("titulo", "Hello World")
        .text("artista", "Someone")
        .build();
    let response = app.oneshot(analisar_request(&content_type, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["sucesso"], true);
    assert_eq!(json["musica"], "Hello World");
    assert_eq!(json["artista"], "Someone");
    assert_eq!(json["nota_final"], 84); // floor(0.85 * 99)
    assert_eq!(json["similaridade_media"], 0.85);
    assert_eq!(json["cobertura_letra"], 50.0);
    assert_eq!(json["palavras_nao_cantadas"], serde_json::json!(["world"]));

    let details = json["analise_detalhada"].as_array().unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["original"], "Hello");
    assert_eq!(details[0]["usuario"], "hello");
    assert_eq!(details[0]["score"], 1.0);
    assert_eq!(details[0]["status"], "otimo");
    assert_eq!(details[1]["original"], "world");
    assert_eq!(details[1]["usuario"], "word");
    assert_eq!(details[1]["score"], 0.7);
    assert_eq!(details[1]["status"], "bom");

    // Fetched lyrics were cached, scratch audio was cleaned up.
    assert!(env.cache_path.exists());
    assert!(env.scratch_files().is_empty());
}

#[tokio::test]
async fn second_request_is_served_from_the_lyric_cache() {
    let env = TestEnv::new();
    let (state, lyric_provider) = stub_app_state(&env, Some("Hello world"), "hello word");
    let app = build_router(state);

    for _ in 0..2 {
        let (content_type, body) = MultipartBuilder::new()
            .file("audio", "take.m4a", b"fake audio bytes")
            .text("titulo", "Hello World")
            .text("artista", "Someone")
            .build();
        let response = app
            .clone()
            .oneshot(analisar_request(&content_type, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(lyric_provider.call_count(), 1);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let env = TestEnv::new();
    let (state, _) = stub_app_state(&env, None, "");
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "cantoria");
}
