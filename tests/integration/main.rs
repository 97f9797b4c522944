//! End-to-end tests for the pixel endpoint.
//!
//! Each test builds its own store and router, so tests never share state.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower::ServiceExt;

use pixel_config_service::api::{create_router, AppState, PIXEL_PATH};
use pixel_config_service::config::{Config, FALLBACK_PIXEL_ID};
use pixel_config_service::metrics::detached_handle;
use pixel_config_service::pixel::{PixelCandidate, PixelStore};
use pixel_config_service::PixelError;

fn test_app(config: &Config) -> Router {
    create_router(AppState::new(
        PixelStore::from_config(config),
        detached_handle(),
    ))
}

async fn send(app: &Router, method: Method, body: Option<&str>) -> (StatusCode, Response<Body>) {
    let request = Request::builder()
        .method(method)
        .uri(PIXEL_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    (response.status(), response)
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn parse_timestamp(value: &Value) -> OffsetDateTime {
    OffsetDateTime::parse(value.as_str().unwrap(), &Rfc3339).unwrap()
}

fn has_cors(response: &Response<Body>) -> bool {
    let headers = response.headers();
    headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some_and(|v| v == "*")
        && headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .is_some_and(|v| v == "GET, POST, OPTIONS")
        && headers
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .is_some_and(|v| v == "Content-Type, Authorization, X-Requested-With, Accept, Origin")
}

#[tokio::test]
async fn untouched_store_serves_builtin_default() {
    let app = test_app(&Config::default());

    let (status, response) = send(&app, Method::GET, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(has_cors(&response));

    let body = json_body(response).await;
    assert_eq!(body["data"]["pixelId"], json!(FALLBACK_PIXEL_ID));
    assert_eq!(body["data"]["enabled"], json!(true));
}

#[tokio::test]
async fn configured_default_is_served() {
    let config = Config {
        default_pixel_id: Some("31337".to_string()),
        ..Config::default()
    };
    let app = test_app(&config);

    let (_, response) = send(&app, Method::GET, None).await;
    let body = json_body(response).await;
    assert_eq!(body["data"]["pixelId"], json!("31337"));
}

#[tokio::test]
async fn update_is_visible_to_later_reads() {
    let app = test_app(&Config::default());
    let before = OffsetDateTime::now_utc();

    let (status, response) = send(
        &app,
        Method::POST,
        Some(r#"{"pixelId":"998877","enabled":false}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(has_cors(&response));
    let body = json_body(response).await;
    assert_eq!(body["data"]["pixelId"], json!("998877"));
    assert_eq!(body["data"]["enabled"], json!(false));

    let (status, response) = send(&app, Method::GET, None).await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["pixelId"], json!("998877"));
    assert_eq!(body["data"]["enabled"], json!(false));

    let last_updated = parse_timestamp(&body["data"]["lastUpdated"]);
    let read_at = parse_timestamp(&body["timestamp"]);
    assert!(last_updated >= before);
    assert!(read_at >= last_updated);
}

#[tokio::test]
async fn extra_fields_pass_through_but_last_updated_does_not() {
    let app = test_app(&Config::default());

    let (status, _) = send(
        &app,
        Method::POST,
        Some(r#"{"pixelId":"42","enabled":true,"label":"spring","lastUpdated":"2000-01-01T00:00:00Z"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, response) = send(&app, Method::GET, None).await;
    let data = json_body(response).await["data"].clone();
    assert_eq!(data["label"], json!("spring"));
    assert_ne!(data["lastUpdated"], json!("2000-01-01T00:00:00Z"));
}

#[tokio::test]
async fn invalid_updates_are_rejected_without_mutation() {
    let app = test_app(&Config::default());

    let cases = [
        (r#"{"pixelId":""}"#, "missing identifier"),
        (r#"{"enabled":true}"#, "missing identifier"),
        (r#"{"pixelId":"abc123","enabled":true}"#, "invalid identifier format"),
        (r#"{"pixelId":"12-34","enabled":true}"#, "invalid identifier format"),
        (r#"{"pixelId":"12a"}"#, "invalid identifier format"),
    ];

    for (payload, message) in cases {
        let (status, response) = send(&app, Method::POST, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert!(has_cors(&response));
        assert_eq!(
            json_body(response).await,
            json!({"success": false, "error": message})
        );
    }

    let (_, response) = send(&app, Method::GET, None).await;
    let body = json_body(response).await;
    assert_eq!(body["data"]["pixelId"], json!(FALLBACK_PIXEL_ID));
    assert_eq!(body["data"]["enabled"], json!(true));
}

#[tokio::test]
async fn preflight_is_empty_with_cors() {
    let app = test_app(&Config::default());

    let (status, response) = send(&app, Method::OPTIONS, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(has_cors(&response));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn non_json_body_is_server_error() {
    let app = test_app(&Config::default());

    let (status, response) = send(&app, Method::POST, Some("pixelId=42")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(has_cors(&response));
    assert_eq!(
        json_body(response).await,
        json!({"success": false, "error": "server error"})
    );
}

#[test]
fn store_accepts_any_digit_identifier() {
    let store = PixelStore::new(FALLBACK_PIXEL_ID);

    for id in ["0", "7", "0042", "99999999999999999999999"] {
        let before = OffsetDateTime::now_utc();
        store.replace(PixelCandidate::new(id, true)).unwrap();

        let snapshot = store.get().unwrap();
        assert_eq!(snapshot.config.pixel_id, id);
        assert!(snapshot.config.enabled);
        assert!(snapshot.config.last_updated >= before);
    }
}

#[test]
fn store_rejections_keep_previous_record() {
    let store = PixelStore::new(FALLBACK_PIXEL_ID);
    store.replace(PixelCandidate::new("123", false)).unwrap();
    let kept = store.get().unwrap().config;

    assert_eq!(
        store.replace(PixelCandidate::new("1 2 3", true)),
        Err(PixelError::InvalidIdentifierFormat)
    );
    assert_eq!(store.get().unwrap().config, kept);
}
