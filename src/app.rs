use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{food, history, profile, recipes, reminders, tips, wellness};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(food::router())
                .merge(history::router())
                .merge(profile::router())
                .merge(tips::router())
                .merge(wellness::router())
                .merge(recipes::router())
                .merge(reminders::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod routes_tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::food::labels::Label;
    use crate::food::services::test_support::{live_classifier, FakeDetector};
    use crate::profile::dto::complete_profile;
    use crate::storage::Store;
    use crate::tips::services::TipGeneration;

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn app() -> Router {
        build_app(AppState::fake())
    }

    #[tokio::test]
    async fn health_check() {
        let (status, body) = call(&app(), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".into()));
    }

    #[tokio::test]
    async fn demo_identification_is_recorded_in_history() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/food/identify",
            Some(json!({ "image_b64": "data:image/jpeg;base64,anBlZw==" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "demo");
        assert_eq!(body["food"]["name"], "Demo Food Item");

        let (_, history) = call(&app, "GET", "/api/v1/history", None).await;
        assert_eq!(history.as_array().unwrap().len(), 1);

        let ts = history[0]["timestamp"].as_i64().unwrap();
        let (status, _) = call(&app, "DELETE", &format!("/api/v1/history/{ts}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "DELETE", &format!("/api/v1/history/{ts}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn multipart_upload_identifies_image() {
        let app = app();
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"meal.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\njpeg\r\n--{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/food/identify/upload")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["outcome"], "demo");
    }

    #[tokio::test]
    async fn base64_body_above_twenty_megabytes_is_accepted() {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        // 16 MB image, roughly 21.3 MB once encoded
        let image_b64 = STANDARD.encode(vec![0u8; 16 * 1024 * 1024]);
        assert!(image_b64.len() > 20 * 1024 * 1024);
        let (status, body) = call(
            &app(),
            "POST",
            "/api/v1/food/identify",
            Some(json!({ "image_b64": image_b64 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "demo");
    }

    #[tokio::test]
    async fn bad_base64_is_rejected() {
        let (status, _) = call(
            &app(),
            "POST",
            "/api/v1/food/identify",
            Some(json!({ "image_b64": "not base64!" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway_and_not_recorded() {
        let state = AppState::from_parts(
            Store::in_memory(),
            live_classifier(FakeDetector::failing(500)),
            TipGeneration::Mock,
        );
        let app = build_app(state);
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/food/identify",
            Some(json!({ "image_b64": "anBlZw==" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, Value::String("Failed to analyze image. Please try again.".into()));

        let (_, history) = call(&app, "GET", "/api/v1/history", None).await;
        assert!(history.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_food_is_ok_with_null_food() {
        let state = AppState::from_parts(
            Store::in_memory(),
            live_classifier(FakeDetector::with_labels(vec![Label::new("Table", 0.9)])),
            TipGeneration::Mock,
        );
        let app = build_app(state);
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/food/identify",
            Some(json!({ "image_b64": "anBlZw==" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "no_food");
        assert!(body["food"].is_null());
    }

    #[tokio::test]
    async fn profile_save_drives_tips() {
        let app = app();
        let (status, _) = call(&app, "GET", "/api/v1/profile", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, tips) = call(&app, "GET", "/api/v1/tips", None).await;
        assert!(tips.as_array().unwrap().is_empty());

        let profile = serde_json::to_value(complete_profile()).unwrap();
        let (status, saved) = call(&app, "PUT", "/api/v1/profile", Some(profile)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["isComplete"], true);

        let (_, tips) = call(&app, "GET", "/api/v1/tips", None).await;
        assert_eq!(tips.as_array().unwrap().len(), 10);

        let (_, current) = call(&app, "GET", "/api/v1/tips/current", None).await;
        assert_eq!(current["id"], tips[0]["id"]);
        let (_, next) = call(&app, "POST", "/api/v1/tips/next", None).await;
        assert_eq!(next["id"], tips[1]["id"]);

        let (status, hydration) = call(&app, "GET", "/api/v1/tips?category=hydration", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(hydration
            .as_array()
            .unwrap()
            .iter()
            .all(|t| t["category"] == "hydration"));

        let (status, _) = call(&app, "GET", "/api/v1/tips?category=bogus", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "GET", "/api/v1/tips?category=goals&priority=high", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, "DELETE", "/api/v1/tips", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, first) = call(&app, "POST", "/api/v1/tips/next", None).await;
        assert!(first["id"].is_string());
        let (_, regenerated) = call(&app, "GET", "/api/v1/tips", None).await;
        assert_eq!(regenerated[0]["id"], first["id"]);

        let (status, summary) = call(&app, "GET", "/api/v1/profile/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(summary["demographics"].is_string());
    }

    #[tokio::test]
    async fn next_tip_without_profile_is_null() {
        let (status, body) = call(&app(), "POST", "/api/v1/tips/next", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn wellness_scores_are_validated() {
        let app = app();
        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/wellness",
            Some(json!({ "moodScore": 11, "energyLevel": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, due) = call(&app, "GET", "/api/v1/wellness/due", None).await;
        assert_eq!(due["due"], true);

        let (status, entry) = call(
            &app,
            "POST",
            "/api/v1/wellness",
            Some(json!({ "moodScore": 3, "energyLevel": 7 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["needsSupport"], true);

        let (_, due) = call(&app, "GET", "/api/v1/wellness/due", None).await;
        assert_eq!(due["due"], false);
        let (_, today) = call(&app, "GET", "/api/v1/wellness/today", None).await;
        assert_eq!(today["moodScore"], 3);
    }

    #[tokio::test]
    async fn recipe_crud() {
        let app = app();
        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/recipes",
            Some(json!({ "name": "Soup", "rating": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, created) = call(
            &app,
            "POST",
            "/api/v1/recipes",
            Some(json!({ "name": "Soup", "rating": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = call(
            &app,
            "PUT",
            &format!("/api/v1/recipes/{id}"),
            Some(json!({ "name": "Tomato soup", "rating": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["dateAdded"], created["dateAdded"]);

        let (_, top) = call(&app, "GET", "/api/v1/recipes?min_rating=5", None).await;
        assert_eq!(top[0]["name"], "Tomato soup");

        let (status, _) = call(&app, "DELETE", &format!("/api/v1/recipes/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "GET", &format!("/api/v1/recipes/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reminders_and_notifications() {
        let app = app();
        let (_, catalog) = call(&app, "GET", "/api/v1/reminders/catalog", None).await;
        assert_eq!(catalog.as_array().unwrap().len(), 8);

        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/reminders/items",
            Some(json!({ "reminderId": "nap", "time": "09:00" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, added) = call(
            &app,
            "POST",
            "/api/v1/reminders/items",
            Some(json!({ "reminderId": "water" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(added["time"], "09:00");

        let (_, settings) = call(
            &app,
            "POST",
            "/api/v1/reminders/toggle",
            Some(json!({ "enabled": true })),
        )
        .await;
        assert_eq!(settings["enabled"], true);
        assert_eq!(settings["userReminders"].as_array().unwrap().len(), 1);

        let (status, _) = call(&app, "POST", "/api/v1/reminders/check", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "POST", "/api/v1/notifications/missing/read", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "DELETE", "/api/v1/reminders/items/water", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
