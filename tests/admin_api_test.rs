use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

fn test_app() -> Router {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var(
        "DATABASE_URL",
        "postgres://postgres@localhost/registration_test",
    );
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("SHOPIFY_SHOP_DOMAIN", "demo.myshopify.com");
    env::set_var("SHOPIFY_ADMIN_API_TOKEN", "shpat_test");

    registration_backend::config::init_config().expect("init config");

    // Lazy pool: these flows exercise auth and validation, which fail before
    // any query is issued, so no live database is required.
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/registration_test")
        .expect("lazy pool");
    let state = registration_backend::AppState::new(pool);

    Router::new()
        .route(
            "/api/customers",
            get(registration_backend::routes::customer_routes::list_customers)
                .post(registration_backend::routes::customer_routes::create_customer),
        )
        .route(
            "/api/customers/approve",
            post(registration_backend::routes::customer_routes::approve_customer),
        )
        .route(
            "/api/customers/reject",
            post(registration_backend::routes::customer_routes::reject_customer),
        )
        .layer(axum::middleware::from_fn(
            registration_backend::middleware::auth::require_merchant_session,
        ))
        .with_state(state)
}

fn bearer_token() -> String {
    let claims = registration_backend::middleware::auth::SessionClaims {
        sub: "demo.myshopify.com".to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret("test_secret_key".as_bytes()),
    )
    .expect("sign token")
}

#[tokio::test]
async fn admin_api_auth_and_validation() {
    let app = test_app();
    let token = bearer_token();

    // no session -> 401
    let req = Request::builder()
        .method("GET")
        .uri("/api/customers")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // garbage token -> 401
    let req = Request::builder()
        .method("GET")
        .uri("/api/customers")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // missing required fields -> 400
    let body = json!({ "firstName": "", "lastName": "Doe", "email": "jane@acme.com" });
    let req = Request::builder()
        .method("POST")
        .uri("/api/customers")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // field absent from the body entirely -> 400 with the structured body
    let body = json!({ "firstName": "Jane", "lastName": "Doe" });
    let req = Request::builder()
        .method("POST")
        .uri("/api/customers")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    // malformed email -> 400
    let body = json!({ "firstName": "Jane", "lastName": "Doe", "email": "jane@acme" });
    let req = Request::builder()
        .method("POST")
        .uri("/api/customers")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Please enter a valid email address");

    // approve without a customer id -> 400
    let req = Request::builder()
        .method("POST")
        .uri("/api/customers/approve")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "notes": "looks good" }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Customer ID is required");

    // reject without a customer id -> 400
    let req = Request::builder()
        .method("POST")
        .uri("/api/customers/reject")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
