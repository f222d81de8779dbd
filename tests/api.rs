//! End-to-end API tests driving the router directly.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use bidhouse::{
    api::{AppState, RouterBuilder},
    config::{AppConfig, AuthConfig, SeedConfig, ServerConfig},
    service::{
        AuthService, EmailService, FileService, GeneralService, ListingService, UserService,
    },
};

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
        },
        auth: AuthConfig {
            secret_key: "integration-test-secret".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_minutes: 1440,
            otp_expire_seconds: 900,
        },
        email: None,
        seed: SeedConfig {
            superuser_email: None,
            superuser_password: None,
            auctioneer_email: None,
            auctioneer_password: None,
            reviewer_email: None,
            reviewer_password: None,
        },
    }
}

fn app(pool: PgPool) -> Router {
    let config = Arc::new(test_config());
    let state = AppState {
        auth_service: Arc::new(AuthService::new(pool.clone(), config.auth.clone())),
        user_service: Arc::new(UserService::new(pool.clone())),
        listing_service: Arc::new(ListingService::new(pool.clone())),
        general_service: Arc::new(GeneralService::new(pool.clone())),
        file_service: Arc::new(FileService::new(pool)),
        email_service: Arc::new(EmailService::new(None).expect("email templates")),
        config,
    };
    RouterBuilder::with_all_routes().build(state)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register and verify an account through the API, ready to log in.
async fn register_and_verify(app: &Router, pool: &PgPool, email: &str) {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/register",
            json!({
                "first_name": "Test",
                "last_name": "User",
                "email": email,
                "password": "password123",
                "terms_agreement": true,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let otp: i32 = sqlx::query_scalar(
        "SELECT o.code FROM otps o JOIN users u ON u.id = o.user_id WHERE u.email = $1",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/verify-email",
            json!({ "email": email, "otp": otp }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test]
async fn test_healthcheck(pool: PgPool) {
    let response = app(pool)
        .oneshot(
            Request::builder()
                .uri("/api/v6/healthcheck")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], "pong!");
}

#[sqlx::test]
async fn test_register_login_flow(pool: PgPool) {
    let app = app(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/register",
            json!({
                "first_name": "John",
                "last_name": "Doe",
                "email": "john@example.com",
                "password": "password123",
                "terms_agreement": true,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["data"]["email"], "john@example.com");

    // login before verification is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/login",
            json!({ "email": "john@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // verify with the emailed code, read back from the store
    let otp: i32 = sqlx::query_scalar(
        "SELECT o.code FROM otps o JOIN users u ON u.id = o.user_id WHERE u.email = $1",
    )
    .bind("john@example.com")
    .fetch_one(&pool)
    .await
    .unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/verify-email",
            json!({ "email": "john@example.com", "otp": otp }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Account verification successful");

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/login",
            json!({ "email": "john@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let access = body["data"]["access"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh"].as_str().unwrap().to_string();

    // the refresh token rotates
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/refresh",
            json!({ "refresh": refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // the rotated-away access token no longer authenticates
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v6/auth/logout")
                .header(header::AUTHORIZATION, format!("Bearer {}", access))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_register_validation_envelope(pool: PgPool) {
    let response = app(pool)
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/register",
            json!({
                "first_name": "John Paul",
                "last_name": "Doe",
                "email": "not-an-email",
                "password": "short",
                "terms_agreement": false,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["status"], "failure");
    assert_eq!(body["message"], "Invalid Entry");
    assert!(body["data"]["first_name"].is_string());
    assert!(body["data"]["email"].is_string());
    assert!(body["data"]["password"].is_string());
    assert!(body["data"]["terms_agreement"].is_string());
}

#[sqlx::test]
async fn test_protected_routes_require_auth(pool: PgPool) {
    let app = app(pool);
    for uri in ["/api/v6/auth/logout", "/api/v6/auctioneer", "/api/v6/auctioneer/listings"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        let body = response_json(response).await;
        assert_eq!(body["status"], "failure");
    }
}

#[sqlx::test]
async fn test_unknown_listing_is_not_found(pool: PgPool) {
    let response = app(pool)
        .oneshot(
            Request::builder()
                .uri("/api/v6/listings/detail/no-such-listing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Listing does not exist!");
}

#[sqlx::test]
async fn test_guest_watchlist_round_trip(pool: PgPool) {
    // seed an auctioneer and a listing directly
    sqlx::query(
        "WITH u AS (
             INSERT INTO users (first_name, last_name, email, password_hash, terms_agreement,
                                is_email_verified)
             VALUES ('Sally', 'Seller', 'sally@example.com', 'x', TRUE, TRUE)
             RETURNING id
         )
         INSERT INTO listings (auctioneer_id, name, slug, description, price, closing_date)
         SELECT id, 'Rare Clock', 'rare-clock', 'An old clock', 250.0, NOW() + INTERVAL '7 days'
         FROM u",
    )
    .execute(&pool)
    .await
    .unwrap();

    let app = app(pool);

    // a caller with no session gets a fresh guest id back
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/listings/watchlist",
            json!({ "slug": "rare-clock" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Listing added to user watchlist");
    let guest_id = body["data"]["guestuser_id"].as_str().unwrap().to_string();

    // the guest sees their watchlist under the session header
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v6/listings/watchlist")
                .header("guestuserid", &guest_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["watchlist"], true);

    // toggling again removes the entry
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v6/listings/watchlist")
                .header(header::CONTENT_TYPE, "application/json")
                .header("guestuserid", &guest_id)
                .body(Body::from(json!({ "slug": "rare-clock" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["message"], "Listing removed from user watchlist");
}

#[sqlx::test]
async fn test_login_merges_guest_watchlist(pool: PgPool) {
    sqlx::query(
        "WITH u AS (
             INSERT INTO users (first_name, last_name, email, password_hash, terms_agreement,
                                is_email_verified)
             VALUES ('Sally', 'Seller', 'sally@example.com', 'x', TRUE, TRUE)
             RETURNING id
         )
         INSERT INTO listings (auctioneer_id, name, slug, description, price, closing_date)
         SELECT id, 'Rare Clock', 'rare-clock', 'An old clock', 250.0, NOW() + INTERVAL '7 days'
         FROM u",
    )
    .execute(&pool)
    .await
    .unwrap();

    let app = app(pool.clone());

    // watch as an anonymous guest first
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/listings/watchlist",
            json!({ "slug": "rare-clock" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let guest_id = body["data"]["guestuser_id"].as_str().unwrap().to_string();

    register_and_verify(&app, &pool, "buyer@example.com").await;

    // logging in under the guest session header adopts its watchlist
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v6/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .header("guestuserid", &guest_id)
                .body(Body::from(
                    json!({ "email": "buyer@example.com", "password": "password123" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let access = body["data"]["access"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v6/listings/watchlist")
                .header(header::AUTHORIZATION, format!("Bearer {}", access))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["watchlist"], true);

    // the guest session is dropped after the merge
    let remaining: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guestusers)")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!remaining);
}

#[sqlx::test]
async fn test_stranger_update_leaves_listing_file_alone(pool: PgPool) {
    let file_id: uuid::Uuid = sqlx::query_scalar(
        "INSERT INTO files (resource_type) VALUES ('image/jpeg') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query(
        "WITH u AS (
             INSERT INTO users (first_name, last_name, email, password_hash, terms_agreement,
                                is_email_verified)
             VALUES ('Sally', 'Seller', 'sally@example.com', 'x', TRUE, TRUE)
             RETURNING id
         )
         INSERT INTO listings (auctioneer_id, name, slug, description, price, closing_date,
                               image_id)
         SELECT id, 'Rare Clock', 'rare-clock', 'An old clock', 250.0,
                NOW() + INTERVAL '7 days', $1
         FROM u",
    )
    .bind(file_id)
    .execute(&pool)
    .await
    .unwrap();

    let app = app(pool.clone());
    register_and_verify(&app, &pool, "stranger@example.com").await;
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/auth/login",
            json!({ "email": "stranger@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    let access = body["data"]["access"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::PATCH)
                .uri("/api/v6/auctioneer/listings/rare-clock")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {}", access))
                .body(Body::from(json!({ "file_type": "image/png" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "This listing doesn't belong to you!");

    // the rejected update must not have touched the owner's file record
    let resource_type: String =
        sqlx::query_scalar("SELECT resource_type FROM files WHERE id = $1")
            .bind(file_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(resource_type, "image/jpeg");
}

#[sqlx::test]
async fn test_general_endpoints(pool: PgPool) {
    let app = app(pool);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v6/general/site-detail")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Site Details fetched");
    assert!(body["data"]["name"].is_string());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v6/general/subscribe",
            json!({ "email": "reader@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Subscription successful");
    assert_eq!(body["data"]["email"], "reader@example.com");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v6/general/reviews")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}
