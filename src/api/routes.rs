//! API Route Definitions
//!
//! HTTP routes assembled with a builder so deployments can switch off
//! whole API sections, for instance running the public browsing routes
//! without the auctioneer surface.

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use super::middleware::{auth_middleware, client_middleware};

/// Builder for creating API routes with configurable sections
#[derive(Default)]
pub struct RouterBuilder {
    /// Health check endpoint (GET /api/v6/healthcheck)
    health_check: bool,
    /// Registration, verification, and token routes (/api/v6/auth)
    auth: bool,
    /// Public listing, bidding, and watchlist routes (/api/v6/listings)
    listings: bool,
    /// Seller profile and listing management routes (/api/v6/auctioneer)
    auctioneer: bool,
    /// Site details, subscriptions, and reviews (/api/v6/general)
    general: bool,
}

impl RouterBuilder {
    /// All sections disabled; enable the ones you need
    pub fn new() -> Self {
        Self::default()
    }

    /// The full API surface
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            auth: true,
            listings: true,
            auctioneer: true,
            general: true,
        }
    }

    /// Health check only, for monitoring deployments
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            ..Self::default()
        }
    }

    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    pub fn auth(mut self, enabled: bool) -> Self {
        self.auth = enabled;
        self
    }

    pub fn listings(mut self, enabled: bool) -> Self {
        self.listings = enabled;
        self
    }

    pub fn auctioneer(mut self, enabled: bool) -> Self {
        self.auctioneer = enabled;
        self
    }

    pub fn general(mut self, enabled: bool) -> Self {
        self.general = enabled;
        self
    }

    /// Assemble the enabled sections into the application router
    pub fn build(self, state: AppState) -> Router {
        let mut api = Router::new();

        if self.health_check {
            api = api.route("/healthcheck", get(handlers::healthcheck));
        }
        if self.auth {
            api = api.nest("/auth", auth_routes(state.clone()));
        }
        if self.listings {
            api = api.nest("/listings", listing_routes(state.clone()));
        }
        if self.auctioneer {
            api = api.nest("/auctioneer", auctioneer_routes(state.clone()));
        }
        if self.general {
            api = api.nest("/general", general_routes());
        }

        Router::new()
            .nest("/api/v6", api)
            .layer(cors_layer(&state))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/verify-email", post(handlers::auth::verify_email))
        .route(
            "/resend-verification-email",
            post(handlers::auth::resend_verification_email),
        )
        .route(
            "/send-password-reset-otp",
            post(handlers::auth::send_password_reset_otp),
        )
        .route("/set-new-password", post(handlers::auth::set_new_password))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route(
            "/logout",
            get(handlers::auth::logout)
                .route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        )
}

fn listing_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::listings::list_listings))
        .route("/detail/{slug}", get(handlers::listings::listing_detail))
        .route(
            "/detail/{slug}/bids",
            get(handlers::listings::listing_bids).post(handlers::listings::place_bid),
        )
        .route(
            "/watchlist",
            get(handlers::listings::watchlist).post(handlers::listings::toggle_watchlist),
        )
        .route("/categories", get(handlers::listings::categories))
        .route(
            "/categories/{slug}",
            get(handlers::listings::category_listings),
        )
        .layer(middleware::from_fn_with_state(state, client_middleware))
}

fn auctioneer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::auctioneer::profile).put(handlers::auctioneer::update_profile),
        )
        .route(
            "/listings",
            get(handlers::auctioneer::my_listings).post(handlers::auctioneer::create_listing),
        )
        .route(
            "/listings/{slug}",
            patch(handlers::auctioneer::update_listing),
        )
        .route(
            "/listings/{slug}/bids",
            get(handlers::auctioneer::listing_bids),
        )
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn general_routes() -> Router<AppState> {
    Router::new()
        .route("/site-detail", get(handlers::general::site_detail))
        .route("/subscribe", post(handlers::general::subscribe))
        .route("/reviews", get(handlers::general::reviews))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors_origins;
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}
