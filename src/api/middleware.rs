//! Authentication Middleware
//!
//! Bearer authentication for protected endpoints, plus a softer variant
//! that resolves either a signed-in user or a guest session for the
//! endpoints serving both.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::handlers::AppState;
use crate::models::auth::Client;
use crate::models::user::User;
use crate::utils::AppError;

/// Header carrying the guest session id for unauthenticated watchlists
pub const GUEST_USER_ID_HEADER: &str = "guestuserid";

/// Extension holding the authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extension holding the resolved client, if any
#[derive(Debug, Clone)]
pub struct MaybeClient(pub Option<Client>);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Require a valid bearer access token and stash the user on the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized User!".to_string()))?;
    let user = state.auth_service.authenticate(token).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Resolve the caller to a user (valid bearer token) or a guest session
/// (known guestuserid header). Unresolvable callers pass through with no
/// client; an invalid bearer token is still rejected so a signed-in
/// caller never silently degrades to a guest.
pub async fn client_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = match bearer_token(&headers) {
        Some(token) => {
            let user = state.auth_service.authenticate(token).await?;
            Some(Client::User(user.id))
        }
        None => match guest_id(&headers) {
            Some(id) => state
                .listing_service
                .get_guest(id)
                .await?
                .map(|guest| Client::Guest(guest.id)),
            None => None,
        },
    };
    request.extensions_mut().insert(MaybeClient(client));
    Ok(next.run(request).await)
}

fn guest_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(GUEST_USER_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
}
