//! Auth Handlers
//!
//! Registration, email verification, password reset, and the token
//! endpoints.

use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use uuid::Uuid;

use super::{validate_payload, AppState};
use crate::api::middleware::{CurrentUser, GUEST_USER_ID_HEADER};
use crate::models::requests::{LoginUser, RefreshTokens, RegisterUser, RequestOtp, SetNewPassword, VerifyOtp};
use crate::models::responses::{created, EmailData, SuccessResponse, TokensData};
use crate::models::user::User;
use crate::service::EmailKind;
use crate::utils::{AppError, AppResult};

async fn user_by_email(state: &AppState, email: &str) -> AppResult<User> {
    state
        .user_service
        .get_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("Incorrect Email".to_string()))
}

/// Register a new account and email its verification code
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> AppResult<Response> {
    validate_payload(&payload)?;
    let user = state.user_service.create(&payload).await?;
    let otp = state.user_service.issue_otp(user.id).await?;
    state
        .email_service
        .send_in_background(&user, EmailKind::Activation { otp: otp.code });
    Ok(created(SuccessResponse::new(
        "Registration successful",
        EmailData { email: user.email },
    )))
}

/// Verify an email address with the code sent at registration
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtp>,
) -> AppResult<SuccessResponse<()>> {
    validate_payload(&payload)?;
    let user = user_by_email(&state, &payload.email).await?;
    if user.is_email_verified {
        return Ok(SuccessResponse::message_only("Email already verified"));
    }
    state
        .user_service
        .verify_otp(user.id, payload.otp, state.config.auth.otp_expire_seconds)
        .await?;
    state.user_service.mark_email_verified(user.id).await?;
    state.user_service.delete_otp(user.id).await?;
    state
        .email_service
        .send_in_background(&user, EmailKind::Welcome);
    Ok(SuccessResponse::message_only(
        "Account verification successful",
    ))
}

/// Send a fresh verification code to an unverified account
pub async fn resend_verification_email(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtp>,
) -> AppResult<SuccessResponse<()>> {
    validate_payload(&payload)?;
    let user = user_by_email(&state, &payload.email).await?;
    if user.is_email_verified {
        return Ok(SuccessResponse::message_only("Email already verified"));
    }
    let otp = state.user_service.issue_otp(user.id).await?;
    state
        .email_service
        .send_in_background(&user, EmailKind::Activation { otp: otp.code });
    Ok(SuccessResponse::message_only("Verification email sent"))
}

/// Send a password reset code
pub async fn send_password_reset_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtp>,
) -> AppResult<SuccessResponse<()>> {
    validate_payload(&payload)?;
    let user = user_by_email(&state, &payload.email).await?;
    let otp = state.user_service.issue_otp(user.id).await?;
    state
        .email_service
        .send_in_background(&user, EmailKind::PasswordReset { otp: otp.code });
    Ok(SuccessResponse::message_only("Password otp sent"))
}

/// Complete a password reset with the emailed code
pub async fn set_new_password(
    State(state): State<AppState>,
    Json(payload): Json<SetNewPassword>,
) -> AppResult<SuccessResponse<()>> {
    validate_payload(&payload)?;
    let user = user_by_email(&state, &payload.email).await?;
    state
        .user_service
        .verify_otp(user.id, payload.otp, state.config.auth.otp_expire_seconds)
        .await?;
    state
        .user_service
        .update_password(user.id, &payload.password)
        .await?;
    state.user_service.delete_otp(user.id).await?;
    state
        .email_service
        .send_in_background(&user, EmailKind::PasswordResetSuccess);
    Ok(SuccessResponse::message_only("Password reset successful"))
}

/// Exchange credentials for a token pair. A guest session named in the
/// request headers has its watchlist moved onto the account.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginUser>,
) -> AppResult<Response> {
    validate_payload(&payload)?;
    let user = state
        .user_service
        .get_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;
    if !crate::utils::security::verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    if !user.is_email_verified {
        return Err(AppError::Unauthorized("Verify your email first".to_string()));
    }
    let tokens = state.auth_service.issue_tokens(user.id).await?;

    if let Some(guest_id) = headers
        .get(GUEST_USER_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
    {
        if state.listing_service.get_guest(guest_id).await?.is_some() {
            state
                .listing_service
                .migrate_guest_watchlist(guest_id, user.id)
                .await?;
        }
    }

    Ok(created(SuccessResponse::new("Login successful", tokens)))
}

/// Rotate a refresh token into a new pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokens>,
) -> AppResult<Response> {
    validate_payload(&payload)?;
    let tokens: TokensData = state.auth_service.refresh_tokens(&payload.refresh).await?;
    Ok(created(SuccessResponse::new(
        "Tokens refresh successful",
        tokens,
    )))
}

/// Revoke the caller's token pair
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<SuccessResponse<()>> {
    state.auth_service.logout(user.id).await?;
    Ok(SuccessResponse::message_only("Logout successful"))
}
