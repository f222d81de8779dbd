//! Email Service
//!
//! Sends the account lifecycle emails: activation codes, the welcome
//! note after verification, and the password reset pair. Delivery runs
//! in the background so request handlers never wait on SMTP, and a
//! service built without SMTP configuration only logs what it would
//! have sent.

use std::sync::Arc;

use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{error, info};
use tera::{Context, Tera};

use crate::config::EmailConfig;
use crate::models::user::User;
use crate::utils::{AppError, AppResult};

const ACTIVATION_TEMPLATE: &str = include_str!("../../templates/email-activation.html");
const WELCOME_TEMPLATE: &str = include_str!("../../templates/welcome.html");
const PASSWORD_RESET_TEMPLATE: &str = include_str!("../../templates/password-reset.html");
const RESET_SUCCESS_TEMPLATE: &str = include_str!("../../templates/password-reset-success.html");

/// The emails this service knows how to send
#[derive(Debug, Clone)]
pub enum EmailKind {
    Activation { otp: i32 },
    Welcome,
    PasswordReset { otp: i32 },
    PasswordResetSuccess,
}

impl EmailKind {
    fn template(&self) -> &'static str {
        match self {
            EmailKind::Activation { .. } => "email-activation.html",
            EmailKind::Welcome => "welcome.html",
            EmailKind::PasswordReset { .. } => "password-reset.html",
            EmailKind::PasswordResetSuccess => "password-reset-success.html",
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            EmailKind::Activation { .. } => "Verify your email",
            EmailKind::Welcome => "Account verified",
            EmailKind::PasswordReset { .. } => "Your password reset token",
            EmailKind::PasswordResetSuccess => "Password reset successfully",
        }
    }

    fn otp(&self) -> Option<i32> {
        match self {
            EmailKind::Activation { otp } | EmailKind::PasswordReset { otp } => Some(*otp),
            _ => None,
        }
    }
}

pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    templates: Tera,
    config: Option<EmailConfig>,
}

impl EmailService {
    pub fn new(config: Option<EmailConfig>) -> AppResult<Self> {
        let transport = match &config {
            Some(cfg) => {
                let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
                    .map_err(|e| {
                        AppError::Configuration(format!("Failed to configure SMTP relay: {}", e))
                    })?
                    .port(cfg.smtp_port)
                    .credentials(creds)
                    .build();
                Some(transport)
            }
            None => None,
        };

        let mut templates = Tera::default();
        templates
            .add_raw_templates(vec![
                ("email-activation.html", ACTIVATION_TEMPLATE),
                ("welcome.html", WELCOME_TEMPLATE),
                ("password-reset.html", PASSWORD_RESET_TEMPLATE),
                ("password-reset-success.html", RESET_SUCCESS_TEMPLATE),
            ])
            .map_err(|e| AppError::Configuration(format!("Invalid email template: {}", e)))?;

        Ok(Self {
            transport,
            templates,
            config,
        })
    }

    /// Queue an email for the user without blocking the caller. Send
    /// failures are logged, never surfaced to the request.
    pub fn send_in_background(self: &Arc<Self>, user: &User, kind: EmailKind) {
        let service = Arc::clone(self);
        let email = user.email.clone();
        let name = user.full_name();
        tokio::spawn(async move {
            if let Err(e) = service.send(&email, &name, kind).await {
                error!("Failed to send email to {}: {}", email, e);
            }
        });
    }

    async fn send(&self, to_email: &str, name: &str, kind: EmailKind) -> AppResult<()> {
        let (transport, config) = match (&self.transport, &self.config) {
            (Some(t), Some(c)) => (t, c),
            _ => {
                info!(
                    "Email delivery disabled; skipping '{}' for {}",
                    kind.subject(),
                    to_email
                );
                return Ok(());
            }
        };

        let mut context = Context::new();
        context.insert("name", name);
        context.insert("app_name", &config.from_name);
        if let Some(otp) = kind.otp() {
            context.insert("otp", &otp);
        }
        let html_body = self
            .templates
            .render(kind.template(), &context)
            .map_err(|e| AppError::Internal(format!("Failed to render email template: {}", e)))?;
        let text_body = format!(
            "Hi {},\n\n{}{}\n",
            name,
            kind.subject(),
            kind.otp()
                .map(|otp| format!(": {}", otp))
                .unwrap_or_default()
        );

        let message = Message::builder()
            .from(
                format!("{} <{}>", config.from_name, config.from_email)
                    .parse()
                    .map_err(|e| AppError::Configuration(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid recipient email: {}", e)))?)
            .subject(kind.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email message: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;
        info!("Sent '{}' email to {}", kind.subject(), to_email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_render_with_context() {
        let service = EmailService::new(None).unwrap();
        let mut context = Context::new();
        context.insert("name", "John Doe");
        context.insert("app_name", "Bidhouse");
        context.insert("otp", &123456);
        for kind in [
            EmailKind::Activation { otp: 123456 },
            EmailKind::Welcome,
            EmailKind::PasswordReset { otp: 123456 },
            EmailKind::PasswordResetSuccess,
        ] {
            let rendered = service.templates.render(kind.template(), &context).unwrap();
            assert!(rendered.contains("John Doe"));
        }
    }

    #[tokio::test]
    async fn test_disabled_service_skips_delivery() {
        let service = EmailService::new(None).unwrap();
        let result = service
            .send("john@example.com", "John Doe", EmailKind::Welcome)
            .await;
        assert!(result.is_ok());
    }
}
