//! Configuration Module
//!
//! Environment-driven configuration for the server, database, auth tokens,
//! email delivery, and seed accounts.

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u32 with default
    pub fn get_u32(key: &str, default: u32) -> u32 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as u64 with default
    pub fn get_u64(key: &str, default: u64) -> u64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }

    /// Get required environment variable
    pub fn get_required(key: &str) -> Result<String, String> {
        env::var(key).map_err(|_| format!("Required environment variable {} is not set", key))
    }
}

/// Application configuration combining all service configurations
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub email: Option<EmailConfig>,
    pub seed: SeedConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Token and OTP configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_minutes: i64,
    pub otp_expire_seconds: i64,
}

/// SMTP configuration for outgoing mail
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

/// First-run accounts created by the seeder
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub superuser_email: Option<String>,
    pub superuser_password: Option<String>,
    pub auctioneer_email: Option<String>,
    pub auctioneer_password: Option<String>,
    pub reviewer_email: Option<String>,
    pub reviewer_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 8000),
            cors_origins: env::get_string("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, String> {
        Ok(Self {
            secret_key: env::get_required("SECRET_KEY")?,
            access_token_expire_minutes: env::get_i64("ACCESS_TOKEN_EXPIRE_MINUTES", 30),
            refresh_token_expire_minutes: env::get_i64("REFRESH_TOKEN_EXPIRE_MINUTES", 1440),
            otp_expire_seconds: env::get_i64("EMAIL_OTP_EXPIRE_SECONDS", 900),
        })
    }
}

impl EmailConfig {
    /// Email delivery is optional; absent SMTP_HOST disables it.
    pub fn from_env() -> Option<Self> {
        if !env::is_set("SMTP_HOST") {
            return None;
        }
        Some(Self {
            smtp_host: env::get_string("SMTP_HOST", "localhost"),
            smtp_port: env::get_u16("SMTP_PORT", 587),
            smtp_username: env::get_string("SMTP_USERNAME", ""),
            smtp_password: env::get_string("SMTP_PASSWORD", ""),
            from_email: env::get_string("MAIL_SENDER_EMAIL", "noreply@bidhouse.local"),
            from_name: env::get_string("MAIL_FROM_NAME", "Bidhouse"),
        })
    }
}

impl SeedConfig {
    fn from_env() -> Self {
        Self {
            superuser_email: std::env::var("FIRST_SUPERUSER_EMAIL").ok(),
            superuser_password: std::env::var("FIRST_SUPERUSER_PASSWORD").ok(),
            auctioneer_email: std::env::var("FIRST_AUCTIONEER_EMAIL").ok(),
            auctioneer_password: std::env::var("FIRST_AUCTIONEER_PASSWORD").ok(),
            reviewer_email: std::env::var("FIRST_REVIEWER_EMAIL").ok(),
            reviewer_password: std::env::var("FIRST_REVIEWER_PASSWORD").ok(),
        }
    }
}

impl AppConfig {
    /// Load complete application configuration from environment
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            server: ServerConfig::default(),
            auth: AuthConfig::from_env()?,
            email: EmailConfig::from_env(),
            seed: SeedConfig::from_env(),
        })
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".into());
        }
        if self.auth.secret_key.is_empty() {
            return Err("SECRET_KEY cannot be empty".into());
        }
        if self.auth.access_token_expire_minutes <= 0 {
            return Err("ACCESS_TOKEN_EXPIRE_MINUTES must be positive".into());
        }
        if self.auth.refresh_token_expire_minutes <= 0 {
            return Err("REFRESH_TOKEN_EXPIRE_MINUTES must be positive".into());
        }
        if self.auth.otp_expire_seconds <= 0 {
            return Err("EMAIL_OTP_EXPIRE_SECONDS must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert!(!config.host.is_empty());
        assert!(config.port > 0);
    }

    #[test]
    fn test_env_helpers() {
        assert_eq!(env::get_u16("NONEXISTENT_U16", 42), 42);
        assert_eq!(env::get_i64("NONEXISTENT_I64", -7), -7);
        assert_eq!(env::get_string("NONEXISTENT_STRING", "default"), "default");
        assert!(env::get_required("NONEXISTENT_REQUIRED").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let config = AppConfig {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8000,
                cors_origins: vec!["*".into()],
            },
            auth: AuthConfig {
                secret_key: String::new(),
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
        };
        assert!(config.validate().is_err());
    }
}
