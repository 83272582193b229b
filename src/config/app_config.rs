//! Application configuration structures
//!
//! This module contains the main configuration structures for the application.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use validator::Validate;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server address to bind to
    pub bind_address: IpAddr,

    /// Server port
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Maximum request size in bytes (multipart uploads included)
    #[validate(range(min = 1024, max = 52428800))] // 1KB to 50MB
    pub max_request_size: u64,

    /// Externally reachable base URL, used for the payment notification URL
    #[validate(url)]
    pub public_url: String,
}

/// Frontend links embedded in outgoing emails
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FrontendConfig {
    #[validate(url)]
    pub base_url: String,

    #[validate(length(min = 1))]
    pub confirm_path: String,

    #[validate(length(min = 1))]
    pub reset_path: String,

    #[validate(length(min = 1))]
    pub login_path: String,
}

impl FrontendConfig {
    /// Account confirmation link for a token
    pub fn confirm_link(&self, token: &str) -> String {
        format!("{}{}/{}", self.base_url.trim_end_matches('/'), self.confirm_path, token)
    }

    /// Password reset link for a token
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}{}/{}", self.base_url.trim_end_matches('/'), self.reset_path, token)
    }

    pub fn login_link(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.login_path)
    }
}

/// JWT configuration.
///
/// Session tokens and confirmation/reset tokens are signed with different
/// secrets so one kind can never be replayed as the other.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JwtConfig {
    /// Secret for session tokens
    #[validate(length(min = 32))]
    pub session_secret: String,

    /// Secret for confirmation and password reset tokens
    #[validate(length(min = 32))]
    pub confirmation_secret: String,

    /// JWT issuer
    #[validate(length(min = 1))]
    pub issuer: String,

    /// Session token lifetime in seconds
    #[validate(range(min = 60, max = 86400))]
    pub session_ttl_seconds: u64,

    /// Confirmation and reset token lifetime in seconds
    #[validate(range(min = 300, max = 604800))]
    pub confirmation_ttl_seconds: u64,
}

/// Argon2 parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordConfig {
    #[validate(range(min = 8, max = 1048576))]
    pub memory_cost_kib: u32,

    #[validate(range(min = 1, max = 10))]
    pub iterations: u32,

    #[validate(range(min = 1, max = 16))]
    pub parallelism: u32,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecurityConfig {
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,

    /// Allowed CORS methods
    pub cors_methods: Vec<String>,

    /// Allowed CORS headers
    pub cors_headers: Vec<String>,

    /// Enable security headers
    pub enable_security_headers: bool,

    /// Trusted proxy headers
    pub trusted_proxy_headers: Vec<String>,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Password hashing configuration
    pub password: PasswordConfig,
}

/// Session cookie attributes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionConfig {
    #[validate(length(min = 1, max = 64))]
    pub cookie_name: String,

    /// Cookie domain; omitted from the cookie when unset
    pub domain: Option<String>,

    #[validate(length(min = 1))]
    pub path: String,

    #[validate(range(min = 60, max = 604800))]
    pub max_age_seconds: u64,

    pub secure: bool,

    pub http_only: bool,

    /// One of `Strict`, `Lax`, `None`
    #[validate(length(min = 3))]
    pub same_site: String,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// Requests per minute per IP
    #[validate(range(min = 1, max = 10000))]
    pub requests_per_minute: u32,

    /// Burst size
    #[validate(range(min = 1, max = 1000))]
    pub burst_size: u32,

    /// Enable rate limiting
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level
    #[validate(length(min = 1))]
    pub level: String,

    /// Log format, `text` or `json`
    #[validate(length(min = 1))]
    pub format: String,

    /// Enable structured logging
    pub structured: bool,
}

/// Document store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Redis connection URL, required by the redis backend
    pub redis_url: Option<String>,

    /// Prefix applied to every key
    #[validate(length(min = 1, max = 64))]
    pub key_prefix: String,
}

/// EmailJS configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MailConfig {
    /// When disabled, outgoing mail is only logged
    pub enabled: bool,

    #[validate(url)]
    pub api_url: String,

    pub service_id: String,

    pub template_id: String,

    pub public_key: String,

    pub private_key: String,

    #[validate(range(min = 1, max = 120))]
    pub timeout_seconds: u64,
}

/// Mercado Pago configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentsConfig {
    pub enabled: bool,

    #[validate(url)]
    pub api_url: String,

    pub access_token: String,

    #[validate(url)]
    pub success_url: String,

    #[validate(url)]
    pub failure_url: String,

    #[validate(url)]
    pub pending_url: String,

    #[validate(range(min = 1, max = 120))]
    pub timeout_seconds: u64,

    #[validate(range(min = 0, max = 10))]
    pub max_retries: u32,
}

/// Avatar upload configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadsConfig {
    /// Directory served under `public_path`
    #[validate(length(min = 1))]
    pub root_dir: String,

    #[validate(length(min = 2))]
    pub public_path: String,

    #[validate(range(min = 1024, max = 52428800))]
    pub max_file_size: u64,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub frontend: FrontendConfig,
    pub security: SecurityConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub mail: MailConfig,
    pub payments: PaymentsConfig,
    pub uploads: UploadsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: IpAddr::from([127, 0, 0, 1]),
                port: 4000,
                max_request_size: 5 * 1024 * 1024, // 5MB
                public_url: "http://localhost:4000".to_string(),
            },
            frontend: FrontendConfig {
                base_url: "http://localhost:5173".to_string(),
                confirm_path: "/confirmar".to_string(),
                reset_path: "/reset".to_string(),
                login_path: "/login".to_string(),
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:5173".to_string()],
                cors_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
                cors_headers: vec![
                    "Content-Type".to_string(),
                    "Authorization".to_string(),
                    "Accept".to_string(),
                ],
                enable_security_headers: true,
                trusted_proxy_headers: vec!["X-Forwarded-For".to_string()],
                jwt: JwtConfig {
                    session_secret: "development-session-secret-change-me-0001".to_string(),
                    confirmation_secret: "development-confirmation-secret-change-me-01".to_string(),
                    issuer: "fitnet-server".to_string(),
                    session_ttl_seconds: 20 * 60,
                    confirmation_ttl_seconds: 24 * 60 * 60,
                },
                password: PasswordConfig {
                    memory_cost_kib: 19 * 1024,
                    iterations: 2,
                    parallelism: 1,
                },
            },
            session: SessionConfig {
                cookie_name: "authToken".to_string(),
                domain: None,
                path: "/".to_string(),
                max_age_seconds: 30 * 60,
                secure: true,
                http_only: true,
                same_site: "None".to_string(),
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: 600,
                burst_size: 60,
                enabled: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
                structured: false,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                redis_url: None,
                key_prefix: "fitnet".to_string(),
            },
            mail: MailConfig {
                enabled: false,
                api_url: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
                service_id: String::new(),
                template_id: String::new(),
                public_key: String::new(),
                private_key: String::new(),
                timeout_seconds: 10,
            },
            payments: PaymentsConfig {
                enabled: false,
                api_url: "https://api.mercadopago.com".to_string(),
                access_token: String::new(),
                success_url: "http://localhost:5173/pago/exito".to_string(),
                failure_url: "http://localhost:5173/pago/error".to_string(),
                pending_url: "http://localhost:5173/pago/pendiente".to_string(),
                timeout_seconds: 15,
                max_retries: 2,
            },
            uploads: UploadsConfig {
                root_dir: "uploads".to_string(),
                public_path: "/uploads".to_string(),
                max_file_size: 2 * 1024 * 1024, // 2MB
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("Conf").required(false))
            .add_source(config::Environment::with_prefix("GYM_API").separator("__"))
            .build()
            .map_err(|e| {
                crate::shared::error::AppError::Config(format!("Failed to build configuration: {}", e))
            })?;

        let config: AppConfig = config.try_deserialize().map_err(|e| {
            crate::shared::error::AppError::Config(format!(
                "Failed to deserialize configuration: {}",
                e
            ))
        })?;

        config.validate_config().map_err(|e| {
            crate::shared::error::AppError::Config(format!("Configuration validation failed: {}", e))
        })?;

        crate::config::ConfigValidator::validate_config(&config)?;

        Ok(config)
    }

    /// Validate every section
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.frontend.validate()?;
        self.security.validate()?;
        self.security.jwt.validate()?;
        self.security.password.validate()?;
        self.session.validate()?;
        self.rate_limit.validate()?;
        self.logging.validate()?;
        self.store.validate()?;
        self.mail.validate()?;
        self.payments.validate()?;
        self.uploads.validate()?;

        Ok(())
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// Notification URL handed to the payment gateway
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.server.public_url.trim_end_matches('/'))
    }
}
