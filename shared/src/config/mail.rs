//! Outbound mail configuration module

use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError};

/// Mail transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Log messages instead of sending them
    #[default]
    Mock,
    /// Authenticated SMTP relay
    Smtp,
}

impl std::str::FromStr for MailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(MailProvider::Mock),
            "smtp" => Ok(MailProvider::Smtp),
            _ => Err(format!("Invalid mail provider: {}", s)),
        }
    }
}

/// SMTP credentials and message settings for code delivery
#[derive(Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Transport to use
    #[serde(default)]
    pub provider: MailProvider,

    /// SMTP relay host
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP port (465 uses implicit TLS, anything else STARTTLS)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username, usually the sender mailbox
    #[serde(default)]
    pub username: String,

    /// SMTP password or app password
    #[serde(default)]
    pub password: String,

    /// Sender address; falls back to `username` when empty
    #[serde(default)]
    pub from_address: String,

    /// Display name of the sender
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Subject line of the code email
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Custom HTML body; `{{code}}` and `{{ttl_minutes}}` are substituted
    #[serde(default)]
    pub html_template: Option<String>,

    /// Seconds before an SMTP exchange is abandoned
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("provider", &self.provider)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("subject", &self.subject)
            .field("html_template", &self.html_template.as_ref().map(|_| "<custom>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::default(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: String::new(),
            from_name: default_from_name(),
            subject: default_subject(),
            html_template: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl MailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            provider: env_or("MAIL_PROVIDER", MailProvider::Mock),
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| default_smtp_host()),
            smtp_port: env_or("SMTP_PORT", default_smtp_port()),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_address: std::env::var("MAIL_FROM_ADDRESS").unwrap_or_default(),
            from_name: std::env::var("MAIL_FROM_NAME").unwrap_or_else(|_| default_from_name()),
            subject: std::env::var("MAIL_SUBJECT").unwrap_or_else(|_| default_subject()),
            html_template: std::env::var("MAIL_HTML_TEMPLATE").ok(),
            timeout_seconds: env_or("SMTP_TIMEOUT_SECONDS", default_timeout()),
        }
    }

    /// Create an SMTP configuration with credentials
    pub fn smtp(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            provider: MailProvider::Smtp,
            smtp_host: host.into(),
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Address messages are sent from
    pub fn sender_address(&self) -> &str {
        if self.from_address.is_empty() {
            &self.username
        } else {
            &self.from_address
        }
    }

    /// Check the settings are usable for the selected provider
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider == MailProvider::Smtp {
            if self.smtp_host.trim().is_empty() {
                return Err(ConfigError::Missing {
                    field: "mail.smtp_host".to_string(),
                });
            }
            if self.username.trim().is_empty() {
                return Err(ConfigError::Missing {
                    field: "mail.username".to_string(),
                });
            }
            if self.sender_address().trim().is_empty() {
                return Err(ConfigError::Missing {
                    field: "mail.from_address".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn default_smtp_host() -> String {
    String::from("smtp.gmail.com")
}

fn default_smtp_port() -> u16 {
    465
}

fn default_from_name() -> String {
    String::from("OTP Service")
}

fn default_subject() -> String {
    String::from("Your OTP for verification")
}

fn default_timeout() -> u64 {
    30
}
