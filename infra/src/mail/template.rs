//! Rendering of the verification email

use om_shared::config::{MailConfig, OtpConfig};

/// Placeholder replaced with the code
pub const CODE_PLACEHOLDER: &str = "{{code}}";

/// Placeholder replaced with the validity window in minutes
pub const TTL_PLACEHOLDER: &str = "{{ttl_minutes}}";

/// Body used when no custom template is configured
pub const DEFAULT_HTML_TEMPLATE: &str = r#"<div style="background:#e7fbe7;padding:20px;border-radius:10px;font-family:sans-serif;">
  <h2 style="color:#2e7d32;">OTP Verification</h2>
  <p>Your OTP is:</p>
  <h1 style="color:#1b5e20;">{{code}}</h1>
  <p>This OTP is valid for <strong>{{ttl_minutes}} minutes</strong>.</p>
</div>"#;

/// Subject and HTML body for the code email
#[derive(Debug, Clone)]
pub struct OtpMailTemplate {
    subject: String,
    html_template: String,
    ttl_minutes: u64,
}

impl OtpMailTemplate {
    pub fn new(subject: impl Into<String>, html_template: Option<String>, ttl_minutes: u64) -> Self {
        Self {
            subject: subject.into(),
            html_template: html_template
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HTML_TEMPLATE.to_string()),
            ttl_minutes,
        }
    }

    pub fn from_config(mail: &MailConfig, otp: &OtpConfig) -> Self {
        Self::new(mail.subject.clone(), mail.html_template.clone(), otp.ttl_minutes())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Render the body for `code`
    pub fn render(&self, code: &str) -> String {
        self.html_template
            .replace(CODE_PLACEHOLDER, code)
            .replace(TTL_PLACEHOLDER, &self.ttl_minutes.to_string())
    }
}
