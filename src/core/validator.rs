// src/core/validator.rs

use crate::core::error::ValidationError;
use url::Url;

/// Trims the raw input and rejects it when nothing is left.
///
/// No scheme or DNS checks happen here; a bad URL comes back as an error
/// from the scanning service instead.
pub fn validate_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Ok(trimmed.to_string())
}

/// Validates the URL/email pair needed to unlock the full report.
pub fn validate_order(url: Option<&str>, email: &str) -> Result<(String, String), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    let url = url.map(str::trim).filter(|u| !u.is_empty()).ok_or(ValidationError::MissingUrl)?;
    Ok((url.to_string(), email.to_string()))
}

/// Host part of a target for display, e.g. `example.com` for `https://example.com/path`.
pub fn display_host(target: &str) -> String {
    let with_scheme = if !target.starts_with("http://") && !target.starts_with("https://") {
        format!("https://{}", target)
    } else {
        target.to_string()
    };
    Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(String::from))
        .unwrap_or_else(|| target.to_string())
}
