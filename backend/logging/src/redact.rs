//! Log Redaction Layer
//!
//! Scrubs bearer tokens, `access_token` cookie values, JSON passwords and phone
//! numbers from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static COOKIE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"access_token=[^;\s]+").unwrap());
static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""password"\s*:\s*"[^"]*""#).unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");
    let redacted = COOKIE_TOKEN_RE.replace_all(&redacted, "access_token=[REDACTED_TOKEN]");
    let redacted = PASSWORD_RE.replace_all(&redacted, r#""password":"[REDACTED]""#);
    TELEPHONE_RE
        .replace_all(&redacted, "[REDACTED_PHONE]")
        .into_owned()
}
