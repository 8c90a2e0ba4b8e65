//! Gateway Authentication Module
//!
//! Resolves the caller's bearer token for forwarded calls and builds the
//! `access_token` session cookie.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use dragon_client::TokenProvider;
use dragon_core::ACCESS_TOKEN_KEY;
use tracing::debug;

/// Token source for one request: an `Authorization: Bearer` header wins,
/// otherwise the `access_token` cookie. Never rejects; a caller without a
/// token is forwarded unauthenticated.
pub struct CallerTokens(pub TokenProvider);

#[async_trait]
impl<S> FromRequestParts<S> for CallerTokens
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        let tokens = TokenProvider::from_cookie_header(&cookies);

        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(token) = bearer {
            return Ok(CallerTokens(TokenProvider::from_token(token)));
        }
        debug!(has_token = tokens.resolve().is_some(), "Resolved caller token from cookies");
        Ok(CallerTokens(tokens))
    }
}

/// `Set-Cookie` value establishing the session.
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{ACCESS_TOKEN_KEY}={token}; HttpOnly; SameSite=Lax; Path=/");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn cleared_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{ACCESS_TOKEN_KEY}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> TokenProvider {
        let (mut parts, _) = request.into_parts();
        let CallerTokens(tokens) = CallerTokens::from_request_parts(&mut parts, &()).await.unwrap();
        tokens
    }

    #[tokio::test]
    async fn test_bearer_header_wins() {
        let request = Request::builder()
            .header("authorization", "Bearer from-header")
            .header("cookie", "access_token=from-cookie")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.resolve().as_deref(), Some("from-header"));
    }

    #[tokio::test]
    async fn test_bearer_header_kept_verbatim() {
        let request = Request::builder()
            .header("authorization", "Bearer abc;def=ghi")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.resolve().as_deref(), Some("abc;def=ghi"));
    }

    #[tokio::test]
    async fn test_cookie_fallback() {
        let request = Request::builder()
            .header("cookie", "theme=dark")
            .header("cookie", "access_token=from-cookie")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.resolve().as_deref(), Some("from-cookie"));
    }

    #[tokio::test]
    async fn test_no_token() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.resolve().is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        assert_eq!(
            session_cookie("abc", false),
            "access_token=abc; HttpOnly; SameSite=Lax; Path=/"
        );
        assert!(session_cookie("abc", true).ends_with("; Secure"));
        let cleared = cleared_cookie(false);
        assert!(cleared.starts_with("access_token=;"));
        assert!(cleared.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }
}
