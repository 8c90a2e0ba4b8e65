//! Uniform JSON request wrapper around `reqwest`.
//!
//! Every call sends `Content-Type`/`Accept: application/json`, merges caller
//! headers, attaches the bearer token when one resolves, and normalizes
//! failures into [`ChatError`].

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use dragon_core::ChatError;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{classify_transport, status_error};
use crate::token::TokenProvider;

/// Raw response body, read lazily. Finite and not restartable.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers; they replace defaults with the same name.
    pub headers: Vec<(String, String)>,
    /// Fail with `Timeout` after this long.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// JSON HTTP client bound to a token provider.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    tokens: TokenProvider,
}

impl ApiClient {
    pub fn new(tokens: TokenProvider) -> Self {
        Self::with_client(Client::new(), tokens)
    }

    pub fn with_client(client: Client, tokens: TokenProvider) -> Self {
        Self { client, tokens }
    }

    /// Same connection pool, different token source.
    pub fn with_tokens(&self, tokens: TokenProvider) -> Self {
        Self {
            client: self.client.clone(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, ChatError> {
        let builder = self.build(Method::GET, url, &options)?;
        let response = self.execute(builder).await?;
        decode(response).await
    }

    pub async fn post<T, B>(&self, url: &str, body: &B, options: RequestOptions) -> Result<T, ChatError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.build(Method::POST, url, &options)?.json(body);
        let response = self.execute(builder).await?;
        decode(response).await
    }

    pub async fn put<T, B>(&self, url: &str, body: &B, options: RequestOptions) -> Result<T, ChatError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.build(Method::PUT, url, &options)?.json(body);
        let response = self.execute(builder).await?;
        decode(response).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T, ChatError> {
        let builder = self.build(Method::DELETE, url, &options)?;
        let response = self.execute(builder).await?;
        decode(response).await
    }

    /// GET that only checks for a 2xx status, ignoring the body.
    pub async fn ping(&self, url: &str, options: RequestOptions) -> Result<(), ChatError> {
        let builder = self.build(Method::GET, url, &options)?;
        self.execute(builder).await.map(|_| ())
    }

    /// POST `body` and hand back the response body as a lazy byte stream.
    ///
    /// The status is checked before returning, so a non-2xx reply fails here
    /// rather than mid-stream. No timeout applies; the stream ends when the
    /// server closes the response.
    pub async fn stream<B>(&self, url: &str, body: &B) -> Result<ByteStream, ChatError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self
            .build(Method::POST, url, &RequestOptions::default())?
            .json(body);
        let response = self.execute(builder).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| classify_transport(&e)));
        Ok(Box::pin(stream))
    }

    fn build(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<RequestBuilder, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ChatError::Unknown(format!("Invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ChatError::Unknown(format!("Invalid value for header {name}")))?;
            headers.insert(name, value);
        }

        match self.tokens.bearer() {
            Some(bearer) => match HeaderValue::from_str(&bearer) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored access token is not a valid header value; sending unauthenticated"),
            },
            None => debug!(%url, "No access token; sending unauthenticated"),
        }

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ChatError> {
        let response = builder.send().await.map_err(|e| classify_transport(&e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let err = status_error(status.as_u16(), &body);
        debug!(status = status.as_u16(), error = %err, "Backend rejected request");
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ChatError> {
    let body = response.bytes().await.map_err(|e| classify_transport(&e))?;
    // An empty body decodes like JSON `null` so `()` and `Option<_>` work.
    let body: &[u8] = if body.is_empty() { b"null" } else { &body };
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Undecodable response body");
        ChatError::invalid_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragon_core::ErrorKind;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authed(token: &str) -> ApiClient {
        let tokens = TokenProvider::anonymous();
        tokens.store(token).unwrap();
        ApiClient::new(tokens)
    }

    #[tokio::test]
    async fn test_post_sends_json_headers_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .and(header("authorization", "Bearer tok-123"))
            .and(body_json(json!({"ping": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "pong"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed("tok-123");
        let reply: Value = client
            .post(&format!("{}/api/chat", server.uri()), &json!({"ping": 1}), RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(reply["message"], "pong");
    }

    #[tokio::test]
    async fn test_caller_headers_merge() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .and(header("x-trace", "abc"))
            .and(header("accept", "text/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let options = RequestOptions::default()
            .with_header("x-trace", "abc")
            .with_header("Accept", "text/plain");
        let reply: Value = ApiClient::new(TokenProvider::anonymous())
            .get(&format!("{}/api/health", server.uri()), options)
            .await
            .unwrap();
        assert_eq!(reply["status"], "ok");
    }

    #[tokio::test]
    async fn test_non_2xx_uses_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden zone"})))
            .mount(&server)
            .await;

        let err = ApiClient::new(TokenProvider::anonymous())
            .put::<Value, _>(&server.uri(), &json!({}), RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::Server {
            status: 403,
            message: "Forbidden zone".into()
        });
    }

    #[tokio::test]
    async fn test_non_2xx_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = ApiClient::new(TokenProvider::anonymous())
            .delete::<Value>(&server.uri(), RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "HTTP error: status 404");
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = ApiClient::new(TokenProvider::anonymous())
            .get::<Value>(&server.uri(), RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponseFormat);
    }

    #[tokio::test]
    async fn test_timeout_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = ApiClient::new(TokenProvider::anonymous())
            .get::<Value>(
                &server.uri(),
                RequestOptions::default().with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_connection_refused_is_normalized() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = ApiClient::new(TokenProvider::anonymous())
            .get::<Value>(&format!("http://127.0.0.1:{port}/api/"), RequestOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_stream_yields_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("data: hi\n\ndata: there\n\n", "text/event-stream"),
            )
            .mount(&server)
            .await;

        let mut stream = ApiClient::new(TokenProvider::anonymous())
            .stream(&format!("{}/api/chat", server.uri()), &json!({}))
            .await
            .unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"data: hi\n\ndata: there\n\n");
    }

    #[tokio::test]
    async fn test_stream_checks_status_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "down"})))
            .mount(&server)
            .await;

        let result = ApiClient::new(TokenProvider::anonymous())
            .stream(&server.uri(), &json!({}))
            .await;
        match result {
            Err(err) => assert_eq!(err.status(), Some(503)),
            Ok(_) => panic!("expected a server error"),
        }
    }
}
