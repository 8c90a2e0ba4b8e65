//! HTTP plumbing between the Little Dragon client and its backend.
//!
//! - [`token`]: bearer token resolution from injected key-value stores
//! - [`http`]: JSON request wrapper with error normalization and raw streaming
//! - [`endpoints`]: backend URL table
//! - [`auth`]: login, registration and logout calls

pub mod auth;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod token;

pub use auth::{validate_registration, AuthError, AuthService, LoginResponse};
pub use endpoints::ApiEndpoints;
pub use http::{ApiClient, ByteStream, RequestOptions};
pub use token::{CookieJar, FileStore, MemoryStore, TokenProvider};
