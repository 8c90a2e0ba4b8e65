//! Little Dragon Gateway HTTP Server
//!
//! Same-origin API routes for browser clients: chat forwarding, cookie-based
//! login/logout, registration, and health.

pub mod auth;
pub mod auth_routes;
pub mod chat_proxy;
pub mod error;
pub mod health_api;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, start_server, GatewayConfig, GatewayState};
