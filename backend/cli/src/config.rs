//! Runtime wiring from the loaded `DragonConfig`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dragon_chat::{ChatService, ChatServiceConfig};
use dragon_client::{ApiClient, ApiEndpoints, AuthService, CookieJar, FileStore, MemoryStore, TokenProvider};
use dragon_config::DragonConfig;
use dragon_core::KeyValueStore;
use dragon_gateway::{GatewayConfig, GatewayState};

/// Everything a subcommand needs, built once from config.
pub struct Runtime {
    pub config: DragonConfig,
    pub endpoints: ApiEndpoints,
    pub client: ApiClient,
}

impl Runtime {
    pub fn from_config(config: DragonConfig) -> Self {
        let cookies: Arc<dyn KeyValueStore> = match config.cookie_header() {
            Some(header) => Arc::new(CookieJar::from_header(&header)),
            None => Arc::new(MemoryStore::new()),
        };
        let local: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(&config.storage_dir()));
        let tokens = TokenProvider::new(cookies, local);

        Self {
            endpoints: ApiEndpoints::new(config.backend_url()),
            client: ApiClient::new(tokens),
            config,
        }
    }

    pub fn tokens(&self) -> &TokenProvider {
        self.client.tokens()
    }

    pub fn chat_service(&self, streaming: bool) -> ChatService {
        ChatService::new(
            self.client.clone(),
            self.endpoints.clone(),
            ChatServiceConfig {
                streaming,
                timeout: self.config.chat_timeout(),
                emotion_revert: self.config.emotion_revert_delay(),
            },
        )
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.client.clone(), self.endpoints.clone())
    }

    pub fn gateway(&self, port: Option<u16>) -> Result<(SocketAddr, GatewayState)> {
        let bind = self.config.gateway_bind();
        let port = port.unwrap_or_else(|| self.config.gateway_port());
        let addr: SocketAddr = format!("{bind}:{port}")
            .parse()
            .with_context(|| format!("invalid gateway address {bind}:{port}"))?;
        let state = GatewayState::new(GatewayConfig {
            backend_url: self.config.backend_url(),
            secure_cookies: self.config.secure_cookies(),
            upstream_timeout: self.config.upstream_timeout(),
        });
        Ok((addr, state))
    }
}
