//! Backend URL table.

/// Absolute URLs for every backend route the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base: String,
}

impl ApiEndpoints {
    pub const DEFAULT_BASE: &'static str = "http://localhost:8005";

    /// Trailing slashes on `base` are dropped so joins never double up.
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: base.as_ref().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn login(&self) -> String {
        format!("{}/auth/login", self.base)
    }

    pub fn register(&self) -> String {
        format!("{}/auth/register", self.base)
    }

    pub fn logout(&self) -> String {
        format!("{}/auth/logout", self.base)
    }

    pub fn chat(&self) -> String {
        format!("{}/api/chat", self.base)
    }

    pub fn health(&self) -> String {
        format!("{}/api/health", self.base)
    }

    /// Connectivity probe route.
    pub fn probe(&self) -> String {
        format!("{}/api/", self.base)
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base() {
        let endpoints = ApiEndpoints::default();
        assert_eq!(endpoints.chat(), "http://localhost:8005/api/chat");
        assert_eq!(endpoints.probe(), "http://localhost:8005/api/");
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let endpoints = ApiEndpoints::new("https://dragon.example.com//");
        assert_eq!(endpoints.base(), "https://dragon.example.com");
        assert_eq!(endpoints.login(), "https://dragon.example.com/auth/login");
        assert_eq!(endpoints.register(), "https://dragon.example.com/auth/register");
        assert_eq!(endpoints.logout(), "https://dragon.example.com/auth/logout");
        assert_eq!(endpoints.health(), "https://dragon.example.com/api/health");
    }
}
