//! HTTP client for the version catalog and the build script template.
//!
//! The registry serves three documents:
//! - `catalog/modules.json`: `{ name: { api: [npm, ...] } }`
//! - `catalog/data.json`: `{ name: [npm, ...] }`
//! - `gulpfile.js`: the build script copied into new projects

use crate::catalog::{CatalogError, VersionCatalog};
use std::time::Duration;
use tracing::debug;

/// Registry used when neither `SEREIN_REGISTRY` nor an explicit URL is set.
pub const DEFAULT_REGISTRY: &str = "https://serein.shannon.science";

/// Environment variable overriding the registry URL.
pub const REGISTRY_ENV: &str = "SEREIN_REGISTRY";

/// Configuration for the catalog client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL of the registry, without a trailing slash.
    pub registry: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Timeout for each request.
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let registry = std::env::var(REGISTRY_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());
        Self::with_registry(registry)
    }
}

impl CatalogConfig {
    /// Default settings for a specific registry.
    #[must_use]
    pub fn with_registry(registry: impl Into<String>) -> Self {
        let registry: String = registry.into();
        Self {
            registry: registry.trim().trim_end_matches('/').to_string(),
            user_agent: format!("serein/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn modules_url(&self) -> String {
        format!("{}/catalog/modules.json", self.registry)
    }

    #[must_use]
    pub fn data_url(&self) -> String {
        format!("{}/catalog/data.json", self.registry)
    }

    #[must_use]
    pub fn template_url(&self) -> String {
        format!("{}/gulpfile.js", self.registry)
    }
}

/// Client for the registry.
pub struct CatalogClient {
    config: CatalogConfig,
    http_client: reqwest::blocking::Client,
}

impl CatalogClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_config(CatalogConfig::default())
    }

    /// Create a client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(config: CatalogConfig) -> Result<Self, CatalogError> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Unavailable {
                url: config.registry.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { config, http_client })
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Fetch both catalog documents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if a document cannot be fetched
    /// and [`CatalogError::Malformed`] if it has the wrong shape.
    pub fn fetch_catalog(&self) -> Result<VersionCatalog, CatalogError> {
        let modules = self.download_text(&self.config.modules_url())?;
        let data = self.download_text(&self.config.data_url())?;
        let catalog = VersionCatalog::from_json(&modules, &data)?;
        debug!(registry = %self.config.registry, packages = catalog.len(), "fetched version catalog");
        Ok(catalog)
    }

    /// Fetch the build script template.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the template cannot be fetched.
    pub fn fetch_template(&self) -> Result<Vec<u8>, CatalogError> {
        self.download(&self.config.template_url())
    }

    fn download_text(&self, url: &str) -> Result<String, CatalogError> {
        let bytes = self.download(url)?;
        String::from_utf8(bytes).map_err(|e| CatalogError::Unavailable {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let unavailable = |reason: String| CatalogError::Unavailable {
            url: url.to_string(),
            reason,
        };

        debug!(url, "downloading");
        let response = self
            .http_client
            .get(url)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!(
                "server returned status {}",
                response.status()
            )));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_urls() {
        let config = CatalogConfig::with_registry("https://example.test/serein/");
        assert_eq!(config.registry, "https://example.test/serein");
        assert_eq!(
            config.modules_url(),
            "https://example.test/serein/catalog/modules.json"
        );
        assert_eq!(config.data_url(), "https://example.test/serein/catalog/data.json");
        assert_eq!(config.template_url(), "https://example.test/serein/gulpfile.js");
    }

    #[test]
    fn test_config_user_agent() {
        let config = CatalogConfig::with_registry(DEFAULT_REGISTRY);
        assert!(config.user_agent.starts_with("serein/"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_client_creation() {
        let client = CatalogClient::with_config(CatalogConfig::with_registry(DEFAULT_REGISTRY));
        assert!(client.is_ok());
    }
}
