use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

/// Bucket used for uploaded media when none is configured.
pub const DEFAULT_STORAGE_BUCKET: &str = "jonco-photos";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

/// Connection settings for the hosted backend.
///
/// The anonymous key covers public catalog reads and the site's own
/// config/contact tables. The service-role key is needed for uploads,
/// schedules, testimonials and the keepalive ping, and never leaves the server.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub url: Url,
    pub anon_key: String,
    pub service_role_key: Option<String>,
    pub storage_bucket: String,
}

impl BackendConfig {
    pub fn new(
        url: &str,
        anon_key: &str,
        service_role_key: Option<&str>,
        storage_bucket: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let anon_key = anon_key.trim();
        if anon_key.is_empty() {
            return Err(ConfigError::Missing("anon key"));
        }

        let service_role_key = service_role_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        if service_role_key.is_none() {
            warn!("No service-role key configured; privileged endpoints will be unavailable");
        }

        let storage_bucket = storage_bucket
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_STORAGE_BUCKET)
            .to_string();

        info!(
            "Backend configured at {} (bucket: {})",
            parsed.as_str().trim_end_matches('/'),
            storage_bucket
        );

        Ok(Self {
            url: parsed,
            anon_key: anon_key.to_string(),
            service_role_key,
            storage_bucket,
        })
    }

    /// Base URL without trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_config() {
        let config = BackendConfig::new(
            "https://abc.supabase.co/",
            "anon",
            Some("service"),
            None,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://abc.supabase.co");
        assert_eq!(config.service_role_key.as_deref(), Some("service"));
        assert_eq!(config.storage_bucket, DEFAULT_STORAGE_BUCKET);
    }

    #[test]
    fn blank_service_key_is_absent() {
        let config = BackendConfig::new(
            "http://localhost:54321",
            "anon",
            Some("  "),
            Some("media"),
        )
        .unwrap();
        assert!(config.service_role_key.is_none());
        assert_eq!(config.storage_bucket, "media");
    }

    #[test]
    fn rejects_bad_url() {
        assert!(matches!(
            BackendConfig::new("not a url", "anon", None, None),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            BackendConfig::new("ftp://example.com", "anon", None, None),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_empty_anon_key() {
        assert!(matches!(
            BackendConfig::new("https://abc.supabase.co", "", None, None),
            Err(ConfigError::Missing("anon key"))
        ));
    }
}
