//! CDN configuration.
//!
//! Everything the rewriter needs to know about the deployment lives in one
//! explicit [`CdnConfig`] struct, loaded from a sparse `config.toml` —
//! override just the values you want:
//!
//! ```toml
//! # Public cloud-storage base URL. Required for direct CDN rewriting;
//! # leave unset to disable rewriting entirely.
//! storage_url = "https://account.blob.core.windows.net/prod"
//!
//! # Route through an Nginx reverse proxy at the origin instead of
//! # cdn.statically.io directly. Default: false.
//! origin_proxy = false
//!
//! # Uploads base URL, used to compute relative paths in origin-proxy mode.
//! uploads_url = "https://example.com/wp-content/uploads/"
//!
//! # Physically generate cropped thumbnails. When false every size is
//! # virtual and resolved through synthesized metadata. Default: true.
//! create_thumbnails = true
//!
//! # Editor display-width clamp applied to resolved dimensions.
//! # Omit for no clamp.
//! max_content_width = 1024
//! ```
//!
//! Unknown keys are rejected to catch typos early. Validation happens at
//! construction: a storage URL without a parseable host is a [`ConfigError`]
//! here, not a silent rewrite failure later.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// statically.io image endpoint. The `/img/` route handles format
/// negotiation and resizing.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.statically.io/img";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How image URLs are routed to the CDN. Derived from [`CdnConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingMode {
    /// No storage URL configured and no proxy: rewriting is a no-op.
    Disabled,
    /// Rewrite onto `cdn.statically.io` directly, embedding the storage
    /// domain in the CDN path.
    DirectCdn,
    /// Keep origin URLs and inject transform parameters under the uploads
    /// base; an external reverse proxy forwards to the CDN.
    OriginProxy,
}

/// CDN rewriting configuration.
///
/// All fields have defaults; a default config disables rewriting entirely
/// (no storage URL, no proxy).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CdnConfig {
    /// Public cloud-storage base URL, e.g.
    /// `https://account.blob.core.windows.net/container`. `None` disables
    /// direct CDN rewriting.
    pub storage_url: Option<String>,
    /// Route through an origin reverse proxy instead of the CDN domain.
    pub origin_proxy: bool,
    /// Whether cropped thumbnails are physically generated on upload.
    pub create_thumbnails: bool,
    /// Uploads base URL (with trailing slash) for origin-proxy path
    /// computation.
    pub uploads_url: String,
    /// Maximum editor display width; resolved dimensions are clamped to it.
    pub max_content_width: Option<u32>,
    /// CDN image endpoint. Overridable for self-hosted statically instances.
    pub cdn_base: String,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            storage_url: None,
            origin_proxy: false,
            create_thumbnails: true,
            uploads_url: String::new(),
            max_content_width: None,
            cdn_base: DEFAULT_CDN_BASE.to_string(),
        }
    }
}

impl CdnConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(storage) = &self.storage_url {
            let parsed = Url::parse(storage).map_err(|e| {
                ConfigError::Validation(format!("storage_url is not a valid URL: {e}"))
            })?;
            if parsed.host_str().is_none() {
                return Err(ConfigError::Validation(
                    "storage_url must contain a host".into(),
                ));
            }
        }
        if self.origin_proxy && self.uploads_url.is_empty() {
            return Err(ConfigError::Validation(
                "uploads_url must be set when origin_proxy is enabled".into(),
            ));
        }
        Ok(())
    }

    /// The effective routing mode.
    pub fn routing(&self) -> RoutingMode {
        if self.origin_proxy {
            RoutingMode::OriginProxy
        } else if self.storage_url.is_some() {
            RoutingMode::DirectCdn
        } else {
            RoutingMode::Disabled
        }
    }

    /// Host of the configured storage URL. Validation guarantees this is
    /// `Some` whenever `storage_url` is.
    pub fn storage_host(&self) -> Option<String> {
        let storage = self.storage_url.as_deref()?;
        let parsed = Url::parse(storage).ok()?;
        parsed.host_str().map(String::from)
    }
}

/// The stock config as documented TOML, for the `gen-config` subcommand.
pub fn stock_config_toml() -> String {
    "\
# edgesize configuration — all options shown with their defaults.
# Sparse overrides: keep only the lines you change.

# Public cloud-storage base URL. Required for direct CDN rewriting;
# leave commented out to disable rewriting entirely.
# storage_url = \"https://account.blob.core.windows.net/container\"

# Keep origin URLs and inject transform parameters as a path segment,
# relying on an Nginx reverse proxy to forward to statically.io.
origin_proxy = false

# Uploads base URL (trailing slash), required in origin-proxy mode.
uploads_url = \"\"

# Physically generate cropped thumbnails. When false, every size is
# virtual: a single stored file serves all sizes via the CDN.
create_thumbnails = true

# Editor display-width clamp. Omit for no clamp.
# max_content_width = 1024

# statically.io image endpoint.
cdn_base = \"https://cdn.statically.io/img\"
"
    .to_string()
}
