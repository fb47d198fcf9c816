//! URL rewriting: from origin storage URLs to CDN-served variants.
//!
//! Two routing strategies, selected by [`CdnConfig`]:
//!
//! - **Direct CDN** — the storage base
//!   `https://account.blob.core.windows.net/prod` becomes
//!   `https://cdn.statically.io/img/account.blob.core.windows.net/prod`, with
//!   the storage domain embedded literally in the CDN path. Transform
//!   parameters are inserted as a path segment right after the domain:
//!   `…/img/account.blob.core.windows.net/f=auto,w=300,h=300/prod/sites/4/image.jpg`.
//!
//! - **Origin proxy** — URLs keep the origin host and parameters are inserted
//!   directly under the uploads base:
//!   `https://example.com/wp-content/uploads/f=auto,w=300,h=300/sites/4/image.jpg`.
//!   An Nginx reverse proxy (outside this crate) forwards these to the CDN.
//!
//! The segment placement functions are pure; [`Rewriter`] wires them to a
//! [`MediaLibrary`], a [`MimeClassifier`], a [`ParameterPolicy`], and a
//! downsize cache.
//!
//! See <https://statically.io/docs/using-images/> for the parameter format.

use crate::cache::{Cache, MemoryCache, downsize_key};
use crate::config::{CdnConfig, RoutingMode};
use crate::media::{AttachmentId, MediaLibrary};
use crate::mime::{MimeClassifier, StandardMimeTypes};
use crate::params::{AutoFormat, ParameterPolicy, TransformParams};
use crate::sizes::{SizeDescriptor, resolve_dimensions};
use crate::srcset::{SrcsetSource, rewrite_sources};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Substitute the storage base of `origin_url` with the CDN's
/// domain-embedding scheme: `<cdn_base>/<storage host><bucket path>`.
///
/// URLs that don't reference the storage base pass through unchanged.
pub fn build_cdn_url(storage_url: &str, origin_url: &str, cdn_base: &str) -> String {
    let Ok(parsed) = Url::parse(storage_url) else {
        return origin_url.to_string();
    };
    let Some(host) = parsed.host_str() else {
        return origin_url.to_string();
    };
    let bucket = match parsed.path() {
        "/" => "",
        path => path,
    };
    origin_url.replace(storage_url, &format!("{cdn_base}/{host}{bucket}"))
}

/// Insert a transform segment immediately after `host` in a CDN URL:
/// `…/<host>/<rest>` becomes `…/<host>/<params>/<rest>`.
///
/// An empty parameter set inserts nothing — the URL is already rewritten and
/// simply carries no transform.
pub fn insert_params_after_host(url: &str, host: &str, params: &TransformParams) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    url.replacen(host, &format!("{host}/{}", params.serialize()), 1)
}

/// Insert a transform segment directly under the uploads base:
/// `<uploads>/<rest>` becomes `<uploads>/<params>/<rest>`.
///
/// URLs outside the uploads base, and empty parameter sets, pass through
/// unchanged.
pub fn insert_params_under_uploads(
    url: &str,
    uploads_url: &str,
    params: &TransformParams,
) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    match url.strip_prefix(uploads_url) {
        Some(rest) => format!("{uploads_url}{}/{rest}", params.serialize()),
        None => url.to_string(),
    }
}

/// A computed downsize result: the CDN variant URL plus display dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Downsized {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Whether the variant resolved from a physically generated intermediate
    /// file rather than the original.
    pub is_intermediate: bool,
}

/// The rewriting pipeline over a host media library.
///
/// Construction injects the strategies; [`Rewriter::new`] wires the stock
/// ones (standard mime sets, `f=auto` parameters, process-local cache).
pub struct Rewriter<M: MediaLibrary> {
    config: CdnConfig,
    media: M,
    classifier: Box<dyn MimeClassifier>,
    params: Box<dyn ParameterPolicy>,
    cache: Box<dyn Cache<Downsized>>,
}

impl<M: MediaLibrary> Rewriter<M> {
    pub fn new(config: CdnConfig, media: M) -> Self {
        Self {
            config,
            media,
            classifier: Box::new(StandardMimeTypes::default()),
            params: Box::new(AutoFormat),
            cache: Box::new(MemoryCache::new()),
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn MimeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_params(mut self, params: Box<dyn ParameterPolicy>) -> Self {
        self.params = params;
        self
    }

    pub fn with_cache(mut self, cache: Box<dyn Cache<Downsized>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &CdnConfig {
        &self.config
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Rewrite an attachment's canonical URL for the active routing mode.
    ///
    /// Identity when rewriting is disabled (no storage URL), when the origin
    /// proxy handles routing (URLs stay on the origin host), or when the
    /// attachment is not an eligible image.
    pub fn attachment_url(&self, url: &str, id: AttachmentId) -> String {
        if self.config.routing() != RoutingMode::DirectCdn {
            return url.to_string();
        }
        let Some(mime) = self.media.mime_type(id) else {
            return url.to_string();
        };
        if !self.classifier.is_image(&mime) {
            return url.to_string();
        }
        self.rewrite_to_cdn(url)
    }

    /// Produce the CDN variant of an attachment at the requested size.
    ///
    /// `None` means "no variant can be produced" and the caller falls
    /// through to default behavior: the attachment is not an image, the
    /// named size is unknown, or rewriting is misconfigured (logged).
    ///
    /// Results are cached per `(attachment, descriptor)`; the display-width
    /// clamp is applied before caching, so repeated calls are stable.
    pub fn downsize(&self, id: AttachmentId, size: &SizeDescriptor) -> Option<Downsized> {
        let key = downsize_key(id, size);
        if let Some(cached) = self.cache.get(&key) {
            debug!(id, %size, "downsize served from cache");
            return Some(cached);
        }

        let mime = self.media.mime_type(id)?;
        if !self.classifier.is_image(&mime) {
            return None;
        }

        let meta = self.media.metadata(id);
        let (width, height) = resolve_dimensions(size, meta.as_ref())?;

        let canonical = self.media.url(id)?;
        let intermediate = self.media.intermediate_url(id, size);
        let is_intermediate = intermediate.is_some();
        let source_url = intermediate.unwrap_or(canonical);

        // The CDN cannot resize vector formats; serve them untransformed
        let params = if self.classifier.bypass_resizing(&mime) {
            TransformParams::empty()
        } else {
            self.params.params(width, height, size)
        };

        let url = match self.config.routing() {
            RoutingMode::OriginProxy => {
                insert_params_under_uploads(&source_url, &self.config.uploads_url, &params)
            }
            RoutingMode::DirectCdn => {
                let host = self.config.storage_host()?;
                let cdn_url = self.rewrite_to_cdn(&source_url);
                insert_params_after_host(&cdn_url, &host, &params)
            }
            RoutingMode::Disabled => {
                warn!(
                    id,
                    "storage_url is not configured; set it to your provider's public \
                     cloud storage URL, e.g. https://account.blob.core.windows.net/container"
                );
                return None;
            }
        };

        let (width, height) = self.media.constrain_for_display(width, height);

        let data = Downsized {
            url,
            width,
            height,
            is_intermediate,
        };
        self.cache.set(&key, data.clone());

        Some(data)
    }

    /// Rewrite srcset candidates so each width variant carries its own
    /// transform segment. Non-raster attachments pass through unchanged.
    pub fn filter_srcset(
        &self,
        sources: Vec<SrcsetSource>,
        img_src: &str,
        id: AttachmentId,
    ) -> Vec<SrcsetSource> {
        let bypass = self
            .media
            .mime_type(id)
            .is_some_and(|mime| self.classifier.bypass_resizing(&mime));
        if bypass {
            return sources;
        }
        rewrite_sources(sources, img_src, self.params.as_ref())
    }

    fn rewrite_to_cdn(&self, url: &str) -> String {
        match &self.config.storage_url {
            Some(storage) => build_cdn_url(storage, url, &self.config.cdn_base),
            None => url.to_string(),
        }
    }
}
