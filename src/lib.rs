//! # edgesize
//!
//! Route media-library images through the [statically.io](https://statically.io)
//! CDN and synthesize intermediate-size metadata on the fly, so one stored
//! original serves every registered image size — the CDN does the resizing
//! and format negotiation at the edge, not the origin server.
//!
//! # Architecture: Rewrite Pipeline
//!
//! ```text
//! 1. Synthesize   attachment metadata  →  virtual size entries (no files)
//! 2. Resolve      size descriptor + metadata  →  target dimensions + source URL
//! 3. Rewrite      source URL + transform params  →  CDN variant URL
//! 4. Cache        (attachment, descriptor)  →  computed variant
//! ```
//!
//! Every stage is a pure function of the attachment, the descriptor, and the
//! configuration; only the injected cache carries state between calls, and a
//! missed entry is simply recomputed — concurrent recomputation is safe.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `CdnConfig` — storage URL, routing mode, crop policy; TOML loading and validation |
//! | [`media`] | `MediaLibrary` collaborator trait and the attachment metadata wire types |
//! | [`sizes`] | Size descriptors, the registered-size registry, dimension resolution, crop gate |
//! | [`metadata`] | `Synthesizer` — virtual size entries for sizes that were never generated |
//! | [`params`] | Transform parameters (`f=auto,w=…,h=…`) and the `ParameterPolicy` strategy |
//! | [`mime`] | Raster/bypass mime classification strategy |
//! | [`rewrite`] | URL rewriting for both routing modes and the `Rewriter` facade |
//! | [`srcset`] | Per-candidate srcset transform-segment rewriting |
//! | [`cache`] | Injected get/set cache capability and key construction |
//!
//! # Design Decisions
//!
//! ## One File, Many Sizes
//!
//! Hosts traditionally pre-generate a cropped file per registered size on
//! upload. With a CDN resizing at request time those files are dead weight:
//! any uncropped size is derivable from the original by scaling. edgesize
//! keeps exactly one file and synthesizes the rest of the size metadata
//! ([`metadata::Synthesizer`]), gating physical generation down to the
//! hard-cropped sizes that genuinely need it
//! ([`sizes::remove_uncropped_sizes`]) — or to nothing at all.
//!
//! ## Two Routing Modes
//!
//! Direct CDN mode embeds the storage domain in a `cdn.statically.io` path.
//! Origin-proxy mode keeps origin URLs and injects the transform segment
//! under the uploads base, for deployments that front statically.io with
//! their own Nginx proxy (cookies, CSP, vanity domains). Both live in
//! [`rewrite`]; the mode is plain configuration.
//!
//! ## Strategies Over Hooks
//!
//! Extension points that would be filter hooks in a plugin host are explicit
//! trait objects injected at construction: [`params::ParameterPolicy`] for
//! the transform set, [`mime::MimeClassifier`] for eligibility, and
//! [`cache::Cache`] for memoization. The stock implementations cover the
//! standard deployment.
//!
//! ## Fall-Through Sentinels, Not Errors
//!
//! "Cannot produce a variant" is an expected outcome (non-image attachment,
//! unknown size name, rewriting disabled), so the pipeline answers with
//! `Option` and the host falls back to its default rendering. The only
//! logged condition is real misconfiguration: a downsize attempted with no
//! storage URL set. Configuration problems proper fail fast at load time
//! ([`config::ConfigError`]).

pub mod cache;
pub mod config;
pub mod media;
pub mod metadata;
pub mod mime;
pub mod params;
pub mod rewrite;
pub mod sizes;
pub mod srcset;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use cache::{Cache, MemoryCache};
pub use config::{CdnConfig, ConfigError, RoutingMode};
pub use media::{AttachmentId, AttachmentMetadata, MediaLibrary, SizeMeta};
pub use metadata::Synthesizer;
pub use mime::{MimeClassifier, StandardMimeTypes};
pub use params::{AutoFormat, ParameterPolicy, TransformParams};
pub use rewrite::{Downsized, Rewriter};
pub use sizes::{SizeDefinition, SizeDescriptor, SizeRegistry};
pub use srcset::{Descriptor, SrcsetSource};
