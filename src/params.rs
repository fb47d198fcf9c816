//! Transform parameters for statically.io image requests.
//!
//! statically.io accepts its transform options as a single path segment of
//! comma-joined `key=value` pairs, e.g. `f=auto,w=300,h=300`. These structs
//! describe *what* transform to request, not *where* it goes in the URL —
//! segment placement is the [`rewrite`](crate::rewrite) module's job.
//!
//! ## Types
//!
//! - [`TransformParams`] — Ordered `key=value` mapping with a stable
//!   serialization. Order is insertion order, so the same inputs always
//!   produce the same string (required for both URLs and cache keys).
//! - [`ParameterPolicy`] — Strategy for building the parameter set from a
//!   resolved size. Injected into the rewriter so hosts can extend the set
//!   (quality, device-pixel-ratio, …) without touching rewrite logic.
//! - [`AutoFormat`] — Default policy: `f=auto` plus width and height.

use crate::sizes::SizeDescriptor;

/// An ordered set of statically.io transform parameters.
///
/// Zero and empty values are dropped on insertion: a `w=0` carries no
/// information and the CDN treats a missing key as "don't constrain".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformParams {
    entries: Vec<(String, String)>,
}

impl TransformParams {
    /// An empty parameter set. Serializes to `""`, which the rewriter
    /// treats as "insert no transform segment".
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard set for a resolved size: `f=auto,w=<w>,h=<h>`.
    pub fn auto(width: u32, height: u32) -> Self {
        let mut params = Self::empty();
        params.push("f", "auto");
        params.push_dimension("w", width);
        params.push_dimension("h", height);
        params
    }

    /// The set used for srcset width candidates: `f=auto,w=<w>`.
    /// Height is omitted — a `w` descriptor constrains one axis only.
    pub fn auto_width(width: u32) -> Self {
        let mut params = Self::empty();
        params.push("f", "auto");
        params.push_dimension("w", width);
        params
    }

    /// Append a `key=value` pair. Empty values are dropped.
    pub fn push(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.entries.push((key.to_string(), value.to_string()));
    }

    /// Append a pixel dimension. Zero is dropped.
    pub fn push_dimension(&mut self, key: &str, value: u32) {
        if value == 0 {
            return;
        }
        self.push(key, &value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the statically.io segment form: `f=auto,w=300,h=300`.
    ///
    /// Insertion order is preserved, so serialization is stable across calls
    /// with the same inputs.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Strategy for constructing transform parameters.
///
/// The default is [`AutoFormat`]. Hosts that need extra parameters (e.g.
/// `q=<quality>`) implement this once and inject it into the
/// [`Rewriter`](crate::rewrite::Rewriter) at construction.
pub trait ParameterPolicy: Send + Sync {
    /// Parameters for a resolved downsize of `size` to `width` × `height`.
    fn params(&self, width: u32, height: u32, size: &SizeDescriptor) -> TransformParams;

    /// Parameters for a srcset width candidate.
    fn srcset_params(&self, width: u32) -> TransformParams {
        TransformParams::auto_width(width)
    }
}

/// Default policy: format negotiation (`f=auto`) plus the resolved
/// width and height.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoFormat;

impl ParameterPolicy for AutoFormat {
    fn params(&self, width: u32, height: u32, _size: &SizeDescriptor) -> TransformParams {
        TransformParams::auto(width, height)
    }
}
