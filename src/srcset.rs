//! Responsive-image srcset rewriting.
//!
//! The base image URL produced by the downsize pipeline already carries a
//! transform segment for one size (e.g. `f=auto,w=1500,h=1500/`). Each srcset
//! candidate is that same image at another width, so rewriting a candidate
//! means swapping the segment for one with the candidate's width — height
//! omitted, since a `w` descriptor constrains one axis only.

use crate::params::ParameterPolicy;
use regex::Regex;
use std::sync::LazyLock;

/// A srcset candidate's descriptor kind: `w` (width) or `x` (pixel density).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Width,
    Density,
}

/// One srcset candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetSource {
    pub url: String,
    pub descriptor: Descriptor,
    /// Descriptor value: pixels for `w`, density numerator for `x`.
    pub value: u32,
}

impl SrcsetSource {
    pub fn width(url: &str, value: u32) -> Self {
        Self {
            url: url.to_string(),
            descriptor: Descriptor::Width,
            value,
        }
    }
}

/// Matches a transform segment like `f=auto,w=1500,h=1500/`.
///
/// Deliberately loose (first `<char>=…/` span), matching the behavior this
/// replaces: an `=` in the object path ahead of the real segment would be
/// picked up instead. See DESIGN.md before tightening.
static TRANSFORM_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".=.*?/").expect("valid transform-segment pattern"));

/// The transform segment embedded in a URL, if any.
pub fn find_transform_segment(url: &str) -> Option<&str> {
    TRANSFORM_SEGMENT.find(url).map(|m| m.as_str())
}

/// Rewrite width-descriptor candidates against the base image URL.
///
/// Candidates whose base URL carries no transform segment (e.g. format
/// bypass was applied upstream) are left unmodified, as are density
/// descriptors.
pub fn rewrite_sources(
    mut sources: Vec<SrcsetSource>,
    img_src: &str,
    policy: &dyn ParameterPolicy,
) -> Vec<SrcsetSource> {
    for source in &mut sources {
        if source.descriptor != Descriptor::Width {
            continue;
        }

        let Some(segment) = find_transform_segment(img_src) else {
            continue;
        };

        let replacement = format!("{}/", policy.srcset_params(source.value).serialize());
        source.url = img_src.replace(segment, &replacement);
    }

    sources
}
