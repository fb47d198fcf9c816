//! Size descriptors, the registered-size registry, and dimension resolution.
//!
//! A media library names its image sizes (`thumbnail`, `medium`, theme-added
//! customs) and callers may also request explicit pixel dimensions. This
//! module models both forms as [`SizeDescriptor`], resolves a descriptor to
//! target dimensions against attachment metadata, and hosts the two pure
//! policies around registered sizes:
//!
//! - [`SizeRegistry`] — where a size's definition comes from: theme-registered
//!   definitions first, site-option defaults (`<name>_size_w` and friends)
//!   as fallback.
//! - [`remove_uncropped_sizes`] — the crop gate: uncropped sizes never need a
//!   physically generated file (the CDN derives them from the full image), so
//!   only cropped sizes survive thumbnail generation. With thumbnail creation
//!   disabled entirely, no size does.
//!
//! All functions here are pure and testable without a media library.

use crate::media::AttachmentMetadata;
use serde::ser::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// A requested image size: the full original, a registered named size, or
/// explicit pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SizeDescriptor {
    /// The attachment's original dimensions.
    Full,
    /// A registered named size, e.g. `medium`.
    Named(String),
    /// An explicit `(width, height)` pair; resolved without a metadata lookup.
    Dimensions(u32, u32),
}

/// Canonical serialization used for cache keys: `"full"`, `"<name>"`, or
/// `[w, h]`. One form per value, so semantically equal descriptors always
/// serialize identically.
impl Serialize for SizeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SizeDescriptor::Full => serializer.serialize_str("full"),
            SizeDescriptor::Named(name) => serializer.serialize_str(name),
            SizeDescriptor::Dimensions(w, h) => [*w, *h].serialize(serializer),
        }
    }
}

impl fmt::Display for SizeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeDescriptor::Full => write!(f, "full"),
            SizeDescriptor::Named(name) => write!(f, "{name}"),
            SizeDescriptor::Dimensions(w, h) => write!(f, "{w}x{h}"),
        }
    }
}

/// Parse `full`, `<name>`, or `<w>x<h>` (CLI form).
impl FromStr for SizeDescriptor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "full" {
            return Ok(SizeDescriptor::Full);
        }
        if let Some((w, h)) = s.split_once('x')
            && let (Ok(w), Ok(h)) = (w.parse(), h.parse())
        {
            return Ok(SizeDescriptor::Dimensions(w, h));
        }
        Ok(SizeDescriptor::Named(s.to_string()))
    }
}

/// A registered size definition: target dimensions plus whether the size is
/// hard-cropped to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SizeDefinition {
    pub width: u32,
    pub height: u32,
    pub crop: bool,
}

impl SizeDefinition {
    pub fn new(width: u32, height: u32, crop: bool) -> Self {
        Self {
            width,
            height,
            crop,
        }
    }
}

/// The set of registered size names and their definitions.
///
/// Mirrors how hosts register sizes from two places: theme code (complete
/// definitions) and site options (stored per-field defaults). Lookup prefers
/// the theme definition and falls back to the option defaults; a name with
/// neither resolves to a zeroed definition.
#[derive(Debug, Clone, Default)]
pub struct SizeRegistry {
    names: Vec<String>,
    theme: HashMap<String, SizeDefinition>,
    options: HashMap<String, SizeDefinition>,
}

impl SizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a theme-defined size.
    pub fn theme_size(mut self, name: &str, width: u32, height: u32, crop: bool) -> Self {
        self.add_name(name);
        self.theme
            .insert(name.to_string(), SizeDefinition::new(width, height, crop));
        self
    }

    /// Register a size whose definition lives in site options.
    pub fn option_size(mut self, name: &str, width: u32, height: u32, crop: bool) -> Self {
        self.add_name(name);
        self.options
            .insert(name.to_string(), SizeDefinition::new(width, height, crop));
        self
    }

    fn add_name(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    /// Registered size names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolve a name to its definition: theme first, then options, then
    /// a zeroed default.
    pub fn definition(&self, name: &str) -> SizeDefinition {
        self.theme
            .get(name)
            .or_else(|| self.options.get(name))
            .copied()
            .unwrap_or_default()
    }
}

/// Resolve a descriptor to nominal target dimensions.
///
/// - `Dimensions` needs no metadata.
/// - `Full` reads the attachment's stored dimensions (zero when unknown,
///   matching the host's behavior for metadata-less attachments).
/// - `Named` looks the size up in attachment metadata; `None` means the size
///   is unknown and the caller must fall through to default behavior — no
///   URL may be synthesized for it.
pub fn resolve_dimensions(
    size: &SizeDescriptor,
    meta: Option<&AttachmentMetadata>,
) -> Option<(u32, u32)> {
    match size {
        SizeDescriptor::Dimensions(w, h) => Some((*w, *h)),
        SizeDescriptor::Full => match meta {
            Some(meta) => Some((meta.width, meta.height)),
            None => Some((0, 0)),
        },
        SizeDescriptor::Named(name) => {
            let entry = meta?.sizes.get(name)?;
            Some((entry.width, entry.height))
        }
    }
}

/// Constrain dimensions to a maximum display width, preserving aspect ratio.
///
/// This is a presentational clamp (the editor's content width), applied after
/// resolution and never part of a cache key's inputs.
pub fn constrain_dimensions(width: u32, height: u32, max_width: Option<u32>) -> (u32, u32) {
    let Some(max) = max_width else {
        return (width, height);
    };
    if width <= max || width == 0 {
        return (width, height);
    }
    let ratio = max as f64 / width as f64;
    (max, (height as f64 * ratio).round() as u32)
}

/// The crop gate over registered sizes.
///
/// Uncropped sizes can be derived by the CDN from the single full image, so
/// they are dropped from physical thumbnail generation. When
/// `create_thumbnails` is off, every size is virtual and the result is empty.
pub fn remove_uncropped_sizes(
    sizes: &BTreeMap<String, SizeDefinition>,
    create_thumbnails: bool,
) -> BTreeMap<String, SizeDefinition> {
    if !create_thumbnails {
        return BTreeMap::new();
    }
    sizes
        .iter()
        .filter(|(_, def)| def.crop)
        .map(|(name, def)| (name.clone(), *def))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::SizeMeta;

    fn meta_with_medium() -> AttachmentMetadata {
        let mut meta = AttachmentMetadata::new("2021/06/test.jpg", 2048, 1536);
        meta.sizes.insert(
            "medium".to_string(),
            SizeMeta {
                width: 300,
                height: 225,
                crop: false,
                file: "test.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
            },
        );
        meta
    }

    // =========================================================================
    // SizeDescriptor serialization and parsing
    // =========================================================================

    #[test]
    fn descriptor_canonical_json_forms() {
        let json = |d: &SizeDescriptor| serde_json::to_string(d).unwrap();
        assert_eq!(json(&SizeDescriptor::Full), "\"full\"");
        assert_eq!(json(&SizeDescriptor::Named("medium".into())), "\"medium\"");
        assert_eq!(json(&SizeDescriptor::Dimensions(250, 250)), "[250,250]");
    }

    #[test]
    fn descriptor_from_str() {
        assert_eq!("full".parse::<SizeDescriptor>().unwrap(), SizeDescriptor::Full);
        assert_eq!(
            "250x150".parse::<SizeDescriptor>().unwrap(),
            SizeDescriptor::Dimensions(250, 150)
        );
        assert_eq!(
            "medium_large".parse::<SizeDescriptor>().unwrap(),
            SizeDescriptor::Named("medium_large".into())
        );
        // A malformed pair falls back to a name, not an error
        assert_eq!(
            "axb".parse::<SizeDescriptor>().unwrap(),
            SizeDescriptor::Named("axb".into())
        );
    }

    // =========================================================================
    // resolve_dimensions
    // =========================================================================

    #[test]
    fn resolve_explicit_pair_needs_no_metadata() {
        assert_eq!(
            resolve_dimensions(&SizeDescriptor::Dimensions(250, 250), None),
            Some((250, 250))
        );
    }

    #[test]
    fn resolve_full_uses_attachment_dimensions() {
        let meta = meta_with_medium();
        assert_eq!(
            resolve_dimensions(&SizeDescriptor::Full, Some(&meta)),
            Some((2048, 1536))
        );
    }

    #[test]
    fn resolve_full_without_metadata_is_zeroed() {
        assert_eq!(resolve_dimensions(&SizeDescriptor::Full, None), Some((0, 0)));
    }

    #[test]
    fn resolve_named_size_from_metadata() {
        let meta = meta_with_medium();
        assert_eq!(
            resolve_dimensions(&SizeDescriptor::Named("medium".into()), Some(&meta)),
            Some((300, 225))
        );
    }

    #[test]
    fn resolve_unknown_named_size_is_none() {
        let meta = meta_with_medium();
        assert_eq!(
            resolve_dimensions(&SizeDescriptor::Named("poster".into()), Some(&meta)),
            None
        );
    }

    #[test]
    fn resolve_named_without_metadata_is_none() {
        assert_eq!(
            resolve_dimensions(&SizeDescriptor::Named("medium".into()), None),
            None
        );
    }

    // =========================================================================
    // SizeRegistry
    // =========================================================================

    #[test]
    fn registry_theme_definition_wins() {
        let registry = SizeRegistry::new()
            .option_size("custom", 100, 100, false)
            .theme_size("custom", 500, 500, true);
        assert_eq!(registry.definition("custom"), SizeDefinition::new(500, 500, true));
        assert_eq!(registry.names(), ["custom"]);
    }

    #[test]
    fn registry_falls_back_to_options() {
        let registry = SizeRegistry::new().option_size("medium", 150, 150, true);
        assert_eq!(registry.definition("medium"), SizeDefinition::new(150, 150, true));
    }

    #[test]
    fn registry_unknown_name_is_zeroed() {
        let registry = SizeRegistry::new();
        assert_eq!(registry.definition("missing"), SizeDefinition::default());
    }

    #[test]
    fn registry_preserves_registration_order() {
        let registry = SizeRegistry::new()
            .option_size("medium", 300, 300, false)
            .theme_size("custom", 500, 500, false);
        assert_eq!(registry.names(), ["medium", "custom"]);
    }

    // =========================================================================
    // constrain_dimensions
    // =========================================================================

    #[test]
    fn constrain_noop_without_max() {
        assert_eq!(constrain_dimensions(1500, 1000, None), (1500, 1000));
    }

    #[test]
    fn constrain_noop_when_within_max() {
        assert_eq!(constrain_dimensions(600, 400, Some(800)), (600, 400));
    }

    #[test]
    fn constrain_scales_height_proportionally() {
        assert_eq!(constrain_dimensions(1600, 1200, Some(800)), (800, 600));
        assert_eq!(constrain_dimensions(1500, 1000, Some(1000)), (1000, 667));
    }

    #[test]
    fn constrain_zero_width_untouched() {
        assert_eq!(constrain_dimensions(0, 0, Some(800)), (0, 0));
    }

    // =========================================================================
    // remove_uncropped_sizes (crop gate)
    // =========================================================================

    fn three_sizes() -> BTreeMap<String, SizeDefinition> {
        BTreeMap::from([
            ("thumbnail".to_string(), SizeDefinition::new(150, 150, true)),
            ("medium".to_string(), SizeDefinition::new(300, 300, false)),
            ("large".to_string(), SizeDefinition::new(600, 500, false)),
        ])
    }

    #[test]
    fn crop_gate_keeps_only_cropped() {
        let kept = remove_uncropped_sizes(&three_sizes(), true);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept["thumbnail"], SizeDefinition::new(150, 150, true));
    }

    #[test]
    fn crop_gate_empty_when_thumbnails_disabled() {
        assert!(remove_uncropped_sizes(&three_sizes(), false).is_empty());
    }
}
