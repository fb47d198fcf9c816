//! The host media-library collaborator contract and its data model.
//!
//! edgesize never owns attachment records — it reads them through
//! [`MediaLibrary`], which the host implements over whatever storage it has.
//! The trait is the explicit version of the function surface the rewriter
//! needs: mime type, canonical URL, stored metadata, the physical file a size
//! may have been generated as, and the editor's display-width constraint.
//!
//! The metadata types use the host's wire shape (`mime-type` with a dash) so
//! synthesized entries round-trip through the host's metadata store
//! unchanged.

use crate::sizes::{SizeDescriptor, constrain_dimensions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque numeric attachment identifier, owned by the host.
pub type AttachmentId = u64;

/// One intermediate-size entry in attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMeta {
    pub width: u32,
    pub height: u32,
    pub crop: bool,
    /// Basename of the file serving this size. For synthesized entries this
    /// is the attachment's primary file — no per-size file exists.
    pub file: String,
    #[serde(rename = "mime-type")]
    pub mime_type: String,
}

/// Stored attachment metadata: the original file, its dimensions, and the
/// per-size mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    /// Path of the original file relative to the uploads base.
    pub file: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub sizes: BTreeMap<String, SizeMeta>,
}

impl AttachmentMetadata {
    pub fn new(file: &str, width: u32, height: u32) -> Self {
        Self {
            file: file.to_string(),
            width,
            height,
            sizes: BTreeMap::new(),
        }
    }

    /// Basename of the original file.
    pub fn file_basename(&self) -> &str {
        self.file.rsplit('/').next().unwrap_or(&self.file)
    }
}

/// Read-only view of the host's media library.
///
/// Every method takes the opaque attachment id; `None` means the host has no
/// such attachment (or no value for it), and callers fall through to default
/// behavior.
pub trait MediaLibrary {
    /// The attachment's mime type.
    fn mime_type(&self, id: AttachmentId) -> Option<String>;

    /// The attachment's canonical (full-size) URL.
    fn url(&self, id: AttachmentId) -> Option<String>;

    /// Stored metadata, if any.
    fn metadata(&self, id: AttachmentId) -> Option<AttachmentMetadata>;

    /// Path of the attachment's primary file (used for synthesized size
    /// entries' `file` field).
    fn attached_file(&self, id: AttachmentId) -> Option<String>;

    /// URL of a physically generated intermediate file for this size, when
    /// one exists. Preferred over the canonical URL as the rewrite source.
    fn intermediate_url(&self, id: AttachmentId, size: &SizeDescriptor) -> Option<String>;

    /// The editor's maximum content width, when the host constrains display.
    fn content_width(&self) -> Option<u32> {
        None
    }

    /// Clamp resolved dimensions to the display width. Hosts with a more
    /// involved policy override this; the default preserves aspect ratio
    /// against [`content_width`](Self::content_width).
    fn constrain_for_display(&self, width: u32, height: u32) -> (u32, u32) {
        constrain_dimensions(width, height, self.content_width())
    }
}
