//! Mime-type classification for rewrite eligibility.
//!
//! Two independent questions gate every rewrite:
//!
//! 1. Is this attachment an image the CDN should serve at all?
//!    ([`MimeClassifier::is_image`]) — non-images (video, PDF, …) keep their
//!    origin URL untouched.
//! 2. Can the CDN actually resize it? ([`MimeClassifier::bypass_resizing`]) —
//!    vector formats like SVG are served through the CDN but must not carry
//!    transform parameters, since statically.io cannot rasterize them.
//!
//! [`StandardMimeTypes`] carries the stock sets; hosts with unusual formats
//! extend it or supply their own implementation.

/// Strategy deciding which mime types are rewritten and which ones skip
/// resize parameters.
pub trait MimeClassifier: Send + Sync {
    /// Whether this mime type is an image eligible for CDN rewriting.
    fn is_image(&self, mime: &str) -> bool;

    /// Whether resize parameters must be suppressed for this mime type.
    fn bypass_resizing(&self, mime: &str) -> bool;
}

/// The stock classification: common raster formats plus SVG, with SVG
/// excluded from resizing.
#[derive(Debug, Clone)]
pub struct StandardMimeTypes {
    image_types: Vec<String>,
    bypass_types: Vec<String>,
}

impl Default for StandardMimeTypes {
    fn default() -> Self {
        Self {
            image_types: [
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
                "image/svg+xml",
            ]
            .map(String::from)
            .to_vec(),
            bypass_types: vec!["image/svg+xml".to_string()],
        }
    }
}

impl StandardMimeTypes {
    /// Add a mime type to the eligible-image set.
    pub fn allow_image(mut self, mime: &str) -> Self {
        self.image_types.push(mime.to_string());
        self
    }

    /// Add a mime type to the resize-bypass set.
    pub fn bypass(mut self, mime: &str) -> Self {
        self.bypass_types.push(mime.to_string());
        self
    }
}

impl MimeClassifier for StandardMimeTypes {
    fn is_image(&self, mime: &str) -> bool {
        self.image_types.iter().any(|m| m == mime)
    }

    fn bypass_resizing(&self, mime: &str) -> bool {
        self.bypass_types.iter().any(|m| m == mime)
    }
}

/// Guess a mime type from a path or URL extension.
///
/// Used by the diagnostic CLI, which has no media library to ask. Only the
/// formats the stock classifier knows about are recognized.
pub fn guess_mime(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
