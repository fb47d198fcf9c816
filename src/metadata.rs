//! On-the-fly intermediate-size metadata.
//!
//! Instead of generating N thumbnail files on upload, exactly one file is
//! stored and every registered size gets a *virtual* metadata entry pointing
//! at it, with the dimensions the size would have had. Downstream consumers
//! (templates, the downsize pipeline) see a complete `sizes` mapping and the
//! CDN resizes at request time.
//!
//! The one exception: when cropped-thumbnail generation is enabled, sizes
//! that were physically generated keep their real entries — a hard crop
//! cannot be derived from the full image by scaling alone.
//!
//! Synthesis runs whenever attachment metadata is requested, so results are
//! memoized per attachment in an injected [`Cache`].

use crate::cache::{Cache, metadata_key};
use crate::media::{AttachmentId, AttachmentMetadata, MediaLibrary, SizeMeta};
use crate::sizes::SizeRegistry;
use std::collections::BTreeMap;
use tracing::debug;

/// Fills in per-attachment size metadata for every registered image size.
pub struct Synthesizer {
    registry: SizeRegistry,
    create_thumbnails: bool,
    cache: Box<dyn Cache<AttachmentMetadata>>,
}

impl Synthesizer {
    pub fn new(
        registry: SizeRegistry,
        create_thumbnails: bool,
        cache: Box<dyn Cache<AttachmentMetadata>>,
    ) -> Self {
        Self {
            registry,
            create_thumbnails,
            cache,
        }
    }

    /// Synthesize the size mapping for an attachment's metadata.
    ///
    /// `None` in means `None` out: with no stored metadata there is nothing
    /// to synthesize against. Otherwise every registered size name gets an
    /// entry — copied through when a physically generated one exists (and
    /// thumbnail creation is on), synthesized from the registry otherwise.
    ///
    /// Deterministic for fixed inputs: calling twice with the same cache
    /// returns identical metadata, served from cache the second time.
    pub fn get<M: MediaLibrary>(
        &self,
        data: Option<AttachmentMetadata>,
        id: AttachmentId,
        media: &M,
    ) -> Option<AttachmentMetadata> {
        let mut data = data?;

        let key = metadata_key(id);
        if let Some(cached) = self.cache.get(&key) {
            debug!(id, "synthesized metadata served from cache");
            return Some(cached);
        }

        let mime = media.mime_type(id).unwrap_or_default();
        let file = media
            .attached_file(id)
            .map(|path| basename(&path).to_string())
            .unwrap_or_else(|| data.file_basename().to_string());

        let mut sizes = BTreeMap::new();
        for name in self.registry.names() {
            // Physically generated sizes keep their real entry
            if self.create_thumbnails
                && let Some(existing) = data.sizes.get(name)
            {
                sizes.insert(name.clone(), existing.clone());
                continue;
            }

            let def = self.registry.definition(name);
            sizes.insert(
                name.clone(),
                SizeMeta {
                    width: def.width,
                    height: def.height,
                    crop: def.crop,
                    file: file.clone(),
                    mime_type: mime.clone(),
                },
            );
        }

        data.sizes = sizes;
        self.cache.set(&key, data.clone());

        Some(data)
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
