//! Shared test utilities for the edgesize test suite.
//!
//! [`FakeMediaLibrary`] is an in-memory [`MediaLibrary`] built with a fluent
//! API, standing in for the host media library:
//!
//! ```rust
//! use crate::test_helpers::FakeMediaLibrary;
//!
//! let media = FakeMediaLibrary::new()
//!     .attachment(123, "image/jpeg", "https://example.com/uploads/test.jpg", None)
//!     .with_content_width(1024);
//! ```
//!
//! [`CountingCache`] wraps [`MemoryCache`] with hit/set counters so tests can
//! assert that values were cached rather than recomputed.

use crate::cache::{Cache, MemoryCache};
use crate::media::{AttachmentId, AttachmentMetadata, MediaLibrary};
use crate::sizes::SizeDescriptor;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct FakeAttachment {
    mime: String,
    url: String,
    metadata: Option<AttachmentMetadata>,
}

/// In-memory media library fixture.
#[derive(Debug, Default)]
pub struct FakeMediaLibrary {
    attachments: HashMap<AttachmentId, FakeAttachment>,
    intermediates: HashMap<(AttachmentId, SizeDescriptor), String>,
    content_width: Option<u32>,
}

impl FakeMediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attachment. The attached file path is taken from the
    /// metadata's `file` field when metadata is given.
    pub fn attachment(
        mut self,
        id: AttachmentId,
        mime: &str,
        url: &str,
        metadata: Option<AttachmentMetadata>,
    ) -> Self {
        self.attachments.insert(
            id,
            FakeAttachment {
                mime: mime.to_string(),
                url: url.to_string(),
                metadata,
            },
        );
        self
    }

    /// Register a physically generated intermediate file for a size.
    pub fn intermediate(mut self, id: AttachmentId, size: SizeDescriptor, url: &str) -> Self {
        self.intermediates.insert((id, size), url.to_string());
        self
    }

    pub fn with_content_width(mut self, width: u32) -> Self {
        self.content_width = Some(width);
        self
    }
}

impl MediaLibrary for FakeMediaLibrary {
    fn mime_type(&self, id: AttachmentId) -> Option<String> {
        self.attachments.get(&id).map(|a| a.mime.clone())
    }

    fn url(&self, id: AttachmentId) -> Option<String> {
        self.attachments.get(&id).map(|a| a.url.clone())
    }

    fn metadata(&self, id: AttachmentId) -> Option<AttachmentMetadata> {
        self.attachments.get(&id)?.metadata.clone()
    }

    fn attached_file(&self, id: AttachmentId) -> Option<String> {
        self.attachments
            .get(&id)?
            .metadata
            .as_ref()
            .map(|m| m.file.clone())
    }

    fn intermediate_url(&self, id: AttachmentId, size: &SizeDescriptor) -> Option<String> {
        self.intermediates.get(&(id, size.clone())).cloned()
    }

    fn content_width(&self) -> Option<u32> {
        self.content_width
    }
}

/// A [`MemoryCache`] that counts hits and writes.
#[derive(Debug, Default)]
pub struct CountingCache<V> {
    inner: MemoryCache<V>,
    hits: AtomicUsize,
    sets: AtomicUsize,
}

impl<V> CountingCache<V> {
    pub fn new() -> Self {
        Self {
            inner: MemoryCache::new(),
            hits: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

impl<V: Clone + Send + Sync> Cache<V> for CountingCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let value = self.inner.get(key);
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        value
    }

    fn set(&self, key: &str, value: V) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value);
    }
}
