//! Memo of rendered messages, keyed by message id and text.
//!
//! Rendering is a pure function of the text and the collaborators, so a
//! message only needs re-rendering when its text changes or the member and
//! emoji tables do; callers [`clear`](DisplayCache::clear) on the latter.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::pipeline::{DisplayMode, RenderedMessage};

/// Entries kept when no capacity is given.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(512).unwrap();

type CacheKey = (String, String, DisplayMode); // (message_id, text, mode)

pub struct DisplayCache {
    entries: Mutex<LruCache<CacheKey, RenderedMessage>>,
}

impl Default for DisplayCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DisplayCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// A poisoned lock only means another thread panicked mid-update; the
    /// cache holds plain values, so keep using it.
    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, RenderedMessage>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached rendering or computes, stores and returns it.
    pub fn get_or_render<F>(
        &self,
        message_id: &str,
        text: &str,
        mode: DisplayMode,
        render: F,
    ) -> RenderedMessage
    where
        F: FnOnce(&str) -> RenderedMessage,
    {
        let key = (message_id.to_string(), text.to_string(), mode);
        if let Some(hit) = self.lock().get(&key) {
            log::trace!("display cache hit for {message_id}");
            return hit.clone();
        }
        // Rendered without the lock held; a concurrent miss renders twice.
        let rendered = render(text);
        self.lock().put(key, rendered.clone());
        rendered
    }

    /// Drops every entry for `message_id`, e.g. after an edit or deletion.
    pub fn invalidate(&self, message_id: &str) {
        let mut entries = self.lock();
        let stale: Vec<CacheKey> = entries
            .iter()
            .filter(|((id, _, _), _)| id == message_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            entries.pop(&key);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
