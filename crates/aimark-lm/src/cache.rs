//! Process-local reply cache.
//!
//! Keyed on exact prompt text, no normalization: two prompts that differ by
//! a single byte are different entries. The cache lives and dies with the
//! endpoint descriptor that owns it and is never persisted.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Cache of successful model replies, keyed by prompt.
///
/// Unbounded by default, which keeps the guarantee that a repeated prompt
/// never costs a second request for the descriptor's lifetime. With a
/// capacity set, the oldest entry is evicted on overflow and a repeat of an
/// evicted prompt will go back to the network.
#[derive(Debug)]
pub struct ReplyCache {
    inner: Mutex<CacheInner>,
    capacity: Option<usize>,
}

#[derive(Debug, Default)]
struct CacheInner {
    replies: HashMap<String, String>,
    order: VecDeque<String>,
}

impl ReplyCache {
    /// Creates a cache with no size bound.
    pub fn unbounded() -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: None,
        }
    }

    /// Creates a cache that holds at most `capacity` replies.
    ///
    /// A capacity of zero disables caching entirely.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity: Some(capacity),
        }
    }

    /// Looks up the reply cached for a prompt.
    pub fn get(&self, prompt: &str) -> Option<String> {
        self.inner.lock().ok()?.replies.get(prompt).cloned()
    }

    /// Caches a reply under the exact prompt that produced it.
    pub fn insert(&self, prompt: String, reply: String) {
        if self.capacity == Some(0) {
            return;
        }
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.replies.insert(prompt.clone(), reply).is_some() {
            // Same prompt again, value refreshed in place.
            return;
        }
        inner.order.push_back(prompt);
        if let Some(capacity) = self.capacity {
            while inner.order.len() > capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.replies.remove(&oldest);
                }
            }
        }
    }

    /// Number of cached replies.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.replies.len()).unwrap_or(0)
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReplyCache {
    fn default() -> Self {
        Self::unbounded()
    }
}
