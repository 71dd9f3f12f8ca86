//! In-memory cache for rendered OG images.
//!
//! Rasterizing and encoding a 1200×630 image costs tens of milliseconds, and
//! the live preview asks for the same image again every time the page is
//! reloaded or shared. This module lets the server answer repeated requests
//! from memory.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: the key is the SHA-256 of everything
//! that affects the output bytes: the title and colours from the request, plus
//! the renderer's [`settings_key`](crate::imaging::OgRenderer::settings_key)
//! (canvas, text style, output format and fonts).
//! The same hex digest is sent as the HTTP `ETag`, so a browser revalidating
//! with `If-None-Match` gets a `304` without the image being rendered at all.
//!
//! ## Eviction
//!
//! Entries are evicted oldest-first once `capacity` is reached. A capacity of
//! `0` disables caching; keys are still computed so `ETag` keeps working.

use crate::imaging::{OgImageParams, RenderedImage};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

/// SHA-256 of the render inputs, returned as a hex string.
///
/// `settings` is the renderer's [`settings_key`](crate::imaging::OgRenderer::settings_key).
pub fn hash_params(params: &OgImageParams, settings: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"og\0");
    hasher.update((params.title.len() as u64).to_le_bytes());
    hasher.update(params.title.as_bytes());
    let (bg, fg) = (params.background, params.foreground);
    hasher.update([bg.r, bg.g, bg.b, fg.r, fg.g, fg.b]);
    hasher.update((settings.len() as u64).to_le_bytes());
    hasher.update(settings.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Bounded map from params hash to encoded image.
#[derive(Debug)]
pub struct RenderCache {
    capacity: usize,
    entries: HashMap<String, Arc<RenderedImage>>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<Arc<RenderedImage>> {
        let found = self.entries.get(key).cloned();
        match found {
            Some(_) => self.stats.hit(),
            None => self.stats.miss(),
        }
        found
    }

    /// Store an image, evicting the oldest entry when full.
    pub fn insert(&mut self, key: String, image: Arc<RenderedImage>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), image).is_some() {
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Hit/miss counters for the lifetime of a cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} rendered ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} rendered", self.misses)
        }
    }
}
