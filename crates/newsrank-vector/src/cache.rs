use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub fn hash_content(s: &str) -> String {
    blake3::hash(s.as_bytes()).to_hex().to_string()
}

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub content_hash: String,
    pub embedder_id: String,
    pub vector: Vec<f32>,
}

/// In-process embedding cache keyed by `(embedder_id, content_hash)`.
///
/// Shared across index rebuilds so unchanged articles are not re-embedded.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<(String, String), Arc<Vec<f32>>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.read().len() }

    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    /// Vectors for the hashes present in the cache; misses are omitted.
    pub fn get_many(&self, embedder_id: &str, hashes: &[String]) -> HashMap<String, Arc<Vec<f32>>> {
        let entries = self.entries.read();
        hashes
            .iter()
            .filter_map(|h| entries.get(&(embedder_id.to_string(), h.clone())).map(|v| (h.clone(), Arc::clone(v))))
            .collect()
    }

    pub fn put_many(&self, entries: Vec<CacheEntry>) {
        if entries.is_empty() { return; }
        let mut map = self.entries.write();
        for e in entries { map.insert((e.embedder_id, e.content_hash), Arc::new(e.vector)); }
    }

    /// Drop `embedder_id` entries whose hash is not in `live`. Entries of
    /// other embedders are untouched. Returns the number removed.
    pub fn retain_hashes(&self, embedder_id: &str, live: &HashSet<String>) -> usize {
        let mut map = self.entries.write();
        let before = map.len();
        map.retain(|(id, hash), _| id != embedder_id || live.contains(hash));
        before - map.len()
    }
}
