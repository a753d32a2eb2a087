//! In-process memo of pipeline runs keyed by a fingerprint of the parsed
//! input. Owned by the orchestrator; the analytics engine never sees it.

use std::sync::Arc;

use dashmap::DashMap;
use marketpulse_core::SourceKind;
use sha2::{Digest, Sha256};

use crate::loader::LoadedSources;
use crate::pipeline::PipelineRun;

/// Bounded run cache. Inserts past capacity are skipped rather than evicting.
pub struct PipelineCache {
    store: DashMap<String, Arc<PipelineRun>>,
    max_entries: usize,
}

impl PipelineCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: DashMap::with_capacity(max_entries),
            max_entries,
        }
    }

    /// SHA-256 over every source's key, headers and cells, length-prefixed
    /// so cell boundaries cannot collide.
    pub fn fingerprint(sources: &LoadedSources) -> String {
        fn feed(hasher: &mut Sha256, value: &str) {
            hasher.update((value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        }

        let mut hasher = Sha256::new();
        for source in SourceKind::ALL {
            let Some(table) = sources.get(source) else {
                continue;
            };
            feed(&mut hasher, source.token());
            hasher.update((table.headers.len() as u64).to_le_bytes());
            for header in &table.headers {
                feed(&mut hasher, header);
            }
            hasher.update((table.rows.len() as u64).to_le_bytes());
            for row in &table.rows {
                hasher.update((row.len() as u64).to_le_bytes());
                for cell in row {
                    feed(&mut hasher, cell);
                }
            }
        }
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<Arc<PipelineRun>> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(&self, key: String, run: Arc<PipelineRun>) {
        if self.store.len() >= self.max_entries && !self.store.contains_key(&key) {
            return;
        }
        self.store.insert(key, run);
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::process_all_data;
    use marketpulse_core::RawTable;

    fn sources(spend: &str) -> LoadedSources {
        let mut s = LoadedSources::new();
        for source in SourceKind::ALL {
            s.insert(
                source,
                RawTable::new(
                    vec!["date".to_string(), "spend".to_string()],
                    vec![vec!["2024-01-01".to_string(), spend.to_string()]],
                ),
            );
        }
        s
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let a = PipelineCache::fingerprint(&sources("10"));
        let b = PipelineCache::fingerprint(&sources("10"));
        let c = PipelineCache::fingerprint(&sources("11"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_separates_cells() {
        let mut left = LoadedSources::new();
        left.insert(
            SourceKind::Google,
            RawTable::new(vec!["ab".to_string(), "c".to_string()], Vec::new()),
        );
        let mut right = LoadedSources::new();
        right.insert(
            SourceKind::Google,
            RawTable::new(vec!["a".to_string(), "bc".to_string()], Vec::new()),
        );
        assert_ne!(
            PipelineCache::fingerprint(&left),
            PipelineCache::fingerprint(&right)
        );
    }

    #[test]
    fn test_put_get_and_capacity() {
        let cache = PipelineCache::new(1);
        let run = Arc::new(process_all_data(&sources("10")).unwrap());

        cache.put("first".to_string(), run.clone());
        cache.put("second".to_string(), run.clone());

        assert_eq!(cache.len(), 1);
        assert!(cache.get("first").is_some());
        assert!(cache.get("second").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}
