use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::codegen::GeneratedSource;
use crate::error::CacheError;

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub sources: Vec<GeneratedSource>,
}

/// Finished pass outputs keyed by the fingerprint of the full candidate set.
///
/// The cache lives with the host, outside the pipeline; a pass never reads it.
pub struct OutputCache {
    cache_dir: PathBuf,
}

impl OutputCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).map_err(|source| CacheError::Io {
            path: cache_dir.clone(),
            source,
        })?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, fingerprint: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", fingerprint))
    }

    pub fn get(&self, fingerprint: &str) -> Option<Vec<GeneratedSource>> {
        let entry_path = self.entry_path(fingerprint);
        if !entry_path.exists() {
            return None;
        }

        let data = fs::read_to_string(&entry_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    path = %entry_path.display(),
                    error = %e,
                    "discarding corrupt cache entry"
                );
                fs::remove_file(&entry_path).ok();
                return None;
            }
        };

        if entry.fingerprint == fingerprint {
            Some(entry.sources)
        } else {
            None
        }
    }

    pub fn set(&self, fingerprint: &str, sources: &[GeneratedSource]) -> Result<(), CacheError> {
        let entry_path = self.entry_path(fingerprint);
        let entry = CacheEntry {
            fingerprint: fingerprint.to_string(),
            sources: sources.to_vec(),
        };
        let data = serde_json::to_string(&entry)?;
        fs::write(&entry_path, data).map_err(|source| CacheError::Io {
            path: entry_path,
            source,
        })
    }
}
