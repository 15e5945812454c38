//! On-disk memo of successful chat completions.
//!
//! Key: first 16 hex chars of
//! `sha256("{model}:{messages_json}:{temperature}:{max_tokens}")`, stored as
//! `<cache_dir>/<key>.txt`. Entries never expire; [`ResponseCache::clear`]
//! is the only invalidation. All I/O is best-effort: failures are logged and
//! treated as a miss.

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use crate::client::ChatRequest;

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stable cache key for a request.
    pub fn key(req: &ChatRequest) -> String {
        let messages = serde_json::to_string(&req.messages).unwrap_or_default();
        let material = format!(
            "{}:{}:{}:{}",
            req.model, messages, req.temperature, req.max_tokens
        );
        let digest = Sha256::digest(material.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        hex[..16].to_string()
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.txt"))
    }

    pub async fn get(&self, req: &ChatRequest) -> Option<String> {
        let key = Self::key(req);
        match fs::read_to_string(self.path_for(&key)).await {
            Ok(text) => {
                debug!(%key, "LLM cache hit");
                Some(text)
            }
            Err(_) => None,
        }
    }

    pub async fn put(&self, req: &ChatRequest, content: &str) {
        let key = Self::key(req);
        if let Err(e) = fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "cannot create LLM cache dir");
            return;
        }
        if let Err(e) = fs::write(self.path_for(&key), content).await {
            warn!(%key, error = %e, "cannot write LLM cache entry");
        }
    }

    /// Deletes entries whose file name contains `pattern`, or every `.txt`
    /// entry when `pattern` is `None`. Returns the number of removed files.
    pub async fn clear(&self, pattern: Option<&str>) -> usize {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(e) => e,
            Err(_) => return 0,
        };
        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            let selected = match pattern {
                Some(p) => name.contains(p),
                None => name.ends_with(".txt"),
            };
            if selected && fs::remove_file(entry.path()).await.is_ok() {
                removed += 1;
            }
        }
        debug!(removed, ?pattern, "LLM cache cleared");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    fn req(temp: f32) -> ChatRequest {
        ChatRequest::new("m", vec![ChatMessage::user("hi")]).temperature(temp)
    }

    #[test]
    fn key_depends_on_every_input() {
        let a = ResponseCache::key(&req(0.3));
        assert_eq!(a.len(), 16);
        assert_eq!(a, ResponseCache::key(&req(0.3)));
        assert_ne!(a, ResponseCache::key(&req(0.5)));
        assert_ne!(a, ResponseCache::key(&req(0.3).max_tokens(10)));
    }

    #[tokio::test]
    async fn put_get_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().join("cache"));
        assert!(cache.get(&req(0.3)).await.is_none());

        cache.put(&req(0.3), "answer").await;
        cache.put(&req(0.7), "other").await;
        assert_eq!(cache.get(&req(0.3)).await.as_deref(), Some("answer"));

        let key = ResponseCache::key(&req(0.3));
        assert_eq!(cache.clear(Some(&key)).await, 1);
        assert!(cache.get(&req(0.3)).await.is_none());
        assert_eq!(cache.clear(None).await, 1);
    }
}
