//! An edit request waiting for the requester's confirmation.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::errors::{PrBotError, PrBotResult};

lazy_static! {
    static ref CANCEL: Regex = Regex::new(r"(?i)\b(no|nevermind|never mind|cancel|stop)\b").unwrap();
    static ref CONFIRM: Regex =
        Regex::new(r"(?i)\b(yes|do it|go ahead|proceed|confirm|ok|okay|yeah)\b").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub action: String,
    pub files: Vec<String>,
    pub requested_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Confirm,
    Cancel,
    Unrelated,
}

/// Cancellation wins over confirmation ("no, don't do it").
pub fn classify_reply(comment: &str) -> Reply {
    let c = comment.trim();
    if CANCEL.is_match(c) {
        Reply::Cancel
    } else if CONFIRM.is_match(c) {
        Reply::Confirm
    } else {
        Reply::Unrelated
    }
}

impl PendingAction {
    /// `None` when absent; a corrupt file is logged and treated as absent.
    pub async fn load(path: &Path) -> PrBotResult<Option<Self>> {
        let text = match fs::read_to_string(path).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PrBotError::io(path, e)),
        };
        match serde_json::from_str(&text) {
            Ok(p) => Ok(Some(p)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "pending action unreadable, ignoring");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, path: &Path) -> PrBotResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).await.map_err(|e| PrBotError::io(path, e))?;
        info!(action = %self.action, by = %self.requested_by, "pending action saved");
        Ok(())
    }

    pub async fn clear(path: &Path) -> PrBotResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PrBotError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_are_word_bounded() {
        assert_eq!(classify_reply("Yes please"), Reply::Confirm);
        assert_eq!(classify_reply("ok, go ahead"), Reply::Confirm);
        assert_eq!(classify_reply("no, don't"), Reply::Cancel);
        assert_eq!(classify_reply("nevermind"), Reply::Cancel);
        assert_eq!(classify_reply("I know the docs are stale"), Reply::Unrelated);
        assert_eq!(classify_reply("this looks broken to me"), Reply::Unrelated);
        assert_eq!(classify_reply("yesterday it worked"), Reply::Unrelated);
    }

    #[tokio::test]
    async fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending_action.json");
        assert_eq!(PendingAction::load(&path).await.unwrap(), None);

        let p = PendingAction {
            action: "add comments".into(),
            files: vec!["a.ts".into()],
            requested_by: "dev".into(),
        };
        p.save(&path).await.unwrap();
        assert_eq!(PendingAction::load(&path).await.unwrap(), Some(p));

        PendingAction::clear(&path).await.unwrap();
        assert!(!path.exists());
        PendingAction::clear(&path).await.unwrap();

        std::fs::write(&path, "{").unwrap();
        assert_eq!(PendingAction::load(&path).await.unwrap(), None);
    }
}
