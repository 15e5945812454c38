//! Text helpers for webhook payloads.

use std::path::Path;

/// Cuts `text` to at most `limit` chars, ending in `...` when cut.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Drops agent trailers (`Amp-Thread-ID:`, `Co-authored-by: Amp`) from a
/// commit message.
pub fn clean_commit_message(message: &str) -> String {
    message
        .split('\n')
        .filter(|l| !l.starts_with("Amp-Thread-ID:") && !l.starts_with("Co-authored-by: Amp"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// First line, capped at 100 chars.
pub fn commit_title(message: &str) -> String {
    message.lines().next().unwrap_or("").chars().take(100).collect()
}

pub fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// `items` joined by `sep`, showing at most `max`, then an overflow note.
pub(crate) fn bounded_list(items: &[String], max: usize, sep: &str, more: impl Fn(usize) -> String) -> String {
    let mut out = items.iter().take(max).cloned().collect::<Vec<_>>().join(sep);
    if items.len() > max {
        out.push_str(&more(items.len() - max));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn agent_trailers_are_removed() {
        let msg = "feat: add login\n\nBody line\nAmp-Thread-ID: https://x/y\nCo-authored-by: Amp <amp@example.com>\n";
        assert_eq!(clean_commit_message(msg), "feat: add login\n\nBody line");
        assert_eq!(commit_title(&"x".repeat(150)).len(), 100);
    }

    #[test]
    fn lists_note_overflow() {
        let items: Vec<String> = (0..7).map(|i| format!("f{i}")).collect();
        assert_eq!(bounded_list(&items, 5, ", ", |n| format!(" +{n} more")), "f0, f1, f2, f3, f4 +2 more");
        assert_eq!(bounded_list(&items[..2], 5, "\n", |n| format!("{n}")), "f0\nf1");
    }
}
