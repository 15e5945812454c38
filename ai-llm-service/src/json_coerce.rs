//! Tolerant JSON extraction for LLM output.
//!
//! Models asked for JSON routinely wrap it in markdown fences, surround it
//! with prose, leave literal newlines inside string values or add trailing
//! commas. [`coerce_json`] runs an ordered list of repair strategies and
//! returns the first candidate that parses:
//!
//! 1. strip code fences, then [`Strategy::Direct`] parse;
//! 2. [`Strategy::Balanced`]: cut the first balanced `{...}` / `[...]` block;
//! 3. [`Strategy::Sanitized`]: normalize quotes, escape in-string newlines,
//!    drop trailing commas.
//!
//! The routine never fails. When nothing parses it returns the best-effort
//! snippet with `strategy == None`, and callers must treat it as untrusted.

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"```(?:json)?").unwrap();
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r"(?:,\s*)+([}\]])").unwrap();
    static ref LEADING_FENCE_RE: Regex = Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").unwrap();
    static ref TRAILING_FENCE_RE: Regex = Regex::new(r"\r?\n?```[ \t]*$").unwrap();
}

/// Which repair step produced a parseable candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Direct,
    Balanced,
    Sanitized,
}

/// Repair steps in the order they are attempted (after fence stripping).
pub const STRATEGIES: [Strategy; 3] = [Strategy::Direct, Strategy::Balanced, Strategy::Sanitized];

/// Result of [`coerce_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    /// Candidate text. Valid JSON iff `strategy` is `Some`.
    pub text: String,
    pub strategy: Option<Strategy>,
}

impl Coerced {
    pub fn is_valid(&self) -> bool {
        self.strategy.is_some()
    }

    /// Parsed value, when one of the strategies succeeded.
    pub fn value(&self) -> Option<Value> {
        self.strategy
            .and_then(|_| serde_json::from_str(&self.text).ok())
    }
}

/// Removes every markdown code fence marker (```` ``` ```` and ```` ```json ````) and trims.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Removes one leading fence line (any language tag) and one trailing fence.
///
/// Used for markdown bodies the model wrapped in a fence as a whole; inner
/// fences are left alone.
pub fn strip_markdown_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let head = LEADING_FENCE_RE.replace(trimmed, "");
    TRAILING_FENCE_RE.replace(&head, "").trim().to_string()
}

/// Extracts the first balanced JSON object or array.
///
/// The scan starts at the first `{` or `[` and tracks a bracket stack.
/// Brackets inside double-quoted strings are ignored. Returns `None` when
/// there is no opener, a closer does not match its opener, or the input
/// ends before the block closes.
pub fn extract_balanced(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => stack.push(ch),
            '}' | ']' => {
                let open = stack.pop()?;
                if (open == '{' && ch != '}') || (open == '[' && ch != ']') {
                    return None;
                }
                if stack.is_empty() {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drops commas (and the whitespace after them) that directly precede `}` or `]`.
///
/// Runs of commas are removed as a whole, so applying it twice is a no-op.
pub fn remove_trailing_commas(text: &str) -> String {
    TRAILING_COMMA_RE.replace_all(text, "$1").into_owned()
}

/// Textual cleanup for almost-JSON.
///
/// - smart double quotes become `"`, `’` becomes `'`, zero-width spaces go away;
/// - a line with an odd number of unescaped `"` toggles an "inside string"
///   flag; while the flag is set the line break is replaced by a literal `\n`;
/// - trailing commas are removed.
pub fn sanitize_json_like(text: &str) -> String {
    let normalized = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace('\u{2019}', "'")
        .replace('\u{200b}', "");

    let lines: Vec<&str> = normalized.split('\n').collect();
    let last = lines.len().saturating_sub(1);
    let mut out = String::with_capacity(normalized.len() + 16);
    let mut in_string = false;

    for (i, line) in lines.iter().enumerate() {
        if count_unescaped_quotes(line) % 2 == 1 {
            in_string = !in_string;
        }
        if i == last {
            out.push_str(line);
        } else if in_string {
            out.push_str(line.trim_end());
            out.push_str("\\n");
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    remove_trailing_commas(&out)
}

fn count_unescaped_quotes(line: &str) -> usize {
    let mut prev: Option<char> = None;
    let mut count = 0;
    for ch in line.chars() {
        if ch == '"' && prev != Some('\\') {
            count += 1;
        }
        prev = Some(ch);
    }
    count
}

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<Value>(candidate).is_ok()
}

/// Runs the repair pipeline on raw model output. Never fails.
pub fn coerce_json(raw: &str) -> Coerced {
    let text = strip_code_fences(raw);
    let mut snippet = text.clone();

    for strategy in STRATEGIES {
        let candidate = match strategy {
            Strategy::Direct => text.clone(),
            Strategy::Balanced => {
                snippet = extract_balanced(&text).unwrap_or(&text).to_string();
                snippet.clone()
            }
            Strategy::Sanitized => sanitize_json_like(&snippet),
        };
        if parses(&candidate) {
            debug!(?strategy, len = candidate.len(), "json coercion succeeded");
            return Coerced {
                text: candidate,
                strategy: Some(strategy),
            };
        }
    }

    warn!(len = snippet.len(), "could not coerce model output to valid JSON");
    Coerced {
        text: snippet,
        strategy: None,
    }
}

/// Coerces and deserializes in one step; `None` if nothing usable came out.
pub fn parse_lenient<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let coerced = coerce_json(raw);
    if !coerced.is_valid() {
        return None;
    }
    serde_json::from_str(&coerced.text).ok()
}
