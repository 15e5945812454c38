//! Exported-API comparison between two versions of one file.

use serde::Serialize;

use crate::symbols::{SymbolTable, extract_symbols};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Removed,
    SignatureChange,
}

impl ChangeKind {
    /// Upper-case label used in generated docs, e.g. `SIGNATURE_CHANGE`.
    pub fn label(self) -> &'static str {
        match self {
            ChangeKind::Removed => "REMOVED",
            ChangeKind::SignatureChange => "SIGNATURE_CHANGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakingChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub symbol: String,
    pub severity: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BreakingReport {
    pub has_breaking: bool,
    pub changes: Vec<BreakingChange>,
}

/// Compares exported symbols of `old` against `new`. A changed return
/// type alone is compatible; only a changed parameter list breaks.
///
/// A file without a previous version (new file, or empty) never breaks.
pub fn detect_breaking_changes(old: Option<&str>, new: &str) -> BreakingReport {
    let Some(old) = old.filter(|o| !o.is_empty()) else {
        return BreakingReport::default();
    };
    compare(&extract_symbols(old), &extract_symbols(new))
}

pub(crate) fn compare(old: &SymbolTable, new: &SymbolTable) -> BreakingReport {
    let mut changes = Vec::new();

    for sym in old.iter().filter(|s| s.exported) {
        match new.get(&sym.name) {
            None => changes.push(BreakingChange {
                kind: ChangeKind::Removed,
                symbol: sym.name.clone(),
                severity: "BREAKING".into(),
                message: format!("Removed exported {}: {}", sym.kind, sym.name),
                old: None,
                new: None,
            }),
            Some(cur) => {
                let params_changed = sym.params != cur.params;
                if sym.signature != cur.signature && params_changed {
                    changes.push(BreakingChange {
                        kind: ChangeKind::SignatureChange,
                        symbol: sym.name.clone(),
                        severity: "BREAKING".into(),
                        message: format!("Modified signature of {}", sym.name),
                        old: Some(sym.signature.clone()),
                        new: Some(cur.signature.clone()),
                    });
                }
            }
        }
    }

    BreakingReport {
        has_breaking: !changes.is_empty(),
        changes,
    }
}
