//! Which changed files mention symbols declared in other changed files.

use regex::Regex;
use serde::Serialize;

use crate::symbols::{SymbolKind, extract_symbols};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Impact {
    /// File that references the symbol.
    pub changed_file: String,
    /// File that declares it.
    pub affects_file: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: SymbolKind,
}

struct Declared<'a> {
    name: String,
    file: &'a str,
    kind: SymbolKind,
}

/// `files` are `(path, content)` pairs. A name declared in several files is
/// attributed to the last one. References are plain word-boundary matches,
/// so comments and strings count too.
pub fn analyze_cross_file_impact(files: &[(String, String)]) -> Vec<Impact> {
    let mut declared: Vec<Declared<'_>> = Vec::new();
    for (path, content) in files {
        for sym in extract_symbols(content).iter() {
            let entry = Declared {
                name: sym.name.clone(),
                file: path,
                kind: sym.kind,
            };
            match declared.iter_mut().find(|d| d.name == sym.name) {
                Some(slot) => *slot = entry,
                None => declared.push(entry),
            }
        }
    }

    let mut impacts = Vec::new();
    for (path, content) in files {
        for d in declared.iter().filter(|d| d.file != path.as_str()) {
            let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(&d.name))) else {
                continue;
            };
            if re.is_match(content) {
                impacts.push(Impact {
                    changed_file: path.clone(),
                    affects_file: d.file.to_string(),
                    symbol: d.name.clone(),
                    kind: d.kind,
                });
            }
        }
    }
    impacts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect()
    }

    #[test]
    fn reference_from_another_file_is_an_impact() {
        let input = files(&[
            ("src/api.ts", "export function fetchUser(id) {}\n"),
            ("src/page.ts", "import { fetchUser } from './api';\nfetchUser(1);\n"),
        ]);
        let impacts = analyze_cross_file_impact(&input);
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].changed_file, "src/page.ts");
        assert_eq!(impacts[0].affects_file, "src/api.ts");
        assert_eq!(impacts[0].symbol, "fetchUser");
        assert_eq!(impacts[0].kind, SymbolKind::Function);
    }

    #[test]
    fn self_references_and_substrings_do_not_count() {
        let input = files(&[
            ("a.ts", "export class Store {}\nnew Store();\n"),
            ("b.ts", "const StoreFactory = 1;\n"),
        ]);
        assert!(analyze_cross_file_impact(&input).is_empty());
    }
}
