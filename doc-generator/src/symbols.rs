//! Top-level declarations of a TS/JS module, found by regex.
//!
//! Only declarations starting at column 0 are seen: `function`, `class`
//! and `interface`, optionally `export`ed. Arrow functions, methods and
//! re-exports are invisible.

use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref FUNCTION: Regex = Regex::new(
        r"(?m)^(export\s+)?(?:async\s+)?function\s+(\w+)\s*\(([^)]*)\)(?:\s*:\s*([^{;]+))?"
    )
    .unwrap();
    static ref CLASS: Regex = Regex::new(r"(?m)^(export\s+)?class\s+(\w+)").unwrap();
    static ref INTERFACE: Regex = Regex::new(r"(?m)^(export\s+)?interface\s+(\w+)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Interface,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    /// Trimmed parameter list; functions only.
    pub params: Option<String>,
    /// Declared return type, `void` when absent; functions only.
    pub returns: Option<String>,
    pub exported: bool,
    /// The matched declaration text, trimmed.
    pub signature: String,
}

/// Declarations keyed by name, in first-seen order.
///
/// A later declaration with the same name replaces the earlier one in
/// place (overloads collapse to the last).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    fn insert(&mut self, symbol: Symbol) {
        match self.symbols.iter_mut().find(|s| s.name == symbol.name) {
            Some(slot) => *slot = symbol,
            None => self.symbols.push(symbol),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

fn simple(re: &Regex, kind: SymbolKind, content: &str, table: &mut SymbolTable) {
    for caps in re.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        table.insert(Symbol {
            kind,
            name: name.as_str().to_string(),
            params: None,
            returns: None,
            exported: caps.get(1).is_some(),
            signature: whole.as_str().trim().to_string(),
        });
    }
}

/// Extracts functions, then classes, then interfaces.
pub fn extract_symbols(content: &str) -> SymbolTable {
    let mut table = SymbolTable::default();

    for caps in FUNCTION.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        table.insert(Symbol {
            kind: SymbolKind::Function,
            name: name.as_str().to_string(),
            params: Some(caps.get(3).map(|m| m.as_str().trim()).unwrap_or("").to_string()),
            returns: Some(
                caps.get(4)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_else(|| "void".into()),
            ),
            exported: caps.get(1).is_some(),
            signature: whole.as_str().trim().to_string(),
        });
    }
    simple(&CLASS, SymbolKind::Class, content, &mut table);
    simple(&INTERFACE, SymbolKind::Interface, content, &mut table);
    table
}
