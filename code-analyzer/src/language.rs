//! Language detection and per-language heuristics.

use std::fmt::{Display, Formatter};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

/// Extensions treated as source code by the analysis run.
pub const CODE_EXTENSIONS: &[&str] = &[
    "ts", "js", "tsx", "jsx", "py", "go", "rs", "java", "cpp", "cc", "c", "h", "hpp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Java,
    Cpp,
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Java => "java",
            Language::Cpp => "cpp",
        })
    }
}

lazy_static! {
    static ref PY_FN: Regex = Regex::new(r"def\s+(\w+)\s*\(").unwrap();
    static ref JS_FN: Regex =
        Regex::new(r"(?:function\s+(\w+)|(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s*)?\()").unwrap();
    static ref GO_FN: Regex = Regex::new(r"func\s+(\w+)\s*\(").unwrap();
    static ref RS_FN: Regex = Regex::new(r"fn\s+(\w+)\s*\(").unwrap();
    static ref JAVA_FN: Regex =
        Regex::new(r"(?:public|private|protected)?\s*(?:static\s+)?(?:\w+\s+)?(\w+)\s*\(").unwrap();
    static ref CPP_FN: Regex = Regex::new(r"(?:\w+\s+)?(\w+)\s*\([^)]*\)\s*\{").unwrap();
}

impl Language {
    /// Best-effort detection by file extension; `None` for anything else.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "py" => Some(Self::Python),
            "js" | "jsx" => Some(Self::JavaScript),
            "ts" | "tsx" => Some(Self::TypeScript),
            "go" => Some(Self::Go),
            "rs" => Some(Self::Rust),
            "java" => Some(Self::Java),
            "cpp" | "cc" | "c" | "h" | "hpp" => Some(Self::Cpp),
            _ => None,
        }
    }

    /// Regex whose matches mark function starts. Name is in group 1 or 2.
    pub fn function_pattern(self) -> &'static Regex {
        match self {
            Language::Python => &*PY_FN,
            Language::JavaScript | Language::TypeScript => &*JS_FN,
            Language::Go => &*GO_FN,
            Language::Rust => &*RS_FN,
            Language::Java => &*JAVA_FN,
            Language::Cpp => &*CPP_FN,
        }
    }

    /// Branching keywords counted as decision points.
    pub fn complexity_keywords(self) -> &'static [&'static str] {
        match self {
            Language::Python => &["if", "elif", "else", "for", "while", "try", "except", "with"],
            Language::JavaScript | Language::TypeScript | Language::Java | Language::Cpp => {
                &["if", "else", "for", "while", "switch", "catch", "case"]
            }
            Language::Go => &["if", "else", "for", "switch", "case", "select"],
            Language::Rust => &["if", "else", "for", "while", "match", "loop"],
        }
    }

    /// Indentation-significant languages use the keyword/colon nesting heuristic.
    pub fn indentation_scoped(self) -> bool {
        matches!(self, Language::Python)
    }
}

/// Whether the path has one of [`CODE_EXTENSIONS`] (case-sensitive, as in CI lists).
pub fn is_code_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CODE_EXTENSIONS.contains(&e))
}

/// Function starts as `(byte offset, name)`.
pub fn function_starts(content: &str, language: Language) -> Vec<(usize, String)> {
    language
        .function_pattern()
        .captures_iter(content)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let name = c.get(1).or_else(|| c.get(2)).map(|m| m.as_str()).unwrap_or("");
            Some((whole.start(), name.to_string()))
        })
        .collect()
}
