//! Pairs changed source files with the docs generated for them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{DocRouterError, DocRouterResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPair {
    /// Repository-relative source path, as listed in `changed_files.txt`.
    pub source: String,
    /// Generated page, `<docs_dir>/<stem>.md`.
    pub doc: PathBuf,
}

/// Newline-separated path list without blanks; `None` when the file is absent.
pub fn read_changed_files(path: &Path) -> DocRouterResult<Option<Vec<String>>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DocRouterError::io(path, e)),
    }
}

/// Keeps the changed files that have a generated doc in `docs_dir`.
pub fn doc_pairs(changed: &[String], docs_dir: &Path) -> Vec<DocPair> {
    let pairs: Vec<DocPair> = changed
        .iter()
        .filter_map(|source| {
            let stem = Path::new(source).file_stem()?.to_str()?;
            let doc = docs_dir.join(format!("{stem}.md"));
            if doc.is_file() {
                Some(DocPair {
                    source: source.clone(),
                    doc,
                })
            } else {
                debug!(%source, "no generated doc");
                None
            }
        })
        .collect();
    info!(count = pairs.len(), "docs found for changed sources");
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sources_with_docs_are_paired() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("auth.md"), "# auth").unwrap();

        let changed = vec!["src/auth.ts".to_string(), "src/db.ts".to_string()];
        let pairs = doc_pairs(&changed, &docs);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].source, "src/auth.ts");
        assert_eq!(pairs[0].doc, docs.join("auth.md"));
    }

    #[test]
    fn missing_list_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_changed_files(&dir.path().join("nope.txt")).unwrap(), None);
        let list = dir.path().join("changed_files.txt");
        fs::write(&list, "a.ts\n\n  b.ts \n").unwrap();
        assert_eq!(read_changed_files(&list).unwrap(), Some(vec!["a.ts".into(), "b.ts".into()]));
    }
}
