//! The PR comment summarizing one documentation run (`doc_output.md`).

use std::fmt::Write as _;

use crate::breaking::BreakingChange;
use crate::changelog::ChangelogEntry;
use crate::docs::file_name;
use crate::impact::Impact;

const IMPACT_FILES_SHOWN: usize = 3;
const IMPACTS_PER_FILE: usize = 5;

pub const COMMENT_FOOTER: &str =
    "*Documentation automatically generated. Ask questions about these changes below!*";

pub struct CommentInput<'a> {
    pub code_files: &'a [String],
    pub doc_files: &'a [String],
    pub breaking_changes: &'a [BreakingChange],
    pub impacts: &'a [Impact],
    pub changelog_entries: &'a [ChangelogEntry],
}

fn group_by_changed_file(impacts: &[Impact]) -> Vec<(&str, Vec<&Impact>)> {
    let mut groups: Vec<(&str, Vec<&Impact>)> = Vec::new();
    for imp in impacts {
        match groups.iter_mut().find(|(f, _)| *f == imp.changed_file) {
            Some((_, list)) => list.push(imp),
            None => groups.push((imp.changed_file.as_str(), vec![imp])),
        }
    }
    groups
}

pub fn render_pr_comment(input: &CommentInput<'_>) -> String {
    let mut out = String::from("## 🤖 Auto-Generated Documentation & Analysis\n\n");
    let breaking = !input.breaking_changes.is_empty();

    if breaking {
        out.push_str("### ⚠️ BREAKING CHANGES DETECTED\n\n");
        out.push_str("This PR contains breaking changes that may affect users:\n\n");
        for c in input.breaking_changes {
            let _ = writeln!(out, "- **{}**: {}", c.symbol, c.message);
            if let (Some(old), Some(new)) = (&c.old, &c.new) {
                let _ = writeln!(out, "  ```diff\n  - {old}\n  + {new}\n  ```");
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "### 📁 Files Changed ({})\n", input.code_files.len());
    for f in input.code_files {
        let _ = writeln!(out, "- `{}`", file_name(f));
    }
    out.push('\n');

    if !input.changelog_entries.is_empty() {
        out.push_str("### 📋 Changelog Entries\n\n");
        for e in input.changelog_entries {
            let _ = write!(out, "**{}**\n\n{}\n\n", e.file, e.content);
        }
    }

    if !input.impacts.is_empty() {
        out.push_str("### 🔗 Cross-File Impact Analysis\n\n");
        let _ = writeln!(
            out,
            "These changes may affect {} other file(s):\n",
            input.impacts.len()
        );
        for (changed, list) in group_by_changed_file(input.impacts)
            .into_iter()
            .take(IMPACT_FILES_SHOWN)
        {
            let _ = writeln!(out, "**{changed}**");
            for imp in list.iter().take(IMPACTS_PER_FILE) {
                let _ = writeln!(out, "- Uses `{}` from `{}`", imp.symbol, imp.affects_file);
            }
            if list.len() > IMPACTS_PER_FILE {
                let _ = writeln!(out, "- ... and {} more", list.len() - IMPACTS_PER_FILE);
            }
            out.push('\n');
        }
    }

    out.push_str("### 📚 Documentation Generated\n\n");
    for d in input.doc_files {
        let _ = writeln!(out, "- [`{}`]({d})", file_name(d));
    }
    out.push('\n');

    out.push_str("### ✅ Recommended Actions\n\n");
    if breaking {
        out.push_str("- [ ] Update major version number\n");
        out.push_str("- [ ] Create migration guide\n");
        out.push_str("- [ ] Notify users of breaking changes\n");
    } else {
        out.push_str("- [ ] Review generated documentation\n");
        out.push_str("- [ ] Update CHANGELOG.md if needed\n");
    }
    if !input.impacts.is_empty() {
        out.push_str("- [ ] Test affected files for regressions\n");
    }

    let _ = writeln!(out, "\n---\n\n{COMMENT_FOOTER}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaking::ChangeKind;
    use crate::symbols::SymbolKind;

    fn impact(changed: &str, symbol: &str) -> Impact {
        Impact {
            changed_file: changed.into(),
            affects_file: "src/core.ts".into(),
            symbol: symbol.into(),
            kind: SymbolKind::Function,
        }
    }

    #[test]
    fn clean_run_recommends_review() {
        let files = vec!["src/a.ts".to_string()];
        let docs = vec!["docs/a.md".to_string()];
        let c = render_pr_comment(&CommentInput {
            code_files: &files,
            doc_files: &docs,
            breaking_changes: &[],
            impacts: &[],
            changelog_entries: &[],
        });
        assert!(c.starts_with("## 🤖 Auto-Generated Documentation & Analysis\n\n### 📁 Files Changed (1)\n\n- `a.ts`\n"));
        assert!(c.contains("- [`a.md`](docs/a.md)"));
        assert!(c.contains("- [ ] Review generated documentation"));
        assert!(!c.contains("BREAKING"));
        assert!(c.trim_end().ends_with(COMMENT_FOOTER));
    }

    #[test]
    fn breaking_and_impacts_are_summarized() {
        let breaking = vec![BreakingChange {
            kind: ChangeKind::SignatureChange,
            symbol: "foo".into(),
            severity: "BREAKING".into(),
            message: "Modified signature of foo".into(),
            old: Some("export function foo(a, b)".into()),
            new: Some("export function foo(a)".into()),
        }];
        let impacts: Vec<Impact> = (0..7).map(|i| impact("src/page.ts", &format!("s{i}"))).collect();
        let c = render_pr_comment(&CommentInput {
            code_files: &[],
            doc_files: &[],
            breaking_changes: &breaking,
            impacts: &impacts,
            changelog_entries: &[],
        });
        assert!(c.contains("### ⚠️ BREAKING CHANGES DETECTED"));
        assert!(c.contains("- **foo**: Modified signature of foo\n  ```diff\n  - export function foo(a, b)\n  + export function foo(a)\n  ```"));
        assert!(c.contains("These changes may affect 7 other file(s):"));
        assert!(c.contains("- Uses `s4` from `src/core.ts`"));
        assert!(!c.contains("`s5`"));
        assert!(c.contains("- ... and 2 more"));
        assert!(c.contains("- [ ] Update major version number"));
        assert!(c.contains("- [ ] Test affected files for regressions"));
    }
}
