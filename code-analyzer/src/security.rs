//! Fixed table of security anti-pattern regexes.
//!
//! All patterns are case-insensitive and match within a single line. Each
//! hit becomes one [`SecurityFinding`]. Overlapping hits from different
//! patterns are all reported.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::types::{Severity, line_of};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub category: String,
    pub severity: Severity,
    pub description: String,
    /// 1-based line of the match start.
    pub line: usize,
    /// The trimmed source line.
    pub code: String,
}

struct Rule {
    category: &'static str,
    regex: Regex,
    description: &'static str,
    /// Optional veto on the first capture group.
    reject_capture: Option<fn(&str) -> bool>,
}

fn rule(category: &'static str, pattern: &str, description: &'static str) -> Rule {
    Rule {
        category,
        regex: RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .unwrap(),
        description,
        reject_capture: None,
    }
}

fn is_template_placeholder(value: &str) -> bool {
    value.starts_with("{{")
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        Rule {
            reject_capture: Some(is_template_placeholder),
            ..rule(
                "hardcoded_secret",
                r#"password\s*=\s*["']([^"']{8,})["']"#,
                "Hardcoded password detected",
            )
        },
        rule("hardcoded_secret", r#"api[_-]?key\s*=\s*["'][^"']{20,}["']"#, "Hardcoded API key detected"),
        rule("hardcoded_secret", r#"secret\s*=\s*["'][^"']{16,}["']"#, "Hardcoded secret detected"),
        rule("hardcoded_secret", r#"token\s*=\s*["'][^"']{20,}["']"#, "Hardcoded token detected"),
        rule("sql_injection", r#"execute\s*\(\s*["'].*\+.*["']"#, "Possible SQL injection (string concatenation)"),
        rule("sql_injection", r#"query\s*\(\s*f["'].*\{.*\}.*["']"#, "Possible SQL injection (f-string formatting)"),
        rule("sql_injection", r"SELECT.*\+\s*\w+", "Possible SQL injection in query"),
        rule("xss", r"innerHTML\s*=\s*\w+", "Possible XSS via innerHTML"),
        rule("xss", r"dangerouslySetInnerHTML", "Dangerous HTML injection"),
        rule("xss", r"eval\s*\(", "Dangerous use of eval()"),
        rule("path_traversal", r"open\s*\([^)]*\+.*\)", "Possible path traversal in file operations"),
        rule("path_traversal", r"File\s*\([^)]*\+.*\)", "Possible path traversal in file creation"),
        rule("command_injection", r"exec\s*\(", "Dangerous use of exec()"),
        rule("command_injection", r"os\.system\s*\(", "Dangerous use of os.system()"),
        rule("command_injection", r"subprocess\..*shell\s*=\s*True", "Dangerous shell=True in subprocess"),
    ];
}

fn severity_for(category: &str) -> Severity {
    match category {
        "sql_injection" | "command_injection" => Severity::High,
        _ => Severity::Medium,
    }
}

/// Scans the whole file and returns findings in rule order, then position.
pub fn scan_security(content: &str) -> Vec<SecurityFinding> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut findings = Vec::new();

    for rule in RULES.iter() {
        for caps in rule.regex.captures_iter(content) {
            if let (Some(reject), Some(value)) = (rule.reject_capture, caps.get(1)) {
                if reject(value.as_str()) {
                    continue;
                }
            }
            let Some(m) = caps.get(0) else { continue };
            let line = line_of(content, m.start());
            findings.push(SecurityFinding {
                category: rule.category.to_string(),
                severity: severity_for(rule.category),
                description: rule.description.to_string(),
                line,
                code: lines.get(line - 1).map(|l| l.trim().to_string()).unwrap_or_default(),
            });
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardcoded_password_flagged_once_on_its_line() {
        let src = "const user = \"admin\";\n\nconst password = \"abcdefgh12\";\n";
        let found = scan_security(src);
        let secrets: Vec<_> = found.iter().filter(|f| f.category == "hardcoded_secret").collect();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].line, 3);
        assert_eq!(secrets[0].severity, Severity::Medium);
        assert_eq!(secrets[0].code, "const password = \"abcdefgh12\";");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn short_or_templated_passwords_are_ignored() {
        assert!(scan_security("password = \"short\"").is_empty());
        assert!(scan_security("PASSWORD = '{{ secrets.DB_PASSWORD }}'").is_empty());
    }

    #[test]
    fn injection_findings_are_high_severity() {
        let src = "cursor.execute(\"SELECT * FROM t WHERE id=\" + uid + \"\")\nos.system(cmd)\n";
        let found = scan_security(src);
        assert!(found.iter().any(|f| f.category == "sql_injection" && f.severity == Severity::High));
        let cmd: Vec<_> = found.iter().filter(|f| f.category == "command_injection").collect();
        assert_eq!(cmd.len(), 1);
        assert_eq!(cmd[0].line, 2);
    }

    #[test]
    fn overlapping_rules_are_not_deduplicated() {
        // `eval(` is xss; the same line also concatenates into `open(`.
        let found = scan_security("open(base + name); eval(x)");
        assert!(found.iter().any(|f| f.category == "path_traversal"));
        assert!(found.iter().any(|f| f.category == "xss"));
    }
}
