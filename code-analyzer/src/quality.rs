//! 0–100 quality score: documentation (30) + complexity (30) + maintainability (40).
//!
//! Every component is a text heuristic. Nothing here parses code.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::{Language, function_starts};

pub const DOCUMENTATION_MAX: u32 = 30;
pub const COMPLEXITY_MAX: u32 = 30;
pub const MAINTAINABILITY_MAX: u32 = 40;

const COMMENT_PREFIXES: [&str; 5] = ["#", "//", "/*", "*", "///"];
const LONG_LINE_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub score: u32,
    pub max: u32,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub documentation: Component,
    pub complexity: Component,
    pub maintainability: Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub total: u32,
    pub documentation: u32,
    pub complexity: u32,
    pub maintainability: u32,
    pub grade: String,
    pub breakdown: Breakdown,
}

/// Line-oriented view shared by the sub-scores.
struct Source<'a> {
    content: &'a str,
    lines: Vec<&'a str>,
    language: Option<Language>,
}

impl<'a> Source<'a> {
    fn new(content: &'a str, language: Option<Language>) -> Self {
        Self {
            content,
            // `split` keeps a trailing empty line, so an empty file has one line.
            lines: content.split('\n').collect(),
            language,
        }
    }

    fn comment_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| {
                let t = l.trim();
                COMMENT_PREFIXES.iter().any(|p| t.starts_with(p))
            })
            .count()
    }

    fn coverage_percent(&self) -> f64 {
        self.comment_lines() as f64 / self.lines.len() as f64 * 100.0
    }

    fn decision_points(&self) -> Option<usize> {
        let lang = self.language?;
        let alternation = lang.complexity_keywords().join("|");
        let re = Regex::new(&format!(r"\b(?:{alternation})\b")).ok()?;
        Some(re.find_iter(self.content).count())
    }

    fn long_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.chars().count() > LONG_LINE_CHARS)
            .count()
    }

    /// Mean newline count between successive function starts.
    fn average_function_length(&self) -> f64 {
        let Some(lang) = self.language else {
            return 0.0;
        };
        let starts = function_starts(self.content, lang);
        if starts.is_empty() {
            return 0.0;
        }
        let total: usize = starts
            .iter()
            .enumerate()
            .map(|(i, (start, _))| {
                let end = starts.get(i + 1).map(|s| s.0).unwrap_or(self.content.len());
                self.content[*start..end].matches('\n').count()
            })
            .sum();
        total as f64 / starts.len() as f64
    }

    fn max_nesting_depth(&self) -> i64 {
        let mut max_depth: i64 = 0;
        let mut depth: i64 = 0;
        let indentation_scoped = self.language.is_some_and(Language::indentation_scoped);

        for line in &self.lines {
            let stripped = line.trim();
            if indentation_scoped {
                const OPENERS: [&str; 7] = ["if", "for", "while", "def", "class", "with", "try"];
                if stripped.ends_with(':') && OPENERS.iter().any(|kw| stripped.contains(kw)) {
                    depth += 1;
                    max_depth = max_depth.max(depth);
                } else if !stripped.is_empty()
                    && !stripped.starts_with('#')
                    && line.len() == line.trim_start().len()
                    && depth > 0
                {
                    depth -= 1;
                }
            } else {
                depth += line.matches('{').count() as i64 - line.matches('}').count() as i64;
                max_depth = max_depth.max(depth);
            }
        }
        max_depth
    }
}

fn documentation_score(coverage: f64) -> u32 {
    if coverage >= 20.0 {
        30
    } else if coverage >= 15.0 {
        25
    } else if coverage >= 10.0 {
        20
    } else if coverage >= 5.0 {
        15
    } else {
        (coverage * 2.0) as u32
    }
}

fn complexity_score(src: &Source<'_>) -> u32 {
    let Some(points) = src.decision_points() else {
        return 15;
    };
    let per_line = points as f64 / src.lines.len() as f64;
    if per_line <= 0.05 {
        30
    } else if per_line <= 0.10 {
        25
    } else if per_line <= 0.15 {
        20
    } else if per_line <= 0.20 {
        15
    } else {
        10
    }
}

fn maintainability_score(src: &Source<'_>) -> u32 {
    let mut score: i64 = MAINTAINABILITY_MAX as i64;
    let total = src.lines.len() as f64;

    let long = src.long_lines() as f64;
    if long > total * 0.2 {
        score -= 10;
    } else if long > total * 0.1 {
        score -= 5;
    }

    let avg_fn = src.average_function_length();
    if avg_fn > 50.0 {
        score -= 10;
    } else if avg_fn > 30.0 {
        score -= 5;
    }

    let nesting = src.max_nesting_depth();
    if nesting > 5 {
        score -= 10;
    } else if nesting > 3 {
        score -= 5;
    }

    score.max(0) as u32
}

/// Letter grade for a total score.
pub fn grade(total: u32) -> &'static str {
    match total {
        90.. => "A+",
        85..=89 => "A",
        80..=84 => "A-",
        75..=79 => "B+",
        70..=74 => "B",
        65..=69 => "B-",
        60..=64 => "C+",
        55..=59 => "C",
        50..=54 => "C-",
        _ => "D",
    }
}

/// Computes the full score for one file.
pub fn quality_score(content: &str, language: Option<Language>) -> QualityScore {
    let src = Source::new(content, language);

    let coverage = src.coverage_percent();
    let documentation = documentation_score(coverage);
    let complexity = complexity_score(&src);
    let maintainability = maintainability_score(&src);
    let total = documentation + complexity + maintainability;

    let complexity_details = match src.decision_points() {
        Some(n) => format!("{n} decision points"),
        None => "Language not supported for complexity analysis".to_string(),
    };

    QualityScore {
        total,
        documentation,
        complexity,
        maintainability,
        grade: grade(total).to_string(),
        breakdown: Breakdown {
            documentation: Component {
                score: documentation,
                max: DOCUMENTATION_MAX,
                details: format!(
                    "{coverage:.1}% documentation coverage ({}/{} lines)",
                    src.comment_lines(),
                    src.lines.len()
                ),
            },
            complexity: Component {
                score: complexity,
                max: COMPLEXITY_MAX,
                details: complexity_details,
            },
            maintainability: Component {
                score: maintainability,
                max: MAINTAINABILITY_MAX,
                details: format!(
                    "{} long lines, avg function: {:.0} lines, max nesting: {}",
                    src.long_lines(),
                    src.average_function_length(),
                    src.max_nesting_depth()
                ),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_ranges(s: &QualityScore) {
        assert!(s.documentation <= DOCUMENTATION_MAX);
        assert!(s.complexity <= COMPLEXITY_MAX);
        assert!(s.maintainability <= MAINTAINABILITY_MAX);
        assert_eq!(s.total, s.documentation + s.complexity + s.maintainability);
        assert_eq!(s.breakdown.documentation.score, s.documentation);
    }

    #[test]
    fn sub_scores_stay_in_range_for_varied_inputs() {
        let long = "x".repeat(200);
        let deep = "{".repeat(12);
        let branchy = "if (a) { if (b) { for (;;) { while (c) {} } } } else {}\n".repeat(20);
        let samples: Vec<(String, Option<Language>)> = vec![
            (String::new(), None),
            (String::new(), Some(Language::Rust)),
            ("// doc\nfn a() {}\n".into(), Some(Language::Rust)),
            (format!("{long}\n{long}\n{deep}\n"), Some(Language::TypeScript)),
            (branchy, Some(Language::JavaScript)),
            ("def f():\n    if x:\n        for y in z:\n            pass\n".into(), Some(Language::Python)),
            ("plain text\n".into(), None),
        ];
        for (content, lang) in samples {
            check_ranges(&quality_score(&content, lang));
        }
    }

    #[test]
    fn documentation_thresholds() {
        assert_eq!(documentation_score(25.0), 30);
        assert_eq!(documentation_score(15.0), 25);
        assert_eq!(documentation_score(12.0), 20);
        assert_eq!(documentation_score(5.0), 15);
        assert_eq!(documentation_score(4.9), 9);
        assert_eq!(documentation_score(0.0), 0);
    }

    #[test]
    fn unknown_language_gets_mid_complexity() {
        let s = quality_score("if if if if\n", None);
        assert_eq!(s.complexity, 15);
        assert_eq!(
            s.breakdown.complexity.details,
            "Language not supported for complexity analysis"
        );
    }

    #[test]
    fn deep_braces_and_long_lines_cost_maintainability() {
        let long = "y".repeat(130);
        let content = format!("{}\n{long}\n{long}\n", "{".repeat(6));
        let s = quality_score(&content, Some(Language::Cpp));
        // >20% long lines (-10) and nesting 6 (-10)
        assert_eq!(s.maintainability, 20);
    }

    #[test]
    fn grades_follow_thresholds() {
        assert_eq!(grade(100), "A+");
        assert_eq!(grade(85), "A");
        assert_eq!(grade(80), "A-");
        assert_eq!(grade(74), "B");
        assert_eq!(grade(50), "C-");
        assert_eq!(grade(49), "D");
    }
}
