//! Documentation pipeline for changed source files.
//!
//! For every changed code file the run compares exported declarations with
//! the previous revision, asks the LLM for an API page, and collects the
//! results into a PR comment, a changelog block and a breaking-change flag
//! that CI uses to label the pull request.

pub mod breaking;
pub mod changelog;
pub mod comment;
pub mod docs;
pub mod errors;
pub mod impact;
pub mod revision;
pub mod run;
pub mod symbols;

pub use breaking::{BreakingChange, BreakingReport, ChangeKind, detect_breaking_changes};
pub use changelog::{ChangelogEntry, changelog_entry, update_changelog};
pub use errors::{DocGenError, DocGenResult};
pub use impact::{Impact, analyze_cross_file_impact};
pub use revision::RevisionSource;
pub use run::{DocGenConfig, DocGenOutcome, run};
pub use symbols::{Symbol, SymbolKind, extract_symbols};

/// Label added to pull requests with breaking changes.
pub const BREAKING_LABEL: &str = "breaking-change";
