//! Source-control plumbing shared by the PR pipelines.
//!
//! - [`github::GitHubClient`]: token-authenticated REST calls (wiki page
//!   titles, file contents at a ref, issue comments, labels).
//! - [`git_cli::GitCli`]: thin async wrapper over the local `git` binary
//!   for reading previous revisions and committing bot changes.

pub mod errors;
pub mod git_cli;
pub mod github;

pub use errors::{GitContextEngineError, GitContextEngineResult};
pub use git_cli::GitCli;
pub use github::{GitHubClient, GitHubConfig};
