//! Bots driven by PR comments.
//!
//! - [`question`]: answers questions using the PR's code as context.
//! - [`agent`]: applies edits requested by the PR author or assignees,
//!   asking for confirmation when the request is ambiguous.

pub mod agent;
pub mod context;
pub mod edits;
pub mod errors;
pub mod intent;
pub mod pending;
pub mod question;

pub use agent::AgentOutcome;
pub use context::{BotConfig, CommentContext};
pub use errors::{PrBotError, PrBotResult};
pub use intent::{Intent, IntentCategory};
pub use pending::PendingAction;
