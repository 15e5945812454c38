//! Chat notifications for the PR pipelines.
//!
//! [`channels::Notifier`] delivers one [`channels::Message`] to every
//! configured channel. [`push`] renders the post-merge summary from the
//! artifacts loaded by [`workflow::WorkflowData`]; [`bump`] renders review
//! requests.

pub mod bump;
pub mod channels;
pub mod errors;
pub mod push;
pub mod text;
pub mod workflow;

pub use bump::{BumpContext, send_bump};
pub use channels::{Channel, DeliveryReport, Message, Notifier, NotifierConfig};
pub use errors::{NotifierError, NotifierResult};
pub use push::{CommitInfo, send_push_summary};
pub use workflow::WorkflowData;
