//! Routes generated documentation into its long-lived homes.
//!
//! Two routers share one on-disk mapping format ([`mapping::DocMapping`]):
//! [`wiki`] prepares GitHub Wiki pages, [`pages`] maintains a GitHub Pages
//! site split into api/modules/features sections.

pub mod errors;
pub mod mapping;
pub mod pages;
pub mod sources;
pub mod text;
pub mod wiki;

pub use errors::{DocRouterError, DocRouterResult};
pub use mapping::{ConsistencyIssue, DocMapping, PageMetadata, PageRefs};
pub use pages::{PageAction, PageChange, PageDecision, PagesConfig, PagesManager, PagesOutcome, Perspective};
pub use wiki::{WikiConfig, WikiManager, WikiOutcome};
