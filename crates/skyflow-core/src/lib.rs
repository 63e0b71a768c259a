//! Skyflow runtime core
//!
//! The shared layer beneath every Skyflow resource command: connection
//! caching, backoff retry, pagination aggregation, error classification and
//! the structured-output pipeline. Provider bindings (`skyflow-cloud-aws`)
//! and the CLI sit on top; this crate owns no wire protocol and persists no
//! state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Skyflow CLI                     │
//! │           (sky instance/bucket/queue)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                skyflow-core                      │
//! │  ┌────────────┐ ┌────────────┐ ┌─────────────┐  │
//! │  │ ClientCache│ │ retry/page │ │   output    │  │
//! │  └────────────┘ └────────────┘ └─────────────┘  │
//! │  ┌────────────┐ ┌────────────┐                  │
//! │  │  classify  │ │  progress  │                  │
//! │  └────────────┘ └────────────┘                  │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ skyflow-cloud │
//! │     -aws      │
//! └───────────────┘
//! ```
//!
//! Commands obtain a handle from the [`connection::ClientCache`], wrap each
//! bound API call in [`retry::retry_with`] and [`page::paginate`], funnel any
//! failure through [`error::classify`] and hand the resulting records to
//! [`output::render`].

pub mod connection;
pub mod deadline;
pub mod error;
pub mod output;
pub mod page;
pub mod progress;
pub mod retry;

// Re-exports
pub use connection::{ClientCache, ClientConfig, Connect};
pub use deadline::deadline;
pub use error::{ApiError, BoxError, DomainError, ErrorKind, Result, classify, kind_of};
pub use output::{OutputFormat, Record, render};
pub use page::{PageRequest, PageResponse, paginate};
pub use progress::{Progress, SilentProgress, SpinnerProgress};
pub use retry::{RetryPolicy, retry, retry_with};
