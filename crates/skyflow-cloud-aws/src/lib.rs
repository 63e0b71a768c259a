//! AWS binding for Skyflow
//!
//! Implements the `skyflow-core` seams against the official AWS SDK:
//! connection construction ([`AwsConnector`]), `SdkError` distillation into
//! the core's provider-neutral [`skyflow_core::ApiError`], and one page-fetch
//! adapter per resource family (EC2 instances, S3 buckets, SQS queues, EC2
//! fleets). The wire protocol, credential files and request signing all
//! belong to the SDK; this crate only shapes its inputs and outputs.

pub mod buckets;
pub mod client;
pub mod error;
pub mod fleets;
pub mod instances;
pub mod queues;
mod records;

pub use client::{AwsConnector, AwsHandle};
pub use error::distill;
