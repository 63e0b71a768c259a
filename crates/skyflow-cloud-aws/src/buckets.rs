//! S3 bucket adapter.

use crate::client::AwsHandle;
use crate::error::distill;
use crate::records::datetime;
use aws_sdk_s3::types::Bucket;
use serde_json::json;
use skyflow_core::{ApiError, PageRequest, PageResponse, Record};

/// List all buckets. The call returns the full set at once, so it is served
/// as one terminal page; the aggregator's maximum still applies through
/// truncation.
pub async fn list(
    handle: &AwsHandle,
    _request: PageRequest,
) -> Result<PageResponse<Record>, ApiError> {
    let output = handle.s3().list_buckets().send().await.map_err(distill)?;

    let items = output.buckets().iter().map(to_record).collect();
    Ok(PageResponse::terminal(items))
}

fn to_record(bucket: &Bucket) -> Record {
    let mut record = Record::new();
    record.insert("name".to_string(), json!(bucket.name()));
    record.insert(
        "creation_date".to_string(),
        datetime(bucket.creation_date()),
    );
    record
}
