//! EC2 fleet adapter.

use crate::client::AwsHandle;
use crate::error::distill;
use crate::records::datetime;
use aws_sdk_ec2::types::FleetData;
use serde_json::json;
use skyflow_core::{ApiError, PageRequest, PageResponse, Record};

/// Fetch one page of managed-instance fleets.
pub async fn list(
    handle: &AwsHandle,
    request: PageRequest,
) -> Result<PageResponse<Record>, ApiError> {
    let output = handle
        .ec2()
        .describe_fleets()
        .set_next_token(request.cursor)
        .set_max_results(request.page_size)
        .send()
        .await
        .map_err(distill)?;

    let items = output.fleets().iter().map(to_record).collect();
    Ok(PageResponse {
        items,
        next_cursor: output.next_token().map(str::to_owned),
    })
}

fn to_record(fleet: &FleetData) -> Record {
    let mut record = Record::new();
    record.insert("fleet_id".to_string(), json!(fleet.fleet_id()));
    record.insert(
        "state".to_string(),
        json!(fleet.fleet_state().map(|state| state.as_str())),
    );
    record.insert(
        "type".to_string(),
        json!(fleet.r#type().map(|fleet_type| fleet_type.as_str())),
    );
    record.insert(
        "target_capacity".to_string(),
        json!(
            fleet
                .target_capacity_specification()
                .and_then(|spec| spec.total_target_capacity())
        ),
    );
    record.insert(
        "fulfilled_capacity".to_string(),
        json!(fleet.fulfilled_capacity()),
    );
    record.insert("create_time".to_string(), datetime(fleet.create_time()));
    record
}
