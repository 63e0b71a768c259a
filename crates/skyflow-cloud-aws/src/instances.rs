//! EC2 instance adapters.

use crate::client::AwsHandle;
use crate::error::distill;
use aws_sdk_ec2::types::{Filter, Instance};
use serde_json::json;
use skyflow_core::{ApiError, PageRequest, PageResponse, Record};

/// Fetch one page of instances, optionally filtered by state name
/// (`running`, `stopped`, ...).
pub async fn list(
    handle: &AwsHandle,
    request: PageRequest,
    state: Option<&str>,
) -> Result<PageResponse<Record>, ApiError> {
    let mut call = handle
        .ec2()
        .describe_instances()
        .set_next_token(request.cursor)
        .set_max_results(request.page_size);
    if let Some(state) = state {
        call = call.filters(
            Filter::builder()
                .name("instance-state-name")
                .values(state)
                .build(),
        );
    }

    let output = call.send().await.map_err(distill)?;

    let items = output
        .reservations()
        .iter()
        .flat_map(|reservation| reservation.instances())
        .map(to_record)
        .collect();
    Ok(PageResponse {
        items,
        next_cursor: output.next_token().map(str::to_owned),
    })
}

/// Fetch a single instance by id.
///
/// EC2 answers some unknown ids with an empty reservation list instead of an
/// error; that case is folded into the SDK's own not-found code so the
/// classifier treats both shapes identically.
pub async fn describe(handle: &AwsHandle, instance_id: &str) -> Result<Record, ApiError> {
    let output = handle
        .ec2()
        .describe_instances()
        .instance_ids(instance_id)
        .send()
        .await
        .map_err(distill)?;

    output
        .reservations()
        .iter()
        .flat_map(|reservation| reservation.instances())
        .next()
        .map(to_record)
        .ok_or_else(|| {
            ApiError::new(format!("The instance ID '{instance_id}' does not exist"))
                .with_code("InvalidInstanceID.NotFound")
        })
}

fn to_record(instance: &Instance) -> Record {
    let name = instance
        .tags()
        .iter()
        .find(|tag| tag.key() == Some("Name"))
        .and_then(|tag| tag.value());

    let mut record = Record::new();
    record.insert(
        "instance_id".to_string(),
        json!(instance.instance_id()),
    );
    record.insert("name".to_string(), json!(name));
    record.insert(
        "instance_type".to_string(),
        json!(instance.instance_type().map(|t| t.as_str())),
    );
    record.insert(
        "state".to_string(),
        json!(
            instance
                .state()
                .and_then(|state| state.name())
                .map(|name| name.as_str())
        ),
    );
    record.insert(
        "availability_zone".to_string(),
        json!(
            instance
                .placement()
                .and_then(|placement| placement.availability_zone())
        ),
    );
    record.insert(
        "private_ip".to_string(),
        json!(instance.private_ip_address()),
    );
    record.insert("public_ip".to_string(), json!(instance.public_ip_address()));
    record.insert(
        "launch_time".to_string(),
        crate::records::datetime(instance.launch_time()),
    );
    record
}
