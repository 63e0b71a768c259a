//! SQS queue adapter.

use crate::client::AwsHandle;
use crate::error::distill;
use serde_json::json;
use skyflow_core::{ApiError, PageRequest, PageResponse, Record};

/// Fetch one page of queues, optionally restricted to a name prefix.
pub async fn list(
    handle: &AwsHandle,
    request: PageRequest,
    prefix: Option<&str>,
) -> Result<PageResponse<Record>, ApiError> {
    let output = handle
        .sqs()
        .list_queues()
        .set_next_token(request.cursor)
        .set_max_results(request.page_size)
        .set_queue_name_prefix(prefix.map(str::to_owned))
        .send()
        .await
        .map_err(distill)?;

    let items = output
        .queue_urls()
        .iter()
        .map(|url| to_record(url))
        .collect();
    Ok(PageResponse {
        items,
        next_cursor: output.next_token().map(str::to_owned),
    })
}

fn to_record(queue_url: &str) -> Record {
    // The queue name is the last path segment of its URL.
    let name = queue_url.rsplit('/').next().unwrap_or(queue_url);

    let mut record = Record::new();
    record.insert("name".to_string(), json!(name));
    record.insert("queue_url".to_string(), json!(queue_url));
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_name_is_the_last_url_segment() {
        let record = to_record("https://sqs.ap-northeast-1.amazonaws.com/123456789012/orders");
        assert_eq!(record["name"], json!("orders"));
        assert_eq!(
            record["queue_url"],
            json!("https://sqs.ap-northeast-1.amazonaws.com/123456789012/orders")
        );
    }

    #[test]
    fn slashless_url_falls_back_to_the_whole_string() {
        let record = to_record("orders");
        assert_eq!(record["name"], json!("orders"));
    }
}
