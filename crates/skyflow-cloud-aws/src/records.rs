//! Record field helpers shared by the resource adapters.

use aws_smithy_types::DateTime;
use aws_smithy_types::date_time::Format;
use serde_json::Value;

/// ISO-8601 text for an optional SDK timestamp; null when absent or not
/// representable in that form.
pub(crate) fn datetime(value: Option<&DateTime>) -> Value {
    value
        .and_then(|dt| dt.fmt(Format::DateTime).ok())
        .map(Value::String)
        .unwrap_or(Value::Null)
}
