//! SdkError distillation.

use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::operation::RequestId;
use skyflow_core::ApiError;

/// Distill any AWS `SdkError` into the core's provider-neutral [`ApiError`].
///
/// The service error code and message come from the error metadata; the HTTP
/// status and request id are taken from the raw response when one exists
/// (dispatch and timeout failures have neither). When there is no service
/// message the full source chain is joined so nothing is lost before
/// classification.
pub fn distill<E>(err: SdkError<E>) -> ApiError
where
    E: ProvideErrorMetadata + RequestId + std::error::Error + Send + Sync + 'static,
{
    let code = err.code().map(str::to_owned);
    let status = err.raw_response().map(|response| response.status().as_u16());
    let request_id = err
        .as_service_error()
        .and_then(RequestId::request_id)
        .map(str::to_owned);

    let message = match err.message() {
        Some(message) => message.to_owned(),
        None => join_chain(&err),
    };

    let mut api = ApiError::new(message);
    if let Some(code) = code {
        api = api.with_code(code);
    }
    if let Some(status) = status {
        api = api.with_status(status);
    }
    if let Some(request_id) = request_id {
        api = api.with_request_id(request_id);
    }
    api
}

fn join_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
