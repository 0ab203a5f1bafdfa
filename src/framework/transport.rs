//! # Transport Contract
//!
//! A [`Transport`] delivers one named call with its ordered wire arguments and
//! returns the server's response structure:
//!
//! ```text
//! { "Status": "Success", "Value": <payload> }
//! { "Status": "Failure", "ErrorDescription": [code, param, ...] }
//! ```
//!
//! [`invoke`] is the single dispatch entry point of the crate. It hands the call
//! to the transport, then unwraps the envelope into either the payload or a
//! typed [`Failure`].

use crate::framework::error::{Error, Result};
use crate::framework::failure::Failure;
use crate::framework::value::Value;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Method prefix that routes a call to its asynchronous, task-returning form.
pub const ASYNC_PREFIX: &str = "Async.";

/// Delivers calls to a server.
///
/// Implementations own everything below the response structure: encoding,
/// connection handling, timeouts and cancellation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, method: &str, params: Vec<Value>) -> Result<Value>;
}

/// Dispatches `method` and unwraps the response envelope.
pub async fn invoke(transport: &dyn Transport, method: &str, params: Vec<Value>) -> Result<Value> {
    debug!(method, args = params.len(), "Sending request");
    let response = transport.dispatch(method, params).await?;
    let result = interpret_response(method, response);
    if let Err(Error::Failure(failure)) = &result {
        warn!(method, code = %failure.code, "Server reported failure");
    }
    result
}

/// Turns a response structure into its payload or a typed failure.
pub fn interpret_response(method: &str, response: Value) -> Result<Value> {
    let Value::Struct(mut fields) = response else {
        return Err(bad_response(
            method,
            format!("expected a response struct, got {}", response.kind()),
        ));
    };

    match fields.get("Status").and_then(Value::as_str) {
        Some("Success") => fields
            .remove("Value")
            .ok_or_else(|| bad_response(method, "success without a Value".to_string())),
        Some("Failure") => match fields.get("ErrorDescription") {
            Some(description) => match failure_from_description(description) {
                Some(failure) => Err(failure.into()),
                None => Err(bad_response(
                    method,
                    format!("malformed ErrorDescription: {description}"),
                )),
            },
            None => Err(bad_response(method, "failure without an ErrorDescription".to_string())),
        },
        Some(other) => Err(bad_response(method, format!("unknown Status `{other}`"))),
        None => Err(bad_response(method, "missing Status".to_string())),
    }
}

/// Builds a failure from an `ErrorDescription` list. Non-string parameters are
/// rendered as text.
pub fn failure_from_description(description: &Value) -> Option<Failure> {
    let (code, params) = description.as_array()?.split_first()?;
    let code = code.as_str()?;
    Some(Failure::new(
        code,
        params.iter().map(ToString::to_string).collect(),
    ))
}

fn bad_response(method: &str, msg: String) -> Error {
    warn!(method, %msg, "Malformed response");
    Error::BadServerResponse(msg)
}
