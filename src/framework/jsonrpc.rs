//! # JSON-RPC Envelope
//!
//! The server also speaks JSON-RPC 2.0. This module does the encoding half of a
//! JSON-RPC transport without owning any I/O: build the request body with
//! [`encode_request`], POST it with whatever HTTP client the application uses,
//! and feed the reply to [`decode_response`]. The result is the same response
//! structure every [`Transport`](crate::framework::Transport) returns.
//!
//! Errors arrive as `{"code", "message", "data"}`; the server puts the error code
//! in `message` and its parameters in `data`, so they map straight onto an
//! `ErrorDescription` list.

use crate::framework::error::{Error, Result};
use crate::framework::value::{Value, WIRE_DATE_FORMAT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};

#[derive(Debug, Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<serde_json::Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Serializes one call as a JSON-RPC 2.0 request body.
pub fn encode_request(method: &str, params: &[Value], id: u64) -> Result<String> {
    let request = Request {
        jsonrpc: "2.0",
        method,
        params: params.iter().map(to_json).collect(),
        id,
    };
    serde_json::to_string(&request).map_err(|e| Error::Transport(Box::new(e)))
}

/// Parses a JSON-RPC reply body into a response structure.
pub fn decode_response(body: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| Error::BadServerResponse(format!("invalid JSON-RPC body: {e}")))?;
    let reply = json
        .as_object()
        .ok_or_else(|| Error::BadServerResponse("JSON-RPC reply is not an object".into()))?;

    if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
        let error: RpcError = serde_json::from_value(error.clone())
            .map_err(|e| Error::BadServerResponse(format!("invalid JSON-RPC error: {e}")))?;
        tracing::debug!(code = error.code, message = %error.message, "JSON-RPC error reply");

        let mut description = vec![Value::String(error.message)];
        match error.data {
            Some(serde_json::Value::Array(items)) => description.extend(items.into_iter().map(from_json)),
            Some(serde_json::Value::Null) | None => {}
            Some(other) => description.push(from_json(other)),
        }
        return Ok(crate::wire_struct! {
            "Status" => "Failure",
            "ErrorDescription" => description,
        });
    }

    match reply.get("result") {
        Some(result) => Ok(crate::wire_struct! {
            "Status" => "Success",
            "Value" => from_json(result.clone()),
        }),
        None => Err(Error::BadServerResponse(
            "JSON-RPC reply has neither result nor error".into(),
        )),
    }
}

pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Double(d) => Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => serde_json::Value::String(dt.format(WIRE_DATE_FORMAT).to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Struct(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

/// Dates stay strings here; the codec parses them when a date is expected.
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Double(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            Value::Struct(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::transport::interpret_response;
    use crate::framework::FailureKind;
    use chrono::{TimeZone, Utc};

    #[test]
    fn request_body_is_json_rpc_2() {
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let body = encode_request(
            "message.get_since",
            &[Value::from("OpaqueRef:s"), Value::DateTime(when)],
            9,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "message.get_since");
        assert_eq!(json["id"], 9);
        assert_eq!(json["params"][1], "20240102T03:04:05Z");
    }

    #[test]
    fn result_becomes_success() {
        let response = decode_response(r#"{"jsonrpc":"2.0","id":1,"result":["OpaqueRef:a"]}"#).unwrap();
        let value = interpret_response("VM.get_all", response).unwrap();
        assert_eq!(value, Value::Array(vec![Value::from("OpaqueRef:a")]));
    }

    #[test]
    fn null_result_is_still_success() {
        let response = decode_response(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert_eq!(interpret_response("VM.start", response).unwrap(), Value::Nil);
    }

    #[test]
    fn error_becomes_failure() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":1,"message":"SESSION_INVALID","data":["OpaqueRef:s"]}}"#;
        let err = interpret_response("VM.get_all", decode_response(body).unwrap()).unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::SessionInvalid);
        assert_eq!(failure.params, vec!["OpaqueRef:s".to_string()]);
    }

    #[test]
    fn garbage_is_a_bad_response() {
        assert!(matches!(decode_response("<xml/>"), Err(Error::BadServerResponse(_))));
        assert!(matches!(decode_response(r#"{"id":1}"#), Err(Error::BadServerResponse(_))));
    }
}
