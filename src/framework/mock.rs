//! # Mock Framework
//!
//! Utilities for testing the call surface without a server.
//!
//! Use [`create_mock_transport`] to get a transport and a receiver, then pull
//! calls off the receiver with [`expect_call`] and answer them by hand. For
//! scripted conversations, [`MockServer`] queues expectations and answers them
//! in order.

use crate::connection::Connection;
use crate::framework::error::{Error, Result};
use crate::framework::reference::Ref;
use crate::framework::transport::Transport;
use crate::framework::value::Value;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// One call as seen by the mock side.
#[derive(Debug)]
pub struct DispatchRequest {
    pub method: String,
    pub params: Vec<Value>,
    pub respond_to: oneshot::Sender<Result<Value>>,
}

/// A transport that forwards every call over a channel.
#[derive(Debug, Clone)]
pub struct MockTransport {
    sender: mpsc::Sender<DispatchRequest>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn dispatch(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(DispatchRequest {
                method: method.to_string(),
                params,
                respond_to,
            })
            .await
            .map_err(|_| Error::transport("mock receiver dropped"))?;
        response
            .await
            .map_err(|_| Error::transport("mock dropped the request without answering"))?
    }
}

/// Creates a mock transport and the receiver its calls arrive on.
pub fn create_mock_transport(buffer_size: usize) -> (MockTransport, mpsc::Receiver<DispatchRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (MockTransport { sender }, receiver)
}

/// Waits for the next call.
pub async fn expect_call(receiver: &mut mpsc::Receiver<DispatchRequest>) -> Option<DispatchRequest> {
    receiver.recv().await
}

/// A `Status: Success` response carrying `value`.
pub fn success(value: impl Into<Value>) -> Value {
    crate::wire_struct! { "Status" => "Success", "Value" => value.into() }
}

/// A `Status: Failure` response with the given code and parameters.
pub fn failure(code: &str, params: &[&str]) -> Value {
    let description: Vec<Value> = std::iter::once(code)
        .chain(params.iter().copied())
        .map(Value::from)
        .collect();
    crate::wire_struct! { "Status" => "Failure", "ErrorDescription" => description }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

struct Expectation {
    method: String,
    response: Result<Value>,
}

/// A call the mock server received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Vec<Value>,
}

/// A scripted server answering queued expectations in order.
///
/// # Example
/// ```ignore
/// let mut server = MockServer::new();
/// server.expect("VM.get_all").return_value(vec![Value::from("OpaqueRef:vm")]);
///
/// let conn = server.connection("OpaqueRef:session");
/// let vms = Vm::get_all(&conn).await?;
/// server.verify();
/// ```
pub struct MockServer {
    transport: MockTransport,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    /// Creates a server with no expectations. Must be called inside a tokio
    /// runtime.
    pub fn new() -> Self {
        let (transport, mut receiver) = create_mock_transport(100);
        let expectations: Arc<Mutex<VecDeque<Expectation>>> = Arc::new(Mutex::new(VecDeque::new()));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pending = expectations.clone();
        let recorded = calls.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                recorded
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(RecordedCall {
                        method: request.method.clone(),
                        params: request.params.clone(),
                    });

                let next = pending.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                let response = match next {
                    Some(expectation) if expectation.method == request.method => expectation.response,
                    Some(expectation) => Err(Error::transport(format!(
                        "unexpected call `{}`, expected `{}`",
                        request.method, expectation.method
                    ))),
                    None => Err(Error::transport(format!(
                        "unexpected call `{}`, no expectations left",
                        request.method
                    ))),
                };
                let _ = request.respond_to.send(response);
            }
        });

        Self {
            transport,
            expectations,
            calls,
            _handle: handle,
        }
    }

    pub fn transport(&self) -> MockTransport {
        self.transport.clone()
    }

    /// A connection over this server using `session` as its session reference.
    pub fn connection(&self, session: &str) -> Connection {
        Connection::new(Arc::new(self.transport()), Ref::new(session))
    }

    /// Expects a call to `method`.
    pub fn expect(&mut self, method: &str) -> ExpectationBuilder {
        ExpectationBuilder {
            method: method.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Panics if any expectation is still pending.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap_or_else(|e| e.into_inner());
        if !remaining.is_empty() {
            let methods: Vec<&str> = remaining.iter().map(|e| e.method.as_str()).collect();
            panic!("Not all expectations were met. Remaining: {methods:?}");
        }
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one expectation.
pub struct ExpectationBuilder {
    method: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ExpectationBuilder {
    /// Answers with a success carrying `value`.
    pub fn return_value(self, value: impl Into<Value>) {
        self.return_response(success(value));
    }

    /// Answers with a server failure.
    pub fn return_failure(self, code: &str, params: &[&str]) {
        self.return_response(failure(code, params));
    }

    /// Answers with a raw response structure, well-formed or not.
    pub fn return_response(self, response: Value) {
        self.push(Ok(response));
    }

    /// Fails the call at the transport level.
    pub fn return_err(self, error: Error) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Value>) {
        self.expectations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Expectation {
                method: self.method,
                response,
            });
    }
}
