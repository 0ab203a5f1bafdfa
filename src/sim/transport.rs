use crate::framework::{Error, Result, Transport, Value};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// One call queued for the simulator, answered with a response structure.
#[derive(Debug)]
pub struct SimRequest {
    pub method: String,
    pub params: Vec<Value>,
    pub respond_to: oneshot::Sender<Value>,
}

/// Transport into a running [`SimServer`](super::SimServer).
///
/// Cheap to clone. The simulator stops once every clone is dropped.
#[derive(Debug, Clone)]
pub struct SimTransport {
    sender: mpsc::Sender<SimRequest>,
}

impl SimTransport {
    pub(crate) fn new(sender: mpsc::Sender<SimRequest>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn dispatch(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let (respond_to, response) = oneshot::channel();
        let request = SimRequest {
            method: method.to_string(),
            params,
            respond_to,
        };
        self.sender
            .send(request)
            .await
            .map_err(|_| Error::transport("simulator stopped"))?;
        response
            .await
            .map_err(|_| Error::transport("simulator dropped the request"))
    }
}
