use crate::framework::Transport;
use crate::sim::{SimConfig, SimServer, SimTransport};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

const REQUEST_BUFFER: usize = 64;

/// A simulated pool running in the background of the current runtime.
///
/// # Example
///
/// ```ignore
/// let pool = LocalPool::start(SimConfig::default());
/// let conn = Connection::login_with_password(pool.transport(), "root", "xenroot", "1.0", "demo").await?;
/// // ...
/// conn.logout().await?;
/// pool.shutdown().await?;
/// ```
pub struct LocalPool {
    transport: SimTransport,
    handle: JoinHandle<()>,
}

impl LocalPool {
    /// Spawns the simulator on the current tokio runtime.
    pub fn start(config: SimConfig) -> Self {
        let (server, transport) = SimServer::new(REQUEST_BUFFER, config);
        let handle = tokio::spawn(server.run());
        Self { transport, handle }
    }

    /// A transport into the pool, ready to hand to
    /// [`Connection::login_with_password`](crate::Connection::login_with_password).
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::new(self.transport.clone())
    }

    /// Stops the simulator once every outstanding transport is dropped.
    ///
    /// Connections still holding a transport keep it alive, so drop them (or
    /// log out) first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down local pool...");
        drop(self.transport);

        if let Err(e) = self.handle.await {
            error!("Simulator task failed: {:?}", e);
            return Err(format!("Simulator task failed: {:?}", e));
        }

        info!("Local pool shutdown complete.");
        Ok(())
    }
}
