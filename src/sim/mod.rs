//! # In-Memory Pool
//!
//! A single-host pool that speaks the wire contract, for tests and demos.
//!
//! [`SimServer`] is an actor: one tokio task owns the object tables and
//! answers requests from an mpsc channel one at a time, replying through a
//! oneshot channel. [`SimTransport`] is the sending half and implements
//! [`Transport`](crate::framework::Transport), so a
//! [`Connection`](crate::Connection) cannot tell it from a real server.
//!
//! ## What It Understands
//!
//! - `session.login_with_password`, `slave_local_login_with_password`, logout
//!   and password changes. Every other call needs a live session.
//! - For every class: `get_all`, `get_all_records`, `get_record`,
//!   `get_by_uuid`, `get_by_name_label`, `create`, `destroy` and the field
//!   accessors `get_*`, `set_*`, `add_to_*`, `remove_from_*`, `add_*`,
//!   `remove_*`.
//! - VM power operations, `snapshot`, `checkpoint`, `clone`, `copy` and
//!   `revert`.
//! - `plug` and `unplug` for VBDs, VIFs, PBDs and PIFs.
//! - `task.create`, `task.cancel`, messages and `SR.create`.
//! - The `Async.` form of any of the above, which runs the call and records
//!   its outcome in a finished task.
//!
//! Field mutability is not enforced.
//!
//! ## Example
//!
//! ```ignore
//! let (server, transport) = SimServer::new(32, SimConfig::default());
//! let handle = tokio::spawn(server.run());
//!
//! let conn = Connection::login_with_password(Arc::new(transport), "root", "xenroot", "1.0", "demo").await?;
//! let vms = Vm::get_all(&conn).await?;
//!
//! conn.logout().await?;
//! handle.await?;
//! ```

mod config;
mod server;
mod store;
mod transport;

pub use config::SimConfig;
pub use server::SimServer;
pub use transport::{SimRequest, SimTransport};
