//! # XenAPI Bindings
//!
//! > **Typed, async client bindings for the XenAPI management protocol.**
//!
//! Every remote class (VM, host, SR, ...) gets a kind marker with one async
//! function per remote operation, a record struct with every field decoded
//! into its Rust type, and typed references that cannot be mixed up between
//! classes. Calls go through a [`Connection`], the explicit context value
//! pairing a transport with the session obtained at login.
//!
//! ## Design Notes
//!
//! ### One Schema Per Class
//! Each class is declared once, as a table of fields (wire key, type,
//! mutability) and operations (arguments, result, declared failures). The
//! macros in [`framework`] expand that table into the call surface. Adding a
//! field is one line.
//!
//! ### Typed References
//! [`Ref<Vm>`](framework::Ref) and [`Ref<Host>`](framework::Ref) are different
//! types over the same opaque string, so passing a host where a VM is expected
//! does not compile.
//!
//! ### Failures Are Values
//! A server error arrives as [`Failure`](framework::Failure): a typed
//! [`FailureKind`](framework::FailureKind), the original code and its
//! positional parameters. Codes this crate does not know map to
//! `FailureKind::Unrecognized` with the code kept. Each operation also
//! publishes the kinds it is declared to raise as a constant
//! (`Vm::START_FAILURES`).
//!
//! ### Synchronous and Async Forms
//! Long-running operations come in two forms. `Vm::start` waits for the
//! result; `Vm::async_start` returns a [`Ref<Task>`](model::Task) right away,
//! to be polled with [`Task::wait`](model::Task::wait).
//!
//! ## Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Wire values, the codec, references, errors and the transport contract.
//! - **Key items**: [`Value`](framework::Value), [`Ref`](framework::Ref),
//!   [`Error`](framework::Error), [`Transport`](framework::Transport).
//!
//! ### 2. The Session ([`connection`])
//! Login, logout and the API version check.
//! - **Key items**: [`Connection`], [`Connection::check_api_version`].
//!
//! ### 3. The Call Surface ([`model`])
//! One module per remote class, plus the enumerations their fields use.
//! - **Key items**: [`Vm`](model::Vm), [`VmRecord`](model::VmRecord),
//!   [`Task`](model::Task).
//!
//! ### 4. The Simulator ([`sim`])
//! An in-memory pool that speaks the wire contract, used by the tests and
//! the demo.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! Logging setup, client configuration and a background simulator.
//!
//! ## Quick Start
//!
//! ```ignore
//! use xenapi::lifecycle::LocalPool;
//! use xenapi::model::Vm;
//! use xenapi::sim::SimConfig;
//! use xenapi::Connection;
//!
//! let pool = LocalPool::start(SimConfig::default());
//! let conn = Connection::login_with_password(pool.transport(), "root", "xenroot", "1.0", "docs").await?;
//! for (vm, record) in Vm::get_all_records(&conn).await? {
//!     println!("{vm}: {} ({})", record.name_label, record.power_state);
//! }
//! conn.logout().await?;
//! pool.shutdown().await?;
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

#[macro_use]
pub mod framework;

pub mod connection;
pub mod lifecycle;
pub mod model;
pub mod sim;

pub use connection::Connection;
