//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by
//! `RUST_LOG`. Module paths are hidden; events carry the method name, class or
//! object reference as structured fields instead.
//!
//! ## What Gets Logged
//!
//! - **Dispatch**: every call at `debug` with its method and argument count,
//!   server failures at `warn` with their error code.
//! - **Sessions**: login, logout and the API version check at `info`.
//! - **Simulator**: startup and shutdown at `info`, each request at `debug`,
//!   object creation and power state changes at `info`.
//!
//! ```bash
//! # Sessions and simulator lifecycle only
//! RUST_LOG=info cargo run
//!
//! # Every call on the wire
//! RUST_LOG=debug cargo run
//!
//! # Client side only
//! RUST_LOG=xenapi::connection=debug,xenapi::framework=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a single asynchronous start looks like this:
//!
//! ```text
//! DEBUG call: Sending request method="Async.VM.start" args=4
//! DEBUG Request method=Async.VM.start args=4
//!  INFO Power state changed vm=OpaqueRef:6f1c... op="start" state=Running
//! DEBUG Task finished task=OpaqueRef:a20b... method="VM.start"
//! ```

/// Installs the global subscriber. Call once, at the start of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
