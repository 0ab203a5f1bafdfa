//! Runtime setup around the client.
//!
//! This module holds what a program needs besides the bindings themselves:
//!
//! - **Logging**: [`setup_tracing`] installs the subscriber
//! - **Configuration**: [`ClientConfig`] carries credentials, read from the environment
//! - **Local pool**: [`LocalPool`] starts and stops an in-memory simulator
//!
//! # Main Components
//!
//! - [`LocalPool`] - Owns a running simulator and hands out transports into it
//! - [`ClientConfig`] - Login settings with environment overrides
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod config;
pub mod local_pool;
pub mod tracing;

pub use config::ClientConfig;
pub use local_pool::LocalPool;
pub use self::tracing::setup_tracing;
