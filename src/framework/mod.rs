//! Generic machinery shared by every remote class.
//!
//! This module provides the building blocks the typed call surface is made of:
//! the wire value model, the codec, typed references, the error taxonomy and the
//! transport contract.
//!
//! # Main Components
//!
//! - [`Value`] - The wire value model
//! - [`FromValue`] / [`ToValue`] - Conversion between Rust types and wire values
//! - [`Ref`] - Typed opaque reference to a remote object
//! - [`Record`] - Full field snapshot of a remote object
//! - [`Transport`] - The single dispatch entry point a server connection provides
//! - [`Error`] / [`Failure`] - Error types
//!
//! # Testing
//!
//! See the [`mock`] module for utilities to test calls without a server.

#[macro_use]
mod macros;

pub mod codec;
pub mod error;
pub mod failure;
pub mod jsonrpc;
pub mod mock;
pub mod reference;
pub mod transport;
pub mod value;
pub mod version;

pub use codec::{FromValue, MapKey, Record, ToValue};
pub use error::{Error, Result};
pub use failure::{Failure, FailureKind};
pub use reference::{Class, Ref, NULL_REF};
pub use transport::{invoke, Transport, ASYNC_PREFIX};
pub use value::{Value, WIRE_DATE_FORMAT};
pub use version::ApiVersion;
