//! janus core: transport-agnostic protocol primitives for the Janus gateway
//! client and admin/monitor APIs.
//!
//! This crate owns the wire contracts (envelope, typed messages, plugin
//! payloads, request builders), the discriminator registries and the decoder
//! that turns raw frames into typed values. It carries no runtime or
//! transport dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed frames surface as `JanusError` values, never as crashes.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod decoder;
pub mod error;
pub mod plugins;
pub mod protocol;
pub mod registry;
pub mod request;
pub mod resolver;

/// Shared result type.
pub use error::{ErrorCode, JanusError, Result};

pub use decoder::{Decoded, Decoder};
pub use registry::{MessageKind, Registry, RegistryBuilder};
pub use resolver::NestedOutcome;
