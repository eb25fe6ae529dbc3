//! Top-level facade crate for the Janus client.
//!
//! Re-exports the protocol core and the client runtime so users can depend on a single crate.

pub mod core {
    pub use janus_core::*;
}

pub mod client {
    pub use janus_client::*;
}
