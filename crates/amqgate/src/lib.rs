//! Top-level facade crate for amqgate.
//!
//! Re-exports the core types and the router policy library so an AMQP engine
//! can depend on a single crate.

pub mod core {
    pub use amqgate_core::*;
}

pub mod router {
    pub use amqgate_router::*;
}
