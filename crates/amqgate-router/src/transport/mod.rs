//! Transport layer (TCP accept).
//!
//! Applies the socket-level connection gate before any AMQP byte is read.

pub mod accept;

pub use accept::{serve, AdmittedConnection, ConnectionHandler};
