//! amqgate core: transport-agnostic admission primitives, error types, and
//! the AMQP endpoint boundary.
//!
//! This crate defines the contracts shared by the router-side gates and any
//! AMQP engine that embeds them: denial conditions, terminus descriptors,
//! endpoint traits, and the address allow-list matcher. It carries no runtime
//! dependencies so engines can implement the traits without pulling in the
//! router stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `AmqGateError`/`Result` so a bad rule
//! or hostile peer can cost at most one denied connection.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod pattern;
pub mod protocol;

/// Shared result type.
pub use error::{AmqGateError, Result};
