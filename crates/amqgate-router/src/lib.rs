//! amqgate router library entry.
//!
//! This crate wires configuration, rule sources, the admission gates, and
//! statistics exposition into the policy layer an AMQP router embeds. It is
//! consumed by the binary (`main.rs`), by AMQP engines, and by integration
//! tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod gate;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod transport;
