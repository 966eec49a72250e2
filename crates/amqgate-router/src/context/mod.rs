//! Per-connection state shared between the gates.
//!
//! A `ConnectionRecord` is owned by the task driving its connection and is
//! handed to the gates by `&mut`; nothing in it is shared across threads
//! except the `Arc`'d denial counters inside its settings.

pub mod connection;

pub use connection::ConnectionRecord;
