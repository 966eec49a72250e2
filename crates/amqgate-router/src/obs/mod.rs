//! Admission statistics and their exposition.
//!
//! Counters are plain atomics owned by the policy engine (global) and by the
//! rule provider (per settings group). `metrics` renders a snapshot in the
//! Prometheus text format for the `/metrics` handler.

pub mod metrics;
pub mod stats;

pub use stats::{
    Admission, ConnectionSnapshot, ConnectionStats, DenialCounts, DenialKind, DenialSnapshot,
};
