//! Admission statistics.
//!
//! `ConnectionStats` is process-wide and survives reconfiguration. The limit
//! check and the increment of `current` happen in one compare-and-swap so
//! concurrent accepts can never overshoot the cap.
//!
//! `DenialCounts` is shared (via `Arc`) by every connection resolved to the
//! same named settings and lives as long as the rule provider keeps it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use amqgate_core::error::{AmqGateError, Result};

#[derive(Debug, Default)]
pub struct ConnectionStats {
    processed: AtomicU64,
    denied: AtomicU64,
    current: AtomicU64,
}

/// Outcome of a socket-level admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Admitted; carries the new number of open connections.
    Admitted(u64),
    /// Refused; carries the number of open connections at the time.
    Refused(u64),
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one accept attempt against `limit` (0 = unlimited).
    pub fn admit(&self, limit: u64) -> Admission {
        self.processed.fetch_add(1, Ordering::Relaxed);
        let res = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                if limit == 0 || n < limit {
                    Some(n + 1)
                } else {
                    None
                }
            });
        match res {
            Ok(prev) => Admission::Admitted(prev + 1),
            Err(n) => {
                self.denied.fetch_add(1, Ordering::Relaxed);
                Admission::Refused(n)
            }
        }
    }

    /// Release one admitted connection. Returns the remaining count.
    /// Refuses to go below zero; that is an accounting bug in the caller.
    pub fn release(&self) -> Result<u64> {
        self.current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|prev| prev - 1)
            .map_err(|_| {
                AmqGateError::Internal("connection released with no connections open".into())
            })
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn denied(&self) -> u64 {
        self.denied.load(Ordering::Relaxed)
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        // denied is read first so processed >= denied holds in the snapshot.
        let denied = self.denied();
        ConnectionSnapshot {
            connections_processed: self.processed(),
            connections_denied: denied,
            connections_current: self.current(),
        }
    }
}

/// Management view of the global counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSnapshot {
    pub connections_processed: u64,
    pub connections_denied: u64,
    pub connections_current: u64,
}

/// The seven per-settings denial tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialKind {
    Session,
    Sender,
    Receiver,
    DynamicSrc,
    AnonymousSender,
    LinkSource,
    LinkTarget,
}

impl DenialKind {
    pub const ALL: [DenialKind; 7] = [
        DenialKind::Session,
        DenialKind::Sender,
        DenialKind::Receiver,
        DenialKind::DynamicSrc,
        DenialKind::AnonymousSender,
        DenialKind::LinkSource,
        DenialKind::LinkTarget,
    ];

    /// Management attribute name.
    pub fn as_str(self) -> &'static str {
        match self {
            DenialKind::Session => "sessionDenied",
            DenialKind::Sender => "senderDenied",
            DenialKind::Receiver => "receiverDenied",
            DenialKind::DynamicSrc => "dynamicSrcDenied",
            DenialKind::AnonymousSender => "anonymousSenderDenied",
            DenialKind::LinkSource => "linkSourceDenied",
            DenialKind::LinkTarget => "linkTargetDenied",
        }
    }
}

#[derive(Debug, Default)]
pub struct DenialCounts {
    session: AtomicU64,
    sender: AtomicU64,
    receiver: AtomicU64,
    dynamic_src: AtomicU64,
    anonymous_sender: AtomicU64,
    link_source: AtomicU64,
    link_target: AtomicU64,
}

impl DenialCounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: DenialKind) -> &AtomicU64 {
        match kind {
            DenialKind::Session => &self.session,
            DenialKind::Sender => &self.sender,
            DenialKind::Receiver => &self.receiver,
            DenialKind::DynamicSrc => &self.dynamic_src,
            DenialKind::AnonymousSender => &self.anonymous_sender,
            DenialKind::LinkSource => &self.link_source,
            DenialKind::LinkTarget => &self.link_target,
        }
    }

    pub fn inc(&self, kind: DenialKind) {
        self.counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, kind: DenialKind) -> u64 {
        self.counter(kind).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> DenialSnapshot {
        DenialSnapshot {
            session_denied: self.get(DenialKind::Session),
            sender_denied: self.get(DenialKind::Sender),
            receiver_denied: self.get(DenialKind::Receiver),
            dynamic_src_denied: self.get(DenialKind::DynamicSrc),
            anonymous_sender_denied: self.get(DenialKind::AnonymousSender),
            link_source_denied: self.get(DenialKind::LinkSource),
            link_target_denied: self.get(DenialKind::LinkTarget),
        }
    }
}

/// Management view of one settings group's denial tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialSnapshot {
    pub session_denied: u64,
    pub sender_denied: u64,
    pub receiver_denied: u64,
    pub dynamic_src_denied: u64,
    pub anonymous_sender_denied: u64,
    pub link_source_denied: u64,
    pub link_target_denied: u64,
}

impl DenialSnapshot {
    pub fn get(&self, kind: DenialKind) -> u64 {
        match kind {
            DenialKind::Session => self.session_denied,
            DenialKind::Sender => self.sender_denied,
            DenialKind::Receiver => self.receiver_denied,
            DenialKind::DynamicSrc => self.dynamic_src_denied,
            DenialKind::AnonymousSender => self.anonymous_sender_denied,
            DenialKind::LinkSource => self.link_source_denied,
            DenialKind::LinkTarget => self.link_target_denied,
        }
    }
}
