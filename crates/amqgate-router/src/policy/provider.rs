//! Boundary to the external rule source.
//!
//! A `RuleProvider` maps (user, host, application) to a settings name and a
//! settings name to concrete `Settings`. Every error it returns is treated
//! by the gates exactly like an explicit denial.

use std::sync::Mutex;

use amqgate_core::error::{AmqGateError, Result};

use crate::obs::DenialSnapshot;

use super::settings::Settings;

/// Identity and context of a connection asking to be opened.
#[derive(Debug, Clone, Copy)]
pub struct UserLookup<'a> {
    pub user_id: &'a str,
    pub host_ip: &'a str,
    /// Already normalized with [`normalize_app`].
    pub app: &'a str,
    pub conn_name: &'a str,
    pub conn_id: u64,
}

/// Thread-safe rule source. Calls are synchronous and may block.
pub trait RuleProvider: Send + Sync {
    /// `Ok(None)` or an empty name denies the connection.
    fn lookup_user(&self, req: &UserLookup<'_>) -> Result<Option<String>>;

    /// `Ok(None)` denies the connection.
    fn lookup_settings(&self, app: &str, settings_name: &str) -> Result<Option<Settings>>;

    /// Release whatever the provider tracks for `conn_id`.
    fn notify_closed(&self, conn_id: u64) -> Result<()>;

    /// Denial tallies per settings name, for management readout.
    fn denial_snapshots(&self) -> Vec<(String, DenialSnapshot)> {
        Vec::new()
    }
}

/// Rule source that can only be driven from one thread at a time
/// (an embedded interpreter, a single connection to a policy daemon).
pub trait RuleProviderMut: Send {
    fn lookup_user(&mut self, req: &UserLookup<'_>) -> Result<Option<String>>;
    fn lookup_settings(&mut self, app: &str, settings_name: &str) -> Result<Option<Settings>>;
    fn notify_closed(&mut self, conn_id: u64) -> Result<()>;
    fn denial_snapshots(&mut self) -> Vec<(String, DenialSnapshot)> {
        Vec::new()
    }
}

/// Serializes every call into a `RuleProviderMut` behind one global lock.
///
/// All connections contend on this lock for the duration of each lookup.
pub struct SerializedProvider<P> {
    inner: Mutex<P>,
}

impl<P: RuleProviderMut> SerializedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut P) -> Result<T>) -> Result<T> {
        // Poisoned lock means a provider call panicked; deny instead of panic.
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| AmqGateError::Provider("rule provider lock poisoned".into()))?;
        f(&mut guard)
    }
}

impl<P: RuleProviderMut> RuleProvider for SerializedProvider<P> {
    fn lookup_user(&self, req: &UserLookup<'_>) -> Result<Option<String>> {
        self.with(|p| p.lookup_user(req))
    }

    fn lookup_settings(&self, app: &str, settings_name: &str) -> Result<Option<Settings>> {
        self.with(|p| p.lookup_settings(app, settings_name))
    }

    fn notify_closed(&self, conn_id: u64) -> Result<()> {
        self.with(|p| p.notify_closed(conn_id))
    }

    fn denial_snapshots(&self) -> Vec<(String, DenialSnapshot)> {
        self.with(|p| Ok(p.denial_snapshots())).unwrap_or_default()
    }
}

/// Strip a `:port` suffix some clients put in the Open hostname.
pub fn normalize_app(app: &str) -> &str {
    match app.split_once(':') {
        Some((host, _)) => host,
        None => app,
    }
}
