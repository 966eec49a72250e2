//! Admission gates.
//!
//! - `connection`: socket accept/close against the global connection cap.
//! - `open`: AMQP Open, resolves per-connection settings through the rule
//!   provider.
//! - `session`: AMQP Begin, session cap and incoming window.
//! - `link`: AMQP Attach, sender/receiver caps and address allow-lists.
//!
//! Connection and Open gates need process-wide state and live on
//! [`PolicyEngine`]. Session and link gates only read the connection's own
//! settings and are free functions.

pub mod connection;
pub mod link;
pub mod open;
pub mod session;

use std::sync::Arc;

use arc_swap::ArcSwap;

use amqgate_core::error::Result;

use crate::config::PolicyConfig;
use crate::obs::metrics::StatsSnapshot;
use crate::obs::ConnectionStats;
use crate::policy::{RuleProvider, RulesetProvider};

pub use link::{approve_receiver, approve_sender};
pub use open::{ConnectionObserver, OpenDecision};
pub use session::{apply_session_settings, approve_session};

/// Process-wide admission state: current config, global counters, rule source.
/// Construct once at startup, then share via Arc.
pub struct PolicyEngine {
    config: ArcSwap<PolicyConfig>,
    stats: ConnectionStats,
    provider: ArcSwap<Arc<dyn RuleProvider>>,
    /// Provider is built from `policyFolder` and follows reloads.
    folder_provider: bool,
    observers: Vec<Arc<dyn ConnectionObserver>>,
}

impl PolicyEngine {
    /// Engine over an externally supplied rule source. The provider is kept
    /// across `reconfigure`.
    pub fn new(config: PolicyConfig, provider: Arc<dyn RuleProvider>) -> Self {
        log_config(&config);
        Self {
            config: ArcSwap::from_pointee(config),
            stats: ConnectionStats::new(),
            provider: ArcSwap::from_pointee(provider),
            folder_provider: false,
            observers: Vec::new(),
        }
    }

    /// Build an engine whose rule source is the configured policy folder.
    /// Without access rules (or without a folder) no ruleset is loaded.
    pub fn load(config: PolicyConfig) -> Result<Self> {
        let provider = folder_provider(&config)?;
        let mut engine = Self::new(config, Arc::new(provider));
        engine.folder_provider = true;
        Ok(engine)
    }

    /// Downstream collaborator told about every allowed Open.
    pub fn with_observer(mut self, observer: Arc<dyn ConnectionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> Arc<PolicyConfig> {
        self.config.load_full()
    }

    /// Replace the configuration wholesale. Statistics are kept.
    ///
    /// For a folder-backed engine, a change to `enableAccessRules` or
    /// `policyFolder` reloads the rulesets first. If that fails nothing is
    /// applied and the running config stays in force.
    pub fn reconfigure(&self, config: PolicyConfig) -> Result<()> {
        let rules_changed = {
            let current = self.config.load();
            current.enable_access_rules != config.enable_access_rules
                || current.policy_folder != config.policy_folder
        };
        if rules_changed && self.folder_provider {
            let provider: Arc<dyn RuleProvider> = Arc::new(folder_provider(&config)?);
            self.provider.store(Arc::new(provider));
        }
        log_config(&config);
        self.config.store(Arc::new(config));
        Ok(())
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Rule source currently in force.
    pub fn provider(&self) -> Arc<dyn RuleProvider> {
        Arc::clone(&*self.provider.load_full())
    }

    /// Global counters plus every per-settings denial tally.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connections: self.stats.snapshot(),
            settings: self.provider().denial_snapshots().into_iter().collect(),
        }
    }
}

fn folder_provider(config: &PolicyConfig) -> Result<RulesetProvider> {
    match (&config.policy_folder, config.enable_access_rules) {
        (Some(folder), true) => RulesetProvider::load_dir(folder),
        (None, true) => {
            tracing::warn!("access rules enabled without policyFolder; every Open will be denied");
            Ok(RulesetProvider::empty())
        }
        _ => Ok(RulesetProvider::empty()),
    }
}

fn log_config(config: &PolicyConfig) {
    tracing::info!(
        maximum_connections = config.max_connection_limit,
        policy_folder = ?config.policy_folder,
        access_rules = config.enable_access_rules,
        "policy configured"
    );
}
