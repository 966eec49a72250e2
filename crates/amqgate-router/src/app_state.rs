//! Shared application state for the amqgate ops service.

use std::sync::Arc;

use amqgate_core::error::Result;

use crate::config::AmqGateConfig;
use crate::gate::PolicyEngine;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AmqGateConfig,
    engine: Arc<PolicyEngine>,
}

impl AppState {
    /// Build application state from a validated config.
    /// Returns Result so main can report bad rulesets instead of panicking.
    pub fn new(cfg: AmqGateConfig) -> Result<Self> {
        let engine = PolicyEngine::load(cfg.policy_config()?)?;
        Ok(Self::with_engine(cfg, Arc::new(engine)))
    }

    pub fn with_engine(cfg: AmqGateConfig, engine: Arc<PolicyEngine>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, engine }),
        }
    }

    pub fn cfg(&self) -> &AmqGateConfig {
        &self.inner.cfg
    }

    pub fn engine(&self) -> Arc<PolicyEngine> {
        Arc::clone(&self.inner.engine)
    }
}
