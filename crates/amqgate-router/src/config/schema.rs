use std::path::PathBuf;

use serde::Deserialize;
use amqgate_core::error::{AmqGateError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmqGateConfig {
    pub version: u32,

    #[serde(default)]
    pub ops: OpsSection,

    #[serde(default)]
    pub policy: PolicySection,
}

impl AmqGateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AmqGateError::Config(format!(
                "unsupported config version {} (expected 1)",
                self.version
            )));
        }
        self.ops.validate()?;
        self.policy.validate()?;
        Ok(())
    }

    /// Validated policy settings. Call after `validate`.
    pub fn policy_config(&self) -> Result<PolicyConfig> {
        PolicyConfig::try_from(&self.policy)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for OpsSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl OpsSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<std::net::SocketAddr>().map_err(|e| {
            AmqGateError::Config(format!("ops.listen must be a socket address: {e}"))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8081".into()
}

/// Raw `policy:` section as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PolicySection {
    /// Global cap on open sockets; 0 = unlimited.
    #[serde(default)]
    pub maximum_connections: i64,

    /// Folder of ruleset files consulted when access rules are enabled.
    #[serde(default)]
    pub policy_folder: Option<String>,

    #[serde(default)]
    pub enable_access_rules: bool,
}

impl PolicySection {
    pub fn validate(&self) -> Result<()> {
        if self.maximum_connections < 0 {
            return Err(AmqGateError::Config(
                "maximumConnections must be >= 0".into(),
            ));
        }
        if let Some(folder) = &self.policy_folder {
            if folder.trim().is_empty() {
                return Err(AmqGateError::Config(
                    "policyFolder must not be blank".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Validated policy configuration. Immutable; reconfiguration swaps it whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    /// 0 = unlimited.
    pub max_connection_limit: u64,
    pub policy_folder: Option<PathBuf>,
    pub enable_access_rules: bool,
}

impl TryFrom<&PolicySection> for PolicyConfig {
    type Error = AmqGateError;

    fn try_from(section: &PolicySection) -> Result<Self> {
        section.validate()?;
        Ok(Self {
            max_connection_limit: section.maximum_connections as u64,
            policy_folder: section.policy_folder.as_ref().map(PathBuf::from),
            enable_access_rules: section.enable_access_rules,
        })
    }
}
