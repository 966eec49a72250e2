//! File-backed rule source.
//!
//! One YAML ruleset per application (the Open hostname). A ruleset maps users
//! to named settings groups and caps how many connections the application,
//! each user, and each remote host may hold at once. Connections that pass
//! `lookup_user` are tracked by connection id until `notify_closed`.
//!
//! ```yaml
//! application: "photoserver"
//! maxConnections: 10
//! maxConnectionsPerUser: 2
//! defaultSettings: "guests"
//! groups:
//!   admins:
//!     users: ["alice", "bob"]
//!     settings: { maxSessions: 4, sources: "*", targets: "${user}/*" }
//!   guests:
//!     settings: { sources: "public.*" }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;

use amqgate_core::error::{AmqGateError, Result};

use crate::obs::{DenialCounts, DenialSnapshot};

use super::provider::{RuleProvider, UserLookup};
use super::settings::{Settings, SettingsConfig};

/// Ruleset used when no ruleset names the requested application.
pub const DEFAULT_APPLICATION: &str = "$default";
/// Group member entry matching every user.
pub const ANY_USER: &str = "*";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RulesetConfig {
    pub application: String,
    /// 0 = unlimited.
    #[serde(default)]
    pub max_connections: u32,
    #[serde(default)]
    pub max_connections_per_user: u32,
    #[serde(default)]
    pub max_connections_per_host: u32,
    /// Group for users not listed in any group.
    #[serde(default)]
    pub default_settings: Option<String>,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub settings: SettingsConfig,
}

impl RulesetConfig {
    pub fn from_yaml(s: &str) -> Result<Self> {
        let cfg: RulesetConfig = serde_yaml::from_str(s)
            .map_err(|e| AmqGateError::Config(format!("invalid ruleset yaml: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.application.trim().is_empty() {
            return Err(AmqGateError::Config("ruleset application must not be empty".into()));
        }
        if let Some(default) = &self.default_settings {
            if !self.groups.contains_key(default) {
                return Err(AmqGateError::Config(format!(
                    "ruleset {}: defaultSettings '{default}' is not a group",
                    self.application
                )));
            }
        }
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (group, g) in &self.groups {
            if group.is_empty() {
                return Err(AmqGateError::Config(format!(
                    "ruleset {}: group names must not be empty",
                    self.application
                )));
            }
            for user in &g.users {
                if let Some(prev) = seen.insert(user.as_str(), group.as_str()) {
                    return Err(AmqGateError::Config(format!(
                        "ruleset {}: user '{user}' is in both '{prev}' and '{group}'",
                        self.application
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Compiled ruleset.
#[derive(Debug)]
struct Ruleset {
    cfg: RulesetConfig,
    members: HashMap<String, String>,
    any_user: Option<String>,
    settings: HashMap<String, Settings>,
}

impl Ruleset {
    fn compile(cfg: RulesetConfig) -> Self {
        let mut members = HashMap::new();
        let mut any_user = None;
        let mut settings = HashMap::new();
        for (group, g) in &cfg.groups {
            for user in &g.users {
                if user == ANY_USER {
                    any_user = Some(group.clone());
                } else {
                    members.insert(user.clone(), group.clone());
                }
            }
            let counts = Arc::new(DenialCounts::new());
            settings.insert(group.clone(), Settings::from_config(&g.settings, counts));
        }
        Self {
            cfg,
            members,
            any_user,
            settings,
        }
    }

    fn group_for(&self, user: &str) -> Option<&str> {
        self.members
            .get(user)
            .or(self.any_user.as_ref())
            .or(self.cfg.default_settings.as_ref())
            .map(String::as_str)
    }

    /// Usage counters this connection occupies, with their caps.
    fn usage_keys(&self, req: &UserLookup<'_>) -> Vec<(UsageKey, u32)> {
        let app = &self.cfg.application;
        let candidates = [
            (UsageKey::App(app.clone()), self.cfg.max_connections),
            (
                UsageKey::User(app.clone(), req.user_id.to_string()),
                self.cfg.max_connections_per_user,
            ),
            (
                UsageKey::Host(app.clone(), req.host_ip.to_string()),
                self.cfg.max_connections_per_host,
            ),
        ];
        candidates.into_iter().filter(|(_, cap)| *cap > 0).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum UsageKey {
    App(String),
    User(String, String),
    Host(String, String),
}

/// `RuleProvider` backed by compiled rulesets.
#[derive(Debug)]
pub struct RulesetProvider {
    rulesets: HashMap<String, Ruleset>,
    tracked: DashMap<u64, Vec<UsageKey>>,
    usage: DashMap<UsageKey, u32>,
}

impl RulesetProvider {
    pub fn new(configs: Vec<RulesetConfig>) -> Result<Self> {
        let mut rulesets = HashMap::with_capacity(configs.len());
        for cfg in configs {
            cfg.validate()?;
            let app = cfg.application.clone();
            if rulesets.insert(app.clone(), Ruleset::compile(cfg)).is_some() {
                return Err(AmqGateError::Config(format!(
                    "duplicate ruleset for application '{app}'"
                )));
            }
        }
        Ok(Self {
            rulesets,
            tracked: DashMap::new(),
            usage: DashMap::new(),
        })
    }

    /// Provider with no rulesets: every lookup denies.
    pub fn empty() -> Self {
        Self {
            rulesets: HashMap::new(),
            tracked: DashMap::new(),
            usage: DashMap::new(),
        }
    }

    /// Load every `*.yaml` / `*.yml` file in `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| {
            AmqGateError::Config(format!("read policy folder {} failed: {e}", dir.display()))
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| matches!(p.extension().and_then(|x| x.to_str()), Some("yaml" | "yml")))
            .collect();
        files.sort();

        let mut configs = Vec::with_capacity(files.len());
        for path in &files {
            let s = fs::read_to_string(path).map_err(|e| {
                AmqGateError::Config(format!("read ruleset {} failed: {e}", path.display()))
            })?;
            let cfg = RulesetConfig::from_yaml(&s)
                .map_err(|e| AmqGateError::Config(format!("{}: {e}", path.display())))?;
            configs.push(cfg);
        }

        let provider = Self::new(configs)?;
        tracing::info!(
            folder = %dir.display(),
            rulesets = provider.rulesets.len(),
            "policy rulesets loaded"
        );
        Ok(provider)
    }

    pub fn applications(&self) -> Vec<&str> {
        let mut apps: Vec<&str> = self.rulesets.keys().map(String::as_str).collect();
        apps.sort_unstable();
        apps
    }

    /// Number of connections currently holding usage slots.
    pub fn tracked_connections(&self) -> usize {
        self.tracked.len()
    }

    fn ruleset(&self, app: &str) -> Option<&Ruleset> {
        self.rulesets
            .get(app)
            .or_else(|| self.rulesets.get(DEFAULT_APPLICATION))
    }

    /// Take one slot on every key, or none of them.
    fn reserve(&self, keys: &[(UsageKey, u32)]) -> std::result::Result<(), UsageKey> {
        let mut taken: Vec<&UsageKey> = Vec::with_capacity(keys.len());
        for (key, cap) in keys {
            let mut n = self.usage.entry(key.clone()).or_insert(0);
            if *n >= *cap {
                drop(n);
                for k in taken {
                    self.release_key(k);
                }
                return Err(key.clone());
            }
            *n += 1;
            taken.push(key);
        }
        Ok(())
    }

    fn release_key(&self, key: &UsageKey) {
        if let Some(mut n) = self.usage.get_mut(key) {
            *n = n.saturating_sub(1);
        }
        self.usage.remove_if(key, |_, n| *n == 0);
    }

    fn release(&self, conn_id: u64) -> bool {
        match self.tracked.remove(&conn_id) {
            Some((_, keys)) => {
                for key in &keys {
                    self.release_key(key);
                }
                true
            }
            None => false,
        }
    }
}

impl RuleProvider for RulesetProvider {
    fn lookup_user(&self, req: &UserLookup<'_>) -> Result<Option<String>> {
        let Some(rs) = self.ruleset(req.app) else {
            tracing::debug!(app = %req.app, user = %req.user_id, "no ruleset for application");
            return Ok(None);
        };
        let Some(group) = rs.group_for(req.user_id) else {
            tracing::debug!(app = %req.app, user = %req.user_id, "user not in any group");
            return Ok(None);
        };

        // A repeated Open on the same connection must not hold two slots.
        self.release(req.conn_id);

        let keys = rs.usage_keys(req);
        if let Err(key) = self.reserve(&keys) {
            tracing::debug!(
                app = %req.app,
                user = %req.user_id,
                host_ip = %req.host_ip,
                limit = ?key,
                "connection limit reached"
            );
            return Ok(None);
        }
        if !keys.is_empty() {
            self.tracked
                .insert(req.conn_id, keys.into_iter().map(|(k, _)| k).collect());
        }
        Ok(Some(group.to_string()))
    }

    fn lookup_settings(&self, app: &str, settings_name: &str) -> Result<Option<Settings>> {
        Ok(self
            .ruleset(app)
            .and_then(|rs| rs.settings.get(settings_name))
            .cloned())
    }

    fn notify_closed(&self, conn_id: u64) -> Result<()> {
        if self.release(conn_id) {
            tracing::trace!(conn_id, "released connection usage");
        }
        Ok(())
    }

    fn denial_snapshots(&self) -> Vec<(String, DenialSnapshot)> {
        let mut out: Vec<(String, DenialSnapshot)> = self
            .rulesets
            .iter()
            .flat_map(|(app, rs)| {
                rs.settings
                    .iter()
                    .map(move |(group, s)| (format!("{app}/{group}"), s.denial_counts.snapshot()))
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
