//! Resolved per-connection limits.

use std::sync::Arc;

use serde::Deserialize;

use amqgate_core::pattern::AllowList;

use crate::obs::{DenialCounts, DenialKind};

/// Session window applied when no policy (or a zero window) is in force.
pub const DEFAULT_SESSION_WINDOW: usize = 1_000_000;

/// Limits and address patterns resolved once at Open time.
/// Every numeric limit uses 0 for "unlimited".
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub max_frame_size: u32,
    pub max_message_size: u64,
    pub max_session_window: u32,
    pub max_sessions: u32,
    pub max_senders: u32,
    pub max_receivers: u32,
    pub allow_anonymous_sender: bool,
    pub allow_dynamic_src: bool,
    pub sources: AllowList,
    pub targets: AllowList,
    /// Shared with every connection resolved to the same settings name.
    pub denial_counts: Arc<DenialCounts>,
}

impl Settings {
    pub fn from_config(cfg: &SettingsConfig, denial_counts: Arc<DenialCounts>) -> Self {
        Self {
            max_frame_size: cfg.max_frame_size,
            max_message_size: cfg.max_message_size,
            max_session_window: cfg.max_session_window,
            max_sessions: cfg.max_sessions,
            max_senders: cfg.max_senders,
            max_receivers: cfg.max_receivers,
            allow_anonymous_sender: cfg.allow_anonymous_sender,
            allow_dynamic_src: cfg.allow_dynamic_src,
            sources: AllowList::parse(&cfg.sources),
            targets: AllowList::parse(&cfg.targets),
            denial_counts,
        }
    }

    pub fn count_denial(&self, kind: DenialKind) {
        self.denial_counts.inc(kind);
    }

    /// Highest channel number to advertise, if sessions are capped.
    pub fn channel_max(&self) -> Option<u16> {
        if self.max_sessions == 0 {
            return None;
        }
        Some(u16::try_from(self.max_sessions - 1).unwrap_or(u16::MAX))
    }

    pub fn session_window(&self) -> usize {
        match self.max_session_window {
            0 => DEFAULT_SESSION_WINDOW,
            w => w as usize,
        }
    }
}

/// Settings as written in a ruleset file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SettingsConfig {
    #[serde(default)]
    pub max_frame_size: u32,
    #[serde(default)]
    pub max_message_size: u64,
    #[serde(default)]
    pub max_session_window: u32,
    #[serde(default)]
    pub max_sessions: u32,
    #[serde(default)]
    pub max_senders: u32,
    #[serde(default)]
    pub max_receivers: u32,
    #[serde(default)]
    pub allow_anonymous_sender: bool,
    #[serde(default)]
    pub allow_dynamic_src: bool,
    #[serde(default)]
    pub sources: String,
    #[serde(default)]
    pub targets: String,
}
