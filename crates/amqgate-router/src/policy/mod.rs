//! Policy layer (rule sources and resolved settings).
//!
//! The gates never read rule files directly; they ask a [`RuleProvider`] and
//! treat any failure as a denial.

pub mod provider;
pub mod ruleset;
pub mod settings;

pub use provider::{normalize_app, RuleProvider, RuleProviderMut, SerializedProvider, UserLookup};
pub use ruleset::{RulesetConfig, RulesetProvider};
pub use settings::{Settings, SettingsConfig, DEFAULT_SESSION_WINDOW};
