//! Prometheus text rendering of admission statistics.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use super::stats::{ConnectionSnapshot, DenialKind, DenialSnapshot};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Point-in-time copy of every counter the policy layer maintains.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(flatten)]
    pub connections: ConnectionSnapshot,
    /// Keyed by settings name.
    pub settings: BTreeMap<String, DenialSnapshot>,
}

impl StatsSnapshot {
    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let c = &self.connections;

        let _ = writeln!(out, "# TYPE amqgate_connections_processed_total counter");
        let _ = writeln!(out, "amqgate_connections_processed_total {}", c.connections_processed);
        let _ = writeln!(out, "# TYPE amqgate_connections_denied_total counter");
        let _ = writeln!(out, "amqgate_connections_denied_total {}", c.connections_denied);
        let _ = writeln!(out, "# TYPE amqgate_connections_current gauge");
        let _ = writeln!(out, "amqgate_connections_current {}", c.connections_current);

        let _ = writeln!(out, "# TYPE amqgate_policy_denials_total counter");
        for (name, snap) in &self.settings {
            let settings = escape_label(name);
            for kind in DenialKind::ALL {
                let _ = writeln!(
                    out,
                    "amqgate_policy_denials_total{{kind=\"{}\",settings=\"{}\"}} {}",
                    kind.as_str(),
                    settings,
                    snap.get(kind)
                );
            }
        }
        out
    }
}
