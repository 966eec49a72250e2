//! Socket-level admission. No identity is known yet and there is no AMQP
//! channel to carry a condition, so decisions are plain yes/no.

use amqgate_core::error::Result;

use crate::context::ConnectionRecord;
use crate::obs::Admission;

use super::PolicyEngine;

impl PolicyEngine {
    /// Count an accepted socket against `maximumConnections`.
    pub fn socket_accept(&self, hostname: &str) -> bool {
        let limit = self.config.load().max_connection_limit;
        match self.stats.admit(limit) {
            Admission::Admitted(n) => {
                if limit > 0 {
                    tracing::debug!(host = %hostname, current = n, "connection allowed");
                }
                true
            }
            Admission::Refused(n) => {
                tracing::debug!(host = %hostname, current = n, limit, "connection denied");
                false
            }
        }
    }

    /// Release a socket admitted by `socket_accept`.
    ///
    /// Errors only if the close was never matched by an accept; the
    /// counter is left at zero in that case.
    pub fn socket_close(&self, conn: &ConnectionRecord) -> Result<()> {
        let cfg = self.config.load();
        let released = self.stats.release();
        if let Err(e) = &released {
            tracing::error!(
                conn = %conn.connection_name(),
                conn_id = conn.connection_id(),
                error = %e,
                "connection count underflow"
            );
        }

        if cfg.enable_access_rules {
            if let Err(e) = self.provider().notify_closed(conn.connection_id()) {
                tracing::debug!(
                    conn_id = conn.connection_id(),
                    error = %e,
                    "rule provider close notification failed"
                );
            }
        }

        let remaining = released?;
        if cfg.max_connection_limit > 0 {
            tracing::debug!(
                conn = %conn.connection_name(),
                sessions = conn.n_sessions(),
                senders = conn.n_senders(),
                receivers = conn.n_receivers(),
                total = remaining,
                "connection closed"
            );
        }
        Ok(())
    }
}
