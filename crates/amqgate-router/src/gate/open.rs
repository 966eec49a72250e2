//! AMQP Open admission.
//!
//! With access rules enabled, the connection's user/host/application are
//! resolved to a settings name and then to concrete `Settings`. Any miss or
//! provider failure denies: the Open is answered with
//! `amqp:resource-limit-exceeded` and the connection is closed.

use amqgate_core::protocol::{ConnectionEndpoint, Denial};

use crate::context::ConnectionRecord;
use crate::policy::{normalize_app, Settings, UserLookup};

use super::PolicyEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDecision {
    Allow,
    Deny,
}

/// Notified after every allowed Open (connection manager, management agent).
pub trait ConnectionObserver: Send + Sync {
    fn connection_opened(&self, conn: &ConnectionRecord);
}

impl PolicyEngine {
    pub fn amqp_open<C>(&self, conn: &mut C, record: &mut ConnectionRecord) -> OpenDecision
    where
        C: ConnectionEndpoint + ?Sized,
    {
        let app = normalize_app(conn.remote_hostname().unwrap_or_default()).to_string();
        record.set_remote_app(app);

        if self.config.load().enable_access_rules {
            let Some(settings) = self.resolve_settings(record) else {
                conn.deny(Denial::Connection.condition());
                return OpenDecision::Deny;
            };
            if settings.max_frame_size > 0 {
                conn.set_max_frame(settings.max_frame_size);
            }
            if let Some(channel_max) = settings.channel_max() {
                conn.set_channel_max(channel_max);
            }
            record.attach_settings(settings);
        }

        if !conn.is_locally_open() {
            conn.open();
        }
        for observer in &self.observers {
            observer.connection_opened(record);
        }
        OpenDecision::Allow
    }

    fn resolve_settings(&self, record: &ConnectionRecord) -> Option<Settings> {
        let req = UserLookup {
            user_id: record.user_id(),
            host_ip: record.host_ip(),
            app: record.remote_app(),
            conn_name: record.connection_name(),
            conn_id: record.connection_id(),
        };

        let provider = self.provider();
        let name = match provider.lookup_user(&req) {
            Ok(Some(name)) if !name.is_empty() => name,
            Ok(_) => {
                tracing::debug!(
                    user = %req.user_id,
                    host_ip = %req.host_ip,
                    app = %req.app,
                    conn = %req.conn_name,
                    "Open denied: no settings for user"
                );
                return None;
            }
            Err(e) => {
                tracing::debug!(user = %req.user_id, error = %e, "Open denied: lookup_user failed");
                return None;
            }
        };

        match provider.lookup_settings(req.app, &name) {
            Ok(Some(settings)) => {
                tracing::debug!(
                    user = %req.user_id,
                    host_ip = %req.host_ip,
                    app = %req.app,
                    conn = %req.conn_name,
                    settings = %name,
                    "Open allowed"
                );
                Some(settings)
            }
            Ok(None) => {
                tracing::debug!(app = %req.app, settings = %name, "Open denied: settings not found");
                None
            }
            Err(e) => {
                tracing::debug!(settings = %name, error = %e, "Open denied: lookup_settings failed");
                None
            }
        }
    }
}
