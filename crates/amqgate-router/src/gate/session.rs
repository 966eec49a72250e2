//! AMQP Begin admission.

use amqgate_core::protocol::{Denial, SessionEndpoint};

use crate::context::ConnectionRecord;
use crate::obs::DenialKind;
use crate::policy::{Settings, DEFAULT_SESSION_WINDOW};

/// Refuse the Begin once the connection already holds `maxSessions`.
/// Connections without settings are not limited.
pub fn approve_session<S>(session: &mut S, record: &ConnectionRecord) -> bool
where
    S: SessionEndpoint + ?Sized,
{
    let Some(settings) = record.settings() else {
        return true;
    };
    if settings.max_sessions > 0 && record.n_sessions() >= settings.max_sessions {
        session.deny(Denial::Session.condition());
        settings.count_denial(DenialKind::Session);
        tracing::debug!(
            user = %record.user_id(),
            host_ip = %record.host_ip(),
            app = %record.remote_app(),
            sessions = record.n_sessions(),
            "Begin denied due to session limit"
        );
        return false;
    }
    true
}

/// Set the session's incoming window from `maxSessionWindow`.
pub fn apply_session_settings<S>(session: &mut S, record: &ConnectionRecord)
where
    S: SessionEndpoint + ?Sized,
{
    let window = record
        .settings()
        .map_or(DEFAULT_SESSION_WINDOW, Settings::session_window);
    session.set_incoming_capacity(window);
}
