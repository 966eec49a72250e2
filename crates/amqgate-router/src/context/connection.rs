use crate::policy::Settings;

/// One live connection, from socket accept to socket close.
#[derive(Debug)]
pub struct ConnectionRecord {
    connection_id: u64,
    host_ip: String,
    connection_name: String,
    user_id: String,
    /// Open hostname, normalized. Set when the Open arrives.
    remote_app: String,
    n_sessions: u32,
    n_senders: u32,
    n_receivers: u32,
    /// Present only when access rules are on and the Open was allowed.
    settings: Option<Settings>,
}

impl ConnectionRecord {
    pub fn new(
        connection_id: u64,
        host_ip: impl Into<String>,
        connection_name: impl Into<String>,
    ) -> Self {
        Self {
            connection_id,
            host_ip: host_ip.into(),
            connection_name: connection_name.into(),
            user_id: String::new(),
            remote_app: String::new(),
            n_sessions: 0,
            n_senders: 0,
            n_receivers: 0,
            settings: None,
        }
    }

    /// Builder-style identity, as established by authentication.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn set_user(&mut self, user_id: impl Into<String>) {
        self.user_id = user_id.into();
    }

    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }
    pub fn host_ip(&self) -> &str {
        &self.host_ip
    }
    pub fn connection_name(&self) -> &str {
        &self.connection_name
    }
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
    pub fn remote_app(&self) -> &str {
        &self.remote_app
    }
    pub fn n_sessions(&self) -> u32 {
        self.n_sessions
    }
    pub fn n_senders(&self) -> u32 {
        self.n_senders
    }
    pub fn n_receivers(&self) -> u32 {
        self.n_receivers
    }
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub(crate) fn set_remote_app(&mut self, app: impl Into<String>) {
        self.remote_app = app.into();
    }

    pub(crate) fn attach_settings(&mut self, settings: Settings) {
        self.settings = Some(settings);
    }

    // Live counts, driven by the engine after a gate approves (or the peer
    // ends) a session or link.

    pub fn session_begun(&mut self) {
        self.n_sessions = self.n_sessions.saturating_add(1);
    }
    pub fn session_ended(&mut self) {
        self.n_sessions = self.n_sessions.saturating_sub(1);
    }
    pub fn sender_attached(&mut self) {
        self.n_senders = self.n_senders.saturating_add(1);
    }
    pub fn sender_detached(&mut self) {
        self.n_senders = self.n_senders.saturating_sub(1);
    }
    pub fn receiver_attached(&mut self) {
        self.n_receivers = self.n_receivers.saturating_add(1);
    }
    pub fn receiver_detached(&mut self) {
        self.n_receivers = self.n_receivers.saturating_sub(1);
    }
}
