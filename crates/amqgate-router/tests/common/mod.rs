//! In-memory AMQP endpoints and a scripted rule provider.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use amqgate_core::error::{AmqGateError, Result};
use amqgate_core::protocol::{
    ConnectionEndpoint, Endpoint, ErrorCondition, LinkEndpoint, SessionEndpoint, Terminus,
};
use amqgate_router::config::PolicyConfig;
use amqgate_router::context::ConnectionRecord;
use amqgate_router::gate::PolicyEngine;
use amqgate_router::policy::{RuleProvider, Settings, UserLookup};

#[derive(Debug, Default)]
pub struct MockConnection {
    pub hostname: Option<String>,
    pub condition: Option<ErrorCondition>,
    pub closed: bool,
    pub opened: usize,
    pub locally_open: bool,
    pub max_frame: Option<u32>,
    pub channel_max: Option<u16>,
}

impl MockConnection {
    pub fn for_app(app: &str) -> Self {
        Self {
            hostname: Some(app.to_string()),
            ..Self::default()
        }
    }
}

impl Endpoint for MockConnection {
    fn set_condition(&mut self, condition: ErrorCondition) {
        self.condition = Some(condition);
    }
    fn close(&mut self) {
        self.closed = true;
    }
}

impl ConnectionEndpoint for MockConnection {
    fn remote_hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
    fn set_max_frame(&mut self, size: u32) {
        self.max_frame = Some(size);
    }
    fn set_channel_max(&mut self, channel_max: u16) {
        self.channel_max = Some(channel_max);
    }
    fn is_locally_open(&self) -> bool {
        self.locally_open
    }
    fn open(&mut self) {
        self.opened += 1;
        self.locally_open = true;
    }
}

#[derive(Debug, Default)]
pub struct MockSession {
    pub condition: Option<ErrorCondition>,
    pub closed: bool,
    pub capacity: Option<usize>,
}

impl Endpoint for MockSession {
    fn set_condition(&mut self, condition: ErrorCondition) {
        self.condition = Some(condition);
    }
    fn close(&mut self) {
        self.closed = true;
    }
}

impl SessionEndpoint for MockSession {
    fn set_incoming_capacity(&mut self, bytes: usize) {
        self.capacity = Some(bytes);
    }
}

#[derive(Debug, Default)]
pub struct MockLink {
    pub source: Option<Terminus>,
    pub target: Option<Terminus>,
    pub condition: Option<ErrorCondition>,
    pub closed: bool,
}

impl MockLink {
    pub fn sender_to(target: &str) -> Self {
        Self {
            target: Some(Terminus::with_address(target)),
            ..Self::default()
        }
    }

    pub fn anonymous_sender() -> Self {
        Self {
            target: Some(Terminus::default()),
            ..Self::default()
        }
    }

    pub fn receiver_from(source: &str) -> Self {
        Self {
            source: Some(Terminus::with_address(source)),
            ..Self::default()
        }
    }

    pub fn dynamic_receiver() -> Self {
        Self {
            source: Some(Terminus::dynamic()),
            ..Self::default()
        }
    }
}

impl Endpoint for MockLink {
    fn set_condition(&mut self, condition: ErrorCondition) {
        self.condition = Some(condition);
    }
    fn close(&mut self) {
        self.closed = true;
    }
}

impl LinkEndpoint for MockLink {
    fn remote_source(&self) -> Option<&Terminus> {
        self.source.as_ref()
    }
    fn remote_target(&self) -> Option<&Terminus> {
        self.target.as_ref()
    }
}

/// Rule provider answering from fixed data and recording every call.
#[derive(Default)]
pub struct StubProvider {
    pub name: Option<String>,
    pub settings: Option<Settings>,
    pub fail_lookup: bool,
    pub fail_close: bool,
    pub user_calls: AtomicUsize,
    pub settings_calls: AtomicUsize,
    pub seen_apps: Mutex<Vec<String>>,
    pub closed: Mutex<Vec<u64>>,
}

impl StubProvider {
    pub fn allowing(name: &str, settings: Settings) -> Self {
        Self {
            name: Some(name.to_string()),
            settings: Some(settings),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst) + self.settings_calls.load(Ordering::SeqCst)
    }
}

impl RuleProvider for StubProvider {
    fn lookup_user(&self, req: &UserLookup<'_>) -> Result<Option<String>> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_apps.lock().unwrap().push(req.app.to_string());
        if self.fail_lookup {
            return Err(AmqGateError::Provider("unreachable".into()));
        }
        Ok(self.name.clone())
    }

    fn lookup_settings(&self, app: &str, _settings_name: &str) -> Result<Option<Settings>> {
        self.settings_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_apps.lock().unwrap().push(app.to_string());
        Ok(self.settings.clone())
    }

    fn notify_closed(&self, conn_id: u64) -> Result<()> {
        self.closed.lock().unwrap().push(conn_id);
        if self.fail_close {
            return Err(AmqGateError::Provider("gone".into()));
        }
        Ok(())
    }
}

pub fn access_rules(max_connections: u64) -> PolicyConfig {
    PolicyConfig {
        max_connection_limit: max_connections,
        policy_folder: None,
        enable_access_rules: true,
    }
}

pub fn no_access_rules(max_connections: u64) -> PolicyConfig {
    PolicyConfig {
        max_connection_limit: max_connections,
        policy_folder: None,
        enable_access_rules: false,
    }
}

pub fn engine(config: PolicyConfig, provider: Arc<StubProvider>) -> PolicyEngine {
    PolicyEngine::new(config, provider)
}

pub fn record(id: u64, user: &str) -> ConnectionRecord {
    ConnectionRecord::new(id, "10.0.0.1", format!("10.0.0.1:{}", 5000 + id)).with_user(user)
}

/// A record that has passed Open with `settings` attached.
pub fn opened_record(user: &str, settings: Settings) -> ConnectionRecord {
    let provider = Arc::new(StubProvider::allowing("group", settings));
    let engine = engine(access_rules(0), provider);
    let mut rec = record(1, user);
    let mut conn = MockConnection::for_app("app");
    engine.amqp_open(&mut conn, &mut rec);
    assert!(rec.settings().is_some(), "open must attach settings");
    rec
}
