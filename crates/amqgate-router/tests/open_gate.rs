#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use amqgate_core::protocol::RESOURCE_LIMIT_EXCEEDED;
use amqgate_router::context::ConnectionRecord;
use amqgate_router::gate::{ConnectionObserver, OpenDecision};
use amqgate_router::policy::Settings;

use common::{access_rules, engine, no_access_rules, record, MockConnection, StubProvider};

#[derive(Default)]
struct CountingObserver {
    opened: AtomicUsize,
}

impl ConnectionObserver for CountingObserver {
    fn connection_opened(&self, _conn: &ConnectionRecord) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }
}

fn assert_denied(conn: &MockConnection) {
    let cond = conn.condition.expect("condition must be set");
    assert_eq!(cond.name, RESOURCE_LIMIT_EXCEEDED);
    assert_eq!(cond.description, "connection disallowed by local policy");
    assert!(conn.closed);
    assert_eq!(conn.opened, 0);
}

#[test]
fn access_rules_disabled_allows_without_lookup() {
    let provider = Arc::new(StubProvider::default());
    let observer = Arc::new(CountingObserver::default());
    let e = engine(no_access_rules(0), provider.clone()).with_observer(observer.clone());

    let mut conn = MockConnection::for_app("photoserver");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Allow);

    assert!(rec.settings().is_none());
    assert_eq!(provider.calls(), 0);
    assert_eq!(conn.opened, 1);
    assert!(conn.condition.is_none());
    assert_eq!(observer.opened.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_user_is_denied() {
    let provider = Arc::new(StubProvider::default());
    let observer = Arc::new(CountingObserver::default());
    let e = engine(access_rules(0), provider.clone()).with_observer(observer.clone());

    let mut conn = MockConnection::for_app("photoserver");
    let mut rec = record(1, "mallory");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Deny);

    assert_denied(&conn);
    assert!(rec.settings().is_none());
    assert_eq!(provider.settings_calls.load(Ordering::SeqCst), 0);
    assert_eq!(observer.opened.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_settings_name_is_denied() {
    let provider = Arc::new(StubProvider {
        name: Some(String::new()),
        settings: Some(Settings::default()),
        ..StubProvider::default()
    });
    let e = engine(access_rules(0), provider.clone());

    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Deny);
    assert_denied(&conn);
    assert_eq!(provider.settings_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn missing_settings_are_denied() {
    let provider = Arc::new(StubProvider {
        name: Some("admins".into()),
        settings: None,
        ..StubProvider::default()
    });
    let e = engine(access_rules(0), provider);

    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Deny);
    assert_denied(&conn);
    assert!(rec.settings().is_none());
}

#[test]
fn provider_failure_fails_closed() {
    let provider = Arc::new(StubProvider {
        fail_lookup: true,
        ..StubProvider::allowing("admins", Settings::default())
    });
    let e = engine(access_rules(0), provider);

    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Deny);
    assert_denied(&conn);
}

#[test]
fn allowed_open_applies_transport_limits() {
    let settings = Settings {
        max_frame_size: 16_384,
        max_sessions: 5,
        ..Settings::default()
    };
    let provider = Arc::new(StubProvider::allowing("admins", settings));
    let observer = Arc::new(CountingObserver::default());
    let e = engine(access_rules(0), provider).with_observer(observer.clone());

    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Allow);

    assert_eq!(conn.max_frame, Some(16_384));
    assert_eq!(conn.channel_max, Some(4));
    assert_eq!(conn.opened, 1);
    assert!(!conn.closed);
    assert_eq!(rec.settings().unwrap().max_sessions, 5);
    assert_eq!(observer.opened.load(Ordering::SeqCst), 1);
}

#[test]
fn zero_limits_leave_transport_defaults() {
    let provider = Arc::new(StubProvider::allowing("admins", Settings::default()));
    let e = engine(access_rules(0), provider);

    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Allow);
    assert_eq!(conn.max_frame, None);
    assert_eq!(conn.channel_max, None);
}

#[test]
fn huge_session_limit_saturates_channel_max() {
    let settings = Settings {
        max_sessions: 1_000_000,
        ..Settings::default()
    };
    let e = engine(access_rules(0), Arc::new(StubProvider::allowing("g", settings)));
    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    e.amqp_open(&mut conn, &mut rec);
    assert_eq!(conn.channel_max, Some(u16::MAX));
}

#[test]
fn already_open_connection_is_not_reopened() {
    let e = engine(no_access_rules(0), Arc::new(StubProvider::default()));
    let mut conn = MockConnection {
        locally_open: true,
        ..MockConnection::for_app("app")
    };
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Allow);
    assert_eq!(conn.opened, 0);
}

#[test]
fn application_port_is_stripped_before_lookup() {
    let provider = Arc::new(StubProvider::allowing("admins", Settings::default()));
    let e = engine(access_rules(0), provider.clone());

    let mut conn = MockConnection::for_app("photoserver:5672");
    let mut rec = record(1, "alice");
    e.amqp_open(&mut conn, &mut rec);

    assert_eq!(rec.remote_app(), "photoserver");
    let seen = provider.seen_apps.lock().unwrap().clone();
    assert_eq!(seen, vec!["photoserver".to_string(), "photoserver".to_string()]);
}

#[test]
fn denied_open_does_not_touch_socket_counters() {
    let e = engine(access_rules(5), Arc::new(StubProvider::default()));
    assert!(e.socket_accept("peer"));

    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Deny);

    let s = e.stats().snapshot();
    assert_eq!(s.connections_current, 1);
    assert_eq!(s.connections_denied, 0);
}

#[test]
fn external_provider_survives_enabling_access_rules() {
    let provider = Arc::new(StubProvider::allowing("admins", Settings::default()));
    let e = engine(no_access_rules(0), provider.clone());

    e.reconfigure(access_rules(0)).unwrap();
    let mut conn = MockConnection::for_app("app");
    let mut rec = record(1, "alice");
    assert_eq!(e.amqp_open(&mut conn, &mut rec), OpenDecision::Allow);
    assert_eq!(provider.calls(), 2);
    assert!(rec.settings().is_some());
}
