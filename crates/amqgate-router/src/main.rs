//! amqgate policy service.
//!
//! - Loads and validates the policy config (and rulesets when access rules
//!   are on)
//! - Serves statistics on the ops endpoint
//! - SIGHUP reloads the `policy:` section (and the rulesets when the
//!   access-rule settings change); counters are kept

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use amqgate_router::gate::PolicyEngine;
use amqgate_router::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "amqgate.yaml".to_string())
        .into();
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.ops.listen.parse()?;

    let state = app_state::AppState::new(cfg)?;
    spawn_reload(path, state.engine());
    let app = router::build_router(state);

    tracing::info!(%listen, "amqgate ops endpoint starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(unix)]
fn spawn_reload(path: PathBuf, engine: Arc<PolicyEngine>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "SIGHUP handler unavailable; reload disabled");
                return;
            }
        };
        while hup.recv().await.is_some() {
            // A bad file keeps the running config.
            let reloaded = config::load_from_file(&path)
                .and_then(|c| c.policy_config())
                .and_then(|policy| engine.reconfigure(policy));
            if let Err(e) = reloaded {
                tracing::warn!(error = %e, "policy reload rejected");
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_reload(_path: PathBuf, _engine: Arc<PolicyEngine>) {}
