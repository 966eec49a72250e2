//! Socket accept loop.
//!
//! Responsibilities:
//! - Accept TCP sockets and count them against `maximumConnections`
//! - Drop refused sockets immediately (no AMQP channel exists yet)
//! - Hand admitted sockets to the AMQP engine with a `ConnectionRecord`
//! - Release the connection slot when the engine is done with the socket

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Duration};

use crate::context::ConnectionRecord;
use crate::gate::PolicyEngine;

/// The AMQP engine side of an admitted socket.
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    /// Drive the connection until it ends. Open/Begin/Attach gates are
    /// reached through `conn.engine()` and `conn.record_mut()`.
    async fn handle(&self, stream: TcpStream, conn: &mut AdmittedConnection);
}

/// A socket that passed the connection gate.
/// Dropping it runs `socket_close`, so the slot is released on every path.
pub struct AdmittedConnection {
    engine: Arc<PolicyEngine>,
    record: ConnectionRecord,
}

impl AdmittedConnection {
    pub fn new(engine: Arc<PolicyEngine>, record: ConnectionRecord) -> Self {
        Self { engine, record }
    }

    pub fn engine(&self) -> &Arc<PolicyEngine> {
        &self.engine
    }

    pub fn record(&self) -> &ConnectionRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut ConnectionRecord {
        &mut self.record
    }
}

impl Drop for AdmittedConnection {
    fn drop(&mut self) {
        // Underflow is already logged by socket_close.
        let _ = self.engine.socket_close(&self.record);
    }
}

/// Accept forever, spawning one task per admitted socket.
pub async fn serve(
    listener: TcpListener,
    engine: Arc<PolicyEngine>,
    handler: Arc<dyn ConnectionHandler>,
) {
    let next_id = AtomicU64::new(1);
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                // EMFILE and friends: back off instead of spinning.
                tracing::warn!(error = %e, "accept failed");
                sleep(Duration::from_millis(50)).await;
                continue;
            }
        };

        let name = peer.to_string();
        if !engine.socket_accept(&name) {
            drop(stream);
            continue;
        }

        let id = next_id.fetch_add(1, Ordering::Relaxed);
        let record = ConnectionRecord::new(id, peer.ip().to_string(), name);
        let mut conn = AdmittedConnection::new(Arc::clone(&engine), record);
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            handler.handle(stream, &mut conn).await;
        });
    }
}
