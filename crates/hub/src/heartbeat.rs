use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::HEARTBEAT_TEXT;
use crate::connection::Connection;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle of a [`HeartbeatMonitor`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatState {
    Idle,
    Running,
    Stopped,
}

impl HeartbeatState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            IDLE => Self::Idle,
            RUNNING => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Periodic keep-alive for one connection.
///
/// Runs as a lightweight tokio task; many monitors share the runtime's
/// worker threads while each keeps its own cadence. The first heartbeat is
/// sent immediately on start. A failed heartbeat closes the connection,
/// which lets the owning session de-register it.
pub struct HeartbeatMonitor {
    connection: Arc<Connection>,
    interval: Duration,
    state: Arc<AtomicU8>,
    /// Child of the connection's close token.
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatMonitor {
    pub fn new(connection: Arc<Connection>, interval: Duration) -> Self {
        let cancel = connection.close_token().child_token();
        Self {
            connection,
            interval,
            state: Arc::new(AtomicU8::new(IDLE)),
            cancel,
            task: None,
        }
    }

    pub fn state(&self) -> HeartbeatState {
        HeartbeatState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Move from `Idle` to `Running`. Any other state is left unchanged.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let connection = Arc::clone(&self.connection);
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let period = self.interval;

        self.task = Some(tokio::spawn(async move {
            run(connection, period, cancel).await;
            state.store(STOPPED, Ordering::Release);
        }));
    }

    /// Stop ticking. Idempotent.
    pub fn stop(&mut self) {
        let previous = self.state.swap(STOPPED, Ordering::AcqRel);
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if previous == RUNNING {
            tracing::debug!(
                user_id = %self.connection.user_id(),
                conn_id = %self.connection.id(),
                "Heartbeat stopped"
            );
        }
    }
}

impl Drop for HeartbeatMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(connection: Arc<Connection>, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if !connection.is_open() {
                    tracing::debug!(
                        user_id = %connection.user_id(),
                        conn_id = %connection.id(),
                        "Connection no longer open, ending heartbeat"
                    );
                    connection.close();
                    break;
                }
                if let Err(e) = connection.send(HEARTBEAT_TEXT) {
                    tracing::warn!(
                        user_id = %connection.user_id(),
                        conn_id = %connection.id(),
                        error = %e,
                        "Heartbeat send failed"
                    );
                    connection.close();
                    break;
                }
                tracing::trace!(user_id = %connection.user_id(), "Heartbeat sent");
            }
        }
    }
}
