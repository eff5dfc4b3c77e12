//! Background session sweeper.
//!
//! Periodically deletes idle and stale inactive sessions.

use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

use super::session::{SessionManager, SessionPolicy};
use crate::db::Database;

/// Default sweep interval in seconds (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Session sweeper.
///
/// Runs [`SessionManager::sweep_expired`] at a fixed interval. Failures are
/// logged and the loop keeps going.
pub struct SessionSweeper {
    db: Database,
    policy: SessionPolicy,
    sweep_interval: Duration,
}

impl SessionSweeper {
    /// Create a sweeper with the default interval.
    pub fn new(db: Database, policy: SessionPolicy) -> Self {
        Self {
            db,
            policy,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    /// Create a sweeper with a custom interval.
    pub fn with_interval(db: Database, policy: SessionPolicy, interval_secs: u64) -> Self {
        Self {
            db,
            policy,
            sweep_interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Run the sweep loop forever.
    pub async fn run(&self) {
        info!(
            "Session sweeper started (interval: {} seconds)",
            self.sweep_interval.as_secs()
        );

        let mut timer = interval(self.sweep_interval);

        loop {
            timer.tick().await;
            self.sweep_once().await;
        }
    }

    /// Run a single sweep. Returns the number of deleted sessions, or 0 on
    /// failure.
    pub async fn sweep_once(&self) -> u64 {
        let manager = SessionManager::new(self.db.pool()).with_policy(self.policy);
        match manager.sweep_expired().await {
            Ok(0) => {
                debug!("Session sweep: nothing to delete");
                0
            }
            Ok(deleted) => {
                info!(deleted = deleted, "Session sweep deleted expired sessions");
                deleted
            }
            Err(e) => {
                error!("Session sweep failed: {}", e);
                0
            }
        }
    }
}

/// Spawn the sweeper as a background task.
pub fn start_session_sweeper(
    db: Database,
    policy: SessionPolicy,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    let sweeper = SessionSweeper::with_interval(db, policy, interval_secs);
    tokio::spawn(async move {
        sweeper.run().await;
    })
}
