//! Periodic refresh driver for hosts that poll the query service
//!
//! The query service itself is synchronous and stateless. This module runs it
//! on a timer (plus manual triggers) inside a tokio runtime and delivers each
//! result over a channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::services::{UsageQueryService, UsageSnapshot};
use crate::types::Result;

/// Default polling interval (5 minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Scheduled,
    Manual,
}

/// One completed refresh.
#[derive(Debug)]
pub struct RefreshReport {
    pub trigger: RefreshTrigger,
    pub result: Result<UsageSnapshot>,
}

/// Control side of a running scheduler.
#[derive(Debug)]
pub struct RefreshHandle {
    trigger_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Request an immediate refresh.
    ///
    /// Returns `false` when a manual refresh is already pending (the request
    /// is coalesced into it) or the scheduler has stopped.
    pub fn refresh_now(&self) -> bool {
        match self.trigger_tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                debug!("manual refresh already pending");
                false
            }
            Err(TrySendError::Closed(())) => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the scheduler, waiting for an in-flight refresh to finish.
    pub async fn shutdown(self) {
        drop(self.trigger_tx);
        if let Err(e) = self.task.await {
            error!(error = %e, "refresh task ended abnormally");
        }
    }
}

/// Spawns the refresh loop.
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Start refreshing `days` of history every `interval`, beginning immediately.
    ///
    /// Must be called from within a tokio runtime. The loop ends when the
    /// handle is shut down or the returned receiver is dropped.
    pub fn spawn(
        service: Arc<UsageQueryService>,
        interval: Duration,
        days: usize,
    ) -> (RefreshHandle, mpsc::Receiver<RefreshReport>) {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
        let (report_tx, report_rx) = mpsc::channel::<RefreshReport>(4);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(MIN_REFRESH_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let trigger = tokio::select! {
                    _ = ticker.tick() => RefreshTrigger::Scheduled,
                    msg = trigger_rx.recv() => match msg {
                        Some(()) => RefreshTrigger::Manual,
                        None => break,
                    },
                };
                debug!(?trigger, "refreshing usage");

                let svc = Arc::clone(&service);
                let result = match tokio::task::spawn_blocking(move || svc.snapshot(days)).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(error = %e, "usage query panicked");
                        continue;
                    }
                };

                if report_tx.send(RefreshReport { trigger, result }).await.is_err() {
                    debug!("refresh receiver dropped, stopping");
                    break;
                }
            }
        });

        (RefreshHandle { trigger_tx, task }, report_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UsageError;
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(10);

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("projects/p")).unwrap();
        fs::write(
            dir.path().join("projects/p/s.jsonl"),
            r#"{"timestamp":"2025-01-01T00:00:00.000Z","message":{"usage":{"input_tokens":1,"output_tokens":1}}}"#,
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_first_refresh_is_immediate() {
        let dir = setup();
        let service = Arc::new(UsageQueryService::new(dir.path()));
        let (handle, mut rx) = RefreshScheduler::spawn(service, Duration::from_secs(3600), 7);

        let report = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(report.trigger, RefreshTrigger::Scheduled);
        let snapshot = report.result.unwrap();
        assert_eq!(snapshot.recent.len(), 7);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_manual_refresh() {
        let dir = setup();
        let service = Arc::new(UsageQueryService::new(dir.path()));
        let (handle, mut rx) = RefreshScheduler::spawn(service, Duration::from_secs(3600), 1);

        timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(handle.refresh_now());

        let report = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(report.trigger, RefreshTrigger::Manual);
        assert!(report.result.is_ok());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_periodic_refresh() {
        let dir = setup();
        let service = Arc::new(UsageQueryService::new(dir.path()));
        let (handle, mut rx) = RefreshScheduler::spawn(service, Duration::from_millis(20), 1);

        for _ in 0..3 {
            let report = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
            assert_eq!(report.trigger, RefreshTrigger::Scheduled);
        }

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_errors_are_reported_and_loop_continues() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(UsageQueryService::new(dir.path().join("missing")));
        let (handle, mut rx) = RefreshScheduler::spawn(service, Duration::from_secs(3600), 7);

        let first = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(matches!(first.result, Err(UsageError::DirectoryNotFound(_))));

        assert!(handle.refresh_now());
        let second = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        assert!(second.result.is_err());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_reports() {
        let dir = setup();
        let service = Arc::new(UsageQueryService::new(dir.path()));
        let (handle, mut rx) = RefreshScheduler::spawn(service, Duration::from_secs(3600), 1);

        timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        handle.shutdown().await;

        assert!(timeout(WAIT, rx.recv()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let dir = setup();
        let service = Arc::new(UsageQueryService::new(dir.path()));
        let (handle, mut rx) = RefreshScheduler::spawn(service, Duration::ZERO, 1);

        assert!(timeout(WAIT, rx.recv()).await.unwrap().is_some());
        handle.shutdown().await;
    }
}
