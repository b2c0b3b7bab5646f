//! Local copy of the learner snapshot.

use crate::{backend::MentorBackend, monitor::ConnectionMonitor};
use mentor_core::student::StudentState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Holds the last good [`StudentState`] fetched from the backend.
///
/// The snapshot is either absent (never loaded) or a complete backend
/// response. It is swapped as a whole `Arc`; readers never observe a
/// half-updated value. Concurrent refreshes are harmless, the last one to
/// finish wins.
#[derive(Debug)]
pub struct StudentStateStore {
    snapshot_tx: watch::Sender<Option<Arc<StudentState>>>,
}

impl Default for StudentStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentStateStore {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self { snapshot_tx }
    }

    pub fn snapshot(&self) -> Option<Arc<StudentState>> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot_tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<StudentState>>> {
        self.snapshot_tx.subscribe()
    }

    /// Replaces the snapshot wholesale.
    pub fn replace(&self, state: StudentState) {
        self.snapshot_tx.send_replace(Some(Arc::new(state)));
    }

    /// Fetches the learner from the backend and replaces the snapshot.
    ///
    /// Returns `true` when the snapshot was replaced. On any failure the
    /// error is logged and the previous snapshot (or its absence) is kept.
    #[instrument(skip(self, backend, monitor))]
    pub async fn refresh(
        &self,
        backend: &dyn MentorBackend,
        monitor: &ConnectionMonitor,
        student_id: i64,
    ) -> bool {
        match monitor.track(backend.fetch_student(student_id)).await {
            Ok(state) => {
                info!(
                    phase = %state.phase(),
                    completed = state.completed_count(),
                    "Student snapshot refreshed"
                );
                self.replace(state);
                true
            }
            Err(err) => {
                warn!(error = %err, kept_previous = self.is_loaded(), "Failed to refresh student snapshot");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockMentorBackend;
    use crate::error::BackendError;
    use mentor_core::connection::ConnectionState;
    use reqwest::StatusCode;

    fn student(expert: &str) -> StudentState {
        StudentState {
            id: Some(1),
            current_expert: Some(expert.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let mut backend = MockMentorBackend::new();
        backend
            .expect_fetch_student()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(student("teacher")));
        let monitor = ConnectionMonitor::new();
        let store = StudentStateStore::new();
        assert!(!store.is_loaded());

        assert!(store.refresh(&backend, &monitor, 1).await);

        let snapshot = store.snapshot().expect("snapshot should be loaded");
        assert_eq!(snapshot.current_expert.as_deref(), Some("teacher"));
        assert_eq!(monitor.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let mut backend = MockMentorBackend::new();
        backend.expect_fetch_student().times(1).returning(|_| {
            Err(BackendError::Status {
                endpoint: "/edu/student/1".to_string(),
                status: StatusCode::NOT_FOUND,
            })
        });
        let monitor = ConnectionMonitor::new();
        let store = StudentStateStore::new();
        store.replace(student("interview"));
        let before = store.snapshot().unwrap();

        assert!(!store.refresh(&backend, &monitor, 1).await);

        let after = store.snapshot().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(monitor.state(), ConnectionState::Error);
    }

    #[tokio::test]
    async fn test_failed_first_refresh_stays_absent() {
        let mut backend = MockMentorBackend::new();
        backend.expect_fetch_student().returning(|_| {
            Err(BackendError::Decode {
                endpoint: "/edu/student/1".to_string(),
                source: serde_json::from_str::<StudentState>("{oops").unwrap_err(),
            })
        });
        let monitor = ConnectionMonitor::new();
        let store = StudentStateStore::new();

        assert!(!store.refresh(&backend, &monitor, 1).await);
        assert!(store.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified_on_replace() {
        let store = StudentStateStore::new();
        let mut rx = store.subscribe();

        store.replace(student("test"));

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seen.current_expert.as_deref(), Some("test"));
    }
}
