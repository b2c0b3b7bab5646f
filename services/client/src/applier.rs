//! Reconciliation after command-bearing chat replies.
//!
//! Commands are a "state changed" signal, not a diff. Any non-empty list
//! invalidates the whole snapshot and triggers exactly one refetch; the
//! payloads are never interpreted.

use crate::{backend::MentorBackend, monitor::ConnectionMonitor, store::StudentStateStore};
use mentor_core::Command;
use tracing::info;

/// What happened to the snapshot after a chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// No commands; the snapshot was left alone.
    Unchanged,
    Refreshed,
    /// The refetch failed; the previous snapshot is still in place.
    RefreshFailed,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CommandApplier;

impl CommandApplier {
    pub fn needs_refresh(commands: &[Command]) -> bool {
        !commands.is_empty()
    }

    /// Descriptions to annotate the assistant message with.
    pub fn descriptions(commands: &[Command]) -> Vec<String> {
        commands.iter().map(|c| c.description.clone()).collect()
    }

    pub async fn apply(
        &self,
        commands: &[Command],
        store: &StudentStateStore,
        backend: &dyn MentorBackend,
        monitor: &ConnectionMonitor,
        student_id: i64,
    ) -> Reconciliation {
        if !Self::needs_refresh(commands) {
            return Reconciliation::Unchanged;
        }
        info!(
            student_id,
            commands = commands.len(),
            "Backend declared state changes; refetching snapshot"
        );
        if store.refresh(backend, monitor, student_id).await {
            Reconciliation::Refreshed
        } else {
            Reconciliation::RefreshFailed
        }
    }
}
