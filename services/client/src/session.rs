//! Session Controller
//!
//! `SessionController` is the object a presentation layer holds for one
//! learner. It owns the transcript, the learner snapshot and the connection
//! state as separate read-model fields, drives every backend call through the
//! `ConnectionMonitor`, and reconciles the snapshot after command-bearing
//! replies.

use crate::{
    applier::{CommandApplier, Reconciliation},
    backend::{ContentKind, HttpBackend, MentorBackend},
    config::ClientConfig,
    error::BackendError,
    monitor::ConnectionMonitor,
    store::StudentStateStore,
};
use bytes::Bytes;
use mentor_core::{
    connection::ConnectionState,
    message::{NewMessage, Transcript},
    phase::ExpertProfile,
    progress::ProgressView,
    student::StudentState,
};
use std::{
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

/// Shown in place of the expert's reply when a chat send fails.
pub const SEND_FAILURE_TEXT: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Empty or whitespace-only text.
    Blank,
    /// Another send has not finished yet.
    Busy,
}

/// Result of [`SessionController::send_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was appended and nothing was sent.
    Ignored(IgnoreReason),
    /// The expert replied; `reconciliation` says what happened to the snapshot.
    Delivered { reconciliation: Reconciliation },
    /// The call failed and an error entry was appended instead of a reply.
    Failed,
}

pub struct SessionController {
    backend: Arc<dyn MentorBackend>,
    student_id: i64,
    curriculum_size: NonZeroU32,
    monitor: ConnectionMonitor,
    store: StudentStateStore,
    applier: CommandApplier,
    transcript_tx: watch::Sender<Transcript>,
    busy: AtomicBool,
}

/// Holds the single-flight flag for one send and clears it on drop, including
/// when the send future is cancelled.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn MentorBackend>,
        student_id: i64,
        curriculum_size: NonZeroU32,
    ) -> Self {
        let (transcript_tx, _) = watch::channel(Transcript::new());
        Self {
            backend,
            student_id,
            curriculum_size,
            monitor: ConnectionMonitor::new(),
            store: StudentStateStore::new(),
            applier: CommandApplier,
            transcript_tx,
            busy: AtomicBool::new(false),
        }
    }

    /// Builds a controller talking HTTP to the configured backend.
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let backend = HttpBackend::new(&config.api_base_url, config.request_timeout)?;
        info!(
            base_url = %config.api_base_url,
            student_id = config.student_id,
            curriculum_size = config.curriculum_size.get(),
            "Session controller configured"
        );
        Ok(Self::new(
            Arc::new(backend),
            config.student_id,
            config.curriculum_size,
        ))
    }

    pub fn student_id(&self) -> i64 {
        self.student_id
    }

    /// Sends one message to the active expert.
    ///
    /// Blank text, or a call made while another send is in flight, is a
    /// no-op. Otherwise the user message is appended before the request goes
    /// out, followed by either the reply or an error entry, so the transcript
    /// always grows by exactly two.
    #[instrument(skip(self, text), fields(student_id = self.student_id))]
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank message");
            return SendOutcome::Ignored(IgnoreReason::Blank);
        }
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!("Ignoring message while another send is in flight");
            return SendOutcome::Ignored(IgnoreReason::Busy);
        };

        self.append(NewMessage::user(text));

        let reply = match self
            .monitor
            .track(self.backend.send_message(self.student_id, text))
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                error!(error = %err, "Chat send failed");
                self.append(NewMessage::assistant_error(SEND_FAILURE_TEXT));
                return SendOutcome::Failed;
            }
        };

        info!(commands = reply.commands.len(), "Expert replied");
        self.append(NewMessage::assistant(
            reply.reply_text,
            reply.commands.clone(),
        ));

        let reconciliation = self
            .applier
            .apply(
                &reply.commands,
                &self.store,
                self.backend.as_ref(),
                &self.monitor,
                self.student_id,
            )
            .await;
        SendOutcome::Delivered { reconciliation }
    }

    /// Fetches `student_id` and replaces the snapshot wholesale. Failures are
    /// logged and leave the previous snapshot untouched.
    pub async fn load_student_snapshot(&self, student_id: i64) -> bool {
        self.store
            .refresh(self.backend.as_ref(), &self.monitor, student_id)
            .await
    }

    /// Reloads the snapshot for this session's learner.
    pub async fn refresh_snapshot(&self) -> bool {
        self.load_student_snapshot(self.student_id).await
    }

    /// Downloads theory or practice material for the current chapter.
    ///
    /// Returns `Ok(None)` without contacting the backend when no chapter is
    /// current.
    #[instrument(skip(self), fields(student_id = self.student_id))]
    pub async fn download_content(&self, kind: ContentKind) -> Result<Option<Bytes>, BackendError> {
        let Some(chapter) = self.store.snapshot().and_then(|s| s.current_chapter()) else {
            debug!("No current chapter; nothing to download");
            return Ok(None);
        };
        let bytes = self
            .monitor
            .track(self.backend.download_content(kind, chapter.id))
            .await?;
        info!(chapter_id = chapter.id, size = bytes.len(), "Content downloaded");
        Ok(Some(bytes))
    }

    // --- Read model ---

    pub fn transcript(&self) -> Transcript {
        self.transcript_tx.borrow().clone()
    }

    pub fn transcript_len(&self) -> usize {
        self.transcript_tx.borrow().len()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.monitor.state()
    }

    pub fn student_state(&self) -> Option<Arc<StudentState>> {
        self.store.snapshot()
    }

    pub fn progress(&self) -> ProgressView {
        ProgressView::compute(self.store.snapshot().as_deref(), self.curriculum_size)
    }

    /// The active expert; the intake expert until a snapshot says otherwise.
    pub fn expert(&self) -> ExpertProfile {
        self.progress().expert
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn subscribe_transcript(&self) -> watch::Receiver<Transcript> {
        self.transcript_tx.subscribe()
    }

    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.monitor.subscribe()
    }

    pub fn subscribe_student(&self) -> watch::Receiver<Option<Arc<StudentState>>> {
        self.store.subscribe()
    }

    fn append(&self, message: NewMessage) {
        self.transcript_tx.send_modify(|transcript| {
            transcript.append(message);
        });
    }
}
