//! Delta-tracking notification engine.
//!
//! The portal backend exposes no push channel, so notifications are
//! synthesized client-side: a poll loop fetches the employee's collections
//! on a fixed cadence and diffs every batch against the previous one. The
//! first cycle after sign-in seeds baselines silently; later cycles turn
//! observed changes into [`Notification`] records and publish the updated
//! feed to subscribers over a watch channel.
//!
//! Fetch failures are tolerated per collection: a failed fetch keeps the
//! previous baseline for that collection and the cycle goes on with the
//! others, so a flaky endpoint can neither crash the loop nor fabricate
//! transitions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::api::ApiResult;
use crate::auth::Session;
use crate::config::NotifierOptions;
use crate::models::{
    ConversationSummary, DocumentRequest, LeaveRequest, Notification, Reclamation,
};

mod snapshot;

use snapshot::SnapshotState;

/// Source of the employee-scoped collections the notifier polls.
///
/// [`crate::api::PortalApiClient`] is the production implementation; tests
/// substitute scripted fetchers.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    async fn fetch_conversations(&self, session: &Session) -> ApiResult<Vec<ConversationSummary>>;
    async fn fetch_document_requests(&self, session: &Session) -> ApiResult<Vec<DocumentRequest>>;
    async fn fetch_leave_requests(&self, session: &Session) -> ApiResult<Vec<LeaveRequest>>;
    async fn fetch_reclamations(&self, session: &Session) -> ApiResult<Vec<Reclamation>>;
}

/// Published snapshot of the notification list and its unseen counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFeed {
    /// Newest first, bounded by [`NotifierOptions::capacity`].
    pub notifications: Vec<Notification>,
    /// Notifications synthesized since the last mark-all-seen.
    pub unseen_count: u64,
}

#[derive(Default)]
struct Inner {
    session: Option<Session>,
    /// Bumped on every start and stop; in-flight cycles carrying an older
    /// epoch discard their results instead of touching state.
    epoch: u64,
    task: Option<JoinHandle<()>>,
    snapshots: SnapshotState,
    notifications: VecDeque<Notification>,
    unseen_count: u64,
}

struct Shared {
    inner: Mutex<Inner>,
    feed_tx: watch::Sender<NotificationFeed>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(task) = self.inner.get_mut().task.take() {
            task.abort();
        }
    }
}

/// Polls the portal on a fixed cadence and synthesizes notifications from
/// observed state transitions.
///
/// The notifier is inert until [`start`](Self::start) installs a session;
/// [`stop`](Self::stop) halts polling and clears all accumulated state.
/// Clones share the same feed and poll loop.
pub struct DeltaNotifier<F: ResourceFetcher> {
    fetcher: Arc<F>,
    options: NotifierOptions,
    shared: Arc<Shared>,
}

impl<F: ResourceFetcher> Clone for DeltaNotifier<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            options: self.options,
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: ResourceFetcher> DeltaNotifier<F> {
    #[must_use]
    pub fn new(fetcher: F, options: NotifierOptions) -> Self {
        let (feed_tx, _) = watch::channel(NotificationFeed::default());
        Self {
            fetcher: Arc::new(fetcher),
            options,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                feed_tx,
            }),
        }
    }

    /// Begin polling for `session`.
    ///
    /// Starting again with the same employee is a no-op while the loop is
    /// running; starting with a different employee discards the previous
    /// employee's baselines and feed first. The first cycle runs
    /// immediately, subsequent cycles follow the configured interval.
    pub async fn start(&self, session: Session) {
        let mut inner = self.shared.inner.lock().await;
        if inner.task.is_some()
            && inner
                .session
                .as_ref()
                .is_some_and(|active| active.employee_id == session.employee_id)
        {
            debug!(employee_id = %session.employee_id, "poll loop already running");
            return;
        }

        reset_locked(&mut inner, &self.shared.feed_tx);
        info!(employee_id = %session.employee_id, "starting notification poll loop");
        inner.session = Some(session);
        let epoch = inner.epoch;
        inner.task = Some(self.spawn_poll_loop(epoch));
    }

    /// Halt polling and clear baselines, notifications and the unseen
    /// counter. Safe to call when not polling.
    pub async fn stop(&self) {
        let mut inner = self.shared.inner.lock().await;
        if inner.task.is_some() {
            info!("stopping notification poll loop");
        }
        reset_locked(&mut inner, &self.shared.feed_tx);
    }

    /// Run one poll cycle right now, outside the scheduled cadence.
    /// Does nothing when no session is active.
    pub async fn refresh_now(&self) {
        let (session, epoch) = {
            let inner = self.shared.inner.lock().await;
            let Some(session) = inner.session.clone() else {
                debug!("refresh requested without an active session");
                return;
            };
            (session, inner.epoch)
        };
        run_cycle(
            &self.shared,
            self.fetcher.as_ref(),
            &session,
            epoch,
            self.options.capacity,
        )
        .await;
    }

    /// Current notifications, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        let inner = self.shared.inner.lock().await;
        inner.notifications.iter().cloned().collect()
    }

    pub async fn unseen_count(&self) -> u64 {
        self.shared.inner.lock().await.unseen_count
    }

    /// Reset the unseen counter without touching the per-notification
    /// `seen` flags or the list itself.
    pub async fn mark_all_seen(&self) {
        let mut inner = self.shared.inner.lock().await;
        inner.unseen_count = 0;
        publish_locked(&inner, &self.shared.feed_tx);
    }

    /// Watch the feed; the receiver observes every published update.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NotificationFeed> {
        self.shared.feed_tx.subscribe()
    }

    pub async fn is_polling(&self) -> bool {
        self.shared.inner.lock().await.task.is_some()
    }

    fn spawn_poll_loop(&self, epoch: u64) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::downgrade(&self.shared);
        let poll_interval = self.options.poll_interval;
        let capacity = self.options.capacity;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let session = {
                    let inner = shared.inner.lock().await;
                    if inner.epoch != epoch {
                        break;
                    }
                    match inner.session.clone() {
                        Some(session) => session,
                        None => break,
                    }
                };
                run_cycle(&shared, fetcher.as_ref(), &session, epoch, capacity).await;
            }
        })
    }
}

fn reset_locked(inner: &mut Inner, feed_tx: &watch::Sender<NotificationFeed>) {
    if let Some(task) = inner.task.take() {
        task.abort();
    }
    inner.session = None;
    inner.epoch += 1;
    inner.snapshots.clear();
    inner.notifications.clear();
    inner.unseen_count = 0;
    feed_tx.send_replace(NotificationFeed::default());
}

fn publish_locked(inner: &Inner, feed_tx: &watch::Sender<NotificationFeed>) {
    feed_tx.send_replace(NotificationFeed {
        notifications: inner.notifications.iter().cloned().collect(),
        unseen_count: inner.unseen_count,
    });
}

/// Fetch all four collections concurrently, then fold the batches into the
/// snapshots and publish any synthesized notifications.
async fn run_cycle<F: ResourceFetcher + ?Sized>(
    shared: &Shared,
    fetcher: &F,
    session: &Session,
    epoch: u64,
    capacity: usize,
) {
    let (conversations, documents, leaves, reclamations) = tokio::join!(
        fetcher.fetch_conversations(session),
        fetcher.fetch_document_requests(session),
        fetcher.fetch_leave_requests(session),
        fetcher.fetch_reclamations(session),
    );

    let mut inner = shared.inner.lock().await;
    if inner.epoch != epoch {
        debug!("discarding poll results from a stale cycle");
        return;
    }

    let mut fresh = Vec::new();
    match conversations {
        Ok(batch) => fresh.extend(inner.snapshots.observe_conversations(&batch)),
        Err(error) => debug!(%error, "conversation fetch failed, keeping previous baseline"),
    }
    match documents {
        Ok(batch) => fresh.extend(inner.snapshots.observe_documents(&batch)),
        Err(error) => debug!(%error, "document request fetch failed, keeping previous baseline"),
    }
    match leaves {
        Ok(batch) => fresh.extend(inner.snapshots.observe_leave_requests(&batch)),
        Err(error) => debug!(%error, "leave request fetch failed, keeping previous baseline"),
    }
    match reclamations {
        Ok(batch) => fresh.extend(inner.snapshots.observe_reclamations(&batch)),
        Err(error) => debug!(%error, "reclamation fetch failed, keeping previous baseline"),
    }

    if fresh.is_empty() {
        return;
    }
    debug!(count = fresh.len(), "synthesized notifications");
    for notification in fresh {
        inner.notifications.push_front(notification);
        inner.unseen_count += 1;
    }
    inner.notifications.truncate(capacity);
    publish_locked(&inner, &shared.feed_tx);
}
