//! Per-session progress feeds.
//!
//! The notifier keeps one broadcast channel per active session id.
//! Publishing pushes checkpoint copies to every currently-subscribed
//! observer in publish order; a subscriber that arrives after N checkpoints
//! have fired sees only N+1 onward. Dropping the last subscription for a
//! session removes its registry entry so the map never grows unbounded.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use mailwright_core_types::{Checkpoint, SessionId};

const DEFAULT_CAPACITY: usize = 64;

struct Inner {
    feeds: Mutex<HashMap<SessionId, broadcast::Sender<Checkpoint>>>,
    capacity: usize,
}

/// Handle for publishing and subscribing to session checkpoint streams.
#[derive(Clone)]
pub struct ProgressNotifier {
    inner: Arc<Inner>,
}

impl ProgressNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                feeds: Mutex::new(HashMap::new()),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Publish one checkpoint to every observer of the session.
    ///
    /// Sessions nobody observes are not buffered for: the event is dropped.
    pub fn publish(&self, session: &SessionId, checkpoint: Checkpoint) {
        let feeds = self.inner.feeds.lock();
        if let Some(sender) = feeds.get(session) {
            let delivered = sender.send(checkpoint).unwrap_or(0);
            trace!(session = %session, delivered, "checkpoint published");
        } else {
            trace!(session = %session, "no observers; checkpoint dropped");
        }
    }

    /// Subscribe to a session's feed from this point onward.
    pub fn subscribe(&self, session: &SessionId) -> ProgressFeed {
        let mut feeds = self.inner.feeds.lock();
        let sender = feeds
            .entry(session.clone())
            .or_insert_with(|| {
                debug!(session = %session, "opening progress feed");
                broadcast::channel(self.inner.capacity).0
            })
            .clone();
        ProgressFeed {
            session: session.clone(),
            rx: Some(sender.subscribe()),
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of sessions with at least one live subscription.
    pub fn active_sessions(&self) -> usize {
        self.inner.feeds.lock().len()
    }
}

impl Default for ProgressNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One observer's view of a session feed.
///
/// The receiver lives in an `Option` so drop can release it while holding
/// the registry lock; it is `Some` for the feed's whole usable lifetime.
pub struct ProgressFeed {
    session: SessionId,
    rx: Option<broadcast::Receiver<Checkpoint>>,
    inner: Arc<Inner>,
}

impl ProgressFeed {
    /// Await the next checkpoint. `None` once the publisher side is gone
    /// and the buffer is drained.
    pub async fn recv(&mut self) -> Option<Checkpoint> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(checkpoint) => return Some(checkpoint),
                // A lagged observer skips what it missed; order of what it
                // does see is still publish order.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(session = %self.session, skipped, "observer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking drain of whatever has been published so far.
    pub fn drain_ready(&mut self) -> Vec<Checkpoint> {
        let mut out = Vec::new();
        if let Some(rx) = self.rx.as_mut() {
            while let Ok(checkpoint) = rx.try_recv() {
                out.push(checkpoint);
            }
        }
        out
    }
}

impl Drop for ProgressFeed {
    fn drop(&mut self) {
        // The receiver must go away under the lock: two final observers
        // dropping concurrently would otherwise each see the other's
        // receiver still counted and neither would remove the entry.
        let mut feeds = self.inner.feeds.lock();
        drop(self.rx.take());
        if let Some(sender) = feeds.get(&self.session) {
            if sender.receiver_count() == 0 {
                feeds.remove(&self.session);
                debug!(session = %self.session, "last observer gone; feed closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailwright_core_types::StepName;

    fn checkpoint(step: StepName) -> Checkpoint {
        Checkpoint::new(step, None)
    }

    #[tokio::test]
    async fn observers_see_checkpoints_in_publish_order() {
        let notifier = ProgressNotifier::new();
        let session = SessionId::new();
        let mut feed = notifier.subscribe(&session);

        notifier.publish(&session, checkpoint(StepName::Start));
        notifier.publish(&session, checkpoint(StepName::OpenComposer));
        notifier.publish(&session, checkpoint(StepName::Send));

        assert_eq!(feed.recv().await.unwrap().step, StepName::Start);
        assert_eq!(feed.recv().await.unwrap().step, StepName::OpenComposer);
        assert_eq!(feed.recv().await.unwrap().step, StepName::Send);
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_checkpoints() {
        let notifier = ProgressNotifier::new();
        let session = SessionId::new();
        let _early = notifier.subscribe(&session);

        notifier.publish(&session, checkpoint(StepName::Start));
        notifier.publish(&session, checkpoint(StepName::IdentifyAccount));

        let mut late = notifier.subscribe(&session);
        notifier.publish(&session, checkpoint(StepName::Send));

        let seen = late.drain_ready();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].step, StepName::Send);
    }

    #[tokio::test]
    async fn concurrent_subscribers_see_identical_sequences() {
        let notifier = ProgressNotifier::new();
        let session = SessionId::new();
        let mut a = notifier.subscribe(&session);
        let mut b = notifier.subscribe(&session);

        for step in [StepName::Start, StepName::FillSubject, StepName::Verify] {
            notifier.publish(&session, checkpoint(step));
        }

        let seen_a: Vec<_> = a.drain_ready().into_iter().map(|c| c.step).collect();
        let seen_b: Vec<_> = b.drain_ready().into_iter().map(|c| c.step).collect();
        assert_eq!(seen_a, seen_b);
        assert_eq!(
            seen_a,
            vec![StepName::Start, StepName::FillSubject, StepName::Verify]
        );
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let notifier = ProgressNotifier::new();
        let one = SessionId::new();
        let two = SessionId::new();
        let mut feed_one = notifier.subscribe(&one);
        let mut feed_two = notifier.subscribe(&two);

        notifier.publish(&one, checkpoint(StepName::Start));

        assert_eq!(feed_one.drain_ready().len(), 1);
        assert!(feed_two.drain_ready().is_empty());
    }

    #[tokio::test]
    async fn last_unsubscribe_removes_the_entry() {
        let notifier = ProgressNotifier::new();
        let session = SessionId::new();

        let first = notifier.subscribe(&session);
        let second = notifier.subscribe(&session);
        assert_eq!(notifier.active_sessions(), 1);

        drop(first);
        assert_eq!(notifier.active_sessions(), 1);
        drop(second);
        assert_eq!(notifier.active_sessions(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_final_unsubscribes_still_remove_the_entry() {
        let notifier = ProgressNotifier::new();
        for _ in 0..100 {
            let session = SessionId::new();
            let a = notifier.subscribe(&session);
            let b = notifier.subscribe(&session);

            let ta = tokio::spawn(async move { drop(a) });
            let tb = tokio::spawn(async move { drop(b) });
            ta.await.unwrap();
            tb.await.unwrap();

            assert_eq!(notifier.active_sessions(), 0);
        }
    }

    #[tokio::test]
    async fn publish_without_observers_is_a_noop() {
        let notifier = ProgressNotifier::new();
        let session = SessionId::new();
        notifier.publish(&session, checkpoint(StepName::Start));
        assert_eq!(notifier.active_sessions(), 0);
    }
}
