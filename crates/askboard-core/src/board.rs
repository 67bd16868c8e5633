//! The shared question board and its publish/subscribe protocol.
//!
//! [`QuestionBoard`] is the only shared mutable state in the service. Every
//! mutation and the dispatch of the resulting [`BoardEvent`] happen under a
//! single acquisition of one mutex, so all subscribers see events in the
//! order the mutations were applied.
//!
//! Dispatch never waits on a subscriber. Each [`Subscription`] owns a
//! bounded queue that the board fills with `try_send`; the session that owns
//! the subscription drains it on its own task. A subscriber that lets its
//! queue fill up is detached rather than silently losing events, and its
//! session winds down when it observes the end of the stream.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use askboard_types::{Question, QuestionId};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::BoardConfig;

/// A change to the board, delivered to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Newly added questions, in insertion order. Never the whole board.
    Added(Vec<Question>),
    /// Ids of questions that were removed.
    Removed(Vec<QuestionId>),
}

/// Errors returned by board operations that can fail.
///
/// `add` and `remove` never fail; only seeding a fixed id can.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A question with this id is already on the board.
    #[error("question {0} is already on the board")]
    DuplicateId(QuestionId),
}

/// Identifier of a registration with the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct BoardState {
    questions: Vec<Question>,
    next_id: QuestionId,
    subscribers: BTreeMap<SubscriptionId, mpsc::Sender<BoardEvent>>,
    next_subscription: u64,
}

impl BoardState {
    fn contains(&self, id: QuestionId) -> bool {
        self.questions.iter().any(|q| q.id == id)
    }

    fn register(&mut self, capacity: usize) -> (SubscriptionId, mpsc::Receiver<BoardEvent>) {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        let (tx, rx) = mpsc::channel(capacity);
        self.subscribers.insert(id, tx);
        (id, rx)
    }

    /// Push `event` to every subscriber queue without waiting.
    ///
    /// Subscribers whose receiver is gone are pruned. Subscribers whose
    /// queue is full are detached.
    fn publish(&mut self, event: &BoardEvent) {
        self.subscribers
            .retain(|id, tx| match tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(subscription = %id, "subscriber queue full, detaching subscriber");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscription = %id, "pruning closed subscriber");
                    false
                }
            });
    }

    fn append(&mut self, question: Question) {
        self.questions.push(question.clone());
        self.publish(&BoardEvent::Added(vec![question]));
    }
}

/// Process-wide ordered collection of questions.
///
/// Share it as `Arc<QuestionBoard>`. Operations that hand out a
/// [`Subscription`] or spawn a delayed task take `self: &Arc<Self>`.
#[derive(Debug)]
pub struct QuestionBoard {
    state: Mutex<BoardState>,
    queue_capacity: usize,
}

impl QuestionBoard {
    /// Create an empty board.
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            state: Mutex::new(BoardState {
                questions: Vec::new(),
                next_id: QuestionId(config.first_question_id),
                subscribers: BTreeMap::new(),
                next_subscription: 0,
            }),
            queue_capacity: config.subscriber_queue_capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        // Nothing under the lock can leave the state half-updated, so a
        // poisoned guard is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a new question with the next unused id and notify every
    /// subscriber with exactly that question.
    pub fn add(&self, text: impl Into<String>) -> Question {
        let mut state = self.lock();
        let question = Question::new(state.next_id, text);
        state.next_id = state.next_id.next();
        state.append(question.clone());
        debug!(id = %question.id, subscribers = state.subscribers.len(), "question added");
        question
    }

    /// Append a question that carries a fixed id, as seed data does.
    ///
    /// The id counter is moved past the seeded id so generated ids never
    /// collide with it. Subscribers are notified exactly as for
    /// [`add`](Self::add).
    pub fn insert(&self, question: Question) -> Result<Question, BoardError> {
        let mut state = self.lock();
        if state.contains(question.id) {
            return Err(BoardError::DuplicateId(question.id));
        }
        if question.id >= state.next_id {
            state.next_id = question.id.next();
        }
        state.append(question.clone());
        debug!(id = %question.id, "seeded question inserted");
        Ok(question)
    }

    /// Remove the question with `id` if present.
    ///
    /// Returns `false` without notifying anyone when the id is not on the
    /// board, so late or repeated removals are harmless.
    pub fn remove(&self, id: QuestionId) -> bool {
        let mut state = self.lock();
        let Some(position) = state.questions.iter().position(|q| q.id == id) else {
            return false;
        };
        state.questions.remove(position);
        state.publish(&BoardEvent::Removed(vec![id]));
        debug!(%id, "question removed");
        true
    }

    /// Remove `id` once `delay` has elapsed.
    ///
    /// Fire-and-forget: the returned handle may be dropped, and nothing
    /// cancels the removal. Resolves to the result of [`remove`](Self::remove).
    pub fn remove_after(self: &Arc<Self>, id: QuestionId, delay: Duration) -> JoinHandle<bool> {
        let board = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            board.remove(id)
        })
    }

    /// Whether a question with `id` is currently on the board.
    pub fn contains(&self, id: QuestionId) -> bool {
        self.lock().contains(id)
    }

    /// Number of questions on the board.
    pub fn len(&self) -> usize {
        self.lock().questions.len()
    }

    /// Whether the board holds no questions.
    pub fn is_empty(&self) -> bool {
        self.lock().questions.is_empty()
    }

    /// Copy of the current contents in insertion order.
    pub fn snapshot(&self) -> Vec<Question> {
        self.lock().questions.clone()
    }

    /// Register for future events. Past events are not replayed.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (id, events) = self.lock().register(self.queue_capacity);
        Subscription {
            id,
            events,
            board: Arc::clone(self),
        }
    }

    /// Take a snapshot and register for events as one atomic step.
    ///
    /// Every mutation is either reflected in the returned snapshot or
    /// delivered through the subscription, never both and never neither.
    pub fn snapshot_and_subscribe(self: &Arc<Self>) -> (Vec<Question>, Subscription) {
        let mut state = self.lock();
        let snapshot = state.questions.clone();
        let (id, events) = state.register(self.queue_capacity);
        drop(state);
        let subscription = Subscription {
            id,
            events,
            board: Arc::clone(self),
        };
        (snapshot, subscription)
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn detach(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }
}

/// One registration with a [`QuestionBoard`].
///
/// Dropping the subscription unsubscribes it, so every exit path of the
/// owner releases the registration.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    events: mpsc::Receiver<BoardEvent>,
    board: Arc<QuestionBoard>,
}

impl Subscription {
    /// This subscription's identifier.
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the board has detached this subscriber and its
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<BoardEvent> {
        self.events.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<BoardEvent> {
        self.events.try_recv().ok()
    }

    /// Deregister from the board. Queued events are discarded.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.board.detach(self.id) {
            debug!(subscription = %self.id, "unsubscribed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn board() -> Arc<QuestionBoard> {
        Arc::new(QuestionBoard::new(&BoardConfig::default()))
    }

    fn ids(questions: &[Question]) -> Vec<QuestionId> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn add_assigns_monotonic_ids_from_configured_start() {
        let board = board();
        let a = board.add("first");
        let b = board.add("second");
        assert_eq!(a.id, QuestionId(1001));
        assert_eq!(b.id, QuestionId(1002));
        assert_eq!(board.snapshot(), vec![a, b]);
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let board = board();
        let a = board.add("a");
        assert!(board.remove(a.id));
        let b = board.add("b");
        assert!(b.id > a.id);
    }

    #[test]
    fn snapshot_is_adds_minus_successful_removes_in_add_order() {
        let board = board();
        let mut model: Vec<Question> = Vec::new();

        for round in 0..40_u32 {
            let q = board.add(format!("question {round}"));
            model.push(q);
            if round % 3 == 2 {
                let victim = model.remove(model.len() / 2);
                assert!(board.remove(victim.id));
            }
            if round % 7 == 0 {
                // Ids that were never issued are no-ops.
                assert!(!board.remove(QuestionId(50_000 + round)));
            }
        }

        assert_eq!(board.snapshot(), model);
        assert_eq!(board.len(), model.len());
    }

    #[test]
    fn removing_missing_id_is_silent() {
        let board = board();
        let mut sub = board.subscribe();
        assert!(!board.remove(QuestionId(42)));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn second_remove_of_same_id_notifies_nothing() {
        let board = board();
        let q = board.add("dup");
        let mut sub = board.subscribe();

        assert!(board.remove(q.id));
        assert!(!board.remove(q.id));

        assert_eq!(sub.try_recv(), Some(BoardEvent::Removed(vec![q.id])));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn subscribe_does_not_replay() {
        let board = board();
        board.add("before");
        let mut sub = board.subscribe();
        assert!(sub.try_recv().is_none());
        let after = board.add("after");
        assert_eq!(sub.try_recv(), Some(BoardEvent::Added(vec![after])));
    }

    #[test]
    fn snapshot_and_subscribe_sees_later_add_exactly_once() {
        let board = board();
        let existing = board.add("existing");
        let (snapshot, mut sub) = board.snapshot_and_subscribe();
        assert_eq!(snapshot, vec![existing]);

        let other = Arc::clone(&board);
        let added = std::thread::spawn(move || other.add("from elsewhere"))
            .join()
            .unwrap();

        assert!(!snapshot.contains(&added));
        assert_eq!(sub.try_recv(), Some(BoardEvent::Added(vec![added])));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn insert_rejects_duplicates_and_moves_counter_past_seed() {
        let board = board();
        board.insert(Question::new(QuestionId(1), "seed")).unwrap();
        assert_eq!(
            board.insert(Question::new(QuestionId(1), "again")),
            Err(BoardError::DuplicateId(QuestionId(1)))
        );

        // Seeds below the counter leave it alone.
        assert_eq!(board.add("generated").id, QuestionId(1001));

        // Seeds above the counter push it forward.
        board.insert(Question::new(QuestionId(5000), "high")).unwrap();
        assert_eq!(board.add("next").id, QuestionId(5001));
    }

    #[test]
    fn insert_notifies_like_add() {
        let board = board();
        let mut sub = board.subscribe();
        let seeded = board.insert(Question::new(QuestionId(3), "seeded")).unwrap();
        assert_eq!(sub.try_recv(), Some(BoardEvent::Added(vec![seeded])));
    }

    #[test]
    fn unsubscribe_and_drop_both_release_registration() {
        let board = board();
        let a = board.subscribe();
        let b = board.subscribe();
        assert_ne!(a.id(), b.id());
        assert_eq!(board.subscriber_count(), 2);

        // Subscription ids are never reused.
        let released = a.id();

        a.unsubscribe();
        assert_eq!(board.subscriber_count(), 1);

        drop(b);
        assert_eq!(board.subscriber_count(), 0);
        assert!(board.subscribe().id() > released);

        // Mutations with nobody listening still succeed.
        let q = board.add("alone");
        assert!(board.remove(q.id));
    }

    #[tokio::test]
    async fn full_queue_detaches_subscriber_without_losing_queued_events() {
        let config = BoardConfig {
            subscriber_queue_capacity: 2,
            ..BoardConfig::default()
        };
        let board = Arc::new(QuestionBoard::new(&config));
        let mut slow = board.subscribe();
        let mut fast = board.subscribe();

        let first = board.add("1");
        assert_eq!(fast.recv().await, Some(BoardEvent::Added(vec![first.clone()])));
        let second = board.add("2");
        assert_eq!(fast.recv().await, Some(BoardEvent::Added(vec![second.clone()])));
        let third = board.add("3");
        assert_eq!(fast.recv().await, Some(BoardEvent::Added(vec![third])));

        assert_eq!(board.subscriber_count(), 1);
        assert_eq!(slow.recv().await, Some(BoardEvent::Added(vec![first])));
        assert_eq!(slow.recv().await, Some(BoardEvent::Added(vec![second])));
        assert_eq!(slow.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn remove_after_waits_for_grace_period() {
        let board = board();
        let q = board.add("reported");
        let mut sub = board.subscribe();

        let handle = board.remove_after(q.id, Duration::from_millis(1000));

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(board.contains(q.id));
        assert!(sub.try_recv().is_none());

        assert!(handle.await.unwrap());
        assert!(!board.contains(q.id));
        assert_eq!(sub.recv().await, Some(BoardEvent::Removed(vec![q.id])));
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_delayed_removals_notify_once() {
        let board = board();
        let q = board.add("reported twice");
        let mut sub = board.subscribe();

        let first = board.remove_after(q.id, Duration::from_millis(1000));
        let second = board.remove_after(q.id, Duration::from_millis(1000));

        let results = [first.await.unwrap(), second.await.unwrap()];
        assert_eq!(results.iter().filter(|removed| **removed).count(), 1);
        assert_eq!(sub.try_recv(), Some(BoardEvent::Removed(vec![q.id])));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adders_get_distinct_ids_and_full_fan_out() {
        const ADDERS: usize = 64;

        let board = board();
        let mut subs: Vec<Subscription> = (0..3).map(|_| board.subscribe()).collect();

        let handles: Vec<_> = (0..ADDERS)
            .map(|n| {
                let board = Arc::clone(&board);
                tokio::spawn(async move { board.add(format!("concurrent {n}")).id })
            })
            .collect();

        let mut returned = BTreeSet::new();
        for handle in handles {
            assert!(returned.insert(handle.await.unwrap()));
        }
        assert_eq!(returned.len(), ADDERS);

        let board_order = ids(&board.snapshot());
        for sub in &mut subs {
            let mut seen = Vec::new();
            while let Some(event) = sub.try_recv() {
                match event {
                    BoardEvent::Added(questions) => {
                        assert_eq!(questions.len(), 1);
                        seen.extend(ids(&questions));
                    }
                    BoardEvent::Removed(_) => panic!("unexpected removal"),
                }
            }
            // Every subscriber observes the same order the board applied.
            assert_eq!(seen, board_order);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn snapshot_and_subscribe_races_cleanly_with_adders() {
        const ADDERS: usize = 60;

        let board = board();
        let handles: Vec<_> = (0..ADDERS)
            .map(|n| {
                let board = Arc::clone(&board);
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    board.add(format!("racing {n}"))
                })
            })
            .collect();

        let (snapshot, mut sub) = board.snapshot_and_subscribe();

        for handle in handles {
            handle.await.unwrap();
        }

        let mut delivered = Vec::new();
        while let Some(event) = sub.try_recv() {
            if let BoardEvent::Added(questions) = event {
                delivered.extend(ids(&questions));
            }
        }

        let from_snapshot: BTreeSet<_> = ids(&snapshot).into_iter().collect();
        let from_events: BTreeSet<_> = delivered.iter().copied().collect();
        assert_eq!(from_events.len(), delivered.len(), "duplicate delivery");
        assert!(from_snapshot.is_disjoint(&from_events));

        let all: BTreeSet<_> = from_snapshot.union(&from_events).copied().collect();
        let board_ids: BTreeSet<_> = ids(&board.snapshot()).into_iter().collect();
        assert_eq!(all, board_ids);
        assert_eq!(all.len(), ADDERS);
    }
}
