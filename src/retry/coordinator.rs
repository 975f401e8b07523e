//! Retry Coordinator
//!
//! Coalesces concurrent failures of the same kind into a single refresh and
//! replays every affected request once the refresh settles.
//!
//! Flow for an applicable failure:
//! 1. The request is marked with the coordinator's marker.
//! 2. If no refresh is in flight, this call becomes the initiator: it flips
//!    `refreshing`, runs the strategy refresh, and then settles every queued
//!    waiter with the same outcome before replaying its own request.
//! 3. Otherwise the call is queued and replays its request with the values of
//!    the in-flight refresh.
//!
//! The state lock is never held across an `.await`; "check `refreshing` then
//! enqueue or flip" and "take queue then clear `refreshing`" are each a single
//! lock acquisition, so at most one refresh is in flight per coordinator.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use super::marker::{RetryMarker, marker_key};
use super::strategy::{RequestFailure, RetryStrategy};
use crate::error::QueueError;

type Outcome<V, E> = Result<V, E>;
type Waiter<V, E> = oneshot::Sender<Outcome<V, E>>;

struct State<V, E> {
    refreshing: bool,
    waiters: VecDeque<Waiter<V, E>>,
    cycles: u64,
}

impl<V, E> State<V, E> {
    fn new() -> Self {
        Self {
            refreshing: false,
            waiters: VecDeque::new(),
            cycles: 0,
        }
    }

    /// Close the current cycle and hand back its batch of waiters.
    fn finish_cycle(&mut self) -> VecDeque<Waiter<V, E>> {
        self.refreshing = false;
        std::mem::take(&mut self.waiters)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // No code panics while holding the lock, so the state is consistent even if poisoned.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Entry<V, E> {
    Initiate,
    Wait(oneshot::Receiver<Outcome<V, E>>),
}

/// Resets the coordinator if the initiating future is dropped or panics while
/// the refresh is pending. Dropping the batch's senders rejects every waiter
/// with `QueueError::ProcessingFailed`.
struct CycleGuard<'a, V, E> {
    state: &'a Mutex<State<V, E>>,
    tag: &'a str,
    armed: bool,
}

impl<V, E> CycleGuard<'_, V, E> {
    fn finish(mut self) -> VecDeque<Waiter<V, E>> {
        self.armed = false;
        lock(self.state).finish_cycle()
    }
}

impl<V, E> Drop for CycleGuard<'_, V, E> {
    fn drop(&mut self) {
        if self.armed {
            let abandoned = lock(self.state).finish_cycle();
            tracing::warn!(
                target: "retry_queue::coordinator",
                tag = %self.tag,
                waiters = abandoned.len(),
                "refresh abandoned before settling; rejecting queued requests"
            );
        }
    }
}

/// Point-in-time view of a coordinator's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueSnapshot {
    /// A refresh is in flight.
    pub refreshing: bool,
    /// Requests waiting for the in-flight refresh.
    pub queued: usize,
    /// Refresh cycles started since construction.
    pub cycles: u64,
}

/// Single-flight refresh-and-retry coordinator for one retry reason.
///
/// Share one instance (typically behind an `Arc`) between every caller that
/// may fail for the strategy's reason.
pub struct RetryCoordinator<S: RetryStrategy> {
    strategy: S,
    marker_key: String,
    state: Mutex<State<S::Values, S::Error>>,
}

impl<S: RetryStrategy> RetryCoordinator<S> {
    /// Create a coordinator driving `strategy`.
    pub fn new(strategy: S) -> Self {
        let marker_key = marker_key(strategy.tag());
        Self {
            strategy,
            marker_key,
            state: Mutex::new(State::new()),
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Tag of the retry reason handled by this coordinator.
    pub fn tag(&self) -> &str {
        self.strategy.tag()
    }

    /// Key of the marker this coordinator sets on retried requests.
    pub fn marker_key(&self) -> &str {
        &self.marker_key
    }

    /// Whether `request` already went through this coordinator once.
    pub fn has_been_retried(&self, request: &S::Request) -> bool {
        request.has_marker(&self.marker_key)
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let state = lock(&self.state);
        QueueSnapshot {
            refreshing: state.refreshing,
            queued: state.waiters.len(),
            cycles: state.cycles,
        }
    }

    /// Handle a failed request.
    ///
    /// - Failures the strategy does not own are returned unchanged.
    /// - Requests already retried by this coordinator fail with their error
    ///   instead of starting another refresh.
    /// - Otherwise the request is replayed with the values of the current (or
    ///   a newly started) refresh cycle. A refresh error is returned to every
    ///   request of the cycle; a replay error only to the request it belongs to.
    pub async fn on_failure(
        &self,
        failure: RequestFailure<S::Request, S::Error>,
    ) -> Result<S::Response, S::Error> {
        let RequestFailure { mut request, error } = failure;
        let tag = self.strategy.tag();

        if !self.strategy.is_applicable(&error) {
            tracing::trace!(target: "retry_queue::coordinator", tag = %tag, "failure not applicable; passing through");
            return Err(error);
        }

        if self.has_been_retried(&request) {
            tracing::debug!(target: "retry_queue::coordinator", tag = %tag, "request already retried once; failing");
            return Err(error);
        }

        request.set_marker(&self.marker_key);

        match self.enter() {
            Entry::Wait(receiver) => {
                let values = match receiver.await {
                    Ok(outcome) => outcome?,
                    Err(_) => return Err(QueueError::ProcessingFailed.into()),
                };
                self.strategy.apply_updated_values(request, values).await
            }
            Entry::Initiate => {
                let guard = CycleGuard {
                    state: &self.state,
                    tag,
                    armed: true,
                };
                let outcome = self.strategy.request_refresh().await;
                let batch = guard.finish();

                match outcome {
                    Ok(values) => {
                        tracing::debug!(target: "retry_queue::coordinator", tag = %tag, waiters = batch.len(), "refresh succeeded; resuming queued requests");
                        for waiter in batch {
                            // A dropped receiver only means that caller gave up.
                            let _ = waiter.send(Ok(values.clone()));
                        }
                        self.strategy.apply_updated_values(request, values).await
                    }
                    Err(err) => {
                        tracing::warn!(target: "retry_queue::coordinator", tag = %tag, waiters = batch.len(), "refresh failed; rejecting queued requests");
                        for waiter in batch {
                            let _ = waiter.send(Err(err.clone()));
                        }
                        Err(err)
                    }
                }
            }
        }
    }

    /// Join the in-flight cycle or start a new one.
    fn enter(&self) -> Entry<S::Values, S::Error> {
        let mut state = lock(&self.state);
        if state.refreshing {
            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);
            tracing::debug!(target: "retry_queue::coordinator", tag = %self.strategy.tag(), queued = state.waiters.len(), "refresh in flight; queued request");
            Entry::Wait(receiver)
        } else {
            state.refreshing = true;
            state.cycles += 1;
            tracing::debug!(target: "retry_queue::coordinator", tag = %self.strategy.tag(), cycle = state.cycles, "starting refresh");
            Entry::Initiate
        }
    }
}

impl<S: RetryStrategy + std::fmt::Debug> std::fmt::Debug for RetryCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryCoordinator")
            .field("strategy", &self.strategy)
            .field("marker_key", &self.marker_key)
            .field("state", &self.snapshot())
            .finish()
    }
}
