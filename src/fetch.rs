//! Fetch lifecycle controller.
//!
//! This module provides:
//!
//! - `FetchState`: discriminated result state exposed to the UI
//! - `reduce`: the pure transition function over fetch actions
//! - `FetchController`: owns the single outstanding lookup task and is
//!   polled each frame, egui-style
//!
//! At most one request is outstanding per controller. Changing the locator
//! cancels the previous request before starting the next one; a cancelled
//! request's outcome is never applied to state. Cancellation uses two
//! independent guards: a flag checked inside the task around the transport
//! call, and `JoinHandle::abort()` which drops the in-flight request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use reqwest::Url;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors a lookup can terminate with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The locator failed URL parsing; nothing was sent over the network
    #[error("Invalid URL provided")]
    InvalidLocator,

    /// The remote service answered with a non-2xx status
    #[error("api returned {0}")]
    HttpStatus(u16),

    /// Network or connection failure, with the transport's message
    #[error("{0}")]
    Transport(String),

    /// The response body did not match the expected schema
    #[error("response did not match the catalog schema")]
    Decode,

    /// Outcome suppressed by cancellation; never surfaced to the user
    #[error("lookup cancelled")]
    Cancelled,
}

/// Result state for one locator's lifetime.
///
/// Exactly one variant is live at a time. `Refetching` is the only variant
/// that both holds a value and has a request in flight; it is what the UI
/// renders as stale data plus an updating notice.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// No request ever issued for the current locator
    Uninitialized,
    /// Request in flight, no prior successful value held
    Loading,
    /// Request in flight, the prior successful value is still displayed
    Refetching { previous: T },
    /// Most recent request terminated in error
    Failed { error: FetchError },
    /// Most recent request completed with a decoded payload
    Succeeded { value: T },
}

impl<T> FetchState<T> {
    /// The held successful value, if any (current or stale)
    pub fn value(&self) -> Option<&T> {
        match self {
            FetchState::Succeeded { value } => Some(value),
            FetchState::Refetching { previous } => Some(previous),
            _ => None,
        }
    }
}

/// Events that drive the state machine
#[derive(Debug)]
pub enum FetchAction<T> {
    /// A new request was issued
    Start,
    /// The request completed and decoded
    Success(T),
    /// The request terminated in error
    Error(FetchError),
}

/// Pure transition function. `Start` keeps a held value visible by moving
/// it into `Refetching`; terminal actions replace the whole state.
pub fn reduce<T>(state: FetchState<T>, action: FetchAction<T>) -> FetchState<T> {
    match action {
        FetchAction::Start => match state {
            FetchState::Succeeded { value } => FetchState::Refetching { previous: value },
            FetchState::Refetching { previous } => FetchState::Refetching { previous },
            FetchState::Uninitialized | FetchState::Loading | FetchState::Failed { .. } => {
                FetchState::Loading
            }
        },
        FetchAction::Success(value) => FetchState::Succeeded { value },
        FetchAction::Error(error) => FetchState::Failed { error },
    }
}

/// Drives the request lifecycle for one locator at a time.
///
/// The artificial pre-request delay makes loading states observable during
/// development; it is plain configuration, tests pass `Duration::ZERO`.
pub struct FetchController<T> {
    locator: String,
    state: FetchState<T>,
    task: Option<JoinHandle<Result<T, FetchError>>>,
    cancelled: Option<Arc<AtomicBool>>,
    delay: Duration,
}

impl<T: Send + 'static> FetchController<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            locator: String::new(),
            state: FetchState::Uninitialized,
            task: None,
            cancelled: None,
            delay,
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Whether a request is currently outstanding
    pub fn in_flight(&self) -> bool {
        self.task.is_some()
    }

    /// Re-evaluate the controller against a locator.
    ///
    /// Idempotent for an unchanged locator. On a change, the outstanding
    /// request (if any) is cancelled first:
    ///
    /// - empty locator: state resets to `Uninitialized`, no request
    /// - malformed locator: state becomes `Failed(InvalidLocator)` with
    ///   zero network calls and no delay
    /// - valid locator: state advances via `Start`, then `lookup` runs on
    ///   a spawned task after the artificial delay
    pub fn set_locator<F, Fut>(&mut self, locator: &str, lookup: F)
    where
        F: FnOnce(Url) -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        if locator == self.locator {
            return;
        }
        self.locator = locator.to_string();
        self.cancel_outstanding();

        if locator.is_empty() {
            self.state = FetchState::Uninitialized;
            return;
        }

        let url = match Url::parse(locator) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Rejecting malformed locator {locator:?}: {e}");
                self.dispatch(FetchAction::Error(FetchError::InvalidLocator));
                return;
            }
        };

        tracing::debug!("Starting lookup for {url}");
        self.dispatch(FetchAction::Start);

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let delay = self.delay;
        let fut = lookup(url);

        self.task = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if flag.load(Ordering::Relaxed) {
                return Err(FetchError::Cancelled);
            }
            let outcome = fut.await;
            if flag.load(Ordering::Relaxed) {
                return Err(FetchError::Cancelled);
            }
            outcome
        }));
        self.cancelled = Some(cancelled);
    }

    /// Poll the outstanding task, applying its outcome through the reducer.
    ///
    /// Returns true if a terminal transition (success or error) was applied
    /// this call. Cancelled outcomes are discarded silently.
    pub fn poll(&mut self) -> bool {
        let Some(handle) = &self.task else {
            return false;
        };
        if !handle.is_finished() {
            return false;
        }

        let handle = self.task.take().unwrap();
        self.cancelled = None;

        match handle.now_or_never() {
            Some(Ok(Ok(value))) => {
                self.dispatch(FetchAction::Success(value));
                true
            }
            Some(Ok(Err(FetchError::Cancelled))) => false,
            Some(Ok(Err(error))) => {
                tracing::warn!("Lookup failed: {error}");
                self.dispatch(FetchAction::Error(error));
                true
            }
            Some(Err(join_err)) if join_err.is_cancelled() => false,
            Some(Err(join_err)) => {
                tracing::error!("Lookup task panicked: {join_err}");
                self.dispatch(FetchAction::Error(FetchError::Transport(
                    "unknown error".to_string(),
                )));
                true
            }
            None => {
                // Shouldn't happen since we checked is_finished()
                tracing::warn!("Lookup task not ready despite is_finished()");
                false
            }
        }
    }

    fn dispatch(&mut self, action: FetchAction<T>) {
        let state = std::mem::replace(&mut self.state, FetchState::Uninitialized);
        self.state = reduce(state, action);
    }

    /// Cancel the outstanding request, if any. Sets the suppression flag
    /// first, then aborts the task so the in-flight transport call is
    /// actively torn down rather than left to finish.
    fn cancel_outstanding(&mut self) {
        if let Some(flag) = self.cancelled.take() {
            flag.store(true, Ordering::Relaxed);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const LOCATOR_A: &str = "http://catalog.test/pikachu";
    const LOCATOR_B: &str = "http://catalog.test/ditto";

    /// Poll until the controller has no outstanding task
    async fn settle(ctrl: &mut FetchController<u32>) {
        for _ in 0..400 {
            ctrl.poll();
            if !ctrl.in_flight() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("controller did not settle");
    }

    #[tokio::test]
    async fn empty_locator_stays_uninitialized() {
        let mut ctrl = FetchController::new(Duration::ZERO);
        ctrl.set_locator("", |_| async { Ok(0u32) });
        assert_eq!(*ctrl.state(), FetchState::Uninitialized);
        assert!(!ctrl.in_flight());
    }

    #[tokio::test]
    async fn malformed_locator_fails_without_request() {
        let mut ctrl = FetchController::new(Duration::from_secs(60));
        ctrl.set_locator("☃", |_| async { Ok(0u32) });
        // Immediate despite the huge delay: validation never spawns a task
        assert_eq!(
            *ctrl.state(),
            FetchState::Failed {
                error: FetchError::InvalidLocator
            }
        );
        assert!(!ctrl.in_flight());
    }

    #[tokio::test]
    async fn successful_lookup_transitions_loading_then_succeeded() {
        let mut ctrl = FetchController::new(Duration::ZERO);
        ctrl.set_locator(LOCATOR_A, |_| async { Ok(7u32) });
        assert_eq!(*ctrl.state(), FetchState::Loading);
        assert!(ctrl.in_flight());

        settle(&mut ctrl).await;
        assert_eq!(*ctrl.state(), FetchState::Succeeded { value: 7 });
    }

    #[tokio::test]
    async fn failed_lookup_surfaces_error() {
        let mut ctrl = FetchController::new(Duration::ZERO);
        ctrl.set_locator(LOCATOR_A, |_| async {
            Err::<u32, _>(FetchError::HttpStatus(404))
        });
        settle(&mut ctrl).await;

        let FetchState::Failed { error } = ctrl.state() else {
            panic!("expected Failed, got {:?}", ctrl.state());
        };
        assert_eq!(*error, FetchError::HttpStatus(404));
        assert!(error.to_string().contains("404"));
    }

    #[tokio::test]
    async fn refetch_keeps_previous_value_until_success() {
        let mut ctrl = FetchController::new(Duration::ZERO);
        ctrl.set_locator(LOCATOR_A, |_| async { Ok(1u32) });
        settle(&mut ctrl).await;
        assert_eq!(*ctrl.state(), FetchState::Succeeded { value: 1 });

        ctrl.set_locator(LOCATOR_B, |_| async { Ok(2u32) });
        // Old payload remains visible while the new request runs
        assert_eq!(*ctrl.state(), FetchState::Refetching { previous: 1 });
        assert_eq!(ctrl.state().value(), Some(&1));

        settle(&mut ctrl).await;
        assert_eq!(*ctrl.state(), FetchState::Succeeded { value: 2 });
    }

    #[tokio::test]
    async fn refetch_error_drops_previous_value() {
        let mut ctrl = FetchController::new(Duration::ZERO);
        ctrl.set_locator(LOCATOR_A, |_| async { Ok(1u32) });
        settle(&mut ctrl).await;

        ctrl.set_locator(LOCATOR_B, |_| async {
            Err::<u32, _>(FetchError::Transport("connection reset".to_string()))
        });
        settle(&mut ctrl).await;

        assert_eq!(
            *ctrl.state(),
            FetchState::Failed {
                error: FetchError::Transport("connection reset".to_string())
            }
        );
        assert_eq!(ctrl.state().value(), None);
    }

    #[tokio::test]
    async fn latest_locator_wins_rapid_changes() {
        let mut ctrl = FetchController::new(Duration::ZERO);
        ctrl.set_locator(LOCATOR_A, |_| async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(1u32)
        });
        ctrl.set_locator(LOCATOR_B, |_| async { Ok(2u32) });
        settle(&mut ctrl).await;
        assert_eq!(*ctrl.state(), FetchState::Succeeded { value: 2 });

        // Give the first lookup's schedule time to have fired; its outcome
        // must never be applied
        tokio::time::sleep(Duration::from_millis(80)).await;
        ctrl.poll();
        assert_eq!(*ctrl.state(), FetchState::Succeeded { value: 2 });
    }

    #[tokio::test]
    async fn clearing_locator_suppresses_late_outcome() {
        let mut ctrl = FetchController::new(Duration::ZERO);
        ctrl.set_locator(LOCATOR_A, |_| async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(9u32)
        });
        assert_eq!(*ctrl.state(), FetchState::Loading);

        ctrl.set_locator("", |_| async { Ok(0u32) });
        assert_eq!(*ctrl.state(), FetchState::Uninitialized);

        tokio::time::sleep(Duration::from_millis(80)).await;
        ctrl.poll();
        assert_eq!(*ctrl.state(), FetchState::Uninitialized);
        assert!(!ctrl.in_flight());
    }

    #[tokio::test]
    async fn unchanged_locator_does_not_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut ctrl = FetchController::new(Duration::ZERO);

        let counter = Arc::clone(&calls);
        ctrl.set_locator(LOCATOR_A, move |_| async move {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(1u32)
        });
        settle(&mut ctrl).await;

        let counter = Arc::clone(&calls);
        ctrl.set_locator(LOCATOR_A, move |_| async move {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(1u32)
        });
        assert!(!ctrl.in_flight());
        assert_eq!(*ctrl.state(), FetchState::Succeeded { value: 1 });
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn reduce_start_from_empty_states_is_loading() {
        for state in [
            FetchState::<u32>::Uninitialized,
            FetchState::Loading,
            FetchState::Failed {
                error: FetchError::Decode,
            },
        ] {
            assert_eq!(reduce(state, FetchAction::Start), FetchState::Loading);
        }
    }

    #[test]
    fn reduce_start_from_held_value_is_refetching() {
        assert_eq!(
            reduce(FetchState::Succeeded { value: 3u32 }, FetchAction::Start),
            FetchState::Refetching { previous: 3 }
        );
        assert_eq!(
            reduce(FetchState::Refetching { previous: 3u32 }, FetchAction::Start),
            FetchState::Refetching { previous: 3 }
        );
    }

    #[test]
    fn reduce_terminal_actions_replace_state() {
        assert_eq!(
            reduce(FetchState::Refetching { previous: 3u32 }, FetchAction::Success(4)),
            FetchState::Succeeded { value: 4 }
        );
        assert_eq!(
            reduce(
                FetchState::Refetching { previous: 3u32 },
                FetchAction::Error(FetchError::HttpStatus(500)),
            ),
            FetchState::Failed {
                error: FetchError::HttpStatus(500)
            }
        );
    }

    #[test]
    fn error_messages_match_user_facing_text() {
        assert_eq!(FetchError::InvalidLocator.to_string(), "Invalid URL provided");
        assert_eq!(FetchError::HttpStatus(404).to_string(), "api returned 404");
        assert_eq!(
            FetchError::Transport("unknown error".to_string()).to_string(),
            "unknown error"
        );
    }
}
