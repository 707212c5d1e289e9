//! # Todolists Runtime
//!
//! The Store runtime that coordinates reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, serializes reducer calls, executes effects
//! - **`EffectHandle`**: lets a caller wait for the effects of one action
//! - **Action broadcast**: every action produced by an effect is published to
//!   observers after it has been reduced
//! - **Waiters**: [`Store::send_and_wait_for`] callers are resolved directly
//!   from the effect that produced their action, independent of the broadcast
//!
//! ## Example
//!
//! ```ignore
//! use todolists_runtime::Store;
//!
//! let store = Store::new(RootState::default(), TodolistsReducer::new(), environment);
//!
//! // Send an action
//! store.send(TodolistsAction::FetchTodolists { request_id }).await?;
//!
//! // Read state
//! let count = store.state(|s| s.todolists.len()).await;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use todolists_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action or for effects to finish
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Default capacity of the action broadcast channel.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. Counts the effects started by one action;
/// [`EffectHandle::wait`] returns once each of them finished and the action it
/// produced (if any) went through the reducer.
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };
        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            // All trackers dropped means nothing can still be running.
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: effect counter shared between a handle and running effects
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Runs even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: a caller waiting for the first action matching its predicate
struct Waiter<A> {
    predicate: Box<dyn Fn(&A) -> bool + Send + Sync>,
    tx: tokio::sync::oneshot::Sender<A>,
}

/// Internal: registered waiters keyed by registration id
type Waiters<A> = Arc<Mutex<HashMap<u64, Waiter<A>>>>;

fn lock_waiters<A>(waiters: &Waiters<A>) -> std::sync::MutexGuard<'_, HashMap<u64, Waiter<A>>> {
    waiters.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Internal: RAII guard that unregisters a waiter on drop
///
/// Covers timeouts, failed sends and cancelled callers alike.
struct WaiterGuard<A> {
    waiters: Waiters<A>,
    id: u64,
}

impl<A> Drop for WaiterGuard<A> {
    fn drop(&mut self) {
        lock_waiters(&self.waiters).remove(&self.id);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicU64, AtomicUsize, DEFAULT_BROADCAST_CAPACITY,
        DecrementGuard, Duration, Effect, EffectHandle, EffectTracking, HashMap, Mutex,
        Ordering, Reducer, RwLock, StoreError, Waiter, WaiterGuard, Waiters, lock_waiters,
    };
    use tokio::sync::broadcast;

    /// Where an action entering the store came from
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Origin {
        /// Sent by a caller through the public API
        External,
        /// Produced by an effect (feedback loop)
        Effect,
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; reducer calls never interleave)
    /// 2. Reducer (all state transitions)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a store is cheap and every clone shares the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Actions produced by effects, published after they were reduced.
        action_broadcast: broadcast::Sender<A>,
        waiters: Waiters<A>,
        next_waiter: Arc<AtomicU64>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
                waiters: Arc::new(Mutex::new(HashMap::new())),
                next_waiter: Arc::new(AtomicU64::new(0)),
            }
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown
        ///
        /// New actions are rejected from now on. Actions produced by effects
        /// that are already running are still reduced, so in-flight requests
        /// land in state before the store goes quiet.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
        /// when the timeout expires.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timed out");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Starts the returned effects in spawned tasks
        ///
        /// Returns once effects are started, not finished; use the returned
        /// [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            self.send_internal(action, Origin::External).await
        }

        /// Send an action and wait for a matching action produced by its effects
        ///
        /// Registers a waiter *before* sending, so the result cannot be
        /// missed. Each waiter has its own channel: however many callers wait
        /// at once, none of them loses its action the way a lagging broadcast
        /// subscriber would. The matching action has already been reduced when
        /// it is returned.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action within `timeout`
        /// - [`StoreError::ChannelClosed`]: the waiter was dropped unresolved
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool + Send + Sync + 'static,
        {
            let (tx, rx) = tokio::sync::oneshot::channel();
            let id = self.next_waiter.fetch_add(1, Ordering::Relaxed);
            lock_waiters(&self.waiters).insert(
                id,
                Waiter {
                    predicate: Box::new(predicate),
                    tx,
                },
            );
            let _guard = WaiterGuard {
                waiters: Arc::clone(&self.waiters),
                id,
            };

            self.send(action).await?;

            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(action)) => Ok(action),
                Ok(Err(_)) => Err(StoreError::ChannelClosed),
                Err(_) => Err(StoreError::Timeout),
            }
        }

        /// Number of callers currently blocked in [`Store::send_and_wait_for`]
        #[must_use]
        pub fn pending_waiters(&self) -> usize {
            lock_waiters(&self.waiters).len()
        }

        /// Hands a reduced action to every waiter whose predicate matches it
        fn resolve_waiters(&self, action: &A) {
            let mut waiters = lock_waiters(&self.waiters);
            let matched: Vec<u64> = waiters
                .iter()
                .filter(|(_, waiter)| (waiter.predicate)(action))
                .map(|(id, _)| *id)
                .collect();

            for id in matched {
                if let Some(waiter) = waiters.remove(&id) {
                    let _ = waiter.tx.send(action.clone());
                }
            }
        }

        /// Subscribe to every action produced by effects
        ///
        /// Actions sent directly through [`Store::send`] are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todolists.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        async fn send_internal(&self, action: A, origin: Origin) -> Result<EffectHandle, StoreError> {
            if origin == Origin::External && self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }

            Ok(handle)
        }

        /// Execute an effect with tracking
        ///
        /// Effect failures are isolated: a panicking effect task is logged by
        /// tokio and the counters are still released by the guards.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into tasks
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let guard = DecrementGuard(tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let _pending_guard = pending_guard;

                        let Some(action) = fut.await else {
                            tracing::trace!("Effect::Future completed with no action");
                            return;
                        };

                        // Reduce first: observers must see the post-action state.
                        match store.send_internal(action.clone(), Origin::Effect).await {
                            Ok(_) => {
                                store.resolve_waiters(&action);
                                let _ = store.action_broadcast.send(action);
                            },
                            Err(error) => {
                                tracing::warn!(%error, "Dropped action produced by effect");
                            },
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking.clone());
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    tracking.increment();

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let guard = DecrementGuard(tracking);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let _pending_guard = pending_guard;

                        for effect in effects {
                            let (mut step, step_tracking) = EffectHandle::new();
                            store.execute_effect(effect, step_tracking);
                            step.wait().await;
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
                waiters: Arc::clone(&self.waiters),
                next_waiter: Arc::clone(&self.next_waiter),
            }
        }
    }
}

pub use store::Store;
