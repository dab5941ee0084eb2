//! # Join Coordinator
//!
//! Aggregates an open-ended set of asynchronous operations into one outcome.
//!
//! ## Overview
//!
//! Unlike a fixed-arity "wait for all", operations are bound one at a time,
//! whenever the caller discovers them (often from inside another bound
//! operation). The aggregate outcome settles exactly once:
//!
//! - successfully, when every bound operation has resolved;
//! - with the first failure's error, as soon as any bound operation fails.
//!
//! Aggregate settlement is deferred by one cooperative turn
//! ([`apice_async::next_turn`]), so reactions attached to an operation's
//! derived handle always run before the aggregate reactions fired by that
//! same operation.
//!
//! Binding after the outcome has settled is allowed: the operation is counted
//! and its derived handle works, but the aggregate never re-settles.
//!
//! ## Usage
//!
//! ```
//! use apice_async::runtime;
//! use apice_core::join::JoinCoordinator;
//!
//! runtime::block_on(async {
//!     let panel = JoinCoordinator::<String>::new();
//!     panel.bind(Some(async { Ok::<_, String>("header") }));
//!     panel.bind(Some(async { Ok::<_, String>("rows") }));
//!
//!     assert_eq!(panel.wait().await, Ok(()));
//!     assert!(panel.is_resolved());
//! });
//! ```

use crate::id::short_id;
use apice_async::task::{self, JoinHandle};
use apice_async::Completion;
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counters {
    bound: usize,
    resolved: usize,
    failed: usize,
}

impl Counters {
    fn is_bound(&self) -> bool {
        self.bound > 0
    }

    fn is_completed(&self) -> bool {
        self.is_bound() && self.resolved + self.failed == self.bound
    }

    fn is_resolved(&self) -> bool {
        self.is_completed() && self.failed == 0
    }

    fn is_failed(&self) -> bool {
        self.is_bound() && self.failed > 0
    }
}

/// Dynamic-arity join over asynchronous operations.
///
/// Clones share the same counters and outcome, so a clone can be moved into
/// a bound operation to bind nested work.
pub struct JoinCoordinator<E> {
    id: Rc<str>,
    counters: Rc<Cell<Counters>>,
    outcome: Completion<(), E>,
}

impl<E: Clone + 'static> JoinCoordinator<E> {
    pub fn new() -> Self {
        let id: Rc<str> = Rc::from(format!("join_{}", short_id()));
        debug!(target: "apice::join", coordinator = %id, "Join coordinator created");
        Self {
            id,
            counters: Rc::new(Cell::new(Counters::default())),
            outcome: Completion::new(),
        }
    }

    /// Binds an operation to the aggregate outcome.
    ///
    /// The operation is spawned on the local executor and counted as bound
    /// right away. The returned handle settles with the operation's own
    /// result, after the counters reflect it.
    ///
    /// Passing `None` only logs a warning: nothing is counted and `None` is
    /// returned.
    pub fn bind<F, T>(&self, operation: Option<F>) -> Option<Completion<T, E>>
    where
        F: Future<Output = std::result::Result<T, E>> + 'static,
        T: Clone + 'static,
    {
        let Some(operation) = operation else {
            warn!(
                target: "apice::join",
                coordinator = %self.id,
                "bind invoked without an operation"
            );
            return None;
        };

        let operation_id = short_id();
        self.update(|counters| counters.bound += 1);
        debug!(
            target: "apice::join",
            coordinator = %self.id,
            operation = %operation_id,
            "Operation bound"
        );
        if self.outcome.is_settled() {
            debug!(
                target: "apice::join",
                coordinator = %self.id,
                operation = %operation_id,
                "Aggregate already settled; late operation is only counted"
            );
        }

        let derived = Completion::new();
        let settled = derived.clone();
        let coordinator = self.clone();

        task::spawn_local(async move {
            let result = operation.await;
            let failure = result.as_ref().err().cloned();
            let counters = coordinator.update(|counters| match failure {
                Some(_) => counters.failed += 1,
                None => counters.resolved += 1,
            });
            settled.settle(result);

            match failure {
                None => {
                    debug!(
                        target: "apice::join",
                        coordinator = %coordinator.id,
                        operation = %operation_id,
                        "Operation resolved"
                    );
                    if counters.is_resolved() {
                        coordinator.resolve_next_turn();
                    }
                }
                Some(error) => {
                    debug!(
                        target: "apice::join",
                        coordinator = %coordinator.id,
                        operation = %operation_id,
                        "Operation rejected"
                    );
                    coordinator.reject_next_turn(error);
                }
            }
        });

        Some(derived)
    }

    /// Registers a reaction for aggregate success.
    pub fn then<F>(&self, on_success: F) -> JoinHandle<()>
    where
        F: FnOnce() + 'static,
    {
        debug!(target: "apice::join", coordinator = %self.id, "Registering then-reaction");
        self.outcome.then(move |()| on_success())
    }

    /// Registers a reaction for aggregate failure; it receives the first
    /// failure's error.
    pub fn catch<F>(&self, on_failure: F) -> JoinHandle<()>
    where
        F: FnOnce(E) + 'static,
    {
        debug!(target: "apice::join", coordinator = %self.id, "Registering catch-reaction");
        self.outcome.catch(on_failure)
    }

    /// Waits for the aggregate outcome.
    ///
    /// Never completes while nothing has been bound.
    pub async fn wait(&self) -> std::result::Result<(), E> {
        self.outcome.wait().await
    }

    /// Aggregate completion cell (shared, read-only use intended).
    pub fn outcome(&self) -> Completion<(), E> {
        self.outcome.clone()
    }

    // Re-checked at settle time: a bind that happened during the deferral
    // keeps the aggregate open until that operation settles too.
    fn resolve_next_turn(&self) {
        let coordinator = self.clone();
        task::spawn_local(async move {
            task::next_turn().await;
            if coordinator.counters.get().is_resolved() && coordinator.outcome.resolve(()) {
                debug!(target: "apice::join", coordinator = %coordinator.id, "Aggregate resolved");
            }
        });
    }

    fn reject_next_turn(&self, error: E) {
        let coordinator = self.clone();
        task::spawn_local(async move {
            task::next_turn().await;
            if coordinator.outcome.reject(error) {
                debug!(target: "apice::join", coordinator = %coordinator.id, "Aggregate rejected");
            }
        });
    }
}

impl<E> JoinCoordinator<E> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of operations ever bound.
    pub fn bound(&self) -> usize {
        self.counters.get().bound
    }

    /// Number of bound operations that resolved.
    pub fn resolved(&self) -> usize {
        self.counters.get().resolved
    }

    /// Number of bound operations that failed.
    pub fn failed(&self) -> usize {
        self.counters.get().failed
    }

    pub fn is_bound(&self) -> bool {
        self.counters.get().is_bound()
    }

    /// All bound operations settled, successfully or not.
    pub fn is_completed(&self) -> bool {
        self.counters.get().is_completed()
    }

    /// All bound operations settled and none failed.
    pub fn is_resolved(&self) -> bool {
        self.counters.get().is_resolved()
    }

    /// At least one bound operation failed.
    pub fn is_failed(&self) -> bool {
        self.counters.get().is_failed()
    }

    fn update(&self, change: impl FnOnce(&mut Counters)) -> Counters {
        let mut counters = self.counters.get();
        change(&mut counters);
        self.counters.set(counters);
        counters
    }
}

impl<E> Clone for JoinCoordinator<E> {
    fn clone(&self) -> Self {
        Self {
            id: Rc::clone(&self.id),
            counters: Rc::clone(&self.counters),
            outcome: self.outcome.clone(),
        }
    }
}

impl<E: Clone + 'static> Default for JoinCoordinator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for JoinCoordinator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counters = self.counters.get();
        f.debug_struct("JoinCoordinator")
            .field("id", &self.id)
            .field("bound", &counters.bound)
            .field("resolved", &counters.resolved)
            .field("failed", &counters.failed)
            .field("outcome", &self.outcome)
            .finish()
    }
}
