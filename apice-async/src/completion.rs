//! Single-assignment completion cell.
//!
//! A [`Completion`] is a result slot that settles at most once, to success or
//! failure, and that any number of tasks can await. Clones share the slot, so
//! one side can hand out a clone to observers while keeping another to settle
//! it later (the "deferred" pattern).
//!
//! Uses `Rc<RefCell<>>` for interior mutability and queues `Waker`s instead of
//! polling; it is `!Send` by construction.

use crate::task::{self, JoinHandle};
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Shared state for the completion cell
struct CompletionState<T, E> {
    /// The settled result, if any
    result: Option<Result<T, E>>,
    /// Tasks waiting for settlement
    waiters: Vec<Waker>,
}

/// A single-assignment asynchronous result slot.
///
/// # Examples
///
/// ```
/// use apice_async::{runtime, Completion};
///
/// runtime::block_on(async {
///     let cell: Completion<&str, String> = Completion::new();
///     assert!(cell.resolve("first"));
///     assert!(!cell.reject("ignored".to_string()));
///     assert_eq!(cell.wait().await, Ok("first"));
/// });
/// ```
pub struct Completion<T, E> {
    state: Rc<RefCell<CompletionState<T, E>>>,
}

impl<T, E> Completion<T, E> {
    /// Creates a pending cell.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(CompletionState {
                result: None,
                waiters: Vec::new(),
            })),
        }
    }

    /// Creates a cell that is already resolved with `value`.
    pub fn resolved(value: T) -> Self {
        let cell = Self::new();
        cell.resolve(value);
        cell
    }

    /// Creates a cell that is already rejected with `error`.
    pub fn rejected(error: E) -> Self {
        let cell = Self::new();
        cell.reject(error);
        cell
    }

    /// Settles the cell with `result`.
    ///
    /// Returns `false` (and drops `result`) when the cell was already settled.
    pub fn settle(&self, result: Result<T, E>) -> bool {
        let mut state = self.state.borrow_mut();
        if state.result.is_some() {
            return false;
        }
        state.result = Some(result);

        let waiters = std::mem::take(&mut state.waiters);
        drop(state); // Drop borrow before waking

        for waker in waiters {
            waker.wake();
        }
        true
    }

    /// Settles the cell successfully. See [`Completion::settle`].
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settles the cell with a failure. See [`Completion::settle`].
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().result.is_some()
    }

    pub fn is_pending(&self) -> bool {
        !self.is_settled()
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state.borrow().result, Some(Ok(_)))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.state.borrow().result, Some(Err(_)))
    }
}

impl<T: Clone, E: Clone> Completion<T, E> {
    /// Returns a copy of the settled result without waiting.
    pub fn peek(&self) -> Option<Result<T, E>> {
        self.state.borrow().result.clone()
    }

    /// Returns a future that completes with a copy of the settled result.
    ///
    /// The future owns a handle to the cell, so it can outlive `self`.
    pub fn wait(&self) -> Settled<T, E> {
        Settled {
            completion: self.clone(),
            slot: None,
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Completion<T, E> {
    /// Registers a reaction that runs with the value once the cell resolves.
    ///
    /// The reaction runs in its own local task, never inline with the call
    /// that settled the cell. The returned handle completes after the reaction
    /// ran, or immediately after settlement if the cell was rejected.
    pub fn then<F>(&self, on_success: F) -> JoinHandle<()>
    where
        F: FnOnce(T) + 'static,
    {
        let settled = self.wait();
        task::spawn_local(async move {
            if let Ok(value) = settled.await {
                on_success(value);
            }
        })
    }

    /// Registers a reaction that runs with the error once the cell rejects.
    ///
    /// Same scheduling rules as [`Completion::then`].
    pub fn catch<F>(&self, on_failure: F) -> JoinHandle<()>
    where
        F: FnOnce(E) + 'static,
    {
        let settled = self.wait();
        task::spawn_local(async move {
            if let Err(error) = settled.await {
                on_failure(error);
            }
        })
    }
}

impl<T, E> Clone for Completion<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T, E> Default for Completion<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for Completion<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        let status = match &state.result {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "rejected",
        };
        f.debug_struct("Completion")
            .field("status", &status)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

/// Future returned by [`Completion::wait`].
pub struct Settled<T, E> {
    completion: Completion<T, E>,
    /// Index of our waker in the waiter list once registered
    slot: Option<usize>,
}

impl<T: Clone, E: Clone> Future for Settled<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.completion.state.borrow_mut();

        if let Some(result) = &state.result {
            return Poll::Ready(result.clone());
        }

        // Waiters are only drained on settlement, so the slot stays valid
        // for as long as the cell is pending.
        let slot = match self.slot {
            Some(index) => {
                if let Some(waker) = state.waiters.get_mut(index) {
                    if !waker.will_wake(cx.waker()) {
                        *waker = cx.waker().clone();
                    }
                }
                index
            }
            None => {
                state.waiters.push(cx.waker().clone());
                state.waiters.len() - 1
            }
        };

        drop(state);
        self.slot = Some(slot);
        Poll::Pending
    }
}
