//! # Modal Scheduler
//!
//! Serializes access to one exclusive resource (the dialog surface).
//!
//! ## Overview
//!
//! Each request moves through `Requested -> {Granted | Queued} -> Granted ->
//! Released`. A requester is granted immediately when nobody owns the
//! resource; otherwise it waits in a FIFO queue. Releasing ownership promotes
//! the head of the queue in the same step and settles its [`Grant`].
//!
//! The scheduler only orders requests. Rendering and transitions belong to
//! the caller, which finishes its teardown before calling
//! [`ModalScheduler::release`], so the next owner never overlaps it.
//!
//! One scheduler guards one resource. It is constructed explicitly and shared
//! by cloning, so tests can build as many independent instances as they need.

use apice_async::Completion;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Handle that settles once its requester owns the resource.
#[derive(Clone, Debug)]
pub struct Grant {
    cell: Completion<(), Infallible>,
}

impl Grant {
    fn granted() -> Self {
        Self {
            cell: Completion::resolved(()),
        }
    }

    fn pending() -> Self {
        Self {
            cell: Completion::new(),
        }
    }

    fn grant(&self) {
        self.cell.resolve(());
    }

    pub fn is_granted(&self) -> bool {
        self.cell.is_settled()
    }

    /// Waits until ownership is granted.
    pub async fn wait(&self) {
        // Infallible: the only possible outcome is Ok(())
        let _ = self.cell.wait().await;
    }
}

/// What a call to [`ModalScheduler::release`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release<K> {
    /// The caller was the owner; `next` is the promoted requester, if any.
    Released { next: Option<K> },
    /// The caller was still queued and has been removed from the queue.
    Withdrawn,
    /// The caller neither owned the resource nor was queued.
    Ignored,
}

struct Waiting<K> {
    requester: K,
    grant: Grant,
}

struct ModalState<K> {
    current: Option<K>,
    queue: VecDeque<Waiting<K>>,
}

/// Single-owner FIFO scheduler.
pub struct ModalScheduler<K> {
    state: Rc<RefCell<ModalState<K>>>,
}

impl<K> ModalScheduler<K>
where
    K: Clone + PartialEq + fmt::Display,
{
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ModalState {
                current: None,
                queue: VecDeque::new(),
            })),
        }
    }

    /// Requests ownership for `requester`.
    ///
    /// The returned grant is already settled when the resource was free, or
    /// when `requester` already owns it. A requester that is already queued
    /// gets its existing grant back and keeps its place.
    pub fn acquire(&self, requester: K) -> Grant {
        let mut state = self.state.borrow_mut();

        if state.current.as_ref() == Some(&requester) {
            debug!(target: "apice::modal", requester = %requester, "Requester already owns the resource");
            return Grant::granted();
        }

        if let Some(waiting) = state.queue.iter().find(|w| w.requester == requester) {
            debug!(target: "apice::modal", requester = %requester, "Requester is already queued");
            return waiting.grant.clone();
        }

        if state.current.is_none() {
            debug!(target: "apice::modal", requester = %requester, "Ownership granted");
            state.current = Some(requester);
            return Grant::granted();
        }

        let grant = Grant::pending();
        debug!(
            target: "apice::modal",
            requester = %requester,
            position = state.queue.len(),
            "Resource is owned; request queued"
        );
        state.queue.push_back(Waiting {
            requester,
            grant: grant.clone(),
        });
        grant
    }

    /// Gives up ownership, or withdraws a queued request.
    ///
    /// When `requester` is the owner, the queue head becomes the owner before
    /// this returns and its grant is settled.
    pub fn release(&self, requester: &K) -> Release<K> {
        let mut state = self.state.borrow_mut();

        if state.current.as_ref() != Some(requester) {
            let position = state.queue.iter().position(|w| &w.requester == requester);
            return match position {
                Some(index) => {
                    state.queue.remove(index);
                    debug!(target: "apice::modal", requester = %requester, "Queued request withdrawn");
                    Release::Withdrawn
                }
                None => {
                    debug!(target: "apice::modal", requester = %requester, "Release ignored; not owner nor queued");
                    Release::Ignored
                }
            };
        }

        state.current = None;
        let Some(next) = state.queue.pop_front() else {
            debug!(target: "apice::modal", requester = %requester, "Ownership released; queue is empty");
            return Release::Released { next: None };
        };

        state.current = Some(next.requester.clone());
        drop(state); // Drop borrow before waking

        debug!(
            target: "apice::modal",
            requester = %requester,
            next = %next.requester,
            "Ownership released; promoting queue head"
        );
        next.grant.grant();
        Release::Released {
            next: Some(next.requester),
        }
    }

    /// Current owner, if any.
    pub fn owner(&self) -> Option<K> {
        self.state.borrow().current.clone()
    }

    pub fn is_owner(&self, requester: &K) -> bool {
        self.state.borrow().current.as_ref() == Some(requester)
    }

    pub fn is_queued(&self, requester: &K) -> bool {
        self.state
            .borrow()
            .queue
            .iter()
            .any(|w| &w.requester == requester)
    }

    /// Queued requesters, head first.
    pub fn queued(&self) -> Vec<K> {
        self.state
            .borrow()
            .queue
            .iter()
            .map(|w| w.requester.clone())
            .collect()
    }

    pub fn queue_len(&self) -> usize {
        self.state.borrow().queue.len()
    }
}

impl<K> Clone for ModalScheduler<K> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<K> Default for ModalScheduler<K>
where
    K: Clone + PartialEq + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for ModalScheduler<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ModalScheduler")
            .field("current", &state.current)
            .field(
                "queue",
                &state.queue.iter().map(|w| &w.requester).collect::<Vec<_>>(),
            )
            .finish()
    }
}
