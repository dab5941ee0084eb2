//! Local task spawning and cooperative turn deferral.
//!
//! All tasks live on the current thread:
//! - On native platforms: `tokio::task::spawn_local` inside the `LocalSet`
//!   installed by [`crate::runtime::block_on`]
//! - On WASM: `wasm_bindgen_futures::spawn_local` with an awaitable `JoinHandle`
//!
//! # Ordering
//!
//! Woken tasks run in the order they were woken. [`next_turn`] suspends the
//! caller until every task that was already runnable has had a chance to run,
//! which is how "do this after the current reactions" is expressed.
//!
//! # Examples
//!
//! ```rust
//! use apice_async::{runtime, task};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! runtime::block_on(async {
//!     let log = Rc::new(RefCell::new(Vec::new()));
//!
//!     let deferred = Rc::clone(&log);
//!     let late = task::spawn_local(async move {
//!         task::next_turn().await;
//!         deferred.borrow_mut().push("deferred");
//!     });
//!     let direct = Rc::clone(&log);
//!     let early = task::spawn_local(async move {
//!         direct.borrow_mut().push("direct");
//!     });
//!
//!     early.await.unwrap();
//!     late.await.unwrap();
//!     assert_eq!(*log.borrow(), vec!["direct", "deferred"]);
//! });
//! ```

use std::future::Future;

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{JoinError, JoinHandle};

#[cfg(not(target_arch = "wasm32"))]
use std::pin::Pin;
#[cfg(not(target_arch = "wasm32"))]
use std::task::{Context, Poll};

/// Spawns a `!Send` task on the current thread.
///
/// # Panics
///
/// Panics when called outside of [`crate::runtime::block_on`] (there is no
/// `LocalSet` to run the task on).
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_local<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    tokio::task::spawn_local(future)
}

/// Suspends the caller for exactly one scheduling turn.
///
/// The task re-schedules itself at the back of the local run queue, so every
/// task that is already runnable is polled before the caller resumes.
#[cfg(not(target_arch = "wasm32"))]
pub async fn next_turn() {
    NextTurn { yielded: false }.await
}

#[cfg(not(target_arch = "wasm32"))]
struct NextTurn {
    yielded: bool,
}

#[cfg(not(target_arch = "wasm32"))]
impl Future for NextTurn {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use crate::wasm::task::{next_turn, spawn_local, JoinError, JoinHandle};

// ============================================================================
// Common Types
// ============================================================================

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::runtime::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_spawn_local_runs_in_fifo_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&log);

        block_on(async move {
            let handles: Vec<_> = (0..4)
                .map(|index| {
                    let log = Rc::clone(&recorded);
                    spawn_local(async move { log.borrow_mut().push(index) })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap();
            }
        });

        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_next_turn_runs_after_runnable_tasks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&log);

        block_on(async move {
            let first = Rc::clone(&recorded);
            let deferred = spawn_local(async move {
                first.borrow_mut().push("first-start");
                next_turn().await;
                first.borrow_mut().push("first-resumed");
            });
            let second = Rc::clone(&recorded);
            let plain = spawn_local(async move {
                second.borrow_mut().push("second");
            });
            deferred.await.unwrap();
            plain.await.unwrap();
        });

        assert_eq!(
            *log.borrow(),
            vec!["first-start", "second", "first-resumed"]
        );
    }
}
