//! WASM-specific task spawning implementation.
//!
//! Provides a `spawn_local` that returns an awaitable `JoinHandle`, matching
//! the Tokio API surface used on native targets.

use futures::channel::oneshot;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// An error returned when a task cannot report its output.
///
/// Mirrors `tokio::task::JoinError` closely enough for `?` and `unwrap` to
/// read the same on both targets.
#[derive(Debug, Clone)]
pub struct JoinError {
    _private: (),
}

impl JoinError {
    fn cancelled() -> Self {
        Self { _private: () }
    }

    /// Always true: the only way a task fails to report is being dropped.
    pub fn is_cancelled(&self) -> bool {
        true
    }

    /// Panics abort the module on WASM, so this is never observed.
    pub fn is_panic(&self) -> bool {
        false
    }
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task was cancelled")
    }
}

impl std::error::Error for JoinError {}

/// A handle to a task spawned with [`spawn_local`].
pub struct JoinHandle<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T> Future for JoinHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(output)) => Poll::Ready(Ok(output)),
            // Sender dropped without sending
            Poll::Ready(Err(_)) => Poll::Ready(Err(JoinError::cancelled())),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Spawns a task on the browser's microtask queue.
///
/// Dropping the returned handle detaches the task; it keeps running.
pub fn spawn_local<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    let (sender, receiver) = oneshot::channel();

    wasm_bindgen_futures::spawn_local(async move {
        let output = future.await;
        let _ = sender.send(output);
    });

    JoinHandle { receiver }
}

/// Yields to the browser event loop for one turn.
///
/// A 0ms timeout runs after every queued microtask, so all reactions that are
/// already scheduled complete before the caller resumes.
pub async fn next_turn() {
    gloo_timers::future::TimeoutFuture::new(0).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_spawn_local_returns_value() {
        let handle = spawn_local(async { 42 });
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[wasm_bindgen_test]
    async fn test_next_turn_after_microtasks() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let deferred = Rc::clone(&log);
        let late = spawn_local(async move {
            next_turn().await;
            deferred.borrow_mut().push("deferred");
        });
        let direct = Rc::clone(&log);
        let early = spawn_local(async move {
            direct.borrow_mut().push("direct");
        });

        early.await.unwrap();
        late.await.unwrap();
        assert_eq!(*log.borrow(), vec!["direct", "deferred"]);
    }
}
