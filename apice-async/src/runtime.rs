//! Runtime utilities that abstract over the underlying async executor.
//!
//! On native targets every entry point runs inside a Tokio current-thread
//! runtime with a `LocalSet`, so `task::spawn_local` works and `!Send` state
//! (`Rc<RefCell<..>>`) can be shared between tasks. For WebAssembly targets we
//! provide a LocalPool-based implementation for immediately-ready futures.

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
use tokio::runtime::Builder;
#[cfg(not(target_arch = "wasm32"))]
use tokio::task::LocalSet;

/// Runs the provided future to completion on a single-threaded runtime.
///
/// Tasks spawned with [`crate::task::spawn_local`] while the future runs share
/// the same thread and are driven in FIFO order. Tasks still pending when the
/// future completes are dropped.
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("apice_async::runtime::block_on: failed to build Tokio runtime");

    LocalSet::new().block_on(&runtime, future)
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use crate::wasm::runtime::block_on;

#[cfg(test)]
#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_block_on_returns_output() {
        assert_eq!(block_on(async { 21 * 2 }), 42);
    }

    #[test]
    fn test_block_on_drives_local_tasks() {
        let counter = Rc::new(Cell::new(0));
        let observed = Rc::clone(&counter);

        let result = block_on(async move {
            let handle = crate::task::spawn_local(async move {
                observed.set(observed.get() + 1);
                "done"
            });
            handle.await
        });

        assert_eq!(result.ok(), Some("done"));
        assert_eq!(counter.get(), 1);
    }
}
