//! WASM-specific runtime implementation.

use std::future::Future;

/// Drives a future to completion on a `LocalPool`.
///
/// # Critical Limitation
///
/// **WASM cannot truly block.** This only completes futures that need nothing
/// from the browser: already-settled `Completion`s, pure computation, ready
/// channels. Anything awaiting `next_turn`, `sleep` or a task spawned through
/// `wasm_bindgen_futures` hangs forever. Async entry points and tests should
/// stay `async` instead; `#[apice_async::test]` does that for you on WASM.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future + 'static,
    F::Output: 'static,
{
    use futures::executor::LocalPool;

    let mut pool = LocalPool::new();
    pool.run_until(future)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Completion;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_block_on_settled_completion() {
        let cell: Completion<u32, ()> = Completion::resolved(42);
        let result = block_on(cell.wait());
        assert_eq!(result, Ok(42));
    }
}
