//! Single-threaded async layer for the apice UI core.
//!
//! Everything the coordination core does happens on one logical thread:
//! concurrency is the interleaving of continuations, never parallelism. This
//! crate gives that model one API on both targets:
//! - Native platforms: a Tokio current-thread runtime driving a `LocalSet`
//! - WebAssembly: the browser event loop through `wasm-bindgen-futures`
//!
//! # Modules
//!
//! - `task`: local task spawning and [`task::next_turn`] deferral
//! - `time`: sleeping (used by surfaces to simulate or await transitions)
//! - `runtime`: `block_on` for entry points and tests
//! - `completion`: the single-assignment [`Completion`] cell
//!
//! # Examples
//!
//! ```rust
//! use apice_async::{runtime, task, Completion};
//!
//! runtime::block_on(async {
//!     let cell: Completion<u32, String> = Completion::new();
//!     let writer = cell.clone();
//!     task::spawn_local(async move {
//!         writer.resolve(42);
//!     });
//!     assert_eq!(cell.wait().await, Ok(42));
//! });
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use apice_async_macros::{main, test};

#[cfg(target_arch = "wasm32")]
pub mod test_support {
    pub use wasm_bindgen_test::wasm_bindgen_test;
}

pub mod completion;
pub mod runtime;
pub mod task;
pub mod time;

// WASM-specific implementations
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use completion::{Completion, Settled};
pub use task::{next_turn, spawn_local};
pub use time::{sleep, Duration};
