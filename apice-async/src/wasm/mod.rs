//! WASM-specific runtime implementations.
//!
//! Provides the single-threaded pieces that match the native API surface so
//! that the coordination core compiles unchanged for the browser.
//!
//! # Key differences from native:
//!
//! - `spawn_local` goes through `wasm_bindgen_futures` and returns a
//!   `JoinHandle` backed by a oneshot channel
//! - `next_turn` is a zero-delay `setTimeout`, i.e. a real event-loop turn
//! - `block_on` only works for futures that need no browser event

pub mod runtime;
pub mod task;
