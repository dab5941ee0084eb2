//! Time-related abstractions.
//!
//! - On native platforms: `tokio::time::sleep`
//! - On WASM: `gloo-timers` (the browser's `setTimeout`)
//!
//! Dialog surfaces use [`sleep`] to wait for CSS transitions they cannot
//! observe directly; tests use it to simulate slow animations.

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::sleep;

pub use std::time::Duration;

#[cfg(target_arch = "wasm32")]
/// Sleeps for the specified duration using the browser's `setTimeout`.
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}
