//! Workspace facade crate.
//!
//! Host applications can depend on `apice` alone instead of wiring the
//! individual workspace crates: the coordination core (`apice-core`) is
//! re-exported at the root and the async layer is available as
//! [`asynchronous`].

pub use apice_async as asynchronous;
pub use apice_core::*;
