//! # Apice Core
//!
//! Coordination primitives for the apice UI core:
//! - [`join`]: aggregate a dynamic set of asynchronous operations into one outcome
//! - [`modal`]: serialize access to an exclusive resource, strictly FIFO
//! - [`dialog`]: modal dialogs built on both, over a pluggable rendering surface
//! - Logging and configuration infrastructure
//!
//! ## Overview
//!
//! Everything here runs on a single-threaded cooperative executor
//! ([`apice_async`]): state is shared through `Rc`, never locked, and a
//! bound operation or reaction never runs inline with the call that
//! registered it.

pub mod config;
pub mod dialog;
pub mod error;
pub mod id;
pub mod join;
pub mod logging;
pub mod modal;

pub use config::DialogConfig;
pub use dialog::{ButtonSpec, Dialog, DialogHost, DialogSpec, DialogStyle, DialogSurface};
pub use error::{Error, Result};
pub use join::JoinCoordinator;
pub use modal::{Grant, ModalScheduler, Release};
