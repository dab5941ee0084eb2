use thiserror::Error;

/// Errors produced by the coordination core and its collaborators.
///
/// `Clone` because a failure is delivered to every observer of a
/// [`apice_async::Completion`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dialog surface error: {0}")]
    Surface(String),

    #[error("Close listener failed: {0}")]
    Listener(String),
}

pub type Result<T> = std::result::Result<T, Error>;
