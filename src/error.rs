use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A host call needed to set up the listener failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {} (os error {code})", describe(.code))]
pub struct PlatformError {
    pub operation: &'static str,
    pub code: u32,
}

/// A best-effort release call failed. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} could not release its resource: {} (os error {code})", describe(.code))]
pub struct ResourceError {
    pub operation: &'static str,
    pub code: u32,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("failed to spawn the listener thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("listener thread exited before finishing setup")]
    SetupAborted,
    #[error("session notifications are only available on Windows")]
    Unsupported,
}

#[cfg(windows)]
impl PlatformError {
    /// Captures GetLastError() for `operation`.
    pub fn last(operation: &'static str) -> Self {
        Self {
            operation,
            code: crate::wynapi::last_error(),
        }
    }
}

#[cfg(windows)]
impl ResourceError {
    pub fn last(operation: &'static str) -> Self {
        Self {
            operation,
            code: crate::wynapi::last_error(),
        }
    }
}

/// Names for the error codes these calls are documented to produce.
fn describe(code: &u32) -> &'static str {
    match *code {
        5 => "ACCESS_DENIED",
        6 => "INVALID_HANDLE",
        87 => "INVALID_PARAMETER",
        127 => "PROC_NOT_FOUND",
        998 => "NOACCESS",
        1400 => "INVALID_WINDOW_HANDLE",
        1407 => "CANNOT_FIND_WND_CLASS",
        1408 => "WINDOW_OF_OTHER_THREAD",
        1410 => "CLASS_ALREADY_EXISTS",
        1717 => "RPC_S_UNKNOWN_IF",
        _ => "unrecognised",
    }
}
