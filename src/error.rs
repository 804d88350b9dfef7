//! Shared error-code contract.
//!
//! Every layer (API, query cache, router) defines its own `thiserror` enum;
//! this trait gives each variant a grepable code and a retryable hint so the
//! error boundary and the logs can describe failures uniformly.

/// Grepable error code and retryable flag for surfaced errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
