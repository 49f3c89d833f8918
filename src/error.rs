//! Application-wide error types.
//!
//! [`Error`] is what library backends and the controller return. Pure
//! modules keep their own `thiserror` types (`AlbumError`, `FitError`,
//! `DecodeError`), while CLI/main uses `anyhow` for convenient error
//! propagation.
//!
//! # Example
//!
//! ```ignore
//! use argos::error::{Result, ResultExt};
//!
//! fn read_snapshot(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_context("reading snapshot")
//! }
//! ```

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Library backend error
    #[error("Library error: {0}")]
    Library(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a library error.
    pub fn library(message: impl Into<String>) -> Self {
        Self::Library(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Json(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_context() {
        let result = std::fs::read("/nonexistent/library.json");
        let err = result.with_context("reading snapshot").unwrap_err();
        assert!(matches!(err, Error::WithContext { .. }));
        assert!(err.to_string().starts_with("reading snapshot: IO error"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::library("connection refused").context("while browsing albums");
        let msg = err.to_string();
        assert!(msg.contains("while browsing albums"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_result_ext_on_json() {
        let result: std::result::Result<u32, serde_json::Error> = serde_json::from_str("nope");
        let err = result.with_context("reading snapshot").unwrap_err();
        assert!(err.to_string().starts_with("reading snapshot"));
    }
}
