// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the uaprobe binary.
//!
//! Protocol failures exit with their OPC UA status code cast to `i32`.

use thiserror::Error;
use uaprobe_opcua::{OpcUaError, StatusCode};

/// Result type alias for uaprobe-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Exit code when no arguments are given.
pub const EXIT_MISSING_ARGUMENTS: i32 = 1;

/// Exit code for malformed arguments.
pub const EXIT_USAGE: i32 = 2;

/// Errors that can occur in the uaprobe binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// OPC UA failure.
    #[error(transparent)]
    OpcUa(#[from] OpcUaError),

    /// Writing command output failed.
    #[error("writing output failed")]
    Io(#[from] std::io::Error),

    /// Arguments were present but unusable.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The tokio runtime could not be started.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Error with context.
    #[error("{context}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the OPC UA status code behind this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::OpcUa(e) => e.status_code(),
            Self::Io(_) | Self::Runtime(_) => StatusCode::BAD_UNEXPECTED_ERROR,
            Self::Usage(_) => StatusCode::BAD_INVALID_ARGUMENT,
            Self::WithContext { source, .. } => source.status_code(),
        }
    }

    /// Returns the OPC UA error behind this error, if any.
    pub fn as_opcua(&self) -> Option<&OpcUaError> {
        match self {
            Self::OpcUa(e) => Some(e),
            Self::WithContext { source, .. } => source.as_opcua(),
            _ => None,
        }
    }

    /// Returns the exit code for this error.
    ///
    /// Protocol and I/O failures return their status code reinterpreted as
    /// `i32`; usage errors return [`EXIT_USAGE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::WithContext { source, .. } => source.exit_code(),
            other => other.status_code().bits() as i32,
        }
    }

    /// Returns the code handed to the operating system.
    ///
    /// Most platforms keep only the low byte, which is zero for every OPC UA
    /// status code. Codes that would read as success are mapped to 1.
    pub fn process_exit_code(&self) -> i32 {
        let code = self.exit_code();
        if code != 0 && (code & 0xFF) == 0 { 1 } else { code }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with appropriate formatting.
pub fn report_error(error: &BinError) {
    let mut messages = error_chain(error).into_iter();
    if let Some(headline) = messages.next() {
        eprintln!("Error: {}", headline);
    }
    for cause in messages {
        eprintln!("  Caused by: {}", cause);
    }

    if let Some(e) = error.as_opcua() {
        eprintln!("  Status: {} [{}]", e.status_code(), e.error_code());
        for hint in e.recovery_hints() {
            eprintln!("  Hint: {}", hint);
        }
    }
}

/// Messages of `error` and its sources, outermost first.
fn error_chain(error: &BinError) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.process_exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uaprobe_opcua::{BrowseError, ConfigurationError, ConnectionError};

    #[test]
    fn test_exit_code_is_status() {
        let err = BinError::from(OpcUaError::browse(BrowseError::bad_status(
            "ns=0;i=85",
            StatusCode::BAD_NODE_ID_UNKNOWN,
        )));
        assert_eq!(err.exit_code(), 0x8034_0000_u32 as i32);
        assert_eq!(err.process_exit_code(), 1);
    }

    #[test]
    fn test_argument_exit_codes() {
        assert_eq!(BinError::usage("bad").exit_code(), 2);
        assert_eq!(BinError::usage("bad").process_exit_code(), 2);
    }

    #[test]
    fn test_error_with_context() {
        let err = BinError::from(OpcUaError::configuration(ConfigurationError::invalid_node_id(
            "ns=x",
            "bad namespace",
        )))
        .with_context("parsing item");
        assert_eq!(err.to_string(), "parsing item");
        assert_eq!(err.status_code(), StatusCode::BAD_NODE_ID_INVALID);
        assert!(err.as_opcua().is_some());
    }

    #[test]
    fn test_io_error() {
        let err = BinError::from(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(err.status_code(), StatusCode::BAD_UNEXPECTED_ERROR);
        assert_eq!(err.process_exit_code(), 1);
    }

    #[test]
    fn test_error_chain_has_no_repeats() {
        let err = BinError::from(OpcUaError::connection(ConnectionError::failed(
            "opc.tcp://127.0.0.1:1",
            StatusCode::BAD_NOT_CONNECTED,
        )))
        .with_context("connecting to opc.tcp://127.0.0.1:1");

        let chain = error_chain(&err);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0], "connecting to opc.tcp://127.0.0.1:1");
        assert!(chain[1].starts_with("Connection to 'opc.tcp://127.0.0.1:1' failed"));
    }

    #[test]
    fn test_io_error_chain() {
        let err = BinError::from(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(error_chain(&err), vec!["writing output failed", "closed"]);
    }
}
