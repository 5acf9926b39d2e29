// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client error types.
//!
//! Every error maps back to an OPC UA [`StatusCode`], which the command line
//! front end turns into the process exit code, and to a structured
//! [`ErrorCode`] used in log records.
//!
//! # Error Categories
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Endpoint and session establishment issues
//! ├── Browse        - Browse service failures
//! ├── Operation     - Read/write failures
//! ├── Conversion    - Text/value conversion errors
//! ├── Configuration - Invalid settings or arguments
//! ├── Discovery     - FindServers / GetEndpoints failures
//! └── Io            - Output sink failures
//! ```
//!
//! # Examples
//!
//! ```
//! use uaprobe_opcua::error::{OpcUaError, BrowseError};
//! use uaprobe_opcua::types::StatusCode;
//!
//! let status = StatusCode::BAD_NODE_ID_UNKNOWN;
//! let error = OpcUaError::browse(BrowseError::bad_status("ns=0;i=85", status));
//! assert_eq!(error.status_code(), StatusCode::BAD_NODE_ID_UNKNOWN);
//! assert_eq!(error.category(), "browse");
//! ```

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

use crate::types::StatusCode;

// =============================================================================
// OpcUaError - Main Error Type
// =============================================================================

/// The main error type for OPC UA operations.
#[derive(Debug, Error)]
pub enum OpcUaError {
    /// Connection-related errors.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Browse service errors.
    #[error(transparent)]
    Browse(#[from] BrowseError),

    /// Read/write operation errors.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// Data conversion errors.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Configuration errors.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Discovery service errors.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Output errors while emitting results.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl OpcUaError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Creates a browse error.
    #[inline]
    pub fn browse(error: BrowseError) -> Self {
        Self::Browse(error)
    }

    /// Creates an operation error.
    #[inline]
    pub fn operation(error: OperationError) -> Self {
        Self::Operation(error)
    }

    /// Creates a conversion error.
    #[inline]
    pub fn conversion(error: ConversionError) -> Self {
        Self::Conversion(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a discovery error.
    #[inline]
    pub fn discovery(error: DiscoveryError) -> Self {
        Self::Discovery(error)
    }

    /// Creates a not connected error.
    pub fn not_connected() -> Self {
        Self::Connection(ConnectionError::NotConnected)
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns the OPC UA status code carried by, or implied by, this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Connection(e) => e.status_code(),
            Self::Browse(e) => e.status_code(),
            Self::Operation(e) => e.status_code(),
            Self::Conversion(e) => e.status_code(),
            Self::Configuration(e) => e.status_code(),
            Self::Discovery(e) => e.status_code(),
            Self::Io(_) => StatusCode::BAD_UNEXPECTED_ERROR,
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection(ConnectionError::NotConnected) => ErrorSeverity::Warning,
            Self::Connection(_) | Self::Discovery(_) => ErrorSeverity::Error,
            Self::Browse(_) | Self::Operation(_) | Self::Conversion(_) => ErrorSeverity::Error,
            Self::Configuration(_) | Self::Io(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Browse(_) => "browse",
            Self::Operation(_) => "operation",
            Self::Conversion(_) => "conversion",
            Self::Configuration(_) => "configuration",
            Self::Discovery(_) => "discovery",
            Self::Io(_) => "io",
        }
    }

    /// Returns a structured error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Connection(e) => e.error_code(),
            Self::Browse(e) => e.error_code(),
            Self::Operation(e) => e.error_code(),
            Self::Conversion(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
            Self::Discovery(e) => e.error_code(),
            Self::Io(_) => ErrorCode::new(7, 1),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Connection(e) => e.recovery_hints(),
            Self::Browse(e) => e.recovery_hints(),
            Self::Operation(e) => e.recovery_hints(),
            Self::Conversion(e) => e.recovery_hints(),
            Self::Configuration(e) => e.recovery_hints(),
            Self::Discovery(e) => e.recovery_hints(),
            Self::Io(_) => vec!["Check that the output stream is still open"],
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();
        let status = self.status_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                status = %status,
                category = self.category(),
                context = context,
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                status = %status,
                category = self.category(),
                context = context,
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                status = %status,
                category = self.category(),
                context = context,
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The server could not be reached or rejected the session.
    #[error("Connection to '{endpoint}' failed: {status}")]
    Failed {
        /// Target endpoint.
        endpoint: String,
        /// Status reported by the client stack.
        status: StatusCode,
    },

    /// No endpoint matched the configured security settings.
    #[error(
        "No endpoint at '{endpoint}' offers security mode {security_mode} \
         with policy {security_policy}"
    )]
    NoSuitableEndpoint {
        /// Target endpoint.
        endpoint: String,
        /// Requested security mode.
        security_mode: String,
        /// Requested security policy.
        security_policy: String,
    },

    /// The call did not complete within the request timeout.
    #[error("Request to '{endpoint}' timed out after {duration:?}")]
    TimedOut {
        /// Target endpoint.
        endpoint: String,
        /// Timeout duration.
        duration: Duration,
    },

    /// The client stack could not be set up.
    #[error("Client setup failed: {message}")]
    ClientSetup {
        /// Error message.
        message: String,
    },

    /// Not connected.
    #[error("Not connected to OPC UA server")]
    NotConnected,
}

impl ConnectionError {
    /// Creates a connection failure with the stack's status.
    pub fn failed(endpoint: impl Into<String>, status: StatusCode) -> Self {
        Self::Failed {
            endpoint: endpoint.into(),
            status,
        }
    }

    /// Creates a no suitable endpoint error.
    pub fn no_suitable_endpoint(
        endpoint: impl Into<String>,
        security_mode: impl Into<String>,
        security_policy: impl Into<String>,
    ) -> Self {
        Self::NoSuitableEndpoint {
            endpoint: endpoint.into(),
            security_mode: security_mode.into(),
            security_policy: security_policy.into(),
        }
    }

    /// Creates a timed out error.
    pub fn timed_out(endpoint: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            endpoint: endpoint.into(),
            duration,
        }
    }

    /// Creates a client setup error.
    pub fn client_setup(message: impl Into<String>) -> Self {
        Self::ClientSetup {
            message: message.into(),
        }
    }

    /// Returns the status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Failed { status, .. } => *status,
            Self::NoSuitableEndpoint { .. } => StatusCode::BAD_CONNECTION_REJECTED,
            Self::TimedOut { .. } => StatusCode::BAD_TIMEOUT,
            Self::ClientSetup { .. } => StatusCode::BAD_INTERNAL_ERROR,
            Self::NotConnected => StatusCode::BAD_NOT_CONNECTED,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Failed { .. } => ErrorCode::new(1, 1),
            Self::NoSuitableEndpoint { .. } => ErrorCode::new(1, 2),
            Self::TimedOut { .. } => ErrorCode::new(1, 3),
            Self::ClientSetup { .. } => ErrorCode::new(1, 4),
            Self::NotConnected => ErrorCode::new(1, 5),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Failed { .. } => vec![
                "Check that the OPC UA server is running",
                "Verify the endpoint URL (opc.tcp://host:port)",
                "Check network connectivity and firewall rules",
            ],
            Self::NoSuitableEndpoint { .. } => vec![
                "Run discovery (-d) to list the endpoints the server offers",
                "Adjust --security-mode and --security-policy to match an endpoint",
            ],
            Self::TimedOut { .. } => vec![
                "Increase --timeout",
                "Check network latency to the server",
            ],
            Self::ClientSetup { .. } => vec![
                "Check that the PKI directory is writable",
            ],
            Self::NotConnected => vec!["Connect before issuing service calls"],
        }
    }
}

// =============================================================================
// BrowseError
// =============================================================================

/// Browse service errors.
#[derive(Debug, Error)]
pub enum BrowseError {
    /// The Browse service call itself failed.
    #[error("Browse of node '{node_id}' failed: {status}")]
    ServiceFault {
        /// Node being browsed.
        node_id: String,
        /// Service result.
        status: StatusCode,
    },

    /// The server returned a bad status for the browsed node.
    #[error("Browse of node '{node_id}' returned {status}")]
    BadStatus {
        /// Node being browsed.
        node_id: String,
        /// Per-node status.
        status: StatusCode,
    },

    /// The server returned no result for the browsed node.
    #[error("Browse of node '{node_id}' returned no result")]
    NoResult {
        /// Node being browsed.
        node_id: String,
    },
}

impl BrowseError {
    /// Creates a service fault error.
    pub fn service_fault(node_id: impl Into<String>, status: StatusCode) -> Self {
        Self::ServiceFault {
            node_id: node_id.into(),
            status,
        }
    }

    /// Creates a bad per-node status error.
    pub fn bad_status(node_id: impl Into<String>, status: StatusCode) -> Self {
        Self::BadStatus {
            node_id: node_id.into(),
            status,
        }
    }

    /// Creates a missing result error.
    pub fn no_result(node_id: impl Into<String>) -> Self {
        Self::NoResult {
            node_id: node_id.into(),
        }
    }

    /// Returns the status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceFault { status, .. } | Self::BadStatus { status, .. } => *status,
            Self::NoResult { .. } => StatusCode::BAD_NOTHING_TO_DO,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ServiceFault { .. } => ErrorCode::new(2, 1),
            Self::BadStatus { .. } => ErrorCode::new(2, 2),
            Self::NoResult { .. } => ErrorCode::new(2, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::ServiceFault { .. } => vec![
                "Check that the session is still alive",
                "Retry with a lower --max-depth",
            ],
            Self::BadStatus { .. } | Self::NoResult { .. } => vec![
                "Verify the node exists in the server address space",
                "Check the user's access rights for browsing",
            ],
        }
    }
}

// =============================================================================
// OperationError
// =============================================================================

/// Read/write operation errors.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Read operation failed.
    #[error("Read of node '{node_id}' failed: {status}")]
    ReadFailed {
        /// Node ID.
        node_id: String,
        /// OPC UA status code.
        status: StatusCode,
    },

    /// Write operation failed.
    #[error("Write of node '{node_id}' failed: {status}")]
    WriteFailed {
        /// Node ID.
        node_id: String,
        /// OPC UA status code.
        status: StatusCode,
    },
}

impl OperationError {
    /// Creates a read failed error.
    pub fn read_failed(node_id: impl Into<String>, status: StatusCode) -> Self {
        Self::ReadFailed {
            node_id: node_id.into(),
            status,
        }
    }

    /// Creates a write failed error.
    pub fn write_failed(node_id: impl Into<String>, status: StatusCode) -> Self {
        Self::WriteFailed {
            node_id: node_id.into(),
            status,
        }
    }

    /// Returns the status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ReadFailed { status, .. } | Self::WriteFailed { status, .. } => *status,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ReadFailed { .. } => ErrorCode::new(3, 1),
            Self::WriteFailed { .. } => ErrorCode::new(3, 2),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::ReadFailed { status, .. } if *status == StatusCode::BAD_NODE_ID_UNKNOWN => vec![
                "Verify the node id, e.g. by browsing the server with -b",
            ],
            Self::ReadFailed { .. } => vec![
                "Verify the node is a Variable and readable by this user",
            ],
            Self::WriteFailed { status, .. } if *status == StatusCode::BAD_TYPE_MISMATCH => vec![
                "The server expects a different data type for this node",
            ],
            Self::WriteFailed { .. } => vec![
                "Check the node's AccessLevel and the user's write permissions",
            ],
        }
    }
}

// =============================================================================
// ConversionError
// =============================================================================

/// Errors converting command line text into OPC UA values.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Text could not be parsed as the target type.
    #[error("Cannot convert '{text}' to {target_type}: {reason}")]
    InvalidText {
        /// Input text.
        text: String,
        /// Target type name.
        target_type: String,
        /// Reason.
        reason: String,
    },

    /// Value does not fit the target type.
    #[error("Value {value} out of range for {target_type} [{min}, {max}]")]
    OutOfRange {
        /// Parsed value.
        value: String,
        /// Target type name.
        target_type: String,
        /// Minimum allowed value.
        min: String,
        /// Maximum allowed value.
        max: String,
    },

    /// Values of this type cannot be written from text.
    #[error("Writing values of type {type_name} is not supported")]
    UnsupportedType {
        /// Type name.
        type_name: String,
    },
}

impl ConversionError {
    /// Creates an invalid text error.
    pub fn invalid_text(
        text: impl Into<String>,
        target_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidText {
            text: text.into(),
            target_type: target_type.into(),
            reason: reason.into(),
        }
    }

    /// Creates an out of range error.
    pub fn out_of_range<T: fmt::Display>(
        value: T,
        target_type: impl Into<String>,
        min: T,
        max: T,
    ) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            target_type: target_type.into(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Returns the status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidText { .. } | Self::UnsupportedType { .. } => {
                StatusCode::BAD_TYPE_MISMATCH
            }
            Self::OutOfRange { .. } => StatusCode::BAD_OUT_OF_RANGE,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidText { .. } => ErrorCode::new(4, 1),
            Self::OutOfRange { .. } => ErrorCode::new(4, 2),
            Self::UnsupportedType { .. } => ErrorCode::new(4, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidText { .. } => vec![
                "Booleans accept true/false/1/0/on/off",
                "Date-times use RFC 3339, e.g. 2024-01-31T12:00:00Z",
                "Byte strings are base64 encoded",
            ],
            Self::OutOfRange { .. } => vec!["Choose a value within the node's data type range"],
            Self::UnsupportedType { .. } => vec![
                "Only scalar built-in types can be written from the command line",
            ],
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Configuration and argument errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Invalid endpoint URL.
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint {
        /// The URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// Invalid node ID format.
    #[error("Invalid node ID '{node_id}': {reason}")]
    InvalidNodeId {
        /// The node ID.
        node_id: String,
        /// Reason.
        reason: String,
    },

    /// Invalid security configuration.
    #[error("Invalid security configuration: {message}")]
    InvalidSecurity {
        /// Error message.
        message: String,
    },

    /// Invalid timeout value.
    #[error("Invalid timeout {duration:?}: {reason}")]
    InvalidTimeout {
        /// The duration.
        duration: Duration,
        /// Reason.
        reason: String,
    },

    /// Required field missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// Unknown security mode name.
    #[error("Invalid security mode: {mode}")]
    InvalidSecurityMode {
        /// The name.
        mode: String,
    },

    /// Unknown security policy name.
    #[error("Invalid security policy: {policy}")]
    InvalidSecurityPolicy {
        /// The name.
        policy: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid node ID error.
    pub fn invalid_node_id(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeId {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid security error.
    pub fn invalid_security(message: impl Into<String>) -> Self {
        Self::InvalidSecurity {
            message: message.into(),
        }
    }

    /// Creates an invalid timeout error.
    pub fn invalid_timeout(duration: Duration, reason: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            duration,
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid security mode error.
    pub fn invalid_security_mode(mode: impl Into<String>) -> Self {
        Self::InvalidSecurityMode { mode: mode.into() }
    }

    /// Creates an invalid security policy error.
    pub fn invalid_security_policy(policy: impl Into<String>) -> Self {
        Self::InvalidSecurityPolicy {
            policy: policy.into(),
        }
    }

    /// Returns the status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEndpoint { .. } => StatusCode::BAD_TCP_ENDPOINT_URL_INVALID,
            Self::InvalidNodeId { .. } => StatusCode::BAD_NODE_ID_INVALID,
            _ => StatusCode::BAD_INVALID_ARGUMENT,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidEndpoint { .. } => ErrorCode::new(5, 1),
            Self::InvalidNodeId { .. } => ErrorCode::new(5, 2),
            Self::InvalidSecurity { .. } => ErrorCode::new(5, 3),
            Self::InvalidTimeout { .. } => ErrorCode::new(5, 4),
            Self::MissingField { .. } => ErrorCode::new(5, 5),
            Self::InvalidSecurityMode { .. } => ErrorCode::new(5, 6),
            Self::InvalidSecurityPolicy { .. } => ErrorCode::new(5, 7),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidEndpoint { .. } => vec!["Use the format opc.tcp://host:port[/path]"],
            Self::InvalidNodeId { .. } => vec![
                "Use the format ns=<index>;i=<number> or ns=<index>;s=<name>",
                "GUID and opaque ids use g=<uuid> and b=<base64>",
            ],
            Self::InvalidSecurity { .. } => vec![
                "Security mode None requires policy None, and vice versa",
            ],
            Self::InvalidTimeout { .. } => vec!["Use a positive duration such as 10s"],
            Self::MissingField { .. } => vec!["Provide all required arguments"],
            Self::InvalidSecurityMode { .. } => vec!["Valid modes: none, sign, sign-and-encrypt"],
            Self::InvalidSecurityPolicy { .. } => vec![
                "Valid policies: none, basic128rsa15, basic256, basic256sha256, aes128, aes256",
            ],
        }
    }
}

// =============================================================================
// DiscoveryError
// =============================================================================

/// Discovery service errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A discovery service call failed.
    #[error("Could not call {service} service at '{url}': {status}")]
    ServiceFailed {
        /// Service name (FindServersOnNetwork, FindServers, GetEndpoints).
        service: &'static str,
        /// Discovery URL.
        url: String,
        /// Service result.
        status: StatusCode,
    },
}

impl DiscoveryError {
    /// Creates a service failure.
    pub fn service_failed(
        service: &'static str,
        url: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self::ServiceFailed {
            service,
            url: url.into(),
            status,
        }
    }

    /// Returns the status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceFailed { status, .. } => *status,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ServiceFailed { service, .. } => match *service {
                "FindServersOnNetwork" => ErrorCode::new(6, 1),
                "FindServers" => ErrorCode::new(6, 2),
                _ => ErrorCode::new(6, 3),
            },
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        vec![
            "Is the discovery server started?",
            "Verify the discovery URL (often opc.tcp://host:4840)",
        ]
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational.
    Info,
    /// Warning.
    Warning,
    /// Error.
    Error,
    /// Critical, the command cannot proceed.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code.
///
/// Format: `UA-XXYY` where XX is the category and YY the specific error.
///
/// Categories:
/// - 1: Connection
/// - 2: Browse
/// - 3: Operation
/// - 4: Conversion
/// - 5: Configuration
/// - 6: Discovery
/// - 7: Io
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category.
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// A Result type with OpcUaError.
pub type OpcUaResult<T> = Result<T, OpcUaError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_propagation() {
        let fault = BrowseError::service_fault("ns=0;i=85", StatusCode::BAD_TIMEOUT);
        let error = OpcUaError::browse(fault);
        assert_eq!(error.status_code(), StatusCode::BAD_TIMEOUT);

        let error = OpcUaError::operation(OperationError::write_failed(
            "ns=2;s=Setpoint",
            StatusCode::BAD_NOT_WRITABLE,
        ));
        assert_eq!(error.status_code(), StatusCode::BAD_NOT_WRITABLE);
        assert!(error.to_string().contains("BadNotWritable"));
    }

    #[test]
    fn test_implied_status_codes() {
        assert_eq!(OpcUaError::not_connected().status_code(), StatusCode::BAD_NOT_CONNECTED);
        let invalid = ConfigurationError::invalid_node_id("x", "bad");
        assert_eq!(
            OpcUaError::configuration(invalid).status_code(),
            StatusCode::BAD_NODE_ID_INVALID
        );
        let overflow = ConversionError::out_of_range(300, "Byte", 0, 255);
        assert_eq!(OpcUaError::conversion(overflow).status_code(), StatusCode::BAD_OUT_OF_RANGE);
        let io = OpcUaError::from(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        assert_eq!(io.status_code(), StatusCode::BAD_UNEXPECTED_ERROR);
        assert_eq!(io.category(), "io");
    }

    #[test]
    fn test_discovery_error() {
        let error = DiscoveryError::service_failed(
            "FindServers",
            "opc.tcp://localhost:4840",
            StatusCode::BAD_COMMUNICATION_ERROR,
        );
        assert_eq!(error.error_code().to_string(), "UA-0602");
        assert!(error.to_string().starts_with("Could not call FindServers service"));
        assert!(error.recovery_hints().iter().any(|h| h.contains("discovery server started")));
    }

    #[test]
    fn test_wrapped_errors_display_once() {
        let failed = || ConnectionError::failed("opc.tcp://x:4840", StatusCode::BAD_TIMEOUT);
        let error = OpcUaError::connection(failed());
        assert_eq!(error.to_string(), failed().to_string());
        assert!(std::error::Error::source(&error).is_none());
    }

    #[test]
    fn test_error_code() {
        let code = ErrorCode::new(1, 5);
        assert_eq!(code.to_string(), "UA-0105");
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(OpcUaError::not_connected().severity(), ErrorSeverity::Warning);
        assert_eq!(
            OpcUaError::configuration(ConfigurationError::missing_field("endpoint")).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(ErrorSeverity::Critical.to_tracing_level(), Level::ERROR);
    }

    #[test]
    fn test_recovery_hints() {
        let error = ConfigurationError::invalid_node_id("bad;format", "missing namespace");
        assert!(error.to_string().contains("bad;format"));
        assert!(error.recovery_hints().iter().any(|h| h.contains("ns=")));

        let status = StatusCode::BAD_COMMUNICATION_ERROR;
        let error = ConnectionError::failed("opc.tcp://localhost:4840", status);
        assert!(error.recovery_hints().iter().any(|h| h.contains("running")));
    }
}
