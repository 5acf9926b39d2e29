// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA transport abstraction layer.
//!
//! The walker, the discovery report and the value commands talk to a server
//! only through these traits, so they can be driven by the `opcua` crate
//! client in production and by in-memory address spaces in tests.

use std::fmt;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::discovery::{ApplicationDescription, EndpointDescription, ServerOnNetwork};
use crate::error::OpcUaResult;
use crate::types::{NodeClass, NodeId, OpcUaDataType, QualifiedName, StatusCode};

// =============================================================================
// TransportState
// =============================================================================

/// Session state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// No session.
    #[default]
    Disconnected,
    /// Session being opened.
    Connecting,
    /// Session open.
    Connected,
    /// The last session attempt failed.
    Failed,
}

impl TransportState {
    /// Returns `true` while a session is open.
    #[inline]
    pub fn is_connected(&self) -> bool {
        *self == Self::Connected
    }
}

// =============================================================================
// Service results
// =============================================================================

/// Value attribute of one node as returned by the Read service.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// Node that was read.
    pub node_id: NodeId,

    /// Value, absent when the status is bad.
    pub value: Option<OpcUaValue>,

    /// Per-node status.
    pub status: StatusCode,
}

impl ReadResult {
    /// A good read of `value`.
    pub fn success(node_id: NodeId, value: OpcUaValue) -> Self {
        Self {
            node_id,
            value: Some(value),
            status: StatusCode::GOOD,
        }
    }

    /// A read that failed with `status`.
    pub fn failure(node_id: NodeId, status: StatusCode) -> Self {
        Self {
            node_id,
            value: None,
            status,
        }
    }

    /// Returns `true` if the status is bad.
    #[inline]
    pub fn is_bad(&self) -> bool {
        self.status.is_bad()
    }
}

/// Per-node outcome of the Write service.
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Node that was written.
    pub node_id: NodeId,

    /// Per-node status.
    pub status: StatusCode,
}

impl WriteResult {
    /// A good write.
    pub fn success(node_id: NodeId) -> Self {
        Self::failure(node_id, StatusCode::GOOD)
    }

    /// A write that the server answered with `status`.
    pub fn failure(node_id: NodeId, status: StatusCode) -> Self {
        Self { node_id, status }
    }

    /// Returns `true` if the server accepted the write.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.status.is_good()
    }
}

// =============================================================================
// OpcUaValue
// =============================================================================

/// Scalar built-in values as carried across the transport.
///
/// Arrays are read-only: they can be printed but not written back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OpcUaValue {
    /// Boolean.
    Boolean(bool),
    /// SByte.
    SByte(i8),
    /// Byte.
    Byte(u8),
    /// Int16.
    Int16(i16),
    /// UInt16.
    UInt16(u16),
    /// Int32.
    Int32(i32),
    /// UInt32.
    UInt32(u32),
    /// Int64.
    Int64(i64),
    /// UInt64.
    UInt64(u64),
    /// Float.
    Float(f32),
    /// Double.
    Double(f64),
    /// String.
    String(String),
    /// DateTime, UTC.
    DateTime(chrono::DateTime<chrono::Utc>),
    /// Guid.
    Guid(uuid::Uuid),
    /// ByteString.
    ByteString(Vec<u8>),
    /// One-dimensional array.
    Array(Vec<OpcUaValue>),
    /// Empty variant.
    #[default]
    Null,
}

impl OpcUaValue {
    /// Built-in type of a scalar; arrays and empty values report `Variant`.
    pub fn data_type(&self) -> OpcUaDataType {
        use OpcUaDataType as T;

        match self {
            Self::Boolean(_) => T::Boolean,
            Self::SByte(_) => T::SByte,
            Self::Byte(_) => T::Byte,
            Self::Int16(_) => T::Int16,
            Self::UInt16(_) => T::UInt16,
            Self::Int32(_) => T::Int32,
            Self::UInt32(_) => T::UInt32,
            Self::Int64(_) => T::Int64,
            Self::UInt64(_) => T::UInt64,
            Self::Float(_) => T::Float,
            Self::Double(_) => T::Double,
            Self::String(_) => T::String,
            Self::DateTime(_) => T::DateTime,
            Self::Guid(_) => T::Guid,
            Self::ByteString(_) => T::ByteString,
            Self::Array(_) | Self::Null => T::Variant,
        }
    }

    /// Type column printed by get and set.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Array(_) => "Array",
            Self::Null => "Null",
            scalar => scalar.data_type().name(),
        }
    }
}

impl fmt::Display for OpcUaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::SByte(n) => write!(f, "{n}"),
            Self::Byte(n) => write!(f, "{n}"),
            Self::Int16(n) => write!(f, "{n}"),
            Self::UInt16(n) => write!(f, "{n}"),
            Self::Int32(n) => write!(f, "{n}"),
            Self::UInt32(n) => write!(f, "{n}"),
            Self::Int64(n) => write!(f, "{n}"),
            Self::UInt64(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Double(x) => write!(f, "{x}"),
            Self::String(text) => f.write_str(text),
            Self::DateTime(at) => f.write_str(&at.to_rfc3339()),
            Self::Guid(guid) => write!(f, "{guid}"),
            Self::ByteString(bytes) => f.write_str(&BASE64.encode(bytes)),
            Self::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Null => f.write_str("null"),
        }
    }
}

// =============================================================================
// ReferenceDescription
// =============================================================================

/// One reference returned by the Browse service.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDescription {
    /// Target node.
    pub node_id: NodeId,

    /// Reference type, when the server reported one.
    pub reference_type: Option<NodeId>,

    /// Direction the reference was followed in.
    pub is_forward: bool,

    /// Node class of the target.
    pub node_class: NodeClass,

    /// Browse name of the target.
    pub browse_name: QualifiedName,

    /// Display name text of the target.
    pub display_name: String,
}

impl ReferenceDescription {
    /// A forward reference of unspecified type to `node_id`.
    pub fn new(
        node_id: NodeId,
        node_class: NodeClass,
        browse_name: impl Into<QualifiedName>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            node_id,
            reference_type: None,
            is_forward: true,
            node_class,
            browse_name: browse_name.into(),
            display_name: display_name.into(),
        }
    }
}

// =============================================================================
// OpcUaTransport Trait
// =============================================================================

/// Session-bound OPC UA services.
///
/// Covers session management plus the Browse and Attribute services the
/// commands need. Implementations must be `Send + Sync`.
#[async_trait]
pub trait OpcUaTransport: Send + Sync {
    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Opens a session with the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the stack's status if the session cannot be
    /// established.
    async fn connect(&mut self) -> OpcUaResult<()>;

    /// Closes the session.
    async fn disconnect(&mut self) -> OpcUaResult<()>;

    /// Returns `true` if a session is active.
    fn is_connected(&self) -> bool;

    /// Returns the current transport state.
    fn state(&self) -> TransportState;

    // =========================================================================
    // Services
    // =========================================================================

    /// Browses all forward references of a node.
    ///
    /// The request uses a null reference type (all references) with
    /// subtypes, no node class filter and the full result mask. A service
    /// fault or a bad per-node status is returned as an error. References
    /// are returned in server order.
    async fn browse(&self, node_id: &NodeId) -> OpcUaResult<Vec<ReferenceDescription>>;

    /// Reads the Value attribute of a node.
    async fn read_value(&self, node_id: &NodeId) -> OpcUaResult<ReadResult>;

    /// Writes the Value attribute of a node.
    async fn write_value(&self, node_id: &NodeId, value: OpcUaValue) -> OpcUaResult<WriteResult>;

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Returns the server endpoint URL.
    fn endpoint(&self) -> &str;
}

// =============================================================================
// DiscoveryTransport Trait
// =============================================================================

/// Session-less discovery services.
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    /// Calls FindServersOnNetwork on a discovery server.
    async fn find_servers_on_network(
        &self,
        discovery_url: &str,
    ) -> OpcUaResult<Vec<ServerOnNetwork>>;

    /// Calls FindServers on a discovery server.
    async fn find_servers(&self, discovery_url: &str) -> OpcUaResult<Vec<ApplicationDescription>>;

    /// Calls GetEndpoints on a server.
    async fn get_endpoints(&self, server_url: &str) -> OpcUaResult<Vec<EndpointDescription>>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state() {
        assert!(TransportState::Connected.is_connected());
        assert!(!TransportState::Failed.is_connected());
        assert_eq!(TransportState::default(), TransportState::Disconnected);
    }

    #[test]
    fn test_read_result() {
        let good = ReadResult::success(NodeId::numeric(2, 1001), OpcUaValue::Double(25.5));
        assert!(!good.is_bad());

        let bad = ReadResult::failure(NodeId::numeric(2, 1001), StatusCode::BAD_NOT_READABLE);
        assert!(bad.is_bad());
        assert!(bad.value.is_none());
    }

    #[test]
    fn test_write_result() {
        assert!(WriteResult::success(NodeId::numeric(2, 1)).is_good());
        let rejected = WriteResult::failure(NodeId::numeric(2, 1), StatusCode::BAD_NOT_WRITABLE);
        assert!(!rejected.is_good());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(OpcUaValue::Boolean(true).data_type(), OpcUaDataType::Boolean);
        assert_eq!(OpcUaValue::UInt64(7).type_name(), "UInt64");
        assert_eq!(OpcUaValue::Null.type_name(), "Null");
        assert_eq!(OpcUaValue::Array(vec![]).type_name(), "Array");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(OpcUaValue::Double(1.5).to_string(), "1.5");
        assert_eq!(OpcUaValue::Int16(-3).to_string(), "-3");
        assert_eq!(OpcUaValue::ByteString(vec![1, 2, 3, 4]).to_string(), "AQIDBA==");
        assert_eq!(
            OpcUaValue::Array(vec![OpcUaValue::Int16(1), OpcUaValue::Int16(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(OpcUaValue::Null.to_string(), "null");
    }

    #[test]
    fn test_reference_defaults_forward() {
        let server = NodeId::numeric(0, 2253);
        let reference = ReferenceDescription::new(server, NodeClass::Object, "Server", "Server");
        assert!(reference.is_forward);
        assert_eq!(reference.reference_type, None);
        assert_eq!(reference.browse_name.name, "Server");
    }
}
