// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA-specific types shared by the walker, the discovery report and the
//! value access commands.
//!
//! - **NodeId**: All four OPC UA node identifier kinds, with the canonical
//!   `ns=X;i=N` / `ns=X;s=S` form used for deduplication
//! - **NodeClass**: Node classes with their mask values and printed labels
//! - **StatusCode**: OPC UA status codes with severity checks and names
//! - **OpcUaDataType**: Built-in data types for value interpretation
//! - **SecurityMode/Policy**: Security configuration types
//! - **OpcUaConfig**: Client connection configuration with builder
//!
//! # Examples
//!
//! ```
//! use uaprobe_opcua::types::{NodeId, OpcUaConfig, SecurityMode};
//!
//! let node_id = NodeId::numeric(2, 1000);
//! assert_eq!(node_id.canonical_id().as_deref(), Some("ns=2;i=1000"));
//!
//! let config = OpcUaConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .security_mode(SecurityMode::None)
//!     .build()
//!     .unwrap();
//! assert!(!config.uses_security());
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigurationError, OpcUaError};

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA Node Identifier.
///
/// A NodeId consists of a namespace index and an identifier which can be
/// numeric, string, GUID, or opaque (byte string).
///
/// # Examples
///
/// ```
/// use uaprobe_opcua::types::NodeId;
///
/// let numeric = NodeId::numeric(2, 1001);
/// let string = NodeId::string(3, "Temperature");
/// assert_eq!(string.canonical_id().as_deref(), Some("ns=3;s=Temperature"));
///
/// let parsed: NodeId = "ns=2;s=MyDevice.Temperature".parse().unwrap();
/// assert_eq!(parsed.to_opc_string(), "ns=2;s=MyDevice.Temperature");
/// # let _ = numeric;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a numeric node ID.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }

    /// Creates a GUID node ID.
    #[inline]
    pub fn guid(namespace_index: u16, value: Uuid) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Guid(value),
        }
    }

    /// Creates an opaque (byte string) node ID.
    #[inline]
    pub fn opaque(namespace_index: u16, value: Vec<u8>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Opaque(value),
        }
    }

    // =========================================================================
    // Standard Node IDs
    // =========================================================================

    /// Objects folder node (ns=0, i=85). Browsing starts here.
    pub const OBJECTS_FOLDER: NodeId = NodeId {
        namespace_index: 0,
        identifier: NodeIdentifier::Numeric(85),
    };

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Returns the canonical identifier used to deduplicate nodes.
    ///
    /// Only numeric and string identifiers have a canonical form:
    /// `ns=<index>;i=<n>` or `ns=<index>;s=<s>`. The namespace prefix is
    /// always present, also for namespace 0. GUID and opaque identifiers
    /// return `None`.
    ///
    /// ```
    /// use uaprobe_opcua::types::NodeId;
    ///
    /// assert_eq!(NodeId::OBJECTS_FOLDER.canonical_id().as_deref(), Some("ns=0;i=85"));
    /// assert_eq!(NodeId::opaque(1, vec![1, 2]).canonical_id(), None);
    /// ```
    pub fn canonical_id(&self) -> Option<String> {
        match &self.identifier {
            NodeIdentifier::Numeric(v) => Some(format!("ns={};i={}", self.namespace_index, v)),
            NodeIdentifier::String(v) => Some(format!("ns={};s={}", self.namespace_index, v)),
            NodeIdentifier::Guid(_) | NodeIdentifier::Opaque(_) => None,
        }
    }

    /// Converts to the OPC UA string format.
    ///
    /// Format: `ns=<namespace>;{i|s|g|b}=<identifier>`, with the namespace
    /// prefix omitted for namespace 0.
    pub fn to_opc_string(&self) -> String {
        if self.namespace_index == 0 {
            self.identifier.to_string()
        } else {
            format!("ns={};{}", self.namespace_index, self.identifier)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_opc_string())
    }
}

impl FromStr for NodeId {
    type Err = OpcUaError;

    /// Parses a NodeId from OPC UA string format.
    ///
    /// Supported formats:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64 encoded)
    /// - `i=1001` / `s=MyNode` (namespace 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: String| {
            OpcUaError::configuration(ConfigurationError::invalid_node_id(s, reason))
        };

        let (namespace_index, identifier_part) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (ns_str, id) = rest
                    .split_once(';')
                    .ok_or_else(|| invalid("Missing identifier after namespace".into()))?;
                let ns: u16 = ns_str
                    .parse()
                    .map_err(|_| invalid("Invalid namespace index".into()))?;
                (ns, id)
            }
            None => (0, s),
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            NodeIdentifier::Numeric(
                id.parse()
                    .map_err(|_| invalid("Invalid numeric identifier".into()))?,
            )
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            if id.is_empty() {
                return Err(invalid("Empty string identifier".into()));
            }
            NodeIdentifier::String(id.to_string())
        } else if let Some(id) = identifier_part.strip_prefix("g=") {
            NodeIdentifier::Guid(
                Uuid::parse_str(id).map_err(|e| invalid(format!("Invalid GUID: {}", e)))?,
            )
        } else if let Some(id) = identifier_part.strip_prefix("b=") {
            NodeIdentifier::Opaque(
                BASE64
                    .decode(id)
                    .map_err(|e| invalid(format!("Invalid base64: {}", e)))?,
            )
        } else {
            return Err(invalid(
                "Unknown identifier type. Expected i=, s=, g=, or b=".into(),
            ));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// OPC UA node identifier kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NodeIdentifier {
    /// Numeric identifier (most standard nodes).
    Numeric(u32),

    /// String identifier (human-readable, common for vendor nodes).
    String(String),

    /// GUID identifier.
    Guid(Uuid),

    /// Opaque identifier (application-specific byte array).
    Opaque(Vec<u8>),
}

impl NodeIdentifier {
    /// Returns `true` if this identifier kind has a canonical form.
    #[inline]
    pub const fn has_canonical_form(&self) -> bool {
        matches!(self, Self::Numeric(_) | Self::String(_))
    }
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
            Self::Guid(v) => write!(f, "g={}", v),
            Self::Opaque(v) => write!(f, "b={}", BASE64.encode(v)),
        }
    }
}

// =============================================================================
// NodeClass
// =============================================================================

/// OPC UA node class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// No class reported.
    #[default]
    Unspecified,
    /// Object node.
    Object,
    /// Variable node.
    Variable,
    /// Method node.
    Method,
    /// Object type node.
    ObjectType,
    /// Variable type node.
    VariableType,
    /// Reference type node.
    ReferenceType,
    /// Data type node.
    DataType,
    /// View node.
    View,
}

impl NodeClass {
    const ALL: [Self; 9] = [
        Self::Unspecified,
        Self::Object,
        Self::Variable,
        Self::Method,
        Self::ObjectType,
        Self::VariableType,
        Self::ReferenceType,
        Self::DataType,
        Self::View,
    ];

    /// Returns the OPC UA bit mask value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Unspecified => 0,
            Self::Object => 1,
            Self::Variable => 2,
            Self::Method => 4,
            Self::ObjectType => 8,
            Self::VariableType => 16,
            Self::ReferenceType => 32,
            Self::DataType => 64,
            Self::View => 128,
        }
    }

    /// Maps a mask value back to its class; values that are not a single
    /// class bit return `None`.
    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.value() == value)
    }

    /// Returns the label printed in browse listings.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unspecified => "Unspecified",
            Self::Object => "Object",
            Self::Variable => "Variable",
            Self::Method => "Method",
            Self::ObjectType => "Objecttype",
            Self::VariableType => "Variabletype",
            Self::ReferenceType => "Referencetype",
            Self::DataType => "Datatype",
            Self::View => "View",
        }
    }

    /// Returns `true` for the only class the walker descends into.
    #[inline]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object)
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// QualifiedName
// =============================================================================

/// OPC UA qualified name (namespace index + name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct QualifiedName {
    /// Namespace index.
    pub namespace_index: u16,

    /// The name string.
    pub name: String,
}

impl QualifiedName {
    /// Creates a new qualified name.
    pub fn new(namespace_index: u16, name: impl Into<String>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }

    /// Returns the string representation with the namespace prefix.
    pub fn to_string_with_ns(&self) -> String {
        if self.namespace_index == 0 {
            self.name.clone()
        } else {
            format!("{}:{}", self.namespace_index, self.name)
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_ns())
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        if let Some((ns, name)) = s.split_once(':') {
            if let Ok(ns_idx) = ns.parse::<u16>() {
                return Self::new(ns_idx, name);
            }
        }
        Self::new(0, s)
    }
}

// =============================================================================
// StatusCode
// =============================================================================

/// OPC UA status code.
///
/// The top two bits carry the severity: `00` good, `01` uncertain,
/// `10`/`11` bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StatusCode(u32);

impl StatusCode {
    /// Good.
    pub const GOOD: StatusCode = StatusCode(0x0000_0000);
    /// Unexpected error.
    pub const BAD_UNEXPECTED_ERROR: StatusCode = StatusCode(0x8001_0000);
    /// Internal error.
    pub const BAD_INTERNAL_ERROR: StatusCode = StatusCode(0x8002_0000);
    /// Communication error.
    pub const BAD_COMMUNICATION_ERROR: StatusCode = StatusCode(0x8005_0000);
    /// Operation timed out.
    pub const BAD_TIMEOUT: StatusCode = StatusCode(0x800A_0000);
    /// Service not supported by the server or the client stack.
    pub const BAD_SERVICE_UNSUPPORTED: StatusCode = StatusCode(0x800B_0000);
    /// Nothing to do.
    pub const BAD_NOTHING_TO_DO: StatusCode = StatusCode(0x800F_0000);
    /// User access denied.
    pub const BAD_USER_ACCESS_DENIED: StatusCode = StatusCode(0x801F_0000);
    /// Syntactically invalid node id.
    pub const BAD_NODE_ID_INVALID: StatusCode = StatusCode(0x8033_0000);
    /// Node id unknown to the server.
    pub const BAD_NODE_ID_UNKNOWN: StatusCode = StatusCode(0x8034_0000);
    /// Attribute not readable.
    pub const BAD_NOT_READABLE: StatusCode = StatusCode(0x803A_0000);
    /// Attribute not writable.
    pub const BAD_NOT_WRITABLE: StatusCode = StatusCode(0x803B_0000);
    /// Value out of range.
    pub const BAD_OUT_OF_RANGE: StatusCode = StatusCode(0x803C_0000);
    /// Value type does not match the node data type.
    pub const BAD_TYPE_MISMATCH: StatusCode = StatusCode(0x8074_0000);
    /// Endpoint URL invalid.
    pub const BAD_TCP_ENDPOINT_URL_INVALID: StatusCode = StatusCode(0x8083_0000);
    /// Not connected.
    pub const BAD_NOT_CONNECTED: StatusCode = StatusCode(0x808A_0000);
    /// Invalid argument.
    pub const BAD_INVALID_ARGUMENT: StatusCode = StatusCode(0x80AB_0000);
    /// Connection rejected.
    pub const BAD_CONNECTION_REJECTED: StatusCode = StatusCode(0x80AC_0000);

    /// Creates a status code from its raw value.
    #[inline]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw value.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the severity is good.
    #[inline]
    pub const fn is_good(&self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    /// Returns `true` if the severity is uncertain.
    #[inline]
    pub const fn is_uncertain(&self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000
    }

    /// Returns `true` if the severity is bad.
    #[inline]
    pub const fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// Returns the symbolic name of a known code, ignoring the info bits.
    pub fn name(&self) -> &'static str {
        match self.0 & 0xFFFF_0000 {
            0x0000_0000 => "Good",
            0x8001_0000 => "BadUnexpectedError",
            0x8002_0000 => "BadInternalError",
            0x8005_0000 => "BadCommunicationError",
            0x800A_0000 => "BadTimeout",
            0x800B_0000 => "BadServiceUnsupported",
            0x800C_0000 => "BadShutdown",
            0x800D_0000 => "BadServerNotConnected",
            0x800F_0000 => "BadNothingToDo",
            0x801F_0000 => "BadUserAccessDenied",
            0x8033_0000 => "BadNodeIdInvalid",
            0x8034_0000 => "BadNodeIdUnknown",
            0x8035_0000 => "BadAttributeIdInvalid",
            0x803A_0000 => "BadNotReadable",
            0x803B_0000 => "BadNotWritable",
            0x803C_0000 => "BadOutOfRange",
            0x803D_0000 => "BadNotSupported",
            0x803E_0000 => "BadNotFound",
            0x804A_0000 => "BadContinuationPointInvalid",
            0x804B_0000 => "BadNoContinuationPoints",
            0x8074_0000 => "BadTypeMismatch",
            0x8083_0000 => "BadTcpEndpointUrlInvalid",
            0x808A_0000 => "BadNotConnected",
            0x80AB_0000 => "BadInvalidArgument",
            0x80AC_0000 => "BadConnectionRejected",
            _ if self.is_good() => "Good",
            _ if self.is_uncertain() => "Uncertain",
            _ => "Bad",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#010X})", self.name(), self.0)
    }
}

impl From<u32> for StatusCode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

// =============================================================================
// OpcUaDataType
// =============================================================================

/// OPC UA built-in data types for value interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpcUaDataType {
    /// Boolean value.
    Boolean,
    /// Signed 8-bit integer.
    SByte,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit IEEE 754 float.
    Float,
    /// 64-bit IEEE 754 double.
    Double,
    /// UTF-8 string.
    String,
    /// Date and time.
    DateTime,
    /// GUID.
    Guid,
    /// Raw byte string.
    ByteString,
    /// Variant (arrays, empty values and structured types).
    #[default]
    Variant,
}

impl OpcUaDataType {
    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::ByteString => "ByteString",
            Self::Variant => "Variant",
        }
    }
}

impl fmt::Display for OpcUaDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// SecurityMode
// =============================================================================

/// OPC UA message security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// No security (messages are neither signed nor encrypted).
    #[default]
    None,

    /// Messages are signed but not encrypted.
    Sign,

    /// Messages are signed and encrypted.
    SignAndEncrypt,
}

impl SecurityMode {
    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Sign => "Sign",
            Self::SignAndEncrypt => "SignAndEncrypt",
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SecurityMode {
    type Err = OpcUaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_name(s).as_str() {
            "none" | "nosecurity" => Ok(Self::None),
            "sign" | "signed" => Ok(Self::Sign),
            "signandencrypt" | "signencrypt" | "encrypted" => Ok(Self::SignAndEncrypt),
            _ => Err(OpcUaError::configuration(
                ConfigurationError::invalid_security_mode(s),
            )),
        }
    }
}

// =============================================================================
// SecurityPolicy
// =============================================================================

/// OPC UA security policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityPolicy {
    /// No security policy (use with SecurityMode::None).
    #[default]
    None,

    /// Basic128Rsa15 (deprecated).
    Basic128Rsa15,

    /// Basic256 (deprecated).
    Basic256,

    /// Basic256Sha256.
    Basic256Sha256,

    /// Aes128Sha256RsaOaep.
    Aes128Sha256RsaOaep,

    /// Aes256Sha256RsaPss.
    Aes256Sha256RsaPss,
}

impl SecurityPolicy {
    const ALL: [Self; 6] = [
        Self::None,
        Self::Basic128Rsa15,
        Self::Basic256,
        Self::Basic256Sha256,
        Self::Aes128Sha256RsaOaep,
        Self::Aes256Sha256RsaPss,
    ];

    /// Name as it appears after `#` in the policy URI.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Basic128Rsa15 => "Basic128Rsa15",
            Self::Basic256 => "Basic256",
            Self::Basic256Sha256 => "Basic256Sha256",
            Self::Aes128Sha256RsaOaep => "Aes128_Sha256_RsaOaep",
            Self::Aes256Sha256RsaPss => "Aes256_Sha256_RsaPss",
        }
    }

    /// Looks a policy up by URI or by name.
    fn lookup(text: &str) -> Option<Self> {
        let wanted = fold_name(text.strip_prefix(POLICY_URI_PREFIX).unwrap_or(text));
        Self::ALL.into_iter().find(|policy| fold_name(policy.name()) == wanted)
    }
}

impl fmt::Display for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a policy URI or a name; case, `-` and `_` are ignored.
impl FromStr for SecurityPolicy {
    type Err = OpcUaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| ConfigurationError::invalid_security_policy(s).into())
    }
}

const POLICY_URI_PREFIX: &str = "http://opcfoundation.org/UA/SecurityPolicy#";

fn fold_name(text: &str) -> String {
    text.to_lowercase().replace(['-', '_'], "")
}

// =============================================================================
// UserTokenType
// =============================================================================

/// OPC UA user identity used when activating a session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserTokenType {
    /// Anonymous authentication.
    #[default]
    Anonymous,

    /// Username and password authentication.
    UserName {
        /// The username.
        username: String,
        /// The password.
        password: String,
    },
}

impl UserTokenType {
    /// Returns `true` if this is anonymous authentication.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

// Never print the password.
impl fmt::Debug for UserTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::UserName { username, .. } => f
                .debug_struct("UserName")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

impl fmt::Display for UserTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "Anonymous"),
            Self::UserName { username, .. } => write!(f, "UserName({})", username),
        }
    }
}

// =============================================================================
// OpcUaConfig
// =============================================================================

/// OPC UA client configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use uaprobe_opcua::types::{OpcUaConfig, SecurityMode, SecurityPolicy};
///
/// let config = OpcUaConfig::builder()
///     .endpoint("opc.tcp://secure-server:4840")
///     .security_mode(SecurityMode::SignAndEncrypt)
///     .security_policy(SecurityPolicy::Basic256Sha256)
///     .username("operator", "secret")
///     .request_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert!(config.uses_security());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpcUaConfig {
    /// Server endpoint URL (e.g., "opc.tcp://localhost:4840").
    pub endpoint: String,

    /// Security mode.
    #[serde(default)]
    pub security_mode: SecurityMode,

    /// Security policy.
    #[serde(default)]
    pub security_policy: SecurityPolicy,

    /// User authentication token.
    #[serde(default)]
    pub user_token: UserTokenType,

    /// Application name presented to the server.
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Application URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_uri: Option<String>,

    /// Session timeout.
    #[serde(default = "default_session_timeout")]
    #[serde(with = "humantime_serde")]
    pub session_timeout: Duration,

    /// Timeout applied to every service call.
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// PKI directory for the client certificate and trusted server certificates.
    #[serde(default = "default_pki_dir")]
    pub pki_dir: String,

    /// Whether to trust all server certificates.
    #[serde(default = "default_trust_all_certificates")]
    pub trust_all_certificates: bool,
}

fn default_application_name() -> String {
    "uaprobe".to_string()
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_pki_dir() -> String {
    "./pki".to_string()
}

fn default_trust_all_certificates() -> bool {
    true
}

impl OpcUaConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> OpcUaConfigBuilder {
        OpcUaConfigBuilder::default()
    }

    /// Creates a simple configuration with just the endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), OpcUaError> {
        if self.endpoint.is_empty() {
            return Err(ConfigurationError::missing_field("endpoint").into());
        }
        if !self.endpoint.starts_with("opc.tcp://") {
            return Err(ConfigurationError::invalid_endpoint(
                &self.endpoint,
                "Endpoint must start with opc.tcp://",
            )
            .into());
        }

        let mismatch = match (self.security_mode, self.security_policy) {
            (SecurityMode::None, SecurityPolicy::None) => None,
            (SecurityMode::None, _) => {
                Some("Security policy requires a security mode other than None")
            }
            (_, SecurityPolicy::None) => {
                Some("Security mode requires a security policy other than None")
            }
            _ => None,
        };
        if let Some(message) = mismatch {
            return Err(ConfigurationError::invalid_security(message).into());
        }

        let timeouts = [("Session", self.session_timeout), ("Request", self.request_timeout)];
        for (label, timeout) in timeouts {
            if timeout.is_zero() {
                let reason = format!("{label} timeout must be greater than 0");
                return Err(ConfigurationError::invalid_timeout(timeout, reason).into());
            }
        }
        Ok(())
    }

    /// Returns the effective application URI.
    pub fn effective_application_uri(&self) -> String {
        self.application_uri
            .clone()
            .unwrap_or_else(|| format!("urn:{}:client", self.application_name.replace(' ', "")))
    }

    /// Returns `true` if this configuration uses security.
    #[inline]
    pub fn uses_security(&self) -> bool {
        self.security_mode != SecurityMode::None
    }
}

impl Default for OpcUaConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            security_mode: SecurityMode::default(),
            security_policy: SecurityPolicy::default(),
            user_token: UserTokenType::default(),
            application_name: default_application_name(),
            application_uri: None,
            session_timeout: default_session_timeout(),
            request_timeout: default_request_timeout(),
            pki_dir: default_pki_dir(),
            trust_all_certificates: default_trust_all_certificates(),
        }
    }
}

// =============================================================================
// OpcUaConfigBuilder
// =============================================================================

/// Builder for `OpcUaConfig`. Unset fields keep their defaults.
#[derive(Debug, Default)]
pub struct OpcUaConfigBuilder {
    config: OpcUaConfig,
}

impl OpcUaConfigBuilder {
    /// Sets the server endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn security_mode(mut self, mode: SecurityMode) -> Self {
        self.config.security_mode = mode;
        self
    }

    pub fn security_policy(mut self, policy: SecurityPolicy) -> Self {
        self.config.security_policy = policy;
        self
    }

    /// Activates the session with a user name and password.
    pub fn username(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.user_token = UserTokenType::UserName {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.config.user_token = UserTokenType::Anonymous;
        self
    }

    /// Sets the timeout applied to every service call.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn pki_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.pki_dir = dir.into();
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<OpcUaConfig, OpcUaError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // NodeId Tests
    // =========================================================================

    #[test]
    fn test_canonical_numeric() {
        let node = NodeId::numeric(2, 1000);
        assert_eq!(node.canonical_id().as_deref(), Some("ns=2;i=1000"));
    }

    #[test]
    fn test_canonical_string() {
        let node = NodeId::string(3, "Temperature");
        assert_eq!(node.canonical_id().as_deref(), Some("ns=3;s=Temperature"));
    }

    #[test]
    fn test_canonical_keeps_namespace_zero() {
        assert_eq!(NodeId::OBJECTS_FOLDER.canonical_id().as_deref(), Some("ns=0;i=85"));
        assert_eq!(NodeId::OBJECTS_FOLDER.to_opc_string(), "i=85");
    }

    #[test]
    fn test_canonical_absent_for_guid_and_opaque() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(NodeId::guid(1, uuid).canonical_id(), None);
        assert_eq!(NodeId::opaque(1, vec![1, 2, 3, 4]).canonical_id(), None);
        assert!(!NodeIdentifier::Guid(uuid).has_canonical_form());
    }

    #[test]
    fn test_node_id_parse() {
        let node: NodeId = "ns=2;i=1001".parse().unwrap();
        assert_eq!(node.namespace_index, 2);
        assert_eq!(node.identifier, NodeIdentifier::Numeric(1001));

        let node: NodeId = "ns=2;s=Line1;Motor".parse().unwrap();
        assert_eq!(node.identifier, NodeIdentifier::String("Line1;Motor".into()));

        let node: NodeId = "i=85".parse().unwrap();
        assert_eq!(node, NodeId::OBJECTS_FOLDER);

        let node: NodeId = "ns=1;g=550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert!(matches!(node.identifier, NodeIdentifier::Guid(_)));

        let node: NodeId = "ns=1;b=AQIDBA==".parse().unwrap();
        assert_eq!(node.identifier, NodeIdentifier::Opaque(vec![1, 2, 3, 4]));
        assert_eq!(node.to_opc_string(), "ns=1;b=AQIDBA==");
    }

    #[test]
    fn test_node_id_parse_errors() {
        assert!("ns=x;i=1".parse::<NodeId>().is_err());
        assert!("ns=1".parse::<NodeId>().is_err());
        assert!("ns=1;i=abc".parse::<NodeId>().is_err());
        assert!("ns=1;s=".parse::<NodeId>().is_err());
        assert!("Temperature".parse::<NodeId>().is_err());
    }

    // =========================================================================
    // NodeClass Tests
    // =========================================================================

    #[test]
    fn test_node_class_labels() {
        assert_eq!(NodeClass::Object.label(), "Object");
        assert_eq!(NodeClass::ObjectType.label(), "Objecttype");
        assert_eq!(NodeClass::VariableType.to_string(), "Variabletype");
        assert_eq!(NodeClass::ReferenceType.label(), "Referencetype");
        assert_eq!(NodeClass::DataType.label(), "Datatype");
    }

    #[test]
    fn test_node_class_values() {
        for class in NodeClass::ALL {
            assert_eq!(NodeClass::from_value(class.value()), Some(class));
        }
        assert_eq!(NodeClass::from_value(3), None);
        assert!(NodeClass::Object.is_object());
        assert!(!NodeClass::ObjectType.is_object());
    }

    #[test]
    fn test_qualified_name_from_str() {
        let name = QualifiedName::from("2:Boiler");
        assert_eq!(name.namespace_index, 2);
        assert_eq!(name.to_string(), "2:Boiler");
        assert_eq!(QualifiedName::from("Server").namespace_index, 0);
    }

    // =========================================================================
    // StatusCode Tests
    // =========================================================================

    #[test]
    fn test_status_code_severity() {
        assert!(StatusCode::GOOD.is_good());
        assert!(StatusCode::BAD_TIMEOUT.is_bad());
        assert!(!StatusCode::BAD_TIMEOUT.is_good());
        assert!(StatusCode::new(0x4000_0000).is_uncertain());
        assert!(!StatusCode::new(0x4000_0000).is_bad());
    }

    #[test]
    fn test_status_code_names() {
        assert_eq!(StatusCode::BAD_NODE_ID_UNKNOWN.name(), "BadNodeIdUnknown");
        assert_eq!(StatusCode::BAD_NOT_WRITABLE.name(), "BadNotWritable");
        assert_eq!(StatusCode::new(0x8034_0400).name(), "BadNodeIdUnknown");
        assert_eq!(StatusCode::new(0x80FF_0000).name(), "Bad");
        assert_eq!(
            StatusCode::BAD_SERVICE_UNSUPPORTED.to_string(),
            "BadServiceUnsupported (0x800B0000)"
        );
    }

    // =========================================================================
    // Configuration Tests
    // =========================================================================

    #[test]
    fn test_config_defaults() {
        let config = OpcUaConfig::builder()
            .endpoint("opc.tcp://localhost:4840")
            .build()
            .unwrap();
        assert_eq!(config.security_mode, SecurityMode::None);
        assert!(config.user_token.is_anonymous());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.effective_application_uri(), "urn:uaprobe:client");
    }

    #[test]
    fn test_config_validation() {
        assert!(OpcUaConfig::builder().build().is_err());
        assert!(OpcUaConfig::builder().endpoint("http://localhost").build().is_err());
        assert!(OpcUaConfig::builder()
            .endpoint("opc.tcp://localhost:4840")
            .security_mode(SecurityMode::Sign)
            .build()
            .is_err());
        assert!(OpcUaConfig::builder()
            .endpoint("opc.tcp://localhost:4840")
            .request_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_config_serde_durations() {
        let json = r#"{"endpoint":"opc.tcp://plc:4840","request_timeout":"3s"}"#;
        let config: OpcUaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.session_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_user_token_debug_hides_password() {
        let token = UserTokenType::UserName {
            username: "operator".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", token).contains("hunter2"));
        assert_eq!(token.to_string(), "UserName(operator)");
    }

    #[test]
    fn test_security_parsing() {
        let mode: SecurityMode = "sign-and-encrypt".parse().unwrap();
        assert_eq!(mode, SecurityMode::SignAndEncrypt);
        assert_eq!(
            "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256"
                .parse::<SecurityPolicy>()
                .unwrap(),
            SecurityPolicy::Basic256Sha256
        );
        assert_eq!(
            "aes128-sha256-rsaoaep".parse::<SecurityPolicy>().unwrap(),
            SecurityPolicy::Aes128Sha256RsaOaep
        );
        assert_eq!(SecurityPolicy::Aes256Sha256RsaPss.to_string(), "Aes256_Sha256_RsaPss");
        assert!("rot13".parse::<SecurityPolicy>().is_err());
    }
}
