// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client routines for the `uaprobe` diagnostic tool.
//!
//! # Features
//!
//! - Discovery report: FindServersOnNetwork, FindServers and GetEndpoints
//! - Address-space walker with cycle detection and a depth ceiling
//! - Single value read and typed write
//!
//! Server access goes through the [`OpcUaTransport`] and
//! [`DiscoveryTransport`] traits. The `real-transport` feature provides
//! implementations backed by the `opcua` crate.
//!
//! # Error Handling
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Session and endpoint issues
//! ├── Browse        - Browse service faults and bad statuses
//! ├── Operation     - Read/write failures
//! ├── Conversion    - Text to value conversion
//! ├── Configuration - Invalid settings and node ids
//! ├── Discovery     - Discovery service failures
//! └── Io            - Output failures
//! ```
//!
//! Every error carries an OPC UA [`StatusCode`].
//!
//! # Example
//!
//! ```rust,ignore
//! use uaprobe_opcua::{NodeId, OpcUaConfig, RealOpcUaTransport, OpcUaTransport, Walker, TsvSink};
//!
//! let config = OpcUaConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()?;
//!
//! let mut transport = RealOpcUaTransport::new(config);
//! transport.connect().await?;
//!
//! let mut sink = TsvSink::new(std::io::stdout().lock());
//! Walker::default().walk(&transport, &NodeId::OBJECTS_FOLDER, &mut sink).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod browse;
pub mod client;
pub mod discovery;
pub mod error;
pub mod types;

pub use error::{
    BrowseError, ConfigurationError, ConnectionError, ConversionError, DiscoveryError, ErrorCode,
    ErrorSeverity, OpcUaError, OpcUaResult, OperationError,
};

pub use types::{
    NodeClass, NodeId, NodeIdentifier, OpcUaConfig, OpcUaConfigBuilder, OpcUaDataType,
    QualifiedName, SecurityMode, SecurityPolicy, StatusCode, UserTokenType,
};

pub use client::{
    get_value, set_value, DiscoveryTransport, OpcUaTransport, OpcUaValue, ReadResult,
    ReferenceDescription, SetOutcome, TransportState, WriteResult,
};

#[cfg(feature = "real-transport")]
pub use client::{RealDiscoveryTransport, RealOpcUaTransport};

pub use browse::{
    JsonLinesSink, NodeRecord, RecordSink, TsvSink, VisitedSet, WalkSummary, Walker,
    WalkerConfig, DEFAULT_MAX_DEPTH,
};

pub use discovery::{
    discover, ApplicationDescription, ApplicationType, DiscoverySummary, EndpointDescription,
    MessageSecurityMode, ServerOnNetwork,
};
