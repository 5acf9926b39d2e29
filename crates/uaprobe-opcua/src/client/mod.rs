// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client layer.
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐
//! │    Walker    │  │  discover()  │  │ get/set_value()  │
//! └──────┬───────┘  └──────┬───────┘  └────────┬─────────┘
//!        │                 │                   │
//!        ▼                 ▼                   ▼
//! ┌──────────────┐  ┌────────────────────┐  ┌──────────────┐
//! │OpcUaTransport│  │ DiscoveryTransport │  │ conversion   │
//! └──────┬───────┘  └─────────┬──────────┘  └──────────────┘
//!        └──────────┬─────────┘
//!                   ▼
//!     RealOpcUaTransport / RealDiscoveryTransport
//!          (`opcua` crate, feature "real-transport")
//! ```

mod access;
pub mod conversion;
mod transport;

#[cfg(feature = "real-transport")]
mod real_transport;

pub use access::{get_value, set_value, SetOutcome};
pub use conversion::{parse_bool, parse_value, value_like};
pub use transport::{
    DiscoveryTransport, OpcUaTransport, OpcUaValue, ReadResult, ReferenceDescription,
    TransportState, WriteResult,
};

#[cfg(feature = "real-transport")]
pub use real_transport::{RealDiscoveryTransport, RealOpcUaTransport};
