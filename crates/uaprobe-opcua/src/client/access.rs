// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single-value read and write on top of [`OpcUaTransport`].

use tracing::{debug, info};

use crate::error::{OpcUaResult, OperationError};
use crate::types::NodeId;

use super::conversion::value_like;
use super::transport::{OpcUaTransport, OpcUaValue, ReadResult};

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOutcome {
    /// Value before the write.
    pub previous: OpcUaValue,

    /// Value that was written.
    pub written: OpcUaValue,
}

/// Reads the Value attribute of `node_id`.
///
/// # Errors
///
/// A bad read status is returned as [`OperationError::ReadFailed`] carrying
/// that status.
pub async fn get_value<T>(transport: &T, node_id: &NodeId) -> OpcUaResult<ReadResult>
where
    T: OpcUaTransport + ?Sized,
{
    let result = transport.read_value(node_id).await?;
    if result.is_bad() {
        return Err(OperationError::read_failed(node_id.to_opc_string(), result.status).into());
    }
    debug!(node_id = %node_id, status = %result.status, "Read value");
    Ok(result)
}

/// Writes `text` to `node_id`, converted to the type of the node's current
/// value.
///
/// # Errors
///
/// Fails if the current value cannot be read, the text does not convert, or
/// the server reports a bad write status.
pub async fn set_value<T>(transport: &T, node_id: &NodeId, text: &str) -> OpcUaResult<SetOutcome>
where
    T: OpcUaTransport + ?Sized,
{
    let current = get_value(transport, node_id).await?;
    let previous = current.value.unwrap_or_default();
    let written = value_like(&previous, text)?;

    let result = transport.write_value(node_id, written.clone()).await?;
    if !result.is_good() {
        return Err(OperationError::write_failed(node_id.to_opc_string(), result.status).into());
    }

    info!(node_id = %node_id, previous = %previous, written = %written, "Value written");
    Ok(SetOutcome { previous, written })
}
