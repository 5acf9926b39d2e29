// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `discover`: discovery report (`-d`)
//! - `browse`: walk the Objects folder (`-b`)
//! - `get`: read one value (`-g`)
//! - `set`: write one value (`-s`)

mod browse;
mod discover;
mod get;
mod set;

pub use browse::{browse, walk_objects};
pub use discover::discover;
pub use get::{get, print_value};
pub use set::{set, write_and_print};

use tracing::debug;
use uaprobe_opcua::{NodeId, OpcUaTransport, RealOpcUaTransport};

use crate::cli::{Cli, Mode};
use crate::error::{BinError, BinResult};

/// Executes the mode selected on the command line.
pub async fn execute(cli: &Cli) -> BinResult<()> {
    let mode = cli
        .mode()
        .ok_or_else(|| BinError::usage("one of -d, -b, -g or -s is required"))?;
    debug!(?mode, "Executing");

    let result = match &mode {
        Mode::Discover { url } => discover::discover(cli, url).await,
        Mode::Browse { url } => browse::browse(cli, url).await,
        Mode::Get { url, item } => get::get(cli, url, item).await,
        Mode::Set { url, item, value } => set::set(cli, url, item, value).await,
    };

    if let Some(e) = result.as_ref().err().and_then(BinError::as_opcua) {
        e.log(mode.name());
    }
    result
}

/// Opens a session with `url` using the CLI's connection settings.
async fn connect(cli: &Cli, url: &str) -> BinResult<RealOpcUaTransport> {
    let mut transport = RealOpcUaTransport::new(cli.opcua_config(url)?);
    transport
        .connect()
        .await
        .map_err(|e| BinError::from(e).with_context(format!("connecting to {}", url)))?;
    Ok(transport)
}

/// Closes the session, keeping the operation's result.
async fn finish<T>(mut transport: RealOpcUaTransport, result: BinResult<T>) -> BinResult<T> {
    if let Err(e) = transport.disconnect().await {
        debug!(error = %e, "Disconnect failed");
    }
    result
}

/// Canonical id when the node has one, the standard text form otherwise.
fn display_id(node_id: &NodeId) -> String {
    node_id.canonical_id().unwrap_or_else(|| node_id.to_opc_string())
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory transport for command tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uaprobe_opcua::{
        NodeId, OpcUaResult, OpcUaTransport, OpcUaValue, ReadResult, ReferenceDescription,
        StatusCode, TransportState, WriteResult,
    };

    #[derive(Default)]
    pub struct MockTransport {
        pub children: HashMap<String, Vec<ReferenceDescription>>,
        pub values: Mutex<HashMap<String, OpcUaValue>>,
    }

    #[async_trait]
    impl OpcUaTransport for MockTransport {
        async fn connect(&mut self) -> OpcUaResult<()> {
            Ok(())
        }

        async fn disconnect(&mut self) -> OpcUaResult<()> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        fn state(&self) -> TransportState {
            TransportState::Connected
        }

        async fn browse(&self, node_id: &NodeId) -> OpcUaResult<Vec<ReferenceDescription>> {
            Ok(self.children.get(&node_id.to_opc_string()).cloned().unwrap_or_default())
        }

        async fn read_value(&self, node_id: &NodeId) -> OpcUaResult<ReadResult> {
            Ok(match self.values.lock().unwrap().get(&node_id.to_opc_string()) {
                Some(value) => ReadResult::success(node_id.clone(), value.clone()),
                None => ReadResult::failure(node_id.clone(), StatusCode::BAD_NODE_ID_UNKNOWN),
            })
        }

        async fn write_value(
            &self,
            node_id: &NodeId,
            value: OpcUaValue,
        ) -> OpcUaResult<WriteResult> {
            self.values.lock().unwrap().insert(node_id.to_opc_string(), value);
            Ok(WriteResult::success(node_id.clone()))
        }

        fn endpoint(&self) -> &str {
            "opc.tcp://mock:4840"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_id() {
        assert_eq!(display_id(&NodeId::numeric(0, 85)), "ns=0;i=85");
        assert_eq!(display_id(&NodeId::opaque(1, vec![1, 2])), "ns=1;b=AQI=");
    }
}
