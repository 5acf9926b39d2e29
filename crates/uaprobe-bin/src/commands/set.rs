// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single value write (`-s`).

use std::io::Write;

use tracing::debug;
use uaprobe_opcua::{set_value, NodeId, OpcUaTransport};

use super::get::write_line;
use super::{connect, finish};
use crate::cli::{parse_item, Cli, OutputFormat};
use crate::error::BinResult;

/// Writes `value` to `item` on the server at `url`.
pub async fn set(cli: &Cli, url: &str, item: &str, value: &str) -> BinResult<()> {
    let node_id = parse_item(item)?;
    let transport = connect(cli, url).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = write_and_print(&transport, &node_id, value, cli.output, &mut out).await;
    finish(transport, result).await
}

/// Writes `text` to `node_id` and prints the value that was written.
pub async fn write_and_print<T, W>(
    transport: &T,
    node_id: &NodeId,
    text: &str,
    output: OutputFormat,
    out: &mut W,
) -> BinResult<()>
where
    T: OpcUaTransport + ?Sized,
    W: Write,
{
    let outcome = set_value(transport, node_id, text).await?;
    debug!(previous = %outcome.previous, "Replaced value");
    write_line(out, node_id, &outcome.written, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::mock::MockTransport;
    use uaprobe_opcua::{OpcUaValue, StatusCode};

    fn with_value(node: &NodeId, value: OpcUaValue) -> MockTransport {
        let transport = MockTransport::default();
        transport.values.lock().unwrap().insert(node.to_opc_string(), value);
        transport
    }

    #[tokio::test]
    async fn test_write_keeps_type() {
        let node = NodeId::numeric(2, 1000);
        let transport = with_value(&node, OpcUaValue::Int16(3));

        let mut out = Vec::new();
        write_and_print(&transport, &node, "-42", OutputFormat::Tsv, &mut out)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "ns=2;i=1000\tInt16\t-42\n");
        assert_eq!(
            transport.values.lock().unwrap().get(&node.to_opc_string()),
            Some(&OpcUaValue::Int16(-42))
        );
    }

    #[tokio::test]
    async fn test_out_of_range_not_written() {
        let node = NodeId::string(2, "Counter");
        let transport = with_value(&node, OpcUaValue::Byte(1));

        let mut out = Vec::new();
        let err = write_and_print(&transport, &node, "300", OutputFormat::Tsv, &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_OUT_OF_RANGE);
        assert_eq!(
            transport.values.lock().unwrap().get(&node.to_opc_string()),
            Some(&OpcUaValue::Byte(1))
        );
        assert!(out.is_empty());
    }
}
