// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single value read (`-g`).

use std::io::Write;

use uaprobe_opcua::{get_value, NodeId, OpcUaTransport, OpcUaValue};

use super::{connect, display_id, finish};
use crate::cli::{parse_item, Cli, OutputFormat};
use crate::error::BinResult;

/// Reads `item` from the server at `url` and prints it.
pub async fn get(cli: &Cli, url: &str, item: &str) -> BinResult<()> {
    let node_id = parse_item(item)?;
    let transport = connect(cli, url).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = print_value(&transport, &node_id, cli.output, &mut out).await;
    finish(transport, result).await
}

/// Reads `node_id` and writes one line describing its value.
pub async fn print_value<T, W>(
    transport: &T,
    node_id: &NodeId,
    output: OutputFormat,
    out: &mut W,
) -> BinResult<()>
where
    T: OpcUaTransport + ?Sized,
    W: Write,
{
    let result = get_value(transport, node_id).await?;
    let value = result.value.unwrap_or_default();
    write_line(out, node_id, &value, output)
}

pub(super) fn write_line<W: Write>(
    out: &mut W,
    node_id: &NodeId,
    value: &OpcUaValue,
    output: OutputFormat,
) -> BinResult<()> {
    let id = display_id(node_id);
    match output {
        OutputFormat::Tsv => writeln!(out, "{}\t{}\t{}", id, value.type_name(), value)?,
        OutputFormat::Json => {
            let line = serde_json::json!({
                "node_id": id,
                "data_type": value.type_name(),
                "value": value.to_string(),
            });
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::mock::MockTransport;
    use crate::error::BinError;
    use uaprobe_opcua::StatusCode;

    #[tokio::test]
    async fn test_print_double() {
        let transport = MockTransport::default();
        let node = NodeId::string(2, "Temperature");
        transport
            .values
            .lock()
            .unwrap()
            .insert(node.to_opc_string(), OpcUaValue::Double(21.5));

        let mut out = Vec::new();
        print_value(&transport, &node, OutputFormat::Tsv, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ns=2;s=Temperature\tDouble\t21.5\n");
    }

    #[tokio::test]
    async fn test_print_json() {
        let transport = MockTransport::default();
        let node = NodeId::numeric(2, 1000);
        transport
            .values
            .lock()
            .unwrap()
            .insert(node.to_opc_string(), OpcUaValue::Boolean(true));

        let mut out = Vec::new();
        print_value(&transport, &node, OutputFormat::Json, &mut out).await.unwrap();
        let line: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(line["node_id"], "ns=2;i=1000");
        assert_eq!(line["value"], "true");
    }

    #[tokio::test]
    async fn test_unknown_node_fails_with_status() {
        let transport = MockTransport::default();
        let mut out = Vec::new();
        let err = print_value(&transport, &NodeId::numeric(2, 1), OutputFormat::Tsv, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, BinError::OpcUa(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_NODE_ID_UNKNOWN);
        assert!(out.is_empty());
    }
}
