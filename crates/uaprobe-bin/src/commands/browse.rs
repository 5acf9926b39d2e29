// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Objects folder walk (`-b`).

use std::io::Write;

use tracing::info;
use uaprobe_opcua::{
    JsonLinesSink, NodeId, OpcUaTransport, TsvSink, WalkSummary, Walker, WalkerConfig,
};

use super::{connect, finish};
use crate::cli::{Cli, OutputFormat};
use crate::error::BinResult;

/// Connects to `url` and walks the Objects folder.
pub async fn browse(cli: &Cli, url: &str) -> BinResult<()> {
    let transport = connect(cli, url).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = walk_objects(&transport, cli.output, cli.max_depth, &mut out).await;
    let summary = finish(transport, result).await?;

    info!(
        records = summary.records,
        browse_calls = summary.browse_calls,
        duplicates = summary.skipped_duplicate,
        unsupported = summary.skipped_unsupported,
        beyond_ceiling = summary.skipped_depth,
        "Browse complete"
    );
    Ok(())
}

/// Walks the Objects folder over `transport`, writing records to `out`.
pub async fn walk_objects<T, W>(
    transport: &T,
    output: OutputFormat,
    max_depth: usize,
    out: &mut W,
) -> BinResult<WalkSummary>
where
    T: OpcUaTransport + ?Sized,
    W: Write,
{
    let walker = Walker::new(WalkerConfig::default().with_max_depth(max_depth));
    let root = NodeId::OBJECTS_FOLDER;

    let summary = match output {
        OutputFormat::Tsv => {
            writeln!(out, "Browsing nodes in objects folder:")?;
            let mut sink = TsvSink::new(&mut *out);
            walker.walk(transport, &root, &mut sink).await?
        }
        OutputFormat::Json => {
            let mut sink = JsonLinesSink::new(&mut *out);
            walker.walk(transport, &root, &mut sink).await?
        }
    };
    out.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::mock::MockTransport;
    use uaprobe_opcua::{NodeClass, ReferenceDescription};

    fn plant() -> MockTransport {
        let mut transport = MockTransport::default();
        transport.children.insert(
            NodeId::OBJECTS_FOLDER.to_opc_string(),
            vec![ReferenceDescription::new(
                NodeId::string(2, "Line1"),
                NodeClass::Object,
                "Line1",
                "Line 1",
            )],
        );
        transport.children.insert(
            NodeId::string(2, "Line1").to_opc_string(),
            vec![
                ReferenceDescription::new(
                    NodeId::numeric(2, 7),
                    NodeClass::Variable,
                    "Speed",
                    "Speed",
                ),
                ReferenceDescription::new(
                    NodeId::OBJECTS_FOLDER,
                    NodeClass::Object,
                    "Objects",
                    "Objects",
                ),
            ],
        );
        transport
    }

    #[tokio::test]
    async fn test_tsv_output() {
        let transport = plant();
        let mut out = Vec::new();
        let summary = walk_objects(&transport, OutputFormat::Tsv, 100, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Browsing nodes in objects folder:");
        assert_eq!(lines[1], "NODECLASS\tDEPTH\tNAMESPACE/NODEID\tBROWSENAME\tDISPLAYNAME");
        assert_eq!(lines[2], "Object\t0\tns=2;s=Line1\tLine1\tLine 1");
        assert_eq!(lines[3], "Variable\t1\tns=2;i=7\tSpeed\tSpeed");
        // The back reference to Objects is printed once, then never again.
        assert_eq!(lines[4], "Object\t1\tns=0;i=85\tObjects\tObjects");
        assert_eq!(lines.len(), 5);
        assert_eq!(summary.records, 3);
    }

    #[tokio::test]
    async fn test_json_output_has_no_headers() {
        let transport = plant();
        let mut out = Vec::new();
        walk_objects(&transport, OutputFormat::Json, 100, &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Browsing nodes"));
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["node_id"], "ns=2;s=Line1");
        assert_eq!(first["depth"], 0);
    }

    #[tokio::test]
    async fn test_depth_ceiling() {
        let transport = plant();
        let mut out = Vec::new();
        let summary = walk_objects(&transport, OutputFormat::Tsv, 1, &mut out)
            .await
            .unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.browse_calls, 1);
    }
}
