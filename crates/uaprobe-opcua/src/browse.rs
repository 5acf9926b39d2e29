// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Address-space walker.
//!
//! Walks the forward references below a root node depth-first, emitting one
//! [`NodeRecord`] per node the first time it is reached.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Walker                              │
//! │       (explicit frame stack, VisitedSet, depth ceiling)      │
//! └──────────────────────────────────────────────────────────────┘
//!            │ browse(node)                     │ record(..)
//!            ▼                                  ▼
//! ┌──────────────────────┐          ┌──────────────────────────────┐
//! │    OpcUaTransport    │          │         RecordSink           │
//! │                      │          │ TsvSink / JsonLinesSink / Vec│
//! └──────────────────────┘          └──────────────────────────────┘
//! ```
//!
//! For each reference, in server order:
//!
//! 1. targets without a canonical id (GUID, opaque) are skipped
//! 2. targets already visited are skipped
//! 3. references found at or beyond the depth ceiling are skipped
//! 4. otherwise the target is marked visited and recorded, and Object
//!    targets are browsed one level deeper
//!
//! Termination follows from the visited set and the ceiling. The root is
//! always browsed, so a ceiling of 0 still reports a root browse failure.
//! The stack holds at most `max_depth.max(1)` frames.
//!
//! # Examples
//!
//! ```rust,ignore
//! use uaprobe_opcua::browse::{Walker, TsvSink};
//! use uaprobe_opcua::types::NodeId;
//!
//! let mut sink = TsvSink::new(std::io::stdout().lock());
//! let summary = Walker::default()
//!     .walk(&transport, &NodeId::OBJECTS_FOLDER, &mut sink)
//!     .await?;
//! ```

use std::collections::HashSet;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::{OpcUaTransport, ReferenceDescription};
use crate::error::{OpcUaError, OpcUaResult};
use crate::types::{NodeClass, NodeId};

/// Default depth ceiling.
pub const DEFAULT_MAX_DEPTH: usize = 100;

// =============================================================================
// WalkerConfig
// =============================================================================

/// Walker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// References found at this depth or deeper are not recorded.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl WalkerConfig {
    /// Sets the depth ceiling.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

// =============================================================================
// VisitedSet
// =============================================================================

/// Canonical ids seen during one walk, in first-visit order.
///
/// Append-only; a fresh set is created for every walk.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a canonical id. Returns `false` if it was already present.
    pub fn insert(&mut self, canonical_id: &str) -> bool {
        if self.seen.contains(canonical_id) {
            return false;
        }
        self.seen.insert(canonical_id.to_string());
        self.order.push(canonical_id.to_string());
        true
    }

    /// Returns `true` if the id has been visited.
    pub fn contains(&self, canonical_id: &str) -> bool {
        self.seen.contains(canonical_id)
    }

    /// Number of visited ids.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing was visited.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates ids in first-visit order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

// =============================================================================
// NodeRecord
// =============================================================================

/// One visited node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node class of the node.
    pub node_class: NodeClass,

    /// Depth at which the node was found; children of the root are at 0.
    pub depth: usize,

    /// Canonical node id (`ns=X;i=N` or `ns=X;s=S`).
    pub node_id: String,

    /// Browse name text.
    pub browse_name: String,

    /// Display name text.
    pub display_name: String,
}

impl NodeRecord {
    fn from_reference(reference: &ReferenceDescription, node_id: String, depth: usize) -> Self {
        Self {
            node_class: reference.node_class,
            depth,
            node_id,
            browse_name: reference.browse_name.name.clone(),
            display_name: reference.display_name.clone(),
        }
    }

    /// Formats the record as a tab separated line without the newline.
    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.node_class.label(),
            self.depth,
            self.node_id,
            self.browse_name,
            self.display_name
        )
    }
}

// =============================================================================
// RecordSink
// =============================================================================

/// Destination for walk records.
pub trait RecordSink {
    /// Called once before the first browse.
    fn begin(&mut self) -> OpcUaResult<()> {
        Ok(())
    }

    /// Called for every newly visited node.
    fn record(&mut self, record: &NodeRecord) -> OpcUaResult<()>;

    /// Called once after a successful walk.
    fn finish(&mut self) -> OpcUaResult<()> {
        Ok(())
    }
}

impl RecordSink for Vec<NodeRecord> {
    fn record(&mut self, record: &NodeRecord) -> OpcUaResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Column header written by [`TsvSink`].
pub const TSV_HEADER: &str = "NODECLASS\tDEPTH\tNAMESPACE/NODEID\tBROWSENAME\tDISPLAYNAME";

/// Writes records as tab separated lines under a column header.
pub struct TsvSink<W: Write> {
    writer: W,
}

impl<W: Write> TsvSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for TsvSink<W> {
    fn begin(&mut self) -> OpcUaResult<()> {
        writeln!(self.writer, "{}", TSV_HEADER)?;
        Ok(())
    }

    fn record(&mut self, record: &NodeRecord) -> OpcUaResult<()> {
        writeln!(self.writer, "{}", record.to_tsv())?;
        Ok(())
    }

    fn finish(&mut self) -> OpcUaResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes each record as a JSON object on its own line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn record(&mut self, record: &NodeRecord) -> OpcUaResult<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(std::io::Error::from)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> OpcUaResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// =============================================================================
// WalkSummary
// =============================================================================

/// Counters for one walk.
#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    /// Records emitted.
    pub records: usize,

    /// Browse service calls issued, including the root.
    pub browse_calls: usize,

    /// References skipped because the target has no canonical id.
    pub skipped_unsupported: usize,

    /// References skipped because the target was already visited.
    pub skipped_duplicate: usize,

    /// References skipped because they lie at or beyond the ceiling.
    pub skipped_depth: usize,

    /// Deepest depth recorded.
    pub max_depth_reached: usize,

    /// Ids visited, in first-visit order.
    pub visited: VisitedSet,
}

// =============================================================================
// Walker
// =============================================================================

struct Frame {
    references: std::vec::IntoIter<ReferenceDescription>,
    depth: usize,
}

/// Depth-first address-space walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    /// Creates a walker with the given settings.
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Walks everything reachable from `root` through forward references.
    ///
    /// # Errors
    ///
    /// A browse failure or a sink failure aborts the walk and is returned
    /// unchanged; records already emitted stay emitted.
    pub async fn walk<T, S>(
        &self,
        transport: &T,
        root: &NodeId,
        sink: &mut S,
    ) -> OpcUaResult<WalkSummary>
    where
        T: OpcUaTransport + ?Sized,
        S: RecordSink + ?Sized,
    {
        let mut summary = WalkSummary::default();
        sink.begin()?;

        let references = self.browse(transport, root, &mut summary).await?;
        let mut stack = vec![Frame {
            references: references.into_iter(),
            depth: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let depth = frame.depth;
            let Some(reference) = frame.references.next() else {
                stack.pop();
                continue;
            };

            let Some(node_id) = reference.node_id.canonical_id() else {
                trace!(node_id = %reference.node_id, "Skipping node without canonical id");
                summary.skipped_unsupported += 1;
                continue;
            };

            if summary.visited.contains(&node_id) {
                trace!(node_id = %node_id, "Skipping visited node");
                summary.skipped_duplicate += 1;
                continue;
            }

            if depth >= self.config.max_depth {
                trace!(node_id = %node_id, depth, "Skipping node beyond depth ceiling");
                summary.skipped_depth += 1;
                continue;
            }

            summary.visited.insert(&node_id);
            let record = NodeRecord::from_reference(&reference, node_id, depth);
            sink.record(&record)?;
            summary.records += 1;
            summary.max_depth_reached = summary.max_depth_reached.max(depth);

            let child_depth = depth + 1;
            if reference.node_class.is_object() && child_depth < self.config.max_depth {
                let children = self.browse(transport, &reference.node_id, &mut summary).await?;
                stack.push(Frame {
                    references: children.into_iter(),
                    depth: child_depth,
                });
            }
        }

        sink.finish()?;
        debug!(
            records = summary.records,
            browse_calls = summary.browse_calls,
            skipped_unsupported = summary.skipped_unsupported,
            skipped_duplicate = summary.skipped_duplicate,
            skipped_depth = summary.skipped_depth,
            "Walk complete"
        );
        Ok(summary)
    }

    async fn browse<T>(
        &self,
        transport: &T,
        node_id: &NodeId,
        summary: &mut WalkSummary,
    ) -> OpcUaResult<Vec<ReferenceDescription>>
    where
        T: OpcUaTransport + ?Sized,
    {
        summary.browse_calls += 1;
        transport.browse(node_id).await.inspect_err(|e: &OpcUaError| {
            debug!(node_id = %node_id, status = %e.status_code(), "Browse failed");
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(class: NodeClass, depth: usize, id: &str) -> NodeRecord {
        NodeRecord {
            node_class: class,
            depth,
            node_id: id.to_string(),
            browse_name: "Temperature".into(),
            display_name: "Boiler Temperature".into(),
        }
    }

    #[test]
    fn test_visited_set_preserves_order() {
        let mut visited = VisitedSet::new();
        assert!(visited.insert("ns=0;i=2253"));
        assert!(visited.insert("ns=2;s=Boiler"));
        assert!(!visited.insert("ns=0;i=2253"));
        assert_eq!(visited.len(), 2);
        assert_eq!(visited.iter().collect::<Vec<_>>(), ["ns=0;i=2253", "ns=2;s=Boiler"]);
    }

    #[test]
    fn test_tsv_sink() {
        let mut sink = TsvSink::new(Vec::new());
        sink.begin().unwrap();
        sink.record(&record(NodeClass::ObjectType, 3, "ns=3;s=Temperature")).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            format!("{TSV_HEADER}\nObjecttype\t3\tns=3;s=Temperature\tTemperature\tBoiler Temperature\n")
        );
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.begin().unwrap();
        sink.record(&record(NodeClass::Variable, 0, "ns=2;i=1000")).unwrap();
        sink.record(&record(NodeClass::Object, 1, "ns=2;i=1001")).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: NodeRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.node_id, "ns=2;i=1001");
        assert_eq!(parsed.depth, 1);
    }

    #[test]
    fn test_walker_config() {
        assert_eq!(WalkerConfig::default().max_depth, 100);
        assert_eq!(WalkerConfig::default().with_max_depth(3).max_depth, 3);
        let config: WalkerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }
}
