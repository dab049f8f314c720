use super::{GraphBatch, GraphEdge, GraphSink, NodeLabel, NodeRef, WriteSummary};
use async_trait::async_trait;
use sg_core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct MemoryGraph {
    nodes: BTreeMap<NodeRef, serde_json::Value>,
    edges: BTreeSet<GraphEdge>,
}

/// In-process graph sink with the same upsert semantics as the database
/// store. Used for dry runs and tests.
#[derive(Default)]
pub struct MemoryGraphSink {
    graph: Mutex<MemoryGraph>,
}

impl MemoryGraphSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn node(&self, label: NodeLabel, key: &str) -> Option<serde_json::Value> {
        let graph = self.graph.lock().await;
        graph
            .nodes
            .get(&NodeRef {
                label,
                key: key.to_string(),
            })
            .cloned()
    }

    pub async fn node_count(&self) -> usize {
        self.graph.lock().await.nodes.len()
    }

    pub async fn edges(&self) -> Vec<GraphEdge> {
        self.graph.lock().await.edges.iter().cloned().collect()
    }
}

impl MemoryGraph {
    fn apply(&mut self, batch: &GraphBatch) -> WriteSummary {
        for node in &batch.nodes {
            self.nodes.insert(node.node.clone(), node.properties.clone());
        }
        for edge in &batch.edges {
            self.edges.insert(edge.clone());
        }
        WriteSummary {
            nodes: batch.nodes.len(),
            edges: batch.edges.len(),
        }
    }

    /// Drop the package node, everything keyed under `package.`, and every
    /// edge touching a dropped node.
    fn remove_package(&mut self, package: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node, _| !in_package(node, package));
        self.edges
            .retain(|e| !in_package(&e.source, package) && !in_package(&e.target, package));
        before - self.nodes.len()
    }
}

fn in_package(node: &NodeRef, package: &str) -> bool {
    (node.label == NodeLabel::Package && node.key == package)
        || node
            .key
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Every edge endpoint must be a node of the same batch.
fn validate(batch: &GraphBatch) -> Result<()> {
    let in_batch: BTreeSet<&NodeRef> = batch.nodes.iter().map(|n| &n.node).collect();
    for edge in &batch.edges {
        for end in [&edge.source, &edge.target] {
            if !in_batch.contains(end) {
                return Err(Error::Internal(format!(
                    "edge endpoint {}:{} is not part of the batch",
                    end.label, end.key
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl GraphSink for MemoryGraphSink {
    async fn write_batch(&self, batch: &GraphBatch) -> Result<WriteSummary> {
        validate(batch)?;
        Ok(self.graph.lock().await.apply(batch))
    }

    async fn replace_batch(&self, batch: &GraphBatch) -> Result<WriteSummary> {
        validate(batch)?;
        let mut graph = self.graph.lock().await;
        for package in batch.packages() {
            let removed = graph.remove_package(package);
            tracing::debug!(package = %package, removed, "cleared package");
        }
        Ok(graph.apply(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeLabel, GraphNode};
    use serde_json::json;

    fn package(name: &str) -> GraphNode {
        GraphNode {
            node: NodeRef {
                label: NodeLabel::Package,
                key: name.into(),
            },
            properties: json!({ "name": name }),
        }
    }

    #[tokio::test]
    async fn writing_twice_is_idempotent() {
        let sink = MemoryGraphSink::new();
        let batch = GraphBatch {
            nodes: vec![package("sample")],
            edges: vec![],
        };
        sink.write_batch(&batch).await.unwrap();
        sink.write_batch(&batch).await.unwrap();
        assert_eq!(sink.node_count().await, 1);
        assert_eq!(
            sink.node(NodeLabel::Package, "sample").await,
            Some(json!({ "name": "sample" }))
        );
    }

    #[tokio::test]
    async fn dangling_edge_rejects_the_whole_batch() {
        let sink = MemoryGraphSink::new();
        let batch = GraphBatch {
            nodes: vec![package("sample")],
            edges: vec![GraphEdge {
                source: NodeRef {
                    label: NodeLabel::Package,
                    key: "sample".into(),
                },
                target: NodeRef {
                    label: NodeLabel::Struct,
                    key: "sample.Missing".into(),
                },
                label: EdgeLabel::Declares,
            }],
        };
        assert!(sink.write_batch(&batch).await.is_err());
        assert_eq!(sink.node_count().await, 0);
    }

    fn declares(package: &str, target: &str) -> GraphEdge {
        GraphEdge {
            source: NodeRef {
                label: NodeLabel::Package,
                key: package.into(),
            },
            target: NodeRef {
                label: NodeLabel::Struct,
                key: target.into(),
            },
            label: EdgeLabel::Declares,
        }
    }

    fn record(key: &str) -> GraphNode {
        GraphNode {
            node: NodeRef {
                label: NodeLabel::Struct,
                key: key.into(),
            },
            properties: json!({}),
        }
    }

    #[tokio::test]
    async fn edge_to_previously_stored_node_is_rejected() {
        let sink = MemoryGraphSink::new();
        sink.write_batch(&GraphBatch {
            nodes: vec![package("sample"), record("sample.Bar")],
            edges: vec![],
        })
        .await
        .unwrap();

        let batch = GraphBatch {
            nodes: vec![package("sample")],
            edges: vec![declares("sample", "sample.Bar")],
        };
        assert!(sink.write_batch(&batch).await.is_err());
        assert!(sink.edges().await.is_empty());
    }

    #[tokio::test]
    async fn replace_drops_stale_nodes_of_the_package_only() {
        let sink = MemoryGraphSink::new();
        sink.write_batch(&GraphBatch {
            nodes: vec![
                package("sample"),
                record("sample.Old"),
                package("samples"),
                record("samples.Keep"),
            ],
            edges: vec![declares("sample", "sample.Old")],
        })
        .await
        .unwrap();

        sink.replace_batch(&GraphBatch {
            nodes: vec![package("sample"), record("sample.New")],
            edges: vec![declares("sample", "sample.New")],
        })
        .await
        .unwrap();

        assert!(sink.node(NodeLabel::Struct, "sample.Old").await.is_none());
        assert!(sink.node(NodeLabel::Struct, "sample.New").await.is_some());
        assert!(sink.node(NodeLabel::Struct, "samples.Keep").await.is_some());
        assert_eq!(sink.edges().await, vec![declares("sample", "sample.New")]);
    }

    #[tokio::test]
    async fn failed_replace_keeps_the_stored_package() {
        let sink = MemoryGraphSink::new();
        sink.write_batch(&GraphBatch {
            nodes: vec![package("sample"), record("sample.Bar")],
            edges: vec![declares("sample", "sample.Bar")],
        })
        .await
        .unwrap();

        let broken = GraphBatch {
            nodes: vec![package("sample")],
            edges: vec![declares("sample", "sample.Missing")],
        };
        assert!(sink.replace_batch(&broken).await.is_err());
        assert!(sink.node(NodeLabel::Struct, "sample.Bar").await.is_some());
        assert_eq!(sink.edges().await.len(), 1);
    }
}
