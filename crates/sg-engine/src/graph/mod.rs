pub mod memory;
pub mod postgres;

pub use memory::MemoryGraphSink;
pub use postgres::PgGraphStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sg_core::{Model, Result, TypeKind};
use std::str::FromStr;

// ── Labels ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    Package,
    Struct,
    Interface,
    Method,
}

impl From<TypeKind> for NodeLabel {
    fn from(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Record => Self::Struct,
            TypeKind::Contract => Self::Interface,
        }
    }
}

impl std::fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Package => "Package",
            Self::Struct => "Struct",
            Self::Interface => "Interface",
            Self::Method => "Method",
        };
        write!(f, "{s}")
    }
}

impl FromStr for NodeLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Package" => Ok(Self::Package),
            "Struct" => Ok(Self::Struct),
            "Interface" => Ok(Self::Interface),
            "Method" => Ok(Self::Method),
            other => Err(format!("unknown NodeLabel: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeLabel {
    /// Package → Struct / Interface.
    Declares,
    /// Struct / Interface → Method.
    HasMethod,
}

impl std::fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Declares => "DECLARES",
            Self::HasMethod => "HAS_METHOD",
        };
        write!(f, "{s}")
    }
}

// ── Batch ──

/// Identity of a node: unique per (label, key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub node: NodeRef,
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeRef,
    pub target: NodeRef,
    pub label: EdgeLabel,
}

/// Every upsert one model produces. Nodes precede the edges that use them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphBatch {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphBatch {
    /// Names of the packages this batch carries a node for.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| n.node.label == NodeLabel::Package)
            .map(|n| n.node.key.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Translate a model into graph upserts.
///
/// Keys: `pkg` for packages, `pkg.Type` for types, and `pkg.Type.Method#n`
/// for methods, where `n` is the method's position on its type. The index
/// keeps same-named methods distinct while staying stable across runs.
pub fn render_model(model: &Model) -> GraphBatch {
    let mut batch = GraphBatch::default();

    for (package, types) in model.packages() {
        let package_ref = NodeRef {
            label: NodeLabel::Package,
            key: package.clone(),
        };
        batch.nodes.push(GraphNode {
            node: package_ref.clone(),
            properties: json!({ "name": package }),
        });

        for (name, record) in types {
            let type_ref = NodeRef {
                label: record.kind.into(),
                key: format!("{package}.{name}"),
            };
            batch.nodes.push(GraphNode {
                node: type_ref.clone(),
                properties: json!({ "name": name, "package": package }),
            });
            batch.edges.push(GraphEdge {
                source: package_ref.clone(),
                target: type_ref.clone(),
                label: EdgeLabel::Declares,
            });

            for (index, method) in record.methods.iter().enumerate() {
                let method_ref = NodeRef {
                    label: NodeLabel::Method,
                    key: format!("{package}.{name}.{}#{index}", method.name),
                };
                batch.nodes.push(GraphNode {
                    node: method_ref.clone(),
                    properties: json!({
                        "name": method.name,
                        "package": package,
                        "owner": name,
                        "param_types": method.param_types,
                        "return_types": method.return_types,
                    }),
                });
                batch.edges.push(GraphEdge {
                    source: type_ref.clone(),
                    target: method_ref,
                    label: EdgeLabel::HasMethod,
                });
            }
        }
    }

    batch
}

/// Destination for a rendered model.
///
/// Implementations must treat every node as an idempotent upsert keyed by its
/// [`NodeRef`], and either apply the whole batch or none of it. Edge
/// endpoints must be nodes of the same batch.
#[async_trait]
pub trait GraphSink: Send + Sync {
    async fn write_batch(&self, batch: &GraphBatch) -> Result<WriteSummary>;

    /// Like [`write_batch`](Self::write_batch), but first drops every stored
    /// node of the batch's packages. The removal is part of the same
    /// all-or-nothing write.
    async fn replace_batch(&self, batch: &GraphBatch) -> Result<WriteSummary>;
}
