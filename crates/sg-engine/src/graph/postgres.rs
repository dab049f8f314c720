use super::{EdgeLabel, GraphBatch, GraphSink, NodeLabel, NodeRef, WriteSummary};
use async_trait::async_trait;
use sg_core::Error;
use sqlx::postgres::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

/// Intermediate row type for mapping between database rows and `StoredNode`.
#[derive(sqlx::FromRow)]
struct NodeRow {
    id: Uuid,
    label: String,
    key: String,
    properties: serde_json::Value,
}

impl NodeRow {
    fn into_stored(self) -> sg_core::Result<StoredNode> {
        let label = self.label.parse::<NodeLabel>().map_err(Error::Internal)?;
        Ok(StoredNode {
            id: self.id,
            node: NodeRef {
                label,
                key: self.key,
            },
            properties: self.properties,
        })
    }
}

/// A node as persisted, with its database identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub id: Uuid,
    pub node: NodeRef,
    pub properties: serde_json::Value,
}

/// PostgreSQL-backed graph store.
///
/// Nodes are unique on `(label, key)`, edges on `(source, target, label)`, so
/// writing the same batch twice leaves the graph unchanged.
#[derive(Clone)]
pub struct PgGraphStore {
    pool: PgPool,
}

impl PgGraphStore {
    /// Create a new `PgGraphStore` backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> sg_core::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> sg_core::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn find_node(&self, label: NodeLabel, key: &str) -> sg_core::Result<Option<StoredNode>> {
        let row = sqlx::query_as::<_, NodeRow>(
            r#"
            SELECT id, label, key, properties
            FROM graph_nodes
            WHERE label = $1 AND key = $2
            "#,
        )
        .bind(label.to_string())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(NodeRow::into_stored).transpose()
    }

    /// Nodes reached from `source` over edges labelled `label`, ordered by key.
    pub async fn find_targets(
        &self,
        source: &NodeRef,
        label: EdgeLabel,
    ) -> sg_core::Result<Vec<StoredNode>> {
        let rows = sqlx::query_as::<_, NodeRow>(
            r#"
            SELECT t.id, t.label, t.key, t.properties
            FROM graph_edges e
            JOIN graph_nodes s ON s.id = e.source_id
            JOIN graph_nodes t ON t.id = e.target_id
            WHERE s.label = $1 AND s.key = $2 AND e.label = $3
            ORDER BY t.key
            "#,
        )
        .bind(source.label.to_string())
        .bind(&source.key)
        .bind(label.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(NodeRow::into_stored).collect()
    }

    /// Delete the package node and every node keyed under `package.`, along
    /// with their edges. Returns the number of nodes deleted.
    pub async fn delete_package(&self, package: &str) -> sg_core::Result<u64> {
        let mut conn = self.pool.acquire().await?;
        delete_package_in(&mut *conn, package).await
    }
}

async fn delete_package_in(conn: &mut PgConnection, package: &str) -> sg_core::Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM graph_nodes
        WHERE (label = 'Package' AND key = $1) OR starts_with(key, $1 || '.')
        "#,
    )
    .bind(package)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Upsert every node, then link the edges. Runs on the caller's connection so
/// it can share a transaction with other statements.
async fn upsert_batch_in(conn: &mut PgConnection, batch: &GraphBatch) -> sg_core::Result<WriteSummary> {
    let mut ids: HashMap<&NodeRef, Uuid> = HashMap::with_capacity(batch.nodes.len());

    for node in &batch.nodes {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO graph_nodes (id, label, key, properties)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (label, key) DO UPDATE SET
                properties = EXCLUDED.properties,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(node.node.label.to_string())
        .bind(&node.node.key)
        .bind(&node.properties)
        .fetch_one(&mut *conn)
        .await?;
        ids.insert(&node.node, id);
    }

    for edge in &batch.edges {
        let lookup = |node: &NodeRef| {
            ids.get(node).copied().ok_or_else(|| {
                Error::Internal(format!(
                    "edge endpoint {}:{} is not part of the batch",
                    node.label, node.key
                ))
            })
        };
        let source = lookup(&edge.source)?;
        let target = lookup(&edge.target)?;

        sqlx::query(
            r#"
            INSERT INTO graph_edges (source_id, target_id, label)
            VALUES ($1, $2, $3)
            ON CONFLICT (source_id, target_id, label) DO NOTHING
            "#,
        )
        .bind(source)
        .bind(target)
        .bind(edge.label.to_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(WriteSummary {
        nodes: batch.nodes.len(),
        edges: batch.edges.len(),
    })
}

#[async_trait]
impl GraphSink for PgGraphStore {
    /// Upsert the whole batch inside one transaction. The first failing
    /// statement rolls everything back.
    async fn write_batch(&self, batch: &GraphBatch) -> sg_core::Result<WriteSummary> {
        let mut tx = self.pool.begin().await?;
        let summary = upsert_batch_in(&mut *tx, batch).await?;
        tx.commit().await?;

        tracing::info!(
            nodes = summary.nodes,
            edges = summary.edges,
            "graph batch committed"
        );
        Ok(summary)
    }

    /// Delete the batch's packages and upsert the batch in one transaction,
    /// so a failed write leaves the previously stored package in place.
    async fn replace_batch(&self, batch: &GraphBatch) -> sg_core::Result<WriteSummary> {
        let mut tx = self.pool.begin().await?;
        for package in batch.packages() {
            let removed = delete_package_in(&mut *tx, package).await?;
            tracing::info!(package = %package, removed, "cleared previous nodes");
        }
        let summary = upsert_batch_in(&mut *tx, batch).await?;
        tx.commit().await?;

        tracing::info!(
            nodes = summary.nodes,
            edges = summary.edges,
            "graph batch replaced"
        );
        Ok(summary)
    }
}
