use std::path::Path;

use sg_core::{Model, Result};

use crate::extract::{extract, Extraction, ShapePolicy};
use crate::graph::{render_model, GraphSink, WriteSummary};
use crate::parser::ParserRegistry;

/// Parse → extract → persist, for one file at a time.
pub struct Pipeline {
    registry: ParserRegistry,
    policy: ShapePolicy,
}

impl Pipeline {
    pub fn new(policy: ShapePolicy) -> Self {
        Self {
            registry: ParserRegistry::new(),
            policy,
        }
    }

    /// Extract the model from in-memory source. `path` selects the parser and
    /// labels diagnostics; it is not read.
    pub fn extract_source(&self, path: &Path, source: &[u8]) -> Result<Extraction> {
        let file = self.registry.parse_file(path, source)?;
        extract(&file, self.policy)
    }

    /// Read `path` from disk and extract its model.
    pub fn extract_file(&self, path: &Path) -> Result<Extraction> {
        let source = std::fs::read(path)?;
        tracing::info!(file = %path.display(), bytes = source.len(), "extracting");
        self.extract_source(path, &source)
    }

    /// Hand a finished model to `sink`.
    pub async fn persist(&self, sink: &dyn GraphSink, model: &Model) -> Result<WriteSummary> {
        let batch = render_model(model);
        sink.write_batch(&batch).await
    }

    /// Like [`persist`](Self::persist), but replaces whatever `sink` already
    /// holds for the model's packages.
    pub async fn replace(&self, sink: &dyn GraphSink, model: &Model) -> Result<WriteSummary> {
        let batch = render_model(model);
        sink.replace_batch(&batch).await
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ShapePolicy::default())
    }
}
