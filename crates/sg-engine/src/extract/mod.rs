//! Static extraction of the package → type → method model from a lowered
//! source file.

pub mod builder;
pub mod classify;
pub mod method;
pub mod signature;

pub use builder::ModelBuilder;
pub use classify::{classify, Classified};
pub use method::{collect_method, CollectedMethod};
pub use signature::resolve_signature;

use crate::parser::SourceFile;
use sg_core::{Diagnostic, Model, Result};

/// What to do when a declaration's receiver, parameter, or result type is
/// not a simple named type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShapePolicy {
    /// Record a diagnostic and continue with the next declaration.
    #[default]
    Skip,
    /// Fail the whole extraction.
    Abort,
}

impl ShapePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Abort
        } else {
            Self::Skip
        }
    }
}

/// Result of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub model: Model,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the single extraction pass over every top-level declaration of `file`.
pub fn extract(file: &SourceFile, policy: ShapePolicy) -> Result<Extraction> {
    let mut builder = ModelBuilder::new(&file.package, policy);
    for decl in &file.decls {
        builder.add_decl(decl)?;
    }
    let extraction = builder.finish();

    tracing::debug!(
        package = %file.package,
        types = extraction.model.type_count(),
        methods = extraction.model.method_count(),
        skipped = extraction.diagnostics.len(),
        "extraction complete"
    );
    Ok(extraction)
}
