use super::classify::{classify, Classified};
use super::method::collect_method;
use super::{Extraction, ShapePolicy};
use crate::parser::{Decl, FuncDecl, TypeSpec};
use sg_core::{Diagnostic, DiagnosticKind, Error, Model, Result, TypeRecord, TypeTable};
use std::collections::BTreeMap;

/// Accumulates the type table for one file during the single extraction pass.
///
/// Type declarations and receiver methods may arrive in any order: whichever
/// comes first creates the record, later arrivals update it in place.
pub struct ModelBuilder {
    package: String,
    types: TypeTable,
    diagnostics: Vec<Diagnostic>,
    policy: ShapePolicy,
}

impl ModelBuilder {
    pub fn new(package: impl Into<String>, policy: ShapePolicy) -> Self {
        Self {
            package: package.into(),
            types: TypeTable::new(),
            diagnostics: Vec::new(),
            policy,
        }
    }

    /// Fold one top-level declaration into the model.
    ///
    /// Only fails when the policy turns an unsupported signature into an
    /// abort; unsupported shapes are otherwise recorded as diagnostics.
    pub fn add_decl(&mut self, decl: &Decl) -> Result<()> {
        match decl {
            Decl::Type(spec) => self.add_type(spec),
            Decl::Func(func) => self.add_func(func),
            Decl::Other { kind, line } => {
                tracing::trace!(kind = %kind, line, "ignoring declaration");
                Ok(())
            }
        }
    }

    fn add_type(&mut self, spec: &TypeSpec) -> Result<()> {
        let classified = match classify(spec) {
            Ok(classified) => classified,
            Err(err) => return self.skip(format!("type {}", spec.name), spec.line, err),
        };

        let record = self
            .types
            .entry(spec.name.clone())
            .or_insert_with(|| TypeRecord::placeholder(&self.package, &spec.name));
        record.kind = classified.kind();
        record.package_name = self.package.clone();
        record.name = spec.name.clone();
        if let Classified::Contract(methods) = classified {
            record.methods = methods;
        }

        tracing::debug!(name = %spec.name, kind = %record.kind, line = spec.line, "classified type");
        Ok(())
    }

    fn add_func(&mut self, func: &FuncDecl) -> Result<()> {
        let collected = match collect_method(func) {
            Ok(Some(collected)) => collected,
            Ok(None) => {
                tracing::trace!(name = %func.name, "ignoring free function");
                return Ok(());
            }
            Err(err) => return self.skip(func.label(), func.line, err),
        };

        tracing::debug!(owner = %collected.owner, method = %collected.method.name, line = func.line, "collected method");
        self.types
            .entry(collected.owner.clone())
            .or_insert_with(|| TypeRecord::placeholder(&self.package, &collected.owner))
            .add_method(collected.method);
        Ok(())
    }

    fn skip(&mut self, declaration: String, line: usize, err: Error) -> Result<()> {
        let kind = match err {
            Error::UnsupportedDeclarationShape { .. } => DiagnosticKind::UnsupportedDeclarationShape,
            Error::UnsupportedSignatureShape { .. } if self.policy == ShapePolicy::Skip => {
                DiagnosticKind::UnsupportedSignatureShape
            }
            _ => return Err(err),
        };

        tracing::warn!(line, declaration = %declaration, "skipping declaration: {err}");
        self.diagnostics.push(Diagnostic {
            kind,
            declaration,
            line,
            reason: err.to_string(),
        });
        Ok(())
    }

    pub fn finish(self) -> Extraction {
        let mut packages = BTreeMap::new();
        packages.insert(self.package, self.types);
        Extraction {
            model: Model::from_packages(packages),
            diagnostics: self.diagnostics,
        }
    }
}
