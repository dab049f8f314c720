use super::signature::resolve_signature;
use crate::parser::{InterfaceElem, TypeShape, TypeSpec};
use sg_core::{Error, MethodRecord, Result, TypeKind};

/// Outcome of classifying one type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Struct. Methods are attached later from receiver declarations.
    Record,
    /// Interface, with its inline method set in declaration order.
    Contract(Vec<MethodRecord>),
}

impl Classified {
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Record => TypeKind::Record,
            Self::Contract(_) => TypeKind::Contract,
        }
    }
}

/// Decide whether `spec` declares a struct or an interface.
///
/// Embedded interfaces are not expanded into the method set.
pub fn classify(spec: &TypeSpec) -> Result<Classified> {
    match &spec.shape {
        TypeShape::Struct { .. } => Ok(Classified::Record),
        TypeShape::Interface { elems } => {
            let label = format!("interface {}", spec.name);
            let mut methods = Vec::new();
            for elem in elems {
                match elem {
                    InterfaceElem::Method(sig) => {
                        let declaration = format!("{label}.{}", sig.name);
                        let params = resolve_signature(Some(&sig.params), &declaration)?;
                        let returns = resolve_signature(sig.results.as_ref(), &declaration)?;
                        methods.push(MethodRecord::new(&sig.name, params, returns));
                    }
                    InterfaceElem::Embedded(ty) => {
                        tracing::debug!(interface = %spec.name, embedded = %ty, "ignoring embedded element");
                    }
                }
            }
            Ok(Classified::Contract(methods))
        }
        TypeShape::Other { kind } => Err(Error::UnsupportedDeclarationShape {
            name: spec.name.clone(),
            shape: kind.clone(),
        }),
    }
}
