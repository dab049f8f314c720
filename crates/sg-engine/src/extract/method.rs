use super::signature::resolve_signature;
use crate::parser::{FuncDecl, TypeExpr};
use sg_core::{Error, MethodRecord, Result};

/// A method resolved from a receiver declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedMethod {
    pub owner: String,
    pub method: MethodRecord,
}

/// Collect the method declared by `func`.
///
/// Free functions return `Ok(None)`. The receiver must be exactly one
/// pointer to a named type (`(b *Bar)`).
pub fn collect_method(func: &FuncDecl) -> Result<Option<CollectedMethod>> {
    let Some(receiver) = &func.receiver else {
        return Ok(None);
    };

    let label = func.label();
    let recv = match receiver.params.as_slice() {
        [single] if single.arity() == 1 => single,
        other => {
            let found: usize = other.iter().map(|p| p.arity()).sum();
            return Err(Error::unsupported_signature(
                &label,
                format!("expected exactly one receiver, found {found}"),
            ));
        }
    };

    let owner = match &recv.ty {
        TypeExpr::Pointer(inner) => inner.as_named(),
        _ => None,
    }
    .ok_or_else(|| {
        Error::unsupported_signature(
            &label,
            format!("receiver type `{}` is not a pointer to a named type", recv.ty),
        )
    })?;

    let param_types = resolve_signature(Some(&func.params), &label)?;
    let return_types = resolve_signature(func.results.as_ref(), &label)?;

    Ok(Some(CollectedMethod {
        owner: owner.to_string(),
        method: MethodRecord::new(&func.name, param_types, return_types),
    }))
}
