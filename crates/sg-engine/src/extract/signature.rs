use crate::parser::{ParamList, TypeExpr};
use sg_core::{Error, Result};

/// Resolve a parameter or result list into one type name per declared entry.
///
/// An absent list resolves to an empty vector. `a, b int` contributes `int`
/// twice. Every type must be a bare identifier; anything else is reported as
/// `UnsupportedSignatureShape` against `declaration`.
pub fn resolve_signature(list: Option<&ParamList>, declaration: &str) -> Result<Vec<String>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };

    let mut types = Vec::with_capacity(list.params.len());
    for param in &list.params {
        let name = simple_type_name(&param.ty, declaration)?;
        types.extend(std::iter::repeat(name).take(param.arity()).map(str::to_string));
    }
    Ok(types)
}

fn simple_type_name<'a>(ty: &'a TypeExpr, declaration: &str) -> Result<&'a str> {
    ty.as_named().ok_or_else(|| {
        Error::unsupported_signature(
            declaration,
            format!("type `{ty}` is not a simple named type"),
        )
    })
}
