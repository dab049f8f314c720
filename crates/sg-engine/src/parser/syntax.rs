//! Closed set of declaration shapes the extractor understands.
//!
//! Parsers lower their concrete trees into these variants. Anything the
//! extractor has no rule for is carried as an explicit `Other` variant so it
//! can be reported instead of silently dropped.

use std::fmt;

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    pub decls: Vec<Decl>,
}

/// A top-level declaration, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// One spec of a `type` declaration. Grouped `type ( ... )` blocks lower
    /// to one `Decl::Type` per spec.
    Type(TypeSpec),
    /// A function or method declaration.
    Func(FuncDecl),
    /// Imports, vars, consts, and anything else at the top level.
    Other { kind: String, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub shape: TypeShape,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Struct { fields: Vec<Field> },
    Interface { elems: Vec<InterfaceElem> },
    /// Aliases, named scalars, function types, ... `kind` names the shape.
    Other { kind: String },
}

impl TypeShape {
    pub fn describe(&self) -> &str {
        match self {
            Self::Struct { .. } => "struct",
            Self::Interface { .. } => "interface",
            Self::Other { kind } => kind,
        }
    }
}

/// A struct field. Embedded fields have no names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl Field {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    Method(MethodSig),
    /// Embedded interface or type-set constraint.
    Embedded(TypeExpr),
}

/// A method signature declared inline in an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub params: ParamList,
    pub results: Option<ParamList>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    /// `None` for free functions.
    pub receiver: Option<ParamList>,
    pub params: ParamList,
    pub results: Option<ParamList>,
    pub line: usize,
}

impl FuncDecl {
    /// Human-readable label used in diagnostics.
    pub fn label(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("method ({recv}) {}", self.name),
            None => format!("func {}", self.name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList {
    pub params: Vec<Param>,
}

impl ParamList {
    pub fn new(params: Vec<Param>) -> Self {
        Self { params }
    }

    /// A result list made of a single bare type, as in `func f() int`.
    pub fn single(ty: TypeExpr) -> Self {
        Self {
            params: vec![Param::unnamed(ty)],
        }
    }
}

impl fmt::Display for ParamList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// One parameter declaration. `a, b int` is a single `Param` with two names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl Param {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            ty,
        }
    }

    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            names: vec![name.into()],
            ty,
        }
    }

    /// Number of parameters this declaration introduces.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.names.join(", "), self.ty)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A bare identifier such as `int` or `Bar`.
    Named(String),
    Pointer(Box<TypeExpr>),
    /// Slices, maps, qualified names, generics, function types, ...
    Other { kind: String, text: String },
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        Self::Pointer(Box::new(inner))
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Other { text, .. } => write!(f, "{text}"),
        }
    }
}
