use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

// ── Type kind ──

/// Whether a declared type is an aggregate of fields or a method contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeKind {
    /// Struct-shaped type. Methods arrive through receiver declarations.
    Record,
    /// Interface-shaped type. Methods are declared inline.
    Contract,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Record => "struct",
            Self::Contract => "interface",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TypeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "struct" => Ok(Self::Record),
            "interface" => Ok(Self::Contract),
            other => Err(format!("unknown TypeKind: {other}")),
        }
    }
}

// ── Records ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,
    pub param_types: Vec<String>,
    pub return_types: Vec<String>,
}

impl MethodRecord {
    pub fn new(
        name: impl Into<String>,
        param_types: Vec<String>,
        return_types: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_types,
            return_types,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub kind: TypeKind,
    pub package_name: String,
    pub name: String,
    pub methods: Vec<MethodRecord>,
}

impl TypeRecord {
    /// Record created for a receiver type whose declaration has not been seen.
    pub fn placeholder(package_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Record,
            package_name: package_name.into(),
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn add_method(&mut self, method: MethodRecord) {
        self.methods.push(method);
    }
}

// ── Model ──

pub type TypeTable = BTreeMap<String, TypeRecord>;

/// Package name → type name → record, for one extracted file.
///
/// Read-only once built; the extraction pass assembles the tables and hands
/// them over through [`Model::from_packages`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model {
    packages: BTreeMap<String, TypeTable>,
}

impl Model {
    pub fn from_packages(packages: BTreeMap<String, TypeTable>) -> Self {
        Self { packages }
    }

    pub fn packages(&self) -> &BTreeMap<String, TypeTable> {
        &self.packages
    }

    pub fn package(&self, name: &str) -> Option<&TypeTable> {
        self.packages.get(name)
    }

    pub fn get(&self, package: &str, type_name: &str) -> Option<&TypeRecord> {
        self.packages.get(package)?.get(type_name)
    }

    /// All type records, ordered by package then type name.
    pub fn types(&self) -> impl Iterator<Item = &TypeRecord> {
        self.packages.values().flat_map(|table| table.values())
    }

    pub fn type_count(&self) -> usize {
        self.packages.values().map(BTreeMap::len).sum()
    }

    pub fn method_count(&self) -> usize {
        self.types().map(|t| t.methods.len()).sum()
    }
}

// ── Diagnostics ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    UnsupportedDeclarationShape,
    UnsupportedSignatureShape,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UnsupportedDeclarationShape => "unsupported_declaration_shape",
            Self::UnsupportedSignatureShape => "unsupported_signature_shape",
        };
        write!(f, "{s}")
    }
}

/// A declaration that was skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub declaration: String,
    /// 1-based source line of the declaration.
    pub line: usize,
    pub reason: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: {} skipped ({}): {}",
            self.line, self.declaration, self.kind, self.reason
        )
    }
}
