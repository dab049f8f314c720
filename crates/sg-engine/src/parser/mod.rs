pub mod go_parser;
pub mod registry;
pub mod syntax;

pub use go_parser::GoParser;
pub use registry::ParserRegistry;
pub use syntax::{
    Decl, Field, FuncDecl, InterfaceElem, MethodSig, Param, ParamList, SourceFile, TypeExpr,
    TypeShape, TypeSpec,
};

use sg_core::Result;
use std::path::Path;

/// Trait implemented by each language-specific parser.
pub trait LanguageParser: Send + Sync {
    /// File extensions this parser handles (without leading dot).
    fn extensions(&self) -> &[&str];

    /// Parse one file and lower it into the declaration model.
    ///
    /// Returns `Error::ParseFailure` when no usable tree can be produced.
    fn parse_source(&self, source: &[u8], file_path: &Path) -> Result<SourceFile>;
}
