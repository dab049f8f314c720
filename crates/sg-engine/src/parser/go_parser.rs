use super::syntax::{
    Decl, Field, FuncDecl, InterfaceElem, MethodSig, Param, ParamList, SourceFile, TypeExpr,
    TypeShape, TypeSpec,
};
use super::LanguageParser;
use sg_core::{Error, Result};
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Go parser backed by tree-sitter.
///
/// Lowers the top-level declarations of a Go file into [`SourceFile`]. Only
/// the shapes the extractor reasons about get dedicated variants; everything
/// else is kept as an `Other` variant carrying the tree-sitter node kind.
pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }

    /// Create a configured tree-sitter parser for Go.
    fn create_parser() -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| Error::ParseFailure(format!("Failed to load Go grammar: {e}")))?;
        Ok(parser)
    }

    /// Parse source bytes into a tree-sitter tree.
    fn parse_tree(source: &[u8]) -> Result<tree_sitter::Tree> {
        let mut parser = Self::create_parser()?;
        parser
            .parse(source, None)
            .ok_or_else(|| Error::ParseFailure("tree-sitter parse returned None".into()))
    }

    /// Get the text of a node as a UTF-8 string.
    fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
        let text = &source[node.start_byte()..node.end_byte()];
        std::str::from_utf8(text).unwrap_or("")
    }

    fn line_of(node: &Node) -> usize {
        node.start_position().row + 1
    }

    /// Depth-first search for the first ERROR or MISSING node.
    fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.has_error() {
                if let Some(found) = Self::first_error(child) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn package_name(root: &Node, source: &[u8]) -> Option<String> {
        let mut cursor = root.walk();
        let clause = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")?;

        let mut inner = clause.walk();
        let ident = clause
            .named_children(&mut inner)
            .find(|n| n.kind() == "package_identifier")?;
        Some(Self::node_text(&ident, source).to_string())
    }

    /// Lower a type expression node.
    fn lower_type(node: &Node, source: &[u8]) -> TypeExpr {
        match node.kind() {
            "type_identifier" => TypeExpr::Named(Self::node_text(node, source).to_string()),
            "pointer_type" => match node.named_child(0) {
                Some(inner) => TypeExpr::pointer(Self::lower_type(&inner, source)),
                None => Self::other_type(node, source),
            },
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => Self::lower_type(&inner, source),
                None => Self::other_type(node, source),
            },
            _ => Self::other_type(node, source),
        }
    }

    fn other_type(node: &Node, source: &[u8]) -> TypeExpr {
        TypeExpr::Other {
            kind: node.kind().to_string(),
            text: Self::node_text(node, source).to_string(),
        }
    }

    /// Lower a `parameter_list` node.
    fn lower_params(node: &Node, source: &[u8]) -> ParamList {
        let mut params = Vec::new();
        let mut cursor = node.walk();

        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "parameter_declaration" => {
                    let mut names_cursor = child.walk();
                    let names = child
                        .children_by_field_name("name", &mut names_cursor)
                        .map(|n| Self::node_text(&n, source).to_string())
                        .collect();
                    let ty = match child.child_by_field_name("type") {
                        Some(ty) => Self::lower_type(&ty, source),
                        None => Self::other_type(&child, source),
                    };
                    params.push(Param { names, ty });
                }
                "variadic_parameter_declaration" => {
                    let names = child
                        .child_by_field_name("name")
                        .map(|n| vec![Self::node_text(&n, source).to_string()])
                        .unwrap_or_default();
                    let elem = child
                        .child_by_field_name("type")
                        .map(|t| Self::node_text(&t, source))
                        .unwrap_or("");
                    params.push(Param {
                        names,
                        ty: TypeExpr::Other {
                            kind: "variadic".into(),
                            text: format!("...{elem}"),
                        },
                    });
                }
                _ => {}
            }
        }

        ParamList::new(params)
    }

    /// Lower the `result` field of a function or method signature. A bare type
    /// becomes a one-element list.
    fn lower_result(owner: &Node, source: &[u8]) -> Option<ParamList> {
        let result = owner.child_by_field_name("result")?;
        if result.kind() == "parameter_list" {
            Some(Self::lower_params(&result, source))
        } else {
            Some(ParamList::single(Self::lower_type(&result, source)))
        }
    }

    fn lower_struct(node: &Node, source: &[u8]) -> TypeShape {
        let mut fields = Vec::new();
        let mut cursor = node.walk();

        for list in node.named_children(&mut cursor) {
            if list.kind() != "field_declaration_list" {
                continue;
            }
            let mut list_cursor = list.walk();
            for decl in list.named_children(&mut list_cursor) {
                if decl.kind() != "field_declaration" {
                    continue;
                }
                let mut names_cursor = decl.walk();
                let names: Vec<String> = decl
                    .children_by_field_name("name", &mut names_cursor)
                    .map(|n| Self::node_text(&n, source).to_string())
                    .collect();
                let Some(ty_node) = decl.child_by_field_name("type") else {
                    continue;
                };
                let mut ty = Self::lower_type(&ty_node, source);

                // Embedded `*T` keeps the star as an anonymous sibling token.
                if names.is_empty() {
                    let mut tok_cursor = decl.walk();
                    let starred = decl.children(&mut tok_cursor).any(|c| c.kind() == "*");
                    if starred {
                        ty = TypeExpr::pointer(ty);
                    }
                }
                fields.push(Field { names, ty });
            }
        }

        TypeShape::Struct { fields }
    }

    fn lower_interface(node: &Node, source: &[u8]) -> TypeShape {
        let mut elems = Vec::new();
        let mut cursor = node.walk();

        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "method_elem" | "method_spec" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let params = child
                        .child_by_field_name("parameters")
                        .map(|p| Self::lower_params(&p, source))
                        .unwrap_or_default();
                    elems.push(InterfaceElem::Method(MethodSig {
                        name: Self::node_text(&name, source).to_string(),
                        params,
                        results: Self::lower_result(&child, source),
                    }));
                }
                "comment" => {}
                _ => {
                    let ty = match (child.named_child_count(), child.named_child(0)) {
                        (1, Some(only)) => Self::lower_type(&only, source),
                        _ => Self::other_type(&child, source),
                    };
                    elems.push(InterfaceElem::Embedded(ty));
                }
            }
        }

        TypeShape::Interface { elems }
    }

    fn lower_type_spec(node: &Node, source: &[u8]) -> Option<TypeSpec> {
        let name = node.child_by_field_name("name")?;
        let shape = if node.kind() == "type_alias" {
            TypeShape::Other {
                kind: "alias".into(),
            }
        } else {
            match node.child_by_field_name("type") {
                Some(ty) if ty.kind() == "struct_type" => Self::lower_struct(&ty, source),
                Some(ty) if ty.kind() == "interface_type" => Self::lower_interface(&ty, source),
                Some(ty) => TypeShape::Other {
                    kind: ty.kind().to_string(),
                },
                None => TypeShape::Other {
                    kind: "unknown".into(),
                },
            }
        };

        Some(TypeSpec {
            name: Self::node_text(&name, source).to_string(),
            shape,
            line: Self::line_of(node),
        })
    }

    fn lower_func(node: &Node, source: &[u8]) -> Option<FuncDecl> {
        let name = node.child_by_field_name("name")?;
        let receiver = node
            .child_by_field_name("receiver")
            .map(|r| Self::lower_params(&r, source));
        let params = node
            .child_by_field_name("parameters")
            .map(|p| Self::lower_params(&p, source))
            .unwrap_or_default();

        Some(FuncDecl {
            name: Self::node_text(&name, source).to_string(),
            receiver,
            params,
            results: Self::lower_result(node, source),
            line: Self::line_of(node),
        })
    }

    /// Lower one top-level node. Type declarations may yield several specs.
    fn lower_decl(node: &Node, source: &[u8], decls: &mut Vec<Decl>) {
        match node.kind() {
            "type_declaration" => {
                let mut cursor = node.walk();
                for spec in node.named_children(&mut cursor) {
                    if !matches!(spec.kind(), "type_spec" | "type_alias") {
                        continue;
                    }
                    if let Some(spec) = Self::lower_type_spec(&spec, source) {
                        decls.push(Decl::Type(spec));
                    }
                }
            }
            "function_declaration" | "method_declaration" => {
                if let Some(func) = Self::lower_func(node, source) {
                    decls.push(Decl::Func(func));
                }
            }
            "package_clause" | "comment" => {}
            other => decls.push(Decl::Other {
                kind: other.to_string(),
                line: Self::line_of(node),
            }),
        }
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for GoParser {
    fn extensions(&self) -> &[&str] {
        &["go"]
    }

    fn parse_source(&self, source: &[u8], file_path: &Path) -> Result<SourceFile> {
        let tree = Self::parse_tree(source)?;
        let root = tree.root_node();

        if root.has_error() {
            let line = Self::first_error(root)
                .map(|n| Self::line_of(&n))
                .unwrap_or(1);
            return Err(Error::ParseFailure(format!(
                "{}: syntax error at line {line}",
                file_path.display()
            )));
        }

        let package = Self::package_name(&root, source).ok_or_else(|| {
            Error::ParseFailure(format!("{}: missing package clause", file_path.display()))
        })?;

        let mut decls = Vec::new();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            Self::lower_decl(&node, source, &mut decls);
        }

        tracing::debug!(
            file = %file_path.display(),
            package = %package,
            decls = decls.len(),
            "lowered Go source"
        );

        Ok(SourceFile { package, decls })
    }
}
