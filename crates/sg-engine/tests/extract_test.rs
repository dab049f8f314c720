use sg_core::{DiagnosticKind, Error, MethodRecord, TypeKind};
use sg_engine::{Pipeline, ShapePolicy};
use std::path::Path;

const SAMPLE: &str = r#"package sample

type IDAccessor interface {
	GetID() int
	SetID(int)
}

type Bar struct {
	id int
}

func (b *Bar) GetID() int {
	return b.id
}

func (b *Bar) SetID(i int) {
	b.id = i
}

type Baz struct {
	Bar
}

func (b *Baz) GetID() int {
	return add(b.id, 10000)
}

func (b *Baz) SetID(i int) {
	b.id = i - 10000
}

func add(a, b int) int {
	return a + b
}
"#;

fn extract(source: &str) -> sg_engine::Extraction {
    Pipeline::default()
        .extract_source(Path::new("sample.go"), source.as_bytes())
        .unwrap()
}

fn accessor_methods() -> Vec<MethodRecord> {
    vec![
        MethodRecord::new("GetID", vec![], vec!["int".into()]),
        MethodRecord::new("SetID", vec!["int".into()], vec![]),
    ]
}

#[test]
fn test_interface_methods_are_extracted_inline() {
    let extraction = extract(SAMPLE);
    let accessor = extraction.model.get("sample", "IDAccessor").unwrap();
    assert_eq!(accessor.kind, TypeKind::Contract);
    assert_eq!(accessor.package_name, "sample");
    assert_eq!(accessor.methods, accessor_methods());
}

#[test]
fn test_receiver_methods_attach_to_struct() {
    let extraction = extract(SAMPLE);
    let bar = extraction.model.get("sample", "Bar").unwrap();
    assert_eq!(bar.kind, TypeKind::Record);
    assert_eq!(bar.methods, accessor_methods());
}

#[test]
fn test_free_functions_produce_nothing() {
    let extraction = extract(SAMPLE);
    let model = &extraction.model;
    assert!(model.get("sample", "add").is_none());
    assert_eq!(model.type_count(), 3);
    assert_eq!(model.method_count(), 6);
    assert!(model
        .types()
        .flat_map(|t| t.methods.iter())
        .all(|m| m.name != "add"));
    assert!(extraction.diagnostics.is_empty());
}

#[test]
fn test_embedding_is_not_flattened() {
    let source = r#"package sample

type Bar struct{ id int }

func (b *Bar) GetID() int { return b.id }

func (b *Bar) Reset() {}

type Baz struct {
	Bar
}

func (b *Baz) Describe() string { return "baz" }
"#;
    let extraction = extract(source);
    let baz = extraction.model.get("sample", "Baz").unwrap();
    let names: Vec<&str> = baz.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Describe"]);
}

#[test]
fn test_struct_without_methods_has_empty_collection() {
    let extraction = extract("package sample\n\ntype Empty struct{}\n");
    let empty = extraction.model.get("sample", "Empty").unwrap();
    assert_eq!(empty.kind, TypeKind::Record);
    assert_eq!(empty.methods, Vec::<MethodRecord>::new());
}

#[test]
fn test_methods_before_type_declaration() {
    let before = r#"package sample

func (b *Bar) GetID() int { return b.id }

func (b *Bar) SetID(i int) { b.id = i }

type Bar struct {
	id int
}
"#;
    let after = r#"package sample

type Bar struct {
	id int
}

func (b *Bar) GetID() int { return b.id }

func (b *Bar) SetID(i int) { b.id = i }
"#;
    assert_eq!(extract(before).model, extract(after).model);
    assert_eq!(
        extract(before).model.get("sample", "Bar").unwrap().methods,
        accessor_methods()
    );
}

#[test]
fn test_unrelated_declarations_commute() {
    let one = r#"package sample

type IDAccessor interface {
	GetID() int
	SetID(int)
}

type Bar struct{ id int }
"#;
    let two = r#"package sample

type Bar struct{ id int }

type IDAccessor interface {
	GetID() int
	SetID(int)
}
"#;
    assert_eq!(extract(one), extract(two));
}

#[test]
fn test_extraction_is_idempotent() {
    assert_eq!(extract(SAMPLE), extract(SAMPLE));
}

#[test]
fn test_method_without_type_declaration_creates_record() {
    let extraction = extract("package sample\n\nfunc (r *Remote) Ping() bool { return true }\n");
    let remote = extraction.model.get("sample", "Remote").unwrap();
    assert_eq!(remote.kind, TypeKind::Record);
    assert_eq!(
        remote.methods,
        vec![MethodRecord::new("Ping", vec![], vec!["bool".into()])]
    );
}

#[test]
fn test_unsupported_declarations_are_skipped_with_diagnostics() {
    let source = r#"package sample

type ID int

type Bar struct{ id int }

func (b Bar) Value() int { return b.id }

func (b *Bar) Keys() []string { return nil }

func (b *Bar) GetID() int { return b.id }
"#;
    let extraction = extract(source);

    assert_eq!(extraction.model.type_count(), 1);
    let bar = extraction.model.get("sample", "Bar").unwrap();
    let names: Vec<&str> = bar.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["GetID"]);

    let diagnostics: Vec<(DiagnosticKind, usize)> = extraction
        .diagnostics
        .iter()
        .map(|d| (d.kind, d.line))
        .collect();
    assert_eq!(
        diagnostics,
        vec![
            (DiagnosticKind::UnsupportedDeclarationShape, 3),
            (DiagnosticKind::UnsupportedSignatureShape, 7),
            (DiagnosticKind::UnsupportedSignatureShape, 9),
        ]
    );
    assert!(extraction.diagnostics[2].reason.contains("[]string"));
}

#[test]
fn test_strict_policy_aborts_on_signature_shape() {
    let source = "package sample\n\nfunc (b Bar) Value() int { return 0 }\n";
    let err = Pipeline::new(ShapePolicy::Abort)
        .extract_source(Path::new("sample.go"), source.as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedSignatureShape { .. }), "{err}");
}

#[test]
fn test_grouped_parameters_expand_per_name() {
    let extraction = extract(
        "package sample\n\ntype Calc struct{}\n\nfunc (c *Calc) Add(a, b int) (int, error) { return a + b, nil }\n",
    );
    let calc = extraction.model.get("sample", "Calc").unwrap();
    assert_eq!(
        calc.methods,
        vec![MethodRecord::new(
            "Add",
            vec!["int".into(), "int".into()],
            vec!["int".into(), "error".into()],
        )]
    );
}

#[test]
fn test_extract_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.go");
    std::fs::write(&path, SAMPLE).unwrap();

    let extraction = Pipeline::default().extract_file(&path).unwrap();
    assert_eq!(extraction.model, extract(SAMPLE).model);

    let missing = Pipeline::default().extract_file(&dir.path().join("missing.go"));
    assert!(matches!(missing, Err(Error::Io(_))));
}

#[test]
fn test_methods_on_rejected_type_still_create_record() {
    let source = r#"package sample

type ID int

func (i *ID) String() string { return "id" }
"#;
    let extraction = extract(source);

    let id = extraction.model.get("sample", "ID").unwrap();
    assert_eq!(id.kind, TypeKind::Record);
    assert_eq!(
        id.methods,
        vec![MethodRecord::new("String", vec![], vec!["string".into()])]
    );
    assert_eq!(extraction.diagnostics.len(), 1);
    assert_eq!(
        extraction.diagnostics[0].kind,
        DiagnosticKind::UnsupportedDeclarationShape
    );
}
