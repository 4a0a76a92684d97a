//! Layout language tests: parse, resolve, materialize and dump.

use binshape::ast::{FieldDef, LayoutKind, Member, PrimitiveType, Shape};
use binshape::dump::{format_value, hex_dump};
use binshape::{decode_layout, decode_layout_with_extent, parse, DecodeError, DecoderOptions, Endianness, Schema, Value};
use std::io::Write;

const LAYOUTS: &str = r#"
// field-indexed header
keyed Header {
  kind: u8 @0;
  name: cstring @1;
  scale: f64 @6;
}

# fields in arrival order
sequence Row {
  id: u16;
  skip(2);
  label: string(4);
  header: Header(14);
  tail: [u8];
}

single Tag {
  skip(1);
  value: u16;
}

sequence Pairs {
  pair: [u16; 2];
  flag: bool;
}

sequence Point { x: u8; y: i8; }
sequence Path { points: [Point]; }
"#;

const HEADER: [u8; 14] = [0xf3, 0x24, 0x56, 0x56, 0x57, 0x00, 0x40, 0x20, 0, 0, 0, 0, 0, 0];

fn schema() -> Schema {
    Schema::from_source(LAYOUTS).expect("resolve")
}

fn big() -> DecoderOptions {
    DecoderOptions::new(Endianness::Big)
}

fn row_bytes() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x2a, 0xff, 0xff];
    bytes.extend_from_slice(b"abcd");
    bytes.extend_from_slice(&HEADER);
    bytes.extend_from_slice(&[1, 2, 3]);
    bytes
}

fn header_value() -> Value {
    Value::Record(vec![
        ("kind".to_string(), Value::U8(243)),
        ("name".to_string(), Value::String("$VVW".to_string())),
        ("scale".to_string(), Value::Double(8.0)),
    ])
}

#[test]
fn test_parse_layouts() {
    let file = parse(LAYOUTS).expect("parse");
    assert_eq!(file.layouts.len(), 6);
    let row = &file.layouts[1];
    assert_eq!(row.name, "Row");
    assert_eq!(row.kind, LayoutKind::Sequence);
    assert_eq!(row.members[1], Member::Skip(2));
    assert_eq!(
        row.members[3],
        Member::Field(FieldDef {
            name: "header".to_string(),
            shape: Shape::Layout { name: "Header".to_string(), length: Some(14) },
            offset: None,
        })
    );
    assert_eq!(
        row.fields().last().map(|f| &f.shape),
        Some(&Shape::List { element: Box::new(Shape::Primitive(PrimitiveType::U8)), count: None })
    );
    let header = &file.layouts[0];
    assert_eq!(header.kind, LayoutKind::Keyed);
    assert_eq!(header.fields().map(|f| f.offset).collect::<Vec<_>>(), vec![Some(0), Some(1), Some(6)]);
    assert_eq!(header.fields().nth(1).map(|f| &f.shape), Some(&Shape::CString));
}

#[test]
fn test_parse_hex_numbers() {
    let file = parse("keyed Flags { bits: u32 @0x10; skip(0x2); }").expect("parse");
    assert_eq!(file.layouts[0].members, vec![
        Member::Field(FieldDef {
            name: "bits".to_string(),
            shape: Shape::Primitive(PrimitiveType::U32),
            offset: Some(16),
        }),
        Member::Skip(2),
    ]);
}

#[test]
fn test_parse_syntax_error() {
    let err = parse("sequence Broken { x: ; }").unwrap_err();
    assert!(err.starts_with("Parse error"), "{}", err);
    assert!(parse("record X { }").is_err());
}

#[test]
fn test_resolve_failures() {
    let cases = [
        ("keyed A { x: u8; }", "needs an @offset"),
        ("sequence A { x: u8 @0; }", "only allowed in keyed"),
        ("sequence A { x: u8; } sequence A { y: u8; }", "Duplicate layout name"),
        ("sequence A { x: u8; x: u16; }", "duplicate field x"),
        ("sequence A { b: B; }", "unknown layout B"),
        ("sequence A { bs: [B; 2]; }", "unknown layout B"),
        ("single A { x: u8; y: u8; }", "exactly one field"),
        ("single A { skip(1); }", "exactly one field"),
    ];
    for (source, expected) in cases {
        let err = Schema::from_source(source).unwrap_err();
        assert!(err.contains(expected), "{}: {}", source, err);
    }
}

#[test]
fn test_schema_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LAYOUTS.as_bytes()).unwrap();
    let schema = Schema::load(file.path()).unwrap();
    assert_eq!(schema.layouts().len(), 6);
    assert!(schema.get("Header").is_some());
    assert!(schema.get("Nope").is_none());
    assert!(Schema::load("/nonexistent/layouts.bin").is_err());
}

#[test]
fn test_decode_keyed_layout() {
    let value = decode_layout(&schema(), "Header", &HEADER, &big()).unwrap();
    assert_eq!(value, header_value());
}

#[test]
fn test_decode_sequence_with_nested_and_list() {
    let bytes = row_bytes();
    let (value, consumed) = decode_layout_with_extent(&schema(), "Row", &bytes, &big()).unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(value.get("id"), Some(&Value::U16(42)));
    assert_eq!(value.get("label").and_then(Value::as_str), Some("abcd"));
    assert_eq!(value.get("header"), Some(&header_value()));
    assert_eq!(
        value.get("tail").and_then(Value::as_list),
        Some(&[Value::U8(1), Value::U8(2), Value::U8(3)][..])
    );
    assert_eq!(value.as_record().map(|r| r.len()), Some(4));
}

#[test]
fn test_decode_single_layout() {
    let value = decode_layout(&schema(), "Tag", &[0x00, 0x01, 0x4c], &big()).unwrap();
    assert_eq!(value, Value::U16(0x14c));
    assert_eq!(value.as_u64(), Some(332));
}

#[test]
fn test_counted_list_leaves_trailing_bytes() {
    let (value, consumed) =
        decode_layout_with_extent(&schema(), "Pairs", &[0x00, 0x01, 0x00, 0x02, 0x01, 0xff], &big()).unwrap();
    assert_eq!(consumed, 5);
    assert_eq!(value.get("pair"), Some(&Value::List(vec![Value::U16(1), Value::U16(2)])));
    assert_eq!(value.get("flag").and_then(Value::as_bool), Some(true));
}

#[test]
fn test_list_of_layouts() {
    let value = decode_layout(&schema(), "Path", &[1, 0xff, 3, 4], &DecoderOptions::default()).unwrap();
    let points = value.get("points").and_then(Value::as_list).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].get("x").and_then(Value::as_u64), Some(1));
    assert_eq!(points[0].get("y").and_then(Value::as_i64), Some(-1));
    assert_eq!(points[1].get("y").and_then(Value::as_i64), Some(4));
}

#[test]
fn test_truncated_nested_layout_reports_offset() {
    let mut bytes = row_bytes();
    bytes.truncate(10);
    let err = decode_layout(&schema(), "Row", &bytes, &big()).unwrap_err();
    assert!(matches!(err, DecodeError::OutOfBounds { offset: 8, needed: 14, available: 10, .. }));
    // Sequence fields are recorded by their byte offset.
    assert_eq!(err.path().map(|p| p.to_string()), Some("Index 8".to_string()));
}

#[test]
fn test_keyed_field_out_of_bounds() {
    let err = decode_layout(&schema(), "Header", &HEADER[..10], &big()).unwrap_err();
    assert_eq!(err.path().map(|p| p.to_string()), Some("scale".to_string()));
}

#[test]
fn test_unknown_layout() {
    let err = decode_layout(&schema(), "Missing", &[], &big()).unwrap_err();
    assert_eq!(err, DecodeError::UnknownLayout("Missing".to_string()));
    assert_eq!(err.path(), None);
}

#[test]
fn test_zero_progress_list_element() {
    let schema = Schema::from_source("sequence Empty { } sequence Many { items: [Empty]; }").unwrap();
    let err = decode_layout(&schema, "Many", &[1, 2], &big()).unwrap_err();
    assert!(matches!(err, DecodeError::DataCorrupted { .. }), "{:?}", err);
}

#[test]
fn test_recursive_layout_hits_nesting_limit() {
    let schema = Schema::from_source("sequence Deep { next: Deep; }").unwrap();
    match decode_layout(&schema, "Deep", &[], &big()) {
        Err(DecodeError::DataCorrupted { path, message }) => {
            assert!(message.contains("nested deeper than 128"), "{}", message);
            assert!(path.len() > 128);
        }
        other => panic!("expected nesting error, got {:?}", other),
    }
}

#[test]
fn test_format_value_tree() {
    let value = Value::Record(vec![
        ("id".to_string(), Value::U8(1)),
        ("name".to_string(), Value::String("ab".to_string())),
        ("tags".to_string(), Value::List(vec![Value::U16(2)])),
    ]);
    assert_eq!(format_value(&value), "{\n  id: 1\n  name: \"ab\"\n  tags: [1 items]\n    [0]: 2\n}\n");
}

#[test]
fn test_hex_dump_rows() {
    let bytes: Vec<u8> = (0..18).collect();
    let dump = hex_dump(&bytes);
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "offset    0: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f");
    assert_eq!(lines[1], "offset   16: 10 11");
}
