//! Format decoded values for display (indented tree, hex rows).

use crate::value::Value;
use std::fmt::Write;

/// Format a scalar; `None` for records and lists.
pub fn format_scalar(v: &Value) -> Option<String> {
    Some(match v {
        Value::U8(x) => x.to_string(),
        Value::U16(x) => x.to_string(),
        Value::U32(x) => x.to_string(),
        Value::U64(x) => x.to_string(),
        Value::I8(x) => x.to_string(),
        Value::I16(x) => x.to_string(),
        Value::I32(x) => x.to_string(),
        Value::I64(x) => x.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Double(x) => x.to_string(),
        Value::String(s) => format!("{:?}", s),
        Value::Record(_) | Value::List(_) => return None,
    })
}

/// Render a value as an indented tree, one field or element per line.
pub fn format_value(v: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, None, v, 0);
    out
}

fn write_value(out: &mut String, label: Option<&str>, v: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    let prefix = match label {
        Some(l) => format!("{}{}: ", indent, l),
        None => indent.clone(),
    };
    match v {
        Value::Record(fields) => {
            let _ = writeln!(out, "{}{{", prefix);
            for (name, field) in fields {
                write_value(out, Some(name), field, depth + 1);
            }
            let _ = writeln!(out, "{}}}", indent);
        }
        Value::List(items) => {
            let _ = writeln!(out, "{}[{} items]", prefix, items.len());
            for (i, item) in items.iter().enumerate() {
                write_value(out, Some(&format!("[{}]", i)), item, depth + 1);
            }
        }
        scalar => {
            let text = format_scalar(scalar).unwrap_or_default();
            let _ = writeln!(out, "{}{}", prefix, text);
        }
    }
}

/// Hex dump in rows of 16 bytes, each prefixed with its offset.
pub fn hex_dump(bytes: &[u8]) -> String {
    const COLS: usize = 16;
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(COLS).enumerate() {
        let hex_line = chunk.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ");
        let _ = writeln!(out, "offset {:4}: {}", i * COLS, hex_line);
    }
    out
}
