//! Abstract Syntax Tree for the layout language.

use crate::parser::parse;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Root of a parsed layout file.
#[derive(Debug, Clone, Default)]
pub struct LayoutFile {
    pub layouts: Vec<Layout>,
}

/// Which container a layout is decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Field-indexed: every field carries its byte offset.
    Keyed,
    /// Fields in arrival order.
    Sequence,
    /// Exactly one field, decoded as the layout's value.
    Single,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    pub kind: LayoutKind,
    pub members: Vec<Member>,
}

impl Layout {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            Member::Skip(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    /// Advance the cursor without decoding.
    Skip(usize),
    Field(FieldDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub shape: Shape,
    /// Byte offset within a keyed layout.
    pub offset: Option<usize>,
}

/// Shape of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Primitive(PrimitiveType),
    /// Null-terminated UTF-8.
    CString,
    /// UTF-8 of exactly n bytes.
    FixedString(usize),
    /// Nested layout; `length` confines it, otherwise it gets the rest of the region.
    Layout { name: String, length: Option<usize> },
    /// Elements until the end of the region, or exactly `count` elements.
    List { element: Box<Shape>, count: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Bool,
    F32,
    F64,
}

impl PrimitiveType {
    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "u8" => PrimitiveType::U8,
            "u16" => PrimitiveType::U16,
            "u32" => PrimitiveType::U32,
            "u64" => PrimitiveType::U64,
            "i8" => PrimitiveType::I8,
            "i16" => PrimitiveType::I16,
            "i32" => PrimitiveType::I32,
            "i64" => PrimitiveType::I64,
            "bool" => PrimitiveType::Bool,
            "f32" => PrimitiveType::F32,
            "f64" => PrimitiveType::F64,
            _ => return None,
        })
    }
}

/// Resolved layouts by name, checked for consistency.
#[derive(Debug, Clone)]
pub struct Schema {
    pub file: LayoutFile,
    pub layouts_by_name: HashMap<String, usize>,
}

impl Schema {
    pub fn resolve(file: LayoutFile) -> Result<Self, String> {
        let mut layouts_by_name = HashMap::new();
        for (i, l) in file.layouts.iter().enumerate() {
            if layouts_by_name.insert(l.name.clone(), i).is_some() {
                return Err(format!("Duplicate layout name: {}", l.name));
            }
        }
        for l in &file.layouts {
            check_layout(l, &layouts_by_name)?;
        }
        Ok(Schema { file, layouts_by_name })
    }

    /// Parse and resolve layout source.
    pub fn from_source(source: &str) -> Result<Self, String> {
        Schema::resolve(parse(source)?)
    }

    /// Read, parse and resolve a layout file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Schema::from_source(&source)
    }

    pub fn get(&self, name: &str) -> Option<&Layout> {
        self.layouts_by_name.get(name).map(|&i| &self.file.layouts[i])
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.file.layouts
    }
}

fn check_layout(layout: &Layout, names: &HashMap<String, usize>) -> Result<(), String> {
    let mut seen = HashSet::new();
    for f in layout.fields() {
        if !seen.insert(f.name.as_str()) {
            return Err(format!("{}: duplicate field {}", layout.name, f.name));
        }
        match (layout.kind, f.offset) {
            (LayoutKind::Keyed, None) => {
                return Err(format!("{}.{}: keyed field needs an @offset", layout.name, f.name));
            }
            (LayoutKind::Sequence | LayoutKind::Single, Some(_)) => {
                return Err(format!(
                    "{}.{}: @offset is only allowed in keyed layouts",
                    layout.name, f.name
                ));
            }
            _ => {}
        }
        check_shape(&f.shape, names).map_err(|e| format!("{}.{}: {}", layout.name, f.name, e))?;
    }
    if layout.kind == LayoutKind::Single && seen.len() != 1 {
        return Err(format!(
            "{}: single layout must have exactly one field, found {}",
            layout.name,
            seen.len()
        ));
    }
    Ok(())
}

fn check_shape(shape: &Shape, names: &HashMap<String, usize>) -> Result<(), String> {
    match shape {
        Shape::Layout { name, .. } if !names.contains_key(name) => Err(format!("unknown layout {}", name)),
        Shape::List { element, .. } => check_shape(element, names),
        _ => Ok(()),
    }
}
