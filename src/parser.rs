//! Parse layout source into AST using PEST.

use crate::ast::*;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct LayoutParser;

type Pair<'i> = pest::iterators::Pair<'i, Rule>;

/// Parse layout source into AST.
pub fn parse(source: &str) -> Result<LayoutFile, String> {
    let pairs = LayoutParser::parse(Rule::layout_file, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let pair = pairs.into_iter().next().ok_or("Empty parse")?;
    let mut layouts = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::layout_def {
            layouts.push(build_layout(inner)?);
        }
    }
    Ok(LayoutFile { layouts })
}

fn build_layout(pair: Pair<'_>) -> Result<Layout, String> {
    let mut it = pair.into_inner();
    let kind = match it.next().ok_or("layout: kind")?.as_str() {
        "keyed" => LayoutKind::Keyed,
        "sequence" => LayoutKind::Sequence,
        "single" => LayoutKind::Single,
        other => return Err(format!("unknown layout kind: {}", other)),
    };
    let name = it.next().ok_or("layout: name")?.as_str().to_string();
    let mut members = Vec::new();
    for inner in it {
        match inner.as_rule() {
            Rule::skip_member => {
                let n = inner.into_inner().next().ok_or("skip: count")?;
                members.push(Member::Skip(parse_number(n.as_str())?));
            }
            Rule::field_member => members.push(Member::Field(build_field(inner)?)),
            _ => {}
        }
    }
    Ok(Layout { name, kind, members })
}

fn build_field(pair: Pair<'_>) -> Result<FieldDef, String> {
    let mut it = pair.into_inner();
    let name = it.next().ok_or("field: name")?.as_str().to_string();
    let shape = build_shape(it.next().ok_or("field: shape")?)?;
    let offset = match it.next() {
        Some(at) => {
            let n = at.into_inner().next().ok_or("@offset: number")?;
            Some(parse_number(n.as_str())?)
        }
        None => None,
    };
    Ok(FieldDef { name, shape, offset })
}

fn build_shape(pair: Pair<'_>) -> Result<Shape, String> {
    let inner = pair.into_inner().next().ok_or("empty shape")?;
    match inner.as_rule() {
        Rule::primitive => PrimitiveType::from_keyword(inner.as_str())
            .map(Shape::Primitive)
            .ok_or_else(|| format!("unknown primitive: {}", inner.as_str())),
        Rule::cstring => Ok(Shape::CString),
        Rule::fixed_string => {
            let n = inner.into_inner().next().ok_or("string(n): length")?;
            Ok(Shape::FixedString(parse_number(n.as_str())?))
        }
        Rule::layout_ref => {
            let mut it = inner.into_inner();
            let name = it.next().ok_or("layout reference: name")?.as_str().to_string();
            let length = it.next().map(|n| parse_number(n.as_str())).transpose()?;
            Ok(Shape::Layout { name, length })
        }
        Rule::list_shape => {
            let mut it = inner.into_inner();
            let element = build_shape(it.next().ok_or("list: element")?)?;
            let count = it.next().map(|n| parse_number(n.as_str())).transpose()?;
            Ok(Shape::List { element: Box::new(element), count })
        }
        other => Err(format!("unexpected shape: {:?}", other)),
    }
}

fn parse_number(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {}: {}", s, e))
}
