//! Parse protocol description documents into a directive tree using PEST.

use crate::ast::*;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct DescriptionParser;

/// Deepest element nesting accepted in a description (the `eventdef` counts).
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parse description source into a directive tree.
pub fn parse(source: &str) -> Result<DirectiveTree, String> {
    check_nesting(source)?;
    let pairs = DescriptionParser::parse(Rule::document, source)
        .map_err(|e| format!("Parse error: {}", e))?;
    let pair = pairs.into_iter().next().ok_or("Empty parse")?;
    let mut nodes = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::element {
            nodes.push(build_directive(inner)?);
        }
    }
    Ok(DirectiveTree { nodes })
}

/// Reject over-deep documents before the recursive descent sees them.
/// Only tracks element depth; syntax errors are left to the grammar.
fn check_nesting(source: &str) -> Result<(), String> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &source[i..];
        if rest.starts_with("<!--") {
            i += rest.find("-->").map_or(rest.len(), |end| end + 3);
        } else if rest.starts_with("<?") {
            i += rest.find("?>").map_or(rest.len(), |end| end + 2);
        } else if rest.starts_with("</") {
            depth = depth.saturating_sub(1);
            i += 2;
        } else {
            let mut j = i + 1;
            let mut quote = None;
            while j < bytes.len() {
                let b = bytes[j];
                match quote {
                    Some(q) if b == q => quote = None,
                    Some(_) => {}
                    None if b == b'"' || b == b'\'' => quote = Some(b),
                    None if b == b'>' => break,
                    None => {}
                }
                j += 1;
            }
            let self_closing = j < bytes.len() && bytes[j - 1] == b'/';
            if !self_closing {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    let (line, _) = pest::Position::new(source, i)
                        .map(|p| p.line_col())
                        .unwrap_or((0, 0));
                    return Err(format!(
                        "line {}: elements nested deeper than {}",
                        line, MAX_NESTING_DEPTH
                    ));
                }
            }
            i = j + 1;
        }
    }
    Ok(())
}

fn build_directive(pair: pest::iterators::Pair<Rule>) -> Result<Directive, String> {
    let (line, _) = pair.as_span().start_pos().line_col();
    let mut kind: Option<String> = None;
    let mut attributes = Vec::new();
    let mut children = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => kind = Some(inner.as_str().to_string()),
            Rule::attribute => attributes.push(build_attribute(inner)?),
            Rule::element => children.push(build_directive(inner)?),
            Rule::close_tag => {
                let closing = inner.into_inner().next().ok_or("close tag: name")?;
                if Some(closing.as_str()) != kind.as_deref() {
                    return Err(format!(
                        "line {}: closing tag </{}> does not match <{}>",
                        line,
                        closing.as_str(),
                        kind.as_deref().unwrap_or("")
                    ));
                }
            }
            _ => {}
        }
    }
    let kind = kind.ok_or_else(|| format!("line {}: element without a name", line))?;
    for (i, (k, _)) in attributes.iter().enumerate() {
        if attributes[..i].iter().any(|(prev, _)| prev == k) {
            return Err(format!("line {}: duplicate attribute {} on <{}>", line, k, kind));
        }
    }
    Ok(Directive {
        kind,
        attributes,
        children,
    })
}

fn build_attribute(pair: pest::iterators::Pair<Rule>) -> Result<(String, String), String> {
    let mut it = pair.into_inner();
    let name = it.next().ok_or("attribute: name")?.as_str().to_string();
    let value = it.next().ok_or("attribute: value")?;
    let raw = value.into_inner().next().map(|p| p.as_str()).unwrap_or("");
    Ok((name, decode_entities(raw)?))
}

/// Replace predefined and numeric character references in an attribute value.
fn decode_entities(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| format!("unterminated entity in \"{}\"", raw))?;
        let entity = &after[..semi];
        let c = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| format!("unknown entity &{};", entity))?
            }
        };
        out.push(c);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
