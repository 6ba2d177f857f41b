//! Description document tests: syntax (parse success/failure) and the tree shape
//! handed to the compiler.

use csvevent::{compile_source, parse, CompileError, DirectiveKind, MAX_NESTING_DEPTH};

// ==================== Syntax: valid documents ====================

#[test]
fn parse_empty_document() {
    let tree = parse("").expect("empty document can parse");
    assert!(tree.nodes.is_empty());
    let tree = parse("  \n\t").expect("whitespace-only document can parse");
    assert!(tree.nodes.is_empty());
}

#[test]
fn parse_minimal_eventdef() {
    let tree = parse("<eventdef/>").expect("parse");
    assert_eq!(tree.nodes.len(), 1);
    assert_eq!(tree.nodes[0].kind, "eventdef");
    assert!(tree.nodes[0].children.is_empty());
    assert_eq!(tree.nodes[0].kind(), Some(DirectiveKind::EventDef));
}

#[test]
fn parse_prolog_and_comments() {
    let src = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- capture format -->
<eventdef>
  <!-- first field -->
  <timestamp name="ts"/>
  <mnemonic name="type"/><!-- trailing -->
</eventdef>
<!-- done -->
"#;
    let tree = parse(src).expect("parse");
    assert_eq!(tree.nodes.len(), 1);
    assert_eq!(tree.nodes[0].children.len(), 2);
}

#[test]
fn parse_all_directive_kinds() {
    let src = r#"
<eventdef>
  <timestamp name="a"/>
  <integer name="b"/>
  <mnemonic name="c"/>
  <condition c="X">
    <integer name="d"/>
  </condition>
  <bytestream name="e" length="b"/>
</eventdef>
"#;
    let tree = parse(src).expect("parse");
    let kinds: Vec<_> = tree.nodes[0]
        .children
        .iter()
        .map(|d| d.kind().expect("known kind"))
        .collect();
    assert_eq!(
        kinds,
        [
            DirectiveKind::Timestamp,
            DirectiveKind::Integer,
            DirectiveKind::Mnemonic,
            DirectiveKind::Condition,
            DirectiveKind::ByteStream,
        ]
    );
    let bytestream = &tree.nodes[0].children[4];
    assert_eq!(bytestream.attribute("name"), Some("e"));
    assert_eq!(bytestream.attribute("length"), Some("b"));
}

#[test]
fn parse_unknown_kinds_are_kept_for_the_compiler() {
    let tree = parse(r#"<eventdef><float name="x"/></eventdef>"#).expect("parse");
    let child = &tree.nodes[0].children[0];
    assert_eq!(child.kind, "float");
    assert_eq!(child.kind(), None);
}

#[test]
fn parse_single_quotes_spacing_and_entities() {
    let src = "<eventdef>\n  <condition  type = 'A&amp;B' >\n    <mnemonic name=\"&quot;q&quot;\" />\n  </condition>\n</eventdef>";
    let tree = parse(src).expect("parse");
    let cond = &tree.nodes[0].children[0];
    assert_eq!(cond.first_attribute(), Some(("type", "A&B")));
    assert_eq!(cond.children[0].attribute("name"), Some("\"q\""));
}

#[test]
fn parse_empty_attribute_value() {
    let tree = parse(r#"<eventdef><condition type=""/></eventdef>"#).expect("parse");
    assert_eq!(tree.nodes[0].children[0].first_attribute(), Some(("type", "")));
}

#[test]
fn parse_attribute_order_is_preserved() {
    let tree = parse(r#"<condition z="1" a="2" m="3"/>"#).expect("parse");
    let names: Vec<_> = tree.nodes[0]
        .attributes
        .iter()
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(names, ["z", "a", "m"]);
}

#[test]
fn parse_multiple_top_level_elements() {
    let tree = parse("<eventdef/><eventdef><integer name=\"x\"/></eventdef>").expect("parse");
    assert_eq!(tree.nodes.len(), 2);
    assert_eq!(tree.nodes[1].children.len(), 1);
}

#[test]
fn parse_deep_nesting() {
    let mut src = String::from("<eventdef><mnemonic name=\"t\"/>");
    for _ in 0..32 {
        src.push_str("<condition t=\"x\">");
    }
    src.push_str("<integer name=\"leaf\"/>");
    for _ in 0..32 {
        src.push_str("</condition>");
    }
    src.push_str("</eventdef>");
    let tree = parse(&src).expect("parse");
    let mut node = &tree.nodes[0].children[1];
    let mut depth = 1;
    while node.kind == "condition" {
        node = node.children.last().expect("child");
        depth += 1;
    }
    assert_eq!(depth, 33);
    assert_eq!(node.attribute("name"), Some("leaf"));
}

// ==================== Syntax: invalid documents ====================

#[test]
fn reject_mismatched_closing_tag() {
    let err = parse("<eventdef><integer name=\"x\"></mnemonic></eventdef>").unwrap_err();
    assert!(err.contains("does not match"), "{}", err);
}

#[test]
fn reject_unclosed_element() {
    assert!(parse("<eventdef><integer name=\"x\"/>").is_err());
}

#[test]
fn reject_text_content() {
    assert!(parse("<eventdef>hello</eventdef>").is_err());
}

#[test]
fn reject_unquoted_attribute() {
    assert!(parse("<eventdef><integer name=x/></eventdef>").is_err());
}

#[test]
fn reject_duplicate_attribute() {
    let err = parse(r#"<integer name="a" name="b"/>"#).unwrap_err();
    assert!(err.contains("duplicate attribute"), "{}", err);
}

#[test]
fn reject_unknown_entity() {
    assert!(parse(r#"<integer name="&nope;"/>"#).is_err());
}

#[test]
fn reject_excessive_nesting() {
    let depth = 5000;
    let src = format!(
        "<eventdef><mnemonic name=\"t\"/>{}<integer name=\"leaf\"/>{}</eventdef>",
        "<condition t=\"x\">".repeat(depth),
        "</condition>".repeat(depth)
    );
    let err = parse(&src).unwrap_err();
    assert!(err.contains(&format!("deeper than {}", MAX_NESTING_DEPTH)), "{}", err);
    assert!(matches!(
        compile_source(&src),
        Err(CompileError::SourceUnavailable(_))
    ));
}

#[test]
fn reject_unterminated_comment() {
    assert!(parse("<eventdef/><!-- open").is_err());
}
