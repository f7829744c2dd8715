use std::path::Path;

use super::*;

fn parse(src: &str) -> (SourceFile, Vec<String>) {
    let (file, diags) = parse_source(Path::new("test.tempo"), src);
    let codes = diags.into_iter().map(|d| d.diagnostic.code).collect();
    (file, codes)
}

fn parse_clean(src: &str) -> SourceFile {
    let (file, codes) = parse(src);
    assert!(codes.is_empty(), "unexpected diagnostics: {codes:?}");
    file
}

/// Body statements of the single function in `src`.
fn body_of(file: &SourceFile) -> &[Stmt] {
    assert_eq!(file.funcs.len(), 1, "expected exactly one function");
    &file.funcs[0].body.stmts
}

fn in_func(body: &str) -> String {
    format!("func t(a string) {{\n\t{body}\n}}\n")
}

#[test]
fn open_tag_parses_as_statement() {
    let file = parse_clean(&in_func("<div>"));
    let body = body_of(&file);
    assert_eq!(body.len(), 1);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected open tag, got {:?}", body[0]);
    };
    assert_eq!(tag.name.name, "div");
    assert!(tag.body.is_empty());
}

#[test]
fn end_tag_parses_as_statement() {
    let file = parse_clean(&in_func("</div>"));
    let body = body_of(&file);
    let Stmt::EndTag(tag) = &body[0] else {
        panic!("expected end tag, got {:?}", body[0]);
    };
    assert_eq!(tag.name.name, "div");
}

#[test]
fn open_and_end_tag_on_one_line_are_siblings() {
    let file = parse_clean(&in_func("<div></div>"));
    let body = body_of(&file);
    assert_eq!(body.len(), 2);
    assert!(matches!(body[0], Stmt::OpenTag(_)));
    assert!(matches!(body[1], Stmt::EndTag(_)));
}

#[test]
fn tag_content_is_a_sibling_not_a_child() {
    // Everything after `>` sits next to the open tag; only the head between
    // the tag name and `>` nests inside it.
    let file = parse_clean(&in_func("<div>\n\t\"test \\{a}\"\n\t</div>"));
    let body = body_of(&file);
    assert_eq!(body.len(), 3);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected open tag");
    };
    assert!(tag.body.is_empty());
    assert!(matches!(body[1], Stmt::Expr(Expr::Template(_))));
    assert!(matches!(body[2], Stmt::EndTag(_)));
}

#[test]
fn one_line_tag_content_end_tag() {
    // The end-tag marker needs no separator before it, so the whole form
    // fits on one line.
    let file = parse_clean(&in_func("<div>\"test \\{sth}\"</div>"));
    let body = body_of(&file);
    assert_eq!(body.len(), 3);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected open tag");
    };
    assert!(tag.body.is_empty());
    assert!(matches!(body[1], Stmt::Expr(Expr::Template(_))));
    let Stmt::EndTag(end) = &body[2] else {
        panic!("expected end tag");
    };
    assert_eq!(end.name.name, "div");
}

#[test]
fn template_segments_keep_their_delimiters() {
    let file = parse_clean(&in_func("\"test \\{sth}\""));
    let body = body_of(&file);
    let Stmt::Expr(Expr::Template(template)) = &body[0] else {
        panic!("expected template literal");
    };
    assert_eq!(template.strings, vec!["\"test ".to_string(), "\"".to_string()]);
    assert_eq!(template.parts.len(), 1);
    let Expr::Ident(name) = &template.parts[0] else {
        panic!("expected identifier part");
    };
    assert_eq!(name.name, "sth");
}

#[test]
fn template_with_multiple_parts() {
    let file = parse_clean(&in_func("\"test \\{a} \\{b}\""));
    let body = body_of(&file);
    let Stmt::Expr(Expr::Template(template)) = &body[0] else {
        panic!("expected template literal");
    };
    assert_eq!(
        template.strings,
        vec!["\"test ".to_string(), " ".to_string(), "\"".to_string()]
    );
    assert_eq!(template.parts.len(), 2);
}

#[test]
fn interpolation_nests_template_literals() {
    let file = parse_clean(&in_func("\"a \\{\"b \\{c}\"}\""));
    let body = body_of(&file);
    let Stmt::Expr(Expr::Template(outer)) = &body[0] else {
        panic!("expected template literal");
    };
    assert_eq!(outer.parts.len(), 1);
    let Expr::Template(inner) = &outer.parts[0] else {
        panic!("expected nested template literal");
    };
    assert_eq!(inner.strings, vec!["\"b ".to_string(), "\"".to_string()]);
}

fn check_segment_invariant(expr: &Expr) {
    if let Expr::Template(template) = expr {
        assert_eq!(template.strings.len(), template.parts.len() + 1);
        for part in &template.parts {
            check_segment_invariant(part);
        }
    }
}

#[test]
fn segment_invariant_holds_at_every_nesting_depth() {
    let mut literal = "\"v\"".to_string();
    for _ in 0..6 {
        literal = format!(r#""a \{{{literal}}}""#);
        let file = parse_clean(&in_func(&literal));
        let body = body_of(&file);
        let Stmt::Expr(expr) = &body[0] else {
            panic!("expected expression statement");
        };
        check_segment_invariant(expr);
    }
}

#[test]
fn attributes_in_tag_head_with_inferred_separators() {
    let file = parse_clean(&in_func("<div @href=\"test\" @checked>"));
    let body = body_of(&file);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected open tag");
    };
    assert_eq!(tag.body.len(), 2);
    let Stmt::Attribute(href) = &tag.body[0] else {
        panic!("expected attribute");
    };
    assert_eq!(href.name.name, "href");
    assert!(matches!(
        href.value,
        Some(Expr::Literal(Literal::String { .. }))
    ));
    let Stmt::Attribute(checked) = &tag.body[1] else {
        panic!("expected attribute");
    };
    assert_eq!(checked.name.name, "checked");
    assert!(checked.value.is_none());
    assert!(checked.assign_pos.is_none());
}

#[test]
fn attribute_value_can_be_a_template_literal() {
    let file = parse_clean(&in_func("<div @href=\"v \\{a}\">"));
    let body = body_of(&file);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected open tag");
    };
    let Stmt::Attribute(attr) = &tag.body[0] else {
        panic!("expected attribute");
    };
    assert!(matches!(attr.value, Some(Expr::Template(_))));
}

#[test]
fn non_string_attribute_value_is_rejected() {
    let (_, codes) = parse(&in_func("<div @a=5 @b>"));
    assert_eq!(codes.first().map(String::as_str), Some("E1512"));
}

#[test]
fn missing_tag_close_reports_exactly_once() {
    let (file, codes) = parse("func t(a string) {\n\t<div\n}\n");
    assert_eq!(codes, vec!["E1510"]);
    let body = body_of(&file);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected partial open tag");
    };
    // Partial node falls back to the end of the tag name.
    assert_eq!(tag.close_pos, tag.name.span.end);
}

#[test]
fn missing_end_tag_close_is_reported() {
    let (file, codes) = parse("func t(a string) {\n\t</div\n}\n");
    assert_eq!(codes, vec!["E1509"]);
    assert!(matches!(body_of(&file)[0], Stmt::EndTag(_)));
}

#[test]
fn missing_interpolation_close_recovers_to_segment_end() {
    let (file, codes) = parse(&in_func("\"a \\{x y}\""));
    assert_eq!(codes, vec!["E1513"]);
    let body = body_of(&file);
    let Stmt::Expr(expr) = &body[0] else {
        panic!("expected expression statement");
    };
    check_segment_invariant(expr);
}

#[test]
fn empty_interpolation_keeps_the_invariant() {
    let (file, codes) = parse(&in_func("\"a \\{}\""));
    assert_eq!(codes, vec!["E1514"]);
    let body = body_of(&file);
    let Stmt::Expr(Expr::Template(template)) = &body[0] else {
        panic!("expected template literal");
    };
    assert_eq!(template.strings.len(), 2);
    assert!(matches!(template.parts[0], Expr::Bad { .. }));
}

#[test]
fn use_path_keeps_braces_literal() {
    let file = parse_clean("use \"a\\{b}\"\n\nfunc t(a string) {\n}\n");
    assert_eq!(file.uses.len(), 1);
    assert_eq!(file.uses[0].path, "\"a\\{b}\"");
}

#[test]
fn newlines_separate_statements() {
    let file = parse_clean("func t(a int) {\n\tlet x = 1\n\tlet y = 2\n}\n");
    assert_eq!(body_of(&file).len(), 2);
}

#[test]
fn stray_semicolons_produce_no_nodes() {
    let file = parse_clean("func t(a int) {\n\t;;\n\tx\n\t;\n}\n");
    let body = body_of(&file);
    assert_eq!(body.len(), 1);
    assert!(matches!(body[0], Stmt::Expr(Expr::Ident(_))));
}

#[test]
fn less_than_mid_expression_stays_a_comparison() {
    let file = parse_clean("func t(a int) {\n\tlet x = a < 1\n}\n");
    let body = body_of(&file);
    let Stmt::Let { value, .. } = &body[0] else {
        panic!("expected let statement");
    };
    let Expr::Binary { op, .. } = value else {
        panic!("expected binary expression, got {value:?}");
    };
    assert_eq!(op, "<");
}

#[test]
fn function_signature_shape() {
    let file = parse_clean("func t(ctx Context, sth string) error {\n}\n");
    let func = &file.funcs[0];
    assert_eq!(func.name.name, "t");
    assert_eq!(func.params.len(), 2);
    assert_eq!(func.params[0].name.name, "ctx");
    assert_eq!(func.params[0].ty.name, "Context");
    assert_eq!(func.ret.as_ref().map(|r| r.name.as_str()), Some("error"));
}

#[test]
fn top_level_garbage_recovers_to_next_declaration() {
    let (file, codes) = parse("let x = 1\nfunc t(a string) {\n}\n");
    assert_eq!(codes, vec!["E1505"]);
    assert_eq!(file.funcs.len(), 1);
}

#[test]
fn assignment_statement() {
    let file = parse_clean("func t(a int) {\n\ta = a + 1\n}\n");
    let body = body_of(&file);
    let Stmt::Assign { target, .. } = &body[0] else {
        panic!("expected assignment");
    };
    assert_eq!(target.name, "a");
}

#[test]
fn if_else_chain_shape() {
    let file =
        parse_clean("func t(a int) {\n\tif a == 1 {\n\t} else if a == 2 {\n\t} else {\n\t}\n}\n");
    let body = body_of(&file);
    let Stmt::If { else_branch, .. } = &body[0] else {
        panic!("expected if statement");
    };
    let Some(branch) = else_branch else {
        panic!("expected else branch");
    };
    let Stmt::If { else_branch, .. } = branch.as_ref() else {
        panic!("expected else-if");
    };
    assert!(matches!(else_branch.as_deref(), Some(Stmt::Block(_))));
}

#[test]
fn function_literal_in_expression_position() {
    let file = parse_clean("func t(a int) {\n\tlet f = func(b int) int {\n\t\treturn b\n\t}\n}\n");
    let body = body_of(&file);
    let Stmt::Let { value, .. } = &body[0] else {
        panic!("expected let statement");
    };
    let Expr::FuncLit { params, ret, .. } = value else {
        panic!("expected function literal");
    };
    assert_eq!(params.len(), 1);
    assert!(ret.is_some());
}

#[test]
fn host_statement_in_tag_head() {
    // A statement between the tag name and `>` nests in the head; the `>`
    // must start its own line (or follow `;`) to lex as the tag close.
    let file = parse_clean(&in_func("<div\n\tlet x = 1\n\t>"));
    let body = body_of(&file);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected open tag");
    };
    assert_eq!(tag.body.len(), 1);
    assert!(matches!(tag.body[0], Stmt::Let { .. }));
}

#[test]
fn explicit_separator_in_tag_head() {
    let file = parse_clean(&in_func("<div; let x = 1;>"));
    let body = body_of(&file);
    let Stmt::OpenTag(tag) = &body[0] else {
        panic!("expected open tag");
    };
    assert_eq!(tag.body.len(), 1);
    assert!(matches!(tag.body[0], Stmt::Let { .. }));
}

#[test]
fn unexpected_character_leaves_a_placeholder_and_continues() {
    let (file, codes) = parse("func t(a int) {\n\t#\n\tlet x = 1\n}\n");
    assert_eq!(codes, vec!["E1000"]);
    let body = body_of(&file);
    assert_eq!(body.len(), 2);
    assert!(matches!(body[0], Stmt::Bad { .. }));
    assert!(matches!(body[1], Stmt::Let { .. }));
}
