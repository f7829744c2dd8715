use crate::diagnostics::{Diagnostic, DiagnosticSeverity, FileDiagnostic, Span};
use crate::syntax::{expr_span, Block, Expr, SourceFile, Stmt};

/// Where the traversal currently sits; decides which templating constructs
/// are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Ordinary code: no templating constructs allowed.
    Host,
    /// Body of a function with at least one parameter.
    TemplateBody,
    /// Direct children of an open tag, between the tag name and `>`.
    TagHead,
}

struct Analyzer {
    path: String,
    diagnostics: Vec<FileDiagnostic>,
}

/// Check that tags, attributes and template literals only appear where they
/// are meaningful. Pure over the AST: never mutates it, safe to call
/// repeatedly, and never stops at the first violation.
pub fn analyze(file: &SourceFile) -> Vec<FileDiagnostic> {
    let mut analyzer = Analyzer {
        path: file.path.clone(),
        diagnostics: Vec::new(),
    };
    for func in &file.funcs {
        let context = if func.params.is_empty() {
            Context::Host
        } else {
            Context::TemplateBody
        };
        analyzer.visit_block(&func.body, context);
    }
    analyzer.diagnostics
}

impl Analyzer {
    fn report(&mut self, code: &str, message: &str, span: Span) {
        self.diagnostics.push(FileDiagnostic {
            path: self.path.clone(),
            diagnostic: Diagnostic {
                code: code.to_string(),
                severity: DiagnosticSeverity::Error,
                message: message.to_string(),
                span,
                labels: Vec::new(),
            },
        });
    }

    fn visit_block(&mut self, block: &Block, context: Context) {
        for stmt in &block.stmts {
            self.visit_stmt(stmt, context);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt, context: Context) {
        match stmt {
            // Control flow passes the inherited context through, so
            // templating stays legal inside loops and conditionals nested in
            // a template body.
            Stmt::Expr(expr) => self.visit_expr(expr, context),
            Stmt::Block(block) => self.visit_block(block, context),
            Stmt::If {
                cond,
                then_block,
                else_branch,
                ..
            } => {
                self.visit_expr(cond, context);
                self.visit_block(then_block, context);
                if let Some(branch) = else_branch {
                    self.visit_stmt(branch, context);
                }
            }
            Stmt::For { cond, body, .. } => {
                if let Some(cond) = cond {
                    self.visit_expr(cond, context);
                }
                self.visit_block(body, context);
            }
            // Bindings reset to host context: a template literal on the
            // right-hand side of an assignment is a violation.
            Stmt::Let { value, .. } | Stmt::Assign { value, .. } => {
                self.visit_expr(value, Context::Host)
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.visit_expr(value, Context::Host);
                }
            }
            Stmt::OpenTag(tag) => {
                if context != Context::TemplateBody {
                    self.report(
                        "E1601",
                        "open tag is not allowed in this context",
                        Span {
                            start: tag.open_pos,
                            end: tag.close_pos,
                        },
                    );
                }
                for child in &tag.body {
                    self.visit_stmt(child, Context::TagHead);
                }
            }
            Stmt::EndTag(tag) => {
                if context != Context::TemplateBody {
                    self.report(
                        "E1602",
                        "end tag is not allowed in this context",
                        Span {
                            start: tag.open_pos,
                            end: tag.close_pos,
                        },
                    );
                }
            }
            Stmt::Attribute(attr) => {
                if context != Context::TagHead {
                    self.report(
                        "E1604",
                        "attribute is not allowed in this context",
                        Span {
                            start: attr.start_pos,
                            end: attr.end_pos,
                        },
                    );
                }
                // Attribute values are not descended into; a templated value
                // is legal exactly here.
            }
            Stmt::Bad { .. } => {}
        }
    }

    fn visit_expr(&mut self, expr: &Expr, context: Context) {
        match expr {
            Expr::Template(template) => {
                if context != Context::TemplateBody {
                    self.report(
                        "E1603",
                        "template literal is not allowed in this context",
                        expr_span(expr),
                    );
                }
                for part in &template.parts {
                    self.visit_expr(part, context);
                }
            }
            Expr::FuncLit { params, body, .. } => {
                let inner = if params.is_empty() {
                    Context::Host
                } else {
                    Context::TemplateBody
                };
                self.visit_block(body, inner);
            }
            // Everything else is ordinary expression structure; children
            // drop back to host context.
            Expr::Unary { expr, .. } | Expr::Paren { expr, .. } => {
                self.visit_expr(expr, Context::Host)
            }
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left, Context::Host);
                self.visit_expr(right, Context::Host);
            }
            Expr::Call { func, args, .. } => {
                self.visit_expr(func, Context::Host);
                for arg in args {
                    self.visit_expr(arg, Context::Host);
                }
            }
            Expr::Ident(_) | Expr::Literal(_) | Expr::Bad { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use std::path::Path;

    fn analyze_src(src: &str) -> Vec<String> {
        let (file, diags) = parse_source(Path::new("test.tempo"), src);
        assert!(
            diags.is_empty(),
            "unexpected parse diagnostics: {:?}",
            diags.iter().map(|d| &d.diagnostic.code).collect::<Vec<_>>()
        );
        analyze(&file)
            .into_iter()
            .map(|d| d.diagnostic.code)
            .collect()
    }

    #[test]
    fn template_literal_in_template_function_is_legal() {
        let codes = analyze_src("func page(title string) {\n\t\"hello \\{title}\"\n}\n");
        assert!(codes.is_empty(), "unexpected: {codes:?}");
    }

    #[test]
    fn template_literal_in_plain_function_is_rejected() {
        let codes = analyze_src("func page() {\n\t\"hello \\{x}\"\n}\n");
        assert_eq!(codes, vec!["E1603"]);
    }

    #[test]
    fn tags_in_plain_function_are_rejected() {
        let codes = analyze_src("func page() {\n\t<div>\n\t</div>\n}\n");
        assert_eq!(codes, vec!["E1601", "E1602"]);
    }

    #[test]
    fn attribute_is_only_legal_in_tag_head() {
        let codes = analyze_src("func page(a string) {\n\t<div @href=\"x\">\n\t</div>\n}\n");
        assert!(codes.is_empty(), "unexpected: {codes:?}");
    }

    #[test]
    fn attribute_outside_tag_head_is_rejected() {
        let codes = analyze_src("func page(a string) {\n\t@href=\"x\"\n}\n");
        assert_eq!(codes, vec!["E1604"]);
    }

    #[test]
    fn control_flow_passes_context_through() {
        let src = "func page(a string) {\n\tif a == a {\n\t\t<div>\n\t\t</div>\n\t}\n\tfor {\n\t\t\"x \\{a}\"\n\t}\n}\n";
        let codes = analyze_src(src);
        assert!(codes.is_empty(), "unexpected: {codes:?}");
    }

    #[test]
    fn let_binding_resets_to_host_context() {
        let codes = analyze_src("func page(a string) {\n\tlet x = \"v \\{a}\"\n\tx\n}\n");
        assert_eq!(codes, vec!["E1603"]);
    }

    #[test]
    fn templated_attribute_value_is_not_a_violation() {
        let codes =
            analyze_src("func page(a string) {\n\t<div @href=\"v \\{a}\">\n\t</div>\n}\n");
        assert!(codes.is_empty(), "unexpected: {codes:?}");
    }

    #[test]
    fn zero_param_function_literal_resets_context() {
        let src = "func page(a string) {\n\tlet f = func() {\n\t\t\"x \\{a}\"\n\t}\n\tf()\n}\n";
        let codes = analyze_src(src);
        assert_eq!(codes, vec!["E1603"]);
    }

    #[test]
    fn template_literal_nested_in_tag_head_is_flagged() {
        // A bare template literal between a tag name and `>` sits in the
        // tag head, where only attributes are allowed.
        let codes = analyze_src("func page(a string) {\n\t<div\n\t\"x \\{a}\"\n\t>\n}\n");
        assert_eq!(codes, vec!["E1603"]);
    }

    #[test]
    fn analyze_is_repeatable() {
        let (file, _) = parse_source(
            Path::new("test.tempo"),
            "func page() {\n\t\"x \\{y}\"\n}\n",
        );
        let first = analyze(&file);
        let second = analyze(&file);
        assert_eq!(first.len(), second.len());
    }
}
