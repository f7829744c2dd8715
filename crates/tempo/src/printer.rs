use crate::syntax::{AttributeStmt, Expr, FuncDecl, Literal, Param, SourceFile, Stmt};

/// Serialize an AST back to source text. Output is canonical (two-space
/// indent, one statement per line) rather than byte-identical to the input;
/// re-parsing the output of an accepted file yields the same tree again,
/// which is what formatting and fixture tooling rely on.
pub fn print_source(file: &SourceFile) -> String {
    let mut printer = Printer {
        out: String::new(),
        depth: 0,
    };
    for use_decl in &file.uses {
        printer.line(&format!("use {}", use_decl.path));
    }
    if !file.uses.is_empty() && !file.funcs.is_empty() {
        printer.out.push('\n');
    }
    for (index, func) in file.funcs.iter().enumerate() {
        if index > 0 {
            printer.out.push('\n');
        }
        printer.print_func(func);
    }
    printer.out
}

struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn indent(&mut self) {
        self.out.push_str(&"  ".repeat(self.depth));
    }

    fn line(&mut self, text: &str) {
        self.indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn print_func(&mut self, func: &FuncDecl) {
        let ret = match &func.ret {
            Some(name) => format!(" {}", name.name),
            None => String::new(),
        };
        self.line(&format!(
            "func {}({}){} {{",
            func.name.name,
            params_text(&func.params),
            ret
        ));
        self.depth += 1;
        for stmt in &func.body.stmts {
            self.print_stmt(stmt);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                let text = self.expr_text(expr);
                self.line(&text);
            }
            Stmt::Let { name, value, .. } => {
                let text = format!("let {} = {}", name.name, self.expr_text(value));
                self.line(&text);
            }
            Stmt::Assign { target, value, .. } => {
                let text = format!("{} = {}", target.name, self.expr_text(value));
                self.line(&text);
            }
            Stmt::Return { value, .. } => match value {
                Some(expr) => {
                    let text = format!("return {}", self.expr_text(expr));
                    self.line(&text);
                }
                None => self.line("return"),
            },
            Stmt::If { .. } => self.print_if(stmt),
            Stmt::For { cond, body, .. } => {
                let head = match cond {
                    Some(expr) => format!("for {} {{", self.expr_text(expr)),
                    None => "for {".to_string(),
                };
                self.line(&head);
                self.depth += 1;
                for inner in &body.stmts {
                    self.print_stmt(inner);
                }
                self.depth -= 1;
                self.line("}");
            }
            Stmt::Block(block) => {
                self.line("{");
                self.depth += 1;
                for inner in &block.stmts {
                    self.print_stmt(inner);
                }
                self.depth -= 1;
                self.line("}");
            }
            Stmt::OpenTag(tag) => {
                let mut head = format!("<{}", tag.name.name);
                for child in &tag.body {
                    match child {
                        Stmt::Attribute(attr) => {
                            head.push(' ');
                            head.push_str(&self.attr_text(attr));
                        }
                        other => {
                            head.push_str("; ");
                            head.push_str(&self.stmt_inline_text(other));
                            // Keep the closing `>` at statement position;
                            // right after an expression it would lex as a
                            // comparison.
                            head.push(';');
                        }
                    }
                }
                head.push('>');
                self.line(&head);
            }
            Stmt::EndTag(tag) => self.line(&format!("</{}>", tag.name.name)),
            Stmt::Attribute(attr) => {
                let text = self.attr_text(attr);
                self.line(&text);
            }
            Stmt::Bad { .. } => {}
        }
    }

    fn print_if(&mut self, stmt: &Stmt) {
        let Stmt::If {
            cond,
            then_block,
            else_branch,
            ..
        } = stmt
        else {
            return;
        };
        let head = format!("if {} {{", self.expr_text(cond));
        self.line(&head);
        self.depth += 1;
        for inner in &then_block.stmts {
            self.print_stmt(inner);
        }
        self.depth -= 1;

        let mut branch = else_branch;
        loop {
            match branch.as_deref() {
                None => {
                    self.line("}");
                    break;
                }
                Some(Stmt::If {
                    cond,
                    then_block,
                    else_branch,
                    ..
                }) => {
                    let head = format!("}} else if {} {{", self.expr_text(cond));
                    self.line(&head);
                    self.depth += 1;
                    for inner in &then_block.stmts {
                        self.print_stmt(inner);
                    }
                    self.depth -= 1;
                    branch = else_branch;
                }
                Some(Stmt::Block(block)) => {
                    self.line("} else {");
                    self.depth += 1;
                    for inner in &block.stmts {
                        self.print_stmt(inner);
                    }
                    self.depth -= 1;
                    self.line("}");
                    break;
                }
                Some(other) => {
                    // Not produced by the parser; render it standalone.
                    self.line("} else {");
                    self.depth += 1;
                    self.print_stmt(other);
                    self.depth -= 1;
                    self.line("}");
                    break;
                }
            }
        }
    }

    fn attr_text(&self, attr: &AttributeStmt) -> String {
        match &attr.value {
            Some(value) => format!("@{}={}", attr.name.name, self.expr_text(value)),
            None => {
                if attr.assign_pos.is_some() {
                    // `@attr=` with a missing value; keep the `=` so the
                    // shape survives reprinting.
                    format!("@{}=", attr.name.name)
                } else {
                    format!("@{}", attr.name.name)
                }
            }
        }
    }

    /// Single-line rendering for non-attribute statements inside a tag head,
    /// with `;` standing in for line breaks.
    fn stmt_inline_text(&self, stmt: &Stmt) -> String {
        let mut inner = Printer {
            out: String::new(),
            depth: 0,
        };
        inner.print_stmt(stmt);
        inner
            .out
            .lines()
            .map(str::trim_start)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn expr_text(&self, expr: &Expr) -> String {
        match expr {
            Expr::Ident(name) => name.name.clone(),
            Expr::Literal(Literal::Number { text, .. })
            | Expr::Literal(Literal::String { text, .. }) => text.clone(),
            Expr::Template(template) => {
                // Segments keep their delimiters, so interleaving them with
                // `\{...}` reproduces the literal exactly.
                let mut out = String::new();
                for (index, segment) in template.strings.iter().enumerate() {
                    out.push_str(segment);
                    if let Some(part) = template.parts.get(index) {
                        out.push_str("\\{");
                        out.push_str(&self.expr_text(part));
                        out.push('}');
                    }
                }
                out
            }
            Expr::Unary { op, expr, .. } => format!("{}{}", op, self.expr_text(expr)),
            Expr::Binary {
                op, left, right, ..
            } => format!(
                "{} {} {}",
                self.expr_text(left),
                op,
                self.expr_text(right)
            ),
            Expr::Call { func, args, .. } => {
                let args: Vec<String> = args.iter().map(|arg| self.expr_text(arg)).collect();
                format!("{}({})", self.expr_text(func), args.join(", "))
            }
            Expr::Paren { expr, .. } => format!("({})", self.expr_text(expr)),
            Expr::FuncLit {
                params, ret, body, ..
            } => {
                let ret = match ret {
                    Some(name) => format!(" {}", name.name),
                    None => String::new(),
                };
                let mut inner = Printer {
                    out: String::new(),
                    depth: self.depth + 1,
                };
                for stmt in &body.stmts {
                    inner.print_stmt(stmt);
                }
                format!(
                    "func({}){} {{\n{}{}}}",
                    params_text(params),
                    ret,
                    inner.out,
                    "  ".repeat(self.depth)
                )
            }
            Expr::Bad { .. } => String::new(),
        }
    }
}

fn params_text(params: &[Param]) -> String {
    params
        .iter()
        .map(|param| format!("{} {}", param.name.name, param.ty.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use std::path::Path;

    /// Print, re-parse, print again; an accepted input must reach a fixpoint
    /// after one round.
    fn assert_round_trip(src: &str) {
        let (file, diags) = parse_source(Path::new("test.tempo"), src);
        assert!(
            diags.is_empty(),
            "unexpected diagnostics for input: {:?}",
            diags.iter().map(|d| &d.diagnostic.code).collect::<Vec<_>>()
        );
        let first = print_source(&file);
        let (reparsed, diags) = parse_source(Path::new("test.tempo"), &first);
        assert!(
            diags.is_empty(),
            "printed form does not re-parse cleanly:\n{first}\n{:?}",
            diags.iter().map(|d| &d.diagnostic.code).collect::<Vec<_>>()
        );
        let second = print_source(&reparsed);
        assert_eq!(first, second, "print/parse cycle is not idempotent");
    }

    #[test]
    fn round_trip_tag_with_template_body() {
        assert_round_trip(
            "func test(ctx Context, sth string) error {\n\t<div @href=\"test\" @test=\"hello\">\n\t\"test \\{sth}\"\n\t</div>\n}\n",
        );
    }

    #[test]
    fn round_trip_plain_host_code() {
        assert_round_trip(
            "use \"lib/strings\"\n\nfunc main() {\n\tlet x = 1 + 2 * 3\n\tx = x % 4\n\tif x == 0 {\n\t\treturn\n\t} else if x < 2 {\n\t\tx = 0\n\t} else {\n\t\tx = 1\n\t}\n\tfor x < 10 {\n\t\tx = x + 1\n\t}\n}\n",
        );
    }

    #[test]
    fn round_trip_one_line_tag_content() {
        assert_round_trip("func t(sth string) {\n\t<div>\"test \\{sth}\"</div>\n}\n");
    }

    #[test]
    fn round_trip_nested_interpolation() {
        assert_round_trip("func t(a string) {\n\t\"a \\{\"b \\{c}\"}\"\n}\n");
    }

    #[test]
    fn round_trip_bare_attribute_and_tags() {
        assert_round_trip(
            "func t(a string) {\n\t<input @checked @name=\"x\">\n\t</input>\n}\n",
        );
    }

    #[test]
    fn round_trip_function_literal() {
        assert_round_trip(
            "func t(a string) {\n\tlet f = func(b int) int {\n\t\treturn b\n\t}\n\tf(1)\n}\n",
        );
    }

    #[test]
    fn round_trip_call_and_unary() {
        assert_round_trip("func t(a int) {\n\tlet y = -a + !b(c, d(e))\n\tlet z = (y)\n}\n");
    }

    #[test]
    fn printed_template_keeps_segments() {
        let (file, diags) = parse_source(
            Path::new("test.tempo"),
            "func t(a string) {\n\t\"x \\{a} y\"\n}\n",
        );
        assert!(diags.is_empty());
        let printed = print_source(&file);
        assert!(printed.contains("\"x \\{a} y\""), "got:\n{printed}");
    }

    #[test]
    fn empty_tag_prints_compact() {
        let (file, diags) = parse_source(Path::new("test.tempo"), "func t(a string) {\n\t<div>\n}\n");
        assert!(diags.is_empty());
        let printed = print_source(&file);
        assert!(printed.contains("<div>"), "got:\n{printed}");
    }
}
