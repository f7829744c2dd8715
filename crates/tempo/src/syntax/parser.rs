use std::path::Path;

use crate::diagnostics::{FileDiagnostic, Span};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

use super::ast::*;

/// Parse one source file. Always returns a best-effort AST; callers must
/// inspect the diagnostics list rather than the tree alone.
pub fn parse_source(path: &Path, content: &str) -> (SourceFile, Vec<FileDiagnostic>) {
    let mut parser = Parser::new(content);
    let file = parser.parse_file(path);
    let path_str = path.display().to_string();
    let diagnostics = parser
        .scanner
        .diagnostics
        .drain(..)
        .map(|diagnostic| FileDiagnostic {
            path: path_str.clone(),
            diagnostic,
        })
        .collect();
    (file, diagnostics)
}

struct Parser {
    scanner: Scanner,
    tok: Token,
}

impl Parser {
    fn new(content: &str) -> Self {
        let mut scanner = Scanner::new(content);
        let tok = scanner.next_token(true);
        Self { scanner, tok }
    }

    /// Advance to the next token. `stmt_start` must be true exactly when the
    /// consumed token puts the parse at a statement boundary: after `;`,
    /// `{`, `}`, a tag close, a tag or attribute name, or an attribute
    /// value. This flag is what keeps `<` and `>` unambiguous.
    fn bump(&mut self, stmt_start: bool) {
        self.tok = self.scanner.next_token(stmt_start);
    }

    fn emit_diag(&mut self, code: &str, message: &str, span: Span) {
        self.scanner.emit(code, message, span);
    }

    fn expect_ident(&mut self, stmt_after: bool, message: &str) -> SpannedName {
        if self.tok.kind == TokenKind::Ident {
            let name = SpannedName {
                name: self.tok.text.clone(),
                span: self.tok.span,
            };
            self.bump(stmt_after);
            return name;
        }
        let span = self.tok.span;
        self.emit_diag("E1502", message, span);
        SpannedName {
            name: "_".to_string(),
            span,
        }
    }

    /// Consume a statement separator. A `}`, a tag close, an end-tag marker
    /// or end of file terminates the statement implicitly.
    fn expect_semi(&mut self) {
        match self.tok.kind {
            TokenKind::Semicolon => self.bump(true),
            TokenKind::RBrace
            | TokenKind::TagClose
            | TokenKind::TagEndOpen
            | TokenKind::Eof => {}
            _ => {
                let span = self.tok.span;
                self.emit_diag(
                    "E1515",
                    &format!("expected ';', found {}", self.tok.kind.describe()),
                    span,
                );
                self.recover_to_stmt();
            }
        }
    }

    fn recover_to_stmt(&mut self) {
        while !matches!(
            self.tok.kind,
            TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::TagClose
                | TokenKind::TagEndOpen
                | TokenKind::Eof
        ) {
            self.bump(true);
        }
        if self.tok.kind == TokenKind::Semicolon {
            self.bump(true);
        }
    }

    fn recover_to_decl(&mut self) {
        while !matches!(
            self.tok.kind,
            TokenKind::Func | TokenKind::Use | TokenKind::Eof
        ) {
            self.bump(true);
        }
    }

    fn parse_file(&mut self, path: &Path) -> SourceFile {
        let mut uses = Vec::new();
        let mut funcs = Vec::new();
        loop {
            match self.tok.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => self.bump(true),
                TokenKind::Use => {
                    if let Some(use_decl) = self.parse_use_decl() {
                        uses.push(use_decl);
                    }
                }
                TokenKind::Func => funcs.push(self.parse_func_decl()),
                _ => {
                    let span = self.tok.span;
                    self.emit_diag(
                        "E1505",
                        &format!("expected declaration, found {}", self.tok.kind.describe()),
                        span,
                    );
                    self.recover_to_decl();
                }
            }
        }
        SourceFile {
            path: path.display().to_string(),
            uses,
            funcs,
        }
    }

    /// `use "lib/html"`. Import paths are plain strings: template
    /// recognition is switched off so literal braces in a path never start
    /// an interpolation.
    fn parse_use_decl(&mut self) -> Option<UseDecl> {
        let start = self.tok.span;
        self.scanner.set_template_mode(false);
        self.bump(false);
        let decl = if self.tok.kind == TokenKind::String {
            let span = Span::merge(start, self.tok.span);
            let path = self.tok.text.clone();
            self.scanner.set_template_mode(true);
            self.bump(true);
            Some(UseDecl { path, span })
        } else {
            self.scanner.set_template_mode(true);
            let span = self.tok.span;
            self.emit_diag("E1516", "expected import path string after 'use'", span);
            None
        };
        self.expect_semi();
        decl
    }

    fn parse_func_decl(&mut self) -> FuncDecl {
        let start = self.tok.span;
        self.bump(false);
        let name = self.expect_ident(false, "expected function name after 'func'");
        let (params, ret, body) = self.parse_func_rest();
        let span = Span::merge(start, body.span);
        FuncDecl {
            name,
            params,
            ret,
            body,
            span,
        }
    }

    /// Parameter list, optional return type and body; shared by function
    /// declarations and function literals.
    fn parse_func_rest(&mut self) -> (Vec<Param>, Option<SpannedName>, Block) {
        let mut params = Vec::new();
        if self.tok.kind == TokenKind::LParen {
            self.bump(false);
            while self.tok.kind == TokenKind::Ident {
                let name = SpannedName {
                    name: self.tok.text.clone(),
                    span: self.tok.span,
                };
                self.bump(false);
                let ty = self.expect_ident(false, "expected parameter type");
                let span = Span::merge(name.span, ty.span);
                params.push(Param { name, ty, span });
                if self.tok.kind == TokenKind::Comma {
                    self.bump(false);
                    continue;
                }
                break;
            }
            if self.tok.kind == TokenKind::RParen {
                self.bump(false);
            } else {
                let span = self.tok.span;
                self.emit_diag("E1517", "expected ')' to close parameter list", span);
            }
        } else {
            let span = self.tok.span;
            self.emit_diag("E1521", "expected '(' to start parameter list", span);
        }
        let ret = if self.tok.kind == TokenKind::Ident {
            let name = SpannedName {
                name: self.tok.text.clone(),
                span: self.tok.span,
            };
            self.bump(false);
            Some(name)
        } else {
            None
        };
        let body = self.parse_block();
        (params, ret, body)
    }

    fn parse_block(&mut self) -> Block {
        if self.tok.kind != TokenKind::LBrace {
            let span = self.tok.span;
            self.emit_diag("E1518", "expected '{' to start block", span);
            return Block {
                stmts: Vec::new(),
                span,
            };
        }
        let open = self.tok.span;
        self.bump(true);
        let stmts = self.parse_stmt_list();
        let close = if self.tok.kind == TokenKind::RBrace {
            let span = self.tok.span;
            self.bump(true);
            span
        } else {
            let span = self.tok.span;
            self.emit_diag("E1519", "expected '}' to close block", span);
            span
        };
        Block {
            stmts,
            span: Span::merge(open, close),
        }
    }

    /// Statement list shared by blocks and tag bodies; stops at `}`, a tag
    /// close or end of file. Stray separators are skipped without producing
    /// nodes.
    fn parse_stmt_list(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !matches!(
            self.tok.kind,
            TokenKind::RBrace | TokenKind::TagClose | TokenKind::Eof
        ) {
            if self.tok.kind == TokenKind::Semicolon {
                self.bump(true);
                continue;
            }
            let before_pos = self.tok.span.start;
            let before_kind = self.tok.kind;
            stmts.push(self.parse_stmt());
            // Guard: force progress if nothing consumed this iteration.
            if self.tok.span.start == before_pos && self.tok.kind == before_kind {
                self.bump(true);
            }
        }
        stmts
    }

    fn parse_stmt(&mut self) -> Stmt {
        match self.tok.kind {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::LBrace => Stmt::Block(self.parse_block()),
            TokenKind::TagOpen | TokenKind::TagEndOpen => self.parse_tag_stmt(),
            TokenKind::AttrMarker => self.parse_attribute_stmt(),
            TokenKind::Illegal => {
                // Scanner already reported it; keep a placeholder node so
                // siblings stay addressable.
                let span = self.tok.span;
                self.bump(true);
                Stmt::Bad { span }
            }
            _ => self.parse_expr_or_assign_stmt(),
        }
    }

    fn parse_let_stmt(&mut self) -> Stmt {
        let start = self.tok.span;
        self.bump(false);
        let name = self.expect_ident(false, "expected name after 'let'");
        if self.tok.kind == TokenKind::Assign {
            self.bump(false);
        } else {
            let span = self.tok.span;
            self.emit_diag("E1520", "expected '=' in let statement", span);
        }
        let value = self.parse_expr();
        let span = Span::merge(start, expr_span(&value));
        self.expect_semi();
        Stmt::Let { name, value, span }
    }

    fn parse_return_stmt(&mut self) -> Stmt {
        let start = self.tok.span;
        self.bump(false);
        let value = if matches!(
            self.tok.kind,
            TokenKind::Semicolon
                | TokenKind::RBrace
                | TokenKind::TagClose
                | TokenKind::TagEndOpen
                | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expr())
        };
        let span = match &value {
            Some(expr) => Span::merge(start, expr_span(expr)),
            None => start,
        };
        self.expect_semi();
        Stmt::Return { value, span }
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        let start = self.tok.span;
        self.bump(false);
        let cond = self.parse_expr();
        let then_block = self.parse_block();
        let mut end = then_block.span;
        let else_branch = if self.tok.kind == TokenKind::Else {
            self.bump(false);
            let branch = if self.tok.kind == TokenKind::If {
                self.parse_if_stmt()
            } else {
                Stmt::Block(self.parse_block())
            };
            end = stmt_span(&branch);
            Some(Box::new(branch))
        } else {
            None
        };
        Stmt::If {
            cond,
            then_block,
            else_branch,
            span: Span::merge(start, end),
        }
    }

    fn parse_for_stmt(&mut self) -> Stmt {
        let start = self.tok.span;
        self.bump(false);
        let cond = if self.tok.kind == TokenKind::LBrace {
            None
        } else {
            Some(self.parse_expr())
        };
        let body = self.parse_block();
        let span = Span::merge(start, body.span);
        Stmt::For { cond, body, span }
    }

    /// `<name ...>` or `</name>`. The body of an open tag is an ordinary
    /// statement list terminated by `>`; a missing `>` yields one "tag not
    /// closed" diagnostic and a partial node.
    fn parse_tag_stmt(&mut self) -> Stmt {
        let open_pos = self.tok.span.start;
        let closing = self.tok.kind == TokenKind::TagEndOpen;
        self.bump(false);
        let name = self.expect_ident(true, "expected tag name");

        if !matches!(self.tok.kind, TokenKind::AttrMarker | TokenKind::TagClose) {
            self.expect_semi();
        }

        if closing {
            let close_pos = if self.tok.kind == TokenKind::TagClose {
                let pos = self.tok.span.start;
                self.bump(true);
                pos
            } else {
                let span = self.tok.span;
                self.emit_diag("E1509", "expected '>' to close end tag", span);
                name.span.end
            };
            return Stmt::EndTag(EndTagStmt {
                open_pos,
                name,
                close_pos,
            });
        }

        let body = self.parse_stmt_list();
        let close_pos = if self.tok.kind == TokenKind::TagClose {
            let pos = self.tok.span.start;
            self.bump(true);
            pos
        } else {
            let span = Span {
                start: open_pos,
                end: name.span.end,
            };
            self.emit_diag("E1510", &format!("tag <{} not closed", name.name), span);
            name.span.end
        };
        Stmt::OpenTag(OpenTagStmt {
            open_pos,
            name,
            body,
            close_pos,
        })
    }

    /// `@name` or `@name="value"` where the value is a plain string or a
    /// template literal. A separator is inferred when the next token is
    /// another attribute or the closing `>`.
    fn parse_attribute_stmt(&mut self) -> Stmt {
        let start_pos = self.tok.span.start;
        self.bump(false);
        let name = self.expect_ident(true, "expected attribute name after '@'");

        if self.tok.kind == TokenKind::Assign {
            let assign_pos = self.tok.span.start;
            self.bump(false);
            let value = match self.tok.kind {
                TokenKind::String => {
                    let literal = Expr::Literal(Literal::String {
                        text: self.tok.text.clone(),
                        span: self.tok.span,
                    });
                    self.bump(true);
                    Some(literal)
                }
                TokenKind::TemplateStringPiece => {
                    let template = self.parse_template_literal();
                    self.bump(true);
                    Some(Expr::Template(template))
                }
                _ => {
                    let span = self.tok.span;
                    self.emit_diag(
                        "E1512",
                        "expected string literal as attribute value",
                        span,
                    );
                    None
                }
            };
            let end_pos = match &value {
                Some(expr) => expr_span(expr).end,
                None => assign_pos,
            };
            if !matches!(self.tok.kind, TokenKind::AttrMarker | TokenKind::TagClose) {
                self.expect_semi();
            }
            return Stmt::Attribute(AttributeStmt {
                start_pos,
                name,
                assign_pos: Some(assign_pos),
                value,
                end_pos,
            });
        }

        if !matches!(self.tok.kind, TokenKind::AttrMarker | TokenKind::TagClose) {
            self.expect_semi();
        }
        let end_pos = name.span.end;
        Stmt::Attribute(AttributeStmt {
            start_pos,
            name,
            assign_pos: None,
            value: None,
            end_pos,
        })
    }

    fn parse_expr_or_assign_stmt(&mut self) -> Stmt {
        let expr = self.parse_expr();
        if let Expr::Ident(target) = &expr {
            if self.tok.kind == TokenKind::Assign {
                let target = target.clone();
                self.bump(false);
                let value = self.parse_expr();
                let span = Span::merge(target.span, expr_span(&value));
                self.expect_semi();
                return Stmt::Assign {
                    target,
                    value,
                    span,
                };
            }
        }
        self.expect_semi();
        Stmt::Expr(expr)
    }

    fn parse_expr(&mut self) -> Expr {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut left = self.parse_unary();
        loop {
            let prec = binary_prec(self.tok.kind);
            if prec == 0 || prec < min_prec {
                break;
            }
            let op = self.tok.text.clone();
            self.bump(false);
            let right = self.parse_binary(prec + 1);
            let span = Span::merge(expr_span(&left), expr_span(&right));
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        if matches!(self.tok.kind, TokenKind::Minus | TokenKind::Not) {
            let op = self.tok.text.clone();
            let start = self.tok.span;
            self.bump(false);
            let expr = self.parse_unary();
            let span = Span::merge(start, expr_span(&expr));
            return Expr::Unary {
                op,
                expr: Box::new(expr),
                span,
            };
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        while self.tok.kind == TokenKind::LParen {
            self.bump(false);
            let mut args = Vec::new();
            if self.tok.kind != TokenKind::RParen {
                loop {
                    args.push(self.parse_expr());
                    if self.tok.kind == TokenKind::Comma {
                        self.bump(false);
                        continue;
                    }
                    break;
                }
            }
            let end = if self.tok.kind == TokenKind::RParen {
                let span = self.tok.span;
                self.bump(false);
                span
            } else {
                let span = self.tok.span;
                self.emit_diag("E1517", "expected ')' to close argument list", span);
                span
            };
            let span = Span::merge(expr_span(&expr), end);
            expr = Expr::Call {
                func: Box::new(expr),
                args,
                span,
            };
        }
        expr
    }

    fn parse_primary(&mut self) -> Expr {
        match self.tok.kind {
            TokenKind::Ident => {
                let name = SpannedName {
                    name: self.tok.text.clone(),
                    span: self.tok.span,
                };
                self.bump(false);
                Expr::Ident(name)
            }
            TokenKind::Number => {
                let literal = Literal::Number {
                    text: self.tok.text.clone(),
                    span: self.tok.span,
                };
                self.bump(false);
                Expr::Literal(literal)
            }
            TokenKind::String => {
                let literal = Literal::String {
                    text: self.tok.text.clone(),
                    span: self.tok.span,
                };
                self.bump(false);
                Expr::Literal(literal)
            }
            TokenKind::TemplateStringPiece => {
                let template = self.parse_template_literal();
                self.bump(false);
                Expr::Template(template)
            }
            TokenKind::LParen => {
                let start = self.tok.span;
                self.bump(false);
                let inner = self.parse_expr();
                let end = if self.tok.kind == TokenKind::RParen {
                    let span = self.tok.span;
                    self.bump(false);
                    span
                } else {
                    let span = self.tok.span;
                    self.emit_diag("E1517", "expected ')'", span);
                    span
                };
                Expr::Paren {
                    expr: Box::new(inner),
                    span: Span::merge(start, end),
                }
            }
            TokenKind::Func => {
                let start = self.tok.span;
                self.bump(false);
                let (params, ret, body) = self.parse_func_rest();
                let span = Span::merge(start, body.span);
                Expr::FuncLit {
                    params,
                    ret,
                    body,
                    span,
                }
            }
            _ => {
                let span = self.tok.span;
                self.emit_diag(
                    "E1514",
                    &format!("expected expression, found {}", self.tok.kind.describe()),
                    span,
                );
                // Stay put at safe boundaries so the caller can resync.
                if !matches!(
                    self.tok.kind,
                    TokenKind::Semicolon
                        | TokenKind::RBrace
                        | TokenKind::RParen
                        | TokenKind::TagClose
                        | TokenKind::TagEndOpen
                        | TokenKind::Eof
                ) {
                    self.bump(false);
                }
                Expr::Bad { span }
            }
        }
    }

    /// Cooperative template-literal loop: the current token is a
    /// `TemplateStringPiece`; alternate full expression parses with
    /// `template_continue` until the scanner signals the final segment.
    /// Leaves the final `String` piece as the current token.
    fn parse_template_literal(&mut self) -> TemplateLiteralExpr {
        let open_pos = self.tok.span.start;
        let mut strings = vec![self.tok.text.clone()];
        let mut parts = Vec::new();
        let close_pos;
        loop {
            self.bump(false);
            parts.push(self.parse_expr());
            if self.tok.kind != TokenKind::RBrace {
                let span = self.tok.span;
                self.emit_diag(
                    "E1513",
                    "expected '}' to close template interpolation",
                    span,
                );
            }
            // Resume literal scanning after the interpolation; on a missing
            // '}' this doubles as resynchronization to the next segment
            // boundary or string terminator.
            self.tok = self.scanner.template_continue();
            strings.push(self.tok.text.clone());
            if self.tok.kind == TokenKind::String {
                close_pos = self.tok.span.end;
                break;
            }
        }
        TemplateLiteralExpr {
            open_pos,
            strings,
            parts,
            close_pos,
        }
    }
}

fn binary_prec(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::OrOr => 1,
        TokenKind::AndAnd => 2,
        TokenKind::EqEq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::Le
        | TokenKind::Ge => 3,
        TokenKind::Plus | TokenKind::Minus => 4,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 5,
        _ => 0,
    }
}
