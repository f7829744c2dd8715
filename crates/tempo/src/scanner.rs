use crate::diagnostics::{Diagnostic, DiagnosticLabel, DiagnosticSeverity, Position, Span};
use crate::token::{lookup_keyword, Token, TokenKind};

/// Cooperative scanner driven one token at a time by the parser.
///
/// Two pieces of parser state shape what the scanner produces:
/// - `stmt_start`, passed per request: `<` and `>` lex as markup markers
///   only at a statement boundary, otherwise they stay the comparison
///   operators. `</` is never a valid operator sequence, so it lexes as the
///   end-tag marker regardless of position.
/// - the template mode toggle: while enabled, a `\{` inside a string
///   literal splits it into `TemplateStringPiece` segments that the parser
///   interleaves with ordinary expression parsing via `template_continue`.
///
/// Newlines double as statement separators: after a token that can end a
/// statement the scanner synthesizes a `Semicolon` token, so multi-line
/// sources parse without explicit `;`.
pub struct Scanner {
    chars: Vec<char>,
    index: usize,
    line: usize,
    col: usize,
    template_mode: bool,
    last_kind: TokenKind,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Scanner {
    pub fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            index: 0,
            line: 1,
            col: 1,
            template_mode: true,
            last_kind: TokenKind::Semicolon,
            diagnostics: Vec::new(),
        }
    }

    pub fn set_template_mode(&mut self, enabled: bool) {
        self.template_mode = enabled;
    }

    pub(crate) fn emit(&mut self, code: &str, message: &str, span: Span) {
        self.diagnostics.push(Diagnostic {
            code: code.to_string(),
            severity: DiagnosticSeverity::Error,
            message: message.to_string(),
            span,
            labels: Vec::new(),
        });
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn advance(&mut self) {
        self.index += 1;
        self.col += 1;
    }

    fn advance_newline(&mut self) {
        self.index += 1;
        self.line += 1;
        self.col = 1;
    }

    fn span_from(&self, start_line: usize, start_col: usize) -> Span {
        Span {
            start: Position {
                line: start_line,
                column: start_col,
            },
            end: Position {
                line: self.line,
                column: self.col.saturating_sub(1).max(start_col.min(self.col)),
            },
        }
    }

    fn span_here(&self, len: usize) -> Span {
        Span {
            start: Position {
                line: self.line,
                column: self.col,
            },
            end: Position {
                line: self.line,
                column: if len == 0 { self.col } else { self.col + len - 1 },
            },
        }
    }

    fn make(&mut self, kind: TokenKind, text: String, span: Span) -> Token {
        self.last_kind = kind;
        Token { kind, text, span }
    }

    /// Scan the next token. `stmt_start` is true when the parser is at a
    /// legal statement boundary; it is the only thing that turns `<` and
    /// `>` into markup markers.
    pub fn next_token(&mut self, stmt_start: bool) -> Token {
        loop {
            let Some(ch) = self.peek(0) else {
                let span = self.span_here(0);
                return self.make(TokenKind::Eof, String::new(), span);
            };
            match ch {
                '\n' => {
                    if self.last_kind.ends_statement() {
                        let span = self.span_here(1);
                        self.advance_newline();
                        return self.make(TokenKind::Semicolon, "\n".to_string(), span);
                    }
                    self.advance_newline();
                }
                ' ' | '\t' | '\r' => self.advance(),
                '/' if self.peek(1) == Some('/') => {
                    while self.peek(0).is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }

        let start_line = self.line;
        let start_col = self.col;
        let ch = self.peek(0).unwrap_or('\0');

        if is_ident_start(ch) {
            let start = self.index;
            self.advance();
            while self.peek(0).is_some_and(is_ident_continue) {
                self.advance();
            }
            let text: String = self.chars[start..self.index].iter().collect();
            let span = self.span_from(start_line, start_col);
            let kind = lookup_keyword(&text).unwrap_or(TokenKind::Ident);
            return self.make(kind, text, span);
        }

        if ch.is_ascii_digit() {
            let start = self.index;
            self.advance();
            while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
            let text: String = self.chars[start..self.index].iter().collect();
            let span = self.span_from(start_line, start_col);
            return self.make(TokenKind::Number, text, span);
        }

        if ch == '"' {
            return self.scan_string(start_line, start_col);
        }

        let (kind, len) = match ch {
            // `/` cannot begin an operand, so `</` is unambiguous anywhere.
            '<' if self.peek(1) == Some('/') => (TokenKind::TagEndOpen, 2),
            '<' if stmt_start => (TokenKind::TagOpen, 1),
            '>' if stmt_start => (TokenKind::TagClose, 1),
            '<' if self.peek(1) == Some('=') => (TokenKind::Le, 2),
            '<' => (TokenKind::Lt, 1),
            '>' if self.peek(1) == Some('=') => (TokenKind::Ge, 2),
            '>' => (TokenKind::Gt, 1),
            '=' if self.peek(1) == Some('=') => (TokenKind::EqEq, 2),
            '=' => (TokenKind::Assign, 1),
            '!' if self.peek(1) == Some('=') => (TokenKind::NotEq, 2),
            '!' => (TokenKind::Not, 1),
            '&' if self.peek(1) == Some('&') => (TokenKind::AndAnd, 2),
            '|' if self.peek(1) == Some('|') => (TokenKind::OrOr, 2),
            '@' => (TokenKind::AttrMarker, 1),
            '+' => (TokenKind::Plus, 1),
            '-' => (TokenKind::Minus, 1),
            '*' => (TokenKind::Star, 1),
            '/' => (TokenKind::Slash, 1),
            '%' => (TokenKind::Percent, 1),
            ',' => (TokenKind::Comma, 1),
            ';' => (TokenKind::Semicolon, 1),
            '(' => (TokenKind::LParen, 1),
            ')' => (TokenKind::RParen, 1),
            '{' => (TokenKind::LBrace, 1),
            '}' => (TokenKind::RBrace, 1),
            _ => {
                let span = self.span_here(1);
                self.emit("E1000", &format!("unexpected character '{ch}'"), span);
                self.advance();
                return self.make(TokenKind::Illegal, ch.to_string(), span);
            }
        };
        for _ in 0..len {
            self.advance();
        }
        let text: String = self.chars[self.index - len..self.index].iter().collect();
        let span = self.span_from(start_line, start_col);
        self.make(kind, text, span)
    }

    /// Scan a string literal from its opening quote. With template mode on,
    /// an unescaped `\{` cuts the literal short and yields a
    /// `TemplateStringPiece` whose text keeps the opening quote; the parser
    /// then parses the interpolated expression and calls
    /// `template_continue`.
    fn scan_string(&mut self, start_line: usize, start_col: usize) -> Token {
        let start = self.index;
        self.advance();
        self.scan_string_tail(start, start_line, start_col)
    }

    /// Resume literal scanning right after an interpolation's closing `}`.
    /// Returns the next segment: `TemplateStringPiece` if another
    /// interpolation follows, `String` (including the closing quote) for the
    /// final segment.
    pub fn template_continue(&mut self) -> Token {
        let start_line = self.line;
        let start_col = self.col;
        let start = self.index;
        self.scan_string_tail(start, start_line, start_col)
    }

    fn scan_string_tail(&mut self, start: usize, start_line: usize, start_col: usize) -> Token {
        loop {
            match self.peek(0) {
                None | Some('\n') => {
                    let text: String = self.chars[start..self.index].iter().collect();
                    let span = self.span_from(start_line, start_col);
                    self.diagnostics.push(Diagnostic {
                        code: "E1001".to_string(),
                        severity: DiagnosticSeverity::Error,
                        message: "string literal not terminated".to_string(),
                        span,
                        labels: vec![DiagnosticLabel {
                            message: "literal started here".to_string(),
                            span: Span {
                                start: span.start,
                                end: span.start,
                            },
                        }],
                    });
                    // Final segment anyway, so the parser can move on.
                    return self.make(TokenKind::String, text, span);
                }
                Some('\\') => {
                    if self.template_mode && self.peek(1) == Some('{') {
                        let text: String = self.chars[start..self.index].iter().collect();
                        self.advance();
                        self.advance();
                        let span = self.span_from(start_line, start_col);
                        return self.make(TokenKind::TemplateStringPiece, text, span);
                    }
                    self.advance();
                    if self.peek(0).is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('"') => {
                    self.advance();
                    let text: String = self.chars[start..self.index].iter().collect();
                    let span = self.span_from(start_line, start_col);
                    return self.make(TokenKind::String, text, span);
                }
                Some(_) => self.advance(),
            }
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
