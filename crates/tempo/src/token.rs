use crate::diagnostics::Span;

/// Token kinds for the Tempo surface syntax. The markup kinds (`TagOpen`,
/// `TagClose`, `TagEndOpen`, `AttrMarker`, `TemplateStringPiece`) extend the
/// host set; `<`, `>` and `/` keep their operator meanings outside statement
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    String,
    /// One literal segment of a template literal, ending at an unescaped
    /// `\{` interpolation marker.
    TemplateStringPiece,

    Func,
    Let,
    Return,
    If,
    Else,
    For,
    Use,

    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    Not,
    AndAnd,
    OrOr,
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,

    TagOpen,
    TagClose,
    TagEndOpen,
    AttrMarker,

    Illegal,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "func" => Some(TokenKind::Func),
        "let" => Some(TokenKind::Let),
        "return" => Some(TokenKind::Return),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "for" => Some(TokenKind::For),
        "use" => Some(TokenKind::Use),
        _ => None,
    }
}

impl TokenKind {
    /// Human-readable form used in "expected X" diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number literal",
            TokenKind::String => "string literal",
            TokenKind::TemplateStringPiece => "template literal",
            TokenKind::Func => "'func'",
            TokenKind::Let => "'let'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::Use => "'use'",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Le => "'<='",
            TokenKind::Ge => "'>='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Not => "'!'",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::TagOpen => "'<'",
            TokenKind::TagClose => "'>'",
            TokenKind::TagEndOpen => "'</'",
            TokenKind::AttrMarker => "'@'",
            TokenKind::Illegal => "illegal token",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether a token of this kind can end a statement, which makes a
    /// following newline act as a statement separator.
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::Return
                | TokenKind::RParen
                | TokenKind::RBrace
        )
    }
}
