use crate::diagnostics::{Position, Span};

#[derive(Debug, Clone)]
pub struct SpannedName {
    pub name: String,
    pub span: Span,
}

/// One parsed source file: imports first, then function declarations.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub uses: Vec<UseDecl>,
    pub funcs: Vec<FuncDecl>,
}

/// `use "lib/html"` — the import path is always a plain string literal; the
/// parser turns template recognition off while scanning it.
#[derive(Debug, Clone)]
pub struct UseDecl {
    /// Raw literal text including the quotes.
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: SpannedName,
    pub params: Vec<Param>,
    pub ret: Option<SpannedName>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: SpannedName,
    pub ty: SpannedName,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Let {
        name: SpannedName,
        value: Expr,
        span: Span,
    },
    Assign {
        target: SpannedName,
        value: Expr,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    For {
        cond: Option<Expr>,
        body: Block,
        span: Span,
    },
    Block(Block),
    OpenTag(OpenTagStmt),
    EndTag(EndTagStmt),
    Attribute(AttributeStmt),
    /// Placeholder kept in the tree after a syntax error so later siblings
    /// still parse.
    Bad {
        span: Span,
    },
}

/// `<name ...>` — `body` holds everything between the tag name and the
/// closing `>`, in source order: attributes plus any nested statements. The
/// grammar does not match open/end tag names; that belongs to a later pass.
#[derive(Debug, Clone)]
pub struct OpenTagStmt {
    pub open_pos: Position,
    pub name: SpannedName,
    pub body: Vec<Stmt>,
    pub close_pos: Position,
}

/// `</name>`.
#[derive(Debug, Clone)]
pub struct EndTagStmt {
    pub open_pos: Position,
    pub name: SpannedName,
    pub close_pos: Position,
}

/// `@name` or `@name="value"`; the value, when present, is a plain string
/// literal or a template literal.
#[derive(Debug, Clone)]
pub struct AttributeStmt {
    pub start_pos: Position,
    pub name: SpannedName,
    pub assign_pos: Option<Position>,
    pub value: Option<Expr>,
    pub end_pos: Position,
}

#[derive(Debug, Clone)]
pub enum Literal {
    Number { text: String, span: Span },
    /// Raw literal text including the quotes.
    String { text: String, span: Span },
}

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(SpannedName),
    Literal(Literal),
    Template(TemplateLiteralExpr),
    Unary {
        op: String,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Paren {
        expr: Box<Expr>,
        span: Span,
    },
    FuncLit {
        params: Vec<Param>,
        ret: Option<SpannedName>,
        body: Block,
        span: Span,
    },
    Bad {
        span: Span,
    },
}

/// A string literal with `\{expr}` interpolations, stored as alternating
/// raw segments and expressions. Invariant: `strings.len() == parts.len() + 1`;
/// the first segment keeps the opening quote and the last keeps the closing
/// quote, so concatenation with `\{...}` reproduces the source form.
#[derive(Debug, Clone)]
pub struct TemplateLiteralExpr {
    pub open_pos: Position,
    pub strings: Vec<String>,
    pub parts: Vec<Expr>,
    pub close_pos: Position,
}

pub fn expr_span(expr: &Expr) -> Span {
    match expr {
        Expr::Ident(name) => name.span,
        Expr::Literal(literal) => literal_span(literal),
        Expr::Template(template) => Span {
            start: template.open_pos,
            end: template.close_pos,
        },
        Expr::Unary { span, .. }
        | Expr::Binary { span, .. }
        | Expr::Call { span, .. }
        | Expr::Paren { span, .. }
        | Expr::FuncLit { span, .. }
        | Expr::Bad { span } => *span,
    }
}

pub fn literal_span(literal: &Literal) -> Span {
    match literal {
        Literal::Number { span, .. } | Literal::String { span, .. } => *span,
    }
}

pub fn stmt_span(stmt: &Stmt) -> Span {
    match stmt {
        Stmt::Expr(expr) => expr_span(expr),
        Stmt::Let { span, .. }
        | Stmt::Assign { span, .. }
        | Stmt::Return { span, .. }
        | Stmt::If { span, .. }
        | Stmt::For { span, .. }
        | Stmt::Bad { span } => *span,
        Stmt::Block(block) => block.span,
        Stmt::OpenTag(tag) => Span {
            start: tag.open_pos,
            end: tag.close_pos,
        },
        Stmt::EndTag(tag) => Span {
            start: tag.open_pos,
            end: tag.close_pos,
        },
        Stmt::Attribute(attr) => Span {
            start: attr.start_pos,
            end: attr.end_pos,
        },
    }
}
