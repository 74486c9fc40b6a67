// Copyright (c) 2016-2020 Fabian Schuiki

//! The abstract syntax tree of the Pascal subset.
//!
//! Subtrees that failed to parse are represented by `Error` variants carrying
//! the marker left by error recovery. Use `error_count` to find out whether a
//! tree is fit for further processing.

use crate::ll::ErrorMarker;
use pasc_common::source::Span;
use pasc_common::util::HasSpan;

/// An identifier as written in the source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    /// Compare against a name, ignoring case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl HasSpan for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

/// Any node of the tree. This is the value type the grammar's reducers
/// produce.
#[derive(Clone, PartialEq, Debug)]
pub enum Node {
    Program(Program),
    Block(Block),
    Decl(Decl),
    Param(Param),
    Type(Type),
    Stmt(Stmt),
    Expr(Expr),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Program {
    pub span: Span,
    pub name: Ident,
    pub block: Block,
}

impl Program {
    /// The number of error markers in the tree.
    pub fn error_count(&self) -> usize {
        self.block.error_count()
    }
}

/// Declarations followed by a compound statement.
#[derive(Clone, PartialEq, Debug)]
pub struct Block {
    pub decls: Vec<Decl>,
    pub body: Vec<Stmt>,
}

impl Block {
    pub fn error_count(&self) -> usize {
        self.decls.iter().map(Decl::error_count).sum::<usize>()
            + self.body.iter().map(Stmt::error_count).sum::<usize>()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Decl {
    Const { name: Ident, value: Expr },
    Type { name: Ident, ty: Type },
    Var { names: Vec<Ident>, ty: Type },
    Subprogram(Subprogram),
    Error(ErrorMarker),
}

impl Decl {
    pub fn error_count(&self) -> usize {
        match self {
            Decl::Const { value, .. } => value.error_count(),
            Decl::Type { ty, .. } => ty.error_count(),
            Decl::Var { ty, .. } => ty.error_count(),
            Decl::Subprogram(s) => s.error_count(),
            Decl::Error(_) => 1,
        }
    }
}

/// A procedure, or a function if it has a return type.
#[derive(Clone, PartialEq, Debug)]
pub struct Subprogram {
    pub span: Span,
    pub name: Ident,
    pub params: Vec<Param>,
    pub ret: Option<Type>,
    pub block: Block,
}

impl Subprogram {
    pub fn is_function(&self) -> bool {
        self.ret.is_some()
    }

    pub fn error_count(&self) -> usize {
        self.params.iter().map(|p| p.ty.error_count()).sum::<usize>()
            + self.ret.as_ref().map_or(0, Type::error_count)
            + self.block.error_count()
    }
}

/// A group of parameters sharing a type, such as `var a, b: integer`.
#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub by_ref: bool,
    pub names: Vec<Ident>,
    pub ty: Type,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Builtin {
    Integer,
    Real,
    Boolean,
    Char,
    String,
}

impl Builtin {
    pub const NAMES: [&'static str; 5] = ["integer", "real", "boolean", "char", "string"];

    pub fn from_name(name: &str) -> Option<Builtin> {
        Some(match name.to_ascii_lowercase().as_str() {
            "integer" => Builtin::Integer,
            "real" => Builtin::Real,
            "boolean" => Builtin::Boolean,
            "char" => Builtin::Char,
            "string" => Builtin::String,
            _ => return None,
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Type {
    Builtin(Builtin, Span),
    /// A reference to a type declared in the program.
    Named(Ident),
    Array {
        span: Span,
        lo: Expr,
        hi: Expr,
        elem: Box<Type>,
    },
    Error(ErrorMarker),
}

impl Type {
    pub fn error_count(&self) -> usize {
        match self {
            Type::Array { lo, hi, elem, .. } => {
                lo.error_count() + hi.error_count() + elem.error_count()
            }
            Type::Error(_) => 1,
            _ => 0,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Stmt {
    Assign {
        span: Span,
        target: Expr,
        value: Expr,
    },
    Call {
        span: Span,
        name: Ident,
        args: Vec<Expr>,
    },
    Compound(Vec<Stmt>),
    If {
        span: Span,
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        span: Span,
        cond: Expr,
        body: Box<Stmt>,
    },
    Repeat {
        span: Span,
        body: Vec<Stmt>,
        cond: Expr,
    },
    For {
        span: Span,
        var: Ident,
        from: Expr,
        downto: bool,
        to: Expr,
        body: Box<Stmt>,
    },
    Empty,
    Error(ErrorMarker),
}

impl Stmt {
    pub fn is_error(&self) -> bool {
        match self {
            Stmt::Error(_) => true,
            _ => false,
        }
    }

    pub fn error_count(&self) -> usize {
        match self {
            Stmt::Assign { target, value, .. } => target.error_count() + value.error_count(),
            Stmt::Call { args, .. } => args.iter().map(Expr::error_count).sum(),
            Stmt::Compound(stmts) => stmts.iter().map(Stmt::error_count).sum(),
            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                cond.error_count()
                    + then.error_count()
                    + otherwise.as_ref().map_or(0, |s| s.error_count())
            }
            Stmt::While { cond, body, .. } => cond.error_count() + body.error_count(),
            Stmt::Repeat { body, cond, .. } => {
                body.iter().map(Stmt::error_count).sum::<usize>() + cond.error_count()
            }
            Stmt::For { from, to, body, .. } => {
                from.error_count() + to.error_count() + body.error_count()
            }
            Stmt::Empty => 0,
            Stmt::Error(_) => 1,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LitKind {
    Int,
    Real,
    Str,
}

/// A literal. The text is kept as written; string literals carry their
/// unquoted content.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Literal {
    pub kind: LitKind,
    pub text: String,
    pub span: Span,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    Add,
    Sub,
    Or,
    Mul,
    Div,
    IntDiv,
    Mod,
    And,
}

impl BinaryOp {
    pub fn from_text(text: &str) -> Option<BinaryOp> {
        Some(match text {
            "=" => BinaryOp::Eq,
            "<>" => BinaryOp::Neq,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Leq,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Geq,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "or" => BinaryOp::Or,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "div" => BinaryOp::IntDiv,
            "mod" => BinaryOp::Mod,
            "and" => BinaryOp::And,
            _ => return None,
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Expr {
    Literal(Literal),
    Var(Ident),
    Index {
        span: Span,
        base: Ident,
        indices: Vec<Expr>,
    },
    Call {
        span: Span,
        name: Ident,
        args: Vec<Expr>,
    },
    Unary {
        span: Span,
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Binary {
        span: Span,
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Error(ErrorMarker),
}

impl Expr {
    pub fn is_error(&self) -> bool {
        match self {
            Expr::Error(_) => true,
            _ => false,
        }
    }

    pub fn error_count(&self) -> usize {
        match self {
            Expr::Index { indices: args, .. } | Expr::Call { args, .. } => {
                args.iter().map(Expr::error_count).sum()
            }
            Expr::Unary { arg, .. } => arg.error_count(),
            Expr::Binary { lhs, rhs, .. } => lhs.error_count() + rhs.error_count(),
            Expr::Error(_) => 1,
            _ => 0,
        }
    }
}

impl HasSpan for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Literal(l) => l.span,
            Expr::Var(i) => i.span,
            Expr::Index { span, .. }
            | Expr::Call { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. } => *span,
            Expr::Error(m) => m.span,
        }
    }
}
