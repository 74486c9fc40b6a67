// Copyright (c) 2016-2020 Fabian Schuiki

//! The rules of the Pascal subset, and the reducers that build the tree.

use crate::ll::{cat, kw, lit, nt, Args, Grammar, GrammarError, ReduceError, Rule, Value};
use crate::pascal::ast::*;
use crate::token::{Category, Kw, Token};
use pasc_common::source::Span;
use pasc_common::util::HasSpan;

type V = Value<Node>;
type R = Result<V, ReduceError>;

/// The nonterminals at which an identifier naming a builtin type counts as
/// that type's literal.
pub const TYPE_POSITIONS: [&str; 1] = ["Type"];

/// Assemble the grammar of the Pascal subset.
pub fn grammar() -> Result<Grammar<Node>, GrammarError> {
    let mut rules = vec![
        Rule::new(
            "Program",
            vec![kw(Kw::Program), cat(Category::Ident), lit(";"), nt("Block"), lit(".")],
        )
        .collect(&[true, true, false, true, true])
        .reduce(program),
        Rule::new("Block", vec![nt("Decls"), nt("Compound")]).reduce(block),
        // Declarations
        Rule::new("Decls", vec![nt("Decl"), nt("Decls")]).reduce(concat),
        Rule::epsilon("Decls"),
        Rule::new("Decl", vec![kw(Kw::Const), nt("ConstDef"), nt("ConstDefs")])
            .collect(&[false, true, true])
            .reduce(cons),
        Rule::new("Decl", vec![kw(Kw::Type), nt("TypeDef"), nt("TypeDefs")])
            .collect(&[false, true, true])
            .reduce(cons),
        Rule::new("Decl", vec![kw(Kw::Var), nt("VarDecl"), nt("VarDecls")])
            .collect(&[false, true, true])
            .reduce(cons),
        Rule::new("Decl", vec![nt("ProcDecl")]).reduce(pass),
        Rule::new("Decl", vec![nt("FuncDecl")]).reduce(pass),
        Rule::new("ConstDefs", vec![nt("ConstDef"), nt("ConstDefs")]).reduce(cons),
        Rule::epsilon("ConstDefs"),
        Rule::new(
            "ConstDef",
            vec![cat(Category::Ident), lit("="), nt("Expr"), lit(";")],
        )
        .collect(&[true, false, true, false])
        .reduce(|v| {
            let mut args = Args::new(v);
            let name = ident(args.value()?)?;
            let value = expr(args.value()?)?;
            Ok(Value::Node(Node::Decl(Decl::Const { name, value })))
        }),
        Rule::new("TypeDefs", vec![nt("TypeDef"), nt("TypeDefs")]).reduce(cons),
        Rule::epsilon("TypeDefs"),
        Rule::new(
            "TypeDef",
            vec![cat(Category::Ident), lit("="), nt("Type"), lit(";")],
        )
        .collect(&[true, false, true, false])
        .reduce(|v| {
            let mut args = Args::new(v);
            let name = ident(args.value()?)?;
            let ty = ty(args.value()?)?;
            Ok(Value::Node(Node::Decl(Decl::Type { name, ty })))
        }),
        Rule::new("VarDecls", vec![nt("VarDecl"), nt("VarDecls")]).reduce(cons),
        Rule::epsilon("VarDecls"),
        Rule::new(
            "VarDecl",
            vec![nt("IdentList"), lit(":"), nt("Type"), lit(";")],
        )
        .collect(&[true, false, true, false])
        .reduce(|v| {
            let mut args = Args::new(v);
            let names = list(args.value()?, ident)?;
            let ty = ty(args.value()?)?;
            Ok(Value::Node(Node::Decl(Decl::Var { names, ty })))
        }),
        Rule::new("IdentList", vec![cat(Category::Ident), nt("IdentTail")]).reduce(cons),
        Rule::new(
            "IdentTail",
            vec![lit(","), cat(Category::Ident), nt("IdentTail")],
        )
        .collect(&[false, true, true])
        .reduce(cons),
        Rule::epsilon("IdentTail"),
        // Subprograms
        Rule::new(
            "ProcDecl",
            vec![
                kw(Kw::Procedure),
                cat(Category::Ident),
                nt("Params"),
                lit(";"),
                nt("Block"),
                lit(";"),
            ],
        )
        .collect(&[true, true, true, false, true, true])
        .reduce(|v| subprogram(v, false)),
        Rule::new(
            "FuncDecl",
            vec![
                kw(Kw::Function),
                cat(Category::Ident),
                nt("Params"),
                lit(":"),
                nt("Type"),
                lit(";"),
                nt("Block"),
                lit(";"),
            ],
        )
        .collect(&[true, true, true, false, true, false, true, true])
        .reduce(|v| subprogram(v, true)),
        Rule::new(
            "Params",
            vec![lit("("), nt("ParamGroup"), nt("ParamGroups"), lit(")")],
        )
        .collect(&[false, true, true, false])
        .reduce(cons),
        Rule::epsilon("Params"),
        Rule::new(
            "ParamGroups",
            vec![lit(";"), nt("ParamGroup"), nt("ParamGroups")],
        )
        .collect(&[false, true, true])
        .reduce(cons),
        Rule::epsilon("ParamGroups"),
        Rule::new(
            "ParamGroup",
            vec![nt("VarOpt"), nt("IdentList"), lit(":"), nt("Type")],
        )
        .collect(&[true, true, false, true])
        .reduce(|v| {
            let mut args = Args::new(v);
            let by_ref = !args.value()?.is_unit();
            let names = list(args.value()?, ident)?;
            let ty = ty(args.value()?)?;
            Ok(Value::Node(Node::Param(Param { by_ref, names, ty })))
        }),
        Rule::new("VarOpt", vec![kw(Kw::Var)]).reduce(pass),
        Rule::epsilon("VarOpt"),
        // Types
        Rule::new("Type", vec![cat(Category::Ident)]).reduce(|v| {
            Ok(Value::Node(Node::Type(Type::Named(ident(
                Args::new(v).value()?,
            )?))))
        }),
        Rule::new(
            "Type",
            vec![
                kw(Kw::Array),
                lit("["),
                nt("Expr"),
                lit(".."),
                nt("Expr"),
                lit("]"),
                kw(Kw::Of),
                nt("Type"),
            ],
        )
        .collect(&[true, false, true, false, true, true, false, true])
        .reduce(|v| {
            let mut args = Args::new(v);
            let first = args.token()?;
            let lo = expr(args.value()?)?;
            let hi = expr(args.value()?)?;
            let last = args.token()?;
            let elem = ty(args.value()?)?;
            Ok(Value::Node(Node::Type(Type::Array {
                span: Span::union(first.span, last.span),
                lo,
                hi,
                elem: Box::new(elem),
            })))
        }),
        // Statements
        Rule::new("Compound", vec![kw(Kw::Begin), nt("StmtList"), kw(Kw::End)])
            .collect(&[false, true, false])
            .reduce(pass),
        Rule::new("StmtList", vec![nt("Stmt"), nt("StmtTail")]).reduce(cons),
        Rule::new("StmtTail", vec![lit(";"), nt("Stmt"), nt("StmtTail")])
            .collect(&[false, true, true])
            .reduce(cons),
        Rule::epsilon("StmtTail"),
        Rule::new("Stmt", vec![cat(Category::Ident), nt("IdentStmt")]).reduce(ident_stmt),
        Rule::new("Stmt", vec![nt("Compound")]).reduce(|v| {
            let body = list(Args::new(v).value()?, stmt)?;
            Ok(Value::Node(Node::Stmt(Stmt::Compound(body))))
        }),
        Rule::new(
            "Stmt",
            vec![kw(Kw::If), nt("Expr"), kw(Kw::Then), nt("Stmt"), nt("ElsePart")],
        )
        .collect(&[true, true, false, true, true])
        .reduce(|v| {
            let mut args = Args::new(v);
            let first = args.token()?;
            let cond = expr(args.value()?)?;
            let then = stmt(args.value()?)?;
            let otherwise = match args.value()? {
                Value::Unit => None,
                v => Some(Box::new(stmt(v)?)),
            };
            Ok(Value::Node(Node::Stmt(Stmt::If {
                span: Span::union(first.span, cond.span()),
                cond,
                then: Box::new(then),
                otherwise,
            })))
        }),
        // The empty alternative comes first, such that `else` binds to the
        // innermost `if`.
        Rule::epsilon("ElsePart"),
        Rule::new("ElsePart", vec![kw(Kw::Else), nt("Stmt")])
            .collect(&[false, true])
            .reduce(pass),
        Rule::new(
            "Stmt",
            vec![kw(Kw::While), nt("Expr"), kw(Kw::Do), nt("Stmt")],
        )
        .collect(&[true, true, false, true])
        .reduce(|v| {
            let mut args = Args::new(v);
            let first = args.token()?;
            let cond = expr(args.value()?)?;
            let body = stmt(args.value()?)?;
            Ok(Value::Node(Node::Stmt(Stmt::While {
                span: Span::union(first.span, cond.span()),
                cond,
                body: Box::new(body),
            })))
        }),
        Rule::new(
            "Stmt",
            vec![kw(Kw::Repeat), nt("StmtList"), kw(Kw::Until), nt("Expr")],
        )
        .collect(&[true, true, false, true])
        .reduce(|v| {
            let mut args = Args::new(v);
            let first = args.token()?;
            let body = list(args.value()?, stmt)?;
            let cond = expr(args.value()?)?;
            Ok(Value::Node(Node::Stmt(Stmt::Repeat {
                span: Span::union(first.span, cond.span()),
                body,
                cond,
            })))
        }),
        Rule::new(
            "Stmt",
            vec![
                kw(Kw::For),
                cat(Category::Ident),
                lit(":="),
                nt("Expr"),
                nt("Direction"),
                nt("Expr"),
                kw(Kw::Do),
                nt("Stmt"),
            ],
        )
        .collect(&[true, true, false, true, true, true, false, true])
        .reduce(|v| {
            let mut args = Args::new(v);
            let first = args.token()?;
            let var = ident(args.value()?)?;
            let from = expr(args.value()?)?;
            let downto = args.token()?.keyword == Some(Kw::Downto);
            let to = expr(args.value()?)?;
            let body = stmt(args.value()?)?;
            Ok(Value::Node(Node::Stmt(Stmt::For {
                span: Span::union(first.span, to.span()),
                var,
                from,
                downto,
                to,
                body: Box::new(body),
            })))
        }),
        Rule::new("Direction", vec![kw(Kw::To)]).reduce(pass),
        Rule::new("Direction", vec![kw(Kw::Downto)]).reduce(pass),
        Rule::epsilon("Stmt").reduce(|_| Ok(Value::Node(Node::Stmt(Stmt::Empty)))),
        Rule::new("IdentStmt", vec![lit(":="), nt("Expr")]).reduce(suffix),
        Rule::new(
            "IdentStmt",
            vec![lit("["), nt("ExprList"), lit("]"), lit(":="), nt("Expr")],
        )
        .collect(&[true, true, false, false, true])
        .reduce(suffix),
        Rule::new("IdentStmt", vec![lit("("), nt("ExprList"), lit(")")]).reduce(suffix),
        Rule::epsilon("IdentStmt"),
        // Expressions
        Rule::new("Expr", vec![nt("SimpleExpr"), nt("RelTail")]).reduce(fold),
        Rule::new("RelTail", vec![nt("RelOp"), nt("SimpleExpr")]).reduce(suffix),
        Rule::epsilon("RelTail"),
        Rule::new("SimpleExpr", vec![nt("Term"), nt("AddTail")]).reduce(fold),
        Rule::new("AddTail", vec![nt("AddOp"), nt("Term"), nt("AddTail")]).reduce(op_cons),
        Rule::epsilon("AddTail"),
        Rule::new("Term", vec![nt("Factor"), nt("MulTail")]).reduce(fold),
        Rule::new("MulTail", vec![nt("MulOp"), nt("Factor"), nt("MulTail")]).reduce(op_cons),
        Rule::epsilon("MulTail"),
        Rule::new("Factor", vec![cat(Category::IntLit)]).reduce(|v| literal(v, LitKind::Int)),
        Rule::new("Factor", vec![cat(Category::RealLit)]).reduce(|v| literal(v, LitKind::Real)),
        Rule::new("Factor", vec![cat(Category::StrLit)]).reduce(|v| literal(v, LitKind::Str)),
        Rule::new("Factor", vec![cat(Category::Ident), nt("Access")]).reduce(access),
        Rule::new("Factor", vec![lit("("), nt("Expr"), lit(")")])
            .collect(&[false, true, false])
            .reduce(pass),
        Rule::new("Factor", vec![lit("not"), nt("Factor")]).reduce(|v| unary(v, UnaryOp::Not)),
        Rule::new("Factor", vec![lit("-"), nt("Factor")]).reduce(|v| unary(v, UnaryOp::Neg)),
        Rule::new("Access", vec![lit("["), nt("ExprList"), lit("]")]).reduce(suffix),
        Rule::new("Access", vec![lit("("), nt("ExprList"), lit(")")]).reduce(suffix),
        Rule::epsilon("Access"),
        Rule::new("ExprList", vec![nt("Expr"), nt("ExprTail")]).reduce(cons),
        Rule::new("ExprTail", vec![lit(","), nt("Expr"), nt("ExprTail")])
            .collect(&[false, true, true])
            .reduce(cons),
        Rule::epsilon("ExprTail"),
    ];

    for &name in Builtin::NAMES.iter() {
        rules.push(Rule::new("Type", vec![lit(name)]).reduce(|v| {
            let t = Args::new(v).token()?;
            let builtin = Builtin::from_name(&t.text).ok_or_else(|| {
                ReduceError::Invalid(format!("`{}` is not a builtin type", t.text))
            })?;
            Ok(Value::Node(Node::Type(Type::Builtin(builtin, t.span))))
        }));
    }
    for &op in &["=", "<>", "<", "<=", ">", ">="] {
        rules.push(Rule::new("RelOp", vec![lit(op)]).reduce(pass));
    }
    for &op in &["+", "-", "or"] {
        rules.push(Rule::new("AddOp", vec![lit(op)]).reduce(pass));
    }
    for &op in &["*", "/", "div", "mod", "and"] {
        rules.push(Rule::new("MulOp", vec![lit(op)]).reduce(pass));
    }

    Grammar::new("Program", rules)
}

fn ident(v: V) -> Result<Ident, ReduceError> {
    let t = v.into_token()?;
    Ok(Ident {
        name: t.text,
        span: t.span,
    })
}

fn expr(v: V) -> Result<Expr, ReduceError> {
    match v {
        Value::Node(Node::Expr(e)) => Ok(e),
        Value::Error(m) => Ok(Expr::Error(m)),
        v => Err(ReduceError::mismatch("expression", &v)),
    }
}

fn stmt(v: V) -> Result<Stmt, ReduceError> {
    match v {
        Value::Node(Node::Stmt(s)) => Ok(s),
        Value::Error(m) => Ok(Stmt::Error(m)),
        v => Err(ReduceError::mismatch("statement", &v)),
    }
}

fn ty(v: V) -> Result<Type, ReduceError> {
    match v {
        Value::Node(Node::Type(t)) => Ok(t),
        Value::Error(m) => Ok(Type::Error(m)),
        v => Err(ReduceError::mismatch("type", &v)),
    }
}

fn decl(v: V) -> Result<Decl, ReduceError> {
    match v {
        Value::Node(Node::Decl(d)) => Ok(d),
        Value::Error(m) => Ok(Decl::Error(m)),
        v => Err(ReduceError::mismatch("declaration", &v)),
    }
}

fn param(v: V) -> Result<Param, ReduceError> {
    match v {
        Value::Node(Node::Param(p)) => Ok(p),
        v => Err(ReduceError::mismatch("parameter", &v)),
    }
}

fn block_of(v: V) -> Result<Block, ReduceError> {
    match v {
        Value::Node(Node::Block(b)) => Ok(b),
        v => Err(ReduceError::mismatch("block", &v)),
    }
}

/// Convert every element of a list value.
fn list<T>(v: V, f: fn(V) -> Result<T, ReduceError>) -> Result<Vec<T>, ReduceError> {
    v.into_list()?.into_iter().map(f).collect()
}

/// Pass the single collected value on unchanged.
fn pass(v: Vec<V>) -> R {
    Args::new(v).value()
}

/// Prepend a value to the list built by the rest of the rule.
fn cons(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let head = args.value()?;
    let mut tail = args.list()?;
    tail.insert(0, head);
    Ok(Value::List(tail))
}

/// Prepend an operator and its operand to the list built by the rest of the
/// rule.
fn op_cons(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let op = args.value()?;
    let operand = args.value()?;
    let mut tail = args.list()?;
    tail.insert(0, operand);
    tail.insert(0, op);
    Ok(Value::List(tail))
}

/// Concatenate a declaration section, or a single declaration, with the
/// declarations that follow.
fn concat(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let mut all = match args.value()? {
        Value::List(l) => l,
        v => vec![v],
    };
    all.extend(args.list()?);
    Ok(Value::List(all))
}

/// Keep everything a rule collected as a list, for the parent to take apart.
fn suffix(v: Vec<V>) -> R {
    Ok(Value::List(v))
}

fn program(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let first = args.token()?;
    let name = ident(args.value()?)?;
    let block = block_of(args.value()?)?;
    let last = args.token()?;
    Ok(Value::Node(Node::Program(Program {
        span: Span::union(first.span, last.span),
        name,
        block,
    })))
}

fn block(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let decls = list(args.value()?, decl)?;
    let body = list(args.value()?, stmt)?;
    Ok(Value::Node(Node::Block(Block { decls, body })))
}

fn subprogram(v: Vec<V>, function: bool) -> R {
    let mut args = Args::new(v);
    let first = args.token()?;
    let name = ident(args.value()?)?;
    let params = list(args.value()?, param)?;
    let ret = if function {
        Some(ty(args.value()?)?)
    } else {
        None
    };
    let block = block_of(args.value()?)?;
    let last = args.token()?;
    Ok(Value::Node(Node::Decl(Decl::Subprogram(Subprogram {
        span: Span::union(first.span, last.span),
        name,
        params,
        ret,
        block,
    }))))
}

/// Build an assignment or a procedure call from an identifier and the rest
/// of the statement.
fn ident_stmt(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let name = ident(args.value()?)?;
    let mut rest = Args::new(args.list()?);
    if rest.is_empty() {
        return Ok(Value::Node(Node::Stmt(Stmt::Call {
            span: name.span,
            name,
            args: vec![],
        })));
    }
    let open = rest.token()?;
    let s = match open.text.as_str() {
        ":=" => {
            let value = expr(rest.value()?)?;
            Stmt::Assign {
                span: Span::union(name.span, value.span()),
                target: Expr::Var(name),
                value,
            }
        }
        "[" => {
            let indices = list(rest.value()?, expr)?;
            let value = expr(rest.value()?)?;
            let span = Span::union(name.span, value.span());
            Stmt::Assign {
                span,
                target: Expr::Index {
                    span: Span::union(name.span, open.span),
                    base: name,
                    indices,
                },
                value,
            }
        }
        _ => {
            let args = list(rest.value()?, expr)?;
            let close = rest.token()?;
            Stmt::Call {
                span: Span::union(name.span, close.span),
                name,
                args,
            }
        }
    };
    Ok(Value::Node(Node::Stmt(s)))
}

/// Build a variable reference, an indexed access, or a function call.
fn access(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let name = ident(args.value()?)?;
    let mut rest = Args::new(args.list()?);
    if rest.is_empty() {
        return Ok(Value::Node(Node::Expr(Expr::Var(name))));
    }
    let open = rest.token()?;
    let inner = list(rest.value()?, expr)?;
    let close = rest.token()?;
    let span = Span::union(name.span, close.span);
    Ok(Value::Node(Node::Expr(if open.text == "[" {
        Expr::Index {
            span,
            base: name,
            indices: inner,
        }
    } else {
        Expr::Call {
            span,
            name,
            args: inner,
        }
    })))
}

/// Fold an operand followed by a list of operator-operand pairs into a
/// left-associative chain of binary expressions.
fn fold(v: Vec<V>) -> R {
    let mut args = Args::new(v);
    let mut lhs = expr(args.value()?)?;
    let mut rest = Args::new(args.list()?);
    while !rest.is_empty() {
        let op = rest.token()?;
        let rhs = expr(rest.value()?)?;
        lhs = binary(&op, lhs, rhs)?;
    }
    Ok(Value::Node(Node::Expr(lhs)))
}

fn binary(op: &Token, lhs: Expr, rhs: Expr) -> Result<Expr, ReduceError> {
    let kind = BinaryOp::from_text(&op.text)
        .ok_or_else(|| ReduceError::Invalid(format!("`{}` is not a binary operator", op.text)))?;
    Ok(Expr::Binary {
        span: Span::union(lhs.span(), rhs.span()),
        op: kind,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn unary(v: Vec<V>, op: UnaryOp) -> R {
    let mut args = Args::new(v);
    let first = args.token()?;
    let arg = expr(args.value()?)?;
    Ok(Value::Node(Node::Expr(Expr::Unary {
        span: Span::union(first.span, arg.span()),
        op,
        arg: Box::new(arg),
    })))
}

fn literal(v: Vec<V>, kind: LitKind) -> R {
    let t = Args::new(v).token()?;
    Ok(Value::Node(Node::Expr(Expr::Literal(Literal {
        kind,
        text: t.text,
        span: t.span,
    }))))
}
