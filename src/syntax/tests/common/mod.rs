// Copyright (c) 2016-2020 Fabian Schuiki

#![allow(dead_code)]

use pasc_common::source::*;
use pasc_syntax::ll::*;
use pasc_syntax::token::{Category, Token, TokenList};

/// Turn every non-space character of `input` into a token of its own.
/// Digits become integer literals, letters identifiers, and everything else
/// symbols.
pub fn tokens(input: &str) -> TokenList {
    let src = get_source_manager().add_anonymous(input);
    TokenList::new(
        input
            .char_indices()
            .filter(|&(_, c)| !c.is_whitespace())
            .map(|(i, c)| {
                let category = if c.is_ascii_digit() {
                    Category::IntLit
                } else if c.is_alphabetic() {
                    Category::Ident
                } else {
                    Category::Symbol
                };
                Token::new(category, c.to_string(), Span::new(src, i, i + c.len_utf8()))
            })
            .collect(),
    )
}

/// Balanced parentheses, counting the pairs.
///
/// ```text
/// S -> ( S ) S | ε
/// ```
pub fn parens() -> Grammar<usize> {
    Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![lit("("), nt("S"), lit(")"), nt("S")])
                .collect(&[false, true, false, true])
                .reduce(|v| {
                    let mut args = Args::new(v);
                    let inner = count(args.value()?)?;
                    let rest = count(args.value()?)?;
                    Ok(Value::Node(1 + inner + rest))
                }),
            Rule::epsilon("S"),
        ],
    )
    .unwrap()
}

/// Properly nested parentheses, counting the depth.
///
/// ```text
/// S -> ( S ) | ε
/// ```
pub fn nested() -> Grammar<usize> {
    Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![lit("("), nt("S"), lit(")")])
                .collect(&[false, true, false])
                .reduce(|v| Ok(Value::Node(1 + count(Args::new(v).value()?)?))),
            Rule::epsilon("S"),
        ],
    )
    .unwrap()
}

fn count(v: Value<usize>) -> Result<usize, ReduceError> {
    match v {
        Value::Unit => Ok(0),
        v => v.into_node(),
    }
}

/// Sums of single digits.
///
/// ```text
/// Sum  -> Digit Tail
/// Tail -> + Digit Tail | ε
/// ```
pub fn sums() -> Grammar<i64> {
    Grammar::new(
        "Sum",
        vec![
            Rule::new("Sum", vec![cat(Category::IntLit), nt("Tail")]).reduce(add),
            Rule::new("Tail", vec![lit("+"), cat(Category::IntLit), nt("Tail")])
                .collect(&[false, true, true])
                .reduce(add),
            Rule::epsilon("Tail"),
        ],
    )
    .unwrap()
}

fn add(v: Vec<Value<i64>>) -> Result<Value<i64>, ReduceError> {
    let mut args = Args::new(v);
    let digit = args.token()?;
    let value: i64 = digit
        .text
        .parse()
        .map_err(|_| ReduceError::Invalid(format!("`{}` is not a number", digit.text)))?;
    let rest = match args.value()? {
        Value::Unit => 0,
        v => v.into_node()?,
    };
    Ok(Value::Node(value + rest))
}
