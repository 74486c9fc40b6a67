// Copyright (c) 2016-2020 Fabian Schuiki

mod common;

use common::*;
use pasc_common::errors::{DiagCollector, Severity};
use pasc_common::source::INVALID_SPAN;
use pasc_syntax::ll::*;
use pasc_syntax::token::{Category, Kw, Token, TokenList};
use std::sync::Arc;

#[test]
fn balanced_parens() {
    let parser = LlParser::new(parens());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("(())()"), &diag).unwrap();
    assert!(parsed.is_clean());
    assert!(!parsed.exhausted);
    assert_eq!(parsed.value, Value::Node(3));
    assert_eq!(diag.len_at_least(Severity::Note), 0);
}

#[test]
fn empty_input_matches_epsilon() {
    let parser = LlParser::new(parens());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens(""), &diag).unwrap();
    assert!(parsed.is_clean());
    assert_eq!(parsed.value, Value::Unit);
}

#[test]
fn unclosed_paren_recovers_at_end() {
    let parser = LlParser::new(parens());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("(()"), &diag).unwrap();
    assert_eq!(parsed.syntax_errors, 1);
    assert!(!parsed.exhausted);
    assert!(parsed.value.is_error());
    assert_eq!(diag.messages(), vec!["expected `)`, found end of input"]);
}

#[test]
fn nested_parens_count_depth() {
    let parser = LlParser::new(nested());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("(())"), &diag).unwrap();
    assert!(parsed.is_clean());
    assert!(!parsed.tainted);
    assert_eq!(parsed.value, Value::Node(2));
    assert_eq!(diag.len_at_least(Severity::Note), 0);
}

#[test]
fn nested_parens_missing_close() {
    let parser = LlParser::new(nested());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("(()"), &diag).unwrap();
    assert_eq!(parsed.syntax_errors, 1);
    assert!(parsed.tainted);
    assert!(parsed.value.is_error());
    assert_eq!(diag.messages(), vec!["expected `)`, found end of input"]);
}

#[test]
fn collected_error_taints_root() {
    let g: Grammar<usize> = Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![lit("("), nt("X"), lit(")")])
                .reduce(|v| Ok(Value::Node(v.len()))),
            Rule::new("X", vec![nt("Y"), lit("!")]),
            Rule::new("Y", vec![lit("#")]),
        ],
    )
    .unwrap();
    let parser = LlParser::new(g);
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("(#?)"), &diag).unwrap();
    assert_eq!(parsed.value, Value::Node(3));
    assert_eq!(parsed.syntax_errors, 1);
    assert!(parsed.tainted);
    assert!(!parsed.is_clean());
    assert_eq!(diag.len_at_least(Severity::Error), 1);
}

#[test]
fn sum_of_digits() {
    let parser = LlParser::new(sums());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("1+2+3"), &diag).unwrap();
    assert!(parsed.is_clean());
    assert_eq!(parsed.value, Value::Node(6));
}

#[test]
fn garbage_exhausts_input() {
    let parser = LlParser::new(sums());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("1 $ 2"), &diag).unwrap();
    assert_eq!(parsed.syntax_errors, 1);
    assert!(parsed.exhausted);
    assert!(parsed.value.is_error());
    assert_eq!(diag.len_at_least(Severity::Error), 1);
    let marker = parsed.value.error_marker().unwrap();
    assert_eq!(marker.found, "$");
    assert_eq!(marker.expected, "Tail");
}

#[test]
fn trailing_tokens_reported_once() {
    let g: Grammar<i64> = Grammar::new(
        "S",
        vec![Rule::new("S", vec![cat(Category::IntLit)]).reduce(|_| Ok(Value::Node(1)))],
    )
    .unwrap();
    let parser = LlParser::new(g);
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("1 2 3"), &diag).unwrap();
    assert_eq!(parsed.value, Value::Node(1));
    assert_eq!(parsed.syntax_errors, 1);
    assert!(!parsed.tainted);
    assert!(!parsed.is_clean());
    assert!(!parsed.exhausted);
    assert_eq!(diag.messages(), vec!["expected end of input, found integer literal `2`"]);
}

#[test]
fn error_in_tail_exhausts_input() {
    let parser = LlParser::new(sums());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("1+2 3 4"), &diag).unwrap();
    assert_eq!(parsed.syntax_errors, 1);
    assert!(parsed.exhausted);
    assert_eq!(diag.len_at_least(Severity::Error), 1);
}

#[test]
fn nothing_matches_start() {
    let parser = LlParser::new(sums());
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens("+"), &diag).unwrap();
    assert!(parsed.value.is_error());
    assert!(parsed.exhausted);
    assert_eq!(parsed.syntax_errors, 1);
}

#[test]
fn nullable_chain() {
    let unit = |_: Vec<Value<()>>| -> Result<Value<()>, ReduceError> { Ok(Value::Unit) };
    let g = Grammar::new(
        "A",
        vec![
            Rule::new("A", vec![nt("B")]).reduce(unit),
            Rule::new("B", vec![nt("C")]).reduce(unit),
            Rule::epsilon("C"),
        ],
    )
    .unwrap();
    let parser = LlParser::new(g);
    for &name in &["A", "B", "C"] {
        assert!(parser.analysis().is_nullable(&nt(name)));
        assert_eq!(
            parser.table().get(Nonterm(name), &Terminal::EOF).is_some(),
            true
        );
    }
    let diag = DiagCollector::new();
    let parsed = parser.parse(tokens(""), &diag).unwrap();
    assert!(parsed.is_clean());
}

#[test]
fn tables_are_deterministic() {
    let a = LlParser::new(sums());
    let b = LlParser::new(sums());
    assert_eq!(a.analysis(), b.analysis());
    assert_eq!(a.table(), b.table());
    assert_eq!(
        a.table().display(a.grammar()).to_string(),
        b.table().display(b.grammar()).to_string()
    );
}

#[test]
fn refusing_reducer_fails_parse() {
    let g: Grammar<i64> = Grammar::new(
        "S",
        vec![Rule::new("S", vec![cat(Category::IntLit)]).reduce(|v| {
            let n = Args::new(v).node()?;
            Ok(Value::Node(n))
        })],
    )
    .unwrap();
    let parser = LlParser::new(g);
    let diag = DiagCollector::new();
    match parser.parse(tokens("1"), &diag) {
        Err(ParseError::Reduce { rule, error }) => {
            assert_eq!(rule, "S -> integer literal");
            assert_eq!(
                error,
                ReduceError::Mismatch {
                    expected: "node",
                    found: "token"
                }
            );
        }
        r => panic!("unexpected {:?}", r.map(|p| p.value)),
    }
}

#[test]
fn type_name_escape() {
    // Decl -> x : Type ; Type -> integer | Ident
    let g: Grammar<String> = Grammar::new(
        "Decl",
        vec![
            Rule::new("Decl", vec![cat(Category::Ident), lit(":"), nt("Type")])
                .collect(&[false, false, true])
                .reduce(|v| Args::new(v).value()),
            Rule::new("Type", vec![lit("integer")]).reduce(|v| {
                let name = Args::new(v).token()?.text;
                Ok(Value::Node(format!("builtin {}", name)))
            }),
            Rule::new("Type", vec![cat(Category::Ident)]).reduce(|v| {
                let name = Args::new(v).token()?.text;
                Ok(Value::Node(format!("named {}", name)))
            }),
        ],
    )
    .unwrap();
    let types = TypeNameClassifier::new(vec!["Type"], vec!["integer"]);
    let parser = LlParser::with_classifier(g, types);
    let diag = DiagCollector::new();
    let words = |a: &str, b: &str| {
        TokenList::new(vec![
            Token::new(Category::Ident, a, INVALID_SPAN),
            Token::new(Category::Symbol, ":", INVALID_SPAN),
            Token::new(Category::Ident, b, INVALID_SPAN),
        ])
    };
    let parsed = parser.parse(words("integer", "integer"), &diag).unwrap();
    assert_eq!(parsed.value, Value::Node("builtin integer".to_string()));
    let parsed = parser.parse(words("x", "count"), &diag).unwrap();
    assert_eq!(parsed.value, Value::Node("named count".to_string()));
    assert!(!diag.is_error());
}

#[test]
fn collisions_prefer_later_rules() {
    let g: Grammar<u8> = Grammar::new(
        "S",
        vec![
            Rule::new("S", vec![kw(Kw::If), lit("a")]).reduce(|_| Ok(Value::Node(1))),
            Rule::new("S", vec![kw(Kw::If), lit("b")]).reduce(|_| Ok(Value::Node(2))),
        ],
    )
    .unwrap();
    let parser = LlParser::new(g);
    assert_eq!(parser.table().collisions().len(), 1);
    let diag = DiagCollector::new();
    parser.report_collisions(&diag);
    assert_eq!(diag.count(Severity::Warning), 1);
}

#[test]
fn shared_between_threads() {
    let parser = Arc::new(LlParser::new(sums()));
    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let parser = parser.clone();
            std::thread::spawn(move || {
                let input = vec!["1"; n].join("+");
                let diag = DiagCollector::new();
                parser.parse(tokens(&input), &diag).unwrap().value
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        vec![Value::Node(1), Value::Node(2), Value::Node(3), Value::Node(4)]
    );
}
