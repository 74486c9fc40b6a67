// Copyright (c) 2016-2020 Fabian Schuiki

//! The Pascal scanner. Converts the characters of a source file into tokens
//! through a chain of grinders, reporting malformed input as it goes.

pub mod bundler;
pub mod categorizer;
pub mod tokenizer;

use self::bundler::Bundler;
use self::categorizer::Categorizer;
use self::tokenizer::Tokenizer;
use crate::token::{Token, TokenSource};
use pasc_common::errors::{DiagBuilder2, DiagEmitter};
use pasc_common::grind::{self, Grinder, Iter, Vent};
use pasc_common::source::*;

type Chars<'a> =
    Vent<Iter<std::vec::IntoIter<(usize, char)>>, Box<dyn Fn(DiagBuilder2) + 'a>, DiagBuilder2>;

/// A scanner over one source file. Diagnostics are emitted to the emitter
/// given on construction. Once the input is exhausted, the lexer produces
/// end-of-input tokens forever.
pub struct Lexer<'a> {
    inner: Tokenizer<Bundler<Categorizer<Chars<'a>>>>,
    eof: Span,
}

impl<'a> Lexer<'a> {
    pub fn new(src: Source, diag: &'a dyn DiagEmitter) -> Lexer<'a> {
        let content = src.get_content();
        let chars: Vec<(usize, char)> = content.iter().collect();
        let end = content.as_str().len();
        let vent: Box<dyn Fn(DiagBuilder2) + 'a> = Box::new(move |d| diag.emit(d));
        let chars = grind::from_iter(chars.into_iter()).vent(vent);
        let cat = Categorizer::new(chars);
        let bundles = Bundler::new(cat, src);
        let tokens = Tokenizer::new(bundles);
        Lexer {
            inner: tokens,
            eof: Span::new(src, end, end),
        }
    }

    /// Scan the entire input, excluding the final end-of-input token.
    pub fn collect_tokens(mut self) -> Vec<Token> {
        let mut v = Vec::new();
        while let Some(t) = self.inner.next() {
            v.push(t);
        }
        v
    }
}

impl<'a> Grinder for Lexer<'a> {
    type Item = Option<Token>;
    type Error = DiagBuilder2;

    fn next(&mut self) -> Self::Item {
        self.inner.next()
    }

    fn emit(&mut self, err: Self::Error) {
        self.inner.emit(err)
    }
}

impl<'a> TokenSource for Lexer<'a> {
    fn next_token(&mut self) -> Token {
        match self.inner.next() {
            Some(t) => {
                trace!("scanned {:?}", t);
                t
            }
            None => Token::eof(self.eof),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Lexer;
    use crate::token::{Category, Kw, Token};
    use pasc_common::errors::DiagCollector;
    use pasc_common::source::*;
    use std::cell::Cell;

    fn lex(input: &str) -> (Vec<Token>, DiagCollector) {
        thread_local!(static INDEX: Cell<usize> = Cell::new(0));
        let idx = INDEX.with(|i| {
            let v = i.get();
            i.set(v + 1);
            v
        });
        let src = get_source_manager().add(&format!("lexer_test_{}.pas", idx), input);
        let diag = DiagCollector::new();
        let tokens = Lexer::new(src, &diag).collect_tokens();
        (tokens, diag)
    }

    fn check(input: &str, expected: &[(Category, &str)]) {
        let (tokens, diag) = lex(input);
        assert!(!diag.is_error(), "{:?}", diag.messages());
        let actual: Vec<_> = tokens
            .iter()
            .map(|t| (t.category, t.text.as_str()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn idents_and_keywords() {
        check(
            "Program hello_World; BEGIN x1 EnD",
            &[
                (Category::Keyword, "program"),
                (Category::Ident, "hello_World"),
                (Category::Symbol, ";"),
                (Category::Keyword, "begin"),
                (Category::Ident, "x1"),
                (Category::Keyword, "end"),
            ],
        );
        let (tokens, _) = lex("WHILE");
        assert_eq!(tokens[0].keyword, Some(Kw::While));
    }

    #[test]
    fn numbers() {
        check(
            "42 3.14 1e10 2.5E-3 1..10",
            &[
                (Category::IntLit, "42"),
                (Category::RealLit, "3.14"),
                (Category::RealLit, "1e10"),
                (Category::RealLit, "2.5E-3"),
                (Category::IntLit, "1"),
                (Category::Symbol, ".."),
                (Category::IntLit, "10"),
            ],
        );
    }

    #[test]
    fn strings() {
        check(
            "'hello' 'it''s' ''",
            &[
                (Category::StrLit, "hello"),
                (Category::StrLit, "it's"),
                (Category::StrLit, ""),
            ],
        );
    }

    #[test]
    fn symbols() {
        check(
            ":= <= >= <> = < > + - * / ( ) [ ] , ; : .",
            &[
                (Category::Symbol, ":="),
                (Category::Symbol, "<="),
                (Category::Symbol, ">="),
                (Category::Symbol, "<>"),
                (Category::Symbol, "="),
                (Category::Symbol, "<"),
                (Category::Symbol, ">"),
                (Category::Symbol, "+"),
                (Category::Symbol, "-"),
                (Category::Symbol, "*"),
                (Category::Symbol, "/"),
                (Category::Symbol, "("),
                (Category::Symbol, ")"),
                (Category::Symbol, "["),
                (Category::Symbol, "]"),
                (Category::Symbol, ","),
                (Category::Symbol, ";"),
                (Category::Symbol, ":"),
                (Category::Symbol, "."),
            ],
        );
    }

    #[test]
    fn comments() {
        check(
            "a { brace } b (* star *) c (* x ) *) d",
            &[
                (Category::Ident, "a"),
                (Category::Ident, "b"),
                (Category::Ident, "c"),
                (Category::Ident, "d"),
            ],
        );
    }

    #[test]
    fn invalid_characters_are_skipped() {
        let (tokens, diag) = lex("a $ b");
        assert_eq!(diag.len_at_least(pasc_common::errors::Severity::Error), 1);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "b");
    }

    #[test]
    fn unterminated_comment() {
        let (tokens, diag) = lex("a { never closed");
        assert!(diag.is_error());
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn spans() {
        let (tokens, _) = lex("x := 10");
        assert_eq!(tokens[1].span.begin, 2);
        assert_eq!(tokens[1].span.end, 4);
        assert_eq!(tokens[2].span.extract(), "10");
    }
}
