// Copyright (c) 2016-2020 Fabian Schuiki

use crate::lexer::bundler::Bundle;
use crate::token::{Category, Kw, Token};
use pasc_common::errors::DiagBuilder2;
use pasc_common::grind::{Grinder, Lookahead};
use pasc_common::source::*;

/// A grinder that combines character bundles into tokens. This is the last
/// stage of lexical analysis.
pub struct Tokenizer<T> {
    inner: Lookahead<T, Spanned<Bundle>>,
}

impl<T> Tokenizer<T>
where
    T: Grinder<Item = Option<Spanned<Bundle>>, Error = DiagBuilder2>,
{
    pub fn new(inner: T) -> Tokenizer<T> {
        Tokenizer {
            inner: inner.lookaheadable(),
        }
    }

    /// Returns the next bundle in the input for which `is_significant` is true.
    fn next_significant(&mut self) -> Option<Spanned<Bundle>> {
        while let Some(v) = self.inner.next() {
            if v.value.is_significant() {
                return Some(v);
            }
        }
        None
    }

    /// Parse the rest of an identifier or keyword, i.e. any letters, digits,
    /// and underscores directly following.
    fn parse_word(&mut self, mut s: String, mut sp: Span) -> Token {
        loop {
            match self.inner.next() {
                Some(Spanned {
                    value: Bundle::Letters(n),
                    span,
                })
                | Some(Spanned {
                    value: Bundle::Digits(n),
                    span,
                }) => {
                    s.push_str(&n);
                    sp.end = span.end;
                }
                Some(Spanned {
                    value: Bundle::Special('_'),
                    span,
                }) => {
                    s.push('_');
                    sp.end = span.end;
                }
                Some(n) => {
                    self.inner.undo(n);
                    break;
                }
                None => break,
            }
        }
        match Kw::from_str(&s) {
            Some(kw) => Token::keyword(kw, sp),
            None => Token::new(Category::Ident, s, sp),
        }
    }

    /// Parse a number. Digits followed by a period and more digits form a
    /// real literal, as do digits followed by an exponent. A period followed
    /// by another period is left alone, since it starts a range.
    fn parse_number(&mut self, mut s: String, mut sp: Span) -> Token {
        let mut real = false;
        if let Some(&Spanned {
            value: Bundle::Special('.'),
            ..
        }) = self.inner.peek(0)
        {
            if let Some(&Spanned {
                value: Bundle::Digits(ref frac),
                span,
            }) = self.inner.peek(1)
            {
                s.push('.');
                s.push_str(frac);
                sp.end = span.end;
                real = true;
                self.inner.next();
                self.inner.next();
            }
        }
        if let Some((exp, end)) = self.try_exponent() {
            s.push_str(&exp);
            sp.end = end;
            real = true;
        }
        Token::new(
            if real {
                Category::RealLit
            } else {
                Category::IntLit
            },
            s,
            sp,
        )
    }

    /// Try to parse an exponent such as `e10`, `E+3`, or `e-2`.
    fn try_exponent(&mut self) -> Option<(String, usize)> {
        let letters = match self.inner.peek(0) {
            Some(&Spanned {
                value: Bundle::Letters(ref l),
                ..
            }) if l == "e" || l == "E" => l.clone(),
            _ => return None,
        };
        let (sign, digits_at) = match self.inner.peek(1) {
            Some(&Spanned {
                value: Bundle::Special(c @ '+'),
                ..
            })
            | Some(&Spanned {
                value: Bundle::Special(c @ '-'),
                ..
            }) => (Some(c), 2),
            _ => (None, 1),
        };
        let (digits, end) = match self.inner.peek(digits_at) {
            Some(&Spanned {
                value: Bundle::Digits(ref d),
                span,
            }) => (d.clone(), span.end),
            _ => return None,
        };
        for _ in 0..digits_at + 1 {
            self.inner.next();
        }
        let mut s = letters;
        s.extend(sign);
        s.push_str(&digits);
        Some((s, end))
    }

    /// Parse a symbol. `c0` comes from a `Bundle::Special` that has already
    /// been consumed.
    fn parse_symbol(&mut self, c0: char, mut span: Span) -> Option<Token> {
        if let Some(&Spanned {
            value: Bundle::Special(c1),
            span: sp,
        }) = self.inner.peek(0)
        {
            if let Some(sym) = match (c0, c1) {
                (':', '=') => Some(":="),
                ('<', '=') => Some("<="),
                ('>', '=') => Some(">="),
                ('<', '>') => Some("<>"),
                ('.', '.') => Some(".."),
                _ => None,
            } {
                self.inner.next();
                span.expand(sp);
                return Some(Token::new(Category::Symbol, sym, span));
            }
        }
        match c0 {
            '=' | '<' | '>' | '+' | '-' | '*' | '/' | '(' | ')' | '[' | ']' | ',' | ';' | ':'
            | '.' => Some(Token::new(Category::Symbol, c0.to_string(), span)),
            _ => {
                self.emit(
                    DiagBuilder2::error(format!("`{}` is not a valid symbol", c0)).span(span),
                );
                None
            }
        }
    }
}

impl<T> Grinder for Tokenizer<T>
where
    T: Grinder<Item = Option<Spanned<Bundle>>, Error = DiagBuilder2>,
{
    type Item = Option<Token>;
    type Error = DiagBuilder2;

    fn emit(&mut self, err: Self::Error) {
        self.inner.emit(err);
    }

    fn next(&mut self) -> Self::Item {
        loop {
            let b = self.next_significant()?;
            return Some(match b.value {
                Bundle::Letters(s) => self.parse_word(s, b.span),
                Bundle::Digits(s) => self.parse_number(s, b.span),
                Bundle::StringLiteral(s) => Token::new(Category::StrLit, s, b.span),
                Bundle::Special(c) => match self.parse_symbol(c, b.span) {
                    Some(t) => t,
                    None => continue,
                },
                Bundle::Space | Bundle::Comment => continue,
            });
        }
    }
}
