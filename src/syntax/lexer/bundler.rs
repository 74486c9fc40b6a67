// Copyright (c) 2016-2020 Fabian Schuiki

use crate::lexer::categorizer::CharCategory;
use pasc_common::errors::DiagBuilder2;
use pasc_common::grind::{Grinder, Lookahead};
use pasc_common::source::*;

/// A grinder that bundles up categorized characters into groups. Spaces and
/// comments become single bundles without content, and string literals are
/// formed here as well. Characters not allowed in the source text are
/// reported and skipped.
pub struct Bundler<T> {
    inner: Lookahead<T, (usize, char, CharCategory)>,
    src: Source,
}

impl<T> Bundler<T>
where
    T: Grinder<Item = Option<(usize, char, CharCategory)>, Error = DiagBuilder2>,
{
    pub fn new(inner: T, src: Source) -> Bundler<T> {
        Bundler {
            inner: inner.lookaheadable(),
            src,
        }
    }

    /// Consume characters up to and including the closing `term`. The second
    /// character of `term` is optional.
    fn skip_comment(&mut self, mut sp: Span, term: (char, Option<char>)) -> Spanned<Bundle> {
        loop {
            match self.inner.next() {
                Some((offset, d, _)) => {
                    sp.end = offset + d.len_utf8();
                    if d != term.0 {
                        continue;
                    }
                    match term.1 {
                        None => break,
                        Some(t1) => {
                            if let Some((offset, e, _)) = self.inner.next_if(|&(_, e, _)| e == t1) {
                                sp.end = offset + e.len_utf8();
                                break;
                            }
                        }
                    }
                }
                None => {
                    self.emit(DiagBuilder2::error("unterminated comment").span(sp.begin()));
                    break;
                }
            }
        }
        Spanned::new(Bundle::Comment, sp)
    }
}

impl<T> Grinder for Bundler<T>
where
    T: Grinder<Item = Option<(usize, char, CharCategory)>, Error = DiagBuilder2>,
{
    type Item = Option<Spanned<Bundle>>;
    type Error = DiagBuilder2;

    fn emit(&mut self, err: Self::Error) {
        self.inner.emit(err);
    }

    fn next(&mut self) -> Self::Item {
        loop {
            let (begin, c, cat) = self.inner.next()?;
            let mut sp = Span::new(self.src, begin, begin + c.len_utf8());

            // Handle brace comments.
            if c == '{' {
                return Some(self.skip_comment(sp, ('}', None)));
            }

            // Handle parenthesis-star comments.
            if c == '(' {
                if self.inner.next_if(|&(_, d, _)| d == '*').is_some() {
                    return Some(self.skip_comment(sp, ('*', Some(')'))));
                }
            }

            // Handle string literals. A doubled quote stands for a quote.
            if c == '\'' {
                let mut s = String::new();
                loop {
                    match self.inner.next() {
                        Some((offset, '\'', _)) => {
                            sp.end = offset + 1;
                            if self.inner.next_if(|&(_, d, _)| d == '\'').is_some() {
                                s.push('\'');
                            } else {
                                break;
                            }
                        }
                        Some((offset, '\n', _)) => {
                            self.emit(
                                DiagBuilder2::error("string literal must not contain line breaks")
                                    .span(sp),
                            );
                            self.inner.undo((offset, '\n', CharCategory::Space));
                            break;
                        }
                        Some((offset, d, _)) => {
                            sp.end = offset + d.len_utf8();
                            s.push(d);
                        }
                        None => {
                            self.emit(DiagBuilder2::error("unterminated string literal").span(sp));
                            break;
                        }
                    }
                }
                return Some(Spanned::new(Bundle::StringLiteral(s), sp));
            }

            return Some(match cat {
                // Aggregate all following characters of the same kind.
                CharCategory::Letter | CharCategory::Digit => {
                    let mut s = String::new();
                    s.push(c);
                    while let Some((offset, d, _)) = self.inner.next_if(|&(_, _, dc)| dc == cat) {
                        s.push(d);
                        sp.end = offset + d.len_utf8();
                    }
                    Spanned::new(
                        if cat == CharCategory::Letter {
                            Bundle::Letters(s)
                        } else {
                            Bundle::Digits(s)
                        },
                        sp,
                    )
                }

                CharCategory::Space => {
                    while let Some((offset, d, _)) =
                        self.inner.next_if(|&(_, _, dc)| dc == CharCategory::Space)
                    {
                        sp.end = offset + d.len_utf8();
                    }
                    Spanned::new(Bundle::Space, sp)
                }

                CharCategory::Special => Spanned::new(Bundle::Special(c), sp),

                CharCategory::Other => {
                    self.emit(
                        DiagBuilder2::error(format!("character `{}` not allowed in source text", c))
                            .span(sp),
                    );
                    continue;
                }
            });
        }
    }
}

/// A bundle of characters, which the tokenizer combines into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bundle {
    Letters(String),
    Digits(String),
    Special(char),
    StringLiteral(String),
    Space,
    Comment,
}

impl Bundle {
    /// Check whether the bundle has syntactic significance, i.e. is not a
    /// comment or space.
    pub fn is_significant(&self) -> bool {
        match *self {
            Bundle::Space | Bundle::Comment => false,
            _ => true,
        }
    }
}
