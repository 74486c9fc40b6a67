// Copyright (c) 2016-2020 Fabian Schuiki

use pasc_common::errors::DiagBuilder2;
use pasc_common::grind::Grinder;

/// A grinder that sorts characters into the groups that matter to the
/// scanner.
pub struct Categorizer<T> {
    inner: T,
}

impl<T> Categorizer<T>
where
    T: Grinder<Item = Option<(usize, char)>, Error = DiagBuilder2>,
{
    pub fn new(inner: T) -> Categorizer<T> {
        Categorizer { inner }
    }
}

impl<T> Grinder for Categorizer<T>
where
    T: Grinder<Item = Option<(usize, char)>, Error = DiagBuilder2>,
{
    type Item = Option<(usize, char, CharCategory)>;
    type Error = DiagBuilder2;

    fn emit(&mut self, err: Self::Error) {
        self.inner.emit(err);
    }

    fn next(&mut self) -> Self::Item {
        let (offset, c) = self.inner.next()?;
        let cat = match c {
            '\'' | '{' | '}' | '(' | ')' | '*' | '+' | ',' | '-' | '.' | '/' | ':' | ';' | '<'
            | '=' | '>' | '[' | ']' | '_' => CharCategory::Special,
            c if c.is_ascii_alphabetic() => CharCategory::Letter,
            c if c.is_ascii_digit() => CharCategory::Digit,
            c if c.is_whitespace() => CharCategory::Space,
            _ => CharCategory::Other,
        };
        Some((offset, c, cat))
    }
}

/// A character category. Special characters are the ones with a syntactic
/// meaning of their own.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CharCategory {
    Letter,
    Digit,
    Special,
    Space,
    Other,
}
