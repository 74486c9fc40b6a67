// Copyright (c) 2016-2020 Fabian Schuiki

//! Mapping the lookahead token to a terminal.

use crate::ll::grammar::{Nonterm, Symbol, Terminal};
use crate::token::{Category, Token};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Decides which terminal a token counts as, given the symbol the parser
/// currently expects.
pub trait Classifier: Send + Sync {
    fn classify(&self, expected: &Symbol, token: &Token) -> Terminal;
}

/// The default classification: punctuation and operator keywords by their
/// text, other keywords as keywords, everything else by category.
pub fn classify_token(token: &Token) -> Terminal {
    match token.category {
        Category::Symbol => Terminal::Literal(Cow::Owned(token.text.clone())),
        Category::Keyword => match token.keyword {
            Some(kw) if kw.is_operator() => Terminal::Literal(Cow::Borrowed(kw.as_str())),
            Some(kw) => Terminal::Keyword(kw),
            None => Terminal::Category(Category::Keyword),
        },
        c => Terminal::Category(c),
    }
}

/// A classifier that ignores the expected symbol.
#[derive(Clone, Copy, Default, Debug)]
pub struct TokenClassifier;

impl Classifier for TokenClassifier {
    fn classify(&self, _: &Symbol, token: &Token) -> Terminal {
        classify_token(token)
    }
}

/// A classifier that lets identifiers naming a known type count as that
/// name's literal terminal, whenever the parser expects a type.
///
/// The parser is considered to expect a type if the expected symbol is one of
/// the registered type positions, or the literal terminal of a type name.
#[derive(Clone, Default, Debug)]
pub struct TypeNameClassifier {
    positions: BTreeSet<Nonterm>,
    names: BTreeSet<String>,
}

impl TypeNameClassifier {
    pub fn new<P, T>(positions: P, names: T) -> TypeNameClassifier
    where
        P: IntoIterator<Item = &'static str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        TypeNameClassifier {
            positions: positions.into_iter().map(Nonterm).collect(),
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_type_name(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    fn expects_type(&self, expected: &Symbol) -> bool {
        match expected {
            Symbol::Nonterm(nt) => self.positions.contains(nt),
            Symbol::Term(Terminal::Literal(text)) => self.names.contains(&**text),
            _ => false,
        }
    }
}

impl Classifier for TypeNameClassifier {
    fn classify(&self, expected: &Symbol, token: &Token) -> Terminal {
        if token.category == Category::Ident && self.expects_type(expected) {
            let name = token.text.to_lowercase();
            if self.names.contains(&name) {
                trace!("classifying `{}` as type name", token.text);
                return Terminal::Literal(Cow::Owned(name));
            }
        }
        classify_token(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ll::grammar::{cat, lit, nt};
    use crate::token::Kw;
    use pasc_common::source::INVALID_SPAN;

    fn ident(text: &str) -> Token {
        Token::new(Category::Ident, text, INVALID_SPAN)
    }

    #[test]
    fn default_rules() {
        let c = TokenClassifier;
        let any = cat(Category::Ident);
        assert_eq!(
            c.classify(&any, &Token::new(Category::Symbol, ":=", INVALID_SPAN)),
            Terminal::Literal(":=".into())
        );
        assert_eq!(
            c.classify(&any, &Token::keyword(Kw::Div, INVALID_SPAN)),
            Terminal::Literal("div".into())
        );
        assert_eq!(
            c.classify(&any, &Token::keyword(Kw::Begin, INVALID_SPAN)),
            Terminal::Keyword(Kw::Begin)
        );
        assert_eq!(
            c.classify(&any, &ident("integer")),
            Terminal::Category(Category::Ident)
        );
        assert_eq!(c.classify(&any, &Token::eof(INVALID_SPAN)), Terminal::EOF);
    }

    #[test]
    fn type_names_only_where_types_are_expected() {
        let c = TypeNameClassifier::new(vec!["Type"], vec!["Integer", "real"]);
        assert_eq!(
            c.classify(&nt("Type"), &ident("INTEGER")),
            Terminal::Literal("integer".into())
        );
        assert_eq!(
            c.classify(&lit("real"), &ident("real")),
            Terminal::Literal("real".into())
        );
        assert_eq!(
            c.classify(&nt("Expr"), &ident("integer")),
            Terminal::Category(Category::Ident)
        );
        assert_eq!(
            c.classify(&nt("Type"), &ident("count")),
            Terminal::Category(Category::Ident)
        );
        assert!(c.is_type_name("Real"));
    }
}
