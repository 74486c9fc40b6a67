// Copyright (c) 2016-2020 Fabian Schuiki

//! The tokens exchanged between the scanner and the parser.

use pasc_common::source::*;
use pasc_common::util::HasSpan;
use std::fmt;

/// The broad class of a token.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Category {
    Ident,
    Keyword,
    IntLit,
    RealLit,
    StrLit,
    /// Operators and punctuation. These are told apart by their text.
    Symbol,
    /// A token synthesized by error recovery in place of an offending one.
    Error,
    Eof,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ident => "identifier",
            Category::Keyword => "keyword",
            Category::IntLit => "integer literal",
            Category::RealLit => "real literal",
            Category::StrLit => "string literal",
            Category::Symbol => "symbol",
            Category::Error => "error",
            Category::Eof => "end of input",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! declare_keywords {
    ($($name:ident => $text:literal,)*) => {
        /// A reserved word.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub enum Kw {
            $($name,)*
        }

        impl Kw {
            /// Look up a keyword, ignoring case.
            pub fn from_str(s: &str) -> Option<Kw> {
                match s.to_ascii_lowercase().as_str() {
                    $($text => Some(Kw::$name),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Kw::$name => $text,)*
                }
            }
        }
    };
}

declare_keywords! {
    And => "and",
    Array => "array",
    Begin => "begin",
    Const => "const",
    Div => "div",
    Do => "do",
    Downto => "downto",
    Else => "else",
    End => "end",
    For => "for",
    Function => "function",
    If => "if",
    Mod => "mod",
    Not => "not",
    Of => "of",
    Or => "or",
    Procedure => "procedure",
    Program => "program",
    Repeat => "repeat",
    Then => "then",
    To => "to",
    Type => "type",
    Until => "until",
    Var => "var",
    While => "while",
}

impl Kw {
    /// Whether the keyword acts as an operator inside expressions. These are
    /// classified by their text, like the symbolic operators.
    pub fn is_operator(self) -> bool {
        match self {
            Kw::And | Kw::Or | Kw::Not | Kw::Div | Kw::Mod => true,
            _ => false,
        }
    }
}

impl fmt::Display for Kw {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token as produced by the scanner.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub category: Category,
    /// Set for `Category::Keyword` tokens.
    pub keyword: Option<Kw>,
    /// The literal text of the token. Keywords are lowercased, string
    /// literals carry their unquoted content.
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new<S: Into<String>>(category: Category, text: S, span: Span) -> Token {
        Token {
            category,
            keyword: None,
            text: text.into(),
            span,
        }
    }

    pub fn keyword(kw: Kw, span: Span) -> Token {
        Token {
            category: Category::Keyword,
            keyword: Some(kw),
            text: kw.as_str().to_string(),
            span,
        }
    }

    pub fn eof(span: Span) -> Token {
        Token::new(Category::Eof, "", span)
    }

    /// Create the synthetic error token that replaces `self` during recovery.
    pub fn to_error(&self) -> Token {
        Token::new(Category::Error, self.text.clone(), self.span)
    }

    pub fn is_eof(&self) -> bool {
        self.category == Category::Eof
    }
}

impl HasSpan for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.category {
            Category::Symbol => write!(f, "`{}`", self.text),
            Category::Eof => write!(f, "end of input"),
            Category::StrLit => write!(f, "string literal '{}'", self.text),
            c => write!(f, "{} `{}`", c, self.text),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}({:?})", self.category, self.text)
    }
}

/// A pull-based supplier of tokens. Once the input is exhausted, every further
/// call returns an `Eof` token.
pub trait TokenSource {
    fn next_token(&mut self) -> Token;
}

impl<'a, T> TokenSource for &'a mut T
where
    T: TokenSource + ?Sized,
{
    fn next_token(&mut self) -> Token {
        (**self).next_token()
    }
}

/// A token source over a prepared list of tokens.
pub struct TokenList {
    tokens: std::vec::IntoIter<Token>,
    last_span: Span,
}

impl TokenList {
    pub fn new(tokens: Vec<Token>) -> TokenList {
        TokenList {
            tokens: tokens.into_iter(),
            last_span: INVALID_SPAN,
        }
    }
}

impl TokenSource for TokenList {
    fn next_token(&mut self) -> Token {
        match self.tokens.next() {
            Some(t) => {
                self.last_span = t.span;
                t
            }
            None => Token::eof(self.last_span.end().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(Kw::from_str("BEGIN"), Some(Kw::Begin));
        assert_eq!(Kw::from_str("While"), Some(Kw::While));
        assert_eq!(Kw::from_str("writeln"), None);
        assert!(Kw::Div.is_operator());
        assert!(!Kw::Then.is_operator());
    }

    #[test]
    fn token_list_ends_with_eof() {
        let mut list = TokenList::new(vec![Token::new(Category::IntLit, "1", INVALID_SPAN)]);
        assert_eq!(list.next_token().text, "1");
        assert!(list.next_token().is_eof());
        assert!(list.next_token().is_eof());
    }

    #[test]
    fn display() {
        assert_eq!(
            format!("{}", Token::new(Category::Symbol, ":=", INVALID_SPAN)),
            "`:=`"
        );
        assert_eq!(
            format!("{}", Token::keyword(Kw::Begin, INVALID_SPAN)),
            "keyword `begin`"
        );
        assert_eq!(
            format!("{}", Token::new(Category::Ident, "x", INVALID_SPAN)),
            "identifier `x`"
        );
    }
}
