// Copyright (c) 2016-2020 Fabian Schuiki

//! Values flowing through the gatherers, and the reducer contract.

use crate::token::Token;
use pasc_common::source::Span;
use std::fmt;
use std::sync::Arc;

/// A function that synthesizes a rule's value from its collected slots.
pub type Reducer<N> = Arc<dyn Fn(Vec<Value<N>>) -> Result<Value<N>, ReduceError> + Send + Sync>;

/// A value produced by matching a terminal or reducing a rule.
#[derive(Clone, PartialEq, Debug)]
pub enum Value<N> {
    /// A matched token.
    Token(Token),
    /// A tree node built by a reducer.
    Node(N),
    /// A sequence of values, typically built by list rules.
    List(Vec<Value<N>>),
    /// A marker standing in for a subtree that failed to parse.
    Error(ErrorMarker),
    /// The value of an empty match.
    Unit,
}

impl<N> Value<N> {
    /// A short name for the kind of value, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Token(_) => "token",
            Value::Node(_) => "node",
            Value::List(_) => "list",
            Value::Error(_) => "error",
            Value::Unit => "unit",
        }
    }

    pub fn into_token(self) -> Result<Token, ReduceError> {
        match self {
            Value::Token(t) => Ok(t),
            v => Err(ReduceError::mismatch("token", &v)),
        }
    }

    pub fn into_node(self) -> Result<N, ReduceError> {
        match self {
            Value::Node(n) => Ok(n),
            v => Err(ReduceError::mismatch("node", &v)),
        }
    }

    /// Unwrap a list. An empty match yields an empty list.
    pub fn into_list(self) -> Result<Vec<Value<N>>, ReduceError> {
        match self {
            Value::List(l) => Ok(l),
            Value::Unit => Ok(Vec::new()),
            v => Err(ReduceError::mismatch("list", &v)),
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            Value::Error(_) => true,
            _ => false,
        }
    }

    pub fn is_unit(&self) -> bool {
        match self {
            Value::Unit => true,
            _ => false,
        }
    }

    pub fn error_marker(&self) -> Option<&ErrorMarker> {
        match self {
            Value::Error(m) => Some(m),
            _ => None,
        }
    }
}

/// Records where a subtree failed to parse.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ErrorMarker {
    /// The span of the offending token.
    pub span: Span,
    /// The text of the offending token.
    pub found: String,
    /// What the parser expected instead. Empty until recovery fills it in.
    pub expected: String,
}

impl ErrorMarker {
    pub fn new(token: &Token) -> ErrorMarker {
        ErrorMarker {
            span: token.span,
            found: token.text.clone(),
            expected: String::new(),
        }
    }
}

impl fmt::Display for ErrorMarker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.expected.is_empty() {
            write!(f, "<error at `{}`>", self.found)
        } else {
            write!(f, "<error at `{}`, expected {}>", self.found, self.expected)
        }
    }
}

/// A reducer refusing its inputs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ReduceError {
    /// A slot held a different kind of value than the reducer expects.
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The inputs are malformed in some other way.
    Invalid(String),
}

impl ReduceError {
    pub fn mismatch<N>(expected: &'static str, found: &Value<N>) -> ReduceError {
        ReduceError::Mismatch {
            expected,
            found: found.kind(),
        }
    }
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReduceError::Mismatch { expected, found } => {
                write!(f, "expected {} value, found {}", expected, found)
            }
            ReduceError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ReduceError {}

/// Takes a reducer's collected values apart, in order.
///
/// ```ignore
/// let mut args = Args::new(values);
/// let name = args.token()?;
/// let body = args.node()?;
/// ```
pub struct Args<N> {
    values: std::vec::IntoIter<Value<N>>,
}

impl<N> Args<N> {
    pub fn new(values: Vec<Value<N>>) -> Args<N> {
        Args {
            values: values.into_iter(),
        }
    }

    /// The next value, whatever its kind.
    pub fn value(&mut self) -> Result<Value<N>, ReduceError> {
        self.values
            .next()
            .ok_or_else(|| ReduceError::Invalid("too few values collected".into()))
    }

    pub fn token(&mut self) -> Result<Token, ReduceError> {
        self.value()?.into_token()
    }

    pub fn node(&mut self) -> Result<N, ReduceError> {
        self.value()?.into_node()
    }

    pub fn list(&mut self) -> Result<Vec<Value<N>>, ReduceError> {
        self.value()?.into_list()
    }

    /// The number of values not yet taken.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Category;
    use pasc_common::source::INVALID_SPAN;

    #[test]
    fn accessors() {
        let tkn = Token::new(Category::Ident, "x", INVALID_SPAN);
        let v: Value<u32> = Value::Token(tkn.clone());
        assert_eq!(v.clone().into_token(), Ok(tkn));
        assert_eq!(
            v.into_node(),
            Err(ReduceError::Mismatch {
                expected: "node",
                found: "token"
            })
        );
        assert_eq!(Value::<u32>::Unit.into_list(), Ok(vec![]));
    }

    #[test]
    fn args_in_order() {
        let mut args = Args::new(vec![Value::Node(1u32), Value::List(vec![])]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.node(), Ok(1));
        assert_eq!(args.list(), Ok(vec![]));
        assert!(args.is_empty());
        assert!(args.value().is_err());
    }
}
