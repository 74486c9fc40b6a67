// Copyright (c) 2016-2020 Fabian Schuiki

//! The Pascal subset: its grammar and abstract syntax tree, and a parser
//! built from them once per process.

pub mod ast;
mod grammar;

pub use self::grammar::{grammar, TYPE_POSITIONS};

use self::ast::{Builtin, Node, Program};
use crate::lexer::Lexer;
use crate::ll::{
    ErrorMarker, GrammarError, LlParser, ParseError, ReduceError, TypeNameClassifier, Value,
};
use crate::token::TokenSource;
use once_cell::sync::Lazy;
use pasc_common::errors::DiagEmitter;
use pasc_common::source::Source;

static PARSER: Lazy<Result<LlParser<Node>, GrammarError>> = Lazy::new(|| {
    let parser = LlParser::with_classifier(grammar()?, type_names());
    info!(
        "Built Pascal parser: {} rules, {} table cells",
        parser.grammar().rules().len(),
        parser.table().len()
    );
    Ok(parser)
});

/// The classifier that lets builtin type names be used where a type is
/// expected.
pub fn type_names() -> TypeNameClassifier {
    TypeNameClassifier::new(TYPE_POSITIONS.iter().cloned(), Builtin::NAMES.iter())
}

/// The shared Pascal parser.
pub fn parser() -> Result<&'static LlParser<Node>, ParseError> {
    PARSER.as_ref().map_err(|err| ParseError::Grammar(err.clone()))
}

/// A parsed source file.
///
/// Input trailing the program's final `.` is reported and counted in
/// `syntax_errors` but leaves no marker in the tree. Use `is_clean` rather
/// than `error_count` to decide whether the file was well formed.
#[derive(Debug)]
pub struct ParsedProgram {
    /// The program, or the error marker that replaced it if not even the
    /// program header could be matched.
    pub program: Result<Program, ErrorMarker>,
    pub syntax_errors: usize,
    pub exhausted: bool,
    /// Whether the program was built from input containing an error.
    pub tainted: bool,
}

impl ParsedProgram {
    /// The number of error markers in the tree.
    pub fn error_count(&self) -> usize {
        match self.program {
            Ok(ref p) => p.error_count(),
            Err(_) => 1,
        }
    }

    /// Whether the file parsed without any syntax errors, including input
    /// trailing the program.
    pub fn is_clean(&self) -> bool {
        self.syntax_errors == 0
    }
}

/// Parse a source file.
pub fn parse(src: Source, diag: &dyn DiagEmitter) -> Result<ParsedProgram, ParseError> {
    parse_tokens(Lexer::new(src, diag), diag)
}

/// Parse the tokens produced by a token source.
pub fn parse_tokens<S: TokenSource>(
    tokens: S,
    diag: &dyn DiagEmitter,
) -> Result<ParsedProgram, ParseError> {
    let parsed = parser()?.parse(tokens, diag)?;
    let program = match parsed.value {
        Value::Node(Node::Program(p)) => Ok(p),
        Value::Error(m) => Err(m),
        v => {
            return Err(ParseError::Reduce {
                rule: "<accept>".into(),
                error: ReduceError::mismatch("program", &v),
            })
        }
    };
    Ok(ParsedProgram {
        program,
        syntax_errors: parsed.syntax_errors,
        exhausted: parsed.exhausted,
        tainted: parsed.tainted,
    })
}
