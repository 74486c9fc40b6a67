// Copyright (c) 2016-2020 Fabian Schuiki

//! The table-driven stack automaton.

use crate::ll::classify::{Classifier, TokenClassifier};
use crate::ll::gather::Frame;
use crate::ll::grammar::{Grammar, GrammarError, RuleId, Symbol, Terminal};
use crate::ll::sets::Analysis;
use crate::ll::table::PredictionTable;
use crate::ll::value::{ReduceError, Value};
use crate::token::{Token, TokenSource};
use pasc_common::errors::{DiagBuilder2, DiagEmitter};
use std::fmt;

/// An LL(1) parser for one grammar.
///
/// The sets and the prediction table are computed once on construction and
/// never change afterwards. Every call to `parse` runs on its own stacks, so a
/// parser may be shared between threads and used for several parses at once.
pub struct LlParser<N> {
    grammar: Grammar<N>,
    analysis: Analysis,
    table: PredictionTable,
    classifier: Box<dyn Classifier>,
}

impl<N> LlParser<N> {
    /// Build a parser that classifies tokens by category and text.
    pub fn new(grammar: Grammar<N>) -> LlParser<N> {
        LlParser::with_classifier(grammar, TokenClassifier)
    }

    /// Build a parser with a custom token classifier.
    pub fn with_classifier<C>(grammar: Grammar<N>, classifier: C) -> LlParser<N>
    where
        C: Classifier + 'static,
    {
        let analysis = Analysis::compute(&grammar);
        let table = PredictionTable::build(&grammar, &analysis);
        LlParser {
            grammar,
            analysis,
            table,
            classifier: Box::new(classifier),
        }
    }

    pub fn grammar(&self) -> &Grammar<N> {
        &self.grammar
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn table(&self) -> &PredictionTable {
        &self.table
    }

    pub fn classifier(&self) -> &dyn Classifier {
        &*self.classifier
    }

    /// Emit a warning for every prediction table collision.
    pub fn report_collisions(&self, diag: &dyn DiagEmitter) {
        self.table.report(&self.grammar, diag);
    }

    /// Parse the tokens produced by `tokens`.
    ///
    /// Syntax errors are reported to `diag` and recovered from. The only
    /// failure is a reducer refusing inputs that contain no error marker,
    /// which indicates a broken grammar.
    pub fn parse<S: TokenSource>(
        &self,
        tokens: S,
        diag: &dyn DiagEmitter,
    ) -> Result<Parsed<N>, ParseError> {
        Automaton::new(self, tokens, diag).run()
    }
}

/// The outcome of a parse.
#[derive(Debug)]
pub struct Parsed<N> {
    /// The value of the start symbol. This is an error marker if the input
    /// could not be matched against the start symbol at all.
    pub value: Value<N>,
    /// The number of syntax errors reported.
    pub syntax_errors: usize,
    /// Whether recovery had to discard tokens up to the end of the input.
    pub exhausted: bool,
    /// Whether `value` was built from input containing an error, even if
    /// every reducer on the way up accepted the error markers it was given.
    /// Input skipped after a complete start symbol does not taint the value;
    /// it only counts towards `syntax_errors`.
    pub tainted: bool,
}

impl<N> Parsed<N> {
    /// Whether the input parsed without any syntax errors, including input
    /// trailing a complete start symbol.
    pub fn is_clean(&self) -> bool {
        self.syntax_errors == 0
    }
}

/// A parse that could not produce a value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParseError {
    /// The grammar could not be turned into a parser.
    Grammar(GrammarError),
    /// A reducer refused inputs that contained no error marker.
    Reduce { rule: String, error: ReduceError },
    /// The automaton ran out of symbols before accepting.
    Incomplete,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Grammar(err) => write!(f, "invalid grammar: {}", err),
            ParseError::Reduce { rule, error } => {
                write!(f, "reducer of `{}` failed: {}", rule, error)
            }
            ParseError::Incomplete => write!(f, "parser stopped before accepting the input"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<GrammarError> for ParseError {
    fn from(err: GrammarError) -> ParseError {
        ParseError::Grammar(err)
    }
}

/// The state of a single parse.
pub(crate) struct Automaton<'a, N, S> {
    pub(super) parser: &'a LlParser<N>,
    pub(super) tokens: S,
    pub(super) diag: &'a dyn DiagEmitter,
    /// The symbols yet to be matched. The top is at the end.
    pub(super) stack: Vec<Symbol>,
    /// The gatherers of the rules being matched. The top is at the end.
    pub(super) frames: Vec<Frame<N>>,
    pub(super) lookahead: Token,
    pub(super) syntax_errors: usize,
    pub(super) exhausted: bool,
    pub(super) tainted: bool,
}

impl<'a, N, S: TokenSource> Automaton<'a, N, S> {
    fn new(parser: &'a LlParser<N>, mut tokens: S, diag: &'a dyn DiagEmitter) -> Self {
        let lookahead = tokens.next_token();
        Automaton {
            parser,
            tokens,
            diag,
            stack: Vec::new(),
            frames: Vec::new(),
            lookahead,
            syntax_errors: 0,
            exhausted: false,
            tainted: false,
        }
    }

    fn run(mut self) -> Result<Parsed<N>, ParseError> {
        self.push_rule(self.parser.grammar.accept_rule());
        while let Some(top) = self.stack.last().cloned() {
            trace!("top {}, lookahead {}", top, self.lookahead);
            match top {
                Symbol::Epsilon => {
                    self.stack.pop();
                    self.feed(Value::Unit);
                }
                Symbol::Term(ref term) => {
                    let found = self.classify(&top);
                    if found == *term {
                        self.stack.pop();
                        let token = self.bump();
                        self.feed(Value::Token(token));
                    } else if *term == Terminal::EOF && self.frames.len() == 1 {
                        self.skip_trailing();
                    } else if let Some(value) = self.recover(&top)? {
                        return Ok(self.finish(value));
                    }
                }
                Symbol::Nonterm(nt) => {
                    let found = self.classify(&top);
                    match self.parser.table.get(nt, &found) {
                        Some(id) => {
                            self.stack.pop();
                            self.push_rule(id);
                        }
                        None => {
                            if let Some(value) = self.recover(&top)? {
                                return Ok(self.finish(value));
                            }
                        }
                    }
                }
            }
            if let Some(value) = self.drain()? {
                return Ok(self.finish(value));
            }
        }
        Err(ParseError::Incomplete)
    }

    fn finish(&self, value: Value<N>) -> Parsed<N> {
        debug!(
            "Parse finished with {} syntax errors{}",
            self.syntax_errors,
            if self.exhausted { ", input exhausted" } else { "" }
        );
        Parsed {
            tainted: self.tainted || value.is_error(),
            value,
            syntax_errors: self.syntax_errors,
            exhausted: self.exhausted,
        }
    }

    /// Classify the lookahead in the context of an expected symbol.
    pub(super) fn classify(&self, expected: &Symbol) -> Terminal {
        self.parser.classifier.classify(expected, &self.lookahead)
    }

    /// Consume the lookahead and fetch the next token.
    pub(super) fn bump(&mut self) -> Token {
        let next = self.tokens.next_token();
        let token = std::mem::replace(&mut self.lookahead, next);
        trace!("consumed {:?}", token);
        token
    }

    /// Open a gatherer for a rule and push its production onto the stack.
    pub(super) fn push_rule(&mut self, id: RuleId) {
        let rule = self.parser.grammar.rule(id);
        debug!("predict `{}` on {}", rule, self.lookahead);
        self.frames.push(Frame::new(id, rule));
        self.stack.extend(rule.production.iter().rev().cloned());
    }

    /// Hand a value to the active gatherer.
    pub(super) fn feed(&mut self, value: Value<N>) {
        let grammar = &self.parser.grammar;
        if let Some(frame) = self.frames.last_mut() {
            frame.accept(grammar.rule(frame.rule), value);
        }
    }

    /// Reduce every completed gatherer on top of the frame stack. Returns the
    /// final value once the outermost gatherer completes.
    fn drain(&mut self) -> Result<Option<Value<N>>, ParseError> {
        let grammar = &self.parser.grammar;
        while self.frames.last().map_or(false, Frame::is_complete) {
            let frame = match self.frames.pop() {
                Some(f) => f,
                None => break,
            };
            let rule = grammar.rule(frame.rule);
            let tainted = frame.is_tainted();
            let value = frame.finish(rule).map_err(|error| ParseError::Reduce {
                rule: rule.to_string(),
                error,
            })?;
            trace!("reduced `{}`", rule);
            match self.frames.last_mut() {
                Some(parent) => {
                    parent.accept(grammar.rule(parent.rule), value);
                    if tainted {
                        parent.taint();
                    }
                }
                None => {
                    self.tainted = tainted;
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    /// Report input after a complete program once and skip it.
    fn skip_trailing(&mut self) {
        self.diag.emit(
            DiagBuilder2::error(format!("expected end of input, found {}", self.lookahead))
                .span(self.lookahead.span),
        );
        self.syntax_errors += 1;
        while !self.lookahead.is_eof() {
            self.bump();
        }
    }
}
