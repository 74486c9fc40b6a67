// Copyright (c) 2016-2020 Fabian Schuiki

//! Panic-mode error recovery.
//!
//! When the lookahead does not fit the symbol on top of the stack, the rest of
//! the failing rule is abandoned and an error marker takes the place of its
//! value. The parser then looks for the innermost enclosing rule whose next
//! symbol accepts the lookahead, discarding tokens until one does. Matching
//! then resumes in that rule, with the error marker filling the slot of the
//! child it was waiting for.

use crate::ll::gather::Frame;
use crate::ll::grammar::Symbol;
use crate::ll::parser::{Automaton, ParseError};
use crate::ll::value::{ErrorMarker, Value};
use crate::token::{Token, TokenSource};
use itertools::Itertools;
use pasc_common::errors::DiagBuilder2;

impl<'a, N, S: TokenSource> Automaton<'a, N, S> {
    /// Recover from a mismatch against `expected`.
    ///
    /// Returns the final value if nothing on the stack accepts even the end
    /// of the input, in which case the parse is over.
    pub(super) fn recover(&mut self, expected: &Symbol) -> Result<Option<Value<N>>, ParseError> {
        let found = self.lookahead.clone();
        let mut d = DiagBuilder2::error(format!("expected {}, found {}", expected, found))
            .span(found.span);
        if let Symbol::Nonterm(nt) = *expected {
            let terms = self.parser.table().expected(nt).format(", ").to_string();
            if !terms.is_empty() {
                d = d.add_note(format!("{} starts with one of: {}", nt, terms));
            }
        }
        self.diag.emit(d);
        self.syntax_errors += 1;

        // Abandon the rest of the failing rule.
        let owned = self.frames.last().map_or(0, Frame::remaining);
        let keep = self.stack.len().saturating_sub(owned);
        self.stack.truncate(keep);

        let mut marker = self.error_marker(&found)?;
        marker.expected = expected.to_string();
        if !found.is_eof() {
            self.bump();
        }

        let mut discarded = 0;
        loop {
            if let Some((index, above)) = self.find_resumption() {
                if discarded > 0 {
                    debug!("skipped {} tokens to resume at {}", discarded, self.lookahead);
                    if self.lookahead.is_eof() {
                        self.exhausted = true;
                    }
                }
                self.resume(index, above, marker);
                return Ok(None);
            }
            if self.lookahead.is_eof() {
                debug!("nothing accepts the end of input, giving up");
                self.exhausted = true;
                self.stack.clear();
                self.frames.clear();
                return Ok(Some(Value::Error(marker)));
            }
            trace!("discarding {:?}", self.lookahead);
            self.bump();
            discarded += 1;
        }
    }

    /// Turn the offending token into an error marker through the error rule.
    fn error_marker(&self, found: &Token) -> Result<ErrorMarker, ParseError> {
        let grammar = self.parser.grammar();
        let rule = grammar.rule(grammar.error_rule());
        let mut frame = Frame::new(grammar.error_rule(), rule);
        frame.accept(rule, Value::Token(found.to_error()));
        let value = frame.finish(rule).map_err(|error| ParseError::Reduce {
            rule: rule.to_string(),
            error,
        })?;
        Ok(match value {
            Value::Error(m) => m,
            _ => ErrorMarker::new(found),
        })
    }

    /// Find the innermost frame below the failing one whose next symbol
    /// accepts the lookahead.
    ///
    /// Every frame but the top one is waiting for the child above it, and
    /// owns one stack symbol less than it has slots remaining. Returns the
    /// frame's index and the number of stack symbols above its own.
    fn find_resumption(&self) -> Option<(usize, usize)> {
        let mut above = 0;
        for index in (0..self.frames.len().saturating_sub(1)).rev() {
            let owned = self.frames[index].remaining() - 1;
            if owned > 0 {
                let next = &self.stack[self.stack.len() - above - 1];
                if self.accepts(next) {
                    return Some((index, above));
                }
            }
            above += owned;
        }
        None
    }

    /// Whether the lookahead can start `sym`.
    fn accepts(&self, sym: &Symbol) -> bool {
        match sym {
            Symbol::Epsilon => false,
            Symbol::Term(term) => self.classify(sym) == *term,
            Symbol::Nonterm(nt) => self.parser.table().get(*nt, &self.classify(sym)).is_some(),
        }
    }

    /// Drop everything above frame `index` and fill the slot it is waiting
    /// for with the error marker.
    fn resume(&mut self, index: usize, above: usize, marker: ErrorMarker) {
        let keep = self.stack.len() - above;
        self.stack.truncate(keep);
        debug!(
            "resuming `{}` after dropping {} frames",
            self.parser.grammar().rule(self.frames[index].rule),
            self.frames.len() - index - 1
        );
        self.frames.truncate(index + 1);
        self.feed(Value::Error(marker));
    }
}

