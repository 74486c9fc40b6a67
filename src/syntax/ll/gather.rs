// Copyright (c) 2016-2020 Fabian Schuiki

//! Gatherer frames, which collect the values of one rule's slots.

use crate::ll::grammar::{Rule, RuleId};
use crate::ll::value::{ErrorMarker, ReduceError, Value};

/// The values collected so far for one rule being matched.
#[derive(Debug)]
pub struct Frame<N> {
    pub rule: RuleId,
    len: usize,
    slot: usize,
    values: Vec<Value<N>>,
    /// The first error that ended up in a slot that is not collected.
    taint: Option<ErrorMarker>,
    /// Whether any slot received an error, directly or through a child.
    tainted: bool,
}

impl<N> Frame<N> {
    pub fn new(id: RuleId, rule: &Rule<N>) -> Frame<N> {
        Frame {
            rule: id,
            len: rule.production.len(),
            slot: 0,
            values: Vec::with_capacity(rule.collect.iter().filter(|&&c| c).count()),
            taint: None,
            tainted: false,
        }
    }

    /// The number of slots not yet filled.
    pub fn remaining(&self) -> usize {
        self.len - self.slot
    }

    pub fn is_complete(&self) -> bool {
        self.slot >= self.len
    }

    /// Whether the value of this frame is built from malformed input. Once
    /// set, this sticks regardless of what the reducer makes of its inputs.
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Mark the frame as built from malformed input, as when a child frame
    /// that was tainted hands over its value.
    pub fn taint(&mut self) {
        self.tainted = true;
    }

    /// Fill the next slot, keeping the value if the rule collects it.
    pub fn accept(&mut self, rule: &Rule<N>, value: Value<N>) {
        debug_assert!(!self.is_complete());
        if value.is_error() {
            self.tainted = true;
        }
        if rule.collect[self.slot] {
            self.values.push(value);
        } else if let Value::Error(marker) = value {
            if self.taint.is_none() {
                self.taint = Some(marker);
            }
        }
        self.slot += 1;
    }

    /// Synthesize the rule's value from the collected slots.
    ///
    /// A frame that saw an error yields that error instead of its reducer's
    /// result whenever the error was not collected, or the reducer refuses
    /// its inputs. A refusal without any error among the inputs is returned
    /// as is. Check `is_tainted` before finishing to learn whether a value
    /// the reducer accepted was built from malformed input.
    pub fn finish(self, rule: &Rule<N>) -> Result<Value<N>, ReduceError> {
        if let Some(marker) = self.taint {
            return Ok(Value::Error(marker));
        }
        let marker = self
            .values
            .iter()
            .filter_map(Value::error_marker)
            .next()
            .cloned();
        let result = match rule.reducer {
            Some(ref reducer) => reducer(self.values),
            None => Ok(Value::Unit),
        };
        match (result, marker) {
            (Ok(value), _) => Ok(value),
            (Err(err), Some(marker)) => {
                trace!("`{}` refused error input: {}", rule, err);
                Ok(Value::Error(marker))
            }
            (Err(err), None) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ll::grammar::lit;
    use crate::ll::value::Args;
    use crate::token::{Category, Token};
    use pasc_common::source::INVALID_SPAN;

    fn pair() -> Rule<i64> {
        Rule::new("P", vec![lit("("), lit("x"), lit(")")])
            .collect(&[false, true, false])
            .reduce(|v| Ok(Value::Node(Args::new(v).node()? * 2)))
    }

    fn marker() -> ErrorMarker {
        ErrorMarker::new(&Token::new(Category::Error, "?", INVALID_SPAN))
    }

    #[test]
    fn collects_masked_slots() {
        let rule = pair();
        let mut f = Frame::new(RuleId(0), &rule);
        assert_eq!(f.remaining(), 3);
        f.accept(&rule, Value::Unit);
        f.accept(&rule, Value::Node(21));
        assert!(!f.is_complete());
        f.accept(&rule, Value::Unit);
        assert!(f.is_complete());
        assert_eq!(f.finish(&rule), Ok(Value::Node(42)));
    }

    #[test]
    fn uncollected_error_taints() {
        let rule = pair();
        let mut f = Frame::new(RuleId(0), &rule);
        f.accept(&rule, Value::Unit);
        f.accept(&rule, Value::Node(1));
        f.accept(&rule, Value::Error(marker()));
        assert_eq!(f.finish(&rule), Ok(Value::Error(marker())));
    }

    #[test]
    fn refused_error_propagates() {
        let rule = pair();
        let mut f = Frame::new(RuleId(0), &rule);
        f.accept(&rule, Value::Unit);
        f.accept(&rule, Value::Error(marker()));
        f.accept(&rule, Value::Unit);
        assert_eq!(f.finish(&rule), Ok(Value::Error(marker())));
    }

    #[test]
    fn collected_error_taints_even_if_reducer_accepts() {
        let rule: Rule<i64> = Rule::new("P", vec![lit("("), lit("x"), lit(")")])
            .collect(&[false, true, false])
            .reduce(|v| Ok(Value::Node(v.len() as i64)));
        let mut f = Frame::new(RuleId(0), &rule);
        f.accept(&rule, Value::Unit);
        assert!(!f.is_tainted());
        f.accept(&rule, Value::Error(marker()));
        f.accept(&rule, Value::Unit);
        assert!(f.is_tainted());
        assert_eq!(f.finish(&rule), Ok(Value::Node(1)));
    }

    #[test]
    fn refusal_without_error_is_reported() {
        let rule = pair();
        let mut f = Frame::new(RuleId(0), &rule);
        f.accept(&rule, Value::Unit);
        f.accept(&rule, Value::Unit);
        f.accept(&rule, Value::Unit);
        assert_eq!(
            f.finish(&rule),
            Err(ReduceError::Mismatch {
                expected: "node",
                found: "unit"
            })
        );
    }
}
