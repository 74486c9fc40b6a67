// Copyright (c) 2016-2020 Fabian Schuiki

//! The prediction table mapping (nonterminal, terminal) to a rule.

use crate::ll::grammar::{Grammar, Nonterm, RuleId, Terminal};
use crate::ll::sets::Analysis;
use itertools::Itertools;
use pasc_common::errors::{DiagBuilder2, DiagEmitter};
use std::collections::BTreeMap;
use std::fmt;

/// Two rules predicted for the same cell. The later rule wins.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Collision {
    pub nonterm: Nonterm,
    pub terminal: Terminal,
    pub previous: RuleId,
    pub winner: RuleId,
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct PredictionTable {
    cells: BTreeMap<Nonterm, BTreeMap<Terminal, RuleId>>,
    collisions: Vec<Collision>,
}

impl PredictionTable {
    /// Fill the table from the PREDICT sets, in rule order.
    pub fn build<N>(grammar: &Grammar<N>, analysis: &Analysis) -> PredictionTable {
        let mut table = PredictionTable::default();
        for (id, rule) in grammar.iter() {
            let row = table.cells.entry(rule.name).or_insert_with(BTreeMap::new);
            for term in &analysis.predict[id.0] {
                if let Some(previous) = row.insert(term.clone(), id) {
                    if previous != id {
                        warn!(
                            "LL(1) collision on ({}, {}): `{}` replaces `{}`",
                            rule.name,
                            term,
                            rule,
                            grammar.rule(previous)
                        );
                        table.collisions.push(Collision {
                            nonterm: rule.name,
                            terminal: term.clone(),
                            previous,
                            winner: id,
                        });
                    }
                }
            }
        }
        debug!(
            "Prediction table has {} cells, {} collisions",
            table.len(),
            table.collisions.len()
        );
        table
    }

    /// Look up the rule to expand `nonterm` with when `terminal` is next.
    pub fn get(&self, nonterm: Nonterm, terminal: &Terminal) -> Option<RuleId> {
        self.cells.get(&nonterm).and_then(|row| row.get(terminal)).cloned()
    }

    /// The terminals for which `nonterm` has an entry.
    pub fn expected(&self, nonterm: Nonterm) -> impl Iterator<Item = &Terminal> {
        self.cells.get(&nonterm).into_iter().flat_map(|row| row.keys())
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// The number of filled cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Emit one warning per collision.
    pub fn report<N>(&self, grammar: &Grammar<N>, diag: &dyn DiagEmitter) {
        for c in &self.collisions {
            diag.emit(
                DiagBuilder2::warning(format!(
                    "grammar is not LL(1): {} on {} predicts more than one rule",
                    c.nonterm, c.terminal
                ))
                .add_note(format!("using `{}`", grammar.rule(c.winner)))
                .add_note(format!("instead of `{}`", grammar.rule(c.previous))),
            );
        }
    }

    /// Render the table with the full rules in each cell.
    pub fn display<'a, N>(&'a self, grammar: &'a Grammar<N>) -> TableDisplay<'a, N> {
        TableDisplay {
            table: self,
            grammar,
        }
    }
}

pub struct TableDisplay<'a, N> {
    table: &'a PredictionTable,
    grammar: &'a Grammar<N>,
}

impl<N> fmt::Display for TableDisplay<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (nt, row) in &self.table.cells {
            writeln!(f, "{}:", nt)?;
            for (rule, terms) in &row.iter().group_by(|&(_, id)| *id) {
                writeln!(
                    f,
                    "    {} => {}",
                    terms.map(|(t, _)| t).format(" "),
                    self.grammar.rule(rule)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ll::grammar::{lit, nt, Rule, Symbol};
    use crate::ll::value::{ReduceError, Value};
    use pasc_common::errors::DiagCollector;

    fn unit(_: Vec<Value<()>>) -> Result<Value<()>, ReduceError> {
        Ok(Value::Unit)
    }

    fn term(s: &'static str) -> Terminal {
        match lit(s) {
            Symbol::Term(t) => t,
            _ => unreachable!(),
        }
    }

    #[test]
    fn balanced_parens() {
        let g = Grammar::new(
            "S",
            vec![
                Rule::new("S", vec![lit("("), nt("S"), lit(")"), nt("S")]).reduce(unit),
                Rule::epsilon("S"),
            ],
        )
        .unwrap();
        let a = Analysis::compute(&g);
        let t = PredictionTable::build(&g, &a);
        assert_eq!(t.get(Nonterm("S"), &term("(")), Some(RuleId(0)));
        assert_eq!(t.get(Nonterm("S"), &term(")")), Some(RuleId(1)));
        assert_eq!(t.get(Nonterm("S"), &Terminal::EOF), Some(RuleId(1)));
        assert_eq!(t.get(Nonterm("S"), &term("x")), None);
        assert!(t.collisions().is_empty());
        assert_eq!(t, PredictionTable::build(&g, &Analysis::compute(&g)));
    }

    #[test]
    fn later_rule_wins() {
        let g = Grammar::new(
            "S",
            vec![
                Rule::new("S", vec![lit("a"), lit("b")]).reduce(unit),
                Rule::new("S", vec![lit("a"), lit("c")]).reduce(unit),
            ],
        )
        .unwrap();
        let t = PredictionTable::build(&g, &Analysis::compute(&g));
        assert_eq!(t.get(Nonterm("S"), &term("a")), Some(RuleId(1)));
        assert_eq!(
            t.collisions(),
            &[Collision {
                nonterm: Nonterm("S"),
                terminal: term("a"),
                previous: RuleId(0),
                winner: RuleId(1),
            }]
        );
        let diag = DiagCollector::new();
        t.report(&g, &diag);
        assert_eq!(diag.len_at_least(pasc_common::errors::Severity::Warning), 1);
        assert!(!diag.is_error());
    }
}
