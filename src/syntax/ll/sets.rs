// Copyright (c) 2016-2020 Fabian Schuiki

//! The Nullable, FIRST, FOLLOW, and PREDICT sets of a grammar.

use crate::ll::grammar::{Grammar, Nonterm, Symbol, Terminal};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A FIRST set: the terminals a sequence can start with, and whether it can
/// derive the empty string.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct TermSet {
    pub terms: BTreeSet<Terminal>,
    pub epsilon: bool,
}

impl TermSet {
    /// Merge another set into this one. Returns whether anything was added.
    pub fn merge(&mut self, other: &TermSet) -> bool {
        let before = (self.terms.len(), self.epsilon);
        self.terms.extend(other.terms.iter().cloned());
        self.epsilon |= other.epsilon;
        before != (self.terms.len(), self.epsilon)
    }
}

impl fmt::Display for TermSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let eps = if self.epsilon { Some("ε") } else { None };
        write!(
            f,
            "{{{}}}",
            self.terms
                .iter()
                .map(|t| t.to_string())
                .chain(eps.map(String::from))
                .format(", ")
        )
    }
}

/// The result of the grammar analysis.
///
/// Every map is keyed and iterated in a fixed order, such that two analyses of
/// the same grammar are equal.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Analysis {
    pub nonterms: BTreeSet<Nonterm>,
    pub terminals: BTreeSet<Terminal>,
    pub nullable: BTreeMap<Nonterm, bool>,
    pub first: BTreeMap<Symbol, TermSet>,
    pub follow: BTreeMap<Nonterm, BTreeSet<Terminal>>,
    /// The PREDICT set of each rule, indexed by rule ID.
    pub predict: Vec<BTreeSet<Terminal>>,
}

impl Analysis {
    /// Partition the grammar's symbols and seed the sets, without running
    /// any of the fixed-point passes.
    pub fn new<N>(grammar: &Grammar<N>) -> Analysis {
        let nonterms: BTreeSet<Nonterm> = grammar.rules().iter().map(|r| r.name).collect();
        let mut terminals = BTreeSet::new();
        for rule in grammar.rules() {
            for sym in &rule.production {
                if let Symbol::Term(t) = sym {
                    terminals.insert(t.clone());
                }
            }
        }

        let nullable = nonterms
            .iter()
            .map(|&nt| (nt, grammar.alternatives(nt).any(|(_, r)| r.is_epsilon())))
            .collect();
        let mut first: BTreeMap<Symbol, TermSet> = BTreeMap::new();
        first.insert(
            Symbol::Epsilon,
            TermSet {
                terms: BTreeSet::new(),
                epsilon: true,
            },
        );
        for t in &terminals {
            first.insert(
                Symbol::Term(t.clone()),
                TermSet {
                    terms: Some(t.clone()).into_iter().collect(),
                    epsilon: false,
                },
            );
        }
        for &nt in &nonterms {
            first.insert(Symbol::Nonterm(nt), TermSet::default());
        }
        let follow = nonterms.iter().map(|&nt| (nt, BTreeSet::new())).collect();

        Analysis {
            nonterms,
            terminals,
            nullable,
            first,
            follow,
            predict: vec![BTreeSet::new(); grammar.rules().len()],
        }
    }

    /// Run all passes to their fixed points and compute the PREDICT sets.
    pub fn compute<N>(grammar: &Grammar<N>) -> Analysis {
        let mut analysis = Analysis::new(grammar);
        let passes = fixpoint(|| analysis.nullable_pass(grammar));
        debug!("Nullable settled after {} passes", passes);
        let passes = fixpoint(|| analysis.first_pass(grammar));
        debug!("FIRST settled after {} passes", passes);
        let passes = fixpoint(|| analysis.follow_pass(grammar));
        debug!("FOLLOW settled after {} passes", passes);
        analysis.compute_predict(grammar);
        analysis
    }

    /// Whether a symbol can derive the empty string.
    pub fn is_nullable(&self, sym: &Symbol) -> bool {
        match sym {
            Symbol::Epsilon => true,
            Symbol::Term(_) => false,
            Symbol::Nonterm(nt) => self.nullable.get(nt).cloned().unwrap_or(false),
        }
    }

    /// The FIRST set of a single symbol.
    pub fn first_of(&self, sym: &Symbol) -> TermSet {
        match (self.first.get(sym), sym) {
            (Some(set), _) => set.clone(),
            (None, Symbol::Term(t)) => TermSet {
                terms: Some(t.clone()).into_iter().collect(),
                epsilon: false,
            },
            (None, _) => TermSet::default(),
        }
    }

    /// The FIRST set of a sequence of symbols. The empty sequence is nullable.
    pub fn first_of_seq(&self, syms: &[Symbol]) -> TermSet {
        let mut set = TermSet::default();
        for sym in syms {
            if sym.is_epsilon() {
                continue;
            }
            set.terms.extend(self.first_of(sym).terms);
            if !self.is_nullable(sym) {
                return set;
            }
        }
        set.epsilon = true;
        set
    }

    /// A nonterminal becomes nullable once one of its productions consists
    /// of nullable symbols only. Returns whether anything changed.
    pub fn nullable_pass<N>(&mut self, grammar: &Grammar<N>) -> bool {
        let mut changed = false;
        for rule in grammar.rules() {
            if self.is_nullable(&Symbol::Nonterm(rule.name)) {
                continue;
            }
            if rule.production.iter().all(|s| self.is_nullable(s)) {
                trace!("{} is nullable", rule.name);
                self.nullable.insert(rule.name, true);
                changed = true;
            }
        }
        changed
    }

    /// Propagate FIRST sets through every production once. Returns whether
    /// anything changed.
    pub fn first_pass<N>(&mut self, grammar: &Grammar<N>) -> bool {
        let mut changed = false;
        for rule in grammar.rules() {
            let set = self.first_of_seq(&rule.production);
            let entry = self
                .first
                .entry(Symbol::Nonterm(rule.name))
                .or_insert_with(TermSet::default);
            if entry.merge(&set) {
                trace!("FIRST({}) = {}", rule.name, entry);
                changed = true;
            }
        }
        changed
    }

    /// Propagate FOLLOW sets through every production once. Returns whether
    /// anything changed.
    pub fn follow_pass<N>(&mut self, grammar: &Grammar<N>) -> bool {
        let mut changed = false;
        for rule in grammar.rules() {
            for (i, sym) in rule.production.iter().enumerate() {
                let nt = match *sym {
                    Symbol::Nonterm(nt) => nt,
                    _ => continue,
                };
                let rest = self.first_of_seq(&rule.production[i + 1..]);
                let mut add = rest.terms;
                if rest.epsilon {
                    if let Some(parent) = self.follow.get(&rule.name) {
                        add.extend(parent.iter().cloned());
                    }
                }
                let entry = self.follow.entry(nt).or_insert_with(BTreeSet::new);
                let before = entry.len();
                entry.extend(add);
                if entry.len() != before {
                    trace!("FOLLOW({}) grew to {} terminals", nt, entry.len());
                    changed = true;
                }
            }
        }
        changed
    }

    /// Compute the PREDICT set of every rule from the settled FIRST and
    /// FOLLOW sets.
    pub fn compute_predict<N>(&mut self, grammar: &Grammar<N>) {
        let mut predict = Vec::with_capacity(grammar.rules().len());
        for rule in grammar.rules() {
            let first = self.first_of_seq(&rule.production);
            let mut set = first.terms;
            if first.epsilon {
                if let Some(follow) = self.follow.get(&rule.name) {
                    set.extend(follow.iter().cloned());
                }
            }
            predict.push(set);
        }
        self.predict = predict;
    }

    /// The FOLLOW set of a nonterminal.
    pub fn follow_of(&self, nt: Nonterm) -> Option<&BTreeSet<Terminal>> {
        self.follow.get(&nt)
    }
}

/// Run a pass until it reports no change. Returns the number of passes.
fn fixpoint<F: FnMut() -> bool>(mut pass: F) -> usize {
    let mut passes = 1;
    while pass() {
        passes += 1;
    }
    passes
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for nt in &self.nonterms {
            let first = self
                .first
                .get(&Symbol::Nonterm(*nt))
                .cloned()
                .unwrap_or_default();
            let follow = self.follow.get(nt).cloned().unwrap_or_default();
            writeln!(
                f,
                "{}: nullable={} first={} follow={{{}}}",
                nt,
                self.is_nullable(&Symbol::Nonterm(*nt)),
                first,
                follow.iter().format(", ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ll::grammar::{lit, nt, Rule};
    use crate::ll::value::{ReduceError, Value};

    fn unit(_: Vec<Value<()>>) -> Result<Value<()>, ReduceError> {
        Ok(Value::Unit)
    }

    fn term(s: &'static str) -> Terminal {
        match lit(s) {
            Symbol::Term(t) => t,
            _ => unreachable!(),
        }
    }

    fn chain() -> Grammar<()> {
        Grammar::new(
            "A",
            vec![
                Rule::new("A", vec![nt("B")]).reduce(unit),
                Rule::new("B", vec![nt("C")]).reduce(unit),
                Rule::epsilon("C"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn nullable_chain() {
        let g = chain();
        let a = Analysis::compute(&g);
        for &name in &["A", "B", "C"] {
            assert!(a.is_nullable(&nt(name)), "{} should be nullable", name);
        }
        assert!(!a.is_nullable(&Symbol::Nonterm(crate::ll::grammar::ACCEPT)));
        assert!(a.follow[&Nonterm("C")].contains(&Terminal::EOF));
    }

    #[test]
    fn passes_are_monotonic() {
        let g = Grammar::new(
            "S",
            vec![
                Rule::new("S", vec![nt("T"), lit("x")]).reduce(unit),
                Rule::new("T", vec![lit("t"), nt("T")]).reduce(unit),
                Rule::epsilon("T"),
            ],
        )
        .unwrap();
        let mut a = Analysis::new(&g);
        loop {
            let before = a.clone();
            let changed = a.nullable_pass(&g);
            for (nt, &was) in &before.nullable {
                assert!(!was || a.nullable[nt]);
            }
            if !changed {
                assert_eq!(before, a);
                break;
            }
        }
        loop {
            let before = a.clone();
            let changed = a.first_pass(&g);
            for (sym, set) in &before.first {
                assert!(set.terms.is_subset(&a.first[sym].terms));
            }
            if !changed {
                break;
            }
        }
        loop {
            let before = a.clone();
            let changed = a.follow_pass(&g);
            for (nt, set) in &before.follow {
                assert!(set.is_subset(&a.follow[nt]));
            }
            if !changed {
                break;
            }
        }
        a.compute_predict(&g);
        assert_eq!(a, Analysis::compute(&g));
        assert_eq!(
            a.first[&nt("S")].terms,
            vec![term("t"), term("x")].into_iter().collect()
        );
        assert_eq!(
            a.follow[&Nonterm("T")],
            Some(term("x")).into_iter().collect()
        );
    }

    #[test]
    fn predict_walks_through_nullable_suffix() {
        // S -> A B 'c' ; A -> 'a' | ε ; B -> 'b' | ε
        let g = Grammar::new(
            "S",
            vec![
                Rule::new("S", vec![nt("A"), nt("B"), lit("c")]).reduce(unit),
                Rule::new("A", vec![lit("a")]).reduce(unit),
                Rule::epsilon("A"),
                Rule::new("B", vec![lit("b")]).reduce(unit),
                Rule::epsilon("B"),
            ],
        )
        .unwrap();
        let a = Analysis::compute(&g);
        let eps_a = g
            .alternatives(Nonterm("A"))
            .find(|(_, r)| r.is_epsilon())
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(
            a.predict[eps_a.0],
            vec![term("b"), term("c")].into_iter().collect()
        );
        assert_eq!(
            a.predict[0],
            vec![term("a"), term("b"), term("c")].into_iter().collect()
        );
    }

    #[test]
    fn analysis_is_deterministic() {
        assert_eq!(Analysis::compute(&chain()), Analysis::compute(&chain()));
    }
}
