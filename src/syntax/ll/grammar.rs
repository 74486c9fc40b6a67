// Copyright (c) 2016-2020 Fabian Schuiki

//! Grammars as data: symbols, rules, and the validated rule registry.

use crate::ll::value::{ErrorMarker, ReduceError, Reducer, Value};
use crate::token::{Category, Kw};
use itertools::Itertools;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A nonterminal, identified by its name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Nonterm(pub &'static str);

impl fmt::Display for Nonterm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The nonterminal of the synthetic rule `<accept> -> Start <eof>`.
pub const ACCEPT: Nonterm = Nonterm("<accept>");

/// The nonterminal of the rule that turns an error token into an error marker.
pub const ERROR: Nonterm = Nonterm("<error>");

/// A terminal, i.e. the key a token is classified into.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Terminal {
    /// Any token of the given category.
    Category(Category),
    /// A token with exactly this text.
    Literal(Cow<'static, str>),
    /// A keyword token.
    Keyword(Kw),
}

impl Terminal {
    pub const EOF: Terminal = Terminal::Category(Category::Eof);
    pub const ERROR: Terminal = Terminal::Category(Category::Error);
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Terminal::Category(c) => write!(f, "{}", c),
            Terminal::Literal(s) => write!(f, "`{}`", s),
            Terminal::Keyword(kw) => write!(f, "`{}`", kw),
        }
    }
}

/// A symbol in a production.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Symbol {
    Epsilon,
    Term(Terminal),
    Nonterm(Nonterm),
}

impl Symbol {
    pub fn is_epsilon(&self) -> bool {
        *self == Symbol::Epsilon
    }
}

impl From<Terminal> for Symbol {
    fn from(x: Terminal) -> Self {
        Symbol::Term(x)
    }
}

impl From<Nonterm> for Symbol {
    fn from(x: Nonterm) -> Self {
        Symbol::Nonterm(x)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "ε"),
            Symbol::Term(x) => write!(f, "{}", x),
            Symbol::Nonterm(x) => write!(f, "{}", x),
        }
    }
}

/// A terminal matching a token by its text.
pub fn lit(text: &'static str) -> Symbol {
    Symbol::Term(Terminal::Literal(Cow::Borrowed(text)))
}

/// A terminal matching a keyword.
pub fn kw(kw: Kw) -> Symbol {
    Symbol::Term(Terminal::Keyword(kw))
}

/// A terminal matching any token of a category.
pub fn cat(category: Category) -> Symbol {
    Symbol::Term(Terminal::Category(category))
}

/// A nonterminal.
pub fn nt(name: &'static str) -> Symbol {
    Symbol::Nonterm(Nonterm(name))
}

/// The index of a rule in its grammar.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RuleId(pub usize);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One production of a nonterminal, together with the mask of slots whose
/// values are handed to the reducer.
pub struct Rule<N> {
    pub name: Nonterm,
    pub production: Vec<Symbol>,
    pub collect: Vec<bool>,
    pub reducer: Option<Reducer<N>>,
}

impl<N> Rule<N> {
    /// Create a rule that collects every slot. A reducer must be attached
    /// with `reduce` before the rule is usable in a grammar.
    pub fn new(name: &'static str, production: Vec<Symbol>) -> Rule<N> {
        let collect = vec![true; production.len()];
        Rule {
            name: Nonterm(name),
            production,
            collect,
            reducer: None,
        }
    }

    /// Create an epsilon rule. Without a reducer it synthesizes `Value::Unit`.
    pub fn epsilon(name: &'static str) -> Rule<N> {
        Rule {
            name: Nonterm(name),
            production: vec![Symbol::Epsilon],
            collect: vec![false],
            reducer: None,
        }
    }

    /// Set which slots of the production are passed to the reducer.
    pub fn collect(mut self, mask: &[bool]) -> Rule<N> {
        self.collect = mask.to_vec();
        self
    }

    /// Attach the function that synthesizes this rule's value.
    pub fn reduce<F>(mut self, f: F) -> Rule<N>
    where
        F: Fn(Vec<Value<N>>) -> Result<Value<N>, ReduceError> + Send + Sync + 'static,
    {
        self.reducer = Some(Arc::new(f));
        self
    }

    pub fn is_epsilon(&self) -> bool {
        self.production.len() == 1 && self.production[0].is_epsilon()
    }
}

impl<N> fmt::Display for Rule<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.production.iter().format(" "))
    }
}

impl<N> fmt::Debug for Rule<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("production", &self.production)
            .field("collect", &self.collect)
            .field("reducer", &self.reducer.is_some())
            .finish()
    }
}

/// A malformed rule set, found before any parsing starts.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GrammarError {
    /// A rule with a non-epsilon production has no reducer.
    MissingReducer { rule: String },
    /// The collect mask and the production differ in length.
    CollectMaskLength {
        rule: String,
        production: usize,
        mask: usize,
    },
    /// An epsilon appears in a production alongside other symbols.
    MisplacedEpsilon { rule: String },
    /// A production without any symbols. Use `Rule::epsilon` instead.
    EmptyProduction { name: Nonterm },
    /// A production refers to a nonterminal that has no rules.
    UndefinedNonterminal { name: Nonterm, rule: String },
    /// The start symbol has no rules.
    UndefinedStart { name: Nonterm },
    /// A rule uses one of the names reserved for synthetic rules.
    ReservedName { name: Nonterm },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::MissingReducer { rule } => write!(f, "rule `{}` has no reducer", rule),
            GrammarError::CollectMaskLength {
                rule,
                production,
                mask,
            } => write!(
                f,
                "rule `{}` has {} symbols but a collect mask of length {}",
                rule, production, mask
            ),
            GrammarError::MisplacedEpsilon { rule } => {
                write!(f, "rule `{}` mixes ε with other symbols", rule)
            }
            GrammarError::EmptyProduction { name } => {
                write!(f, "rule for `{}` has an empty production", name)
            }
            GrammarError::UndefinedNonterminal { name, rule } => write!(
                f,
                "nonterminal `{}` used in rule `{}` has no rules",
                name, rule
            ),
            GrammarError::UndefinedStart { name } => {
                write!(f, "start symbol `{}` has no rules", name)
            }
            GrammarError::ReservedName { name } => {
                write!(f, "`{}` is reserved for synthetic rules", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// A validated, immutable collection of rules.
///
/// Besides the user rules, every grammar carries two synthetic rules: the
/// accept rule `<accept> -> Start <eof>` which anchors the end of the input,
/// and the error rule `<error> -> error` which turns the error token inserted
/// during recovery into an error marker.
pub struct Grammar<N> {
    rules: Vec<Rule<N>>,
    start: Nonterm,
    accept: RuleId,
    error: RuleId,
}

impl<N> Grammar<N> {
    /// Validate a rule set and assemble it into a grammar.
    pub fn new(start: &'static str, mut rules: Vec<Rule<N>>) -> Result<Grammar<N>, GrammarError> {
        let start = Nonterm(start);
        let names: BTreeSet<Nonterm> = rules.iter().map(|r| r.name).collect();

        for rule in &rules {
            if rule.name.0.starts_with('<') {
                return Err(GrammarError::ReservedName { name: rule.name });
            }
            if rule.production.is_empty() {
                return Err(GrammarError::EmptyProduction { name: rule.name });
            }
            if rule.production.len() > 1 && rule.production.iter().any(Symbol::is_epsilon) {
                return Err(GrammarError::MisplacedEpsilon {
                    rule: rule.to_string(),
                });
            }
            if rule.collect.len() != rule.production.len() {
                return Err(GrammarError::CollectMaskLength {
                    rule: rule.to_string(),
                    production: rule.production.len(),
                    mask: rule.collect.len(),
                });
            }
            if !rule.is_epsilon() && rule.reducer.is_none() {
                return Err(GrammarError::MissingReducer {
                    rule: rule.to_string(),
                });
            }
            for sym in &rule.production {
                if let Symbol::Nonterm(name) = *sym {
                    if !names.contains(&name) {
                        return Err(GrammarError::UndefinedNonterminal {
                            name,
                            rule: rule.to_string(),
                        });
                    }
                }
            }
        }
        if !names.contains(&start) {
            return Err(GrammarError::UndefinedStart { name: start });
        }

        let accept = RuleId(rules.len());
        rules.push(
            Rule::new(ACCEPT.0, vec![Symbol::Nonterm(start), Symbol::Term(Terminal::EOF)])
                .collect(&[true, false])
                .reduce(|values| {
                    values
                        .into_iter()
                        .next()
                        .ok_or_else(|| ReduceError::Invalid("nothing to accept".into()))
                }),
        );
        let error = RuleId(rules.len());
        rules.push(
            Rule::new(ERROR.0, vec![Symbol::Term(Terminal::ERROR)]).reduce(|values| {
                let token = match values.into_iter().next() {
                    Some(v) => v.into_token()?,
                    None => return Err(ReduceError::Invalid("missing error token".into())),
                };
                Ok(Value::Error(ErrorMarker::new(&token)))
            }),
        );
        debug!(
            "Grammar has {} rules, {} nonterminals",
            rules.len(),
            names.len() + 2
        );

        Ok(Grammar {
            rules,
            start,
            accept,
            error,
        })
    }

    /// All rules, including the synthetic accept and error rules.
    pub fn rules(&self) -> &[Rule<N>] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> &Rule<N> {
        &self.rules[id.0]
    }

    /// Iterate over all rules together with their IDs.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule<N>)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    /// Iterate over the alternatives of a nonterminal.
    pub fn alternatives(&self, name: Nonterm) -> impl Iterator<Item = (RuleId, &Rule<N>)> {
        self.iter().filter(move |(_, r)| r.name == name)
    }

    pub fn start(&self) -> Nonterm {
        self.start
    }

    pub fn accept_rule(&self) -> RuleId {
        self.accept
    }

    pub fn error_rule(&self) -> RuleId {
        self.error
    }
}

impl<N> fmt::Display for Grammar<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, rule) in self.iter() {
            writeln!(f, "{:>4}  {}", id, rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(_: Vec<Value<()>>) -> Result<Value<()>, ReduceError> {
        Ok(Value::Unit)
    }

    #[test]
    fn synthetic_rules() {
        let g = Grammar::new("S", vec![Rule::new("S", vec![lit("a")]).reduce(unit)]).unwrap();
        assert_eq!(g.rules().len(), 3);
        assert_eq!(g.rule(g.accept_rule()).name, ACCEPT);
        assert_eq!(
            g.rule(g.accept_rule()).production,
            vec![nt("S"), Symbol::Term(Terminal::EOF)]
        );
        assert_eq!(g.rule(g.error_rule()).name, ERROR);
        assert_eq!(g.alternatives(Nonterm("S")).count(), 1);
    }

    #[test]
    fn missing_reducer() {
        let err = Grammar::<()>::new("S", vec![Rule::new("S", vec![lit("a")])])
            .err()
            .unwrap();
        assert_eq!(
            err,
            GrammarError::MissingReducer {
                rule: "S -> `a`".into()
            }
        );
    }

    #[test]
    fn epsilon_needs_no_reducer() {
        assert!(Grammar::<()>::new("S", vec![Rule::epsilon("S")]).is_ok());
    }

    #[test]
    fn malformed_rules() {
        let err = Grammar::new(
            "S",
            vec![Rule::new("S", vec![lit("a"), Symbol::Epsilon]).reduce(unit)],
        )
        .err()
        .unwrap();
        assert!(matches!(err, GrammarError::MisplacedEpsilon { .. }));

        let err = Grammar::new(
            "S",
            vec![Rule::new("S", vec![lit("a")]).collect(&[]).reduce(unit)],
        )
        .err()
        .unwrap();
        assert!(matches!(err, GrammarError::CollectMaskLength { .. }));

        let err = Grammar::new("S", vec![Rule::new("S", vec![nt("T")]).reduce(unit)])
            .err()
            .unwrap();
        assert_eq!(
            err,
            GrammarError::UndefinedNonterminal {
                name: Nonterm("T"),
                rule: "S -> T".into()
            }
        );

        let err = Grammar::new("X", vec![Rule::new("S", vec![lit("a")]).reduce(unit)])
            .err()
            .unwrap();
        assert_eq!(err, GrammarError::UndefinedStart { name: Nonterm("X") });

        let err = Grammar::new("S", vec![Rule::new("S", vec![]).reduce(unit)])
            .err()
            .unwrap();
        assert!(matches!(err, GrammarError::EmptyProduction { .. }));
    }

    #[test]
    fn display() {
        let rule: Rule<()> = Rule::new("S", vec![lit("("), nt("S"), lit(")")]).reduce(unit);
        assert_eq!(rule.to_string(), "S -> `(` S `)`");
        assert_eq!(Rule::<()>::epsilon("S").to_string(), "S -> ε");
    }
}
