// Copyright (c) 2016-2020 Fabian Schuiki

//! A grammar-driven LL(1) parser engine.
//!
//! A grammar is given as plain data: a list of rules, each with a production,
//! a mask of the slots to collect, and a reducer that builds the rule's value
//! from the collected slots. From this the engine computes the Nullable,
//! FIRST, FOLLOW, and PREDICT sets and a prediction table, and then drives a
//! stack automaton over a token stream. Syntax errors are reported and
//! recovered from in panic mode, leaving error markers in the tree.

pub mod classify;
pub mod gather;
pub mod grammar;
pub mod parser;
mod recover;
pub mod sets;
pub mod table;
pub mod value;

pub use self::classify::{classify_token, Classifier, TokenClassifier, TypeNameClassifier};
pub use self::grammar::{
    cat, kw, lit, nt, Grammar, GrammarError, Nonterm, Rule, RuleId, Symbol, Terminal,
};
pub use self::parser::{LlParser, ParseError, Parsed};
pub use self::sets::{Analysis, TermSet};
pub use self::table::{Collision, PredictionTable};
pub use self::value::{Args, ErrorMarker, ReduceError, Reducer, Value};
