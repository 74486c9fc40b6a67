// Copyright (c) 2016-2020 Fabian Schuiki

//! This crate contains the fundamental utilities used by the rest of the pasc
//! compiler: source files and spans, diagnostics, and the grinder pipeline.

#[macro_use]
extern crate bitflags;

pub mod errors;
pub mod grind;
pub mod name;
pub mod source;
pub mod util;

use crate::errors::{DiagBuilder2, DiagEmitter, Severity};
use std::cell::Cell;

pub struct Session {
    pub opts: SessionOptions,
    /// Whether an error has been reported.
    failed: Cell<bool>,
}

impl Session {
    pub fn new() -> Session {
        Session {
            opts: Default::default(),
            failed: Cell::new(false),
        }
    }

    /// Check whether an error diagnostic has been emitted.
    pub fn failed(&self) -> bool {
        self.failed.get()
    }

    /// Check whether all of the given verbosity flags are enabled.
    pub fn has_verbosity(&self, verb: Verbosity) -> bool {
        self.opts.verbosity.contains(verb)
    }
}

impl DiagEmitter for Session {
    fn emit(&self, diag: DiagBuilder2) {
        if diag.get_severity() >= Severity::Error {
            self.failed.set(true);
        }
        eprintln!("{}", diag);
    }
}

impl Default for Session {
    fn default() -> Session {
        Session::new()
    }
}

#[derive(Debug, Default)]
pub struct SessionOptions {
    pub verbosity: Verbosity,
    /// Stop after parsing and only report diagnostics.
    pub check_only: bool,
}

bitflags! {
    /// Controls what internal state the driver prints while compiling.
    #[derive(Default)]
    pub struct Verbosity: u32 {
        const TOKENS = 1 << 0;
        const SETS   = 1 << 1;
        const TABLE  = 1 << 2;
        const AST    = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags() {
        let mut sess = Session::new();
        assert!(!sess.has_verbosity(Verbosity::TABLE));
        sess.opts.verbosity |= Verbosity::TABLE | Verbosity::AST;
        assert!(sess.has_verbosity(Verbosity::TABLE));
        assert!(sess.has_verbosity(Verbosity::AST));
        assert!(!sess.has_verbosity(Verbosity::TABLE | Verbosity::SETS));
    }

    #[test]
    fn errors_mark_session_failed() {
        let sess = Session::new();
        sess.emit(DiagBuilder2::warning("table collision"));
        assert!(!sess.failed());
        sess.emit(DiagBuilder2::error("expected `;`"));
        assert!(sess.failed());
    }
}
