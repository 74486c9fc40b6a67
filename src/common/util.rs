// Copyright (c) 2016-2020 Fabian Schuiki

//! The span accessor shared by tokens and syntax tree nodes.

#![deny(missing_docs)]

use crate::source::{Span, Spanned};

/// Provides span information for syntax nodes.
pub trait HasSpan {
    /// Obtain the full span of the input file that this node covers.
    fn span(&self) -> Span;
}

impl<T> HasSpan for Spanned<T> {
    fn span(&self) -> Span {
        self.span
    }
}
