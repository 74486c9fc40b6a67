// Copyright (c) 2016-2020 Fabian Schuiki

//! This module provides an abstraction similar to iterators. Elements are
//! produced in one direction, while errors bubble backwards until they are
//! vented. This allows for transformation chains such as lexical analyzers to
//! be constructed, where errors, warnings, or notices might be emitted without
//! disturbing the transformation.

use std::marker::PhantomData;

mod lookahead;

pub use self::lookahead::Lookahead;

pub trait Grinder {
    type Item;
    type Error;

    fn next(&mut self) -> Self::Item;
    fn emit(&mut self, err: Self::Error);

    #[inline]
    fn vent<F, E>(self, f: F) -> Vent<Self, F, E>
    where
        Self: Sized,
        F: Fn(E),
    {
        Vent {
            inner: self,
            ventfn: f,
            phantom: PhantomData,
        }
    }

    #[inline]
    fn lookaheadable<I>(self) -> Lookahead<Self, I>
    where
        Self: Sized + Grinder<Item = Option<I>>,
    {
        Lookahead::new(self)
    }
}

pub struct Vent<T: Grinder, F, E> {
    inner: T,
    ventfn: F,
    phantom: PhantomData<E>,
}

impl<T: Grinder, E, F> Grinder for Vent<T, F, E>
where
    F: Fn(E),
{
    type Item = T::Item;
    type Error = E;

    fn next(&mut self) -> Self::Item {
        self.inner.next()
    }

    fn emit(&mut self, err: E) {
        (self.ventfn)(err)
    }
}

pub struct Iter<I: Iterator> {
    inner: I,
}

impl<I: Iterator> Grinder for Iter<I> {
    type Item = Option<I::Item>;
    type Error = ();

    fn next(&mut self) -> Option<I::Item> {
        self.inner.next()
    }

    fn emit(&mut self, _: ()) {
        unreachable!()
    }
}

pub fn from_iter<I: Iterator>(iter: I) -> Iter<I> {
    Iter { inner: iter }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn vent_receives_errors() {
        let errors = RefCell::new(Vec::new());
        let mut g = from_iter(vec![1, 2].into_iter()).vent(|e: &str| errors.borrow_mut().push(e));
        assert_eq!(g.next(), Some(1));
        g.emit("oops");
        assert_eq!(g.next(), Some(2));
        assert_eq!(g.next(), None);
        assert_eq!(*errors.borrow(), vec!["oops"]);
    }

    #[test]
    fn next_if_consumes_matches_only() {
        let mut g = from_iter("aab".chars()).vent(|_: ()| ()).lookaheadable();
        let mut run = String::new();
        while let Some(c) = g.next_if(|&c| c == 'a') {
            run.push(c);
        }
        assert_eq!(run, "aa");
        assert_eq!(g.next_if(|&c| c == 'a'), None);
        assert_eq!(g.next(), Some('b'));
        assert_eq!(g.next_if(|_| true), None);
    }

    #[test]
    fn lookahead_and_undo() {
        let mut g = from_iter("abc".chars()).vent(|_: ()| ()).lookaheadable();
        assert_eq!(g.peek(1), Some(&'b'));
        assert_eq!(g.next(), Some('a'));
        g.undo('z');
        assert_eq!(g.next(), Some('z'));
        assert_eq!(g.next(), Some('b'));
        assert_eq!(g.peek(0), Some(&'c'));
        assert_eq!(g.peek(1), None);
        assert_eq!(g.next(), Some('c'));
        assert_eq!(g.next(), None);
        assert_eq!(g.peek(0), None);
    }
}
