// Copyright (c) 2016-2020 Fabian Schuiki

use super::Grinder;
use std::collections::VecDeque;

/// A grinder that buffers upcoming items, such that the scanner stages can
/// look past the current one and put items back.
///
/// Once the inner grinder runs dry it is never asked again; the end of the
/// input sticks.
pub struct Lookahead<T, I> {
    inner: T,
    buffer: VecDeque<I>,
    done: bool,
}

impl<T, I> Lookahead<T, I>
where
    T: Grinder<Item = Option<I>>,
{
    pub fn new(inner: T) -> Lookahead<T, I> {
        Lookahead {
            inner,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    /// Buffer items until `offset` is available or the input ends.
    fn fill(&mut self, offset: usize) {
        while !self.done && self.buffer.len() <= offset {
            match self.inner.next() {
                Some(item) => self.buffer.push_back(item),
                None => self.done = true,
            }
        }
    }

    /// The item `offset` positions ahead, without consuming anything.
    pub fn peek(&mut self, offset: usize) -> Option<&I> {
        self.fill(offset);
        self.buffer.get(offset)
    }

    /// Consume the next item if it satisfies `pred`.
    pub fn next_if<F>(&mut self, pred: F) -> Option<I>
    where
        F: FnOnce(&I) -> bool,
    {
        let hit = self.peek(0).map_or(false, pred);
        if hit {
            self.buffer.pop_front()
        } else {
            None
        }
    }

    /// Put an item back, such that it is produced next.
    pub fn undo(&mut self, item: I) {
        self.buffer.push_front(item);
    }
}

impl<T, I> Grinder for Lookahead<T, I>
where
    T: Grinder<Item = Option<I>>,
{
    type Item = Option<I>;
    type Error = T::Error;

    fn emit(&mut self, err: Self::Error) {
        self.inner.emit(err)
    }

    fn next(&mut self) -> Option<I> {
        self.fill(0);
        self.buffer.pop_front()
    }
}
