/*
 * Copyright (C) 2024 taylor.fish <contact@taylor.fish>
 *
 * This file is part of unibinary.
 *
 * unibinary is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * unibinary is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with unibinary. If not, see <https://www.gnu.org/licenses/>.
 */

use core::cell::Cell;
use core::iter::{Fuse, FusedIterator};

/// A byte source that can take back up to two bytes it has already yielded.
///
/// Pushed-back bytes are yielded again, most recent first, before anything
/// else is read from the underlying iterator.
pub struct Pushback<I> {
    iter: Fuse<I>,
    buf: [u8; 2],
    len: usize,
}

impl<I: Iterator<Item = u8>> Pushback<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter: iter.fuse(),
            buf: [0; 2],
            len: 0,
        }
    }
}

impl<I> Pushback<I> {
    pub fn push_back(&mut self, b: u8) {
        assert!(self.len < self.buf.len(), "pushback buffer is full");
        self.buf[self.len] = b;
        self.len += 1;
    }
}

impl<I: Iterator<Item = u8>> Iterator for Pushback<I> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len > 0 {
            self.len -= 1;
            return Some(self.buf[self.len]);
        }
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.iter.size_hint();
        (
            lower.saturating_add(self.len),
            upper.and_then(|n| n.checked_add(self.len)),
        )
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for Pushback<I> {}

pub struct Flatten<I, Sub> {
    iter: I,
    sub: Option<Sub>,
}

impl<I, Sub> Flatten<I, Sub> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            sub: None,
        }
    }

    pub fn get_ref(&self) -> &I {
        &self.iter
    }
}

impl<I, Sub: Iterator> Iterator for Flatten<I, Sub>
where
    I: Iterator<Item = Sub>,
{
    type Item = Sub::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(sub) = &mut self.sub {
            if let Some(item) = sub.next() {
                return Some(item);
            }
        }
        for mut sub in &mut self.iter {
            if let Some(item) = sub.next() {
                self.sub = Some(sub);
                return Some(item);
            }
        }
        self.sub = None;
        None
    }

    fn fold<B, F>(self, init: B, mut f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        let init = match self.sub {
            Some(sub) => sub.fold(init, &mut f),
            None => init,
        };
        self.iter.fold(init, |b, item| item.fold(b, &mut f))
    }
}

impl<I, Sub: Iterator> FusedIterator for Flatten<I, Sub> where
    I: FusedIterator<Item = Sub>
{
}

/// Turns an iterator of `Result<T, E>` into an iterator of `T` while allowing
/// any errors to be fetched with [`Self::take_err`].
pub struct ErrAdapter<I, Err> {
    iter: I,
    err: Cell<Option<Err>>,
}

impl<I, Err> ErrAdapter<I, Err> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            err: Cell::new(None),
        }
    }

    pub fn take_err(&self) -> Option<Err> {
        self.err.take()
    }
}

impl<I, Err, T> Iterator for ErrAdapter<I, Err>
where
    I: Iterator<Item = Result<T, Err>>,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()?.map_or_else(
            |e| {
                self.err.set(Some(e));
                None
            },
            Some,
        )
    }
}
