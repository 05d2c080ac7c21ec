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

use core::iter::FusedIterator;

/// Inserts a newline after every `len` chars. A length of 0 disables
/// wrapping.
///
/// The newline follows the char that completes a line, so output never
/// starts with one, and ends with one only if the number of chars is a
/// multiple of `len`.
pub struct Wrap<I> {
    iter: I,
    len: usize,
    count: usize,
    newline_pending: bool,
}

impl<I> Wrap<I> {
    pub fn new(iter: I, len: usize) -> Self {
        Self {
            iter,
            len,
            count: 0,
            newline_pending: false,
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Wrap<I> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        if self.newline_pending {
            self.newline_pending = false;
            return Some('\n');
        }
        let c = self.iter.next()?;
        if self.len > 0 {
            self.count = (self.count + 1) % self.len;
            self.newline_pending = self.count == 0;
        }
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = usize::from(self.newline_pending);
        let (lower, upper) = self.iter.size_hint();
        if self.len == 0 {
            return (lower + pending, upper.map(|n| n + pending));
        }
        let newlines = |n: usize| (self.count + n) / self.len;
        (
            lower.saturating_add(newlines(lower)).saturating_add(pending),
            upper
                .and_then(|n| n.checked_add(newlines(n)))
                .and_then(|n| n.checked_add(pending)),
        )
    }
}

impl<I: FusedIterator<Item = char>> FusedIterator for Wrap<I> {}
