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

//! Functions and types for encoding data.

use super::iter::{Flatten, Pushback};
use super::ranges::{self, TWELVE_MAX};
use super::wrap::Wrap;

use core::array;
use core::iter::{FusedIterator, Take};

#[cfg(feature = "alloc")]
use alloc::string::String;

/// The longest run of identical bytes one run-length pair can describe.
/// Longer runs are split.
pub const MAX_RUN: u16 = TWELVE_MAX;

/// Runs shorter than this are packed like any other bytes.
pub const MIN_RUN: u16 = 3;

/// Used by the `encode_*_with` functions to configure the encoding process.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeConfig {
    /// Number of chars per line. A newline is inserted after every
    /// `wrap_length` chars; 0 disables wrapping. [default: 0]
    pub wrap_length: usize,
}

impl EncodeConfig {
    /// Returns the default configuration.
    pub const fn new() -> Self {
        Self {
            wrap_length: 0,
        }
    }

    /// Sets [`Self::wrap_length`].
    pub const fn with_wrap_length(mut self, wrap_length: usize) -> Self {
        self.wrap_length = wrap_length;
        self
    }
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn twelve(n: u16) -> char {
    debug_assert!(n <= TWELVE_MAX);
    // Masked to 12 bits, so always in range.
    ranges::to_twelve(n & TWELVE_MAX).unwrap()
}

/// Packs three bytes into two 12-bit values.
fn split_three(b0: u8, b1: u8, b2: u8) -> (u16, u16) {
    let v0 = u16::from(b0) << 4 | u16::from(b1) >> 4;
    let v1 = u16::from(b1 & 0xf) << 8 | u16::from(b2);
    (v0, v1)
}

/// Encodes bytes as chars, without line wrapping.
struct Codepoints<I> {
    bytes: Pushback<I>,
    pending: Option<char>,
}

impl<I: Iterator<Item = u8>> Codepoints<I> {
    fn new(iter: I) -> Self {
        Self {
            bytes: Pushback::new(iter),
            pending: None,
        }
    }

    /// Counts how many times `b` occurs in a row, including the occurrence
    /// already consumed, up to [`MAX_RUN`].
    fn run_length(&mut self, b: u8) -> u16 {
        let mut len = 1;
        while len < MAX_RUN {
            match self.bytes.next() {
                Some(next) if next == b => len += 1,
                Some(next) => {
                    self.bytes.push_back(next);
                    break;
                }
                None => break,
            }
        }
        len
    }

    /// Consumes the next group of bytes and returns the one or two chars
    /// that represent it.
    fn step(&mut self) -> Option<(char, Option<char>)> {
        let b0 = self.bytes.next()?;
        let run = self.run_length(b0);
        if run >= MIN_RUN {
            tracing::trace!(byte = b0, run, "run-length pair");
            return Some((ranges::to_eight(b0), Some(twelve(run))));
        }

        let b1 = if run == 2 {
            Some(b0)
        } else {
            self.bytes.next()
        };
        let b2 = b1.and_then(|_| self.bytes.next());

        if let Some(c) = b1.and_then(|b1| ranges::paired_ascii_encode(b0, b1))
        {
            if let Some(b2) = b2 {
                self.bytes.push_back(b2);
            }
            return Some((c, None));
        }

        if let (Some(b1), Some(b2)) = (b1, b2) {
            let (v0, v1) = split_three(b0, b1, b2);
            return Some((twelve(v0), Some(twelve(v1))));
        }

        // Fewer than three bytes remain, and they can't be paired.
        if let Some(b1) = b1 {
            self.bytes.push_back(b1);
        }
        Some((ranges::to_eight(b0), None))
    }
}

impl<I: Iterator<Item = u8>> Iterator for Codepoints<I> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(c) = self.pending.take() {
            return Some(c);
        }
        let (c, next) = self.step()?;
        self.pending = next;
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = usize::from(self.pending.is_some());
        let (lower, upper) = self.bytes.size_hint();
        (
            // A run-length pair covers at most 4095 bytes with two chars.
            lower.div_ceil(2048) + pending,
            // No group produces more chars than it consumes bytes.
            upper.and_then(|n| n.checked_add(pending)),
        )
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for Codepoints<I> {}

/// Iterator returned by [`encode_to_chars`].
pub struct CharEncoder<I>(Wrap<Codepoints<I>>);

impl<I: Iterator<Item = u8>> CharEncoder<I> {
    pub(crate) fn new(iter: I, config: EncodeConfig) -> Self {
        Self(Wrap::new(Codepoints::new(iter), config.wrap_length))
    }
}

impl<I> Iterator for CharEncoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for CharEncoder<I> {}

struct CharsToUnflatUtf8<I>(I);

type CharsToUnflatUtf8Item = Take<array::IntoIter<u8, 4>>;

impl<I> Iterator for CharsToUnflatUtf8<I>
where
    I: Iterator<Item = char>,
{
    type Item = CharsToUnflatUtf8Item;

    fn next(&mut self) -> Option<Self::Item> {
        let mut bytes = [0; 4];
        let len = self.0.next()?.encode_utf8(&mut bytes).len();
        Some(IntoIterator::into_iter(bytes).take(len))
    }
}

impl<I: FusedIterator<Item = char>> FusedIterator for CharsToUnflatUtf8<I> {}

/// Iterator returned by [`encode_to_bytes`]. Yields UTF-8.
pub struct Utf8Encoder<I>(
    Flatten<CharsToUnflatUtf8<CharEncoder<I>>, CharsToUnflatUtf8Item>,
);

impl<I: Iterator<Item = u8>> Utf8Encoder<I> {
    pub(crate) fn new(iter: I, config: EncodeConfig) -> Self {
        Self(Flatten::new(CharsToUnflatUtf8(CharEncoder::new(iter, config))))
    }
}

impl<I> Iterator for Utf8Encoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn fold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        self.0.fold(init, f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.0.get_ref().0.size_hint();
        (
            lower,
            // Every char is at most three bytes long, and up to three more
            // bytes of the current char may still be pending.
            upper
                .and_then(|n| n.checked_mul(3))
                .and_then(|n| n.checked_add(3)),
        )
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for Utf8Encoder<I> {}

/// Encodes bytes as a sequence of chars.
pub fn encode_to_chars<I>(bytes: I) -> CharEncoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    encode_to_chars_with(bytes, EncodeConfig::new())
}

/// Encodes bytes as a sequence of chars with the given config.
///
/// This function is like [`encode_to_chars`], but takes a configuration
/// object.
pub fn encode_to_chars_with<I>(
    bytes: I,
    config: EncodeConfig,
) -> CharEncoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    CharEncoder::new(bytes.into_iter(), config)
}

/// Encodes bytes as UTF-8 text.
pub fn encode_to_bytes<I>(bytes: I) -> Utf8Encoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    encode_to_bytes_with(bytes, EncodeConfig::new())
}

/// Encodes bytes as UTF-8 text with the given config.
///
/// This function is like [`encode_to_bytes`], but takes a configuration
/// object.
pub fn encode_to_bytes_with<I>(
    bytes: I,
    config: EncodeConfig,
) -> Utf8Encoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    Utf8Encoder::new(bytes.into_iter(), config)
}

/// Encodes bytes as a [`String`].
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn encode_to_string<I>(bytes: I) -> String
where
    I: IntoIterator<Item = u8>,
{
    encode_to_string_with(bytes, EncodeConfig::new())
}

/// Encodes bytes as a [`String`] with the given config.
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn encode_to_string_with<I>(bytes: I, config: EncodeConfig) -> String
where
    I: IntoIterator<Item = u8>,
{
    encode_to_chars_with(bytes, config).collect()
}
