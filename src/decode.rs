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

//! Functions and types for decoding data.

use super::iter::ErrAdapter;
use super::ranges::{self, Block};

use core::fmt::{self, Debug, Display, Formatter};
use core::iter::FusedIterator;
use core::str::Chars;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// An error encountered while decoding a [`str`] or sequence of [`char`]s.
///
/// Indices count chars from the start of the input, newlines included.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Encountered a char outside every block.
    #[error("bad character at index {index}: {ch:?}")]
    BadChar {
        index: usize,
        ch: char,
    },
    /// Encountered two chars that have no meaning when paired.
    #[error("bad character pair at index {index}: {first:?}, {second:?}")]
    BadPair {
        index: usize,
        first: char,
        second: char,
    },
    /// The input ended with a char that needs a partner.
    #[error("unexpected end of input after {ch:?} at index {index}")]
    UnexpectedEnd {
        index: usize,
        ch: char,
    },
}

use DecodeError as Error;

/// Alias of <code>[Result]\<T, [DecodeError]></code>.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Error information for [`DecodeBytesError::InvalidUtf8`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InvalidUtf8 {
    bytes: [u8; 4],
    len: u8,
}

impl InvalidUtf8 {
    /// The bytes that were invalid UTF-8.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

impl Debug for InvalidUtf8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InvalidUtf8").field(&self.bytes()).finish()
    }
}

impl Display for InvalidUtf8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid UTF-8: {:?}", self.bytes())
    }
}

impl core::error::Error for InvalidUtf8 {}

/// An error encountered while decoding a sequence of bytes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeBytesError {
    /// The provided bytes were not valid UTF-8.
    #[error(transparent)]
    InvalidUtf8(#[from] InvalidUtf8),
    /// The UTF-8 text was not valid encoded data.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Alias of <code>[Result]\<T, [DecodeBytesError]></code>.
pub type DecodeBytesResult<T> = Result<T, DecodeBytesError>;

/// Bytes decoded from one or two chars.
#[derive(Clone)]
enum Chunk {
    Bytes {
        buf: [u8; 3],
        pos: u8,
        len: u8,
    },
    Run {
        byte: u8,
        remaining: u16,
    },
}

impl Chunk {
    const EMPTY: Self = Self::Run {
        byte: 0,
        remaining: 0,
    };

    fn bytes(bytes: &[u8]) -> Self {
        let mut buf = [0; 3];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self::Bytes {
            buf,
            pos: 0,
            len: bytes.len() as u8,
        }
    }

    fn len(&self) -> usize {
        match *self {
            Self::Bytes {
                pos,
                len,
                ..
            } => usize::from(len - pos),
            Self::Run {
                remaining,
                ..
            } => usize::from(remaining),
        }
    }
}

impl Iterator for Chunk {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Bytes {
                buf,
                pos,
                len,
            } => (*pos < *len).then(|| {
                *pos += 1;
                buf[usize::from(*pos - 1)]
            }),
            Self::Run {
                byte,
                remaining,
            } => (*remaining > 0).then(|| {
                *remaining -= 1;
                *byte
            }),
        }
    }
}

/// Inverse of the encoder's three-byte split.
fn join_three(v0: u16, v1: u16) -> [u8; 3] {
    [(v0 >> 4) as u8, ((v0 & 0xf) << 4 | v1 >> 8) as u8, v1 as u8]
}

/// Lookahead of up to two chars, skipping newlines.
struct Window<I> {
    chars: I,
    exhausted: bool,
    offset: usize,
    slots: [(usize, char); 2],
    len: usize,
}

impl<I: Iterator<Item = char>> Window<I> {
    fn new(chars: I) -> Self {
        Self {
            chars,
            exhausted: false,
            offset: 0,
            slots: [(0, '\0'); 2],
            len: 0,
        }
    }

    fn next_non_newline(&mut self) -> Option<(usize, char)> {
        while !self.exhausted {
            let Some(c) = self.chars.next() else {
                self.exhausted = true;
                break;
            };
            let index = self.offset;
            self.offset += 1;
            if c != '\n' {
                return Some((index, c));
            }
        }
        None
    }

    /// Returns the `i`th char in the window along with its index in the
    /// input, or [`None`] if the input ends first.
    fn peek(&mut self, i: usize) -> Option<(usize, char)> {
        while self.len <= i {
            self.slots[self.len] = self.next_non_newline()?;
            self.len += 1;
        }
        Some(self.slots[i])
    }

    fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        if n == 1 {
            self.slots[0] = self.slots[1];
        }
        self.len -= n;
    }
}

/// Iterator returned by [`decode_chars`].
pub struct CharDecoder<I> {
    window: Window<I>,
    chunk: Chunk,
    done: bool,
}

impl<I: Iterator<Item = char>> CharDecoder<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self {
            window: Window::new(iter),
            chunk: Chunk::EMPTY,
            done: false,
        }
    }

    /// Consumes the next one or two chars. Returns [`None`] at the end of
    /// the input.
    fn step(&mut self) -> DecodeResult<Option<Chunk>> {
        let Some((index, u1)) = self.window.peek(0) else {
            return Ok(None);
        };

        if let Some((b0, b1)) = ranges::paired_ascii_decode(u1) {
            self.window.advance(1);
            return Ok(Some(Chunk::bytes(&[b0, b1])));
        }

        if Block::of(u1).is_none() {
            return Err(Error::BadChar {
                index,
                ch: u1,
            });
        }

        let Some((_, u2)) = self.window.peek(1) else {
            let b = ranges::from_eight(u1).ok_or(Error::UnexpectedEnd {
                index,
                ch: u1,
            })?;
            self.window.advance(1);
            return Ok(Some(Chunk::bytes(&[b])));
        };

        let chunk = match (ranges::from_eight(u1), ranges::from_twelve(u1)) {
            (_, Some(v0)) => ranges::from_twelve(u2)
                .map(|v1| Chunk::bytes(&join_three(v0, v1))),
            (Some(b), _) => match (
                ranges::from_eight(u2),
                ranges::from_twelve(u2),
            ) {
                (_, Some(n)) => {
                    tracing::trace!(byte = b, run = n, "run-length pair");
                    Some(Chunk::Run {
                        byte: b,
                        remaining: n,
                    })
                }
                (Some(b1), _) => Some(Chunk::bytes(&[b, b1])),
                (None, None) => None,
            },
            (None, None) => None,
        };

        let chunk = chunk.ok_or(Error::BadPair {
            index,
            first: u1,
            second: u2,
        })?;
        self.window.advance(2);
        Ok(Some(chunk))
    }
}

impl<I> CharDecoder<I> {
    pub(crate) fn get_ref(&self) -> &I {
        &self.window.chars
    }
}

impl<I> Iterator for CharDecoder<I>
where
    I: Iterator<Item = char>,
{
    type Item = DecodeResult<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(b) = self.chunk.next() {
                return Some(Ok(b));
            }
            if self.done {
                return None;
            }
            match self.step() {
                Ok(Some(chunk)) => self.chunk = chunk,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "decoding failed");
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = self.chunk.len();
        if self.done {
            return (pending, Some(pending));
        }
        let upper = self
            .window
            .chars
            .size_hint()
            .1
            .and_then(|n| n.checked_add(self.window.len))
            // Two chars decode to at most 4095 bytes.
            .and_then(|n| n.checked_add(1))
            .and_then(|n| (n / 2).checked_mul(usize::from(ranges::TWELVE_MAX)))
            .and_then(|n| n.checked_add(pending));
        (pending, upper)
    }
}

impl<I: Iterator<Item = char>> FusedIterator for CharDecoder<I> {}

struct Utf8ToChars<I>(I);

impl<I> Iterator for Utf8ToChars<I>
where
    I: Iterator<Item = u8>,
{
    type Item = Result<char, InvalidUtf8>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut bytes = [self.0.next()?, 0, 0, 0];
        let mut len = 1;
        loop {
            match core::str::from_utf8(&bytes[..len]) {
                Ok(s) => break s.chars().next().map(Ok),
                Err(e) => {
                    if e.error_len().is_none() && len < bytes.len() {
                        if let Some(b) = self.0.next() {
                            bytes[len] = b;
                            len += 1;
                            continue;
                        }
                    }
                }
            }
            break Some(Err(InvalidUtf8 {
                bytes,
                len: len as u8,
            }));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.0.size_hint();
        (lower.div_ceil(4), upper)
    }
}

/// Iterator returned by [`decode_bytes`].
pub struct BytesDecoder<I> {
    inner: CharDecoder<ErrAdapter<Utf8ToChars<I>, InvalidUtf8>>,
    done: bool,
}

impl<I: Iterator<Item = u8>> BytesDecoder<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self {
            inner: CharDecoder::new(ErrAdapter::new(Utf8ToChars(iter))),
            done: false,
        }
    }
}

impl<I> Iterator for BytesDecoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = DecodeBytesResult<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.inner.next();
        // Invalid UTF-8 ends the char stream early, which can make the
        // decoder treat the last chars before it as trailing. Report the
        // UTF-8 error instead of those bytes.
        if let Some(e) = self.inner.get_ref().take_err() {
            self.done = true;
            return Some(Err(e.into()));
        }
        match item? {
            Ok(b) => Some(Ok(b)),
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        // Bytes already decoded may be replaced by a UTF-8 error.
        (0, self.inner.size_hint().1)
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for BytesDecoder<I> {}

/// Iterator returned by [`decode_str`].
pub struct StrDecoder<'a>(CharDecoder<Chars<'a>>);

impl<'a> StrDecoder<'a> {
    pub(crate) fn new(s: &'a str) -> Self {
        Self(CharDecoder::new(s.chars()))
    }
}

impl Iterator for StrDecoder<'_> {
    type Item = DecodeResult<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl FusedIterator for StrDecoder<'_> {}

/// Decodes a sequence of chars.
pub fn decode_chars<I>(chars: I) -> CharDecoder<I::IntoIter>
where
    I: IntoIterator<Item = char>,
{
    CharDecoder::new(chars.into_iter())
}

/// Decodes UTF-8 text.
pub fn decode_bytes<I>(bytes: I) -> BytesDecoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    BytesDecoder::new(bytes.into_iter())
}

/// Decodes a `str`.
pub fn decode_str(s: &str) -> StrDecoder<'_> {
    StrDecoder::new(s)
}

/// Takes a decoder and stores the contents in a [`Vec`].
///
/// This is equivalent to calling [`decoder.collect()`](Iterator::collect).
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn decode_to_vec<D, E>(decoder: D) -> Result<Vec<u8>, E>
where
    D: Iterator<Item = Result<u8, E>>,
{
    decoder.collect()
}

/// Decodes a `str` into a [`Vec`].
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn decode_string(s: &str) -> DecodeResult<Vec<u8>> {
    decode_to_vec(decode_str(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::{paired_ascii_encode, to_eight, to_twelve};
    use pretty_assertions::assert_eq;

    fn s(chars: &[u32]) -> String {
        chars.iter().map(|&n| char::from_u32(n).unwrap()).collect()
    }

    #[test]
    fn empty() {
        assert_eq!(decode_string(""), Ok(vec![]));
        assert_eq!(decode_string("\n\n"), Ok(vec![]));
        assert_eq!(decode_bytes(*b"").next(), None);
    }

    #[test]
    fn join() {
        assert_eq!(join_three(0xabc, 0xdef), [0xab, 0xcd, 0xef]);
        assert_eq!(join_three(0x123, 0x456), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn paired_ascii() {
        let pairs = [(b'Z', b'E'), (0x1a, 0x05), (0x1a, 0x45), (0x5a, 0x05)];
        let text: String = pairs
            .iter()
            .map(|&(a, b)| paired_ascii_encode(a, b).unwrap())
            .collect();
        assert_eq!(
            decode_string(&text),
            Ok(vec![b'Z', b'E', 0x1a, 0x05, 0x1a, 0x45, 0x5a, 0x05]),
        );
    }

    #[test]
    fn twelve_pairs_and_trailing_eights() {
        assert_eq!(
            decode_string(&s(&[0x5aff, 0x58ed, 0x5de0, 0x5500, 0x5e01])),
            Ok(vec![0xcf, 0xfa, 0xed, 0xfe, 0x07, 0x00, 0x00, 0x01]),
        );
        assert_eq!(
            decode_string(&s(&[0x58bc, 0x5bef, 0x04ab, 0x04cd])),
            Ok(vec![0xab, 0xcd, 0xef, 0xab, 0xcd]),
        );
        assert_eq!(decode_string(&s(&[0x0461])), Ok(vec![b'a']));
    }

    #[test]
    fn run_length() {
        assert_eq!(decode_string(&s(&[0x0461, 0x4e0a])), Ok(vec![b'a'; 10]));
        assert_eq!(decode_string(&s(&[0x0461, 0x4e00])), Ok(vec![]));
        let text = s(&[0x04aa, 0x5dff, 0x04aa, 0x5dff, 0x04aa, 0x04aa]);
        assert_eq!(decode_string(&text), Ok(vec![0xaa; 0x2000]));
    }

    #[test]
    fn newlines_are_skipped_anywhere() {
        let text = format!(
            "\n{}\n\n{}\n{}{}\n",
            to_twelve(0xabc).unwrap(),
            to_twelve(0xdef).unwrap(),
            paired_ascii_encode(b'h', b'i').unwrap(),
            to_eight(0xff),
        );
        assert_eq!(
            decode_string(&text),
            Ok(vec![0xab, 0xcd, 0xef, b'h', b'i', 0xff]),
        );
    }

    #[test]
    fn bad_char() {
        assert_eq!(
            decode_string("A"),
            Err(DecodeError::BadChar {
                index: 0,
                ch: 'A',
            }),
        );
        let ok = paired_ascii_encode(b'o', b'k').unwrap();
        let text = format!("{}\n\nA", ok);
        let mut decoder = decode_str(&text);
        assert_eq!(decoder.next(), Some(Ok(b'o')));
        assert_eq!(decoder.next(), Some(Ok(b'k')));
        assert_eq!(
            decoder.next(),
            Some(Err(DecodeError::BadChar {
                index: 3,
                ch: 'A',
            })),
        );
        assert_eq!(decoder.next(), None);
    }

    #[test]
    fn bad_pair() {
        let twelve = to_twelve(1).unwrap();
        let eight = to_eight(1);
        for (first, second) in [(twelve, eight), (eight, 'x'), (twelve, 'x')] {
            let text: String = [first, second].iter().collect();
            assert_eq!(
                decode_string(&text),
                Err(DecodeError::BadPair {
                    index: 0,
                    first,
                    second,
                }),
            );
        }
    }

    #[test]
    fn lone_twelve() {
        let twelve = to_twelve(0x123).unwrap();
        assert_eq!(
            decode_string(&format!("\n{}", twelve)),
            Err(DecodeError::UnexpectedEnd {
                index: 1,
                ch: twelve,
            }),
        );
    }

    #[test]
    fn chars_and_bytes_agree() {
        let text =
            s(&[0x58bc, 0x5bef, 0x0461, 0x4e05, 0x5e01, 0x04ab, 0x04cd]);
        let from_chars = decode_to_vec(decode_chars(text.chars()));
        let from_bytes = decode_to_vec(decode_bytes(text.bytes()));
        let mut expected = vec![0xab, 0xcd, 0xef];
        expected.extend([b'a'; 5]);
        expected.extend([0, 1, 0xab, 0xcd]);
        assert_eq!(from_chars, Ok(expected));
        assert_eq!(from_bytes, from_chars.map_err(DecodeBytesError::from));
    }

    #[test]
    fn invalid_utf8() {
        let mut bytes = to_eight(0x12).to_string().into_bytes();
        bytes.push(0xff);
        let mut decoder = decode_bytes(bytes);
        match decoder.next() {
            Some(Err(DecodeBytesError::InvalidUtf8(e))) => {
                assert_eq!(e.bytes(), [0xff]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(decoder.next(), None);
    }

    #[test]
    fn truncated_utf8() {
        let c = paired_ascii_encode(b'a', b'b').unwrap();
        let mut bytes = c.to_string().into_bytes();
        bytes.pop();
        let result = decode_to_vec(decode_bytes(bytes.iter().copied()));
        match result {
            Err(DecodeBytesError::InvalidUtf8(e)) => {
                assert_eq!(e.bytes(), &bytes[..]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn size_hint_bounds_output() {
        let text = s(&[0x0461, 0x5dff, 0x58bc, 0x5bef, 0x5e01]);
        let decoder = decode_str(&text);
        let (lower, upper) = decoder.size_hint();
        let n = decoder.count();
        assert!(lower <= n && n <= upper.unwrap());
    }

    #[test]
    fn errors_display() {
        let e = DecodeError::BadChar {
            index: 4,
            ch: 'A',
        };
        assert_eq!(e.to_string(), "bad character at index 4: 'A'");
        let e = DecodeBytesError::from(e);
        assert_eq!(e.to_string(), "bad character at index 4: 'A'");
    }
}
