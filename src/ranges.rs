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

//! The codepoint blocks that make up encoded text.
//!
//! Every non-newline character produced by the encoder lies in exactly one
//! of three kinds of block:
//!
//! * [`Block::PairedAscii`]: four sub-blocks of 0x1000 chars starting at
//!   U+5E00, U+6E00, U+7E00 and U+8E00, each holding two 7-bit bytes.
//! * [`Block::Twelve`]: U+4E00 to U+5DFF, one raw 12-bit value.
//! * [`Block::Eight`]: U+0400 to U+04FF, one raw byte.
//!
//! All ranges are half-open: a block starting at `s` with length `n` holds
//! `s..s + n`.

/// Start of each paired-ASCII sub-block, indexed by the bit-6 flags of the
/// two bytes as `(b0 >> 6) << 1 | (b1 >> 6)`.
pub const PAIRED_ASCII_STARTS: [u32; 4] = [0x5e00, 0x6e00, 0x7e00, 0x8e00];
pub const PAIRED_ASCII_LEN: u32 = 0x1000;

pub const TWELVE_START: u32 = 0x4e00;
pub const TWELVE_LEN: u32 = 0x1000;

pub const EIGHT_START: u32 = 0x0400;
pub const EIGHT_LEN: u32 = 0x100;

/// The largest value a [`Block::Twelve`] char can carry.
pub const TWELVE_MAX: u16 = (TWELVE_LEN - 1) as u16;

/// The kind of block a char belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Block {
    /// Two 7-bit bytes packed into one char.
    PairedAscii,
    /// One 12-bit value.
    Twelve,
    /// One 8-bit value.
    Eight,
}

impl Block {
    /// Classifies `c`, or returns [`None`] if `c` lies outside every block.
    ///
    /// Newlines are not part of any block.
    pub fn of(c: char) -> Option<Self> {
        if is_paired_ascii(c) {
            Some(Self::PairedAscii)
        } else if is_twelve(c) {
            Some(Self::Twelve)
        } else if is_eight(c) {
            Some(Self::Eight)
        } else {
            None
        }
    }
}

fn in_block(c: char, start: u32, len: u32) -> bool {
    (start..start + len).contains(&u32::from(c))
}

fn block_char(n: u32) -> char {
    // Every block lies below the surrogate range.
    debug_assert!(n < 0xd800);
    char::from_u32(n).unwrap()
}

fn paired_ascii_index(c: char) -> Option<usize> {
    PAIRED_ASCII_STARTS
        .iter()
        .position(|&start| in_block(c, start, PAIRED_ASCII_LEN))
}

pub fn is_eight(c: char) -> bool {
    in_block(c, EIGHT_START, EIGHT_LEN)
}

pub fn is_twelve(c: char) -> bool {
    in_block(c, TWELVE_START, TWELVE_LEN)
}

/// Checks all four paired-ASCII sub-blocks.
pub fn is_paired_ascii(c: char) -> bool {
    paired_ascii_index(c).is_some()
}

/// Maps a byte onto the [`Block::Eight`] block.
pub fn to_eight(b: u8) -> char {
    block_char(EIGHT_START + u32::from(b))
}

/// Maps a 12-bit value onto the [`Block::Twelve`] block, or returns [`None`]
/// if `n` is greater than [`TWELVE_MAX`].
pub fn to_twelve(n: u16) -> Option<char> {
    (n <= TWELVE_MAX).then(|| block_char(TWELVE_START + u32::from(n)))
}

pub fn from_eight(c: char) -> Option<u8> {
    is_eight(c).then(|| (u32::from(c) - EIGHT_START) as u8)
}

pub fn from_twelve(c: char) -> Option<u16> {
    is_twelve(c).then(|| (u32::from(c) - TWELVE_START) as u16)
}

/// Packs two 7-bit bytes into one char.
///
/// Bit 6 of each byte selects the sub-block, and the low 6 bits of each are
/// stored as `b0 << 6 | b1`. Returns [`None`] if either byte is 128 or more.
pub fn paired_ascii_encode(b0: u8, b1: u8) -> Option<char> {
    if b0 >= 0x80 || b1 >= 0x80 {
        return None;
    }
    let index = usize::from(b0 >> 6) << 1 | usize::from(b1 >> 6);
    let value = u32::from(b0 & 0x3f) << 6 | u32::from(b1 & 0x3f);
    Some(block_char(PAIRED_ASCII_STARTS[index] + value))
}

/// Inverse of [`paired_ascii_encode`].
pub fn paired_ascii_decode(c: char) -> Option<(u8, u8)> {
    let index = paired_ascii_index(c)?;
    let value = u32::from(c) - PAIRED_ASCII_STARTS[index];
    let high0 = ((index >> 1) as u8) << 6;
    let high1 = ((index & 1) as u8) << 6;
    let b0 = ((value >> 6) & 0x3f) as u8 | high0;
    let b1 = (value & 0x3f) as u8 | high1;
    Some((b0, b1))
}
