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

//! Encodes arbitrary bytes as printable Unicode text, and back.
//!
//! Two 7-bit ASCII bytes become one char, any three bytes become two chars,
//! and runs of three or more identical bytes become a byte/count pair. The
//! chars come from a few fixed blocks of CJK ideographs and Cyrillic (see
//! [`ranges`]), so the output survives copying and pasting as plain text.
//!
//! ```
//! use unibinary::{decode_str, decode_to_vec, encode_to_string};
//!
//! let encoded = encode_to_string(*b"Hello, world!\x00\x00\x00\x00\xff");
//! let decoded = decode_to_vec(decode_str(&encoded)).unwrap();
//! assert_eq!(decoded, b"Hello, world!\x00\x00\x00\x00\xff");
//! ```
//!
//! Encoded text may be wrapped into lines with
//! [`EncodeConfig::with_wrap_length`]; decoding ignores newlines.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]

pub mod decode;
pub mod encode;
mod iter;
pub mod ranges;
#[cfg(feature = "std")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
pub mod stream;
mod wrap;

#[cfg(feature = "alloc")]
extern crate alloc;

pub use decode::decode_bytes;
pub use decode::decode_chars;
pub use decode::decode_str;
#[cfg(feature = "alloc")]
pub use decode::{decode_string, decode_to_vec};
pub use decode::{DecodeBytesError, DecodeError};

pub use encode::encode_to_bytes;
pub use encode::encode_to_chars;
pub use encode::EncodeConfig;
pub use encode::{encode_to_bytes_with, encode_to_chars_with};
#[cfg(feature = "alloc")]
pub use encode::{encode_to_string, encode_to_string_with};

#[cfg(feature = "std")]
pub use stream::{decode_stream, encode_stream, StreamError};
