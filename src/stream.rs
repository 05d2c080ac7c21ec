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

//! Encoding and decoding between [`std::io`] readers and writers.
//!
//! Output is written as it is produced. If an error occurs, whatever was
//! written before it stays written.

use super::decode::{decode_bytes, DecodeBytesError};
use super::encode::{encode_to_chars_with, EncodeConfig};

use std::cell::Cell;
use std::io::{self, BufReader, BufWriter, Read, Write};

/// An error encountered while encoding or decoding a stream.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The input was not valid encoded data.
    #[error("input is not valid encoded data: {0}")]
    Decode(#[from] DecodeBytesError),
}

/// Byte counts for a completed stream operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Reads bytes until EOF or the first error, which is stored in `err`.
fn read_bytes<'a, R: Read + 'a>(
    reader: R,
    err: &'a Cell<Option<io::Error>>,
    count: &'a Cell<u64>,
) -> impl Iterator<Item = u8> + 'a {
    BufReader::new(reader).bytes().map_while(move |b| match b {
        Ok(b) => {
            count.set(count.get() + 1);
            Some(b)
        }
        Err(e) => {
            err.set(Some(e));
            None
        }
    })
}

/// Encodes everything in `reader` and writes UTF-8 text to `writer`.
///
/// # Errors
///
/// Returns [`StreamError::Io`] if reading or writing fails.
pub fn encode_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
    config: EncodeConfig,
) -> Result<StreamStats, StreamError> {
    let err = Cell::new(None);
    let read = Cell::new(0);
    let mut writer = BufWriter::new(writer);
    let mut written = 0_u64;
    let mut buf = [0; 4];

    for c in encode_to_chars_with(read_bytes(reader, &err, &read), config) {
        if let Some(e) = err.take() {
            return Err(e.into());
        }
        let utf8 = c.encode_utf8(&mut buf);
        writer.write_all(utf8.as_bytes())?;
        written += utf8.len() as u64;
    }
    if let Some(e) = err.take() {
        return Err(e.into());
    }
    writer.flush()?;

    let stats = StreamStats {
        bytes_read: read.get(),
        bytes_written: written,
    };
    tracing::debug!(
        bytes_read = stats.bytes_read,
        bytes_written = stats.bytes_written,
        wrap_length = config.wrap_length,
        "encoded stream",
    );
    Ok(stats)
}

/// Decodes UTF-8 text from `reader` and writes the bytes to `writer`.
///
/// # Errors
///
/// Returns [`StreamError::Decode`] if the input is not valid encoded data,
/// or [`StreamError::Io`] if reading or writing fails. Bytes decoded before
/// the error are flushed to `writer` first.
pub fn decode_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
) -> Result<StreamStats, StreamError> {
    let err = Cell::new(None);
    let read = Cell::new(0);
    let mut writer = BufWriter::new(writer);
    let mut written = 0_u64;

    for item in decode_bytes(read_bytes(reader, &err, &read)) {
        // An I/O error looks like the end of the input to the decoder, so
        // it takes precedence over whatever the decoder made of that.
        if let Some(e) = err.take() {
            writer.flush()?;
            return Err(e.into());
        }
        match item {
            Ok(b) => {
                writer.write_all(&[b])?;
                written += 1;
            }
            Err(e) => {
                writer.flush()?;
                tracing::debug!(
                    bytes_read = read.get(),
                    bytes_written = written,
                    "stopped decoding stream",
                );
                return Err(e.into());
            }
        }
    }
    if let Some(e) = err.take() {
        writer.flush()?;
        return Err(e.into());
    }
    writer.flush()?;

    let stats = StreamStats {
        bytes_read: read.get(),
        bytes_written: written,
    };
    tracing::debug!(
        bytes_read = stats.bytes_read,
        bytes_written = stats.bytes_written,
        "decoded stream",
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::encode::encode_to_string_with;
    use pretty_assertions::assert_eq;

    struct FailingReader<'a>(&'a [u8]);

    impl Read for FailingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "boom"));
            }
            let n = self.0.len().min(buf.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn encode_matches_string_adapter() {
        let input = b"hello\xff\xfe\x00\x00\x00\x00 world";
        let config = EncodeConfig::new().with_wrap_length(3);
        let mut out = Vec::new();
        let stats = encode_stream(&input[..], &mut out, config).unwrap();
        let expected = encode_to_string_with(input.iter().copied(), config);
        assert_eq!(String::from_utf8(out).unwrap(), expected);
        assert_eq!(
            stats,
            StreamStats {
                bytes_read: input.len() as u64,
                bytes_written: expected.len() as u64,
            },
        );
    }

    #[test]
    fn round_trip() {
        let input: Vec<u8> =
            (0..=255).chain([7; 5000]).chain(0..=255).collect();
        let mut encoded = Vec::new();
        let config = EncodeConfig::new().with_wrap_length(76);
        encode_stream(&input[..], &mut encoded, config).unwrap();
        let mut decoded = Vec::new();
        let stats = decode_stream(&encoded[..], &mut decoded).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(stats.bytes_read, encoded.len() as u64);
        assert_eq!(stats.bytes_written, input.len() as u64);
    }

    #[test]
    fn decode_error_keeps_earlier_output() {
        let ok = crate::ranges::paired_ascii_encode(b'o', b'k').unwrap();
        let text = format!("{}!", ok);
        let mut out = Vec::new();
        let result = decode_stream(text.as_bytes(), &mut out);
        match result {
            Err(StreamError::Decode(DecodeBytesError::Decode(e))) => {
                assert_eq!(
                    e,
                    DecodeError::BadChar {
                        index: 1,
                        ch: '!',
                    },
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(out, b"ok");
    }

    #[test]
    fn read_errors_are_reported() {
        let mut out = Vec::new();
        let config = EncodeConfig::new();
        let result = encode_stream(FailingReader(b"abc"), &mut out, config);
        assert!(matches!(result, Err(StreamError::Io(_))));

        let text = crate::ranges::to_eight(1).to_string();
        let result = decode_stream(FailingReader(text.as_bytes()), &mut out);
        assert!(matches!(result, Err(StreamError::Io(_))));
    }
}
