// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Header parsing and serialization traits

use std::num::NonZero;

/// Types which can be parsed from the front of a byte slice.
pub trait Parse: Sized {
    /// Error produced when the buffer does not contain a valid header.
    type Error: core::error::Error;

    /// Parse a header from the front of `buf`.
    ///
    /// Returns the parsed header and the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if `buf` is too short or its contents are not a
    /// valid header of this type.
    fn parse(buf: &[u8]) -> Result<(Self, NonZero<usize>), Self::Error>;
}

/// Types which can be serialized to the front of a byte slice.
pub trait DeParse {
    /// The serialized length of this header in bytes.
    fn size(&self) -> NonZero<usize>;

    /// Write this header to the front of `buf`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns a [`LengthError`] if `buf` is shorter than [`DeParse::size`].
    fn deparse(&self, buf: &mut [u8]) -> Result<NonZero<usize>, LengthError>;
}

/// Error produced when a buffer is shorter than an operation requires.
#[derive(Debug, thiserror::Error)]
#[error("expected at least {expected} bytes, got {actual}")]
pub struct LengthError {
    /// The number of bytes the operation required.
    pub expected: NonZero<usize>,
    /// The number of bytes actually available.
    pub actual: usize,
}

pub(crate) fn check_deparse_len(size: NonZero<usize>, buf: &[u8]) -> Result<(), LengthError> {
    if buf.len() < size.get() {
        return Err(LengthError {
            expected: size,
            actual: buf.len(),
        });
    }
    Ok(())
}
