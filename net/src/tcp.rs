// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! TCP header type and logic.

use crate::parse::{DeParse, LengthError, Parse, check_deparse_len};
use etherparse::TcpHeader;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::num::NonZero;

/// A TCP header (options included).
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tcp(TcpHeader);

impl Tcp {
    /// The minimum length of a TCP header (a header with no options).
    #[allow(clippy::unwrap_used)] // const-eval and trivially safe
    pub const MIN_LEN: NonZero<usize> = NonZero::new(20).unwrap();

    /// Get the header's source port.
    #[must_use]
    pub fn source(&self) -> u16 {
        self.0.source_port
    }

    /// Get the header's destination port.
    #[must_use]
    pub fn destination(&self) -> u16 {
        self.0.destination_port
    }

    /// Get the header's checksum.  No attempt is made to validate it.
    #[must_use]
    pub fn checksum(&self) -> u16 {
        self.0.checksum
    }

    /// Length of the header (includes options) in bytes.
    #[must_use]
    pub fn header_len(&self) -> usize {
        self.0.header_len()
    }

    /// Set the source port.
    pub fn set_source(&mut self, port: u16) -> &mut Self {
        self.0.source_port = port;
        self
    }

    /// Set the destination port.
    pub fn set_destination(&mut self, port: u16) -> &mut Self {
        self.0.destination_port = port;
        self
    }

    /// Recompute the checksum over an IPv4 pseudo-header and `payload` (the
    /// bytes following this header, options excluded) and store it.
    ///
    /// # Errors
    ///
    /// Returns a [`ChecksumError`] if the segment exceeds the maximum
    /// expressible length.
    ///
    /// [`ChecksumError`]: crate::checksum::ChecksumError
    pub fn update_checksum_ipv4(
        &mut self,
        source: Ipv4Addr,
        destination: Ipv4Addr,
        payload: &[u8],
    ) -> Result<(), crate::checksum::ChecksumError> {
        self.0.checksum = self
            .0
            .calc_checksum_ipv4_raw(source.octets(), destination.octets(), payload)
            .map_err(|_| crate::checksum::ChecksumError::PayloadTooBig)?;
        Ok(())
    }

    /// Recompute the checksum over an IPv6 pseudo-header and `payload` (the
    /// bytes following this header, options excluded) and store it.
    ///
    /// # Errors
    ///
    /// Returns a [`ChecksumError`] if the segment exceeds the maximum
    /// expressible length.
    ///
    /// [`ChecksumError`]: crate::checksum::ChecksumError
    pub fn update_checksum_ipv6(
        &mut self,
        source: Ipv6Addr,
        destination: Ipv6Addr,
        payload: &[u8],
    ) -> Result<(), crate::checksum::ChecksumError> {
        self.0.checksum = self
            .0
            .calc_checksum_ipv6_raw(source.octets(), destination.octets(), payload)
            .map_err(|_| crate::checksum::ChecksumError::PayloadTooBig)?;
        Ok(())
    }
}

/// Error produced when a buffer does not hold a valid TCP header.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct TcpError(etherparse::err::tcp::HeaderSliceError);

impl Parse for Tcp {
    type Error = TcpError;

    fn parse(buf: &[u8]) -> Result<(Self, NonZero<usize>), Self::Error> {
        let (inner, _rest) = TcpHeader::from_slice(buf).map_err(TcpError)?;
        let consumed = NonZero::new(inner.header_len()).unwrap_or_else(|| unreachable!());
        Ok((Tcp(inner), consumed))
    }
}

impl DeParse for Tcp {
    fn size(&self) -> NonZero<usize> {
        NonZero::new(self.0.header_len()).unwrap_or_else(|| unreachable!())
    }

    fn deparse(&self, buf: &mut [u8]) -> Result<NonZero<usize>, LengthError> {
        check_deparse_len(self.size(), buf)?;
        buf[..self.size().get()].copy_from_slice(&self.0.to_bytes());
        Ok(self.size())
    }
}
