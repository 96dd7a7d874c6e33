// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! UDP header type and logic.

use crate::parse::{DeParse, LengthError, Parse, check_deparse_len};
use etherparse::UdpHeader;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::num::NonZero;

/// A UDP header.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Udp(UdpHeader);

impl Udp {
    /// The length of a UDP header.
    #[allow(clippy::unwrap_used)] // const-eval and trivially safe
    pub const LEN: NonZero<usize> = NonZero::new(8).unwrap();

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
    /// bytes following this header) and store it.
    ///
    /// A computed checksum of zero is emitted as `0xFFFF`: in UDP over IPv4 a
    /// zero value on the wire means "no checksum" (RFC 768).
    ///
    /// # Errors
    ///
    /// Returns a [`ChecksumError`] if the payload exceeds what the length
    /// field can express.
    ///
    /// [`ChecksumError`]: crate::checksum::ChecksumError
    pub fn update_checksum_ipv4(
        &mut self,
        source: Ipv4Addr,
        destination: Ipv4Addr,
        payload: &[u8],
    ) -> Result<(), crate::checksum::ChecksumError> {
        let checksum = self
            .0
            .calc_checksum_ipv4_raw(source.octets(), destination.octets(), payload)
            .map_err(|_| crate::checksum::ChecksumError::PayloadTooBig)?;
        self.0.checksum = if checksum == 0 { 0xFFFF } else { checksum };
        Ok(())
    }

    /// Recompute the checksum over an IPv6 pseudo-header and `payload` (the
    /// bytes following this header) and store it.
    ///
    /// The zero-checksum substitution of
    /// [`Udp::update_checksum_ipv4`] applies here too; in UDP over IPv6 the
    /// checksum is mandatory and zero is never valid (RFC 2460).
    ///
    /// # Errors
    ///
    /// Returns a [`ChecksumError`] if the payload exceeds what the length
    /// field can express.
    ///
    /// [`ChecksumError`]: crate::checksum::ChecksumError
    pub fn update_checksum_ipv6(
        &mut self,
        source: Ipv6Addr,
        destination: Ipv6Addr,
        payload: &[u8],
    ) -> Result<(), crate::checksum::ChecksumError> {
        let checksum = self
            .0
            .calc_checksum_ipv6_raw(source.octets(), destination.octets(), payload)
            .map_err(|_| crate::checksum::ChecksumError::PayloadTooBig)?;
        self.0.checksum = if checksum == 0 { 0xFFFF } else { checksum };
        Ok(())
    }
}

/// Error produced when a buffer does not hold a complete UDP header.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct UdpError(etherparse::err::LenError);

impl Parse for Udp {
    type Error = UdpError;

    fn parse(buf: &[u8]) -> Result<(Self, NonZero<usize>), Self::Error> {
        let (inner, _rest) = UdpHeader::from_slice(buf).map_err(UdpError)?;
        Ok((Udp(inner), Self::LEN))
    }
}

impl DeParse for Udp {
    fn size(&self) -> NonZero<usize> {
        Self::LEN
    }

    fn deparse(&self, buf: &mut [u8]) -> Result<NonZero<usize>, LengthError> {
        check_deparse_len(self.size(), buf)?;
        buf[..Self::LEN.get()].copy_from_slice(&self.0.to_bytes());
        Ok(self.size())
    }
}
