// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! `ICMPv6` header type and logic.

use crate::parse::{DeParse, LengthError, Parse, check_deparse_len};
use etherparse::{IcmpEchoHeader, Icmpv6Header, Icmpv6Type};
use std::net::Ipv6Addr;
use std::num::NonZero;

/// An `ICMPv6` header.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icmp6(Icmpv6Header);

impl Icmp6 {
    /// Build an Echo Request header (type 128).  The checksum is left at zero.
    #[must_use]
    pub fn new_echo_request(echo: IcmpEchoHeader) -> Icmp6 {
        Icmp6(Icmpv6Header::new(Icmpv6Type::EchoRequest(echo)))
    }

    /// Build an Echo Reply header (type 129).  The checksum is left at zero.
    #[must_use]
    pub fn new_echo_reply(echo: IcmpEchoHeader) -> Icmp6 {
        Icmp6(Icmpv6Header::new(Icmpv6Type::EchoReply(echo)))
    }

    /// The echo fields if this is an Echo Request.
    #[must_use]
    pub fn echo_request(&self) -> Option<IcmpEchoHeader> {
        match &self.0.icmp_type {
            Icmpv6Type::EchoRequest(echo) => Some(IcmpEchoHeader {
                id: echo.id,
                seq: echo.seq,
            }),
            _ => None,
        }
    }

    /// The echo fields if this is an Echo Reply.
    #[must_use]
    pub fn echo_reply(&self) -> Option<IcmpEchoHeader> {
        match &self.0.icmp_type {
            Icmpv6Type::EchoReply(echo) => Some(IcmpEchoHeader {
                id: echo.id,
                seq: echo.seq,
            }),
            _ => None,
        }
    }

    /// The identifier field of a query message.
    ///
    /// Echo messages carry their identifier; for types without one the bytes
    /// in its position are returned so lookups stay deterministic.
    #[must_use]
    pub fn identifier(&self) -> u16 {
        match &self.0.icmp_type {
            Icmpv6Type::EchoRequest(echo) | Icmpv6Type::EchoReply(echo) => echo.id,
            Icmpv6Type::Unknown { bytes5to8, .. } => {
                u16::from_be_bytes([bytes5to8[0], bytes5to8[1]])
            }
            _ => 0,
        }
    }

    /// The raw ICMP type value.
    #[must_use]
    pub fn type_u8(&self) -> u8 {
        self.0.icmp_type.type_u8()
    }

    /// Get the header's checksum.  No attempt is made to validate it.
    #[must_use]
    pub fn checksum(&self) -> u16 {
        self.0.checksum
    }

    /// Recompute the checksum over the IPv6 pseudo-header, this header and
    /// `payload` (the bytes following it) and store it.
    ///
    /// # Errors
    ///
    /// Returns a [`ChecksumError`] if the payload exceeds the maximum
    /// expressible length.
    ///
    /// [`ChecksumError`]: crate::checksum::ChecksumError
    pub fn update_checksum(
        &mut self,
        source: Ipv6Addr,
        destination: Ipv6Addr,
        payload: &[u8],
    ) -> Result<(), crate::checksum::ChecksumError> {
        self.0
            .update_checksum(source.octets(), destination.octets(), payload)
            .map_err(|_| crate::checksum::ChecksumError::PayloadTooBig)
    }
}

/// Error produced when a buffer does not hold a complete `ICMPv6` header.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Icmp6Error(etherparse::err::LenError);

impl Parse for Icmp6 {
    type Error = Icmp6Error;

    fn parse(buf: &[u8]) -> Result<(Self, NonZero<usize>), Self::Error> {
        let (inner, _rest) = Icmpv6Header::from_slice(buf).map_err(Icmp6Error)?;
        let consumed = NonZero::new(inner.header_len()).unwrap_or_else(|| unreachable!());
        Ok((Icmp6(inner), consumed))
    }
}

impl DeParse for Icmp6 {
    fn size(&self) -> NonZero<usize> {
        NonZero::new(self.0.header_len()).unwrap_or_else(|| unreachable!())
    }

    fn deparse(&self, buf: &mut [u8]) -> Result<NonZero<usize>, LengthError> {
        check_deparse_len(self.size(), buf)?;
        buf[..self.0.header_len()].copy_from_slice(&self.0.to_bytes());
        Ok(self.size())
    }
}
