// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv6 header type and manipulation

pub mod prefix;

use crate::ip::NextHeader;
use crate::parse::{DeParse, LengthError, Parse, check_deparse_len};
use etherparse::{Ipv6FlowLabel, Ipv6Header};
use std::net::Ipv6Addr;
use std::num::NonZero;

/// An IPv6 header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6(Ipv6Header);

impl Ipv6 {
    /// The length of an [`Ipv6`] header (fixed, extension headers excluded).
    #[allow(clippy::unwrap_used)] // const-eval and trivially safe
    pub const LEN: NonZero<usize> = NonZero::new(40).unwrap();

    /// Build the header of a freshly translated datagram.
    ///
    /// Traffic class and flow label are zero.  The payload length is filled
    /// in by [`Ipv6::set_payload_length`] once the payload is final.
    #[must_use]
    pub fn for_translated(
        source: Ipv6Addr,
        destination: Ipv6Addr,
        hop_limit: u8,
        next_header: NextHeader,
    ) -> Ipv6 {
        Ipv6(Ipv6Header {
            traffic_class: 0,
            flow_label: Ipv6FlowLabel::ZERO,
            payload_length: 0,
            next_header: next_header.into(),
            hop_limit,
            source: source.octets(),
            destination: destination.octets(),
        })
    }

    /// Get the source address of this header
    #[must_use]
    pub fn source(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.0.source)
    }

    /// Get the destination address of this header
    #[must_use]
    pub fn destination(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.0.destination)
    }

    /// Get the type of the next header.
    #[must_use]
    pub fn next_header(&self) -> NextHeader {
        self.0.next_header.into()
    }

    /// Get the hop limit for this header (analogous to the IPv4 TTL)
    #[must_use]
    pub fn hop_limit(&self) -> u8 {
        self.0.hop_limit
    }

    /// The header's payload length field (bytes after the fixed header).
    #[must_use]
    pub fn payload_length(&self) -> u16 {
        self.0.payload_length
    }

    /// Set the payload length field (bytes after the fixed header).
    pub fn set_payload_length(&mut self, payload_length: u16) -> &mut Self {
        self.0.payload_length = payload_length;
        self
    }
}

/// Error produced when a buffer does not hold a valid IPv6 header.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Ipv6Error(etherparse::err::ipv6::HeaderSliceError);

impl Parse for Ipv6 {
    type Error = Ipv6Error;

    fn parse(buf: &[u8]) -> Result<(Self, NonZero<usize>), Self::Error> {
        let (inner, _rest) = Ipv6Header::from_slice(buf).map_err(Ipv6Error)?;
        Ok((Ipv6(inner), Self::LEN))
    }
}

impl DeParse for Ipv6 {
    fn size(&self) -> NonZero<usize> {
        Self::LEN
    }

    fn deparse(&self, buf: &mut [u8]) -> Result<NonZero<usize>, LengthError> {
        check_deparse_len(self.size(), buf)?;
        buf[..Self::LEN.get()].copy_from_slice(&self.0.to_bytes());
        Ok(self.size())
    }
}
