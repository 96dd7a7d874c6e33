// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 header type and manipulation

pub mod cidr;

use crate::ip::NextHeader;
use crate::parse::{DeParse, LengthError, Parse, check_deparse_len};
use etherparse::Ipv4Header;
use std::net::Ipv4Addr;
use std::num::NonZero;

/// An IPv4 header
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4(Ipv4Header);

impl Ipv4 {
    /// The minimum length of an IPv4 header (a header with no options)
    #[allow(clippy::unwrap_used)] // const-eval and trivially safe
    pub const MIN_LEN: NonZero<usize> = NonZero::new(20).unwrap();

    /// Build the header of a freshly translated datagram.
    ///
    /// Version and IHL are implied (no options); identification is zero and
    /// fragmentation fields are clear.  Total length and checksum are filled
    /// in by [`Ipv4::set_total_len`] and [`Ipv4::update_checksum`] once the
    /// payload is final.
    #[must_use]
    pub fn for_translated(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        ttl: u8,
        protocol: NextHeader,
    ) -> Ipv4 {
        let mut inner = Ipv4Header::default();
        inner.source = source.octets();
        inner.destination = destination.octets();
        inner.time_to_live = ttl;
        inner.protocol = protocol.into();
        inner.identification = 0;
        Ipv4(inner)
    }

    /// Get the source address of the header
    #[must_use]
    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.0.source)
    }

    /// Get the destination address of the header
    #[must_use]
    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.0.destination)
    }

    /// Get the next layer protocol which follows this header.
    #[must_use]
    pub fn protocol(&self) -> NextHeader {
        self.0.protocol.into()
    }

    /// The number of routing hops the packet is allowed to take.
    #[must_use]
    pub fn ttl(&self) -> u8 {
        self.0.time_to_live
    }

    /// The header's total length field (header plus payload, in bytes).
    #[must_use]
    pub fn total_len(&self) -> u16 {
        self.0.total_len
    }

    /// Length of the header (includes options) in bytes.
    #[must_use]
    pub fn header_len(&self) -> usize {
        self.0.header_len()
    }

    /// Set the total length field (header plus payload, in bytes).
    pub fn set_total_len(&mut self, total_len: u16) -> &mut Self {
        self.0.total_len = total_len;
        self
    }

    /// Recompute and store the header checksum over the current field values.
    pub fn update_checksum(&mut self) -> &mut Self {
        self.0.header_checksum = self.0.calc_header_checksum();
        self
    }

    /// The stored header checksum.  No attempt is made to validate it.
    #[must_use]
    pub fn checksum(&self) -> u16 {
        self.0.header_checksum
    }
}

/// Error produced when a buffer does not hold a valid IPv4 header.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Ipv4Error(etherparse::err::ipv4::HeaderSliceError);

impl Parse for Ipv4 {
    type Error = Ipv4Error;

    fn parse(buf: &[u8]) -> Result<(Self, NonZero<usize>), Self::Error> {
        let (inner, rest) = Ipv4Header::from_slice(buf).map_err(Ipv4Error)?;
        let consumed =
            NonZero::new(buf.len() - rest.len()).unwrap_or_else(|| unreachable!());
        Ok((Ipv4(inner), consumed))
    }
}

impl DeParse for Ipv4 {
    fn size(&self) -> NonZero<usize> {
        NonZero::new(self.0.header_len()).unwrap_or_else(|| unreachable!())
    }

    fn deparse(&self, buf: &mut [u8]) -> Result<NonZero<usize>, LengthError> {
        check_deparse_len(self.size(), buf)?;
        buf[..self.size().get()].copy_from_slice(&self.0.to_bytes());
        Ok(self.size())
    }
}

impl From<Ipv4> for Ipv4Header {
    fn from(value: Ipv4) -> Self {
        value.0
    }
}
