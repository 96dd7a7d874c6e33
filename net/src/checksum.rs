// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transport-layer checksum recomputation over a datagram buffer
//!
//! After a translation rewrote addresses and ports, the transport checksum
//! must be recomputed against the new pseudo-header.  [`update_transport_checksum`]
//! takes the transport section of a datagram (header plus payload, IP header
//! already stripped), parses the header for the given protocol, recomputes and
//! writes the checksum back in place.

use crate::icmp4::Icmp4;
use crate::icmp6::Icmp6;
use crate::ip::NextHeader;
use crate::parse::{DeParse, Parse};
use crate::tcp::Tcp;
use crate::udp::Udp;
use std::net::{Ipv4Addr, Ipv6Addr};

/// The address half of a transport pseudo-header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoHeader {
    /// IPv4 source and destination (RFC 768 / RFC 793 pseudo-header).
    V4 {
        /// Source address of the enclosing IPv4 header.
        source: Ipv4Addr,
        /// Destination address of the enclosing IPv4 header.
        destination: Ipv4Addr,
    },
    /// IPv6 source and destination (RFC 8200 §8.1 pseudo-header).
    V6 {
        /// Source address of the enclosing IPv6 header.
        source: Ipv6Addr,
        /// Destination address of the enclosing IPv6 header.
        destination: Ipv6Addr,
    },
}

/// Error produced when checksum recomputation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChecksumError {
    /// The transport section is shorter than the protocol's header.
    #[error("transport header truncated")]
    Truncated,
    /// The protocol has no checksum this module knows how to compute.
    #[error("unsupported transport protocol {0}")]
    UnsupportedProtocol(u8),
    /// The payload exceeds the maximum length the checksum covers.
    #[error("payload too big for checksum computation")]
    PayloadTooBig,
    /// The pseudo-header address family does not fit the protocol.
    #[error("pseudo-header address family does not match the protocol")]
    AddressFamilyMismatch,
}

/// Recompute the transport checksum of `transport` in place.
///
/// `transport` holds the L4 header followed by its payload; `protocol`
/// selects the header layout, `pseudo` supplies the enclosing IP addresses.
/// UDP and TCP accept either address family; ICMPv4 ignores the addresses and
/// ICMPv6 requires IPv6 ones.
///
/// # Errors
///
/// Returns a [`ChecksumError`] if the section is truncated, the protocol is
/// not UDP/TCP/ICMP, or the address family does not fit.
pub fn update_transport_checksum(
    transport: &mut [u8],
    protocol: NextHeader,
    pseudo: PseudoHeader,
) -> Result<(), ChecksumError> {
    match protocol {
        NextHeader::UDP => {
            let (mut udp, consumed) =
                Udp::parse(transport).map_err(|_| ChecksumError::Truncated)?;
            let (header, payload) = transport.split_at_mut(consumed.get());
            match pseudo {
                PseudoHeader::V4 {
                    source,
                    destination,
                } => udp.update_checksum_ipv4(source, destination, payload)?,
                PseudoHeader::V6 {
                    source,
                    destination,
                } => udp.update_checksum_ipv6(source, destination, payload)?,
            }
            udp.deparse(header).map_err(|_| ChecksumError::Truncated)?;
            Ok(())
        }
        NextHeader::TCP => {
            let (mut tcp, consumed) =
                Tcp::parse(transport).map_err(|_| ChecksumError::Truncated)?;
            let (header, payload) = transport.split_at_mut(consumed.get());
            match pseudo {
                PseudoHeader::V4 {
                    source,
                    destination,
                } => tcp.update_checksum_ipv4(source, destination, payload)?,
                PseudoHeader::V6 {
                    source,
                    destination,
                } => tcp.update_checksum_ipv6(source, destination, payload)?,
            }
            tcp.deparse(header).map_err(|_| ChecksumError::Truncated)?;
            Ok(())
        }
        NextHeader::ICMP4 => {
            let (mut icmp, consumed) =
                Icmp4::parse(transport).map_err(|_| ChecksumError::Truncated)?;
            let (header, payload) = transport.split_at_mut(consumed.get());
            icmp.update_checksum(payload)?;
            icmp.deparse(header).map_err(|_| ChecksumError::Truncated)?;
            Ok(())
        }
        NextHeader::ICMP6 => {
            let PseudoHeader::V6 {
                source,
                destination,
            } = pseudo
            else {
                return Err(ChecksumError::AddressFamilyMismatch);
            };
            let (mut icmp, consumed) =
                Icmp6::parse(transport).map_err(|_| ChecksumError::Truncated)?;
            let (header, payload) = transport.split_at_mut(consumed.get());
            icmp.update_checksum(source, destination, payload)?;
            icmp.deparse(header).map_err(|_| ChecksumError::Truncated)?;
            Ok(())
        }
        other => Err(ChecksumError::UnsupportedProtocol(other.as_u8())),
    }
}
