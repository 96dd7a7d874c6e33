// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv6 prefix type and RFC 6052 address synthesis
//!
//! A NAT64 prefix is an IPv6 prefix into whose low bits IPv4 addresses are
//! embedded (RFC 6052 §2.2).  Only the prefix lengths 32, 40, 48, 56, 64 and
//! 96 admit the embedding; bits 64..71 (the "u" octet) are always skipped for
//! prefixes shorter than /96.

use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// An IPv6 prefix: address plus prefix length in [0, 128].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Ipv6Prefix {
    address: Ipv6Addr,
    length: u8,
}

/// Error produced when constructing an [`Ipv6Prefix`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Ipv6PrefixError {
    /// Prefix length exceeds 128.
    #[error("invalid prefix length {0}: must not exceed 128")]
    InvalidLength(u8),
}

impl Ipv6Prefix {
    /// Create a prefix from an address and a prefix length.
    ///
    /// The address is masked down to its prefix part.  Length zero is the
    /// empty ("cleared") prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Ipv6PrefixError::InvalidLength`] if `length` exceeds 128.
    pub fn new(address: Ipv6Addr, length: u8) -> Result<Ipv6Prefix, Ipv6PrefixError> {
        if length > 128 {
            return Err(Ipv6PrefixError::InvalidLength(length));
        }
        let mask = if length == 0 {
            0
        } else {
            u128::MAX << (128 - u32::from(length))
        };
        Ok(Ipv6Prefix {
            address: Ipv6Addr::from(u128::from(address) & mask),
            length,
        })
    }

    /// The (masked) prefix address.
    #[must_use]
    pub fn address(&self) -> Ipv6Addr {
        self.address
    }

    /// The prefix length in bits.
    #[must_use]
    pub fn length(&self) -> u8 {
        self.length
    }

    /// True if the prefix length admits RFC 6052 address embedding.
    #[must_use]
    pub fn is_valid_nat64(&self) -> bool {
        matches!(self.length, 32 | 40 | 48 | 56 | 64 | 96)
    }

    /// True if `addr` falls inside this prefix.
    #[must_use]
    pub fn matches(&self, addr: Ipv6Addr) -> bool {
        if self.length == 0 {
            return true;
        }
        let mask = u128::MAX << (128 - u32::from(self.length));
        (u128::from(addr) & mask) == u128::from(self.address)
    }

    /// Synthesize an IPv6 address by embedding `ip4` after the prefix
    /// (RFC 6052 §2.2).
    ///
    /// Callers must ensure [`Ipv6Prefix::is_valid_nat64`]; other lengths
    /// yield the prefix address unchanged.
    #[must_use]
    pub fn embed_ip4(&self, ip4: Ipv4Addr) -> Ipv6Addr {
        let mut octets = self.address.octets();
        let v4 = ip4.octets();
        match self.length {
            32 => octets[4..8].copy_from_slice(&v4),
            40 => {
                octets[5..8].copy_from_slice(&v4[..3]);
                octets[9] = v4[3];
            }
            48 => {
                octets[6..8].copy_from_slice(&v4[..2]);
                octets[9..11].copy_from_slice(&v4[2..]);
            }
            56 => {
                octets[7] = v4[0];
                octets[9..12].copy_from_slice(&v4[1..]);
            }
            64 => octets[9..13].copy_from_slice(&v4),
            96 => octets[12..16].copy_from_slice(&v4),
            _ => {}
        }
        Ipv6Addr::from(octets)
    }

    /// Extract the IPv4 address embedded in `addr` (RFC 6052 §2.2).
    ///
    /// The inverse of [`Ipv6Prefix::embed_ip4`]; callers must ensure
    /// [`Ipv6Prefix::is_valid_nat64`], other lengths yield the unspecified
    /// address.
    #[must_use]
    pub fn extract_ip4(&self, addr: Ipv6Addr) -> Ipv4Addr {
        let octets = addr.octets();
        let mut v4 = [0u8; 4];
        match self.length {
            32 => v4.copy_from_slice(&octets[4..8]),
            40 => {
                v4[..3].copy_from_slice(&octets[5..8]);
                v4[3] = octets[9];
            }
            48 => {
                v4[..2].copy_from_slice(&octets[6..8]);
                v4[2..].copy_from_slice(&octets[9..11]);
            }
            56 => {
                v4[0] = octets[7];
                v4[1..].copy_from_slice(&octets[9..12]);
            }
            64 => v4.copy_from_slice(&octets[9..13]),
            96 => v4.copy_from_slice(&octets[12..16]),
            _ => {}
        }
        Ipv4Addr::from(v4)
    }
}

impl Display for Ipv6Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.length)
    }
}

/// Error produced when parsing an [`Ipv6Prefix`] from a string fails.
#[derive(Debug, thiserror::Error)]
pub enum Ipv6PrefixParseError {
    /// Missing `/` separator or empty component.
    #[error("expected <address>/<length>")]
    BadFormat,
    /// The address part is not a valid IPv6 address.
    #[error("invalid address: {0}")]
    BadAddress(#[from] std::net::AddrParseError),
    /// The length part is not a number.
    #[error("invalid length: {0}")]
    BadLength(#[from] std::num::ParseIntError),
    /// The length is out of range.
    #[error(transparent)]
    OutOfRange(#[from] Ipv6PrefixError),
}

impl FromStr for Ipv6Prefix {
    type Err = Ipv6PrefixParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s.split_once('/').ok_or(Ipv6PrefixParseError::BadFormat)?;
        Ok(Ipv6Prefix::new(Ipv6Addr::from_str(addr)?, u8::from_str(len)?)?)
    }
}
