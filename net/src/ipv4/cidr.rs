// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 CIDR type
//!
//! A CIDR delimits the pool of IPv4 addresses a translator may assign to
//! flows.  The type validates the prefix length at construction and knows how
//! to enumerate the usable host addresses inside the prefix.

use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 prefix: address plus prefix length in [1, 32].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    length: u8,
}

/// Error produced when constructing an [`Ipv4Cidr`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Ipv4CidrError {
    /// Prefix length outside of [1, 32].
    #[error("invalid CIDR prefix length {0}: must be in [1, 32]")]
    InvalidLength(u8),
}

impl Ipv4Cidr {
    /// Create a CIDR from an address and a prefix length.
    ///
    /// The address is masked down to its network part.
    ///
    /// # Errors
    ///
    /// Returns [`Ipv4CidrError::InvalidLength`] if `length` is zero or
    /// exceeds 32.
    pub fn new(address: Ipv4Addr, length: u8) -> Result<Ipv4Cidr, Ipv4CidrError> {
        if length == 0 || length > 32 {
            return Err(Ipv4CidrError::InvalidLength(length));
        }
        let mask = u32::MAX << (32 - u32::from(length));
        Ok(Ipv4Cidr {
            address: Ipv4Addr::from(u32::from(address) & mask),
            length,
        })
    }

    /// The network address of the prefix.
    #[must_use]
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// The prefix length in bits.
    #[must_use]
    pub fn length(&self) -> u8 {
        self.length
    }

    /// The number of usable host addresses inside the prefix.
    ///
    /// The all-zeros and all-ones host ids are excluded for prefixes shorter
    /// than /31; a /31 has two usable addresses (RFC 3021) and a /32 one.
    #[must_use]
    pub fn host_count(&self) -> u32 {
        match self.length {
            32 => 1,
            31 => 2,
            len => (1u32 << (32 - len)) - 2,
        }
    }

    /// Enumerate the usable host addresses inside the prefix, lowest first.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let base = u32::from(self.address);
        let first_host_id: u32 = if self.length >= 31 { 0 } else { 1 };
        let count = self.host_count();
        (0..count).map(move |i| Ipv4Addr::from(base + first_host_id + i))
    }
}

impl Display for Ipv4Cidr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.length)
    }
}

/// Error produced when parsing an [`Ipv4Cidr`] from a string fails.
#[derive(Debug, thiserror::Error)]
pub enum Ipv4CidrParseError {
    /// Missing `/` separator or empty component.
    #[error("expected <address>/<length>")]
    BadFormat,
    /// The address part is not a valid IPv4 address.
    #[error("invalid address: {0}")]
    BadAddress(#[from] std::net::AddrParseError),
    /// The length part is not a number.
    #[error("invalid length: {0}")]
    BadLength(#[from] std::num::ParseIntError),
    /// The length is out of range.
    #[error(transparent)]
    OutOfRange(#[from] Ipv4CidrError),
}

impl FromStr for Ipv4Cidr {
    type Err = Ipv4CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s.split_once('/').ok_or(Ipv4CidrParseError::BadFormat)?;
        Ok(Ipv4Cidr::new(Ipv4Addr::from_str(addr)?, u8::from_str(len)?)?)
    }
}
