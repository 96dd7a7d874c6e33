// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Helper types common to IPv4 and IPv6

use etherparse::IpNumber;

/// Thin wrapper around [`IpNumber`]
///
/// Identifies the protocol carried after an IP header (the IPv4 "protocol"
/// field or the IPv6 "next header" field).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NextHeader(IpNumber);

impl NextHeader {
    /// TCP (protocol number 6)
    pub const TCP: NextHeader = NextHeader(IpNumber::TCP);
    /// UDP (protocol number 17)
    pub const UDP: NextHeader = NextHeader(IpNumber::UDP);
    /// ICMP for IPv4 (protocol number 1)
    pub const ICMP4: NextHeader = NextHeader(IpNumber::ICMP);
    /// ICMP for IPv6 (protocol number 58)
    pub const ICMP6: NextHeader = NextHeader(IpNumber::IPV6_ICMP);

    /// Wrap a raw protocol number.
    #[must_use]
    pub const fn new(raw: u8) -> NextHeader {
        NextHeader(IpNumber(raw))
    }

    /// The raw protocol number.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0.0
    }

    /// True for ICMP in either IP version.
    #[must_use]
    pub fn is_icmp(self) -> bool {
        self == Self::ICMP4 || self == Self::ICMP6
    }
}

impl From<IpNumber> for NextHeader {
    fn from(value: IpNumber) -> Self {
        NextHeader(value)
    }
}

impl From<NextHeader> for IpNumber {
    fn from(value: NextHeader) -> Self {
        value.0
    }
}

impl core::fmt::Display for NextHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::TCP => write!(f, "TCP"),
            Self::UDP => write!(f, "UDP"),
            Self::ICMP4 => write!(f, "ICMP"),
            Self::ICMP6 => write!(f, "ICMPv6"),
            other => write!(f, "proto({})", other.as_u8()),
        }
    }
}
