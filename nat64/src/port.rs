// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use serde::{Deserialize, Serialize};

/// A translated source port or ICMP identifier.
///
/// Translated values are confined to the dynamic/private port range
/// (RFC 7605 §4) so a rewritten flow can never collide with a well-known
/// service port on the IPv4 side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslatedPort(u16);

/// Error produced when a value lies outside the translation port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("port {0} outside the dynamic range")]
pub struct NotADynamicPort(u16);

impl TranslatedPort {
    /// First port of the dynamic/private range.
    pub const RANGE_START: u16 = 49152;
    /// Last port of the dynamic/private range.
    pub const RANGE_END: u16 = u16::MAX;

    /// Validate that `port` lies in the dynamic range.
    pub fn new_checked(port: u16) -> Result<TranslatedPort, NotADynamicPort> {
        if port < Self::RANGE_START {
            return Err(NotADynamicPort(port));
        }
        Ok(TranslatedPort(port))
    }

    /// The raw port value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// True if this port has the same parity (odd/even) as `other`.
    ///
    /// RFC 4787 §4.2.2 asks translators to preserve port parity.
    #[must_use]
    pub const fn parity_matches(self, other: u16) -> bool {
        (self.0 ^ other) & 1 == 0
    }
}
