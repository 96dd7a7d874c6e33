// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Translation counters
//!
//! Two families: [`ProtocolCounters`] tracks translated traffic per L4
//! protocol and direction (kept both in aggregate and per mapping), and
//! [`ErrorCounters`] tracks dropped packets by reason and direction.
//! All counts saturate rather than wrap.

use net::ip::NextHeader;
use serde::{Deserialize, Serialize};

/// Packet and byte counts for one protocol, split by translation direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficCounters {
    /// Packets translated from IPv6 to IPv4.
    pub packets_6_to_4: u64,
    /// Bytes translated from IPv6 to IPv4.
    pub bytes_6_to_4: u64,
    /// Packets translated from IPv4 to IPv6.
    pub packets_4_to_6: u64,
    /// Bytes translated from IPv4 to IPv6.
    pub bytes_4_to_6: u64,
}

impl TrafficCounters {
    fn count_6_to_4(&mut self, bytes: u64) {
        self.packets_6_to_4 = self.packets_6_to_4.saturating_add(1);
        self.bytes_6_to_4 = self.bytes_6_to_4.saturating_add(bytes);
    }

    fn count_4_to_6(&mut self, bytes: u64) {
        self.packets_4_to_6 = self.packets_4_to_6.saturating_add(1);
        self.bytes_4_to_6 = self.bytes_4_to_6.saturating_add(bytes);
    }
}

/// Translated-traffic counters for UDP, TCP, ICMP and their total.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolCounters {
    /// UDP traffic.
    pub udp: TrafficCounters,
    /// TCP traffic.
    pub tcp: TrafficCounters,
    /// ICMP echo traffic.
    pub icmp: TrafficCounters,
    /// All translated traffic.
    pub total: TrafficCounters,
}

impl ProtocolCounters {
    /// Record one IPv6-to-IPv4 translation of `bytes` payload bytes.
    pub(crate) fn count_6_to_4(&mut self, protocol: NextHeader, bytes: u64) {
        match protocol {
            NextHeader::UDP => self.udp.count_6_to_4(bytes),
            NextHeader::TCP => self.tcp.count_6_to_4(bytes),
            NextHeader::ICMP6 => self.icmp.count_6_to_4(bytes),
            _ => {}
        }
        self.total.count_6_to_4(bytes);
    }

    /// Record one IPv4-to-IPv6 translation of `bytes` payload bytes.
    pub(crate) fn count_4_to_6(&mut self, protocol: NextHeader, bytes: u64) {
        match protocol {
            NextHeader::UDP => self.udp.count_4_to_6(bytes),
            NextHeader::TCP => self.tcp.count_4_to_6(bytes),
            NextHeader::ICMP4 => self.icmp.count_4_to_6(bytes),
            _ => {}
        }
        self.total.count_4_to_6(bytes);
    }
}

/// Why a packet was dropped instead of translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// Failure without a more specific classification.
    Unknown,
    /// The datagram was not parseable as its claimed IP version.
    IllegalPacket,
    /// No mapping existed or could be allocated for the flow.
    NoMapping,
    /// The L4 protocol is not translatable.
    UnsupportedProto,
}

/// Drop counts for one reason, split by translation direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalDrops {
    /// Drops of IPv6 datagrams headed to IPv4.
    pub count_6_to_4: u64,
    /// Drops of IPv4 datagrams headed to IPv6.
    pub count_4_to_6: u64,
}

/// Dropped-packet counters, per [`DropReason`] and direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCounters {
    /// Unclassified failures.
    pub unknown: DirectionalDrops,
    /// Datagrams that failed header parsing.
    pub illegal_packet: DirectionalDrops,
    /// Flows with no (allocatable) mapping.
    pub no_mapping: DirectionalDrops,
    /// Untranslatable L4 protocols.
    pub unsupported_protocol: DirectionalDrops,
}

impl ErrorCounters {
    pub(crate) fn count_6_to_4(&mut self, reason: DropReason) {
        let slot = self.slot(reason);
        slot.count_6_to_4 = slot.count_6_to_4.saturating_add(1);
    }

    pub(crate) fn count_4_to_6(&mut self, reason: DropReason) {
        let slot = self.slot(reason);
        slot.count_4_to_6 = slot.count_4_to_6.saturating_add(1);
    }

    /// The drop counts recorded for `reason`.
    #[must_use]
    pub fn drops(&self, reason: DropReason) -> DirectionalDrops {
        match reason {
            DropReason::Unknown => self.unknown,
            DropReason::IllegalPacket => self.illegal_packet,
            DropReason::NoMapping => self.no_mapping,
            DropReason::UnsupportedProto => self.unsupported_protocol,
        }
    }

    fn slot(&mut self, reason: DropReason) -> &mut DirectionalDrops {
        match reason {
            DropReason::Unknown => &mut self.unknown,
            DropReason::IllegalPacket => &mut self.illegal_packet,
            DropReason::NoMapping => &mut self.no_mapping,
            DropReason::UnsupportedProto => &mut self.unsupported_protocol,
        }
    }
}
