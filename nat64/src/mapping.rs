// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per-flow address mappings
//!
//! Mappings live in a fixed-size arena; the set of live entries is a singly
//! linked list threaded through the arena by slot index.  This gives the
//! classic intrusive-list layout without per-entry heap churn: allocation and
//! release move a slot between the free chain and the active chain, and
//! lookups walk the active chain only.

use crate::counters::ProtocolCounters;
use crate::port::TranslatedPort;
use crate::time::Instant;
use net::ip::NextHeader;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Maximum number of concurrently active mappings.
pub(crate) const ADDRESS_MAPPING_POOL_SIZE: usize = 254;

/// Idle timeout for UDP and TCP flows.
pub(crate) const IDLE_TIMEOUT_MS: u64 = 7200 * 1000;

/// Idle timeout for ICMP flows.  Must not exceed [`IDLE_TIMEOUT_MS`]: the
/// sweep period is the smaller of the two.
pub(crate) const ICMP_IDLE_TIMEOUT_MS: u64 = 60 * 1000;

/// One live flow-group entry binding an IPv6 endpoint to an IPv4 endpoint.
#[derive(Debug)]
pub(crate) struct AddressMapping {
    /// Monotonically increasing identifier, randomly seeded per process.
    pub id: u64,
    /// IPv6 source address of the original flow (the inside endpoint).
    pub ip6: Ipv6Addr,
    /// IPv4 address representing `ip6` on the outside.
    pub ip4: Ipv4Addr,
    /// Original L4 source port or ICMP identifier.
    pub src_port_or_id: u16,
    /// Rewritten port/identifier used on the wire, when port translation is
    /// enabled.
    pub translated_port_or_id: Option<TranslatedPort>,
    /// Deadline after which the entry is eligible for reclamation.
    pub expiry: Instant,
    /// Per-mapping traffic counters.
    pub counters: ProtocolCounters,
}

impl AddressMapping {
    /// Refresh the idle deadline after observing a packet of `protocol`.
    pub(crate) fn touch(&mut self, now: Instant, protocol: NextHeader) {
        let timeout = if protocol.is_icmp() {
            ICMP_IDLE_TIMEOUT_MS
        } else {
            IDLE_TIMEOUT_MS
        };
        self.expiry = now + timeout;
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        self.expiry < now
    }
}

impl Display for AddressMapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.ip6, self.ip4)
    }
}

/// Copy-out record describing one active mapping.
///
/// Expired-but-not-yet-swept entries are reported with
/// `remaining_time_ms == 0` rather than hidden: eviction is lazy, and such an
/// entry may still carry traffic until the next sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingInfo {
    /// Mapping identifier, unique within the process lifetime.
    pub id: u64,
    /// IPv6 endpoint of the flow group.
    pub ip6: Ipv6Addr,
    /// IPv4 address assigned to the flow group.
    pub ip4: Ipv4Addr,
    /// Original source port or ICMP identifier.
    pub src_port_or_id: u16,
    /// Translated port or identifier; zero when port translation is off.
    pub translated_port_or_id: u16,
    /// Traffic translated under this mapping.
    pub counters: ProtocolCounters,
    /// Milliseconds until the idle deadline, zero if already past.
    pub remaining_time_ms: u64,
}

impl MappingInfo {
    pub(crate) fn copy_from(mapping: &AddressMapping, now: Instant) -> MappingInfo {
        MappingInfo {
            id: mapping.id,
            ip6: mapping.ip6,
            ip4: mapping.ip4,
            src_port_or_id: mapping.src_port_or_id,
            translated_port_or_id: mapping
                .translated_port_or_id
                .map_or(0, TranslatedPort::as_u16),
            counters: mapping.counters,
            remaining_time_ms: mapping.expiry.saturating_millis_since(now),
        }
    }
}

#[derive(Debug)]
struct Slot {
    /// Next slot in whichever chain this slot is on.
    next: Option<usize>,
    /// Occupied for active slots, empty for free ones.
    entry: Option<AddressMapping>,
}

/// Arena of mapping slots plus the chains threading through it.
#[derive(Debug)]
pub(crate) struct MappingTable {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    active_head: Option<usize>,
    active_len: usize,
}

impl MappingTable {
    pub(crate) fn new() -> MappingTable {
        let mut slots = Vec::with_capacity(ADDRESS_MAPPING_POOL_SIZE);
        for i in 0..ADDRESS_MAPPING_POOL_SIZE {
            slots.push(Slot {
                next: (i + 1 < ADDRESS_MAPPING_POOL_SIZE).then_some(i + 1),
                entry: None,
            });
        }
        MappingTable {
            slots,
            free_head: Some(0),
            active_head: None,
            active_len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.active_len
    }

    /// Insert `mapping` at the front of the active chain.
    ///
    /// Returns the slot index, or `None` when every slot is taken.
    pub(crate) fn insert(&mut self, mapping: AddressMapping) -> Option<usize> {
        let idx = self.free_head?;
        self.free_head = self.slots[idx].next;
        self.slots[idx].entry = Some(mapping);
        self.slots[idx].next = self.active_head;
        self.active_head = Some(idx);
        self.active_len += 1;
        Some(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut AddressMapping> {
        self.slots.get_mut(idx)?.entry.as_mut()
    }

    /// Find the active mapping for an outbound flow.
    ///
    /// The key is the IPv6 source address, extended by the source port or
    /// ICMP identifier when `src_port_or_id` is supplied (port translation).
    pub(crate) fn find_outbound(
        &self,
        ip6: Ipv6Addr,
        src_port_or_id: Option<u16>,
    ) -> Option<usize> {
        self.find(|m| {
            m.ip6 == ip6 && src_port_or_id.is_none_or(|port| m.src_port_or_id == port)
        })
    }

    /// Find the active mapping for an inbound flow.
    ///
    /// The key is the IPv4 destination address, extended by the destination
    /// port or ICMP identifier matched against the translated value when
    /// `dst_port_or_id` is supplied (port translation).
    pub(crate) fn find_inbound(
        &self,
        ip4: Ipv4Addr,
        dst_port_or_id: Option<u16>,
    ) -> Option<usize> {
        self.find(|m| {
            m.ip4 == ip4
                && dst_port_or_id.is_none_or(|port| {
                    m.translated_port_or_id
                        .is_some_and(|translated| translated.as_u16() == port)
                })
        })
    }

    /// True if any active mapping already uses `port` as its translated
    /// port or identifier.
    pub(crate) fn contains_translated_port(&self, port: u16) -> bool {
        self.find(|m| {
            m.translated_port_or_id
                .is_some_and(|translated| translated.as_u16() == port)
        })
        .is_some()
    }

    fn find(&self, mut pred: impl FnMut(&AddressMapping) -> bool) -> Option<usize> {
        let mut cursor = self.active_head;
        while let Some(idx) = cursor {
            let slot = &self.slots[idx];
            if let Some(entry) = &slot.entry
                && pred(entry)
            {
                return Some(idx);
            }
            cursor = slot.next;
        }
        None
    }

    /// Remove and return every active mapping whose deadline has passed.
    pub(crate) fn drain_expired(&mut self, now: Instant) -> Vec<AddressMapping> {
        self.drain_matching(|m| m.is_expired(now))
    }

    /// Remove and return every active mapping.
    pub(crate) fn drain_all(&mut self) -> Vec<AddressMapping> {
        self.drain_matching(|_| true)
    }

    fn drain_matching(
        &mut self,
        mut pred: impl FnMut(&AddressMapping) -> bool,
    ) -> Vec<AddressMapping> {
        let mut removed = Vec::new();
        let mut cursor = self.active_head;
        let mut prev: Option<usize> = None;
        while let Some(idx) = cursor {
            let next = self.slots[idx].next;
            let matched = self.slots[idx].entry.as_ref().is_some_and(&mut pred);
            if matched {
                // unlink from the active chain
                match prev {
                    Some(p) => self.slots[p].next = next,
                    None => self.active_head = next,
                }
                if let Some(entry) = self.slots[idx].entry.take() {
                    removed.push(entry);
                }
                // return the slot to the free chain
                self.slots[idx].next = self.free_head;
                self.free_head = Some(idx);
                self.active_len -= 1;
            } else {
                prev = Some(idx);
            }
            cursor = next;
        }
        removed
    }

    /// Walk the active chain front to back.
    pub(crate) fn iter(&self) -> ActiveIter<'_> {
        ActiveIter {
            table: self,
            cursor: self.active_head,
        }
    }
}

/// Iterator over the active chain of a [`MappingTable`].
pub(crate) struct ActiveIter<'a> {
    table: &'a MappingTable,
    cursor: Option<usize>,
}

impl<'a> Iterator for ActiveIter<'a> {
    type Item = &'a AddressMapping;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.cursor {
            let slot = &self.table.slots[idx];
            self.cursor = slot.next;
            if let Some(entry) = &slot.entry {
                return Some(entry);
            }
        }
        None
    }
}
