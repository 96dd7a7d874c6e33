// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 address pool
//!
//! Holds the host addresses enumerated from the configured CIDR which are not
//! currently bound to a mapping.  Fixed capacity: the pool never needs more
//! entries than there are mapping slots.

use crate::mapping::ADDRESS_MAPPING_POOL_SIZE;
use arrayvec::ArrayVec;
use net::ipv4::cidr::Ipv4Cidr;
use std::net::Ipv4Addr;

/// Pool of currently unassigned IPv4 addresses.
#[derive(Debug, Default)]
pub(crate) struct AddressPool {
    addrs: ArrayVec<Ipv4Addr, ADDRESS_MAPPING_POOL_SIZE>,
}

impl AddressPool {
    /// Discard the current contents and refill from `cidr`'s usable hosts,
    /// lowest address first, truncated to the pool capacity.
    pub(crate) fn repopulate(&mut self, cidr: &Ipv4Cidr) {
        self.addrs.clear();
        for addr in cidr.hosts().take(self.addrs.capacity()) {
            // capacity bounded by the take() above
            let _ = self.addrs.try_push(addr);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.addrs.clear();
    }

    /// Return an address to the pool.  Silently ignored when full.
    pub(crate) fn push(&mut self, addr: Ipv4Addr) {
        let _ = self.addrs.try_push(addr);
    }

    /// Take an address out of the pool.
    pub(crate) fn pop(&mut self) -> Option<Ipv4Addr> {
        self.addrs.pop()
    }

    /// The pool's first (lowest) address, shared by every flow when the CIDR
    /// is too small for per-flow addresses.
    pub(crate) fn first(&self) -> Option<Ipv4Addr> {
        self.addrs.first().copied()
    }

    /// The pool's last (highest) address.
    pub(crate) fn last(&self) -> Option<Ipv4Addr> {
        self.addrs.last().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.addrs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
