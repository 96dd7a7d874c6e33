// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Stateful NAT64 translation engine
//!
//! This crate rewrites IPv6 datagrams addressed to a configured synthetic
//! prefix (RFC 6052) into IPv4 datagrams and vice versa, maintaining per-flow
//! address and port mappings with idle-timeout eviction.  It is built for
//! in-process use next to an IPv6 forwarding path: single-threaded, sans-IO
//! (time enters as an explicit argument), operating directly on the packet
//! buffers of the surrounding stack.
//!
//! # Limitations
//!
//! The engine is subject to the following limitations:
//!
//! - Only UDP, TCP and ICMP echo are translated; every other protocol or
//!   ICMP type is dropped and counted.
//! - No fragmentation support; datagrams are translated whole.
//! - ICMP error messages are not translated.
//! - The IPv4 address pool is drawn from a single configured CIDR; when the
//!   CIDR is too small for one address per flow, all flows share its first
//!   address and port translation disambiguates them.

#![deny(
    unsafe_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

mod addr_pool;
mod counters;
mod icmp;
mod mapping;
mod port;
mod state;
mod time;
mod translator;

#[cfg(test)]
mod test;

pub use counters::{
    DirectionalDrops, DropReason, ErrorCounters, ProtocolCounters, TrafficCounters,
};
pub use mapping::MappingInfo;
pub use state::{Event, Notifier, State};
pub use time::Instant;
pub use translator::{
    Config, ConfigBuilder, IP4_MESSAGE_HEADROOM, MappingIterator, Translated, Translator,
};
