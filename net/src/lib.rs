// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Wire-format types for a stateful NAT64 translator.
//!
//! This crate holds everything that touches raw octets: packet-buffer traits,
//! header wrappers for IPv4 / IPv6 / UDP / TCP / ICMP, the CIDR and NAT64
//! prefix types (including RFC 6052 address synthesis), and transport-layer
//! checksum recomputation.
//!
//! Header parsing and serialization delegate to [`etherparse`]; the wrappers
//! here scope its API down to the operations a translator performs and add
//! the pieces it lacks (prefix matching, address embedding, in-place checksum
//! updates over a datagram buffer).

#![deny(
    unsafe_code,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

pub mod buffer;
pub mod checksum;
pub mod icmp4;
pub mod icmp6;
pub mod ip;
pub mod ipv4;
pub mod ipv6;
pub mod parse;
pub mod tcp;
pub mod udp;
