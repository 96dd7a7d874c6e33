// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! End-to-end scenarios for the translator over [`TestBuffer`] datagrams.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::translator::IP4_MESSAGE_HEADROOM;
use crate::{
    Config, DropReason, Event, Instant, Notifier, State, Translated, Translator,
};
use etherparse::{Icmpv4Header, Icmpv4Type, Icmpv6Header, Icmpv6Type, Ipv4Header, Ipv6Header,
    PacketBuilder, UdpHeader};
use net::buffer::TestBuffer;
use net::ip::NextHeader;
use net::ipv6::Ipv6;
use net::parse::DeParse;
use std::cell::RefCell;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::rc::Rc;
use std::str::FromStr;
use tracing_test::traced_test;

const T0: Instant = Instant::from_millis(1_000);
const UDP_TCP_TIMEOUT_MS: u64 = 7200 * 1000;
const ICMP_TIMEOUT_MS: u64 = 60 * 1000;

struct RecordingNotifier(Rc<RefCell<Vec<Event>>>);

impl Notifier for RecordingNotifier {
    fn signal(&mut self, event: Event) {
        self.0.borrow_mut().push(event);
    }
}

fn v4(addr: &str) -> Ipv4Addr {
    Ipv4Addr::from_str(addr).expect("bad IPv4 address")
}

fn v6(addr: &str) -> Ipv6Addr {
    Ipv6Addr::from_str(addr).expect("bad IPv6 address")
}

fn translator_with_events() -> (Translator, Rc<RefCell<Vec<Event>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let translator = Translator::new(T0, Config::default(), RecordingNotifier(Rc::clone(&events)));
    (translator, events)
}

/// An enabled translator with CIDR 192.0.2.0/24 and the well-known prefix.
fn active_translator() -> Translator {
    let mut translator = Translator::new(T0, Config::default(), ());
    translator.set_enabled(true);
    translator.set_ip4_cidr("192.0.2.0/24".parse().unwrap());
    translator.set_nat64_prefix("64:ff9b::/96".parse().unwrap());
    assert_eq!(translator.state(), State::Active);
    translator
}

fn udp6_datagram(src: &str, dst: &str, sport: u16, dport: u16, payload: &[u8]) -> TestBuffer {
    let builder = PacketBuilder::ipv6(v6(src).octets(), v6(dst).octets(), 64).udp(sport, dport);
    let mut out = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut out, payload).unwrap();
    TestBuffer::from_raw_data(&out)
}

fn tcp6_datagram(src: &str, dst: &str, sport: u16, dport: u16, payload: &[u8]) -> TestBuffer {
    let builder =
        PacketBuilder::ipv6(v6(src).octets(), v6(dst).octets(), 64).tcp(sport, dport, 1000, 8192);
    let mut out = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut out, payload).unwrap();
    TestBuffer::from_raw_data(&out)
}

fn icmp6_echo_request(src: &str, dst: &str, id: u16, seq: u16, payload: &[u8]) -> TestBuffer {
    let builder =
        PacketBuilder::ipv6(v6(src).octets(), v6(dst).octets(), 64).icmpv6_echo_request(id, seq);
    let mut out = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut out, payload).unwrap();
    TestBuffer::from_raw_data(&out)
}

fn udp4_datagram(src: &str, dst: Ipv4Addr, sport: u16, dport: u16, payload: &[u8]) -> TestBuffer {
    let builder = PacketBuilder::ipv4(v4(src).octets(), dst.octets(), 64).udp(sport, dport);
    let mut out = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut out, payload).unwrap();
    TestBuffer::with_headroom(IP4_MESSAGE_HEADROOM, &out)
}

fn tcp4_datagram(src: &str, dst: Ipv4Addr, sport: u16, dport: u16, payload: &[u8]) -> TestBuffer {
    let builder =
        PacketBuilder::ipv4(v4(src).octets(), dst.octets(), 64).tcp(sport, dport, 7, 1024);
    let mut out = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut out, payload).unwrap();
    TestBuffer::with_headroom(IP4_MESSAGE_HEADROOM, &out)
}

fn icmp4_echo_reply(src: &str, dst: Ipv4Addr, id: u16, seq: u16, payload: &[u8]) -> TestBuffer {
    let builder =
        PacketBuilder::ipv4(v4(src).octets(), dst.octets(), 64).icmpv4_echo_reply(id, seq);
    let mut out = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut out, payload).unwrap();
    TestBuffer::with_headroom(IP4_MESSAGE_HEADROOM, &out)
}

/// IPv6 datagram carrying a protocol the translator does not handle.
fn sctp6_datagram(src: &str, dst: &str) -> TestBuffer {
    let payload = [0u8; 16];
    let mut header = Ipv6::for_translated(v6(src), v6(dst), 64, NextHeader::new(132));
    header.set_payload_length(u16::try_from(payload.len()).unwrap());
    let mut out = vec![0u8; 40 + payload.len()];
    header.deparse(&mut out).unwrap();
    out[40..].copy_from_slice(&payload);
    TestBuffer::from_raw_data(&out)
}

fn expect_forward(result: Translated<TestBuffer>) -> TestBuffer {
    match result {
        Translated::Forward(buf) => buf,
        other => panic!("expected Forward, got {other:?}"),
    }
}

fn expect_drop(result: Translated<TestBuffer>) -> DropReason {
    match result {
        Translated::Drop(reason) => reason,
        other => panic!("expected Drop, got {other:?}"),
    }
}

/// Parse the output of an outbound translation into (header, transport).
fn split_ip4(datagram: &[u8]) -> (Ipv4Header, &[u8]) {
    let (header, rest) = Ipv4Header::from_slice(datagram).unwrap();
    (header, rest)
}

fn split_ip6(datagram: &[u8]) -> (Ipv6Header, &[u8]) {
    let (header, rest) = Ipv6Header::from_slice(datagram).unwrap();
    (header, rest)
}

//
// Scenario: first outbound UDP packet
//

#[test]
#[traced_test]
fn first_outbound_udp_creates_mapping() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"hello");

    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());

    assert_eq!(Ipv4Addr::from(ip4.destination), v4("203.0.113.5"));
    assert!(
        u32::from_be_bytes(ip4.source) & 0xFFFF_FF00 == u32::from(v4("192.0.2.0")),
        "source must come from the configured CIDR"
    );
    assert_eq!(ip4.time_to_live, 64);
    assert_eq!(ip4.protocol, etherparse::IpNumber::UDP);
    assert_eq!(usize::from(ip4.total_len), 20 + 8 + 5);
    assert_eq!(ip4.identification, 0);
    assert_eq!(ip4.header_checksum, ip4.calc_header_checksum());

    let (udp, udp_payload) = UdpHeader::from_slice(transport).unwrap();
    assert_eq!(udp.destination_port, 443);
    assert!(udp.source_port >= 49152, "translated port in dynamic range");
    assert_eq!(udp.source_port & 1, 33000 & 1, "parity preserved");
    assert_eq!(udp_payload, b"hello");
    let expected = udp
        .calc_checksum_ipv4_raw(ip4.source, ip4.destination, udp_payload)
        .unwrap();
    assert_eq!(udp.checksum, expected, "checksum valid after translation");

    assert_eq!(translator.active_mapping_count(), 1);
    let info = translator.mappings(T0).next().unwrap();
    assert_eq!(info.ip6, v6("2001:db8::1"));
    assert_eq!(info.src_port_or_id, 33000);
    assert_eq!(info.translated_port_or_id, udp.source_port);
    assert_eq!(info.remaining_time_ms, UDP_TCP_TIMEOUT_MS);

    let counters = translator.counters();
    assert_eq!(counters.udp.packets_6_to_4, 1);
    assert_eq!(counters.udp.bytes_6_to_4, 13);
    assert_eq!(counters.total.packets_6_to_4, 1);
}

//
// Scenario: matching inbound reply
//

#[test]
#[traced_test]
fn inbound_reply_restores_original_flow() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"ping");
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    let mapped_addr = Ipv4Addr::from(ip4.source);
    let (udp, _) = UdpHeader::from_slice(transport).unwrap();
    let translated_port = udp.source_port;

    let reply = udp4_datagram("203.0.113.5", mapped_addr, 443, translated_port, b"pong");
    let out = expect_forward(translator.translate_to_ip6(T0 + 10, reply));
    let (ip6, transport) = split_ip6(out.as_ref());

    assert_eq!(Ipv6Addr::from(ip6.source), v6("64:ff9b::203.0.113.5"));
    assert_eq!(Ipv6Addr::from(ip6.destination), v6("2001:db8::1"));
    assert_eq!(ip6.hop_limit, 64);
    assert_eq!(ip6.next_header, etherparse::IpNumber::UDP);
    assert_eq!(usize::from(ip6.payload_length), 8 + 4);

    let (udp, udp_payload) = UdpHeader::from_slice(transport).unwrap();
    assert_eq!(udp.source_port, 443);
    assert_eq!(udp.destination_port, 33000, "original source port restored");
    assert_eq!(udp_payload, b"pong");
    let expected = udp
        .calc_checksum_ipv6_raw(ip6.source, ip6.destination, udp_payload)
        .unwrap();
    assert_eq!(udp.checksum, expected);

    // one mapping serves both directions
    assert_eq!(translator.active_mapping_count(), 1);
    let counters = translator.counters();
    assert_eq!(counters.udp.packets_4_to_6, 1);
    assert_eq!(counters.udp.bytes_4_to_6, 12);
}

#[test]
fn outbound_inbound_symmetry_for_tcp() {
    let mut translator = active_translator();
    let buf = tcp6_datagram("2001:db8::77", "64:ff9b::198.51.100.7", 40001, 8080, b"syn");
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    let (tcp, _) = etherparse::TcpHeader::from_slice(transport).unwrap();
    assert!(tcp.source_port >= 49152);
    assert_eq!(tcp.source_port & 1, 40001 & 1);

    let reply = tcp4_datagram(
        "198.51.100.7",
        Ipv4Addr::from(ip4.source),
        8080,
        tcp.source_port,
        b"ack",
    );
    let out = expect_forward(translator.translate_to_ip6(T0, reply));
    let (ip6, transport) = split_ip6(out.as_ref());
    let (tcp, tcp_payload) = etherparse::TcpHeader::from_slice(transport).unwrap();

    assert_eq!(Ipv6Addr::from(ip6.destination), v6("2001:db8::77"));
    assert_eq!(tcp.destination_port, 40001);
    let expected = tcp
        .calc_checksum_ipv6_raw(ip6.source, ip6.destination, tcp_payload)
        .unwrap();
    assert_eq!(tcp.checksum, expected);
}

//
// Scenario: ICMP echo translation
//

#[test]
#[traced_test]
fn icmp_echo_round_trip() {
    let mut translator = active_translator();
    let buf = icmp6_echo_request(
        "2001:db8::1",
        "64:ff9b::198.51.100.7",
        0x1234,
        9,
        b"probe",
    );
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    assert_eq!(ip4.protocol, etherparse::IpNumber::ICMP);
    assert_eq!(Ipv4Addr::from(ip4.destination), v4("198.51.100.7"));

    let (icmp4, icmp_payload) = Icmpv4Header::from_slice(transport).unwrap();
    let Icmpv4Type::EchoRequest(echo) = &icmp4.icmp_type else {
        panic!("expected ICMPv4 Echo Request, got {:?}", icmp4.icmp_type);
    };
    assert!(echo.id >= 49152, "translated id in dynamic range");
    assert_eq!(echo.id & 1, 0x1234 & 1, "identifier parity preserved");
    assert_eq!(echo.seq, 9);
    assert_eq!(icmp_payload, b"probe");
    let mut check = icmp4.clone();
    check.update_checksum(icmp_payload);
    assert_eq!(icmp4.checksum, check.checksum);

    // the mapping uses the ICMP idle timeout
    let info = translator.mappings(T0).next().unwrap();
    assert_eq!(info.remaining_time_ms, ICMP_TIMEOUT_MS);

    let reply = icmp4_echo_reply(
        "198.51.100.7",
        Ipv4Addr::from(ip4.source),
        echo.id,
        9,
        b"probe",
    );
    let out = expect_forward(translator.translate_to_ip6(T0, reply));
    let (ip6, transport) = split_ip6(out.as_ref());
    assert_eq!(ip6.next_header, etherparse::IpNumber::IPV6_ICMP);

    let (icmp6, icmp_payload) = Icmpv6Header::from_slice(transport).unwrap();
    let Icmpv6Type::EchoReply(echo) = &icmp6.icmp_type else {
        panic!("expected ICMPv6 Echo Reply, got {:?}", icmp6.icmp_type);
    };
    assert_eq!(echo.id, 0x1234, "original identifier restored");
    assert_eq!(echo.seq, 9);
    let expected = icmp6
        .icmp_type
        .calc_checksum(ip6.source, ip6.destination, icmp_payload)
        .unwrap();
    assert_eq!(icmp6.checksum, expected);
}

#[test]
fn non_echo_icmp_is_dropped() {
    let mut translator = active_translator();
    // ICMPv6 Destination Unreachable toward the prefix
    let payload = [0u8; 8];
    let mut header = Ipv6::for_translated(
        v6("2001:db8::1"),
        v6("64:ff9b::198.51.100.7"),
        64,
        NextHeader::ICMP6,
    );
    header.set_payload_length(u16::try_from(payload.len()).unwrap());
    let mut out = vec![0u8; 40 + payload.len()];
    header.deparse(&mut out).unwrap();
    out[40] = 1; // Destination Unreachable
    let buf = TestBuffer::from_raw_data(&out);

    let reason = expect_drop(translator.translate_from_ip6(T0, buf));
    assert_eq!(reason, DropReason::Unknown);
    assert_eq!(
        translator.error_counters().drops(DropReason::Unknown).count_6_to_4,
        1
    );
}

//
// Scenario: unsupported protocol
//

#[test]
fn unsupported_protocol_drops_and_counts() {
    let mut translator = active_translator();
    let buf = sctp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5");

    let reason = expect_drop(translator.translate_from_ip6(T0, buf));
    assert_eq!(reason, DropReason::UnsupportedProto);
    assert_eq!(
        translator
            .error_counters()
            .drops(DropReason::UnsupportedProto)
            .count_6_to_4,
        1
    );
    assert_eq!(translator.counters().total.packets_6_to_4, 0);
}

//
// Scenario: mapping pool exhaustion and recovery through expiry
//

#[test]
#[traced_test]
fn pool_exhaustion_recovers_after_expiry() {
    let mut translator = active_translator();

    // 192.0.2.0/24 backs exactly 254 mappings
    for i in 0..254u32 {
        let src = format!("2001:db8::{:x}", i + 1);
        let buf = udp6_datagram(&src, "64:ff9b::203.0.113.5", 33000, 443, b"x");
        expect_forward(translator.translate_from_ip6(T0, buf));
    }
    assert_eq!(translator.active_mapping_count(), 254);

    // one more flow finds neither a free slot nor a free address
    let straw = udp6_datagram("2001:db8::ffff", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    let reason = expect_drop(translator.translate_from_ip6(T0, straw));
    assert_eq!(reason, DropReason::NoMapping);
    assert_eq!(
        translator.error_counters().drops(DropReason::NoMapping).count_6_to_4,
        1
    );

    // after the idle timeout the sweep reclaims everything
    let later = T0 + UDP_TCP_TIMEOUT_MS + 1;
    assert!(translator.poll_timer_at() <= later);
    translator.handle_expiry_timer(later);
    assert_eq!(translator.active_mapping_count(), 0);

    let retry = udp6_datagram("2001:db8::ffff", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    expect_forward(translator.translate_from_ip6(later, retry));
    assert_eq!(translator.active_mapping_count(), 1);
}

#[test]
fn allocation_sweeps_expired_mappings_on_demand() {
    let mut translator = active_translator();
    for i in 0..254u32 {
        let src = format!("2001:db8::{:x}", i + 1);
        let buf = udp6_datagram(&src, "64:ff9b::203.0.113.5", 33000, 443, b"x");
        expect_forward(translator.translate_from_ip6(T0, buf));
    }

    // no timer fired, but allocation itself reclaims expired entries
    let later = T0 + UDP_TCP_TIMEOUT_MS + 1;
    let buf = udp6_datagram("2001:db8::ffff", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    expect_forward(translator.translate_from_ip6(later, buf));
    assert_eq!(translator.active_mapping_count(), 1);
}

//
// Scenario: lifecycle state machine
//

#[test]
#[traced_test]
fn state_transitions_and_events() {
    let (mut translator, events) = translator_with_events();
    assert_eq!(translator.state(), State::Disabled);
    assert!(events.borrow().is_empty());

    translator.set_enabled(true);
    assert_eq!(translator.state(), State::NotRunning);
    assert_eq!(events.borrow().len(), 1);

    // enabling twice is a no-op
    translator.set_enabled(true);
    assert_eq!(events.borrow().len(), 1);

    // a CIDR alone does not activate, but reconfiguring the pool signals
    translator.set_ip4_cidr("192.0.2.0/24".parse().unwrap());
    assert_eq!(translator.state(), State::NotRunning);
    assert_eq!(events.borrow().len(), 2);

    translator.set_nat64_prefix("64:ff9b::/96".parse().unwrap());
    assert_eq!(translator.state(), State::Active);
    assert_eq!(events.borrow().len(), 3);

    // setting the same prefix again changes nothing
    translator.set_nat64_prefix("64:ff9b::/96".parse().unwrap());
    assert_eq!(events.borrow().len(), 3);

    translator.clear_nat64_prefix();
    assert_eq!(translator.state(), State::NotRunning);
    assert_eq!(events.borrow().len(), 4);

    translator.set_enabled(false);
    assert_eq!(translator.state(), State::Disabled);
    assert_eq!(events.borrow().len(), 5);
}

#[test]
fn nat64_prefix_length_validity() {
    let mut translator = Translator::new(T0, Config::default(), ());
    translator.set_enabled(true);
    translator.set_ip4_cidr("192.0.2.0/24".parse().unwrap());

    for len in [32u8, 40, 48, 56, 64, 96] {
        let prefix = net::ipv6::prefix::Ipv6Prefix::new(v6("64:ff9b::"), len).unwrap();
        translator.set_nat64_prefix(prefix);
        assert_eq!(translator.state(), State::Active, "length {len}");
        assert_eq!(translator.nat64_prefix(), Some(&prefix));
    }

    // any other length behaves like a clear
    let odd = net::ipv6::prefix::Ipv6Prefix::new(v6("64:ff9b::"), 33).unwrap();
    translator.set_nat64_prefix(odd);
    assert_eq!(translator.state(), State::NotRunning);
    assert_eq!(translator.nat64_prefix(), None);
}

#[test]
fn disabling_releases_all_mappings() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    expect_forward(translator.translate_from_ip6(T0, buf));
    assert_eq!(translator.active_mapping_count(), 1);

    translator.set_enabled(false);
    assert_eq!(translator.active_mapping_count(), 0);
    assert_eq!(translator.state(), State::Disabled);

    // disabled translators leave IPv6 traffic alone
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    assert!(matches!(
        translator.translate_from_ip6(T0, buf),
        Translated::NotTranslated(_)
    ));
}

//
// Candidate selection
//

#[test]
fn destination_outside_prefix_is_not_translated() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "2001:db8:ffff::5", 33000, 443, b"x");
    let result = translator.translate_from_ip6(T0, buf);
    let Translated::NotTranslated(buf) = result else {
        panic!("expected NotTranslated");
    };
    // untouched datagram
    let (ip6, _) = split_ip6(buf.as_ref());
    assert_eq!(Ipv6Addr::from(ip6.destination), v6("2001:db8:ffff::5"));
    assert_eq!(translator.active_mapping_count(), 0);
}

#[test]
fn unconfigured_translator_is_a_bypass() {
    let mut translator = Translator::new(T0, Config::default(), ());
    translator.set_enabled(true);
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    assert!(matches!(
        translator.translate_from_ip6(T0, buf),
        Translated::NotTranslated(_)
    ));
}

#[test]
fn inbound_ipv6_datagram_is_not_translated() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "2001:db8::2", 1, 2, b"x");
    assert!(matches!(
        translator.translate_to_ip6(T0, buf),
        Translated::NotTranslated(_)
    ));
}

#[test]
#[traced_test]
fn inbound_without_cidr_passes_through() {
    let mut translator = Translator::new(T0, Config::default(), ());
    translator.set_enabled(true);
    let buf = udp4_datagram("203.0.113.5", v4("192.0.2.1"), 443, 49152, b"x");
    let out = expect_forward(translator.translate_to_ip6(T0, buf));
    // unchanged IPv4 datagram
    let (ip4, _) = split_ip4(out.as_ref());
    assert_eq!(Ipv4Addr::from(ip4.destination), v4("192.0.2.1"));
}

#[test]
fn inbound_without_prefix_drops() {
    let mut translator = Translator::new(T0, Config::default(), ());
    translator.set_enabled(true);
    translator.set_ip4_cidr("192.0.2.0/24".parse().unwrap());
    let buf = udp4_datagram("203.0.113.5", v4("192.0.2.1"), 443, 49152, b"x");
    let reason = expect_drop(translator.translate_to_ip6(T0, buf));
    assert_eq!(reason, DropReason::Unknown);
}

#[test]
fn inbound_without_mapping_drops() {
    let mut translator = active_translator();
    let buf = udp4_datagram("203.0.113.5", v4("192.0.2.1"), 443, 49152, b"x");
    let reason = expect_drop(translator.translate_to_ip6(T0, buf));
    assert_eq!(reason, DropReason::NoMapping);
    assert_eq!(
        translator.error_counters().drops(DropReason::NoMapping).count_4_to_6,
        1
    );
}

#[test]
fn garbage_drops_as_illegal_packet() {
    let mut translator = active_translator();
    let buf = TestBuffer::from_raw_data(&[0xFF; 10]);
    let reason = expect_drop(translator.translate_from_ip6(T0, buf));
    assert_eq!(reason, DropReason::IllegalPacket);

    let buf = TestBuffer::from_raw_data(&[0xFF; 10]);
    let reason = expect_drop(translator.translate_to_ip6(T0, buf));
    assert_eq!(reason, DropReason::IllegalPacket);
}

#[test]
#[traced_test]
fn inbound_prepend_failure_drops() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    let (udp, _) = UdpHeader::from_slice(transport).unwrap();

    // a reply with too little headroom for the longer IPv6 header
    let builder = PacketBuilder::ipv4(
        v4("203.0.113.5").octets(),
        ip4.source,
        64,
    )
    .udp(443, udp.source_port);
    let mut raw = Vec::with_capacity(builder.size(1));
    builder.write(&mut raw, &[0]).unwrap();
    let reply = TestBuffer::with_headroom(IP4_MESSAGE_HEADROOM - 1, &raw);

    let reason = expect_drop(translator.translate_to_ip6(T0, reply));
    assert_eq!(reason, DropReason::Unknown);
}

//
// Mapping invariants
//

#[test]
fn translated_ports_are_unique_in_range_with_matching_parity() {
    let mut translator = active_translator();
    let mut seen = std::collections::HashSet::new();
    for i in 0..100u16 {
        let sport = 1000 + i;
        let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", sport, 443, b"x");
        expect_forward(translator.translate_from_ip6(T0, buf));
        let info = translator
            .mappings(T0)
            .find(|m| m.src_port_or_id == sport)
            .unwrap();
        let port = info.translated_port_or_id;
        assert!(port >= 49152);
        assert_eq!(port & 1, sport & 1);
        assert!(seen.insert(port), "translated port {port} reused");
    }
    assert_eq!(translator.active_mapping_count(), 100);
}

#[test]
fn pool_mode_assigns_distinct_addresses() {
    let mut translator = active_translator();
    for i in 0..40u32 {
        let src = format!("2001:db8::{:x}", i + 1);
        let buf = udp6_datagram(&src, "64:ff9b::203.0.113.5", 33000, 443, b"x");
        expect_forward(translator.translate_from_ip6(T0, buf));
    }
    let mut addrs = std::collections::HashSet::new();
    for info in translator.mappings(T0) {
        assert!(addrs.insert(info.ip4), "address {} reused", info.ip4);
    }
    assert_eq!(addrs.len(), 40);
}

#[test]
fn small_cidr_shares_one_address() {
    let mut translator = Translator::new(T0, Config::default(), ());
    translator.set_enabled(true);
    translator.set_ip4_cidr("192.0.2.8/32".parse().unwrap());
    translator.set_nat64_prefix("64:ff9b::/96".parse().unwrap());

    for src in ["2001:db8::1", "2001:db8::2", "2001:db8::3"] {
        let buf = udp6_datagram(src, "64:ff9b::203.0.113.5", 33000, 443, b"x");
        let out = expect_forward(translator.translate_from_ip6(T0, buf));
        let (ip4, _) = split_ip4(out.as_ref());
        assert_eq!(Ipv4Addr::from(ip4.source), v4("192.0.2.8"));
    }
    assert_eq!(translator.active_mapping_count(), 3);

    // flows are told apart by their translated ports
    let ports: std::collections::HashSet<_> = translator
        .mappings(T0)
        .map(|m| m.translated_port_or_id)
        .collect();
    assert_eq!(ports.len(), 3);
}

#[test]
fn slash_31_is_small_cidr_mode() {
    let mut translator = Translator::new(T0, Config::default(), ());
    translator.set_enabled(true);
    translator.set_ip4_cidr("192.0.2.4/31".parse().unwrap());
    translator.set_nat64_prefix("64:ff9b::/96".parse().unwrap());

    for src in ["2001:db8::1", "2001:db8::2", "2001:db8::3"] {
        let buf = udp6_datagram(src, "64:ff9b::203.0.113.5", 33000, 443, b"x");
        let out = expect_forward(translator.translate_from_ip6(T0, buf));
        let (ip4, _) = split_ip4(out.as_ref());
        // every flow reuses the first pool address
        assert_eq!(Ipv4Addr::from(ip4.source), v4("192.0.2.4"));
    }
}

#[test]
fn mapping_ids_are_monotonic() {
    let mut translator = active_translator();
    for i in 0..10u32 {
        let src = format!("2001:db8::{:x}", i + 1);
        let buf = udp6_datagram(&src, "64:ff9b::203.0.113.5", 33000, 443, b"x");
        expect_forward(translator.translate_from_ip6(T0, buf));
    }
    // the active chain is newest-first
    let ids: Vec<_> = translator.mappings(T0).map(|m| m.id).collect();
    assert_eq!(ids.len(), 10);
    for pair in ids.windows(2) {
        assert!(pair[0] > pair[1], "ids must increase with creation order");
    }
}

#[test]
#[traced_test]
fn lazy_expiry_keeps_mappings_usable_until_swept() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    let mapped_addr = Ipv4Addr::from(ip4.source);
    let (udp, _) = UdpHeader::from_slice(transport).unwrap();
    let translated_port = udp.source_port;

    // past the deadline, not yet swept: visible with zero remaining time
    let later = T0 + UDP_TCP_TIMEOUT_MS + 5_000;
    let info = translator.mappings(later).next().unwrap();
    assert_eq!(info.remaining_time_ms, 0);
    assert_eq!(translator.active_mapping_count(), 1);

    // an outbound hit still uses the expired entry, without refreshing it
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    expect_forward(translator.translate_from_ip6(later, buf));
    let info = translator.mappings(later).next().unwrap();
    assert_eq!(info.remaining_time_ms, 0);
    assert_eq!(translator.active_mapping_count(), 1, "no second mapping");

    // an inbound hit touches, resurrecting the mapping
    let reply = udp4_datagram("203.0.113.5", mapped_addr, 443, translated_port, b"y");
    expect_forward(translator.translate_to_ip6(later, reply));
    let info = translator.mappings(later).next().unwrap();
    assert_eq!(info.remaining_time_ms, UDP_TCP_TIMEOUT_MS);

    // a touched mapping survives the next sweep
    translator.handle_expiry_timer(later + 1);
    assert_eq!(translator.active_mapping_count(), 1);
}

#[test]
fn inbound_traffic_touches_the_mapping() {
    let mut translator = active_translator();
    let buf = icmp6_echo_request("2001:db8::1", "64:ff9b::198.51.100.7", 7, 1, b"p");
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    let (icmp4, _) = Icmpv4Header::from_slice(transport).unwrap();
    let Icmpv4Type::EchoRequest(echo) = &icmp4.icmp_type else {
        panic!("expected echo request");
    };

    let just_before_expiry = T0 + ICMP_TIMEOUT_MS;
    let reply = icmp4_echo_reply(
        "198.51.100.7",
        Ipv4Addr::from(ip4.source),
        echo.id,
        1,
        b"p",
    );
    expect_forward(translator.translate_to_ip6(just_before_expiry, reply));

    let info = translator.mappings(just_before_expiry).next().unwrap();
    assert_eq!(info.remaining_time_ms, ICMP_TIMEOUT_MS);
}

#[test]
fn cidr_reconfiguration_flushes_mappings() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    expect_forward(translator.translate_from_ip6(T0, buf));
    assert_eq!(translator.active_mapping_count(), 1);

    translator.set_ip4_cidr("198.51.100.0/24".parse().unwrap());
    assert_eq!(translator.active_mapping_count(), 0);
    assert_eq!(
        translator.ip4_cidr().map(ToString::to_string).as_deref(),
        Some("198.51.100.0/24")
    );

    translator.clear_ip4_cidr();
    assert_eq!(translator.ip4_cidr(), None);
    assert_eq!(translator.state(), State::NotRunning);
}

#[test]
fn per_mapping_counters_track_both_directions() {
    let mut translator = active_translator();
    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"hello");
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    let (udp, _) = UdpHeader::from_slice(transport).unwrap();

    let reply = udp4_datagram(
        "203.0.113.5",
        Ipv4Addr::from(ip4.source),
        443,
        udp.source_port,
        b"worlds!",
    );
    expect_forward(translator.translate_to_ip6(T0, reply));

    let info = translator.mappings(T0).next().unwrap();
    assert_eq!(info.counters.udp.packets_6_to_4, 1);
    assert_eq!(info.counters.udp.bytes_6_to_4, 13);
    assert_eq!(info.counters.udp.packets_4_to_6, 1);
    assert_eq!(info.counters.udp.bytes_4_to_6, 15);
    assert_eq!(info.counters.total.packets_6_to_4, 1);
    assert_eq!(info.counters.total.packets_4_to_6, 1);
}

//
// Port translation disabled
//

#[test]
fn without_port_translation_ports_pass_through() {
    let config = crate::ConfigBuilder::default()
        .port_translation(false)
        .build()
        .unwrap();
    let mut translator = Translator::new(T0, config, ());
    translator.set_enabled(true);
    translator.set_ip4_cidr("192.0.2.0/24".parse().unwrap());
    translator.set_nat64_prefix("64:ff9b::/96".parse().unwrap());

    let buf = udp6_datagram("2001:db8::1", "64:ff9b::203.0.113.5", 33000, 443, b"x");
    let out = expect_forward(translator.translate_from_ip6(T0, buf));
    let (ip4, transport) = split_ip4(out.as_ref());
    let (udp, _) = UdpHeader::from_slice(transport).unwrap();
    assert_eq!(udp.source_port, 33000, "source port unchanged");

    let info = translator.mappings(T0).next().unwrap();
    assert_eq!(info.translated_port_or_id, 0);

    // the reverse key is the IPv4 address alone
    let reply = udp4_datagram(
        "203.0.113.5",
        Ipv4Addr::from(ip4.source),
        443,
        33000,
        b"y",
    );
    let out = expect_forward(translator.translate_to_ip6(T0, reply));
    let (_, transport) = split_ip6(out.as_ref());
    let (udp, _) = UdpHeader::from_slice(transport).unwrap();
    assert_eq!(udp.destination_port, 33000);
}
