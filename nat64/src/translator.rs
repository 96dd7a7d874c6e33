// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The NAT64 translator façade
//!
//! [`Translator`] owns the mapping table, the IPv4 address pool, the
//! configuration and the counters, and exposes the two data-plane entry
//! points ([`Translator::translate_from_ip6`] and
//! [`Translator::translate_to_ip6`]) next to the control surface.
//!
//! All entry points are synchronous and single-threaded; time enters as an
//! explicit [`Instant`] and the expiry sweep runs when the host calls
//! [`Translator::handle_expiry_timer`].

use crate::addr_pool::AddressPool;
use crate::counters::{DropReason, ErrorCounters, ProtocolCounters};
use crate::icmp;
use crate::mapping::{
    ADDRESS_MAPPING_POOL_SIZE, ActiveIter, AddressMapping, ICMP_IDLE_TIMEOUT_MS, IDLE_TIMEOUT_MS,
    MappingInfo, MappingTable,
};
use crate::port::TranslatedPort;
use crate::state::{Event, Notifier, State};
use crate::time::Instant;
use net::buffer::PacketBufferMut;
use net::checksum::{PseudoHeader, update_transport_checksum};
use net::icmp4::Icmp4;
use net::icmp6::Icmp6;
use net::ip::NextHeader;
use net::ipv4::Ipv4;
use net::ipv4::cidr::Ipv4Cidr;
use net::ipv6::Ipv6;
use net::ipv6::prefix::Ipv6Prefix;
use net::parse::{DeParse, Parse};
use net::tcp::Tcp;
use net::udp::Udp;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{error, info, warn};

/// Longest CIDR prefix for which the address pool still backs each mapping
/// with its own IPv4 address (one usable host per mapping slot).  Longer
/// prefixes put the translator in single-address mode.
const MAX_CIDR_LEN_FOR_VALID_ADDR_POOL: u8 = 24;

/// Period of the expiry sweep: the shorter of the two idle timeouts, so no
/// mapping outlives its deadline by more than one period.
const SWEEP_PERIOD_MS: u64 = if ICMP_IDLE_TIMEOUT_MS < IDLE_TIMEOUT_MS {
    ICMP_IDLE_TIMEOUT_MS
} else {
    IDLE_TIMEOUT_MS
};

const IP6_HEADER_LEN: u16 = 40;
const IP4_HEADER_LEN: u16 = 20;

/// Headroom hosts must reserve in front of an inbound IPv4 datagram so the
/// translated IPv6 header is guaranteed to fit.
#[allow(clippy::cast_possible_truncation)] // both lengths are tiny constants
pub const IP4_MESSAGE_HEADROOM: u16 = (Ipv6::LEN.get() - Ipv4::MIN_LEN.get()) as u16;

/// Outcome of one translation attempt.
///
/// Buffer ownership follows the variant: `Forward` and `NotTranslated` hand
/// the buffer back to the caller, `Drop` consumed and released it.
#[derive(Debug)]
pub enum Translated<Buf> {
    /// The datagram was rewritten (or deliberately passed through); emit it.
    Forward(Buf),
    /// The datagram is not a candidate for translation; handle it as-is.
    NotTranslated(Buf),
    /// Translation failed; the datagram has been dropped and counted.
    Drop(DropReason),
}

/// Build-time options for a [`Translator`].
#[derive(Debug, Clone, derive_builder::Builder)]
pub struct Config {
    /// Rewrite L4 source ports and ICMP identifiers so that a single IPv4
    /// address can back many IPv6 flows.
    #[builder(default = "true")]
    pub port_translation: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            port_translation: true,
        }
    }
}

/// A stateful NAT64 translator.
pub struct Translator {
    enabled: bool,
    ip4_cidr: Option<Ipv4Cidr>,
    nat64_prefix: Option<Ipv6Prefix>,
    state: State,
    config: Config,
    mappings: MappingTable,
    addr_pool: AddressPool,
    counters: ProtocolCounters,
    error_counters: ErrorCounters,
    next_mapping_id: u64,
    expiry_deadline: Instant,
    rng: SmallRng,
    notifier: Box<dyn Notifier>,
}

impl Translator {
    /// Create a disabled, unconfigured translator.
    ///
    /// `now` seeds the expiry timer; state-change events are delivered to
    /// `notifier`.
    #[must_use]
    pub fn new(now: Instant, config: Config, notifier: impl Notifier + 'static) -> Translator {
        let mut rng = SmallRng::from_os_rng();
        // Seed the id sequence randomly so mapping ids are not predictable
        // across reboots.
        let next_mapping_id = rng.random();
        Translator {
            enabled: false,
            ip4_cidr: None,
            nat64_prefix: None,
            state: State::Disabled,
            config,
            mappings: MappingTable::new(),
            addr_pool: AddressPool::default(),
            counters: ProtocolCounters::default(),
            error_counters: ErrorCounters::default(),
            next_mapping_id,
            expiry_deadline: now + IDLE_TIMEOUT_MS,
            rng,
            notifier: Box::new(notifier),
        }
    }

    //
    // Data plane
    //

    /// Translate an outgoing IPv6 datagram into an IPv4 datagram.
    ///
    /// The buffer must hold exactly one IPv6 datagram starting at its first
    /// byte.  See [`Translated`] for the ownership contract.
    pub fn translate_from_ip6<Buf: PacketBufferMut>(
        &mut self,
        now: Instant,
        buf: Buf,
    ) -> Translated<Buf> {
        match self.translate_from_ip6_inner(now, buf) {
            Ok(result) => result,
            Err(reason) => {
                self.error_counters.count_6_to_4(reason);
                Translated::Drop(reason)
            }
        }
    }

    #[allow(clippy::too_many_lines)] // one pass, one packet: splitting obscures the ordering
    fn translate_from_ip6_inner<Buf: PacketBufferMut>(
        &mut self,
        now: Instant,
        mut buf: Buf,
    ) -> Result<Translated<Buf>, DropReason> {
        let prefix_valid = self
            .nat64_prefix
            .as_ref()
            .is_some_and(Ipv6Prefix::is_valid_nat64);
        if self.ip4_cidr.is_none() || !prefix_valid {
            return Ok(Translated::NotTranslated(buf));
        }
        // checked non-empty above; copied out to release the borrow
        let Some(prefix) = self.nat64_prefix else {
            return Ok(Translated::NotTranslated(buf));
        };

        let Some(flow) = parse_ip6_flow(buf.as_ref()) else {
            warn!("outgoing datagram is not a valid IPv6 datagram, drop");
            return Err(DropReason::IllegalPacket);
        };

        if !prefix.matches(flow.destination) {
            return Ok(Translated::NotTranslated(buf));
        }

        let Some(idx) = self.find_or_allocate_mapping(now, &flow) else {
            warn!(
                source = %flow.source,
                "failed to get a mapping (mapping pool full?)"
            );
            return Err(DropReason::NoMapping);
        };
        let (mapping_ip4, mapping_translated_port) = {
            let mapping = self.mappings.get_mut(idx).ok_or(DropReason::Unknown)?;
            (mapping.ip4, mapping.translated_port_or_id)
        };

        let src_port_or_id = if self.config.port_translation {
            mapping_translated_port.map_or(0, TranslatedPort::as_u16)
        } else {
            flow.src_port_or_id
        };

        buf.trim_from_start(IP6_HEADER_LEN)
            .map_err(|_| DropReason::IllegalPacket)?;

        // From here on any failure must consume the buffer: the datagram is
        // half rewritten and no longer valid IPv6.
        let destination = prefix.extract_ip4(flow.destination);
        let protocol = match flow.next_header {
            NextHeader::UDP => {
                rewrite_udp_source(buf.as_mut(), src_port_or_id)?;
                NextHeader::UDP
            }
            NextHeader::TCP => {
                rewrite_tcp_source(buf.as_mut(), src_port_or_id)?;
                NextHeader::TCP
            }
            NextHeader::ICMP6 => {
                icmp::translate_icmp6(buf.as_mut(), src_port_or_id).map_err(|e| {
                    warn!("cannot translate outgoing ICMPv6 datagram: {e}");
                    DropReason::Unknown
                })?;
                NextHeader::ICMP4
            }
            _ => return Err(DropReason::UnsupportedProto),
        };

        let total_len = u16::try_from(Ipv4::MIN_LEN.get() + buf.as_ref().len())
            .map_err(|_| DropReason::IllegalPacket)?;
        update_transport_checksum(
            buf.as_mut(),
            protocol,
            PseudoHeader::V4 {
                source: mapping_ip4,
                destination,
            },
        )
        .map_err(|_| DropReason::Unknown)?;

        let mut ip4 = Ipv4::for_translated(mapping_ip4, destination, flow.hop_limit, protocol);
        ip4.set_total_len(total_len).update_checksum();

        let datagram = buf.prepend(IP4_HEADER_LEN).map_err(|e| {
            // cannot happen with a conforming buffer: the IPv4 header is
            // strictly shorter than the IPv6 header just removed
            error!("failed to prepend the IPv4 header to a translated datagram: {e:?}");
            DropReason::Unknown
        })?;
        ip4.deparse(datagram).map_err(|_| DropReason::Unknown)?;

        self.counters
            .count_6_to_4(flow.next_header, u64::from(flow.payload_length));
        if let Some(mapping) = self.mappings.get_mut(idx) {
            mapping
                .counters
                .count_6_to_4(flow.next_header, u64::from(flow.payload_length));
        }

        Ok(Translated::Forward(buf))
    }

    /// Translate an incoming IPv4 datagram into an IPv6 datagram.
    ///
    /// A buffer that already holds a valid IPv6 datagram is returned as
    /// [`Translated::NotTranslated`].  When no CIDR is configured the
    /// datagram is passed through unchanged as [`Translated::Forward`] for
    /// the host to handle externally.
    pub fn translate_to_ip6<Buf: PacketBufferMut>(
        &mut self,
        now: Instant,
        buf: Buf,
    ) -> Translated<Buf> {
        match self.translate_to_ip6_inner(now, buf) {
            Ok(result) => result,
            Err(reason) => {
                self.error_counters.count_4_to_6(reason);
                Translated::Drop(reason)
            }
        }
    }

    #[allow(clippy::too_many_lines)] // one pass, one packet: splitting obscures the ordering
    fn translate_to_ip6_inner<Buf: PacketBufferMut>(
        &mut self,
        now: Instant,
        mut buf: Buf,
    ) -> Result<Translated<Buf>, DropReason> {
        if Ipv6::parse(buf.as_ref()).is_ok() {
            return Ok(Translated::NotTranslated(buf));
        }

        if self.ip4_cidr.is_none() {
            warn!("incoming IPv4 datagram but no CIDR configured, passing through");
            return Ok(Translated::Forward(buf));
        }
        let Some(prefix) = self.nat64_prefix.filter(Ipv6Prefix::is_valid_nat64) else {
            warn!("incoming IPv4 datagram but no NAT64 prefix configured, drop");
            return Err(DropReason::Unknown);
        };

        let Some(flow) = parse_ip4_flow(buf.as_ref()) else {
            warn!("incoming datagram is neither an IPv4 nor an IPv6 datagram, drop");
            return Err(DropReason::IllegalPacket);
        };

        let key_port = self
            .config
            .port_translation
            .then_some(flow.dst_port_or_id);
        let Some(idx) = self.mappings.find_inbound(flow.destination, key_port) else {
            warn!(destination = %flow.destination, "no mapping for the IPv4 destination, drop");
            return Err(DropReason::NoMapping);
        };
        let (mapping_ip6, mapping_src_port) = {
            let mapping = self.mappings.get_mut(idx).ok_or(DropReason::Unknown)?;
            mapping.touch(now, flow.protocol);
            (mapping.ip6, mapping.src_port_or_id)
        };

        let dst_port_or_id = if self.config.port_translation {
            mapping_src_port
        } else {
            flow.dst_port_or_id
        };

        buf.trim_from_start(flow.header_len)
            .map_err(|_| DropReason::IllegalPacket)?;

        let source = prefix.embed_ip4(flow.source);
        let next_header = match flow.protocol {
            NextHeader::UDP => {
                rewrite_udp_destination(buf.as_mut(), dst_port_or_id)?;
                NextHeader::UDP
            }
            NextHeader::TCP => {
                rewrite_tcp_destination(buf.as_mut(), dst_port_or_id)?;
                NextHeader::TCP
            }
            NextHeader::ICMP4 => {
                icmp::translate_icmp4(buf.as_mut(), dst_port_or_id).map_err(|e| {
                    warn!("cannot translate incoming ICMP datagram: {e}");
                    DropReason::Unknown
                })?;
                NextHeader::ICMP6
            }
            _ => return Err(DropReason::UnsupportedProto),
        };

        let payload_length =
            u16::try_from(buf.as_ref().len()).map_err(|_| DropReason::IllegalPacket)?;
        update_transport_checksum(
            buf.as_mut(),
            next_header,
            PseudoHeader::V6 {
                source,
                destination: mapping_ip6,
            },
        )
        .map_err(|_| DropReason::Unknown)?;

        let mut ip6 = Ipv6::for_translated(source, mapping_ip6, flow.ttl, next_header);
        ip6.set_payload_length(payload_length);

        let datagram = buf.prepend(IP6_HEADER_LEN).map_err(|e| {
            // can happen when the platform reserved too little headroom in
            // front of the original IPv4 datagram
            warn!("failed to prepend the IPv6 header to a translated datagram: {e:?}");
            DropReason::Unknown
        })?;
        ip6.deparse(datagram).map_err(|_| DropReason::Unknown)?;

        let counted = u64::from(flow.total_len.saturating_sub(flow.header_len));
        self.counters.count_4_to_6(flow.protocol, counted);
        if let Some(mapping) = self.mappings.get_mut(idx) {
            mapping.counters.count_4_to_6(flow.protocol, counted);
        }

        Ok(Translated::Forward(buf))
    }

    //
    // Mapping table management
    //

    fn address_pool_mode(&self) -> bool {
        self.ip4_cidr
            .as_ref()
            .is_some_and(|cidr| cidr.length() <= MAX_CIDR_LEN_FOR_VALID_ADDR_POOL)
    }

    fn find_or_allocate_mapping(&mut self, now: Instant, flow: &Ip6Flow) -> Option<usize> {
        let key_port = self
            .config
            .port_translation
            .then_some(flow.src_port_or_id);
        // Outbound hits do not refresh the deadline; only inbound lookups and
        // creation do.
        if let Some(idx) = self.mappings.find_outbound(flow.source, key_port) {
            return Some(idx);
        }
        self.allocate_mapping(now, flow)
    }

    fn allocate_mapping(&mut self, now: Instant, flow: &Ip6Flow) -> Option<usize> {
        // When every slot is taken, reclaiming expired entries is the only
        // way a new flow can still be admitted.
        if self.mappings.len() == ADDRESS_MAPPING_POOL_SIZE
            && self.release_expired_mappings(now) == 0
        {
            return None;
        }

        let pool_mode = self.address_pool_mode();
        let ip4 = if pool_mode {
            if self.addr_pool.is_empty() && self.release_expired_mappings(now) == 0 {
                return None;
            }
            self.addr_pool.pop()?
        } else {
            // Single-address mode: every mapping shares the first address and
            // the pool is left untouched.
            self.addr_pool.first()?
        };

        let (src_port_or_id, translated_port_or_id) = if self.config.port_translation {
            let translated = self.allocate_source_port(flow.src_port_or_id);
            (flow.src_port_or_id, Some(translated))
        } else {
            (0, None)
        };

        self.next_mapping_id = self.next_mapping_id.wrapping_add(1);
        let mut mapping = AddressMapping {
            id: self.next_mapping_id,
            ip6: flow.source,
            ip4,
            src_port_or_id,
            translated_port_or_id,
            expiry: now,
            counters: ProtocolCounters::default(),
        };
        mapping.touch(now, flow.next_header);
        info!("mapping created: {mapping}");

        let Some(idx) = self.mappings.insert(mapping) else {
            if pool_mode {
                self.addr_pool.push(ip4);
            }
            return None;
        };
        Some(idx)
    }

    /// Pick an unused translated port uniformly from the dynamic range,
    /// preserving the parity of `src_port` (RFC 4787 §4.2.2).
    ///
    /// Terminates because the mapping count is capped far below the size of
    /// the range.
    fn allocate_source_port(&mut self, src_port: u16) -> TranslatedPort {
        loop {
            let mut candidate = self
                .rng
                .random_range(TranslatedPort::RANGE_START..TranslatedPort::RANGE_END);
            if (src_port ^ candidate) & 1 == 1 {
                candidate += 1;
            }
            if self.mappings.contains_translated_port(candidate) {
                continue;
            }
            if let Ok(port) = TranslatedPort::new_checked(candidate) {
                debug_assert!(port.parity_matches(src_port));
                return port;
            }
        }
    }

    fn release_mapping(&mut self, mapping: &AddressMapping) {
        if self.address_pool_mode() {
            self.addr_pool.push(mapping.ip4);
        }
        info!("mapping removed: {mapping}");
    }

    fn release_expired_mappings(&mut self, now: Instant) -> usize {
        let expired = self.mappings.drain_expired(now);
        for mapping in &expired {
            self.release_mapping(mapping);
        }
        expired.len()
    }

    fn release_all_mappings(&mut self) -> usize {
        let all = self.mappings.drain_all();
        for mapping in &all {
            self.release_mapping(mapping);
        }
        all.len()
    }

    //
    // Expiry timer
    //

    /// When the host should next call [`Translator::handle_expiry_timer`].
    #[must_use]
    pub fn poll_timer_at(&self) -> Instant {
        self.expiry_deadline
    }

    /// Sweep expired mappings and re-arm the timer.
    pub fn handle_expiry_timer(&mut self, now: Instant) {
        let released = self.release_expired_mappings(now);
        info!("released {released} expired mappings");
        self.expiry_deadline = now + SWEEP_PERIOD_MS;
    }

    //
    // Control surface
    //

    /// Enable or disable the translator.  Disabling releases every active
    /// mapping.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.release_all_mappings();
        }
        self.update_state();
    }

    /// Configure the IPv4 CIDR backing the address pool.
    ///
    /// A no-op when `cidr` equals the current configuration.  Otherwise the
    /// address pool is rebuilt from the CIDR's usable hosts and every active
    /// mapping is flushed.
    pub fn set_ip4_cidr(&mut self, cidr: Ipv4Cidr) {
        if self.ip4_cidr == Some(cidr) {
            return;
        }

        self.mappings.drain_all();
        self.addr_pool.repopulate(&cidr);

        match (self.addr_pool.first(), self.addr_pool.last()) {
            (Some(first), Some(last)) => info!(
                "IPv4 CIDR for NAT64: {cidr} (address pool: {first} - {last}, {} addresses)",
                self.addr_pool.len()
            ),
            _ => info!("IPv4 CIDR for NAT64: {cidr} (empty address pool)"),
        }
        self.ip4_cidr = Some(cidr);

        self.update_state();
        // The platform tracks the pool itself, so a CIDR change signals even
        // when the derived state value is unchanged.
        self.notifier.signal(Event::TranslatorStateChanged);
    }

    /// Drop the CIDR configuration, flushing all mappings and the pool.
    pub fn clear_ip4_cidr(&mut self) {
        self.ip4_cidr = None;
        self.mappings.drain_all();
        self.addr_pool.clear();
        self.update_state();
    }

    /// Configure the NAT64 prefix.
    ///
    /// Only the RFC 6052 lengths (32, 40, 48, 56, 64, 96) are usable; any
    /// other length is treated as [`Translator::clear_nat64_prefix`].
    pub fn set_nat64_prefix(&mut self, prefix: Ipv6Prefix) {
        if !prefix.is_valid_nat64() {
            self.clear_nat64_prefix();
            return;
        }
        if self.nat64_prefix == Some(prefix) {
            return;
        }
        info!("IPv6 prefix for NAT64 updated to {prefix}");
        self.nat64_prefix = Some(prefix);
        self.update_state();
    }

    /// Drop the NAT64 prefix configuration.
    pub fn clear_nat64_prefix(&mut self) {
        if self.nat64_prefix.is_none() {
            return;
        }
        self.nat64_prefix = None;
        info!("IPv6 prefix for NAT64 cleared");
        self.update_state();
    }

    fn update_state(&mut self) {
        let prefix_valid = self
            .nat64_prefix
            .as_ref()
            .is_some_and(Ipv6Prefix::is_valid_nat64);
        let new_state = State::derive(self.enabled, self.ip4_cidr.is_some(), prefix_valid);
        if new_state == self.state {
            return;
        }
        self.state = new_state;
        self.notifier.signal(Event::TranslatorStateChanged);
        info!("NAT64 translator is now {}", self.state);
    }

    //
    // Introspection
    //

    /// The configured CIDR, if any.
    #[must_use]
    pub fn ip4_cidr(&self) -> Option<&Ipv4Cidr> {
        self.ip4_cidr.as_ref()
    }

    /// The configured NAT64 prefix, if any.
    #[must_use]
    pub fn nat64_prefix(&self) -> Option<&Ipv6Prefix> {
        self.nat64_prefix.as_ref()
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Aggregate translated-traffic counters.
    #[must_use]
    pub fn counters(&self) -> &ProtocolCounters {
        &self.counters
    }

    /// Aggregate drop counters.
    #[must_use]
    pub fn error_counters(&self) -> &ErrorCounters {
        &self.error_counters
    }

    /// Number of currently active mappings (expired-but-unswept included).
    #[must_use]
    pub fn active_mapping_count(&self) -> usize {
        self.mappings.len()
    }

    /// Iterate over the active mappings as copy-out [`MappingInfo`] records.
    ///
    /// Entries past their deadline are reported with zero remaining time
    /// rather than hidden, matching the lazy eviction of the table.
    #[must_use]
    pub fn mappings(&self, now: Instant) -> MappingIterator<'_> {
        MappingIterator {
            inner: self.mappings.iter(),
            now,
        }
    }
}

/// Iterator over the active mappings.  See [`Translator::mappings`].
pub struct MappingIterator<'a> {
    inner: ActiveIter<'a>,
    now: Instant,
}

impl Iterator for MappingIterator<'_> {
    type Item = MappingInfo;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|m| MappingInfo::copy_from(m, self.now))
    }
}

//
// Header digestion helpers
//

struct Ip6Flow {
    source: Ipv6Addr,
    destination: Ipv6Addr,
    next_header: NextHeader,
    hop_limit: u8,
    payload_length: u16,
    src_port_or_id: u16,
}

struct Ip4Flow {
    source: Ipv4Addr,
    destination: Ipv4Addr,
    protocol: NextHeader,
    ttl: u8,
    total_len: u16,
    header_len: u16,
    dst_port_or_id: u16,
}

fn parse_ip6_flow(datagram: &[u8]) -> Option<Ip6Flow> {
    let (ip6, consumed) = Ipv6::parse(datagram).ok()?;
    if datagram.len() != consumed.get() + usize::from(ip6.payload_length()) {
        return None;
    }
    let transport = &datagram[consumed.get()..];
    let src_port_or_id = match ip6.next_header() {
        NextHeader::UDP => Udp::parse(transport).ok()?.0.source(),
        NextHeader::TCP => Tcp::parse(transport).ok()?.0.source(),
        NextHeader::ICMP6 => Icmp6::parse(transport).ok()?.0.identifier(),
        _ => 0,
    };
    Some(Ip6Flow {
        source: ip6.source(),
        destination: ip6.destination(),
        next_header: ip6.next_header(),
        hop_limit: ip6.hop_limit(),
        payload_length: ip6.payload_length(),
        src_port_or_id,
    })
}

fn parse_ip4_flow(datagram: &[u8]) -> Option<Ip4Flow> {
    let (ip4, consumed) = Ipv4::parse(datagram).ok()?;
    let total_len = usize::from(ip4.total_len());
    if datagram.len() != total_len || total_len < consumed.get() {
        return None;
    }
    let header_len = u16::try_from(consumed.get()).ok()?;
    let transport = &datagram[consumed.get()..];
    let dst_port_or_id = match ip4.protocol() {
        NextHeader::UDP => Udp::parse(transport).ok()?.0.destination(),
        NextHeader::TCP => Tcp::parse(transport).ok()?.0.destination(),
        NextHeader::ICMP4 => Icmp4::parse(transport).ok()?.0.identifier(),
        _ => 0,
    };
    Some(Ip4Flow {
        source: ip4.source(),
        destination: ip4.destination(),
        protocol: ip4.protocol(),
        ttl: ip4.ttl(),
        total_len: ip4.total_len(),
        header_len,
        dst_port_or_id,
    })
}

fn rewrite_udp_source(transport: &mut [u8], port: u16) -> Result<(), DropReason> {
    let (mut udp, _) = Udp::parse(transport).map_err(|_| DropReason::IllegalPacket)?;
    udp.set_source(port);
    udp.deparse(transport).map_err(|_| DropReason::Unknown)?;
    Ok(())
}

fn rewrite_udp_destination(transport: &mut [u8], port: u16) -> Result<(), DropReason> {
    let (mut udp, _) = Udp::parse(transport).map_err(|_| DropReason::IllegalPacket)?;
    udp.set_destination(port);
    udp.deparse(transport).map_err(|_| DropReason::Unknown)?;
    Ok(())
}

fn rewrite_tcp_source(transport: &mut [u8], port: u16) -> Result<(), DropReason> {
    let (mut tcp, _) = Tcp::parse(transport).map_err(|_| DropReason::IllegalPacket)?;
    tcp.set_source(port);
    tcp.deparse(transport).map_err(|_| DropReason::Unknown)?;
    Ok(())
}

fn rewrite_tcp_destination(transport: &mut [u8], port: u16) -> Result<(), DropReason> {
    let (mut tcp, _) = Tcp::parse(transport).map_err(|_| DropReason::IllegalPacket)?;
    tcp.set_destination(port);
    tcp.deparse(transport).map_err(|_| DropReason::Unknown)?;
    Ok(())
}
