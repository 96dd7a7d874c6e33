// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! ICMP echo translation
//!
//! Echo Request and Echo Reply are the only ICMP messages the engine
//! translates; their v4 and v6 encodings differ only in the type value.  The
//! functions here rewrite the header in place at the front of the (already
//! stripped) transport section and overwrite the identifier with the caller's
//! value.  Checksums are recomputed afterwards by the checksum stage.

use net::icmp4::Icmp4;
use net::icmp6::Icmp6;
use net::parse::{DeParse, Parse};

/// Error produced when an ICMP message cannot be translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum IcmpTranslationError {
    /// The transport section does not hold a complete ICMP header.
    #[error("truncated ICMP header")]
    Truncated,
    /// The message is not an echo, the only family with a defined mapping.
    #[error("ICMP type {0} has no translation")]
    UnsupportedType(u8),
}

/// Rewrite the ICMPv6 echo at the front of `transport` into its ICMPv4
/// encoding, stamping `translated_id` as the identifier.
pub(crate) fn translate_icmp6(
    transport: &mut [u8],
    translated_id: u16,
) -> Result<(), IcmpTranslationError> {
    let (icmp6, _) = Icmp6::parse(transport).map_err(|_| IcmpTranslationError::Truncated)?;

    let translated = if let Some(mut echo) = icmp6.echo_request() {
        echo.id = translated_id;
        Icmp4::new_echo_request(echo)
    } else if let Some(mut echo) = icmp6.echo_reply() {
        echo.id = translated_id;
        Icmp4::new_echo_reply(echo)
    } else {
        return Err(IcmpTranslationError::UnsupportedType(icmp6.type_u8()));
    };

    translated
        .deparse(transport)
        .map_err(|_| IcmpTranslationError::Truncated)?;
    Ok(())
}

/// Rewrite the ICMPv4 echo at the front of `transport` into its ICMPv6
/// encoding, stamping `original_id` as the identifier.
pub(crate) fn translate_icmp4(
    transport: &mut [u8],
    original_id: u16,
) -> Result<(), IcmpTranslationError> {
    let (icmp4, _) = Icmp4::parse(transport).map_err(|_| IcmpTranslationError::Truncated)?;

    let translated = if let Some(mut echo) = icmp4.echo_reply() {
        echo.id = original_id;
        Icmp6::new_echo_reply(echo)
    } else if let Some(mut echo) = icmp4.echo_request() {
        echo.id = original_id;
        Icmp6::new_echo_request(echo)
    } else {
        return Err(IcmpTranslationError::UnsupportedType(icmp4.type_u8()));
    };

    translated
        .deparse(transport)
        .map_err(|_| IcmpTranslationError::Truncated)?;
    Ok(())
}
