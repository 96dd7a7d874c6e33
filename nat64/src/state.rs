// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Translator lifecycle state
//!
//! The externally visible state is a pure function of three configuration
//! bits: the enable flag, CIDR presence and NAT64-prefix validity.  Every
//! effective transition is announced once through the host's [`Notifier`].

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Externally visible state of the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    /// The translator is administratively disabled.
    Disabled,
    /// Enabled, but missing a CIDR or a valid NAT64 prefix.
    NotRunning,
    /// Enabled and configured, with no flow activity yet.  Reserved: the
    /// current state derivation never produces it.
    Idle,
    /// Enabled and fully configured; packets are being translated.
    Active,
}

impl State {
    /// Derive the state from the current configuration.
    pub(crate) fn derive(enabled: bool, cidr_set: bool, prefix_valid: bool) -> State {
        if !enabled {
            return State::Disabled;
        }
        if cidr_set && prefix_valid {
            State::Active
        } else {
            State::NotRunning
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            State::Disabled => "Disabled",
            State::NotRunning => "NotRunning",
            State::Idle => "Idle",
            State::Active => "Active",
        };
        write!(f, "{name}")
    }
}

/// Events broadcast by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// The translator's [`State`] changed, or its address pool was
    /// reconfigured.
    TranslatorStateChanged,
}

/// Host-side sink for translator events.
pub trait Notifier {
    /// Deliver one event.  Called synchronously from the control surface.
    fn signal(&mut self, event: Event);
}

/// No-op notifier for hosts without an event bus.
impl Notifier for () {
    fn signal(&mut self, _event: Event) {}
}
