// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Millisecond-resolution monotonic time
//!
//! The engine never reads a clock.  Hosts pass the current timestamp into
//! every operation that needs one, which keeps the data plane free of
//! platform dependencies and makes timeout behavior directly testable.

use core::fmt::{Display, Formatter};
use core::ops::Add;

/// A point on the host's millisecond-resolution monotonic clock.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Instant(u64);

impl Instant {
    /// Construct from milliseconds since the host clock's epoch.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Instant {
        Instant(millis)
    }

    /// Milliseconds since the host clock's epoch.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, zero if `earlier` is later.
    #[must_use]
    pub const fn saturating_millis_since(self, earlier: Instant) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Instant {
    type Output = Instant;

    /// Advance the timestamp by a duration in milliseconds.
    fn add(self, millis: u64) -> Instant {
        Instant(self.0.saturating_add(millis))
    }
}

impl Display for Instant {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
