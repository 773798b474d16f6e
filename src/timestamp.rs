//
// Copyright 2023 Signal Messenger, LLC.
// SPDX-License-Identifier: AGPL-3.0-only
//

use chrono::{DateTime, Utc};

/// Timestamp recorded in a pre-key record.
///
/// The value is carried through encoding untouched; nothing here checks its
/// range or compares it against the current time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    #[inline]
    pub const fn from_epoch_millis(milliseconds: u64) -> Self {
        Self(milliseconds)
    }

    #[inline]
    pub const fn epoch_millis(&self) -> u64 {
        self.0
    }

    /// Current wall-clock time. Clocks set before the epoch yield zero.
    pub fn now() -> Self {
        Self::from(Utc::now())
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for u64 {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

/// Times before the Unix epoch have no millisecond count here and become zero.
impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(u64::try_from(value.timestamp_millis()).unwrap_or_default())
    }
}
