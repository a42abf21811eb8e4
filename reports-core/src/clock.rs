/*
 * This file is part of TCN Reports.
 *
 * Copyright © 2024 The TCN Reports Authors
 *
 * TCN Reports is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * TCN Reports is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with TCN Reports.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::sync::{Arc, Mutex};

use time::OffsetDateTime;

/// A source of the current instant
///
/// The service reads the clock at most once per call. Swap in a [`FixedClock`] to make bucket
/// derivation deterministic.
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> OffsetDateTime;
}

#[derive(Clone, Copy, Debug, Default)]
/// Reads the system time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Clone, Debug)]
/// A clock that only moves when told to
///
/// Clones share the same instant.
pub struct FixedClock {
    instant: Arc<Mutex<OffsetDateTime>>,
}

impl FixedClock {
    /// Pin the clock at `instant`
    pub fn new(instant: OffsetDateTime) -> Self {
        FixedClock {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    /// Move the clock to `instant`
    pub fn set(&self, instant: OffsetDateTime) {
        *self.instant.lock().unwrap() = instant;
    }

    /// Move the clock forward by `duration`
    pub fn advance(&self, duration: time::Duration) {
        *self.instant.lock().unwrap() += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.instant.lock().unwrap()
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> OffsetDateTime {
        C::now(self)
    }
}

impl<'a, C> Clock for &'a C
where
    C: Clock + ?Sized,
{
    fn now(&self) -> OffsetDateTime {
        C::now(self)
    }
}
