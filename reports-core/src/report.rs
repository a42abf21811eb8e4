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

use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{Bucket, Intervals};

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
/// A report that has been filed into a bucket
///
/// Records are created once by a [`ReportStore`](crate::ReportStore) and never change afterwards.
pub struct ReportRecord {
    /// Identity assigned by the store
    pub id: Uuid,

    /// The submitted bytes, uninterpreted
    pub payload: Vec<u8>,

    /// UTC date the report is filed under
    pub bucket_date: Date,

    /// Interval of `bucket_date` the report is filed under
    pub interval_number: u32,

    /// Submission instant in milliseconds since the Unix epoch
    pub timestamp_millis: i64,
}

impl ReportRecord {
    /// The bucket this record is filed under
    pub fn bucket(&self) -> Bucket {
        Bucket {
            date: self.bucket_date,
            interval_number: self.interval_number,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A report that has been stamped but not yet stored
pub struct NewReport {
    /// The submitted bytes
    pub payload: Vec<u8>,

    /// Where the report will be filed
    pub bucket: Bucket,

    /// Submission instant in milliseconds since the Unix epoch
    pub timestamp_millis: i64,
}

impl NewReport {
    /// Stamp a payload with a single instant
    ///
    /// The bucket and the timestamp are both derived from `instant`.
    pub fn stamp(payload: Vec<u8>, instant: OffsetDateTime, intervals: Intervals) -> Self {
        NewReport {
            payload,
            bucket: intervals.bucket(instant),
            timestamp_millis: epoch_millis(instant),
        }
    }

    /// Assign an identity, producing the record a store persists
    pub fn build(self) -> ReportRecord {
        let NewReport {
            payload,
            bucket,
            timestamp_millis,
        } = self;

        ReportRecord {
            id: Uuid::now_v7(),
            payload,
            bucket_date: bucket.date,
            interval_number: bucket.interval_number,
            timestamp_millis,
        }
    }
}

// floors, so instants before the epoch still land on the earlier millisecond
fn epoch_millis(instant: OffsetDateTime) -> i64 {
    instant.unix_timestamp_nanos().div_euclid(1_000_000) as i64
}
