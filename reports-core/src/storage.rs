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

use std::error::Error;

use crate::{Bucket, NewReport, ReportRecord};

/// Define a storage backend for reports
///
/// Implementations own record identity and any concurrency control between writers. Both
/// operations receive fully resolved buckets.
#[async_trait::async_trait]
pub trait ReportStore: Clone + Send + Sync {
    /// The error type used by the storage mechanism.
    type Error: Error + Send + Sync + 'static;

    /// Fetch every report filed under `bucket`
    ///
    /// An empty bucket yields an empty vec. Ordering is up to the implementation.
    async fn query(&self, bucket: Bucket) -> Result<Vec<ReportRecord>, Self::Error>;

    /// Persist a single report
    ///
    /// Either the whole record is stored or nothing is. The stored record is returned with its
    /// identity populated.
    async fn insert(&self, report: NewReport) -> Result<ReportRecord, Self::Error>;
}

/// A default, in-memory implementation of a storage mechanism
pub mod memory_storage {
    use std::{
        collections::BTreeMap,
        convert::Infallible,
        sync::{Arc, Mutex},
    };

    use crate::{Bucket, NewReport, ReportRecord};

    #[derive(Clone, Debug, Default)]
    /// An In-Memory store for reports
    ///
    /// Clones share the same reports.
    pub struct Storage {
        inner: Arc<Mutex<BTreeMap<Bucket, Vec<ReportRecord>>>>,
    }

    impl Storage {
        /// Create a new, empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Total number of stored reports across all buckets
        pub fn len(&self) -> usize {
            self.inner.lock().unwrap().values().map(Vec::len).sum()
        }

        /// Whether nothing has been stored yet
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait::async_trait]
    impl super::ReportStore for Storage {
        type Error = Infallible;

        async fn query(&self, bucket: Bucket) -> Result<Vec<ReportRecord>, Self::Error> {
            let reports = self
                .inner
                .lock()
                .unwrap()
                .get(&bucket)
                .cloned()
                .unwrap_or_default();

            Ok(reports)
        }

        async fn insert(&self, report: NewReport) -> Result<ReportRecord, Self::Error> {
            let bucket = report.bucket;
            let record = report.build();

            self.inner
                .lock()
                .unwrap()
                .entry(bucket)
                .or_default()
                .push(record.clone());

            Ok(record)
        }
    }

}
