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

#![deny(missing_docs)]

//! Metrics for any tcn-reports storage backend
//!
//! Emitted counters:
//! - `tcn-reports.report.saved`
//! - `tcn-reports.query.completed`, labelled with `empty`
//! - `tcn-reports.store.failed`, labelled with `operation`

use tcn_reports_core::{Bucket, NewReport, ReportRecord, ReportStore};

#[derive(Clone, Debug)]
/// A wrapper for any ReportStore type adding metrics
pub struct MetricsStore<S>(S);

impl<S> MetricsStore<S> {
    /// Add metrics to a provided ReportStore
    pub const fn wrap(store: S) -> MetricsStore<S>
    where
        S: ReportStore,
    {
        Self(store)
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.0
    }
}

#[async_trait::async_trait]
impl<S> ReportStore for MetricsStore<S>
where
    S: ReportStore,
{
    type Error = S::Error;

    async fn query(&self, bucket: Bucket) -> Result<Vec<ReportRecord>, Self::Error> {
        match self.0.query(bucket).await {
            Ok(reports) => {
                metrics::counter!("tcn-reports.query.completed", "empty" => reports.is_empty().to_string())
                    .increment(1);

                Ok(reports)
            }
            Err(e) => {
                tracing::warn!("Failed to query {bucket}: {e}");
                metrics::counter!("tcn-reports.store.failed", "operation" => "query").increment(1);

                Err(e)
            }
        }
    }

    async fn insert(&self, report: NewReport) -> Result<ReportRecord, Self::Error> {
        match self.0.insert(report).await {
            Ok(record) => {
                metrics::counter!("tcn-reports.report.saved").increment(1);

                Ok(record)
            }
            Err(e) => {
                tracing::warn!("Failed to insert report: {e}");
                metrics::counter!("tcn-reports.store.failed", "operation" => "insert").increment(1);

                Err(e)
            }
        }
    }
}
