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

use time::Date;

use crate::{to_utc_date, Bucket, Clock, Intervals, NewReport, ReportRecord, ReportStore};

#[derive(Clone, Debug)]
/// Files reports into buckets and reads them back
///
/// The service keeps no state between calls. Errors from the store are returned exactly as the
/// store produced them.
pub struct ReportService<C, S> {
    clock: C,
    store: S,
    intervals: Intervals,
}

impl<C, S> ReportService<C, S>
where
    C: Clock,
    S: ReportStore,
{
    /// Create a service using [`Intervals::DEFAULT`]
    pub fn new(clock: C, store: S) -> Self {
        ReportService {
            clock,
            store,
            intervals: Intervals::DEFAULT,
        }
    }

    /// Use a different interval width
    pub fn with_intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }

    /// The interval layout reports are filed with
    pub fn intervals(&self) -> Intervals {
        self.intervals
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The bucket the clock currently points at
    pub fn current_bucket(&self) -> Bucket {
        self.intervals.bucket(self.clock.now())
    }

    /// List reports, defaulting missing parts of the bucket to the current one
    ///
    /// A missing `date` becomes the current UTC date, a missing `interval_number` becomes the
    /// current interval. Both defaults come from one clock reading.
    #[tracing::instrument(skip(self))]
    pub async fn list_reports(
        &self,
        date: Option<Date>,
        interval_number: Option<u32>,
    ) -> Result<Vec<ReportRecord>, S::Error> {
        let bucket = match (date, interval_number) {
            (Some(date), Some(interval_number)) => Bucket::new(date, interval_number),
            (date, interval_number) => {
                let now = self.clock.now();

                Bucket {
                    date: date.unwrap_or_else(|| to_utc_date(now)),
                    interval_number: interval_number
                        .unwrap_or_else(|| self.intervals.to_interval(now)),
                }
            }
        };

        self.list_bucket(bucket).await
    }

    /// List the reports filed under exactly `bucket`
    ///
    /// The interval number is passed to the store as-is, even when it is past the last interval
    /// of the day.
    #[tracing::instrument(skip(self, bucket), fields(%bucket))]
    pub async fn list_bucket(&self, bucket: Bucket) -> Result<Vec<ReportRecord>, S::Error> {
        let reports = self.store.query(bucket).await?;

        tracing::debug!("Found {} reports", reports.len());

        Ok(reports)
    }

    /// Stamp a payload with the current instant and store it
    ///
    /// The payload is stored exactly as given.
    #[tracing::instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn save_report(&self, payload: Vec<u8>) -> Result<ReportRecord, S::Error> {
        let now = self.clock.now();

        // TODO: verify the report signature and structure before filing it
        let report = NewReport::stamp(payload, now, self.intervals);

        let record = self.store.insert(report).await?;

        tracing::debug!("Filed report {} under {}", record.id, record.bucket());

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        convert::Infallible,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use time::{
        macros::{date, datetime},
        OffsetDateTime,
    };

    use super::*;
    use crate::{memory_storage::Storage, FixedClock};

    #[derive(Clone)]
    struct CountingClock {
        inner: FixedClock,
        reads: Arc<AtomicUsize>,
    }

    impl CountingClock {
        fn new(instant: OffsetDateTime) -> Self {
            CountingClock {
                inner: FixedClock::new(instant),
                reads: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl Clock for CountingClock {
        fn now(&self) -> OffsetDateTime {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.now()
        }
    }

    #[derive(Clone)]
    struct BrokenStore;

    #[async_trait::async_trait]
    impl ReportStore for BrokenStore {
        type Error = std::io::Error;

        async fn query(&self, _: Bucket) -> Result<Vec<ReportRecord>, Self::Error> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "store is down",
            ))
        }

        async fn insert(&self, _: NewReport) -> Result<ReportRecord, Self::Error> {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read only",
            ))
        }
    }

    fn ten_minutes() -> Intervals {
        Intervals::from_minutes(10).unwrap()
    }

    async fn seed(store: &Storage, bucket: Bucket, payload: &[u8]) -> ReportRecord {
        store
            .insert(NewReport {
                payload: payload.to_vec(),
                bucket,
                timestamp_millis: 0,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn defaults_come_from_one_reading() {
        let clock = CountingClock::new(datetime!(2021-03-15 23:58 UTC));
        let store = Storage::new();
        let service =
            ReportService::new(clock.clone(), store.clone()).with_intervals(ten_minutes());

        let expected = seed(&store, Bucket::new(date!(2021-03-15), 143), b"late").await;

        let defaulted = service.list_reports(None, None).await.unwrap();
        assert_eq!(clock.reads(), 1);

        let explicit = service
            .list_reports(Some(date!(2021-03-15)), Some(143))
            .await
            .unwrap();
        assert_eq!(clock.reads(), 1);

        assert_eq!(defaulted, vec![expected]);
        assert_eq!(defaulted, explicit);
    }

    #[tokio::test]
    async fn partial_defaults() {
        let clock = FixedClock::new(datetime!(2021-03-15 00:35 UTC));
        let store = Storage::new();
        let service = ReportService::new(clock, store.clone()).with_intervals(ten_minutes());

        let earlier_day = seed(&store, Bucket::new(date!(2021-03-10), 3), b"a").await;
        let later_slot = seed(&store, Bucket::new(date!(2021-03-15), 9), b"b").await;

        assert_eq!(
            service
                .list_reports(Some(date!(2021-03-10)), None)
                .await
                .unwrap(),
            vec![earlier_day]
        );
        assert_eq!(
            service.list_reports(None, Some(9)).await.unwrap(),
            vec![later_slot]
        );
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let service = ReportService::new(
            FixedClock::new(datetime!(2021-03-15 12:00 UTC)),
            Storage::new(),
        );

        assert!(service.list_reports(None, None).await.unwrap().is_empty());
        assert!(service
            .list_bucket(Bucket::new(date!(2021-03-15), 5))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn out_of_range_interval_is_passed_through() {
        let store = Storage::new();
        let service = ReportService::new(
            FixedClock::new(datetime!(2021-03-15 12:00 UTC)),
            store.clone(),
        );

        let odd = seed(&store, Bucket::new(date!(2021-03-15), 9_999), b"odd").await;

        assert_eq!(
            service
                .list_reports(Some(date!(2021-03-15)), Some(9_999))
                .await
                .unwrap(),
            vec![odd]
        );
    }

    #[tokio::test]
    async fn save_near_midnight_stays_on_day() {
        let clock = CountingClock::new(datetime!(2021-03-15 23:58 UTC));
        let service =
            ReportService::new(clock.clone(), Storage::new()).with_intervals(ten_minutes());

        let record = service.save_report(b"abc".to_vec()).await.unwrap();

        assert_eq!(clock.reads(), 1);
        assert_eq!(record.payload, b"abc".to_vec());
        assert_eq!(record.bucket_date, date!(2021-03-15));
        assert_eq!(record.interval_number, 143);
        assert_eq!(record.timestamp_millis, 1_615_852_680_000);
    }

    #[tokio::test]
    async fn saved_report_is_listed() {
        let clock = FixedClock::new(datetime!(2021-03-15 14:02:11 UTC));
        let service = ReportService::new(clock.clone(), Storage::new());

        let record = service.save_report(vec![0xde, 0xad]).await.unwrap();

        assert_eq!(service.current_bucket(), record.bucket());
        assert_eq!(
            service.list_reports(None, None).await.unwrap(),
            vec![record.clone()]
        );

        clock.advance(time::Duration::hours(6));
        assert!(service.list_reports(None, None).await.unwrap().is_empty());
        assert_eq!(
            service.list_bucket(record.bucket()).await.unwrap(),
            vec![record]
        );
    }

    #[tokio::test]
    async fn payload_is_not_validated() {
        let service = ReportService::new(
            FixedClock::new(datetime!(2021-03-15 14:00 UTC)),
            Storage::new(),
        );

        let record = service.save_report(Vec::new()).await.unwrap();

        assert!(record.payload.is_empty());
    }

    #[tokio::test]
    async fn store_errors_pass_through() {
        let service = ReportService::new(
            FixedClock::new(datetime!(2021-03-15 14:00 UTC)),
            BrokenStore,
        );

        let err = service.list_reports(None, None).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);
        assert_eq!(err.to_string(), "store is down");

        let err = service.save_report(b"abc".to_vec()).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn memory_store_never_fails() {
        let service = ReportService::new(
            FixedClock::new(datetime!(2021-03-15 14:00 UTC)),
            Storage::new(),
        );

        let result: Result<_, Infallible> = service.save_report(b"abc".to_vec()).await;

        assert!(result.is_ok());
    }
}
