#![deny(missing_docs)]

//! # TCN Reports Sled Storage
//! _An implementation of the ReportStore trait based on the Sled embedded database_
//!
//! ### Usage
//! ```rust,ignore
//! use tcn_reports::{sled_storage::Storage, ReportService, SystemClock};
//!
//! let db = sled::Config::new().temporary(true).open()?;
//! let storage = Storage::new(db)?;
//! let service = ReportService::new(SystemClock, storage);
//! ```
//!
//! Every report lives under a key made of its bucket followed by its id. The bucket part is a
//! fixed-width prefix, so listing a bucket is a single prefix scan.

use sled::{Db, Tree};
use tcn_reports_core::{Bucket, NewReport, ReportRecord};
use tokio::task::JoinError;
use uuid::Uuid;

const PREFIX_LEN: usize = 8;

/// The error produced by sled storage calls
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error in the database
    #[error("Error in sled")]
    Sled(#[from] sled::Error),

    /// Error in cbor
    #[error("Error in cbor")]
    Cbor(#[from] serde_cbor::Error),

    /// Error executing db operation
    #[error("Blocking operation was canceled")]
    Canceled,
}

/// A simple alias for Result<T, Error>
pub type Result<T> = std::result::Result<T, Error>;

fn encode_prefix(bucket: &Bucket) -> [u8; PREFIX_LEN] {
    let mut prefix = [0; PREFIX_LEN];
    prefix[..4].copy_from_slice(&bucket.date.to_julian_day().to_be_bytes());
    prefix[4..].copy_from_slice(&bucket.interval_number.to_be_bytes());
    prefix
}

// v7 ids sort by creation time, so keys within a bucket sort by submission
fn encode_key(bucket: &Bucket, id: Uuid) -> Vec<u8> {
    let mut v = Vec::with_capacity(PREFIX_LEN + 16);
    v.extend_from_slice(&encode_prefix(bucket));
    v.extend_from_slice(id.as_bytes());
    v
}

#[derive(Clone)]
/// The Sled-backed storage implementation
pub struct Storage {
    reports: Tree,
    _db: Db,
}

#[async_trait::async_trait]
impl tcn_reports_core::ReportStore for Storage {
    type Error = Error;

    async fn query(&self, bucket: Bucket) -> Result<Vec<ReportRecord>> {
        let this = self.clone();

        tokio::task::spawn_blocking(move || this.get_bucket(&bucket)).await?
    }

    async fn insert(&self, report: NewReport) -> Result<ReportRecord> {
        let this = self.clone();

        tokio::task::spawn_blocking(move || this.put(report.build())).await?
    }
}

impl Storage {
    /// Create a new Storage struct
    pub fn new(db: Db) -> Result<Self> {
        Ok(Storage {
            reports: db.open_tree("tcn-reports-records")?,
            _db: db,
        })
    }

    /// Number of reports stored across all buckets
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the store holds no reports
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Write pending changes to disk
    pub async fn flush(&self) -> Result<usize> {
        Ok(self.reports.flush_async().await?)
    }

    fn get_bucket(&self, bucket: &Bucket) -> Result<Vec<ReportRecord>> {
        let reports = self
            .reports
            .scan_prefix(encode_prefix(bucket))
            .values()
            .map(|res| -> Result<ReportRecord> {
                let ivec = res?;
                Ok(serde_cbor::from_slice(&ivec)?)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::trace!("Read {} reports from {bucket}", reports.len());

        Ok(reports)
    }

    fn put(&self, record: ReportRecord) -> Result<ReportRecord> {
        let key = encode_key(&record.bucket(), record.id);
        let bytes = serde_cbor::to_vec(&record)?;

        self.reports.insert(key, bytes)?;

        tracing::trace!("Stored report {}", record.id);

        Ok(record)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish()
    }
}

impl From<JoinError> for Error {
    fn from(_: JoinError) -> Self {
        Error::Canceled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcn_reports_core::{FixedClock, Intervals, ReportService, ReportStore};
    use time::macros::{date, datetime};

    fn storage() -> Storage {
        let db = sled::Config::new().temporary(true).open().unwrap();
        Storage::new(db).unwrap()
    }

    fn report(bucket: Bucket, payload: &[u8], timestamp_millis: i64) -> NewReport {
        NewReport {
            payload: payload.to_vec(),
            bucket,
            timestamp_millis,
        }
    }

    #[test]
    fn prefix_is_bucket_only() {
        let bucket = Bucket::new(date!(2021-03-15), 5);
        let key = encode_key(&bucket, Uuid::now_v7());

        assert_eq!(key.len(), 24);
        assert_eq!(&key[..PREFIX_LEN], &encode_prefix(&bucket));
        assert_ne!(
            encode_prefix(&bucket),
            encode_prefix(&Bucket::new(date!(2021-03-15), 6))
        );
        assert_ne!(
            encode_prefix(&bucket),
            encode_prefix(&Bucket::new(date!(2021-03-16), 5))
        );
    }

    #[tokio::test]
    async fn empty_bucket_is_empty() {
        let storage = storage();

        let reports = storage
            .query(Bucket::new(date!(2021-03-15), 5))
            .await
            .unwrap();

        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn query_returns_only_matching_bucket() {
        let storage = storage();
        let day = date!(2021-03-15);

        for interval in [4, 5, 6] {
            storage
                .insert(report(Bucket::new(day, interval), b"abc", 1))
                .await
                .unwrap();
        }
        let expected = storage
            .insert(report(Bucket::new(day, 5), b"second", 2))
            .await
            .unwrap();

        let reports = storage.query(Bucket::new(day, 5)).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.interval_number == 5));
        assert!(reports.contains(&expected));
        assert_eq!(storage.len(), 4);
    }

    #[tokio::test]
    async fn records_survive_round_trip() {
        let storage = storage();
        let bucket = Bucket::new(date!(2021-03-15), 143);

        let stored = storage
            .insert(report(bucket, &[0, 159, 146, 150], 1_615_852_680_000))
            .await
            .unwrap();

        assert_eq!(stored.bucket(), bucket);
        assert_eq!(storage.query(bucket).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn service_over_sled() {
        let clock = FixedClock::new(datetime!(2021-03-15 23:58 UTC));
        let intervals = Intervals::from_minutes(10).unwrap();
        let service = ReportService::new(clock, storage()).with_intervals(intervals);

        let record = service.save_report(b"abc".to_vec()).await.unwrap();

        assert_eq!(record.bucket_date, date!(2021-03-15));
        assert_eq!(service.list_reports(None, None).await.unwrap(), vec![record]);
        service.store().flush().await.unwrap();
    }
}
