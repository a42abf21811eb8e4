#![deny(missing_docs)]

//! # TCN Reports
//!
//! This crate stores signed TCN reports in time buckets. A bucket is a UTC calendar date plus a
//! fixed-width interval of that day. Reports are stamped with the current instant when they are
//! saved, and can be listed by bucket afterwards. Leaving out the date or the interval when
//! listing falls back to the bucket the clock currently points at.
//!
//! Report payloads are stored exactly as submitted. No signature or structure checks happen yet.
//!
//! ### Example
//! ```rust
//! use tcn_reports::{memory_storage::Storage, Bucket, FixedClock, Intervals, ReportService};
//! use time::macros::{date, datetime};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let clock = FixedClock::new(datetime!(2021-03-15 23:58 UTC));
//! let service = ReportService::new(clock, Storage::new())
//!     .with_intervals(Intervals::from_minutes(10).unwrap());
//!
//! let record = service.save_report(b"abc".to_vec()).await.unwrap();
//! assert_eq!(record.bucket(), Bucket::new(date!(2021-03-15), 143));
//!
//! let current = service.list_reports(None, None).await.unwrap();
//! assert_eq!(current, vec![record]);
//! # });
//! ```
//!
//! ### Storage backends
//! - [`memory_storage`], always available, mostly for tests
//! - `sled_storage`, enabled with the `sled` feature
//! - `postgres`, enabled with the `postgres` feature
//!
//! Any of them can be wrapped in `MetricsStore` (the default `metrics` feature) to count saves,
//! queries and failures.

pub use tcn_reports_core::{
    memory_storage, to_utc_date, Bucket, Clock, FixedClock, IntervalError, Intervals, NewReport,
    ReportRecord, ReportService, ReportStore, SystemClock, SECONDS_PER_DAY,
};

#[cfg(feature = "metrics")]
pub use tcn_reports_metrics::MetricsStore;

#[cfg(feature = "sled")]
/// Reports stored in an embedded sled database
pub mod sled_storage {
    pub use tcn_reports_sled::{Error, Storage};
}

#[cfg(feature = "postgres")]
/// Reports stored in postgres
pub mod postgres {
    pub use tcn_reports_postgres::{ConnectPostgresError, PostgresError, Storage};
}
