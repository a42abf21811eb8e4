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

//! # TCN Reports Core
//! _basic types and traits for filing reports into time buckets_
//!
//! This crate shouldn't be depended on directly, except in the case of implementing a custom
//! report store. For a ready-made setup with sled or postgres, look at the `tcn-reports` crate.
//!
//! ### Example
//! ```rust
//! use tcn_reports_core::{memory_storage::Storage, Intervals, ReportService, SystemClock};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let service = ReportService::new(SystemClock, Storage::new())
//!     .with_intervals(Intervals::from_minutes(10).unwrap());
//!
//! let saved = service.save_report(b"signed report".to_vec()).await.unwrap();
//! let current = service.list_reports(None, None).await.unwrap();
//!
//! assert!(current.contains(&saved));
//! # });
//! ```

mod bucket;
mod clock;
mod report;
mod service;
mod storage;

pub use crate::{
    bucket::{to_utc_date, Bucket, IntervalError, Intervals, SECONDS_PER_DAY},
    clock::{Clock, FixedClock, SystemClock},
    report::{NewReport, ReportRecord},
    service::ReportService,
    storage::{memory_storage, ReportStore},
};
