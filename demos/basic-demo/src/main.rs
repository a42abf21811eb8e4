use anyhow::Context;
use tcn_reports::{sled_storage::Storage, Intervals, MetricsStore, ReportService, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DB_PATH_VAR: &str = "REPORTS_DB_PATH";
const INTERVAL_MINUTES_VAR: &str = "REPORTS_INTERVAL_MINUTES";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt::fmt()
        .with_env_filter(env_filter)
        .init();

    // Set up our Storage, on disk if a path was given
    let db = match std::env::var_os(DB_PATH_VAR) {
        Some(path) => sled::open(path)?,
        None => sled::Config::new().temporary(true).open()?,
    };
    let storage = MetricsStore::wrap(Storage::new(db)?);

    let intervals = match std::env::var(INTERVAL_MINUTES_VAR) {
        Ok(minutes) => {
            let minutes = minutes
                .parse()
                .with_context(|| format!("{INTERVAL_MINUTES_VAR} must be a number of minutes"))?;
            Intervals::from_minutes(minutes)?
        }
        Err(_) => Intervals::default(),
    };

    let service = ReportService::new(SystemClock, storage).with_intervals(intervals);

    info!(
        "Filing reports in {} intervals of {:?} per day",
        intervals.per_day(),
        intervals.width()
    );

    // Submit a few reports
    for payload in [&b"first report"[..], b"second report", b"third report"] {
        let record = service.save_report(payload.to_vec()).await?;
        info!("Saved {} under {}", record.id, record.bucket());
    }

    // Everything above landed in the current bucket
    let current = service.list_reports(None, None).await?;
    info!(
        "{} reports in current bucket {}",
        current.len(),
        service.current_bucket()
    );

    // An earlier bucket has nothing in it
    let yesterday = service.current_bucket().date - time::Duration::days(1);
    let earlier = service.list_reports(Some(yesterday), Some(0)).await?;
    info!("{} reports on {yesterday}", earlier.len());

    service.store().inner().flush().await?;

    Ok(())
}
