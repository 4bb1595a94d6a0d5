use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use overdue_report::config::{RegistryConfig, ReportsConfig};
use overdue_report::error::AppError;
use overdue_report::workflows::overdue::{CompaniesHouseClient, FsBlobStore, ReportService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type LiveReportService = ReportService<CompaniesHouseClient, FsBlobStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the registry client and the artifact directory into a report service.
pub(crate) fn build_report_service(
    registry: &RegistryConfig,
    reports: &ReportsConfig,
) -> Result<Arc<LiveReportService>, AppError> {
    let client = Arc::new(CompaniesHouseClient::new(registry)?);
    let store = Arc::new(FsBlobStore::open(&reports.directory)?);
    Ok(Arc::new(ReportService::new(
        client,
        store,
        registry.fetch_concurrency,
    )))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
