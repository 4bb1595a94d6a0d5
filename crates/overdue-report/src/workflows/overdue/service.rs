use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::aggregator::ReportAggregator;
use super::domain::{SearchRequest, ValidationError};
use super::registry::{RegistryApi, TransportError};
use super::store::{validate_name, BlobStore, StoreError};
use super::writer::{ReportWriteError, ReportWriter};

/// Successful search payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub status: &'static str,
    pub filename: String,
    pub overdue_count: usize,
}

/// Service composing aggregation, artifact writing and the artifact store.
///
/// Each search replaces the stored generation: purge, aggregate and write run
/// under an exclusive lock, downloads under a shared one.
pub struct ReportService<R, S> {
    aggregator: ReportAggregator<R>,
    writer: ReportWriter<S>,
    store: Arc<S>,
    generation: RwLock<()>,
}

impl<R, S> ReportService<R, S>
where
    R: RegistryApi + 'static,
    S: BlobStore + 'static,
{
    pub fn new(registry: Arc<R>, store: Arc<S>, fetch_concurrency: usize) -> Self {
        Self {
            aggregator: ReportAggregator::new(registry, fetch_concurrency),
            writer: ReportWriter::new(store.clone()),
            store,
            generation: RwLock::new(()),
        }
    }

    /// Validate, purge the previous generation, aggregate and write a new report.
    pub async fn search(
        &self,
        request: SearchRequest,
    ) -> Result<SearchOutcome, ReportServiceError> {
        self.search_at(request, Local::now().naive_local()).await
    }

    pub async fn search_at(
        &self,
        request: SearchRequest,
        timestamp: NaiveDateTime,
    ) -> Result<SearchOutcome, ReportServiceError> {
        let criteria = request.criteria()?;

        let _generation = self.generation.write().await;
        let purged = self.store.clear()?;
        info!(
            from = %criteria.incorporated_from(),
            to = %criteria.incorporated_to(),
            volume = criteria.volume(),
            purged,
            "starting overdue report run"
        );

        let records = match self.aggregator.run(&criteria).await {
            Ok(records) => records,
            Err(err) => {
                error!(error = %err, "registry search failed; no report written");
                return Err(ReportServiceError::Upstream(err));
            }
        };

        let artifact = self.writer.write(records, timestamp)?;
        Ok(SearchOutcome {
            status: "success",
            overdue_count: artifact.rows.len(),
            filename: artifact.filename,
        })
    }

    /// Bytes of a stored artifact from the current generation.
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>, ReportServiceError> {
        validate_name(filename).map_err(|_| StoreError::NotFound(filename.to_string()))?;
        let _generation = self.generation.read().await;
        Ok(self.store.get(filename)?)
    }
}

/// Error raised by the report service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] TransportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Write(#[from] ReportWriteError),
}

impl ReportServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReportServiceError::Store(StoreError::NotFound(_))
                | ReportServiceError::Store(StoreError::InvalidName(_))
        )
    }
}
