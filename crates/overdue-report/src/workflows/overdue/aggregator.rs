use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::classifier::OverdueClassifier;
use super::domain::{OverdueRecord, SearchCriteria};
use super::registry::{RegistryApi, TransportError};

/// Drives search, per-company enrichment and classification for one run.
pub struct ReportAggregator<R> {
    registry: Arc<R>,
    classifier: OverdueClassifier<R>,
    concurrency: usize,
}

impl<R> ReportAggregator<R>
where
    R: RegistryApi + 'static,
{
    /// `concurrency` bounds how many companies are enriched at once; 1 keeps the
    /// one-request-at-a-time behavior.
    pub fn new(registry: Arc<R>, concurrency: usize) -> Self {
        Self {
            classifier: OverdueClassifier::new(registry.clone()),
            registry,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs the pipeline. A failed search aborts the run; a failed profile fetch
    /// only drops that company. Records keep the search result order.
    pub async fn run(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<OverdueRecord>, TransportError> {
        let companies = self.registry.search_companies(criteria).await?;
        let total = companies.len();
        info!(found = total, "registry search complete");

        let outcomes: Vec<(String, Result<Option<OverdueRecord>, TransportError>)> =
            stream::iter(companies.into_iter().enumerate())
                .map(move |(index, company)| async move {
                    debug!(
                        company_number = %company.company_number,
                        "checking company {}/{}",
                        index + 1,
                        total
                    );
                    let outcome = self.evaluate(&company.company_number).await;
                    (company.company_number, outcome)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (company_number, outcome) in outcomes {
            match outcome {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => {
                    skipped += 1;
                    warn!(%company_number, error = %err, "skipping company after profile fetch failure");
                }
            }
        }

        info!(
            examined = total,
            overdue = records.len(),
            skipped,
            "overdue aggregation complete"
        );
        Ok(records)
    }

    /// Fetches one profile and classifies it.
    pub async fn evaluate(
        &self,
        company_number: &str,
    ) -> Result<Option<OverdueRecord>, TransportError> {
        let profile = self.registry.get_profile(company_number).await?;
        Ok(self.classifier.classify(company_number, &profile).await)
    }
}
