use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::domain::{
    CompanyProfile, CompanySummary, OfficerPage, OfficerRecord, SearchCriteria, SearchPage,
};
use crate::config::RegistryConfig;

/// Company registry operations the pipeline depends on.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    async fn search_companies(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<CompanySummary>, TransportError>;
    async fn get_profile(&self, company_number: &str) -> Result<CompanyProfile, TransportError>;
    async fn get_officers(&self, company_number: &str)
        -> Result<Vec<OfficerRecord>, TransportError>;
}

/// Upstream HTTP or network failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("registry returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("registry request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("registry response from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid registry url '{0}'")]
    InvalidUrl(String),
    #[error("registry client could not be constructed: {0}")]
    Client(#[source] reqwest::Error),
}

impl TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => status.is_server_error(),
            TransportError::Network { .. } => true,
            TransportError::Decode { .. }
            | TransportError::InvalidUrl(_)
            | TransportError::Client(_) => false,
        }
    }
}

/// Static registry credential. Built once and shared by every request.
#[derive(Clone)]
pub struct RegistryCredential {
    api_key: String,
}

impl RegistryCredential {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for RegistryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredential").finish_non_exhaustive()
    }
}

/// reqwest-backed client for the Companies House public data API.
#[derive(Debug)]
pub struct CompaniesHouseClient {
    http: reqwest::Client,
    base_url: Url,
    credential: RegistryCredential,
    max_retries: u32,
    retry_backoff: Duration,
}

impl CompaniesHouseClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| TransportError::InvalidUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(config.base_url.clone()));
        }

        let user_agent = format!("overdue-report/{}", env!("CARGO_PKG_VERSION"));
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            http,
            base_url,
            credential: RegistryCredential::new(config.api_key.clone()),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        let mut attempt = 0;
        loop {
            match self.send_once(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    attempt += 1;
                    warn!(%url, attempt, error = %err, "retrying registry request");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        debug!(%url, "registry request");
        let response = self
            .http
            .get(url.clone())
            .basic_auth(&self.credential.api_key, None::<&str>)
            .send()
            .await
            .map_err(|source| TransportError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| TransportError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl RegistryApi for CompaniesHouseClient {
    async fn search_companies(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<CompanySummary>, TransportError> {
        let mut url = self.endpoint(&["advanced-search", "companies"])?;
        url.query_pairs_mut()
            .append_pair(
                "incorporated_from",
                &criteria.incorporated_from().format("%Y-%m-%d").to_string(),
            )
            .append_pair(
                "incorporated_to",
                &criteria.incorporated_to().format("%Y-%m-%d").to_string(),
            )
            .append_pair("size", &criteria.volume().to_string());

        let page: SearchPage = self.get_json(url).await?;
        Ok(page.items.unwrap_or_default())
    }

    async fn get_profile(&self, company_number: &str) -> Result<CompanyProfile, TransportError> {
        let url = self.endpoint(&["company", company_number])?;
        self.get_json(url).await
    }

    async fn get_officers(
        &self,
        company_number: &str,
    ) -> Result<Vec<OfficerRecord>, TransportError> {
        let url = self.endpoint(&["company", company_number, "officers"])?;
        let page: OfficerPage = self.get_json(url).await?;
        Ok(page.items.unwrap_or_default())
    }
}
