use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use calamine::{open_workbook_from_rs, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::StatusCode;
use serde_json::Value;

use crate::workflows::overdue::domain::{
    AccountsFiling, CompanyProfile, CompanySummary, ConfirmationStatement, NextAccounts,
    OfficerRecord, RegisteredOfficeAddress, SearchCriteria, SearchRequest,
};
use crate::workflows::overdue::registry::{RegistryApi, TransportError};
use crate::workflows::overdue::service::ReportService;
use crate::workflows::overdue::store::MemoryBlobStore;
use crate::workflows::overdue::writer::REPORT_SHEET_NAME;

/// Scriptable registry double. Unknown profiles answer 404.
#[derive(Default)]
pub(super) struct FakeRegistry {
    companies: Vec<String>,
    search_failure: Option<StatusCode>,
    profiles: HashMap<String, CompanyProfile>,
    failing_profiles: HashSet<String>,
    officers: HashMap<String, Vec<OfficerRecord>>,
    failing_officers: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub(super) fn with_companies(numbers: &[&str]) -> Self {
        Self {
            companies: numbers.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(super) fn failing_search(mut self, status: StatusCode) -> Self {
        self.search_failure = Some(status);
        self
    }

    pub(super) fn profile(mut self, profile: CompanyProfile) -> Self {
        let number = profile.company_number.clone().unwrap_or_default();
        self.profiles.insert(number, profile);
        self
    }

    pub(super) fn failing_profile(mut self, number: &str) -> Self {
        self.failing_profiles.insert(number.to_string());
        self
    }

    pub(super) fn officers(mut self, number: &str, officers: Vec<OfficerRecord>) -> Self {
        self.officers.insert(number.to_string(), officers);
        self
    }

    pub(super) fn failing_officers(mut self, number: &str) -> Self {
        self.failing_officers.insert(number.to_string());
        self
    }

    pub(super) fn delayed(mut self, number: &str, delay: Duration) -> Self {
        self.delays.insert(number.to_string(), delay);
        self
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

pub(super) fn status_error(url: &str, status: StatusCode) -> TransportError {
    TransportError::Status {
        url: url.to_string(),
        status,
        body: format!("{} upstream failure", status.as_u16()),
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    async fn search_companies(
        &self,
        _criteria: &SearchCriteria,
    ) -> Result<Vec<CompanySummary>, TransportError> {
        self.record("search".to_string());
        if let Some(status) = self.search_failure {
            return Err(status_error("/advanced-search/companies", status));
        }
        Ok(self
            .companies
            .iter()
            .map(|number| CompanySummary {
                company_number: number.clone(),
            })
            .collect())
    }

    async fn get_profile(&self, company_number: &str) -> Result<CompanyProfile, TransportError> {
        self.record(format!("profile:{company_number}"));
        if let Some(delay) = self.delays.get(company_number) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_profiles.contains(company_number) {
            return Err(status_error(
                &format!("/company/{company_number}"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        self.profiles.get(company_number).cloned().ok_or_else(|| {
            status_error(&format!("/company/{company_number}"), StatusCode::NOT_FOUND)
        })
    }

    async fn get_officers(
        &self,
        company_number: &str,
    ) -> Result<Vec<OfficerRecord>, TransportError> {
        self.record(format!("officers:{company_number}"));
        if self.failing_officers.contains(company_number) {
            return Err(status_error(
                &format!("/company/{company_number}/officers"),
                StatusCode::BAD_GATEWAY,
            ));
        }
        Ok(self
            .officers
            .get(company_number)
            .cloned()
            .unwrap_or_default())
    }
}

fn base_profile(number: &str) -> CompanyProfile {
    CompanyProfile {
        company_number: Some(number.to_string()),
        company_name: Some(format!("{number} TRADING LIMITED")),
        company_type: Some("ltd".to_string()),
        registered_office_address: Some(RegisteredOfficeAddress {
            address_line_1: Some("1 High Street".to_string()),
            locality: Some("London".to_string()),
            country: Some("England".to_string()),
            postal_code: Some("EC1A 1AA".to_string()),
        }),
        confirmation_statement: Some(ConfirmationStatement {
            overdue: Some(false),
            next_due: Some("2024-06-14".to_string()),
            next_made_up_to: Some("2024-05-31".to_string()),
        }),
        accounts: Some(AccountsFiling {
            next_accounts: Some(NextAccounts {
                overdue: Some(false),
            }),
            next_due: Some("2024-09-30".to_string()),
            next_made_up_to: Some("2023-12-31".to_string()),
        }),
    }
}

pub(super) fn clean_profile(number: &str) -> CompanyProfile {
    base_profile(number)
}

pub(super) fn confirmation_overdue_profile(number: &str) -> CompanyProfile {
    let mut profile = base_profile(number);
    if let Some(statement) = profile.confirmation_statement.as_mut() {
        statement.overdue = Some(true);
    }
    profile
}

pub(super) fn accounts_overdue_profile(number: &str) -> CompanyProfile {
    let mut profile = base_profile(number);
    profile.accounts = Some(AccountsFiling {
        next_accounts: Some(NextAccounts {
            overdue: Some(true),
        }),
        next_due: Some("2023-09-30".to_string()),
        next_made_up_to: Some("2022-12-31".to_string()),
    });
    profile
}

pub(super) fn director(name: &str) -> OfficerRecord {
    OfficerRecord {
        name: Some(name.to_string()),
        nationality: Some("British".to_string()),
        occupation: Some("Director".to_string()),
        officer_role: Some("director".to_string()),
        country_of_residence: Some("United Kingdom".to_string()),
    }
}

pub(super) fn criteria() -> SearchCriteria {
    SearchCriteria::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid"),
        NaiveDate::from_ymd_opt(2024, 1, 31).expect("valid"),
        20,
    )
    .expect("valid criteria")
}

pub(super) fn request(from: &str, to: &str, volume: i64) -> SearchRequest {
    SearchRequest {
        incorporated_from: from.to_string(),
        incorporated_to: to.to_string(),
        volume,
    }
}

pub(super) fn valid_request() -> SearchRequest {
    request("2024-01-01", "2024-01-31", 20)
}

pub(super) fn run_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 1)
        .and_then(|date| date.and_hms_opt(12, 30, 45))
        .expect("valid timestamp")
}

pub(super) fn build_service(
    registry: FakeRegistry,
    concurrency: usize,
) -> (
    ReportService<FakeRegistry, MemoryBlobStore>,
    Arc<FakeRegistry>,
    Arc<MemoryBlobStore>,
) {
    let registry = Arc::new(registry);
    let store = Arc::new(MemoryBlobStore::default());
    let service = ReportService::new(registry.clone(), store.clone(), concurrency);
    (service, registry, store)
}

/// Rows of the report sheet, rendered as strings.
pub(super) fn read_report(bytes: Vec<u8>) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).expect("valid workbook");
    assert_eq!(workbook.sheet_names(), vec![REPORT_SHEET_NAME.to_string()]);
    workbook
        .worksheet_range(REPORT_SHEET_NAME)
        .expect("report sheet present")
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
