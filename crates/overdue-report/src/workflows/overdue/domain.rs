use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder rendered for any value the registry did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Validated search window and page size for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCriteria {
    incorporated_from: NaiveDate,
    incorporated_to: NaiveDate,
    volume: u32,
}

impl SearchCriteria {
    /// Builds criteria, checking the volume before the date window.
    pub fn new(
        incorporated_from: NaiveDate,
        incorporated_to: NaiveDate,
        volume: i64,
    ) -> Result<Self, ValidationError> {
        if volume < 0 {
            return Err(ValidationError::InvalidVolume);
        }
        if incorporated_to < incorporated_from {
            return Err(ValidationError::InvalidDateRange);
        }
        let volume = u32::try_from(volume).map_err(|_| ValidationError::VolumeTooLarge)?;

        Ok(Self {
            incorporated_from,
            incorporated_to,
            volume,
        })
    }

    pub fn incorporated_from(&self) -> NaiveDate {
        self.incorporated_from
    }

    pub fn incorporated_to(&self) -> NaiveDate {
        self.incorporated_to
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }
}

/// Raw body of `POST /search-companies`.
///
/// Dates stay as strings so that malformed input surfaces as a validation error
/// instead of an extractor rejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub incorporated_from: String,
    pub incorporated_to: String,
    #[serde(deserialize_with = "deserialize_volume")]
    pub volume: i64,
}

impl SearchRequest {
    pub fn criteria(&self) -> Result<SearchCriteria, ValidationError> {
        if self.volume < 0 {
            return Err(ValidationError::InvalidVolume);
        }
        let from = parse_date(&self.incorporated_from)?;
        let to = parse_date(&self.incorporated_to)?;
        SearchCriteria::new(from, to, self.volume)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: raw.to_string(),
    })
}

fn deserialize_volume<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVolume {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    let invalid = |raw: &dyn std::fmt::Display| -> D::Error {
        D::Error::custom(format!("volume '{raw}' is not a whole number"))
    };

    let raw = RawVolume::deserialize(deserializer)
        .map_err(|_: D::Error| D::Error::custom("volume must be a whole number"))?;
    match raw {
        RawVolume::Integer(value) => Ok(value),
        RawVolume::Float(value) => whole_number(value).ok_or_else(|| invalid(&value)),
        RawVolume::Text(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_number))
                .ok_or_else(|| invalid(&text))
        }
    }
}

/// Whole floats inside the `i64` range, e.g. `5.0`.
fn whole_number(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Some(value as i64)
    } else {
        None
    }
}

/// Input problems the caller can correct.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Volume cannot be negative.")]
    InvalidVolume,
    #[error("Volume is larger than the registry accepts.")]
    VolumeTooLarge,
    #[error("\"Incorporated To\" date cannot be less than \"Incorporated From\" date.")]
    InvalidDateRange,
    #[error("'{value}' is not a valid YYYY-MM-DD date.")]
    InvalidDate { value: String },
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),
}

/// One hit from the advanced company search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanySummary {
    pub company_number: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub(crate) items: Option<Vec<CompanySummary>>,
}

/// Company profile as returned by the registry. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub company_number: Option<String>,
    pub company_name: Option<String>,
    #[serde(rename = "type")]
    pub company_type: Option<String>,
    pub registered_office_address: Option<RegisteredOfficeAddress>,
    pub confirmation_statement: Option<ConfirmationStatement>,
    pub accounts: Option<AccountsFiling>,
}

impl CompanyProfile {
    pub fn confirmation_overdue(&self) -> bool {
        self.confirmation_statement
            .as_ref()
            .and_then(|statement| statement.overdue)
            .unwrap_or(false)
    }

    pub fn accounts_overdue(&self) -> bool {
        self.accounts
            .as_ref()
            .and_then(|accounts| accounts.next_accounts.as_ref())
            .and_then(|next| next.overdue)
            .unwrap_or(false)
    }

    pub fn is_overdue(&self) -> bool {
        self.confirmation_overdue() || self.accounts_overdue()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisteredOfficeAddress {
    pub address_line_1: Option<String>,
    pub locality: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl RegisteredOfficeAddress {
    /// Comma-joined single line; missing parts become empty strings.
    pub fn single_line(&self) -> String {
        [
            &self.address_line_1,
            &self.locality,
            &self.country,
            &self.postal_code,
        ]
        .iter()
        .map(|part| part.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationStatement {
    pub overdue: Option<bool>,
    pub next_due: Option<String>,
    pub next_made_up_to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsFiling {
    pub next_accounts: Option<NextAccounts>,
    pub next_due: Option<String>,
    pub next_made_up_to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NextAccounts {
    pub overdue: Option<bool>,
}

/// Officer entry from the registry's officer listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OfficerRecord {
    pub name: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub officer_role: Option<String>,
    pub country_of_residence: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OfficerPage {
    #[serde(default)]
    pub(crate) items: Option<Vec<OfficerRecord>>,
}

/// Descriptive fields of a company's lead officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerInfo {
    pub name: String,
    pub nationality: String,
    pub occupation: String,
    pub role: String,
    pub country_of_residence: String,
}

impl OfficerInfo {
    /// All-"N/A" record used whenever no officer can be resolved.
    pub fn unavailable() -> Self {
        Self {
            name: NOT_AVAILABLE.to_string(),
            nationality: NOT_AVAILABLE.to_string(),
            occupation: NOT_AVAILABLE.to_string(),
            role: NOT_AVAILABLE.to_string(),
            country_of_residence: NOT_AVAILABLE.to_string(),
        }
    }
}

impl From<&OfficerRecord> for OfficerInfo {
    fn from(record: &OfficerRecord) -> Self {
        Self {
            name: or_not_available(&record.name),
            nationality: or_not_available(&record.nationality),
            occupation: or_not_available(&record.occupation),
            role: or_not_available(&record.officer_role),
            country_of_residence: or_not_available(&record.country_of_residence),
        }
    }
}

pub(crate) fn or_not_available(value: &Option<String>) -> String {
    value
        .clone()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn yes_no(flag: bool) -> String {
    let label = if flag { "Yes" } else { "No" };
    label.to_string()
}

/// Report-ready row. Cells follow [`OverdueRecord::COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueRecord {
    pub name: String,
    pub number: String,
    pub company_type: String,
    pub registered_office_address: String,
    pub confirmation_statement_overdue: String,
    pub confirmation_next_due: String,
    pub confirmation_next_made_up_to: String,
    pub accounts_overdue: String,
    pub accounts_next_due: String,
    pub accounts_next_made_up_to: String,
    pub officer_name: String,
    pub nationality: String,
    pub occupation: String,
    pub officer_role: String,
    pub country_of_residence: String,
}

impl OverdueRecord {
    pub const COLUMNS: [&'static str; 15] = [
        "Name",
        "Number",
        "Company_Type",
        "Registered_Office_Address",
        "Confirmation_Statement_Overdue",
        "Confirmation_next_due",
        "Confirmation_next_made_up_to",
        "Accounts_Overdue",
        "Accounts_next_due",
        "Accounts_next_made_up_to",
        "Officer_Name",
        "Nationality",
        "Occupation",
        "Officer_Role",
        "Country_of_Residence",
    ];

    pub fn cells(&self) -> [&str; 15] {
        [
            self.name.as_str(),
            self.number.as_str(),
            self.company_type.as_str(),
            self.registered_office_address.as_str(),
            self.confirmation_statement_overdue.as_str(),
            self.confirmation_next_due.as_str(),
            self.confirmation_next_made_up_to.as_str(),
            self.accounts_overdue.as_str(),
            self.accounts_next_due.as_str(),
            self.accounts_next_made_up_to.as_str(),
            self.officer_name.as_str(),
            self.nationality.as_str(),
            self.occupation.as_str(),
            self.officer_role.as_str(),
            self.country_of_residence.as_str(),
        ]
    }
}

/// Generated report for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub filename: String,
    pub rows: Vec<OverdueRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn criteria_rejects_negative_volume_before_dates() {
        let result = SearchCriteria::new(date(2024, 2, 1), date(2024, 1, 1), -1);
        assert_eq!(result, Err(ValidationError::InvalidVolume));
    }

    #[test]
    fn criteria_rejects_inverted_window() {
        let result = SearchCriteria::new(date(2024, 2, 1), date(2024, 1, 1), 10);
        assert_eq!(result, Err(ValidationError::InvalidDateRange));
    }

    #[test]
    fn criteria_accepts_single_day_window_and_zero_volume() {
        let criteria = SearchCriteria::new(date(2024, 1, 1), date(2024, 1, 1), 0)
            .expect("same-day window is valid");
        assert_eq!(criteria.volume(), 0);
    }

    #[test]
    fn request_accepts_numeric_string_volume() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"incorporatedFrom":"2024-01-01","incorporatedTo":"2024-01-31","volume":"25"}"#,
        )
        .expect("request parses");
        let criteria = request.criteria().expect("valid criteria");
        assert_eq!(criteria.volume(), 25);
        assert_eq!(criteria.incorporated_to(), date(2024, 1, 31));
    }

    #[test]
    fn request_accepts_whole_float_volume() {
        for body in [
            r#"{"incorporatedFrom":"2024-01-01","incorporatedTo":"2024-01-31","volume":5.0}"#,
            r#"{"incorporatedFrom":"2024-01-01","incorporatedTo":"2024-01-31","volume":"5.0"}"#,
        ] {
            let request: SearchRequest = serde_json::from_str(body).expect("request parses");
            assert_eq!(request.volume, 5);
        }
    }

    #[test]
    fn request_rejects_fractional_volume_with_readable_message() {
        let err = serde_json::from_str::<SearchRequest>(
            r#"{"incorporatedFrom":"2024-01-01","incorporatedTo":"2024-01-31","volume":5.5}"#,
        )
        .expect_err("fractional volume rejected");
        let message = err.to_string();
        assert!(message.contains("volume '5.5' is not a whole number"), "{message}");

        let err = serde_json::from_str::<SearchRequest>(
            r#"{"incorporatedFrom":"2024-01-01","incorporatedTo":"2024-01-31","volume":true}"#,
        )
        .expect_err("boolean volume rejected");
        let message = err.to_string();
        assert!(message.contains("volume must be a whole number"), "{message}");
        assert!(!message.contains("untagged"), "{message}");
    }

    #[test]
    fn request_rejects_volume_beyond_registry_page_limit() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"incorporatedFrom":"2024-01-01","incorporatedTo":"2024-01-31","volume":"4294967296"}"#,
        )
        .expect("request parses");
        assert_eq!(request.criteria(), Err(ValidationError::VolumeTooLarge));
    }

    #[test]
    fn request_reports_unparseable_dates() {
        let request = SearchRequest {
            incorporated_from: "01/01/2024".to_string(),
            incorporated_to: "2024-01-31".to_string(),
            volume: 5,
        };
        assert_eq!(
            request.criteria(),
            Err(ValidationError::InvalidDate {
                value: "01/01/2024".to_string()
            })
        );
    }

    #[test]
    fn profile_overdue_flags_tolerate_missing_sections() {
        let profile: CompanyProfile = serde_json::from_str(
            r#"{"company_number":"01","accounts":{"next_accounts":{"overdue":true}},"confirmation_statement":{"overdue":null}}"#,
        )
        .expect("profile parses");
        assert!(!profile.confirmation_overdue());
        assert!(profile.accounts_overdue());
        assert!(profile.is_overdue());
        assert!(!CompanyProfile::default().is_overdue());
    }

    #[test]
    fn address_defaults_missing_parts_to_empty() {
        let address = RegisteredOfficeAddress {
            address_line_1: Some("1 High Street".to_string()),
            locality: None,
            country: Some("England".to_string()),
            postal_code: None,
        };
        assert_eq!(address.single_line(), "1 High Street, , England, ");
    }

    #[test]
    fn officer_info_substitutes_missing_fields() {
        let record = OfficerRecord {
            name: Some("SMITH, Jane".to_string()),
            officer_role: Some("director".to_string()),
            ..OfficerRecord::default()
        };
        let info = OfficerInfo::from(&record);
        assert_eq!(info.name, "SMITH, Jane");
        assert_eq!(info.role, "director");
        assert_eq!(info.nationality, NOT_AVAILABLE);
        assert_eq!(info.occupation, NOT_AVAILABLE);
        assert_eq!(info.country_of_residence, NOT_AVAILABLE);
    }
}
