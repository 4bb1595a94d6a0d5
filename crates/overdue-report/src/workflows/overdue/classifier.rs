use std::sync::Arc;

use super::domain::{or_not_available, yes_no, CompanyProfile, OverdueRecord};
use super::officers::OfficerResolver;
use super::registry::RegistryApi;

/// Decides whether a profile belongs in the report and flattens it into a row.
pub struct OverdueClassifier<R> {
    officers: OfficerResolver<R>,
}

impl<R> OverdueClassifier<R>
where
    R: RegistryApi + 'static,
{
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            officers: OfficerResolver::new(registry),
        }
    }

    /// Returns `None` for companies with nothing overdue. The officer listing is
    /// only requested for overdue companies, keyed by the searched company number.
    pub async fn classify(
        &self,
        company_number: &str,
        profile: &CompanyProfile,
    ) -> Option<OverdueRecord> {
        if !profile.is_overdue() {
            return None;
        }

        let officer = self.officers.resolve(company_number).await;
        let statement = profile.confirmation_statement.clone().unwrap_or_default();
        let accounts = profile.accounts.clone().unwrap_or_default();
        let address = profile
            .registered_office_address
            .clone()
            .unwrap_or_default();

        Some(OverdueRecord {
            name: or_not_available(&profile.company_name),
            number: or_not_available(&profile.company_number),
            company_type: or_not_available(&profile.company_type),
            registered_office_address: address.single_line(),
            confirmation_statement_overdue: yes_no(profile.confirmation_overdue()),
            confirmation_next_due: or_not_available(&statement.next_due),
            confirmation_next_made_up_to: or_not_available(&statement.next_made_up_to),
            accounts_overdue: yes_no(profile.accounts_overdue()),
            accounts_next_due: or_not_available(&accounts.next_due),
            accounts_next_made_up_to: or_not_available(&accounts.next_made_up_to),
            officer_name: officer.name,
            nationality: officer.nationality,
            occupation: officer.occupation,
            officer_role: officer.role,
            country_of_residence: officer.country_of_residence,
        })
    }
}
