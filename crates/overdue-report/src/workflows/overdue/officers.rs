use std::sync::Arc;

use tracing::warn;

use super::domain::OfficerInfo;
use super::registry::RegistryApi;

/// Resolves the lead officer of a company.
///
/// The lead officer is the first entry of the registry's officer listing, in the
/// order the registry returns it. Any failure collapses to [`OfficerInfo::unavailable`].
pub struct OfficerResolver<R> {
    registry: Arc<R>,
}

impl<R> OfficerResolver<R>
where
    R: RegistryApi + 'static,
{
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    pub async fn resolve(&self, company_number: &str) -> OfficerInfo {
        match self.registry.get_officers(company_number).await {
            Ok(officers) => officers
                .first()
                .map(OfficerInfo::from)
                .unwrap_or_else(OfficerInfo::unavailable),
            Err(err) => {
                warn!(company_number, error = %err, "officer lookup failed");
                OfficerInfo::unavailable()
            }
        }
    }
}
