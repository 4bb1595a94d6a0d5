//! Overdue filing report: registry search, per-company enrichment, classification
//! and workbook artifact generation behind a small HTTP surface.

pub mod aggregator;
pub mod classifier;
pub mod domain;
pub mod officers;
pub mod registry;
pub mod router;
pub mod service;
pub mod store;
pub mod writer;

#[cfg(test)]
mod tests;

pub use aggregator::ReportAggregator;
pub use classifier::OverdueClassifier;
pub use domain::{
    CompanyProfile, CompanySummary, OfficerInfo, OfficerRecord, OverdueRecord, ReportArtifact,
    SearchCriteria, SearchRequest, ValidationError, NOT_AVAILABLE,
};
pub use officers::OfficerResolver;
pub use registry::{CompaniesHouseClient, RegistryApi, RegistryCredential, TransportError};
pub use router::report_router;
pub use service::{ReportService, ReportServiceError, SearchOutcome};
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore, StoreError};
pub use writer::{
    ReportWriteError, ReportWriter, EMPTY_REPORT_PLACEHOLDER, REPORT_CONTENT_TYPE,
    REPORT_SHEET_NAME,
};
