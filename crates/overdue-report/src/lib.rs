//! Reports registry companies with overdue confirmation statements or accounts.
//!
//! The pipeline searches the company registry for an incorporation window, fetches
//! each company's profile, keeps the overdue ones, resolves their lead officer and
//! writes the result as a downloadable one-sheet xlsx workbook.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
