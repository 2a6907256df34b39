#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod context;
pub mod dates;
pub mod engine;
pub mod external;
pub mod finding;
pub mod model;
pub mod newtypes;
pub mod reference;
pub mod rules;
#[cfg(test)]
pub mod test_support;
pub mod validator;

pub use context::{AnalysisContext, EntityRef, JurisdictionRef, JurisdictionTotals, ReportMetadata, ValidationOptions};
pub use engine::{CancellationToken, EngineReport, Progress, SeveritySummary, Status, run, run_with};
pub use external::{BatchCheckResponse, DocRefIdStore, DocRefIdStoreError, DuplicateDocRefId, ExistingDocRefIdRecord, NullDocRefIdStore};
pub use finding::builder::FindingBuilder;
pub use finding::{Category, ExpectedActual, Finding, RuleId, Severity};
pub use model::ParsedReport;
pub use newtypes::{CalendarDate, CountryCode, NewtypeError, RefId};

/// Returns the current version of the cbcr-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }
}
