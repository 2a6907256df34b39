//! The external DocRefId persistence lookup, modeled as a trait boundary.
//!
//! This trait is synchronous rather than async (see `DESIGN.md`), following
//! the dependency-free, async-runtime-free precedent set by this workspace's
//! other external-collaborator abstractions. Any error is downgraded by the
//! one caller (`rules::doc_spec`) to an `APP-004` info finding and never
//! propagated further.
use std::fmt;

use serde::{Deserialize, Serialize};

/// A previously recorded `DocRefId`, as returned by a duplicate hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingDocRefIdRecord {
    pub doc_ref_id: String,
    pub issuing_jurisdiction: String,
    pub reporting_period: String,
    pub created_at: String,
    pub is_superseded: bool,
}

/// One duplicate found during a batch check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateDocRefId {
    pub doc_ref_id: String,
    pub existing_record: ExistingDocRefIdRecord,
}

/// The result of a `DocRefIdStore::batch_check` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchCheckResponse {
    pub unique: Vec<String>,
    pub duplicates: Vec<DuplicateDocRefId>,
}

/// Failure modes of the external lookup. Always recoverable: the caller
/// downgrades any variant to an informational finding.
#[derive(Debug, Clone, PartialEq)]
pub enum DocRefIdStoreError {
    Timeout,
    Unavailable(String),
    Other(String),
}

impl fmt::Display for DocRefIdStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "DocRefId store lookup timed out"),
            Self::Unavailable(detail) => write!(f, "DocRefId store unavailable: {detail}"),
            Self::Other(detail) => write!(f, "DocRefId store error: {detail}"),
        }
    }
}

impl std::error::Error for DocRefIdStoreError {}

/// An external key-value lookup over previously submitted `DocRefId`s.
/// Object-safe and synchronous (see module docs for why).
pub trait DocRefIdStore: Send + Sync {
    fn batch_check(&self, ids: &[String]) -> Result<BatchCheckResponse, DocRefIdStoreError>;
}

/// A `DocRefIdStore` that treats every id as unique. Used when
/// `check_global_doc_ref_ids` is disabled, or in tests, so
/// `rules::doc_spec` never needs an `Option<&dyn DocRefIdStore>`.
pub struct NullDocRefIdStore;

impl DocRefIdStore for NullDocRefIdStore {
    fn batch_check(&self, ids: &[String]) -> Result<BatchCheckResponse, DocRefIdStoreError> {
        Ok(BatchCheckResponse {
            unique: ids.to_vec(),
            duplicates: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn null_store_reports_everything_unique() {
        let store = NullDocRefIdStore;
        let ids = vec!["a".to_string(), "b".to_string()];
        let response = store.batch_check(&ids).expect("never fails");
        assert_eq!(response.unique, ids);
        assert!(response.duplicates.is_empty());
    }
}
