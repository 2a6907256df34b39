//! Every validator, grouped by the phase it runs in (spec.md §4.4-§4.7).
pub mod business_activity;
pub mod country;
pub mod data_quality;
pub mod doc_spec;
pub mod message_spec;
pub mod pillar2;
pub mod summary;
pub mod tin;

use crate::validator::Validator;

/// Builds the full, ordered validator registry the engine dispatches
/// (spec.md §5): business rules first, then country rules, then data
/// quality, then Pillar 2 readiness last.
pub fn build_registry() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(message_spec::MessageSpecValidator),
        Box::new(doc_spec::DocSpecValidator),
        Box::new(tin::TinValidator),
        Box::new(summary::SummaryValidator),
        Box::new(business_activity::BusinessActivityValidator),
        Box::new(country::luxembourg::LuxembourgValidator),
        Box::new(data_quality::completeness::CompletenessValidator),
        Box::new(data_quality::consistency::ConsistencyValidator),
        Box::new(data_quality::cross_field::CrossFieldValidator),
        Box::new(data_quality::common_errors::CommonErrorsValidator),
        Box::new(pillar2::Pillar2Validator),
    ]
}
