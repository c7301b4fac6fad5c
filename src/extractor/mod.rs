//! Extraction orchestration
//!
//! [`SingleExtractor`] turns one URL into an
//! [`ExtractionResult`](crate::model::ExtractionResult); [`BulkExtractor`]
//! discovers articles on a listing page and runs the single extractor over
//! each of them.

pub mod bulk;
pub mod politeness;
pub mod single;

pub use bulk::{BulkExtractor, BulkState};
pub use politeness::{DomainLimiter, DomainPermit};
pub use single::SingleExtractor;

use std::any::Any;

/// Readable message for a caught panic payload
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    format!("unexpected panic: {}", detail)
}
