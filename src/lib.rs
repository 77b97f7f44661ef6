//! Turns arbitrary article pages into clean text plus title, author and
//! publish date.
//!
//! The flow for one URL is fetch, normalize, walk the selector cascade until a
//! region qualifies, then assemble the result with independently extracted
//! metadata. See [`pipeline::Extractor`] for the entry point and
//! [`batch::extract_batch`] for many URLs at once.

pub mod batch;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod telemetry;

pub use error::ExtractionError;
pub use extractor::{CascadeConfig, ExtractionResult, SelectorRule};
pub use pipeline::Extractor;
