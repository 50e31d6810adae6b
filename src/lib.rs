//! Library crate for fhirload.
//!
//! Bulk-creates or deletes FHIR resources, one per file, against a
//! token-authenticated terminology service. The binary in `src/main.rs` is a
//! thin command-line wrapper around these modules.

pub mod api;
pub mod config;
pub mod resource;

pub use api::http::{CreateOutcome, DeleteOutcome, FhirHttpClient};
pub use config::{Operation, RunArgs, RunConfig};
pub use resource::{load_payloads, run, RunSummary};
