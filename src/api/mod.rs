//! Terminology service API
//!
//! # Module Structure
//!
//! - [`auth`] - API token and `Authorization` header
//! - [`http`] - Create/delete calls and response classification
//!
//! # Example
//!
//! ```ignore
//! use fhirload::api::http::{CreateOutcome, FhirHttpClient};
//!
//! async fn example(config: &fhirload::config::RunConfig, body: &str) -> anyhow::Result<()> {
//!     let client = FhirHttpClient::new(config)?;
//!     if let CreateOutcome::TransportFailure(e) = client.create(body).await {
//!         eprintln!("{e}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod http;
