//! Resource files and their dispatch to the server
//!
//! # Architecture
//!
//! - [`loader`] - Reads one payload per non-hidden file under the input directory
//! - [`descriptor`] - Extracts `resourceType`, `id` and `version` from a payload
//! - [`dispatch`] - Creates or deletes each resource and runs the retry pass
//!
//! # Example
//!
//! ```ignore
//! use fhirload::resource::{load_payloads, run};
//!
//! async fn load(config: &RunConfig, client: &FhirHttpClient) -> anyhow::Result<()> {
//!     let payloads = load_payloads(&config.input_dir)?;
//!     let summary = run(config, client, &payloads).await?;
//!     println!("{}", summary.totals_line());
//!     Ok(())
//! }
//! ```

pub mod descriptor;
pub mod dispatch;
pub mod loader;

pub use descriptor::{MalformedPayload, ResourceDescriptor, ResourcePayload};
pub use dispatch::{run, Dispatcher, Pass, PassSummary, RunSummary};
pub use loader::load_payloads;
