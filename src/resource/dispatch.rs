//! Resource Dispatcher
//!
//! Sends each loaded resource to the server according to the run's
//! operation, one at a time, and drives the single retry pass for creates
//! that never got a response.

use super::descriptor::{ResourceDescriptor, ResourcePayload};
use crate::api::http::{CreateOutcome, DeleteOutcome, FhirHttpClient, HEAD_VERSION};
use crate::config::{Operation, RunConfig};
use anyhow::Result;

/// Which pass over the payloads is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// All loaded payloads; transport failures are queued for retry
    First,
    /// The retry set from the first pass; failures are final
    Retry,
}

/// Tallies and console output of one pass
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    pub created: usize,
    pub already_exists: usize,
    /// HTTP error responses, plus transport failures on the retry pass
    pub create_errors: usize,
    /// Transport failures queued for the retry pass
    pub retried: usize,
    pub deleted: usize,
    pub delete_errors: usize,
    /// Payloads without `id` or `version`
    pub skipped: usize,
    /// Dry-run actions printed instead of sent
    pub planned: usize,
    /// Status lines in the order they were printed
    pub lines: Vec<String>,
    /// Payloads to attempt again
    pub retry: Vec<ResourcePayload>,
}

impl PassSummary {
    fn emit(&mut self, line: String) {
        println!("{}", line);
        self.lines.push(line);
    }
}

/// Summary of a whole run: the first pass and the optional retry pass
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub first: PassSummary,
    pub retry: Option<PassSummary>,
}

impl RunSummary {
    fn total(&self, field: impl Fn(&PassSummary) -> usize) -> usize {
        field(&self.first) + self.retry.as_ref().map(&field).unwrap_or(0)
    }

    /// One-line human readable totals across both passes
    pub fn totals_line(&self) -> String {
        format!(
            "Summary: created={}, already_exists={}, create_errors={}, retried={}, deleted={}, delete_errors={}, skipped={}",
            self.total(|p| p.created),
            self.total(|p| p.already_exists),
            self.total(|p| p.create_errors),
            self.total(|p| p.retried),
            self.total(|p| p.deleted),
            self.total(|p| p.delete_errors),
            self.total(|p| p.skipped),
        )
    }
}

/// Sends payloads using one client and configuration
pub struct Dispatcher<'a> {
    config: &'a RunConfig,
    client: &'a FhirHttpClient,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a RunConfig, client: &'a FhirHttpClient) -> Self {
        Self { config, client }
    }

    /// Process every payload once.
    ///
    /// A payload that is not a JSON object with a `resourceType` aborts the
    /// pass with a [`MalformedPayload`](super::MalformedPayload) error.
    pub async fn run_pass(&self, payloads: &[ResourcePayload], pass: Pass) -> Result<PassSummary> {
        let mut summary = PassSummary::default();

        for payload in payloads {
            let Some(descriptor) = ResourceDescriptor::parse(payload)? else {
                tracing::debug!("Skipping {}: missing id or version", payload.path.display());
                summary.skipped += 1;
                continue;
            };

            match &self.config.operation {
                Operation::Create => {
                    self.create(payload, &descriptor, pass, &mut summary).await;
                }
                Operation::Delete => {
                    self.delete(&descriptor, &descriptor.version, &mut summary)
                        .await;
                    self.delete(&descriptor, HEAD_VERSION, &mut summary).await;
                }
                Operation::Unrecognized(op) => {
                    tracing::trace!("No action for {} with operation '{}'", descriptor, op);
                }
            }
        }

        Ok(summary)
    }

    async fn create(
        &self,
        payload: &ResourcePayload,
        descriptor: &ResourceDescriptor,
        pass: Pass,
        summary: &mut PassSummary,
    ) {
        if self.config.dry_run {
            summary.planned += 1;
            summary.emit(format!(
                "Would create {} at {}",
                descriptor,
                self.client.base_url()
            ));
            return;
        }

        match self.client.create(&payload.body).await {
            CreateOutcome::Created => {
                summary.created += 1;
                summary.emit(format!("Created {}", descriptor));
            }
            CreateOutcome::AlreadyExists => {
                summary.already_exists += 1;
                summary.emit(format!("Already Exists {}", descriptor));
            }
            CreateOutcome::HttpError { status, body } => {
                tracing::warn!("Create of {} rejected with {}", descriptor, status);
                summary.create_errors += 1;
                summary.emit(format!("Error creating {} {}", descriptor, body));
            }
            CreateOutcome::TransportFailure(error) => match pass {
                Pass::First => {
                    summary.retried += 1;
                    summary.retry.push(payload.clone());
                    summary.emit(format!(
                        "Error creating {} of id={}. It will be retried again. {}",
                        descriptor.resource_type, descriptor.id, error
                    ));
                }
                Pass::Retry => {
                    summary.create_errors += 1;
                    summary.emit(format!(
                        "Error creating {} Giving up after retry. {}",
                        descriptor, error
                    ));
                }
            },
        }
    }

    async fn delete(&self, descriptor: &ResourceDescriptor, version: &str, summary: &mut PassSummary) {
        let label = descriptor.label(version);

        if self.config.dry_run {
            summary.planned += 1;
            summary.emit(format!(
                "Would delete {} at {}",
                label,
                self.client.delete_url(&descriptor.id, version)
            ));
            return;
        }

        match self
            .client
            .delete(&descriptor.resource_type, &descriptor.id, version)
            .await
        {
            DeleteOutcome::Deleted => {
                summary.deleted += 1;
                summary.emit(format!("Deleted {}", label));
            }
            DeleteOutcome::HttpError { body, .. } => {
                summary.delete_errors += 1;
                summary.emit(format!("Error deleting {} {}", label, body));
            }
            DeleteOutcome::TransportFailure(error) => {
                summary.delete_errors += 1;
                summary.emit(format!("Error deleting {} {}", label, error));
            }
        }
    }
}

/// Run the first pass over all payloads, then exactly one retry pass over
/// the creates that failed at the transport level.
pub async fn run(
    config: &RunConfig,
    client: &FhirHttpClient,
    payloads: &[ResourcePayload],
) -> Result<RunSummary> {
    if let Operation::Unrecognized(op) = &config.operation {
        tracing::warn!("Unrecognized operation '{}'; no requests will be sent", op);
    }

    let dispatcher = Dispatcher::new(config, client);

    let first = dispatcher.run_pass(payloads, Pass::First).await?;

    let retry = if first.retry.is_empty() {
        None
    } else {
        tracing::info!("Retrying {} resources", first.retry.len());
        Some(dispatcher.run_pass(&first.retry, Pass::Retry).await?)
    };

    Ok(RunSummary { first, retry })
}
