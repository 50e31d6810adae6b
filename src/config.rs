//! Run Configuration
//!
//! Command-line arguments and the immutable configuration value shared by the
//! loader, dispatcher and HTTP client for one run. Nothing is persisted.

use crate::api::auth::ApiToken;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Timeout applied to create requests
pub const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 15;

/// Force flag sent with delete requests when none is given
pub const DEFAULT_FORCE: &str = "false";

/// Positional arguments and run options
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Operation to perform: `post` creates resources, `delete` removes them
    pub operation: String,

    /// API token, sent as `Authorization: Token <auth_token>`
    pub auth_token: String,

    /// Directory holding one FHIR resource per file (searched recursively)
    pub input_dir: PathBuf,

    /// Owner namespace URL of the resource endpoint,
    /// e.g. http://localhost:8080/orgs/HL7/CodeSystem/
    pub base_url: String,

    /// If true, deletes go straight to the database instead of through the API
    #[arg(default_value = DEFAULT_FORCE)]
    pub force: String,

    /// Timeout in seconds for create requests
    #[arg(long = "timeout", default_value_t = DEFAULT_CREATE_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Print what would be sent without contacting the server
    #[arg(long)]
    pub dry_run: bool,
}

/// Operation selected once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// POST every resource to the base URL
    Create,
    /// DELETE the resource's own version and its HEAD version
    Delete,
    /// Anything else: resources are loaded but nothing is sent
    Unrecognized(String),
}

impl Operation {
    /// Map the command-line value (case-insensitive)
    pub fn from_arg(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "post" => Self::Create,
            "delete" => Self::Delete,
            _ => Self::Unrecognized(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "post",
            Self::Delete => "delete",
            Self::Unrecognized(s) => s,
        }
    }
}

/// Immutable configuration for a single run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub operation: Operation,
    pub token: ApiToken,
    pub input_dir: PathBuf,
    /// Base URL exactly as given; creates are POSTed here unchanged
    pub base_url: String,
    /// Passed verbatim into the delete query string
    pub force: String,
    pub create_timeout: Duration,
    pub dry_run: bool,
}

impl RunConfig {
    /// Create a configuration with default force flag, timeout and dry-run off
    pub fn new(
        operation: Operation,
        token: &str,
        input_dir: impl Into<PathBuf>,
        base_url: &str,
    ) -> Result<Self> {
        validate_base_url(base_url)?;

        Ok(Self {
            operation,
            token: ApiToken::new(token),
            input_dir: input_dir.into(),
            base_url: base_url.to_string(),
            force: DEFAULT_FORCE.to_string(),
            create_timeout: Duration::from_secs(DEFAULT_CREATE_TIMEOUT_SECS),
            dry_run: false,
        })
    }

    /// Build the configuration from parsed command-line arguments
    pub fn from_args(args: &RunArgs) -> Result<Self> {
        let config = Self::new(
            Operation::from_arg(&args.operation),
            &args.auth_token,
            &args.input_dir,
            &args.base_url,
        )?
        .with_force(&args.force)
        .with_create_timeout(Duration::from_secs(args.timeout_secs));

        Ok(if args.dry_run {
            config.with_dry_run()
        } else {
            config
        })
    }

    pub fn with_force(mut self, force: &str) -> Self {
        self.force = force.to_string();
        self
    }

    pub fn with_create_timeout(mut self, timeout: Duration) -> Self {
        self.create_timeout = timeout;
        self
    }

    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Base URL must be an absolute http(s) URL
fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow::anyhow!(
            "Unsupported URL scheme '{}' in base URL {}",
            other,
            base_url
        )),
    }
}
