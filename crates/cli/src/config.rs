//! Command-line and environment configuration.
//!
//! Every client setting can come from a flag or its `BOUNCEBAN_*` environment
//! variable; flags win.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use bounceban_api::{ClientConfig, DEFAULT_ACCOUNT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_VERIFY_BASE_URL};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nodes::{EmailSource, NodeParameters};
use pipeline::{
    AdditionalFields, ApiKey, CatchallVerify, FieldName, Operation, ProcessingMode,
    VerificationMode,
};

#[derive(Debug, Parser)]
#[command(
    name = "bounceban",
    version,
    about = "Verify email addresses with the BounceBan API"
)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,

    #[command(flatten)]
    pub logging: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify the email address of every input item
    Verify(VerifyArgs),
    /// Check that the API key is accepted (GET /v1/account)
    TestCredentials,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
    /// BounceBan API key
    #[arg(long, env = "BOUNCEBAN_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the verification endpoint
    #[arg(long, env = "BOUNCEBAN_VERIFY_BASE_URL", default_value = DEFAULT_VERIFY_BASE_URL, global = true)]
    pub verify_base_url: String,

    /// Base URL of the account endpoint
    #[arg(long, env = "BOUNCEBAN_ACCOUNT_BASE_URL", default_value = DEFAULT_ACCOUNT_BASE_URL, global = true)]
    pub account_base_url: String,

    /// Retries after the first attempt when the service answers 408
    #[arg(long, env = "BOUNCEBAN_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES, global = true)]
    pub max_retries: u32,

    /// Delay between 408 retries when no Retry-After is sent
    #[arg(long, env = "BOUNCEBAN_RETRY_DELAY_MS", default_value_t = 0, global = true)]
    pub retry_delay_ms: u64,

    /// Client-side request timeout; unset means no limit
    #[arg(long, env = "BOUNCEBAN_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

impl ClientArgs {
    pub fn to_client_config(&self) -> anyhow::Result<ClientConfig> {
        let Some(raw) = self.api_key.as_deref() else {
            bail!("an API key is required (--api-key or BOUNCEBAN_API_KEY)");
        };
        let api_key = ApiKey::new(raw).context("the API key must not be blank")?;

        let config = ClientConfig::new(api_key)
            .with_verify_base_url(&self.verify_base_url)
            .with_account_base_url(&self.account_base_url)
            .with_max_retries(self.max_retries)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms));

        Ok(match self.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Default log level; RUST_LOG overrides it
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// JSON input: an array of items, one object, or JSON Lines. Reads stdin when omitted.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Item field holding the address; a leading '/' makes it a JSON pointer
    #[arg(long, default_value = "email", conflicts_with = "email")]
    pub email_field: String,

    /// Verify this address instead of reading items
    #[arg(long)]
    pub email: Option<String>,

    /// Node operation
    #[arg(long, default_value = "validateEmail")]
    pub operation: String,

    /// sequential | batch
    #[arg(long, default_value = "sequential")]
    pub processing_mode: ProcessingMode,

    /// Sequential mode: embed item errors instead of aborting
    #[arg(long)]
    pub continue_on_fail: bool,

    /// Batch mode: maximum requests in flight
    #[arg(long)]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Verification mode: regular | deepverify
    #[arg(long)]
    pub mode: Option<VerificationMode>,

    /// 0 enables catch-all verification, 1 disables it
    #[arg(long)]
    pub disable_catchall_verify: Option<CatchallVerify>,

    /// Webhook receiving the result by HTTP POST
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Print the run summary to stderr
    #[arg(long)]
    pub summary: bool,

    /// Pretty-print the output JSON
    #[arg(long)]
    pub pretty: bool,
}

impl VerifyArgs {
    pub fn to_parameters(&self) -> anyhow::Result<NodeParameters> {
        let email = match &self.email {
            Some(address) => EmailSource::Literal(address.clone()),
            None => match FieldName::new(self.email_field.as_str()) {
                Some(field) => EmailSource::Field(field),
                None => bail!("--email-field must not be empty"),
            },
        };

        Ok(NodeParameters {
            operation: self.operation.clone(),
            email,
            processing_mode: self.processing_mode,
            additional_fields: AdditionalFields {
                mode: self.mode,
                disable_catchall_verify: self.disable_catchall_verify,
                url: self.webhook_url.clone(),
            },
            continue_on_fail: self.continue_on_fail,
            max_concurrency: self.max_concurrency,
        })
    }
}

impl Default for VerifyArgs {
    fn default() -> Self {
        Self {
            input: None,
            email_field: "email".to_string(),
            email: None,
            operation: Operation::ValidateEmail.as_str().to_string(),
            processing_mode: ProcessingMode::Sequential,
            continue_on_fail: false,
            max_concurrency: None,
            mode: None,
            disable_catchall_verify: None,
            webhook_url: None,
            summary: false,
            pretty: false,
        }
    }
}
