//! BounceBan node CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: flags and `BOUNCEBAN_*` environment variables.
//! 2. **Wire observability**: `tracing-subscriber` with a text or JSON layer
//!    on stderr, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure**: a [`bounceban_api::BouncebanClient`] injected
//!    into [`nodes::BouncebanNode`].
//! 4. **Run the command**: `verify` reads items from a file or stdin and
//!    writes output items to stdout; `test-credentials` runs the account check.

mod config;
mod io;
mod observability;

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use bounceban_api::BouncebanClient;
use clap::Parser;
use nodes::{BouncebanNode, NodeParameters};
use pipeline::InputItem;
use serde_json::json;
use tracing::{error, info};

use crate::config::{Cli, Command, VerifyArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match observability::init(&cli.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = BouncebanClient::new(cli.client.to_client_config()?)?;

    match cli.command {
        Command::Verify(args) => verify(client, args).await,
        Command::TestCredentials => {
            let node = BouncebanNode::new(Arc::new(client), NodeParameters::default());
            let account = node
                .test_credentials()
                .await
                .context("credential test failed")?;
            info!("credentials accepted");
            println!("{}", serde_json::to_string_pretty(&account)?);
            Ok(())
        }
    }
}

async fn verify(client: BouncebanClient, args: VerifyArgs) -> anyhow::Result<()> {
    let parameters = args.to_parameters()?;

    let items = match (&args.email, &args.input) {
        (Some(address), None) => vec![InputItem::new(json!({ "email": address }))],
        (_, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            io::parse_items(&text)?
        }
        (None, None) => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            io::parse_items(&text)?
        }
    };

    let node = BouncebanNode::new(Arc::new(client), parameters);
    let output = node.execute(&items).await?;

    io::write_items(std::io::stdout().lock(), &output.items, args.pretty)?;

    if args.summary {
        eprintln!("{}", serde_json::to_string_pretty(&output.summary)?);
    }

    Ok(())
}
