//! together-node - Together AI image generation node.

mod cli;

use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use together_node::config::{self, Config};
use together_node::context::ServiceContext;
use together_node::node;
use together_node::output::{resolve_output_path, save_artifact};
use together_node::params::validate_format;
use together_node::NodeError;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "together_node=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<(), NodeError> {
    if cli.describe {
        let json = serde_json::to_string_pretty(&node::all_descriptors())
            .map_err(|e| NodeError::Config(format!("Failed to serialize descriptor: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    config::load_dotenv();
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(NodeError::Config)?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    validate_format(&cli.format).map_err(NodeError::InvalidArgument)?;

    let prompt = cli.resolve_prompt()?;
    let inputs = cli.node_inputs(prompt, &config.defaults);

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("TOGETHER_NODE_REPLAY").ok();
    let is_recording = std::env::var("TOGETHER_NODE_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::info!(cassette = %cassette_path, "replaying");
        (ServiceContext::replaying(Path::new(cassette_path), &config)?, None)
    } else if is_recording {
        tracing::info!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(&config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config)?, None)
    };

    let artifact = if cli.strict {
        ctx.adapter.try_generate(&inputs).await?
    } else {
        ctx.adapter.generate(&inputs).await
    };

    let output_path = resolve_output_path(cli.output.as_deref(), &inputs.prompt, &cli.format);
    save_artifact(&artifact, &cli.format, &output_path)?;
    eprintln!("Saved: {} ({}x{})", output_path.display(), artifact.width(), artifact.height());

    if let Some(session) = recording_session {
        match session.finish(ctx) {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    Ok(())
}
