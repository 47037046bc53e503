//! CLI argument parsing with clap.

use clap::Parser;

use together_node::config::DefaultsConfig;
use together_node::node::NodeInputs;
use together_node::params::DEFAULT_PROMPT;

/// Run the Together AI image generation node outside the host graph.
#[derive(Parser, Debug)]
#[command(name = "together-node", version, about)]
pub struct Cli {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Model identifier (defaults to the config file, then FLUX.1-schnell).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Width in pixels, clamped to 256..=2048 and snapped to 64.
    #[arg(short = 'W', long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Height in pixels, clamped to 256..=2048 and snapped to 64.
    #[arg(short = 'H', long, allow_negative_numbers = true)]
    pub height: Option<i64>,

    /// Diffusion steps, clamped to 1..=100.
    #[arg(short, long, allow_negative_numbers = true)]
    pub steps: Option<i64>,

    /// Comma-separated LoRA adapter URLs.
    #[arg(long, default_value = "")]
    pub lora_urls: String,

    /// Comma-separated LoRA scales, matched to URLs by position.
    #[arg(long, default_value = "")]
    pub lora_scales: String,

    /// Output format: png, jpeg, webp.
    #[arg(short, long, default_value = "png")]
    pub format: String,

    /// Output file path (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Fail instead of writing the fallback image.
    #[arg(long)]
    pub strict: bool,

    /// Print the node descriptors as JSON and exit.
    #[arg(long)]
    pub describe: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the prompt from the positional argument, the file flag, or the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(text.clone())
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path)
        } else {
            Ok(DEFAULT_PROMPT.to_string())
        }
    }

    /// Build node inputs, filling unset flags from config defaults.
    #[must_use]
    pub fn node_inputs(&self, prompt: String, defaults: &DefaultsConfig) -> NodeInputs {
        NodeInputs {
            prompt,
            model: self.model.clone().unwrap_or_else(|| defaults.model.clone()),
            width: self.width.unwrap_or(i64::from(defaults.width)),
            height: self.height.unwrap_or(i64::from(defaults.height)),
            steps: self.steps.unwrap_or(i64::from(defaults.steps)),
            lora_urls: self.lora_urls.clone(),
            lora_scales: self.lora_scales.clone(),
        }
    }
}
