//! ov-convert - Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ov_convert::{
    ConversionPlanner, ConverterConfig, HfHub, ModelSpec, Precision, SystemProcessRunner,
    catalog::DEFAULT_LANGUAGE, report_sizes,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "ov-convert")]
#[command(about = "Convert HuggingFace LLMs to OpenVINO IR", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override artifact output root
    #[arg(long, global = true)]
    output_root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Make sure a converted artifact exists, converting or downloading it if needed
    Convert {
        /// Model id (e.g. Qwen/Qwen3-8B)
        #[arg(short, long)]
        model: String,

        /// FP16, INT8, INT4, INT4-AWQ or INT4-NPU
        #[arg(short, long, default_value = "INT4")]
        precision: Precision,

        /// Try a preconverted artifact from the hub first
        #[arg(long)]
        preconverted: bool,

        /// Pass --trust-remote-code to the converter
        #[arg(long)]
        remote_code: bool,
    },

    /// Print what `convert` would do without running it
    #[command(name = "command")]
    ShowCommand {
        #[arg(short, long)]
        model: String,

        #[arg(short, long, default_value = "INT4")]
        precision: Precision,

        #[arg(long)]
        remote_code: bool,
    },

    /// Show weight sizes and compression rates next to an artifact directory
    Report {
        model_dir: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List catalog models
    Models {
        /// Only this language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// List precisions offered for a device
    Precisions {
        #[arg(short, long, default_value = "CPU")]
        device: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    match cli.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    // Load configuration
    let mut config = ConverterConfig::load(cli.config)?;

    // CLI overrides
    if let Some(root) = cli.output_root {
        config.output_root = root;
    }

    config.validate()?;

    tracing::debug!(
        output_root = ?config.output_root,
        converter = %config.converter_binary,
        hub_org = %config.hub_org,
        "Configuration loaded"
    );

    let catalog = config.catalog();

    match cli.command {
        Commands::Convert {
            model,
            precision,
            preconverted,
            remote_code,
        } => {
            let spec = resolve_spec(&catalog, &model, remote_code);
            let hub = HfHub::new(config.hub_cache_dir.clone(), config.hub_token.clone())
                .context("Failed to initialize hub client")?;
            let planner = ConversionPlanner::from_config(
                &config,
                Arc::new(SystemProcessRunner::new()),
                Arc::new(hub),
            );

            let artifact = planner
                .ensure_converted(&model, &spec, precision, preconverted)
                .await
                .with_context(|| format!("Failed to prepare {} {}", precision, model))?;

            println!("{}", artifact.dir.display());
        }

        Commands::ShowCommand {
            model,
            precision,
            remote_code,
        } => {
            let spec = resolve_spec(&catalog, &model, remote_code);
            let hub = HfHub::new(config.hub_cache_dir.clone(), config.hub_token.clone())
                .context("Failed to initialize hub client")?;
            let planner = ConversionPlanner::from_config(
                &config,
                Arc::new(SystemProcessRunner::new()),
                Arc::new(hub),
            );

            let plan = planner
                .plan(&model, &spec, precision)
                .with_context(|| format!("Failed to plan {} {}", precision, model))?;
            println!("target:       {}", plan.target_dir.display());
            println!("converted:    {}", plan.cached);
            println!("preconverted: {}", plan.preconverted_repo);
            println!("command:      {}", plan.command);
        }

        Commands::Report { model_dir, json } => {
            let report = report_sizes(&model_dir);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialize report")?
                );
            } else if report.is_empty() {
                tracing::warn!(dir = ?model_dir, "No converted weights found");
            } else {
                print!("{report}");
            }
        }

        Commands::Models { language } => {
            let languages = match &language {
                Some(l) => vec![l.as_str()],
                None => catalog.languages(),
            };
            for lang in languages {
                let marker = if lang == DEFAULT_LANGUAGE { " (default)" } else { "" };
                println!("{lang}{marker}:");
                for spec in catalog.models(lang) {
                    let remote = if spec.remote_code { " [remote code]" } else { "" };
                    println!("  {}{}", spec.model_id, remote);
                }
            }
        }

        Commands::Precisions { device } => {
            for precision in Precision::for_device(&device) {
                println!("{precision}");
            }
        }
    }

    Ok(())
}

/// Catalog spec for `model`, or an ad-hoc spec for ids outside the catalog
fn resolve_spec(catalog: &ov_convert::ModelCatalog, model: &str, remote_code: bool) -> ModelSpec {
    match catalog.find(model) {
        Some(spec) => {
            let mut spec = spec.clone();
            spec.remote_code |= remote_code;
            spec
        }
        None => {
            tracing::debug!(model_id = %model, "Model not in catalog, using it as-is");
            ModelSpec::new(model).with_remote_code(remote_code)
        }
    }
}
