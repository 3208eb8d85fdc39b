//! Postman Forge CLI
//!
//! Command-line interface for turning OpenAPI service specs into versioned,
//! combined Postman collections and publishing them.

mod display;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use postman_forge_common::PipelineConfig;
use postman_forge_sync::{run_info, run_sync, CollectionListing, PostmanClient, SyncSettings};
use postman_forge_transform::{
    all_succeeded, combine_outputs, convert_all, validate_outputs, write_markdown,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "postman-forge")]
#[command(
    version,
    about = "Convert OpenAPI specs into versioned Postman collections",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline configuration file (YAML); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every configured service, then combine the results
    #[command(after_help = "EXAMPLES:\n  \
        # Convert with the built-in Auth and Pricing services\n  \
        postman-forge convert\n\n  \
        # Use a custom service list\n  \
        postman-forge convert --config postman-forge.yml")]
    Convert {
        /// Write the per-service collections only
        #[arg(long)]
        skip_combine: bool,
    },

    /// Merge the per-service collections into one collection
    Combine,

    /// Check the generated collections
    #[command(after_help = "EXAMPLES:\n  \
        # Print the report\n  \
        postman-forge validate\n\n  \
        # Also write it as Markdown\n  \
        postman-forge validate --markdown ./output/validation-report.md")]
    Validate {
        /// Also write the report as Markdown to this file
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// Publish the combined collection to Postman
    #[command(after_help = "EXAMPLES:\n  \
        # Create or update the remote collection\n  \
        POSTMAN_API_KEY=... POSTMAN_WORKSPACE_ID=... postman-forge sync\n\n  \
        # List the collections of the workspace\n  \
        postman-forge sync info")]
    Sync {
        /// What to do
        #[arg(value_enum, default_value_t = SyncCommand::Sync)]
        action: SyncCommand,

        /// Postman API key
        #[arg(long, env = "POSTMAN_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// UID of the collection to update in place
        #[arg(long, env = "POSTMAN_COLLECTION_UID")]
        collection_uid: Option<String>,

        /// Workspace to create collections in and list
        #[arg(long, env = "POSTMAN_WORKSPACE_ID")]
        workspace_id: Option<String>,

        /// Collection file to publish (defaults to the combined output)
        #[arg(long)]
        collection: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SyncCommand {
    /// Create or update the remote collection
    Sync,
    /// List the collections in the workspace
    Info,
}

fn main() -> Result<()> {
    // .env values must be visible to clap's env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert { skip_combine } => convert_command(&config, skip_combine)?,
        Commands::Combine => combine_command(&config)?,
        Commands::Validate { markdown } => {
            validate_command(&config, markdown.as_deref(), cli.verbose)?
        }
        Commands::Sync {
            action,
            api_key,
            collection_uid,
            workspace_id,
            collection,
        } => {
            let settings = SyncSettings::new(api_key, collection_uid, workspace_id);
            let collection_path = collection.unwrap_or_else(|| config.combined.output.clone());
            match action {
                SyncCommand::Sync => sync_command(&config, &settings, &collection_path)?,
                SyncCommand::Info => info_command(&config, &settings)?,
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            println!("{} Loading configuration: {}", "→".cyan(), path.display());
            PipelineConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn convert_command(config: &PipelineConfig, skip_combine: bool) -> Result<()> {
    println!(
        "{} Converting {} services",
        "→".cyan(),
        config.services.len()
    );

    let outcomes = convert_all(config);
    for outcome in &outcomes {
        match &outcome.result {
            Ok(converted) => println!(
                "{} {} → {} ({} items)",
                "✓".green(),
                converted.service.yellow(),
                converted.output.display(),
                converted.item_count
            ),
            Err(e) => eprintln!("{} {}: {}", "✗".red(), outcome.service.yellow(), e),
        }
    }

    if !all_succeeded(&outcomes) {
        anyhow::bail!("Conversion failed; combined collection not written");
    }

    if skip_combine {
        println!("{} Skipping combine step", "⚠".yellow());
        return Ok(());
    }

    combine_command(config)?;

    println!(
        "\n{}",
        "✓ All conversions completed successfully!".green().bold()
    );
    Ok(())
}

fn combine_command(config: &PipelineConfig) -> Result<()> {
    println!("{} Combining collections...", "→".cyan());

    let summary = combine_outputs(config).context("Failed to combine collections")?;

    println!(
        "{} Combined collection created: {}",
        "✓".green(),
        config.combined.output.display()
    );
    display::print_combine_summary(&summary);

    Ok(())
}

fn validate_command(config: &PipelineConfig, markdown: Option<&Path>, verbose: bool) -> Result<()> {
    println!("{} Validating Postman collections...", "→".cyan());

    let summary = validate_outputs(config);
    display::print_validation(&summary, verbose);

    if let Some(path) = markdown {
        write_markdown(&summary, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("{} Report written: {}", "✓".green(), path.display());
    }

    if !summary.passed {
        anyhow::bail!("Collection validation failed");
    }

    Ok(())
}

fn sync_command(
    config: &PipelineConfig,
    settings: &SyncSettings,
    collection_path: &Path,
) -> Result<()> {
    println!("{} Starting Postman synchronization...", "→".cyan());

    let api_url = config.remote.api_url.as_str();
    let outcome = run_sync(
        settings,
        |key| PostmanClient::new(api_url, key),
        collection_path,
    )
    .with_context(|| {
        format!(
            "Failed to sync {} (run \"postman-forge convert\" first if it does not exist)",
            collection_path.display()
        )
    })?;

    display::print_sync_outcome(&outcome);
    Ok(())
}

fn info_command(config: &PipelineConfig, settings: &SyncSettings) -> Result<()> {
    println!("{} Getting collections in workspace...", "→".cyan());

    let api_url = config.remote.api_url.as_str();
    let listing = run_info(settings, |key| PostmanClient::new(api_url, key))
        .context("Failed to list collections")?;

    match listing {
        CollectionListing::Listed(collections) => display::print_collections(&collections),
        CollectionListing::NoWorkspace => println!(
            "{} POSTMAN_WORKSPACE_ID is not set; nothing to list",
            "⚠".yellow()
        ),
    }

    Ok(())
}
