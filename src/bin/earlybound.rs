//! earlybound CLI - early-bound C# type generation from platform metadata
//!
//! This CLI tool generates entity classes, option set enums and action
//! request types from an earlybound.yaml configuration and a metadata snapshot.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use earlybound::codegen::{
    load_adapter, DiskStore, GenerationConfig, GenerationOrchestrator, ProjectConfig, Result,
};

#[derive(Parser)]
#[command(name = "earlybound")]
#[command(version, about = "Early-bound C# type generation from platform metadata", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate early-bound types
    Generate {
        /// Path to earlybound.yaml
        #[arg(short, long, default_value = "earlybound.yaml")]
        config: PathBuf,

        /// Path to the metadata snapshot (YAML or JSON)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Base output directory (default: the config file's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only generate entries tagged with this profile
        #[arg(short, long)]
        profile: Option<String>,

        /// List the files that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration and metadata without writing anything
    Validate {
        /// Path to earlybound.yaml
        #[arg(short, long, default_value = "earlybound.yaml")]
        config: PathBuf,

        /// Path to the metadata snapshot (YAML or JSON)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Only validate entries tagged with this profile
        #[arg(short, long)]
        profile: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate { config, metadata, output, profile, dry_run } => {
            generate(&config, &metadata, output.as_deref(), profile.as_deref(), dry_run)
        }
        Commands::Validate { config, metadata, profile } => {
            validate(&config, &metadata, profile.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_config(config: &Path, output: Option<&Path>, profile: Option<&str>) -> Result<GenerationConfig> {
    println!("📋 Loading configuration from {}...", config.display());

    let project = ProjectConfig::from_file(config)?;
    project.validate()?;

    let base_dir = output.or_else(|| config.parent());
    let generation_config = project.to_generation_config(base_dir, profile)?;

    println!("  ✓ {} earlyboundtypes entries", generation_config.groups.len());
    Ok(generation_config)
}

/// Generate early-bound types
fn generate(
    config: &Path,
    metadata: &Path,
    output: Option<&Path>,
    profile: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let generation_config = load_config(config, output, profile)?;

    println!("📥 Loading metadata from {}...", metadata.display());
    let adapter = load_adapter(metadata)?;

    println!("🔧 Generating early-bound types...");
    let mut orchestrator = GenerationOrchestrator::new(&generation_config, &adapter);

    if dry_run {
        let artifacts = orchestrator.generate()?;
        println!("\n📝 Dry run, {} files would be written:", artifacts.len());
        for (path, contents) in artifacts.files() {
            println!("  - {} ({} bytes)", path.display(), contents.len());
        }
        return Ok(());
    }

    let report = orchestrator.run(&mut DiskStore)?;
    println!("  ✓ {} entities", report.entities);
    println!("  ✓ {} option sets", report.option_sets);
    println!("  ✓ {} actions", report.actions);
    if report.skipped_selections > 0 {
        println!("  ⚠ {} duplicate selections skipped", report.skipped_selections);
    }

    println!("\n📁 Generated files:");
    for path in &report.files {
        println!("  - {}", path.display());
    }

    println!("\n✨ Code generation complete!");
    Ok(())
}

/// Validate configuration and metadata without writing anything
fn validate(config: &Path, metadata: &Path, profile: Option<&str>) -> Result<()> {
    let generation_config = load_config(config, None, profile)?;

    println!("🔍 Validating metadata in {}...", metadata.display());
    let adapter = load_adapter(metadata)?;
    println!("  ✓ {} entities in snapshot", adapter.entity_names().count());

    let mut orchestrator = GenerationOrchestrator::new(&generation_config, &adapter);
    let artifacts = orchestrator.generate()?;

    let report = orchestrator.report();
    println!(
        "  ✓ {} entities, {} option sets, {} actions in {} files",
        report.entities,
        report.option_sets,
        report.actions,
        artifacts.len()
    );

    let duplicates = artifacts.duplicate_declarations();
    if !duplicates.is_empty() {
        return Err(earlybound::GenerationError::Config(format!(
            "types declared more than once: {}",
            duplicates.join(", ")
        )));
    }

    println!("✅ Configuration and metadata are valid!");
    Ok(())
}
