use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use ap_app::{AppError, AppResult, config_service, run_service};
use ap_controls::ComponentRegistry;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ap-cli")]
#[command(about = "Autopilot CLI - configure and replay PID control loops", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration and bind every component
    Validate {
        /// Path to the configuration file (YAML or JSON)
        config_path: PathBuf,
    },
    /// List components in a configuration
    Components {
        /// Path to the configuration file (YAML or JSON)
        config_path: PathBuf,
    },
    /// List registered component types
    Types,
    /// Replay the configuration's scenario
    Run {
        /// Path to the configuration file (YAML or JSON)
        config_path: PathBuf,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = ComponentRegistry::with_defaults();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path, &registry),
        Commands::Components { config_path } => cmd_components(&config_path),
        Commands::Types => cmd_types(&registry),
        Commands::Run {
            config_path,
            output,
            format,
        } => cmd_run(&config_path, &registry, output.as_deref(), format),
    }
}

fn cmd_validate(config_path: &Path, registry: &ComponentRegistry) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = config_service::load_config(config_path)?;
    config_service::validate_config(&config, registry)?;
    println!("✓ Configuration is valid ({} components)", config.components.len());
    Ok(())
}

fn cmd_components(config_path: &Path) -> AppResult<()> {
    let config = config_service::load_config(config_path)?;
    let components = config_service::list_components(&config);

    if components.is_empty() {
        println!("No components found in configuration");
    } else {
        println!("Components in {}:", config.name);
        for c in components {
            println!(
                "  {} - {} ({} entries: {})",
                c.name,
                c.kind,
                c.entry_count,
                c.keys.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_types(registry: &ComponentRegistry) -> AppResult<()> {
    for kind in registry.kinds() {
        println!("{kind}");
    }
    Ok(())
}

fn cmd_run(
    config_path: &Path,
    registry: &ComponentRegistry,
    output: Option<&Path>,
    format: Format,
) -> AppResult<()> {
    let config = config_service::load_config(config_path)?;
    let result = run_service::run_scenario(&config, registry)?;

    let rendered = match format {
        Format::Csv => result.to_csv(),
        Format::Json => serde_json::to_string_pretty(&result)
            .map_err(|e| AppError::InvalidInput(format!("Failed to encode run: {e}")))?,
    };

    if let Some(path) = output {
        std::fs::write(path, rendered)?;
        eprintln!(
            "✓ Wrote {} steps of {} to {}",
            result.steps,
            result.name,
            path.display()
        );
    } else {
        print!("{rendered}");
    }
    tracing::debug!(wall_time_s = result.wall_time_s, "run complete");
    Ok(())
}
