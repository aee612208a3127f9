mod commands;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use manifesto_core::{ManifestDocument, UserConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "manifesto")]
#[command(about = "Inspect project manifests and generate env files")]
struct Cli {
    /// Path to the manifest file [default: manifesto.yml]
    #[arg(short, long, global = true, env = "MANIFESTO_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Output format for listings
    #[arg(long, global = true, value_enum, default_value_t)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print layers, resources and blueprints
    Show,

    /// List layers
    Layers {
        /// Only names of layers using this technology (case-insensitive)
        #[arg(long)]
        technology: Option<String>,
    },

    /// List resources
    Resources {
        /// Only names of resources with exactly this type
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
    },

    /// List blueprints
    Blueprints {
        /// Only names of blueprints generating this resource
        #[arg(long)]
        resource: Option<String>,
    },

    /// Write an env file with one <LAYER>_TECNOLOGIA entry per layer
    Env {
        /// Output path [default: .env]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Watch the manifest and regenerate on change
        #[arg(long)]
        watch: bool,
    },
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let config = UserConfig::load();
    let manifest_path = cli.manifest.unwrap_or(config.manifest.path);
    tracing::debug!(manifest = %manifest_path.display(), "using manifest");

    if let Command::Env {
        output,
        watch: true,
    } = &cli.command
    {
        let output = output.clone().unwrap_or(config.env.output);
        return commands::env::watch(&manifest_path, &output);
    }

    let manifest = match ManifestDocument::load(&manifest_path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Show => commands::list::show(&manifest, cli.format),
        Command::Layers { technology } => {
            commands::list::layers(&manifest, technology.as_deref(), cli.format)
        }
        Command::Resources { kind } => {
            commands::list::resources(&manifest, kind.as_deref(), cli.format)
        }
        Command::Blueprints { resource } => {
            commands::list::blueprints(&manifest, resource.as_deref(), cli.format)
        }
        Command::Env { output, .. } => {
            commands::env::run(&manifest, &output.unwrap_or(config.env.output))
        }
    }
}
