mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{catalog::CatalogSubcommand, config::ConfigSubcommand, step::StepSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "alf",
    about = "Project-based learning planner: walk the wizard, check readiness, export snapshots",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .alf/)
    #[arg(long, global = true, env = "ALF_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an ALF project in the current directory
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Replace the session with a wizard record read from a JSON file ('-' for stdin)
    Import {
        file: PathBuf,
    },

    /// Show readiness percentages and what is still missing
    #[command(alias = "score")]
    Status,

    /// Show and move between wizard steps
    Step {
        #[command(subcommand)]
        subcommand: StepSubcommand,
    },

    /// Submit the current step from a JSON patch and advance on success
    Submit {
        /// Patch file ('-' for stdin)
        #[arg(long)]
        patch: PathBuf,
    },

    /// Validate one step, or every step up to the current one
    Validate {
        #[arg(long)]
        step: Option<String>,
    },

    /// Report dangling references and duplicate ids
    Reconcile {
        /// Clear dangling references and re-id duplicates, then save
        #[arg(long)]
        drop: bool,
    },

    /// Write a snapshot JSON file
    Export {
        /// Output directory (default: export.dir from config, else .alf/exports)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the plain-text snapshot preview
    Preview,

    /// Copy the plain-text snapshot preview to the clipboard
    Copy,

    /// Browse built-in subjects, grade bands, materials, rubric templates and standards
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Import { file } => cmd::import::run(&root, &file, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Step { subcommand } => cmd::step::run(&root, subcommand, cli.json),
        Commands::Submit { patch } => cmd::submit::run(&root, &patch, cli.json),
        Commands::Validate { step } => cmd::validate::run(&root, step.as_deref(), cli.json),
        Commands::Reconcile { drop } => cmd::reconcile::run(&root, drop, cli.json),
        Commands::Export { out } => cmd::export::run(&root, out.as_deref(), cli.json),
        Commands::Preview => cmd::export::preview(&root),
        Commands::Copy => cmd::export::copy(&root, cli.json),
        Commands::Catalog { subcommand } => cmd::catalog::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
