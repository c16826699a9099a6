//! helmdeck CLI - Resolve, plan and apply Helm releases across deployment targets

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::plan::PlanArgs;
use commands::resolve::OutputFormat;

#[derive(Parser)]
#[command(name = "helmdeck")]
#[command(author = "helmdeck Contributors")]
#[command(version)]
#[command(about = "Resolve, plan and apply Helm releases across deployment targets", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Build file declaring targets and releases
    #[arg(
        short = 'f',
        long = "file",
        global = true,
        env = "HELMDECK_FILE",
        default_value = helmdeck_core::BUILD_FILE_NAME
    )]
    file: PathBuf,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List declared release targets
    Targets,

    /// List declared releases
    Releases {
        /// Mark which releases the target selects
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Show the resolved configuration of a release for a target
    Resolve {
        /// Release declaration name
        release: String,

        /// Target to resolve for
        #[arg(short, long)]
        target: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Preview the merged values Helm would receive
    Values {
        /// Release declaration name
        release: String,

        /// Target to resolve for
        #[arg(short, long)]
        target: String,

        /// Set values on command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,
    },

    /// Show the ordered helm commands for a target
    Plan {
        #[command(flatten)]
        args: PlanArgs,
    },

    /// Run the ordered helm commands for a target
    Apply {
        #[command(flatten)]
        args: PlanArgs,

        /// helm binary to run
        #[arg(long, env = "HELM_BIN", default_value = "helm")]
        helm: String,
    },

    /// Check the build file for mistakes
    Lint {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> error::Result<()> {
    let file = cli.file.as_path();

    match cli.command {
        Commands::Targets => commands::targets::run(file),

        Commands::Releases { target } => commands::releases::run(file, target.as_deref()),

        Commands::Resolve {
            release,
            target,
            output,
        } => commands::resolve::run(file, &release, &target, output),

        Commands::Values {
            release,
            target,
            set,
        } => commands::values::run(file, &release, &target, &set),

        Commands::Plan { args } => commands::plan::run(file, &args),

        Commands::Apply { args, helm } => commands::apply::run(file, &args, &helm),

        Commands::Lint { strict } => commands::lint::run(file, strict),
    }
}

/// Log to stderr; `RUST_LOG` selects the level unless `--debug` is given
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
