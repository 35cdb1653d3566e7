//! Command-line front end for apicanon.
//!
//! Every command resolves its settings (flags, then `--config`, then
//! defaults), opens the catalog and reports failures on stderr with exit
//! code 1.

mod check;
mod common;
mod config;
mod emit;
mod index;
mod list;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub use config::{DEFAULT_OUTPUT_DIR, OutputSettings, Settings};

/// Environment variable holding a log level or a full filter spec.
pub const LOG_ENV: &str = "APICANON_LOG";

const LOG_TARGET: &str = "apicanon";

#[derive(Parser, Debug)]
#[command(
    name = "apicanon",
    version,
    about = "Re-serialize win32json API metadata into a canonical text form"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the modules in the catalog
    List(list::ListArgs),
    /// Write the canonical form of each module
    Emit(emit::EmitArgs),
    /// Compare the canonical form of each module against a reference
    Check(check::CheckArgs),
    /// Print every declaration in the catalog
    Index(index::IndexArgs),
}

/// Parse `args` (program name first), run the chosen command and return the
/// process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::List(args)) => list::run(args),
            Some(Commands::Emit(args)) => emit::run(args),
            Some(Commands::Check(args)) => check::run(args),
            Some(Commands::Index(args)) => index::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Install the stderr log subscriber.
///
/// `APICANON_LOG` takes a plain level ("debug") applied to apicanon's own
/// crates, or a full filter spec ("apicanon_core=trace,warn").
pub fn init_tracing() {
    let filter = match std::env::var(LOG_ENV) {
        Ok(level) if is_plain_level(&level) => format!("{LOG_TARGET}={level}"),
        Ok(spec) => spec,
        Err(_) => format!("{LOG_TARGET}=info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
