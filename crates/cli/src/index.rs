use std::io::{self, Write};
use std::num::NonZeroUsize;

use apicanon_core::{ApiModule, Catalog, DeclIndex};
use clap::Args;
use rayon::prelude::*;
use tracing::warn;

use crate::common::{CatalogArgs, run_command, select_modules, thread_pool};

#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Only index this module (repeatable)
    #[arg(long = "module", short = 'm', value_name = "NAME")]
    pub modules: Vec<String>,

    /// Print only declarations that appear more than once, with their count
    #[arg(long)]
    pub duplicates: bool,

    /// Number of worker threads [default: one per CPU]
    #[arg(long, short = 'j')]
    pub jobs: Option<NonZeroUsize>,
}

pub fn run(args: IndexArgs) -> i32 {
    run_command(|| run_inner(args, &mut io::stdout().lock()))
}

fn run_inner<W: Write>(args: IndexArgs, out: &mut W) -> Result<(), String> {
    let settings = args.catalog.settings()?;
    let catalog = Catalog::new(settings.catalog);
    let modules = select_modules(&catalog, &args.modules)?;

    let pool = thread_pool(args.jobs)?;
    let loaded: Vec<ApiModule> = pool.install(|| {
        modules
            .par_iter()
            .map(|module| catalog.load_module(module).map_err(|err| err.to_string()))
            .collect::<Result<_, String>>()
    })?;

    let mut index = DeclIndex::new();
    for (name, module) in modules.iter().zip(&loaded) {
        index
            .add_module(name, module)
            .map_err(|err| format!("module '{name}': {err}"))?;
    }

    for (decl, count) in index.duplicates() {
        warn!(decl = %decl, count, "Declaration appears more than once.");
    }

    let write_err = |err: io::Error| format!("Failed to write index: {err}");
    if args.duplicates {
        for (decl, count) in index.duplicates() {
            writeln!(out, "{decl}\t{count}").map_err(write_err)?;
        }
    } else {
        for decl in index.iter() {
            writeln!(out, "{decl}").map_err(write_err)?;
        }
    }
    Ok(())
}
