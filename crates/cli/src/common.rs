//! Pieces shared by every command.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use apicanon_core::Catalog;
use clap::Args;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::config::Settings;

/// Run a command body, printing its error and mapping the outcome to an exit code.
pub fn run_command<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// Options that locate the catalog.
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Root of the win32json checkout [default: win32json]
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// TOML settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CatalogArgs {
    /// Settings from the config file (if any) with flags applied on top.
    pub fn settings(&self) -> Result<Settings, String> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(source) = &self.source {
            settings.catalog.source.clone_from(source);
        }

        debug!(
            source = %settings.catalog.source.display(),
            output = %settings.output.dir.display(),
            "Resolved settings."
        );
        Ok(settings)
    }
}

/// The modules a command should visit, in catalog order.
///
/// An empty selection means the whole catalog. Naming a module the catalog
/// does not have is an error.
pub fn select_modules(catalog: &Catalog, selected: &[String]) -> Result<Vec<String>, String> {
    let available = catalog.list_modules().map_err(|err| err.to_string())?;
    if selected.is_empty() {
        return Ok(available);
    }

    if let Some(unknown) = selected
        .iter()
        .find(|name| available.binary_search(*name).is_err())
    {
        return Err(format!(
            "unknown module '{unknown}' (not found in {})",
            catalog.config().api_dir().display()
        ));
    }

    Ok(available
        .into_iter()
        .filter(|name| selected.contains(name))
        .collect())
}

/// A worker pool with `jobs` threads, or one per CPU.
pub fn thread_pool(jobs: Option<NonZeroUsize>) -> Result<ThreadPool, String> {
    ThreadPoolBuilder::new()
        .num_threads(jobs.map_or(0, NonZeroUsize::get))
        .build()
        .map_err(|err| format!("Failed to start worker pool: {err}"))
}
