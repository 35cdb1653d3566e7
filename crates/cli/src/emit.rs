use std::fs;
use std::io::{self, BufWriter};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use apicanon_core::{Catalog, MODULE_SUFFIX, emit};
use clap::Args;
use rayon::prelude::*;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};

use crate::common::{CatalogArgs, run_command, select_modules, thread_pool};

#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Directory to write canonical documents into [default: out]
    #[arg(long = "out", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Only emit this module (repeatable)
    #[arg(long = "module", short = 'm', value_name = "NAME")]
    pub modules: Vec<String>,

    /// Number of worker threads [default: one per CPU]
    #[arg(long, short = 'j')]
    pub jobs: Option<NonZeroUsize>,

    /// Keep emitting the remaining modules after a failure
    #[arg(long)]
    pub keep_going: bool,
}

pub fn run(args: EmitArgs) -> i32 {
    run_command(|| run_inner(args))
}

fn run_inner(args: EmitArgs) -> Result<(), String> {
    let settings = args.catalog.settings()?;
    let out_dir = args.out_dir.unwrap_or(settings.output.dir);
    let catalog = Catalog::new(settings.catalog);
    let modules = select_modules(&catalog, &args.modules)?;

    fs::create_dir_all(&out_dir).map_err(|err| {
        format!(
            "Failed to create output directory {}: {err}",
            out_dir.display()
        )
    })?;

    let pool = thread_pool(args.jobs)?;
    debug!(
        modules = modules.len(),
        threads = pool.current_num_threads(),
        out_dir = %out_dir.display(),
        "Emitting modules."
    );

    if args.keep_going {
        let failures: Vec<String> = pool.install(|| {
            modules
                .par_iter()
                .filter_map(|module| emit_module(&catalog, module, &out_dir).err())
                .collect()
        });
        for failure in &failures {
            eprintln!("{failure}");
        }
        if !failures.is_empty() {
            return Err(format!(
                "{} of {} modules failed",
                failures.len(),
                modules.len()
            ));
        }
    } else {
        pool.install(|| {
            modules
                .par_iter()
                .try_for_each(|module| emit_module(&catalog, module, &out_dir).map(drop))
        })?;
    }

    info!(count = modules.len(), out_dir = %out_dir.display(), "Emitted modules.");
    println!(
        "Emitted {} modules into {}",
        modules.len(),
        out_dir.display()
    );
    Ok(())
}

/// Emit one module into `out_dir`, replacing any previous document.
///
/// The document is staged in a temporary file next to its target and only
/// renamed into place once it is complete.
fn emit_module(catalog: &Catalog, module: &str, out_dir: &Path) -> Result<PathBuf, String> {
    let api = catalog.load_module(module).map_err(|err| err.to_string())?;
    let target = out_dir.join(format!("{module}{MODULE_SUFFIX}"));

    let staged = staging_file(out_dir).map_err(|err| {
        format!(
            "Failed to create temporary file in {}: {err}",
            out_dir.display()
        )
    })?;
    let mut writer = BufWriter::new(staged);
    emit(&mut writer, &api).map_err(|err| format!("module '{module}': {err}"))?;
    let staged = writer
        .into_inner()
        .map_err(|err| format!("module '{module}': failed to write output: {}", err.error()))?;

    staged
        .persist(&target)
        .map_err(|err| format!("Failed to write {}: {}", target.display(), err.error))?;

    debug!(module, path = %target.display(), "Wrote canonical document.");
    Ok(target)
}

/// A temporary file in `dir` that persists with the mode `fs::write` would give.
fn staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // 0o666 minus the umask, as for any newly created file
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
