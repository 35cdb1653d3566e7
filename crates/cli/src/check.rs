use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use apicanon_core::{Catalog, MODULE_SUFFIX, emit_to_vec};
use clap::Args;
use console::style;
use rayon::prelude::*;
use similar::{ChangeTag, TextDiff};
use tracing::debug;

use crate::common::{CatalogArgs, run_command, select_modules, thread_pool};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Directory of expected documents [default: the catalog's own api directory]
    #[arg(long, value_name = "DIR")]
    pub reference: Option<PathBuf>,

    /// Only check this module (repeatable)
    #[arg(long = "module", short = 'm', value_name = "NAME")]
    pub modules: Vec<String>,

    /// Number of worker threads [default: one per CPU]
    #[arg(long, short = 'j')]
    pub jobs: Option<NonZeroUsize>,
}

pub fn run(args: CheckArgs) -> i32 {
    run_command(|| run_inner(args, &mut io::stdout().lock()))
}

/// How one module compares with its reference document.
#[derive(Debug)]
enum Outcome {
    Same,
    Missing,
    Differs { expected: Vec<u8>, actual: Vec<u8> },
}

fn run_inner<W: Write>(args: CheckArgs, out: &mut W) -> Result<(), String> {
    let settings = args.catalog.settings()?;
    let catalog = Catalog::new(settings.catalog);
    let reference = args
        .reference
        .unwrap_or_else(|| catalog.config().api_dir());
    let modules = select_modules(&catalog, &args.modules)?;

    let pool = thread_pool(args.jobs)?;
    debug!(
        modules = modules.len(),
        reference = %reference.display(),
        "Checking modules."
    );

    let outcomes: Vec<Outcome> = pool.install(|| {
        modules
            .par_iter()
            .map(|module| check_module(&catalog, module, &reference))
            .collect::<Result<_, String>>()
    })?;

    let mut mismatched = 0_usize;
    for (module, outcome) in modules.iter().zip(&outcomes) {
        let report = match outcome {
            Outcome::Same => continue,
            Outcome::Missing => format!(
                "{} {module}: no reference document\n",
                style("missing").yellow().bold()
            ),
            Outcome::Differs { expected, actual } => {
                let file = format!("{module}{MODULE_SUFFIX}");
                render_diff(&file, expected, actual)
            }
        };
        mismatched += 1;
        out.write_all(report.as_bytes())
            .map_err(|err| format!("Failed to write report: {err}"))?;
    }

    if mismatched > 0 {
        return Err(format!(
            "{mismatched} of {} modules do not match {}",
            modules.len(),
            reference.display()
        ));
    }

    writeln!(out, "{} modules match {}", modules.len(), reference.display())
        .map_err(|err| format!("Failed to write report: {err}"))?;
    Ok(())
}

fn check_module(catalog: &Catalog, module: &str, reference: &Path) -> Result<Outcome, String> {
    let api = catalog.load_module(module).map_err(|err| err.to_string())?;
    let actual = emit_to_vec(&api).map_err(|err| format!("module '{module}': {err}"))?;

    let path = reference.join(format!("{module}{MODULE_SUFFIX}"));
    let expected = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Outcome::Missing),
        Err(err) => return Err(format!("Failed to read {}: {err}", path.display())),
    };

    let outcome = if expected == actual {
        Outcome::Same
    } else {
        Outcome::Differs { expected, actual }
    };
    debug!(module, same = matches!(outcome, Outcome::Same), "Checked module.");
    Ok(outcome)
}

/// Unified diff of the reference (`-`) against the canonical form (`+`).
///
/// Line terminators are not printed. A changed line that does not end in
/// CRLF gets a `[no CRLF]` suffix, so endings-only changes stay visible.
fn render_diff(file: &str, expected: &[u8], actual: &[u8]) -> String {
    let expected = String::from_utf8_lossy(expected);
    let actual = String::from_utf8_lossy(actual);
    let diff = TextDiff::from_lines(expected.as_ref(), actual.as_ref());

    let mut output = String::new();
    let _ = writeln!(output, "{}", style(format!("--- {file} (reference)")).bold());
    let _ = writeln!(output, "{}", style(format!("+++ {file} (canonical)")).bold());

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let value = change.value();
                let line = value.trim_end_matches(['\r', '\n']);
                let marker = if change.tag() == ChangeTag::Equal || value.ends_with("\r\n") {
                    ""
                } else {
                    " [no CRLF]"
                };
                let text = match change.tag() {
                    ChangeTag::Delete => style(format!("-{line}{marker}")).red(),
                    ChangeTag::Insert => style(format!("+{line}{marker}")).green(),
                    ChangeTag::Equal => style(format!(" {line}")),
                };
                let _ = writeln!(output, "{text}");
            }
        }
    }

    output
}
