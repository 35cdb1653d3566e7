use std::io::{self, Write};

use apicanon_core::Catalog;
use clap::Args;

use crate::common::{CatalogArgs, run_command};

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

pub fn run(args: ListArgs) -> i32 {
    run_command(|| run_inner(&args, &mut io::stdout().lock()))
}

fn run_inner<W: Write>(args: &ListArgs, out: &mut W) -> Result<(), String> {
    let settings = args.catalog.settings()?;
    let catalog = Catalog::new(settings.catalog);
    let modules = catalog.list_modules().map_err(|err| err.to_string())?;

    for module in &modules {
        writeln!(out, "{module}").map_err(|err| format!("Failed to write listing: {err}"))?;
    }
    Ok(())
}
