use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use croppipe_core::workspace::Workspace;

use crate::summary::{print_failures, print_workspace_summary};

#[derive(Args)]
pub struct InfoArgs {
    /// Image files or folders to import
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Session config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let mut workspace = Workspace::new(&config.import);
    let report = super::import_inputs(&mut workspace, &args.inputs)?;

    print_workspace_summary(&workspace, report.duplicates);
    print_failures(&report.failures);

    if workspace.is_empty() {
        bail!("No images could be loaded");
    }
    Ok(())
}
