pub mod config;
pub mod crop;
pub mod info;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use croppipe_core::config::SessionConfig;
use croppipe_core::workspace::{ImportReport, Workspace};

/// Load `path` if given, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(SessionConfig::default()),
    }
}

/// Import every input, expanding directories recursively.
pub fn import_inputs(workspace: &mut Workspace, inputs: &[PathBuf]) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for input in inputs {
        let part = if input.is_dir() {
            workspace
                .import_folder(input)
                .with_context(|| format!("Failed to scan folder {}", input.display()))?
        } else {
            workspace.import_files([input])
        };
        report.loaded.extend(part.loaded);
        report.duplicates += part.duplicates;
        report.failures.extend(part.failures);
    }
    Ok(report)
}
