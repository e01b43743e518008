//! Provenance sidecars for generated rasters.
//!
//! Every difference raster gets a `<stem>_meta.txt` file next to it that
//! records how it was produced.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::errors::{CompareError, Result};

#[derive(Debug, Clone, Default)]
pub struct Provenance {
    /// Program name and arguments as invoked.
    pub command_line: Vec<String>,
    pub description: String,
    /// Source rasters the output was derived from.
    pub inputs: Vec<PathBuf>,
    pub notes: Option<String>,
}

/// `<dir>/<stem>_meta.txt` for an output raster at `raster`.
pub fn sidecar_path(raster: &Path) -> PathBuf {
    let mut name = raster.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    name.push("_meta.txt");
    raster.with_file_name(name)
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(char::is_whitespace) && !arg.contains('"') {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\\\""))
    }
}

impl Provenance {
    pub fn render(&self, raster: &Path) -> String {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let command = self
            .command_line
            .iter()
            .map(|a| quote(a))
            .collect::<Vec<_>>()
            .join(" ");
        let inputs: String = self
            .inputs
            .iter()
            .map(|input| format!("Input: {}\n", input.display()))
            .collect();
        let notes = self
            .notes
            .as_ref()
            .map(|notes| format!("Notes: {notes}\n"))
            .unwrap_or_default();

        format!(
            "File: {}\nDescription: {}\nCreated: {}\n{inputs}Working directory: {cwd}\nCommand: {command}\n{notes}",
            raster.display(),
            self.description,
            Local::now().format("%Y-%m-%d %H:%M:%S %z"),
        )
    }

    /// Writes the sidecar for `raster` and returns its path.
    pub fn write_sidecar(&self, raster: &Path) -> Result<PathBuf> {
        let path = sidecar_path(raster);
        std::fs::write(&path, self.render(raster)).map_err(|e| CompareError::io(&path, e))?;
        debug!(path = %path.display(), "Wrote metadata sidecar");
        Ok(path)
    }
}
