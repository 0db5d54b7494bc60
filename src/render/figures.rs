//! Static figure export: one SVG file per view plus a JSON summary.

use super::ChartArtifact;
use crate::data::ViewSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the JSON file holding every view result
pub const SUMMARY_FILE: &str = "views.json";

/// Write each artifact as `<NN>-<slug>.svg` and the view results as JSON.
///
/// Creates `dir` if needed and returns the written paths, summary last.
pub fn write_figures(dir: &Path, artifacts: &[ChartArtifact], views: &ViewSet) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(artifacts.len() + 1);
    for artifact in artifacts {
        let path = dir.join(artifact.figure_name());
        fs::write(&path, &artifact.svg)?;
        tracing::debug!("Wrote figure {}", path.display());
        written.push(path);
    }

    let summary_path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(&views.reports).map_err(io::Error::other)?;
    fs::write(&summary_path, json)?;
    written.push(summary_path);

    tracing::info!("Wrote {} figures to {}", artifacts.len(), dir.display());
    Ok(written)
}
