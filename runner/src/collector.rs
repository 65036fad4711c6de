use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use ignore::{DirEntry, WalkBuilder};
use itertools::Itertools;
use tracing::debug;

use crate::config::ConfigErrors;

/// Collect the result files of one batch, sorted so the ingestion
/// order (and with it every assigned file id) is deterministic.
pub fn collect_results(directory: &Path, glob: &str) -> Result<Vec<PathBuf>, ConfigErrors> {
    let matcher = GlobBuilder::new(glob).build()?.compile_matcher();
    debug!("Filtering with glob: {glob:?}");

    let mut paths = WalkBuilder::new(directory)
        .build()
        .filter_map(Result::ok)
        .map(DirEntry::into_path)
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .map(|name| matcher.is_match(name))
                .unwrap_or(false)
        })
        .collect_vec();
    paths.sort();

    Ok(paths)
}

#[cfg(test)]
mod collector_test;
