use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use wait_timeout::ChildExt;

use atplot_analysis::chart::ChartSpec;

use crate::config::{ChartFormat, Settings};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode chart data for {0}")]
    Encode(String, #[source] serde_json::Error),
    #[error("failed to write chart data {path}")]
    WriteData {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn plotter")]
    SpawnPlotter(#[source] std::io::Error),
    #[error("failed to wait for the plotter")]
    ChildError(#[source] std::io::Error),
    #[error("plotter timed out rendering {0}")]
    Timeout(String),
    #[error("plotter failed rendering {stem}: {stderr}")]
    PlotterFailed { stem: String, stderr: String },
}

/// The chart-rendering collaborator. Drawing itself happens outside
/// this process: each chart is serialised to a JSON data file and
/// handed to a plotting script.
/// (this is deliberately not made with dynamic dispatch to avoid the headache)
#[derive(Debug)]
pub enum Renderer {
    Exec(ExecRenderer),
    /// write the data files only, e.g. for plotter-less environments
    DataOnly,
}

#[derive(Debug)]
pub struct ExecRenderer {
    plotter: PathBuf,
    format: ChartFormat,
    timeout: Duration,
}

impl Renderer {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.data_only {
            Self::DataOnly
        } else {
            Self::Exec(ExecRenderer {
                plotter: settings.plotter.clone(),
                format: settings.format,
                timeout: Duration::from_millis(settings.plot_timeout_ms),
            })
        }
    }

    /// Render one chart into `charts_dir`, returning the path of the
    /// produced artifact. Artifact names are parameter-encoded, so
    /// repeated runs overwrite instead of accumulating.
    pub fn render(&self, chart: &ChartSpec, charts_dir: &Path) -> Result<PathBuf, RenderError> {
        if !charts_dir.exists() {
            fs::create_dir_all(charts_dir).map_err(|source| RenderError::WriteData {
                path: charts_dir.to_path_buf(),
                source,
            })?;
        }

        let data_path = charts_dir.join(format!("{}.json", chart.stem));
        let data = serde_json::to_vec_pretty(chart)
            .map_err(|source| RenderError::Encode(chart.stem.clone(), source))?;
        fs::write(&data_path, data).map_err(|source| RenderError::WriteData {
            path: data_path.clone(),
            source,
        })?;

        match self {
            Self::DataOnly => {
                debug!(stem = %chart.stem, "wrote chart data, skipping plotter");
                Ok(data_path)
            }
            Self::Exec(renderer) => renderer.plot(chart, &data_path, charts_dir),
        }
    }
}

impl ExecRenderer {
    fn plot(
        &self,
        chart: &ChartSpec,
        data_path: &Path,
        charts_dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        let artifact = charts_dir.join(format!("{}.{}", chart.stem, self.format.extension()));

        let mut handle = Command::new("python3")
            .arg(&self.plotter)
            .arg("--data")
            .arg(data_path)
            .arg("--out")
            .arg(&artifact)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(RenderError::SpawnPlotter)?;

        debug!(stem = %chart.stem, pid = handle.id(), "waiting on plotter");
        let status = match handle.wait_timeout(self.timeout).map_err(RenderError::ChildError)? {
            Some(status) => status,
            None => {
                handle.kill().map_err(RenderError::ChildError)?;
                handle.wait().map_err(RenderError::ChildError)?;

                return Err(RenderError::Timeout(chart.stem.clone()));
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = handle.stderr.take() {
                pipe.read_to_string(&mut stderr).unwrap_or(0);
            }

            return Err(RenderError::PlotterFailed {
                stem: chart.stem.clone(),
                stderr,
            });
        }

        info!(artifact = %artifact.display(), "rendered chart");

        Ok(artifact)
    }
}
