use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Optional settings file picked up from the working directory.
pub const SETTINGS_FILE: &str = "atplot.yaml";

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("failed to read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("result glob was invalid")]
    InvalidGlob(#[from] globset::Error),
}

/// Chart artifact format, a global switch for the whole batch.
#[derive(Deserialize, Serialize, ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Pdf,
    Png,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Pdf => "pdf",
            ChartFormat::Png => "png",
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub format: ChartFormat,
    /// chart output directory, resolved against the working directory
    #[serde(default = "default_charts_dir")]
    pub charts_dir: PathBuf,
    /// plotting script the assembled charts are handed to
    #[serde(default = "default_plotter")]
    pub plotter: PathBuf,
    /// write chart data files without spawning the plotter
    #[serde(default)]
    pub data_only: bool,
    #[serde(default = "default_glob")]
    pub glob: String,
    #[serde(default = "default_plot_timeout_ms")]
    pub plot_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: ChartFormat::default(),
            charts_dir: default_charts_dir(),
            plotter: default_plotter(),
            data_only: false,
            glob: default_glob(),
            plot_timeout_ms: default_plot_timeout_ms(),
        }
    }
}

impl Settings {
    pub fn load(directory: &Path) -> Result<Self, ConfigErrors> {
        let path = directory.join(SETTINGS_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path).map_err(|source| ConfigErrors::Io {
            path: path.clone(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigErrors::Yaml { path, source })
    }

    /// Command line arguments override the settings file.
    pub fn apply_overrides(
        &mut self,
        format: Option<ChartFormat>,
        charts_dir: Option<PathBuf>,
        plotter: Option<PathBuf>,
        data_only: bool,
    ) {
        if let Some(format) = format {
            self.format = format;
        }
        if let Some(charts_dir) = charts_dir {
            self.charts_dir = charts_dir;
        }
        if let Some(plotter) = plotter {
            self.plotter = plotter;
        }
        if data_only {
            self.data_only = true;
        }
    }
}

fn default_charts_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_plotter() -> PathBuf {
    PathBuf::from("scripts/render_chart.py")
}

fn default_glob() -> String {
    "*.csv".to_owned()
}

fn default_plot_timeout_ms() -> u64 {
    30_000
}
