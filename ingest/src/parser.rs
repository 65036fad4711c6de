use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::record::{OptionMap, ParsedFile, Sample, Value, REQUIRED_OPTIONS, THREAD0_OPTION};
use crate::IngestError;

/// Fixed column contract of the result files, no header row.
/// Rows carry one extra trailing column per additional worker thread.
pub const COL_TIME: usize = 0;
pub const COL_BLOCK_SIZE: usize = 1;
pub const COL_RANDOM_RATIO: usize = 2;
pub const COL_WRITE_RATIO_THREAD0: usize = 3;
pub const COL_WRITE_RATIO: usize = 4;
pub const COL_TOTAL: usize = 5;
pub const COL_THREAD0: usize = 6;
pub const SAMPLE_COLUMNS: usize = 7;

/// Marker line the benchmark writes once its option validation is done.
static OPTIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Options Processed: (\{[^}]*\})").unwrap());

/// Parse one result file plus its metadata companion (same base name,
/// `.log` extension).
pub fn parse_result_file(result_path: &Path) -> Result<ParsedFile, IngestError> {
    if !result_path.is_file() {
        return Err(IngestError::FileNotFound(result_path.to_path_buf()));
    }
    let log_path = result_path.with_extension("log");
    if !log_path.is_file() {
        return Err(IngestError::FileNotFound(log_path));
    }

    let name = result_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let samples = parse_samples(result_path)?;
    let (options, fixed_write_ratio_thread0) = parse_options(&log_path)?;

    debug!(
        file = %name,
        samples = samples.len(),
        options = options.len(),
        fixed_write_ratio_thread0,
        "parsed result file"
    );

    Ok(ParsedFile {
        name,
        options,
        fixed_write_ratio_thread0,
        samples,
    })
}

fn parse_samples(path: &Path) -> Result<Vec<Sample>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Tabular {
            path: path.to_path_buf(),
            source,
        })?;

    let mut samples = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|source| IngestError::Tabular {
            path: path.to_path_buf(),
            source,
        })?;
        if record.len() < SAMPLE_COLUMNS {
            return Err(IngestError::ColumnCount {
                path: path.to_path_buf(),
                row,
                found: record.len(),
                expected: SAMPLE_COLUMNS,
            });
        }

        let cell = |col: usize| Value::coerce(&record[col]);
        samples.push(Sample {
            time: cell(COL_TIME),
            block_size: cell(COL_BLOCK_SIZE),
            random_ratio: cell(COL_RANDOM_RATIO),
            write_ratio_thread0: cell(COL_WRITE_RATIO_THREAD0),
            write_ratio: cell(COL_WRITE_RATIO),
            total: cell(COL_TOTAL),
            thread0: cell(COL_THREAD0),
        });
    }

    Ok(samples)
}

fn parse_options(path: &Path) -> Result<(OptionMap, bool), IngestError> {
    let log = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let blob = match OPTIONS_RE.captures(&log) {
        Some(captures) => captures[1].to_owned(),
        None => {
            // The log never reached option processing; the file still
            // ingests, but with an empty configuration.
            warn!(path = %path.display(), "no options blob found in companion log");
            return Ok((OptionMap::new(), false));
        }
    };

    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&blob).map_err(|source| IngestError::MalformedOptions {
            path: path.to_path_buf(),
            source,
        })?;

    let mut options = OptionMap::new();
    for (key, value) in object {
        let value = scalar_of(&key, &value, path)?;
        options.insert(key, value);
    }

    for key in REQUIRED_OPTIONS {
        if !options.contains_key(key) {
            return Err(IngestError::MissingOption {
                key,
                path: path.to_path_buf(),
            });
        }
    }

    let fixed = match options.get(THREAD0_OPTION) {
        None | Some(Value::Null) => false,
        Some(value) if value.as_f64() == Some(-1.0) => {
            // Legacy producers emitted -1 where newer ones omit the
            // option entirely. Flag it instead of guessing.
            warn!(
                path = %path.display(),
                "{THREAD0_OPTION} uses the legacy -1 sentinel, treating as variable ratio"
            );
            false
        }
        Some(_) => true,
    };

    Ok((options, fixed))
}

/// Collapse an options blob entry into a single cell value. Swept
/// dimensions may arrive as JSON arrays: one element is that scalar, a
/// multi-element sweep maps to the -1 "varies over the run" sentinel.
fn scalar_of(key: &str, value: &serde_json::Value, path: &Path) -> Result<Value, IngestError> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(flag) => Ok(Value::Int(*flag as i64)),
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(Value::Int(int))
            } else {
                Ok(Value::Float(number.as_f64().unwrap_or(f64::NAN)))
            }
        }
        serde_json::Value::String(text) => Ok(Value::Text(text.trim().to_owned())),
        serde_json::Value::Array(items) => match items.len() {
            0 => Ok(Value::Null),
            1 => scalar_of(key, &items[0], path),
            len => {
                debug!(key, len, "collapsing swept option to the varies sentinel");
                Ok(Value::Int(-1))
            }
        },
        serde_json::Value::Object(_) => Err(IngestError::UnsupportedOption {
            key: key.to_owned(),
            path: path.to_path_buf(),
        }),
    }
}
