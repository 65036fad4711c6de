use std::collections::BTreeMap;
use std::fmt;

/// Configuration option keys the aggregation layer groups on.
/// These must survive parsing unchanged, a defaulted value would
/// silently move samples into the wrong aggregation group.
pub const REQUIRED_OPTIONS: [&str; 6] = [
    "BlockSize",
    "NumberOfFiles",
    "FilesystemPercent",
    "FileSize",
    "Runs",
    "WriteRatio",
];

/// Write ratio pinned to thread0 only. Optional: absence means the
/// thread0 ratio follows the global write ratio.
pub const THREAD0_OPTION: &str = "WriteRatioThread0";

/// Dynamically typed cell value, shared between result rows, option
/// maps and query results.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    /// Best-effort typed coercion: integer, then float, then the
    /// trimmed string unchanged.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            Value::Int(int)
        } else if let Ok(float) = trimmed.parse::<f64>() {
            Value::Float(float)
        } else {
            Value::Text(trimmed.to_owned())
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(int) => Some(*int),
            Value::Float(float) => Some(*float as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(int) => Some(*int as f64),
            Value::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(int) => write!(f, "{int}"),
            Value::Float(float) => write!(f, "{float}"),
            Value::Text(text) => write!(f, "{text}"),
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

impl From<f64> for Value {
    fn from(float: f64) -> Self {
        Value::Float(float)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Int(flag as i64)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

/// map of option name -> parsed option value
pub type OptionMap = BTreeMap<String, Value>;

/// One measurement row of a result file, mapped from the fixed column
/// contract of the benchmark output.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: Value,
    pub block_size: Value,
    pub random_ratio: Value,
    pub write_ratio_thread0: Value,
    pub write_ratio: Value,
    pub total: Value,
    pub thread0: Value,
}

/// Everything extracted for one result file: the configuration read
/// from the companion log plus all measurement rows, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    /// source file identifier (the result file name)
    pub name: String,
    pub options: OptionMap,
    /// true iff `WriteRatioThread0` resolves to a concrete ratio
    pub fixed_write_ratio_thread0: bool,
    pub samples: Vec<Sample>,
}

impl ParsedFile {
    /// Option lookup; absent keys read as `Null` so files whose log
    /// carried no options blob still ingest uniformly.
    pub fn option(&self, key: &str) -> Value {
        self.options.get(key).cloned().unwrap_or(Value::Null)
    }
}
