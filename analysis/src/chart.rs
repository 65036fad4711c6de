use serde::Serialize;

/// matplotlib colour names, cycled per (block size, random ratio) pair
/// in the per-file breakdown charts.
pub const SERIES_PALETTE: [&str; 8] = [
    "blue", "orange", "green", "red", "purple", "brown", "pink", "gray",
];

/// One named line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A fully assembled chart, ready to hand to the external renderer.
/// `stem` is the parameter-encoded artifact name without extension, so
/// repeated runs overwrite instead of accumulating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub stem: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
