use std::path::Path;

use tracing::{debug, warn};

use atplot_ingest::record::Value;

use crate::chart::{ChartSpec, Series, SERIES_PALETTE};
use crate::database::{FileInfo, Store};
use crate::query::{Column, Query, Table};
use crate::StoreError;

/// Randomness ratios the cross-file comparison is bounded to. Samples
/// with any other ratio contribute to no comparison chart.
pub const CANONICAL_RANDOM_RATIOS: [f64; 3] = [0.0, 0.5, 1.0];

/// One experiment configuration, i.e. one pair of comparison charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub block_size: Value,
    pub filesystem_percent: Value,
    pub random_ratio: Value,
}

impl Configuration {
    fn random_percent(&self) -> i64 {
        (self.random_ratio.as_f64().unwrap_or(0.0) * 100.0).round() as i64
    }
}

/// Distinct (BlockSize, FilesystemPercent, RandomRatio) tuples present
/// in the sample table, restricted to the canonical random ratios.
pub fn enumerate_configurations(store: &Store) -> Result<Vec<Configuration>, StoreError> {
    let rows = store.run(
        &Query::over(Table::Data)
            .column(Column::BlockSize)
            .column(Column::FilesystemPercent)
            .column(Column::RandomRatio)
            .group_by(Column::BlockSize)
            .group_by(Column::FilesystemPercent)
            .group_by(Column::RandomRatio)
            .order_by(Column::BlockSize)
            .order_by(Column::FilesystemPercent)
            .order_by(Column::RandomRatio),
    )?;

    let mut configurations = Vec::new();
    for row in rows {
        let [block_size, filesystem_percent, random_ratio]: [Value; 3] = match row.try_into() {
            Ok(columns) => columns,
            Err(_) => continue,
        };
        match random_ratio.as_f64() {
            Some(ratio) if CANONICAL_RANDOM_RATIOS.contains(&ratio) => {
                configurations.push(Configuration {
                    block_size,
                    filesystem_percent,
                    random_ratio,
                });
            }
            _ => {
                debug!(ratio = %random_ratio, "skipping non-canonical random ratio");
            }
        }
    }

    Ok(configurations)
}

fn comparison_filters(query: Query, configuration: &Configuration) -> Query {
    query
        .filter(Column::BlockSize, configuration.block_size.clone())
        .filter(Column::FilesystemPercent, configuration.filesystem_percent.clone())
        .filter(Column::RandomRatio, configuration.random_ratio.clone())
        // pinned-thread0 experiments are covered by the per-file
        // breakdown, never mixed into the cross-file comparison
        .filter(Column::FixedWriteRatioThread0, false)
        // telemetry runs sweep time, not the write ratio
        .filter(Column::Runs, 1i64)
}

/// Build the "totals" and "thread0" comparison charts for one
/// configuration: one series per parallelism level, x = write ratio,
/// y = mean throughput.
pub fn comparison_charts(
    store: &Store,
    configuration: &Configuration,
) -> Result<(ChartSpec, ChartSpec), StoreError> {
    let levels = store.run(&comparison_filters(
        Query::over(Table::Data)
            .column(Column::NumberOfFiles)
            .group_by(Column::NumberOfFiles)
            .order_by(Column::NumberOfFiles),
        configuration,
    ))?;

    let mut totals_series = Vec::new();
    let mut thread0_series = Vec::new();
    for level in levels.into_iter().flatten() {
        let rows = store.run(&comparison_filters(
            Query::over(Table::Data)
                .column(Column::WriteRatio)
                .mean(Column::Total)
                .mean(Column::Thread0)
                .filter(Column::NumberOfFiles, level.clone())
                .group_by(Column::WriteRatio)
                .order_by(Column::WriteRatio),
            configuration,
        ))?;

        let mut x = Vec::new();
        let mut totals = Vec::new();
        let mut thread0 = Vec::new();
        for row in rows {
            match (row[0].as_f64(), row[1].as_f64(), row[2].as_f64()) {
                (Some(ratio), Some(total), Some(t0)) => {
                    x.push(ratio);
                    totals.push(total);
                    thread0.push(t0);
                }
                _ => warn!(row = ?row, "skipping non-numeric aggregate row"),
            }
        }

        totals_series.push(Series {
            label: level.to_string(),
            color: None,
            x: x.clone(),
            y: totals,
        });
        thread0_series.push(Series {
            label: level.to_string(),
            color: None,
            x,
            y: thread0,
        });
    }

    let block_size = &configuration.block_size;
    let filesystem_percent = &configuration.filesystem_percent;
    let random_percent = configuration.random_percent();
    let stem = format!("aggregated-bs{block_size}fsp{filesystem_percent}rnd{random_percent}");

    let totals = ChartSpec {
        stem: format!("{stem}-totals"),
        title: format!("total: bs={block_size}, fs%={filesystem_percent}, rnd={random_percent}%"),
        x_label: "writes/reads".to_owned(),
        y_label: "MiB/s".to_owned(),
        series: totals_series,
    };
    let thread0 = ChartSpec {
        stem: format!("{stem}-thread0"),
        title: format!("thread0: bs={block_size}, fs%={filesystem_percent}, rnd={random_percent}%"),
        x_label: "writes/reads".to_owned(),
        y_label: "MiB/s (thread0)".to_owned(),
        series: thread0_series,
    };

    Ok((totals, thread0))
}

/// Per-file breakdown charts, one per ingested file. Steady-state runs
/// sweep the write ratio; telemetry runs (Runs > 1) plot raw throughput
/// over elapsed time.
pub fn file_charts(store: &Store) -> Result<Vec<ChartSpec>, StoreError> {
    let mut charts = Vec::new();
    for file in store.files()? {
        let chart = if file.runs > 1 {
            telemetry_chart(store, &file)?
        } else {
            breakdown_chart(store, &file)?
        };
        charts.push(chart);
    }

    Ok(charts)
}

fn file_title(file: &FileInfo) -> String {
    let mut title = format!(
        "bs={}, fs%={}, threads={}",
        file.block_size, file.filesystem_percent, file.number_of_files
    );
    if file.fixed_write_ratio_thread0 {
        title.push_str(&format!(", thread0 w/r={}", file.write_ratio_thread0));
    }
    title
}

fn file_stem(file: &FileInfo) -> String {
    Path::new(&file.name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.name.clone())
}

fn breakdown_chart(store: &Store, file: &FileInfo) -> Result<ChartSpec, StoreError> {
    let block_sizes = store.run(
        &Query::over(Table::Data)
            .column(Column::BlockSize)
            .filter(Column::FileId, file.id)
            .group_by(Column::BlockSize)
            .order_by(Column::BlockSize),
    )?;

    let mut series = Vec::new();
    let mut pair = 0usize;
    for block_size in block_sizes.into_iter().flatten() {
        for ratio in CANONICAL_RANDOM_RATIOS {
            let rows = store.run(
                &Query::over(Table::Data)
                    .column(Column::WriteRatio)
                    .mean(Column::Total)
                    .mean(Column::Thread0)
                    .filter(Column::FileId, file.id)
                    .filter(Column::BlockSize, block_size.clone())
                    .filter(Column::RandomRatio, ratio)
                    .group_by(Column::WriteRatio)
                    .order_by(Column::WriteRatio),
            )?;
            if rows.is_empty() {
                continue;
            }

            let mut x = Vec::new();
            let mut totals = Vec::new();
            let mut thread0 = Vec::new();
            for row in rows {
                match (row[0].as_f64(), row[1].as_f64(), row[2].as_f64()) {
                    (Some(write_ratio), Some(total), Some(t0)) => {
                        x.push(write_ratio);
                        totals.push(total);
                        thread0.push(t0);
                    }
                    _ => warn!(row = ?row, "skipping non-numeric aggregate row"),
                }
            }

            let random_percent = (ratio * 100.0).round() as i64;
            let color = SERIES_PALETTE[pair % SERIES_PALETTE.len()];
            series.push(Series {
                label: format!("total bs={block_size} rnd={random_percent}%"),
                color: Some(color),
                x: x.clone(),
                y: totals,
            });
            let color = SERIES_PALETTE[(pair + 1) % SERIES_PALETTE.len()];
            series.push(Series {
                label: format!("thread0 bs={block_size} rnd={random_percent}%"),
                color: Some(color),
                x,
                y: thread0,
            });
            pair += 2;
        }
    }

    Ok(ChartSpec {
        stem: file_stem(file),
        title: file_title(file),
        x_label: "writes/reads".to_owned(),
        y_label: "MiB/s".to_owned(),
        series,
    })
}

fn telemetry_chart(store: &Store, file: &FileInfo) -> Result<ChartSpec, StoreError> {
    let rows = store.run(
        &Query::over(Table::Data)
            .column(Column::Time)
            .column(Column::Total)
            .column(Column::Thread0)
            .filter(Column::FileId, file.id)
            .order_by(Column::SampleIndex),
    )?;

    let mut x = Vec::new();
    let mut totals = Vec::new();
    let mut thread0 = Vec::new();
    for row in rows {
        match (row[0].as_f64(), row[1].as_f64(), row[2].as_f64()) {
            (Some(time), Some(total), Some(t0)) => {
                x.push(time);
                totals.push(total);
                thread0.push(t0);
            }
            _ => warn!(row = ?row, "skipping non-numeric telemetry row"),
        }
    }

    let mut title = file_title(file);
    title.push_str(&format!(", writes/reads={}", file.write_ratio));

    Ok(ChartSpec {
        stem: file_stem(file),
        title,
        x_label: "time(s)".to_owned(),
        y_label: "MiB/s".to_owned(),
        series: vec![
            Series {
                label: "total".to_owned(),
                color: Some("blue"),
                x: x.clone(),
                y: totals,
            },
            Series {
                label: "thread0".to_owned(),
                color: Some("orange"),
                x,
                y: thread0,
            },
        ],
    })
}

#[cfg(test)]
mod compare_test;
