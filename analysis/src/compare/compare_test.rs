use atplot_ingest::record::{OptionMap, ParsedFile, Sample, Value};

use super::{comparison_charts, enumerate_configurations, file_charts};
use crate::database::Store;

fn sample(random_ratio: f64, wr: f64, total: f64, thread0: f64) -> Sample {
    Sample {
        time: Value::Float(7.0),
        block_size: Value::Int(512),
        random_ratio: Value::Float(random_ratio),
        write_ratio_thread0: Value::Float(wr),
        write_ratio: Value::Float(wr),
        total: Value::Float(total),
        thread0: Value::Float(thread0),
    }
}

fn options(number_of_files: i64, runs: i64) -> OptionMap {
    let mut options = OptionMap::new();
    options.insert("BlockSize".to_owned(), Value::Int(512));
    options.insert("NumberOfFiles".to_owned(), Value::Int(number_of_files));
    options.insert("FilesystemPercent".to_owned(), Value::Int(50));
    options.insert("FileSize".to_owned(), Value::Int(100));
    options.insert("Runs".to_owned(), Value::Int(runs));
    options.insert("WriteRatio".to_owned(), Value::Int(-1));
    options
}

fn sweep_file(name: &str, number_of_files: i64, scale: f64) -> ParsedFile {
    ParsedFile {
        name: name.to_owned(),
        options: options(number_of_files, 1),
        fixed_write_ratio_thread0: false,
        samples: vec![
            sample(0.5, 0.0, 100.0 * scale, 25.0 * scale),
            sample(0.5, 0.5, 80.0 * scale, 20.0 * scale),
            sample(0.5, 1.0, 60.0 * scale, 15.0 * scale),
        ],
    }
}

fn populated_store() -> Store {
    let mut store = Store::open_in_memory().unwrap();
    store.ingest(&sweep_file("threads1.csv", 1, 1.0)).unwrap();
    store.ingest(&sweep_file("threads4.csv", 4, 2.0)).unwrap();
    store
}

#[test]
pub fn enumerates_distinct_canonical_configurations() {
    let mut store = populated_store();

    // non-canonical random ratio contributes to no comparison chart
    let mut odd = sweep_file("odd.csv", 2, 1.0);
    for sample in &mut odd.samples {
        sample.random_ratio = Value::Float(0.25);
    }
    store.ingest(&odd).unwrap();

    let configurations = enumerate_configurations(&store).unwrap();
    assert_eq!(configurations.len(), 1);
    assert_eq!(configurations[0].block_size, Value::Int(512));
    assert_eq!(configurations[0].filesystem_percent, Value::Int(50));
    assert_eq!(configurations[0].random_ratio.as_f64(), Some(0.5));
}

#[test]
pub fn comparison_charts_carry_one_series_per_parallelism_level() {
    let store = populated_store();
    let configurations = enumerate_configurations(&store).unwrap();
    let (totals, thread0) = comparison_charts(&store, &configurations[0]).unwrap();

    assert_eq!(totals.stem, "aggregated-bs512fsp50rnd50-totals");
    assert_eq!(totals.title, "total: bs=512, fs%=50, rnd=50%");
    assert_eq!(totals.x_label, "writes/reads");
    assert_eq!(totals.y_label, "MiB/s");
    assert_eq!(thread0.stem, "aggregated-bs512fsp50rnd50-thread0");
    assert_eq!(thread0.y_label, "MiB/s (thread0)");

    assert_eq!(totals.series.len(), 2);
    assert_eq!(totals.series[0].label, "1");
    assert_eq!(totals.series[1].label, "4");
    assert_eq!(totals.series[0].x, vec![0.0, 0.5, 1.0]);
    assert_eq!(totals.series[0].y, vec![100.0, 80.0, 60.0]);
    assert_eq!(totals.series[1].y, vec![200.0, 160.0, 120.0]);
    assert_eq!(thread0.series[1].y, vec![50.0, 40.0, 30.0]);
}

#[test]
pub fn pinned_thread0_experiments_stay_out_of_comparisons() {
    let mut store = populated_store();

    let mut pinned = sweep_file("pinned.csv", 8, 5.0);
    pinned.fixed_write_ratio_thread0 = true;
    pinned
        .options
        .insert("WriteRatioThread0".to_owned(), Value::Float(0.5));
    store.ingest(&pinned).unwrap();

    let configurations = enumerate_configurations(&store).unwrap();
    let (totals, _) = comparison_charts(&store, &configurations[0]).unwrap();

    let labels: Vec<&str> = totals.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["1", "4"]);
}

#[test]
pub fn telemetry_runs_stay_out_of_comparisons_but_get_a_time_chart() {
    let mut store = populated_store();

    let telemetry = ParsedFile {
        name: "telemetry.csv".to_owned(),
        options: options(2, 5),
        fixed_write_ratio_thread0: false,
        samples: vec![
            Sample {
                time: Value::Float(7.0),
                ..sample(0.5, 0.5, 100.0, 25.0)
            },
            Sample {
                time: Value::Float(14.1),
                ..sample(0.5, 0.5, 90.0, 23.0)
            },
        ],
    };
    store.ingest(&telemetry).unwrap();

    let configurations = enumerate_configurations(&store).unwrap();
    let (totals, _) = comparison_charts(&store, &configurations[0]).unwrap();
    let labels: Vec<&str> = totals.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["1", "4"]);

    let charts = file_charts(&store).unwrap();
    let chart = charts.iter().find(|c| c.stem == "telemetry").unwrap();
    assert_eq!(chart.x_label, "time(s)");
    assert_eq!(chart.title, "bs=512, fs%=50, threads=2, writes/reads=-1");
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.series[0].label, "total");
    assert_eq!(chart.series[0].x, vec![7.0, 14.1]);
    assert_eq!(chart.series[1].y, vec![25.0, 23.0]);
}

#[test]
pub fn file_breakdown_groups_by_block_size_and_random_ratio() {
    let mut store = Store::open_in_memory().unwrap();
    let mut file = sweep_file("mixed.csv", 4, 1.0);
    // a second randomness ratio for the same block size
    file.samples.push(sample(1.0, 0.0, 50.0, 12.0));
    file.samples.push(sample(1.0, 1.0, 30.0, 8.0));
    // a non-canonical ratio never reaches a chart
    file.samples.push(sample(0.25, 0.5, 999.0, 999.0));
    store.ingest(&file).unwrap();

    let charts = file_charts(&store).unwrap();
    assert_eq!(charts.len(), 1);
    let chart = &charts[0];
    assert_eq!(chart.stem, "mixed");
    assert_eq!(chart.title, "bs=512, fs%=50, threads=4");
    assert_eq!(chart.x_label, "writes/reads");

    let labels: Vec<&str> = chart.series.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "total bs=512 rnd=50%",
            "thread0 bs=512 rnd=50%",
            "total bs=512 rnd=100%",
            "thread0 bs=512 rnd=100%",
        ]
    );
    assert!(chart.series.iter().all(|s| s.color.is_some()));
    assert_eq!(chart.series[2].x, vec![0.0, 1.0]);
    assert_eq!(chart.series[2].y, vec![50.0, 30.0]);
}

#[test]
pub fn empty_store_produces_no_configurations_or_charts() {
    let store = Store::open_in_memory().unwrap();
    assert!(enumerate_configurations(&store).unwrap().is_empty());
    assert!(file_charts(&store).unwrap().is_empty());
}
