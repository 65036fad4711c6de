use atplot_ingest::record::Value;

use super::{Column, Query, Table};

#[test]
pub fn renders_grouped_aggregate_query() {
    let (sql, params) = Query::over(Table::Data)
        .column(Column::WriteRatio)
        .mean(Column::Total)
        .mean(Column::Thread0)
        .filter(Column::BlockSize, 512i64)
        .filter(Column::RandomRatio, 0.5)
        .group_by(Column::WriteRatio)
        .order_by(Column::WriteRatio)
        .render();

    assert_eq!(
        sql,
        "SELECT write_ratio, avg(total), avg(thread0) FROM data \
         WHERE block_size = ? AND random_ratio = ? \
         GROUP BY write_ratio ORDER BY write_ratio, min(rowid)"
    );
    assert_eq!(params, vec![Value::Int(512), Value::Float(0.5)]);
}

#[test]
pub fn renders_insertion_order_tie_break_without_grouping() {
    let (sql, params) = Query::over(Table::Files).column(Column::Id).render();

    assert_eq!(sql, "SELECT id FROM files ORDER BY rowid");
    assert!(params.is_empty());
}

#[test]
pub fn null_filter_renders_is_null_without_binding() {
    let (sql, params) = Query::over(Table::Files)
        .column(Column::Name)
        .filter(Column::WriteRatioThread0, Value::Null)
        .filter(Column::Runs, 1i64)
        .render();

    assert_eq!(
        sql,
        "SELECT name FROM files WHERE write_ratio_thread0 IS NULL AND runs = ? ORDER BY rowid"
    );
    assert_eq!(params, vec![Value::Int(1)]);
}
