use atplot_ingest::record::Value;

/// Tables of the aggregation store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    Files,
    Data,
}

impl Table {
    pub fn sql_name(self) -> &'static str {
        match self {
            Table::Files => "files",
            Table::Data => "data",
        }
    }
}

/// Typed column names. Queries are built from these instead of raw
/// strings so values are always bound, never formatted into SQL text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    // files only
    Id,
    Name,
    // data only
    FileId,
    SampleIndex,
    Time,
    RandomRatio,
    Total,
    Thread0,
    // configuration, present on files and duplicated per sample
    BlockSize,
    NumberOfFiles,
    FilesystemPercent,
    FileSize,
    Runs,
    WriteRatio,
    WriteRatioThread0,
    FixedWriteRatioThread0,
}

impl Column {
    pub fn sql_name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::FileId => "file_id",
            Column::SampleIndex => "sample_index",
            Column::Time => "time",
            Column::RandomRatio => "random_ratio",
            Column::Total => "total",
            Column::Thread0 => "thread0",
            Column::BlockSize => "block_size",
            Column::NumberOfFiles => "number_of_files",
            Column::FilesystemPercent => "filesystem_percent",
            Column::FileSize => "file_size",
            Column::Runs => "runs",
            Column::WriteRatio => "write_ratio",
            Column::WriteRatioThread0 => "write_ratio_thread0",
            Column::FixedWriteRatioThread0 => "fixed_write_ratio_thread0",
        }
    }
}

/// Projected expression: a plain column or its arithmetic mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Column(Column),
    Mean(Column),
}

/// Declarative query over one store table: exact-match filters combined
/// with AND, optional grouping (aggregates follow SQL GROUP BY + AVG
/// semantics) and optional ordering. Insertion order is always appended
/// as the final ordering term so repeated runs stay deterministic.
#[derive(Clone, Debug)]
pub struct Query {
    table: Table,
    select: Vec<Projection>,
    filters: Vec<(Column, Value)>,
    group_by: Vec<Column>,
    order_by: Vec<Column>,
}

impl Query {
    pub fn over(table: Table) -> Self {
        Self {
            table,
            select: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.select.push(Projection::Column(column));
        self
    }

    pub fn mean(mut self, column: Column) -> Self {
        self.select.push(Projection::Mean(column));
        self
    }

    pub fn filter(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn group_by(mut self, column: Column) -> Self {
        self.group_by.push(column);
        self
    }

    pub fn order_by(mut self, column: Column) -> Self {
        self.order_by.push(column);
        self
    }

    pub fn column_count(&self) -> usize {
        self.select.len()
    }

    /// Render to parameterised SQL plus the values to bind, in
    /// placeholder order.
    pub(crate) fn render(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT ");
        let projected: Vec<String> = self
            .select
            .iter()
            .map(|projection| match projection {
                Projection::Column(column) => column.sql_name().to_owned(),
                Projection::Mean(column) => format!("avg({})", column.sql_name()),
            })
            .collect();
        sql.push_str(&projected.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(self.table.sql_name());

        let mut params = Vec::new();
        for (position, (column, value)) in self.filters.iter().enumerate() {
            sql.push_str(if position == 0 { " WHERE " } else { " AND " });
            sql.push_str(column.sql_name());
            if value.is_null() {
                sql.push_str(" IS NULL");
            } else {
                sql.push_str(" = ?");
                params.push(value.clone());
            }
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            let grouped: Vec<&str> = self.group_by.iter().map(|c| c.sql_name()).collect();
            sql.push_str(&grouped.join(", "));
        }

        sql.push_str(" ORDER BY ");
        for column in &self.order_by {
            sql.push_str(column.sql_name());
            sql.push_str(", ");
        }
        // tie-break on insertion order
        if self.group_by.is_empty() {
            sql.push_str("rowid");
        } else {
            sql.push_str("min(rowid)");
        }

        (sql, params)
    }
}

#[cfg(test)]
mod query_test;
