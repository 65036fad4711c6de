use std::collections::BTreeMap;

use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection};
use tracing::{debug, info};

use atplot_ingest::record::{ParsedFile, Sample, Value};

use crate::query::Query;
use crate::StoreError;

pub const SQL_SCHEMA: [&str; 2] = [
    "create table if not exists files (
    id integer primary key,
    name text not null,
    block_size numeric,
    number_of_files numeric,
    filesystem_percent numeric,
    file_size numeric,
    runs numeric,
    write_ratio numeric,
    write_ratio_thread0 numeric,
    fixed_write_ratio_thread0 integer not null
);",
    "create table if not exists data (
    file_id integer not null references files (id),
    sample_index integer not null,
    time numeric,
    block_size numeric,
    random_ratio numeric,
    write_ratio_thread0 numeric,
    write_ratio numeric,
    number_of_files numeric,
    filesystem_percent numeric,
    file_size numeric,
    runs numeric,
    fixed_write_ratio_thread0 integer not null,
    total numeric,
    thread0 numeric,
    primary key (file_id, sample_index)
);",
];
pub const SQL_SCHEMA_NUMBER: usize = SQL_SCHEMA.len();

/// Configuration snapshot kept per ingested file so sample inserts can
/// duplicate it without touching the files table again.
#[derive(Debug, Clone)]
struct FileContext {
    number_of_files: Value,
    filesystem_percent: Value,
    file_size: Value,
    runs: Value,
    fixed_write_ratio_thread0: bool,
    samples: i64,
}

/// One row of the files table, as used by the comparison layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub id: i64,
    pub name: String,
    pub runs: i64,
    pub block_size: Value,
    pub number_of_files: Value,
    pub filesystem_percent: Value,
    pub write_ratio: Value,
    pub write_ratio_thread0: Value,
    pub fixed_write_ratio_thread0: bool,
}

/// In-memory relational store over one batch of benchmark results.
/// Built once per run, append-only, queried after ingestion completes.
#[derive(Debug)]
pub struct Store {
    connection: Connection,
    files: BTreeMap<i64, FileContext>,
    next_file_id: i64,
}

impl Store {
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;

        let mut counter = 1;
        for table in SQL_SCHEMA {
            connection.execute(table, [])?;
            debug!("Applied SQL schema ({counter}/{SQL_SCHEMA_NUMBER})");
            counter += 1;
        }

        Ok(Self {
            connection,
            files: BTreeMap::new(),
            next_file_id: 0,
        })
    }

    /// Store one file record. Ids are sequential, monotonic and never
    /// reused; the configuration is immutable after this point.
    pub fn insert_file(&mut self, file: &ParsedFile) -> Result<i64, StoreError> {
        let id = self.next_file_id;

        self.connection
            .prepare_cached(
                "insert into files
                 (id, name, block_size, number_of_files, filesystem_percent,
                  file_size, runs, write_ratio, write_ratio_thread0,
                  fixed_write_ratio_thread0)
                 values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?
            .execute(params![
                id,
                file.name,
                bind_value(&file.option("BlockSize")),
                bind_value(&file.option("NumberOfFiles")),
                bind_value(&file.option("FilesystemPercent")),
                bind_value(&file.option("FileSize")),
                bind_value(&file.option("Runs")),
                bind_value(&file.option("WriteRatio")),
                bind_value(&file.option("WriteRatioThread0")),
                file.fixed_write_ratio_thread0,
            ])?;

        self.next_file_id += 1;
        self.files.insert(
            id,
            FileContext {
                number_of_files: file.option("NumberOfFiles"),
                filesystem_percent: file.option("FilesystemPercent"),
                file_size: file.option("FileSize"),
                runs: file.option("Runs"),
                fixed_write_ratio_thread0: file.fixed_write_ratio_thread0,
                samples: 0,
            },
        );

        debug!(id, name = %file.name, "inserted file record");

        Ok(id)
    }

    /// Append one sample for an already inserted file. The per-file
    /// sample index is 0-based insertion order. The file configuration
    /// is duplicated onto the row so sample queries need no join.
    pub fn insert_sample(&mut self, file_id: i64, sample: &Sample) -> Result<i64, StoreError> {
        let context = self
            .files
            .get_mut(&file_id)
            .ok_or(StoreError::UnknownFile(file_id))?;
        let sample_index = context.samples;

        self.connection
            .prepare_cached(
                "insert into data
                 (file_id, sample_index, time, block_size, random_ratio,
                  write_ratio_thread0, write_ratio, number_of_files,
                  filesystem_percent, file_size, runs,
                  fixed_write_ratio_thread0, total, thread0)
                 values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?
            .execute(params![
                file_id,
                sample_index,
                bind_value(&sample.time),
                bind_value(&sample.block_size),
                bind_value(&sample.random_ratio),
                bind_value(&sample.write_ratio_thread0),
                bind_value(&sample.write_ratio),
                bind_value(&context.number_of_files),
                bind_value(&context.filesystem_percent),
                bind_value(&context.file_size),
                bind_value(&context.runs),
                context.fixed_write_ratio_thread0,
                bind_value(&sample.total),
                bind_value(&sample.thread0),
            ])?;

        context.samples += 1;

        Ok(sample_index)
    }

    /// Insert a parsed file and all of its samples.
    pub fn ingest(&mut self, file: &ParsedFile) -> Result<i64, StoreError> {
        let id = self.insert_file(file)?;
        for sample in &file.samples {
            self.insert_sample(id, sample)?;
        }

        info!(id, name = %file.name, samples = file.samples.len(), "ingested result file");

        Ok(id)
    }

    pub fn count_samples(&self, file_id: i64) -> Result<i64, StoreError> {
        self.files
            .get(&file_id)
            .map(|context| context.samples)
            .ok_or(StoreError::UnknownFile(file_id))
    }

    /// Run a declarative query, returning rows of typed values in the
    /// projected column order.
    pub fn run(&self, query: &Query) -> Result<Vec<Vec<Value>>, StoreError> {
        let (sql, params) = query.render();
        let columns = query.column_count();
        debug!(sql = %sql, params = ?params, "running query");

        let mut statement = self.connection.prepare_cached(&sql)?;
        let rows = statement
            .query_map(params_from_iter(params.iter().map(bind_value)), |row| {
                (0..columns)
                    .map(|index| row.get_ref(index).map(read_value))
                    .collect::<Result<Vec<Value>, rusqlite::Error>>()
            })?
            .collect::<Result<Vec<Vec<Value>>, rusqlite::Error>>()?;

        Ok(rows)
    }

    /// All file records in insertion order.
    pub fn files(&self) -> Result<Vec<FileInfo>, StoreError> {
        let mut statement = self.connection.prepare_cached(
            "select id, name, runs, block_size, number_of_files,
                    filesystem_percent, write_ratio, write_ratio_thread0,
                    fixed_write_ratio_thread0
             from files order by id",
        )?;
        let files = statement
            .query_map([], |row| {
                Ok(FileInfo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    runs: read_value(row.get_ref(2)?).as_i64().unwrap_or(1),
                    block_size: read_value(row.get_ref(3)?),
                    number_of_files: read_value(row.get_ref(4)?),
                    filesystem_percent: read_value(row.get_ref(5)?),
                    write_ratio: read_value(row.get_ref(6)?),
                    write_ratio_thread0: read_value(row.get_ref(7)?),
                    fixed_write_ratio_thread0: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<FileInfo>, rusqlite::Error>>()?;

        Ok(files)
    }
}

fn bind_value(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Int(int) => rusqlite::types::Value::Integer(*int),
        Value::Float(float) => rusqlite::types::Value::Real(*float),
        Value::Text(text) => rusqlite::types::Value::Text(text.clone()),
        Value::Null => rusqlite::types::Value::Null,
    }
}

fn read_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Integer(int) => Value::Int(int),
        ValueRef::Real(float) => Value::Float(float),
        ValueRef::Text(text) | ValueRef::Blob(text) => {
            Value::Text(String::from_utf8_lossy(text).into_owned())
        }
        ValueRef::Null => Value::Null,
    }
}
