// src/process/mod.rs
pub mod convert;
pub mod raw_table;
pub mod utils;

use csv::ReaderBuilder;
use glob::glob;
use rayon::prelude::*;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::schema::{build_arrow_schema, TableSchema};

pub use convert::convert_to_batch;
pub use raw_table::RawTable;

/// Read a whole CSV source into memory.
///
/// Records may be shorter than the header (missing trailing cells); anything
/// else the CSV reader rejects is a load error for this file.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_raw_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let mut rdr = open_reader(path)?;

    let headers = read_header_row(&mut rdr, path)?;

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            PipelineError::load(path, format!("CSV parse error at record {}: {}", idx, e))
        })?;
        // skip fully blank lines
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        lines.push(record.position().map_or(idx as u64 + 2, |p| p.line()));
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    debug!(rows = rows.len(), columns = headers.len(), "read CSV");

    Ok(RawTable {
        source: path.to_path_buf(),
        headers,
        rows,
        lines,
    })
}

/// Read only the header row of a CSV source.
pub fn read_headers<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut rdr = open_reader(path)?;
    read_header_row(&mut rdr, path)
}

fn open_reader(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| PipelineError::load(path, e))?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file)))
}

fn read_header_row(rdr: &mut csv::Reader<BufReader<File>>, path: &Path) -> Result<Vec<String>> {
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| PipelineError::load(path, format!("reading header: {}", e)))?
        .iter()
        .map(|h| utils::clean_str(h.trim_start_matches('\u{feff}')))
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(PipelineError::load(path, "file has no header row"));
    }
    Ok(headers)
}

/// Expand configured source entries into concrete file paths.
///
/// Entries containing glob metacharacters expand to their matches in lexical
/// order and must match at least one file. Plain entries pass through as-is,
/// so a missing file surfaces as a load error when it is opened.
pub fn expand_sources<S: AsRef<str>>(entries: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.as_ref();
        if !entry.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(entry));
            continue;
        }

        let matches = glob(entry).map_err(|e| PipelineError::load(entry, e))?;
        let mut found: Vec<PathBuf> = Vec::new();
        for m in matches {
            found.push(m.map_err(|e| PipelineError::load(entry, e))?);
        }
        if found.is_empty() {
            return Err(PipelineError::load(entry, "pattern matched no files"));
        }
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}

/// Load and concatenate `paths` into one table under `schema`.
///
/// Files are parsed in parallel and stitched together in the order given, so
/// the result matches a sequential load. Every row survives: no
/// deduplication. Zero paths give an empty table.
#[tracing::instrument(level = "info", skip(paths, schema), fields(table = %schema.name, files = paths.len()))]
pub fn load_table(paths: &[PathBuf], schema: &TableSchema) -> Result<Dataset> {
    schema.validate()?;
    let start = Instant::now();

    let batches = paths
        .par_iter()
        .map(|path| {
            let raw = read_raw_table(path)?;
            convert_to_batch(&raw, schema)
        })
        .collect::<Result<Vec<_>>>()?;

    let arrow_schema = build_arrow_schema(schema);
    let batch = arrow::compute::concat_batches(&arrow_schema, &batches)?;
    info!(
        rows = batch.num_rows(),
        elapsed = ?start.elapsed(),
        "loaded `{}`",
        schema.name
    );

    Dataset::new(schema.clone(), batch)
}
