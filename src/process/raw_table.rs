use std::path::PathBuf;

/// A CSV source as read from disk, before any typing.
#[derive(Debug)]
pub struct RawTable {
    /// File the rows came from, kept for error messages.
    pub source: PathBuf,
    /// Header cells, trimmed.
    pub headers: Vec<String>,
    /// Each data record, as a Vec of Strings (one per field).
    pub rows: Vec<Vec<String>>,
    /// 1-based source line of each row, parallel to `rows`.
    pub lines: Vec<u64>,
}

impl RawTable {
    /// Rows that sit on consecutive lines directly under the header.
    pub fn new(source: impl Into<PathBuf>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let lines = (2..).take(rows.len()).collect();
        Self {
            source: source.into(),
            headers,
            rows,
            lines,
        }
    }

    /// Source line of row `idx`.
    pub fn line(&self, idx: usize) -> u64 {
        self.lines.get(idx).copied().unwrap_or(idx as u64 + 2)
    }
}
