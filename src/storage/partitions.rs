use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::error::{Context, Result};
use crate::records::{TradeRow, PARTITION_HEADER};

/// On-disk layout of harvested trades: `<root>/<symbol>/<YYYY-MM-DD>.csv`.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    root: PathBuf,
}

impl PartitionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(symbol)
    }

    pub fn partition_path(&self, symbol: &str, day: &str) -> PathBuf {
        self.symbol_dir(symbol).join(format!("{day}.csv"))
    }

    /// Create the symbol's directory (and any missing parents).
    pub fn ensure_symbol_dir(&self, symbol: &str) -> Result<PathBuf> {
        let dir = self.symbol_dir(symbol);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Append one day's rows for `symbol`, returning the partition path written.
    pub fn append(&self, symbol: &str, day: &str, rows: &[TradeRow<'_>]) -> Result<PathBuf> {
        let path = self.partition_path(symbol, day);
        append_rows(&path, rows)?;
        Ok(path)
    }
}

/// Append `rows` to the CSV at `path`, writing the header only when the file is new.
///
/// "New" is decided by an existence check right before opening. Each partition
/// has a single writer, so nothing can slip in between the check and the open.
/// The file is closed before returning, whether or not the write succeeded.
pub fn append_rows(path: &Path, rows: &[TradeRow<'_>]) -> Result<()> {
    let is_new = !path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open partition {}", path.display()))?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if is_new {
        writer.write_record(PARTITION_HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush partition {}", path.display()))?;

    Ok(())
}
