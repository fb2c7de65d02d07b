use std::fs;
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::domain::{ColumnDef, DomainError, FormatSettings, Row, RowCollection};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid file format - {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub struct FileRepository;

impl FileRepository {
    /// Writes the rows as a pretty-printed JSON array. Returns the path
    /// written, for status messages.
    pub fn save_rows(rows: &RowCollection, path: impl AsRef<Path>) -> PersistenceResult<String> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(rows)?;
        fs::write(path, json)?;
        info!("saved {} rows to {}", rows.len(), path.display());
        Ok(path.display().to_string())
    }

    pub fn load_rows(path: impl AsRef<Path>) -> PersistenceResult<(RowCollection, String)> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let rows: Vec<Row> = serde_json::from_str(&content)?;
        let rows = RowCollection::new(rows).inspect_err(|e| {
            warn!("rejected {}: {}", path.display(), e);
        })?;
        info!("loaded {} rows from {}", rows.len(), path.display());
        Ok((rows, path.display().to_string()))
    }
}

pub struct CsvExporter;

impl CsvExporter {
    /// Writes the grid as it is displayed: a header of column names, then
    /// one record per row with every cell passed through its formatter.
    pub fn export_rows(
        rows: &RowCollection,
        columns: &[ColumnDef],
        settings: &FormatSettings,
        path: impl AsRef<Path>,
    ) -> PersistenceResult<String> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(columns.iter().map(|column| column.name))?;
        for row in rows {
            writer.write_record(
                columns
                    .iter()
                    .map(|column| settings.format_cell(column.format, row, column.key)),
            )?;
        }
        writer.flush()?;

        info!("exported {} rows to {}", rows.len(), path.display());
        Ok(path.display().to_string())
    }
}
