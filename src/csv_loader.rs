use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    error::ConfigError,
    schema::{CsvRows, TRIGGER_COLUMN},
};

/// The directory channel csv resources are resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceBundle {
    root: PathBuf,
}

impl ResourceBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `name` → `<root>/<name>.csv`
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.csv"))
    }

    /// Read and parse the csv resource `name`.
    pub fn load(&self, name: &str) -> Result<CsvRows, ConfigError> {
        let path = self.resolve(name);
        let file = File::open(&path).map_err(|e| ConfigError::ResourceUnreadable {
            resource: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let rows = parse_rows(file, name);
        debug!(resource = %path.display(), triggers = rows.len(), "loaded csv resource");
        Ok(rows)
    }
}

impl Default for ResourceBundle {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Parse a headed csv into trigger → column → cell.
///
/// The `trigger` column is taken out of each row and empty cells are left
/// out, so a trigger only carries the columns it fills in. A csv without a
/// `trigger` column, or a row with an empty trigger cell, is logged and the
/// row is still registered under the empty trigger.
pub fn parse_rows<R: Read>(reader: R, resource: &str) -> CsvRows {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = match rdr.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            error!("csv file: {resource} could not be parsed: {e}");
            return CsvRows::new();
        }
    };
    if !headers.iter().any(|h| h == TRIGGER_COLUMN) {
        error!("csv file: {resource} needs to have trigger column");
    }

    let mut rows = CsvRows::new();
    for record in rdr.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                error!("csv file: {resource} has an unreadable row: {e}");
                continue;
            }
        };

        let mut trigger = String::new();
        let mut row = IndexMap::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header == TRIGGER_COLUMN {
                trigger = cell.to_string();
            } else if !cell.is_empty() {
                row.insert(header.to_string(), cell.to_string());
            }
        }

        if trigger.is_empty() {
            error!("csv file: {resource} has missing trigger column entry for a row");
        }
        rows.insert(trigger, row);
    }
    rows
}
