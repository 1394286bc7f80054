//! Entity directory: registry code to display name.
//!
//! The directory is built once at startup and never mutated afterwards, so
//! it can be shared across tasks behind an `Arc` without locking.
//!
//! Entries come from a CSV table with `code` and `name` columns. A snapshot
//! of the registry is compiled into the binary; deployments can point at a
//! newer file instead.

use crate::models::EntityCode;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Registry snapshot shipped with the binary.
const BUILTIN_TABLE: &str = include_str!("../../data/entities.csv");

/// Immutable lookup from entity code to region name.
#[derive(Debug, Clone, Default)]
pub struct EntityDirectory {
    names: HashMap<EntityCode, String>,
}

impl EntityDirectory {
    /// Builds a directory from explicit entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a code appears twice.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (EntityCode, S)>,
        S: Into<String>,
    {
        let mut names = HashMap::new();
        for (code, name) in entries {
            if names.insert(code, name.into()).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate entity code {code} in directory"
                )));
            }
        }
        Ok(Self { names })
    }

    /// Loads the compiled-in registry snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded table is corrupt.
    pub fn builtin() -> Result<Self> {
        Self::from_csv_reader(BUILTIN_TABLE.as_bytes())
    }

    /// Loads a directory from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or contains invalid rows.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_directory_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let directory = Self::from_csv_reader(std::io::BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            entries = directory.len(),
            "Loaded entity directory"
        );

        Ok(directory)
    }

    /// Parses a CSV table with `code` and `name` headers.
    ///
    /// Header names are matched case-insensitively and columns may appear in
    /// any order. Blank rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing column, an unparseable
    /// code, an empty name or a duplicate code.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::OperationFailed {
                operation: "read_directory_headers".to_string(),
                cause: e.to_string(),
            })?
            .clone();
        let (code_idx, name_idx) = column_indices(&headers)?;

        let mut entries = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| Error::OperationFailed {
                operation: "read_directory".to_string(),
                cause: e.to_string(),
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            // Header is line 1.
            let line = row + 2;
            let code = record
                .get(code_idx)
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    Error::InvalidInput(format!("directory line {line}: invalid entity code"))
                })?;
            let name = record
                .get(name_idx)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    Error::InvalidInput(format!("directory line {line}: missing name"))
                })?;

            entries.push((EntityCode::new(code), name.to_string()));
        }

        Self::from_entries(entries)
    }

    /// Resolves a code to its display name.
    ///
    /// Unknown codes are expected: the feed may reference entities added to
    /// the registry after this table was taken.
    #[must_use]
    pub fn resolve(&self, code: EntityCode) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    /// Returns true if the code has an entry.
    #[must_use]
    pub fn contains(&self, code: EntityCode) -> bool {
        self.names.contains_key(&code)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the directory has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn column_indices(headers: &csv::StringRecord) -> Result<(usize, usize)> {
    let mut code = None;
    let mut name = None;
    for (i, header) in headers.iter().enumerate() {
        match header.to_lowercase().as_str() {
            "code" | "entity" | "dxcc" => code = Some(i),
            "name" | "country" | "region" => name = Some(i),
            _ => {},
        }
    }

    match (code, name) {
        (Some(code), Some(name)) => Ok((code, name)),
        _ => Err(Error::InvalidInput(
            "directory CSV must have 'code' and 'name' columns".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_loads() {
        let directory = EntityDirectory::builtin().unwrap();

        assert_eq!(directory.len(), 340);
        assert_eq!(directory.resolve(EntityCode::new(223)), Some("England"));
        assert_eq!(directory.resolve(EntityCode::new(279)), Some("Scotland"));
        assert_eq!(directory.resolve(EntityCode::new(294)), Some("Wales"));
        assert_eq!(directory.resolve(EntityCode::new(265)), Some("Northern Ireland"));
        assert_eq!(directory.resolve(EntityCode::new(245)), Some("Ireland"));
        assert_eq!(directory.resolve(EntityCode::new(114)), Some("Isle of Man"));
    }

    #[test]
    fn test_builtin_names_with_punctuation() {
        let directory = EntityDirectory::builtin().unwrap();
        assert_eq!(directory.resolve(EntityCode::new(94)), Some("Antigua & Barbuda"));
    }

    #[test]
    fn test_unknown_code_is_none() {
        let directory = EntityDirectory::builtin().unwrap();

        assert_eq!(directory.resolve(EntityCode::new(9999)), None);
        assert!(!directory.contains(EntityCode::new(-1)));
    }

    #[test]
    fn test_columns_in_any_order() {
        let csv = "Name,Code\nHome,1\nForeign,99\n";
        let directory = EntityDirectory::from_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(directory.resolve(EntityCode::new(99)), Some("Foreign"));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = "code,label\n1,Home\n";
        assert!(EntityDirectory::from_csv_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_invalid_code_reports_line() {
        let csv = "code,name\n1,Home\nabc,Nowhere\n";
        let err = EntityDirectory::from_csv_reader(csv.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let csv = "code,name\n1,Home\n1,Other\n";
        let err = EntityDirectory::from_csv_reader(csv.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "code,name").unwrap();
        writeln!(file, "1,Home").unwrap();
        writeln!(file, "99,\"Foreign, Far\"").unwrap();

        let directory = EntityDirectory::load_from_file(file.path()).unwrap();

        assert_eq!(directory.resolve(EntityCode::new(99)), Some("Foreign, Far"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EntityDirectory::load_from_file(Path::new("/nonexistent/entities.csv"));
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }
}
