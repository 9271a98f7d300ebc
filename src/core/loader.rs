use crate::adapters::LocalStorage;
use crate::domain::model::Record;
use crate::domain::ports::Storage;
use crate::utils::error::{AppError, Result};
use crate::utils::helpers::chunk_list;
use crate::utils::validation::{validate_file_extensions, validate_positive_number};
use serde_json::Value;
use std::collections::HashMap;

pub const RECORD_EXTENSIONS: [&str; 3] = ["csv", "tsv", "json"];

/// Reads datasets (CSV/TSV, JSON, plain text) through a [`Storage`] backend.
///
/// A missing file is logged and treated as empty; malformed content is an error.
pub struct DataLoader<S: Storage> {
    storage: S,
}

impl DataLoader<LocalStorage> {
    pub fn local(base_dir: &str) -> Self {
        Self::new(LocalStorage::new(base_dir))
    }
}

impl<S: Storage> DataLoader<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    async fn read_if_exists(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        match self.storage.read_file(filename).await {
            Ok(data) => Ok(Some(data)),
            Err(AppError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!("File not found: {}", filename);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Rows keyed by header; every value is a string. Short rows get nulls for missing columns.
    pub async fn load_csv(&self, filename: &str, delimiter: u8) -> Result<Vec<Record>> {
        let Some(bytes) = self.read_if_exists(filename).await? else {
            return Ok(Vec::new());
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row?;
            let data: HashMap<String, Value> = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = row
                        .get(i)
                        .map(|v| Value::String(v.to_string()))
                        .unwrap_or(Value::Null);
                    (header.to_string(), value)
                })
                .collect();
            rows.push(Record { data });
        }

        tracing::info!("Loaded {} rows from {}", rows.len(), filename);
        Ok(rows)
    }

    /// `Ok(None)` when the file does not exist.
    pub async fn load_json(&self, filename: &str) -> Result<Option<Value>> {
        let Some(bytes) = self.read_if_exists(filename).await? else {
            return Ok(None);
        };

        let data: Value = serde_json::from_slice(&bytes).inspect_err(|e| {
            tracing::error!("Failed to load JSON {}: {}", filename, e);
        })?;
        tracing::info!("Loaded JSON from {}", filename);
        Ok(Some(data))
    }

    /// Trimmed, non-empty lines.
    pub async fn load_text_lines(&self, filename: &str) -> Result<Vec<String>> {
        let Some(bytes) = self.read_if_exists(filename).await? else {
            return Ok(Vec::new());
        };

        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        tracing::info!("Loaded {} lines from {}", lines.len(), filename);
        Ok(lines)
    }

    pub async fn load_in_batches(&self, filename: &str, batch_size: usize) -> Result<Vec<Vec<Record>>> {
        validate_positive_number("batch_size", batch_size, 1)?;
        let rows = self.load_csv(filename, b',').await?;
        Ok(chunk_list(&rows, batch_size))
    }

    /// Picks the reader from the extension: `.csv`, `.tsv`, or `.json` holding an object or
    /// an array of objects.
    pub async fn load_records(&self, filename: &str) -> Result<Vec<Record>> {
        validate_file_extensions("data", &[filename.to_string()], &RECORD_EXTENSIONS)?;

        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => self.load_csv(filename, b',').await,
            "tsv" => self.load_csv(filename, b'\t').await,
            _ => match self.load_json(filename).await? {
                None => Ok(Vec::new()),
                Some(Value::Object(obj)) => Ok(vec![Record::from(obj)]),
                Some(Value::Array(items)) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(obj) => Ok(Record::from(obj)),
                        other => Err(AppError::validation(format!(
                            "{} must contain JSON objects, found: {}",
                            filename, other
                        ))),
                    })
                    .collect(),
                Some(other) => Err(AppError::validation(format!(
                    "{} must contain a JSON object or array, found: {}",
                    filename, other
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn loader_with(files: &[(&str, &str)]) -> (TempDir, DataLoader<LocalStorage>) {
        let temp_dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(temp_dir.path().join(name), content).unwrap();
        }
        let loader = DataLoader::new(LocalStorage::new(temp_dir.path()));
        (temp_dir, loader)
    }

    #[tokio::test]
    async fn test_load_csv_with_short_rows() {
        let (_dir, loader) = loader_with(&[("rows.csv", "name,price\nalice,12.5\nbob\n")]);
        let rows = loader.load_csv("rows.csv", b',').await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_str("price"), Some("12.5"));
        assert_eq!(rows[1].get("price"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let (_dir, loader) = loader_with(&[]);
        assert!(loader.load_csv("nope.csv", b',').await.unwrap().is_empty());
        assert!(loader.load_json("nope.json").await.unwrap().is_none());
        assert!(loader.load_text_lines("nope.txt").await.unwrap().is_empty());
        assert!(loader.load_records("nope.json").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let (_dir, loader) = loader_with(&[("bad.json", "{not json")]);
        assert!(matches!(
            loader.load_json("bad.json").await,
            Err(AppError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_text_lines_are_trimmed() {
        let (_dir, loader) = loader_with(&[("notes.txt", "  one \n\n two\n   \nthree")]);
        let lines = loader.load_text_lines("notes.txt").await.unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_batches() {
        let (_dir, loader) = loader_with(&[("rows.csv", "id\n1\n2\n3\n4\n5\n")]);
        let batches = loader.load_in_batches("rows.csv", 2).await.unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 1);
        assert!(loader.load_in_batches("rows.csv", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_load_records_dispatch() {
        let (_dir, loader) = loader_with(&[
            ("rows.tsv", "name\tcategory\nalice\tfood\n"),
            ("rows.json", r#"[{"name": "bob"}, {"name": "carol"}]"#),
            ("one.json", r#"{"name": "dave"}"#),
            ("scalars.json", "[1, 2]"),
        ]);

        let tsv = loader.load_records("rows.tsv").await.unwrap();
        assert_eq!(tsv[0].get_str("category"), Some("food"));

        let json = loader.load_records("rows.json").await.unwrap();
        assert_eq!(json.len(), 2);

        let one = loader.load_records("one.json").await.unwrap();
        assert_eq!(one[0].get_str("name"), Some("dave"));

        assert!(loader.load_records("scalars.json").await.is_err());
        assert!(loader.load_records("rows.xml").await.is_err());
    }
}
