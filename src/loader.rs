//! Loader
//!
//! Reads delimited text into a [`Dataset`]. Each column is typed the way a dataframe reader
//! would: numeric when every non-missing cell parses as a float, categorical otherwise.
use crate::data::{Column, ColumnValues, Dataset};
use crate::errors::DriftError;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Cell contents treated as missing.
const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

/// CSV reader configuration.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
    has_headers: bool,
    null_markers: Vec<String>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        CsvLoader {
            delimiter: b',',
            has_headers: true,
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first record holds column names. Without headers, columns are
    /// named `column_0`, `column_1`, ...
    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Replace the set of cell values treated as missing.
    pub fn null_markers(mut self, markers: Vec<String>) -> Self {
        self.null_markers = markers;
        self
    }

    /// Load a dataset from a file.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, DriftError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DriftError::UnableToRead(format!("{}: {}", path.display(), e)))?;
        self.load_reader(BufReader::new(file))
    }

    /// Load a dataset from an in-memory string.
    pub fn load_str(&self, input: &str) -> Result<Dataset, DriftError> {
        self.load_reader(input.as_bytes())
    }

    /// Load a dataset from any reader.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Dataset, DriftError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(false)
            .from_reader(reader);

        let mut names: Vec<String> = if self.has_headers {
            csv_reader
                .headers()
                .map_err(|e| DriftError::UnableToRead(e.to_string()))?
                .iter()
                .map(|h| h.trim_start_matches('\u{feff}').to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for result in csv_reader.records() {
            let record = result.map_err(|e| DriftError::UnableToRead(e.to_string()))?;
            if names.is_empty() {
                names = (0..record.len()).map(|i| format!("column_{}", i)).collect();
                raw = vec![Vec::new(); names.len()];
            }
            for (col, cell) in raw.iter_mut().zip(record.iter()) {
                col.push(if self.is_null(cell) { None } else { Some(cell.to_string()) });
            }
        }

        let columns: Vec<Column> = names
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| Column::new(name, infer_values(cells)))
            .collect();
        debug!(
            "Loaded {} columns with {} rows.",
            columns.len(),
            columns.first().map(|c| c.len()).unwrap_or(0)
        );
        Dataset::new(columns)
    }

    fn is_null(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.null_markers.iter().any(|m| m == cell)
    }
}

/// Numeric if every present cell parses as a float, categorical otherwise.
/// A column with no present cells is numeric.
fn infer_values(cells: Vec<Option<String>>) -> ColumnValues {
    let parsed: Option<Vec<f64>> = cells
        .iter()
        .map(|c| match c {
            None => Some(f64::NAN),
            Some(s) => s.trim().parse::<f64>().ok(),
        })
        .collect();
    match parsed {
        Some(values) => ColumnValues::Numeric(values),
        None => ColumnValues::Categorical(cells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ColumnType;
    use std::io::Write;
    use tempfile::tempdir;

    const JOBS: &str = "experience,education,job_title,salary\n\
                        1,HS,Analyst,40000\n\
                        5,BA,Engineer,85000\n\
                        ,MS,Engineer,\n\
                        10,NA,Manager,120000.5\n";

    #[test]
    fn test_load_str_infers_types() {
        let ds = CsvLoader::new().load_str(JOBS).unwrap();
        assert_eq!(ds.n_rows(), 4);
        assert_eq!(
            ds.schema(),
            vec![
                ("experience", ColumnType::Continuous),
                ("education", ColumnType::Categorical),
                ("job_title", ColumnType::Categorical),
                ("salary", ColumnType::Continuous),
            ]
        );
        let experience = ds.column("experience").unwrap();
        assert_eq!(experience.values.present_count(), 3);
        let education = ds.column("education").unwrap();
        assert_eq!(education.values.present_labels().unwrap(), vec!["HS", "BA", "MS"]);
    }

    #[test]
    fn test_load_without_headers() {
        let ds = CsvLoader::new()
            .has_headers(false)
            .delimiter(b';')
            .load_str("1;a\n2;b\n")
            .unwrap();
        assert_eq!(ds.column_names(), vec!["column_0", "column_1"]);
        assert_eq!(ds.column("column_0").unwrap().column_type(), ColumnType::Continuous);
        assert_eq!(ds.column("column_1").unwrap().column_type(), ColumnType::Categorical);
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let ds = CsvLoader::new().load_str("a,b\n,x\nNA,y\n").unwrap();
        assert_eq!(ds.column("a").unwrap().column_type(), ColumnType::Continuous);
        assert_eq!(ds.column("a").unwrap().values.present_count(), 0);
    }

    #[test]
    fn test_custom_null_markers() {
        let ds = CsvLoader::new()
            .null_markers(vec!["?".to_string()])
            .load_str("a\n1\n?\n")
            .unwrap();
        assert_eq!(ds.column("a").unwrap().values.present_count(), 1);
    }

    #[test]
    fn test_ragged_rows_fail() {
        let res = CsvLoader::new().load_str("a,b\n1,2\n3\n");
        assert!(matches!(res, Err(DriftError::UnableToRead(_))));
    }

    #[test]
    fn test_load_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("live.csv");
        let mut f = File::create(&path).unwrap();
        f.write_all(JOBS.as_bytes()).unwrap();
        let ds = CsvLoader::new().load_path(&path).unwrap();
        assert_eq!(ds.n_columns(), 4);

        let missing = CsvLoader::new().load_path(dir.path().join("absent.csv"));
        assert!(matches!(missing, Err(DriftError::UnableToRead(_))));
    }
}
