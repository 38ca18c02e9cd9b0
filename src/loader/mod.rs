//! Matrix loaders.
//!
//! Each input flavor (positional JSON, headerless CSV, label-keyed JSON) implements
//! [`MatrixLoader`]; the CLI picks one from `--input-format` and the file extension.
//! Loaders only parse: symmetrization is left to the heatmap pipeline.

mod csv_file;
mod json_file;
mod labeled;

pub use self::csv_file::CsvLoader;
pub use self::json_file::JsonLoader;
pub use self::labeled::LabeledJsonLoader;

use crate::error::MatrixError;
use crate::model::{LatencyMatrix, PlotKind};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// A parsed matrix plus the row/column labels when the format carries them.
#[derive(Debug, Clone)]
pub struct LoadedMatrix {
    pub matrix: LatencyMatrix,
    pub labels: Option<Vec<String>>,
}

pub trait MatrixLoader {
    fn load(&self, reader: &mut dyn Read) -> Result<LoadedMatrix, MatrixError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Pick from the file extension and plot kind
    #[default]
    Auto,
    /// Array of rows, or pandas-style object of columns
    Json,
    /// Headerless comma-separated rows
    Csv,
    /// Mapping of mappings keyed by label
    Labeled,
}

impl InputFormat {
    /// Resolve `Auto` to a concrete format.
    pub fn resolve(self, path: &Path, kind: PlotKind) -> InputFormat {
        if self != InputFormat::Auto {
            return self;
        }
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        match (is_csv, kind) {
            (true, _) => InputFormat::Csv,
            (false, PlotKind::Mesh) => InputFormat::Labeled,
            (false, PlotKind::Heatmap) => InputFormat::Json,
        }
    }
}

/// Loader for a concrete format. `Auto` is treated as JSON.
pub fn loader_for(format: InputFormat) -> Box<dyn MatrixLoader> {
    match format {
        InputFormat::Csv => Box::new(CsvLoader),
        InputFormat::Labeled => Box::new(LabeledJsonLoader),
        InputFormat::Json | InputFormat::Auto => Box::new(JsonLoader),
    }
}

/// Open `path` and parse it with the loader for `format`.
pub fn load_path(path: &Path, format: InputFormat) -> Result<LoadedMatrix, MatrixError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let loaded = loader_for(format).load(&mut reader)?;
    tracing::info!(
        path = %path.display(),
        ?format,
        cores = loaded.matrix.size(),
        "loaded latency matrix"
    );
    Ok(loaded)
}

/// Interpret one JSON cell: numbers as-is, `null` as a missing measurement.
pub(crate) fn json_cell(
    value: &serde_json::Value,
    line: usize,
    column: usize,
) -> Result<f64, MatrixError> {
    match value {
        serde_json::Value::Null => Ok(f64::NAN),
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| MatrixError::Parse {
            line,
            column,
            value: n.to_string(),
        }),
        other => Err(MatrixError::Parse {
            line,
            column,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn auto_format_follows_extension_and_kind() {
        let csv = PathBuf::from("c2clat.csv");
        let json = PathBuf::from("c2clat.json");
        assert_eq!(
            InputFormat::Auto.resolve(&csv, PlotKind::Heatmap),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::Auto.resolve(&json, PlotKind::Heatmap),
            InputFormat::Json
        );
        assert_eq!(
            InputFormat::Auto.resolve(&json, PlotKind::Mesh),
            InputFormat::Labeled
        );
        assert_eq!(
            InputFormat::Csv.resolve(&json, PlotKind::Mesh),
            InputFormat::Csv
        );
    }

    #[test]
    fn load_path_reads_csv_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "0\n10,0\n20,15,0\n").expect("write csv");

        let loaded = load_path(file.path(), InputFormat::Csv).expect("load csv");
        assert_eq!(loaded.matrix.size(), 3);
        assert_eq!(loaded.matrix.get(2, 1), 15.0);
        assert!(loaded.labels.is_none());
    }

    #[test]
    fn load_path_missing_file_is_io_error() {
        let err = load_path(Path::new("/nonexistent/c2clat.json"), InputFormat::Json).unwrap_err();
        assert!(matches!(err, MatrixError::Io(_)));
    }
}
