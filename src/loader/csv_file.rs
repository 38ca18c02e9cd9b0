use super::{LoadedMatrix, MatrixLoader};
use crate::error::MatrixError;
use crate::model::LatencyMatrix;
use std::io::Read;

/// Headerless CSV, one matrix row per line.
///
/// Accepts both the `c2clat -c` layout (N fields per row, empty above the
/// diagonal) and compact lower-triangular files where rows simply stop early.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvLoader;

impl MatrixLoader for CsvLoader {
    fn load(&self, reader: &mut dyn Read) -> Result<LoadedMatrix, MatrixError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);

            let mut fields: Vec<&str> = record.iter().collect();
            // Trailing empty fields carry no data and are restored as NaN padding.
            while fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }
            if fields.is_empty() && record.len() <= 1 {
                continue;
            }

            let row = fields
                .iter()
                .enumerate()
                .map(|(col, field)| parse_field(field, line, col + 1))
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push(row);
        }

        let matrix = LatencyMatrix::from_ragged_rows(rows)?;
        Ok(LoadedMatrix {
            matrix,
            labels: None,
        })
    }
}

fn parse_field(field: &str, line: usize, column: usize) -> Result<f64, MatrixError> {
    if field.is_empty() {
        return Ok(f64::NAN);
    }
    field.parse::<f64>().map_err(|_| MatrixError::Parse {
        line,
        column,
        value: field.to_string(),
    })
}
