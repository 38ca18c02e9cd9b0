use super::{json_cell, LoadedMatrix, MatrixLoader};
use crate::error::MatrixError;
use crate::model::LatencyMatrix;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Read;

/// JSON matrix in one of two layouts:
///
/// - an array of rows, `[[0], [10, 0], [20, 15, 0]]`, rows may stop early;
/// - an object of columns as written by pandas `DataFrame.to_json()`,
///   `{"0": {"0": 0, "1": 10}, "1": {"0": null, "1": 0}}` or `{"0": [0, 10], ...}`.
///
/// `null` and absent cells are NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl MatrixLoader for JsonLoader {
    fn load(&self, reader: &mut dyn Read) -> Result<LoadedMatrix, MatrixError> {
        let value: Value = serde_json::from_reader(reader)?;
        let matrix = match value {
            Value::Array(rows) => from_row_array(&rows)?,
            Value::Object(columns) => from_column_object(&columns)?,
            other => {
                return Err(MatrixError::Layout(format!(
                    "expected an array of rows or an object of columns, found {}",
                    kind_name(&other)
                )))
            }
        };
        Ok(LoadedMatrix {
            matrix,
            labels: None,
        })
    }
}

fn from_row_array(rows: &[Value]) -> Result<LatencyMatrix, MatrixError> {
    let mut parsed = Vec::with_capacity(rows.len());
    for (r, row) in rows.iter().enumerate() {
        let cells = row.as_array().ok_or_else(|| {
            MatrixError::Layout(format!("row {} is {}, not an array", r + 1, kind_name(row)))
        })?;
        let values = cells
            .iter()
            .enumerate()
            .map(|(c, cell)| json_cell(cell, r + 1, c + 1))
            .collect::<Result<Vec<f64>, _>>()?;
        parsed.push(values);
    }
    LatencyMatrix::from_ragged_rows(parsed)
}

fn from_column_object(columns: &Map<String, Value>) -> Result<LatencyMatrix, MatrixError> {
    // Row key -> row index, numbered by first appearance across columns.
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<Vec<(usize, &Value)>> = Vec::with_capacity(columns.len());

    for (name, column) in columns {
        let cells: Vec<(String, &Value)> = match column {
            Value::Object(by_row) => by_row.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(by_pos) => by_pos
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            other => {
                return Err(MatrixError::Layout(format!(
                    "column {name:?} is {}, not an object or array",
                    kind_name(other)
                )))
            }
        };
        let indexed = cells
            .into_iter()
            .map(|(key, value)| {
                let next = row_index.len();
                (*row_index.entry(key).or_insert(next), value)
            })
            .collect();
        entries.push(indexed);
    }

    let mut rows = vec![vec![f64::NAN; columns.len()]; row_index.len()];
    for (c, cells) in entries.iter().enumerate() {
        for &(r, value) in cells {
            rows[r][c] = json_cell(value, r + 1, c + 1)?;
        }
    }
    LatencyMatrix::from_rows(rows)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<LatencyMatrix, MatrixError> {
        JsonLoader.load(&mut text.as_bytes()).map(|l| l.matrix)
    }

    #[test]
    fn ragged_row_array() {
        let m = load("[[0], [10, 0], [20, 15, 0]]").unwrap();
        assert_eq!(m.size(), 3);
        assert_eq!(m.get(2, 1), 15.0);
        assert!(m.get(0, 2).is_nan());
    }

    #[test]
    fn null_cells_are_nan() {
        let m = load("[[null, null], [12.5, null]]").unwrap();
        assert!(m.get(0, 0).is_nan());
        assert_eq!(m.get(1, 0), 12.5);
    }

    #[test]
    fn pandas_column_object() {
        let m = load(r#"{"0": {"0": 0, "1": 10, "2": 20}, "1": {"1": 0, "2": 15}, "2": {"2": 0}}"#)
            .unwrap();
        assert_eq!(m.size(), 3);
        assert_eq!(m.get(1, 0), 10.0);
        assert_eq!(m.get(2, 1), 15.0);
        assert!(m.get(0, 1).is_nan());
    }

    #[test]
    fn row_key_first_seen_in_later_column_gets_its_own_row() {
        let m = load(r#"{"0": {"0": 1}, "1": {"0": 2, "1": 3}}"#).unwrap();
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(0, 1), 2.0);
        assert!(m.get(1, 0).is_nan());
        assert_eq!(m.get(1, 1), 3.0);
    }

    #[test]
    fn column_object_of_arrays() {
        let m = load(r#"{"a": [1, 2], "b": [3, 4]}"#).unwrap();
        assert_eq!(m.get(0, 1), 3.0);
        assert_eq!(m.get(1, 0), 2.0);
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert!(matches!(load("42"), Err(MatrixError::Layout(_))));
    }

    #[test]
    fn string_cell_is_parse_error() {
        let err = load(r#"[["x"]]"#).unwrap_err();
        assert!(matches!(err, MatrixError::Parse { line: 1, column: 1, .. }));
    }

    #[test]
    fn empty_array_is_empty_error() {
        assert!(matches!(load("[]"), Err(MatrixError::Empty)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        assert!(matches!(load("[[1, 2"), Err(MatrixError::Json(_))));
    }
}
