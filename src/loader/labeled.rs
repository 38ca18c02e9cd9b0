use super::{json_cell, LoadedMatrix, MatrixLoader};
use crate::error::MatrixError;
use crate::model::LatencyMatrix;
use serde_json::Value;
use std::io::Read;

/// Mapping of mappings keyed by label: `{"node0": {"node0": 80, "node1": 140}, ...}`.
///
/// Row `r` is the r-th outer key; column `c` is looked up by the c-th outer key
/// in that row's mapping. Labels the inner mapping lacks become NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabeledJsonLoader;

impl MatrixLoader for LabeledJsonLoader {
    fn load(&self, reader: &mut dyn Read) -> Result<LoadedMatrix, MatrixError> {
        let value: Value = serde_json::from_reader(reader)?;
        let outer = value.as_object().ok_or_else(|| {
            MatrixError::Layout("expected an object mapping labels to objects".to_string())
        })?;

        let labels: Vec<String> = outer.keys().cloned().collect();
        let mut rows = Vec::with_capacity(labels.len());
        for (r, label) in labels.iter().enumerate() {
            let inner = outer[label].as_object().ok_or_else(|| {
                MatrixError::Layout(format!("entry {label:?} is not an object"))
            })?;
            let row = labels
                .iter()
                .enumerate()
                .map(|(c, col_label)| match inner.get(col_label) {
                    Some(v) => json_cell(v, r + 1, c + 1),
                    None => Ok(f64::NAN),
                })
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push(row);
        }

        let matrix = LatencyMatrix::from_rows(rows)?;
        Ok(LoadedMatrix {
            matrix,
            labels: Some(labels),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_follow_outer_key_order() {
        let text = r#"{
            "node1": {"node0": 140, "node1": 80},
            "node0": {"node0": 75, "node1": 150}
        }"#;
        let loaded = LabeledJsonLoader.load(&mut text.as_bytes()).unwrap();
        assert_eq!(
            loaded.labels.as_deref(),
            Some(&["node1".to_string(), "node0".to_string()][..])
        );
        let m = loaded.matrix;
        assert_eq!(m.get(0, 0), 80.0);
        assert_eq!(m.get(0, 1), 140.0);
        assert_eq!(m.get(1, 0), 150.0);
        assert_eq!(m.get(1, 1), 75.0);
    }

    #[test]
    fn missing_inner_label_is_nan() {
        let text = r#"{"a": {"a": 1}, "b": {"a": 2, "b": 3}}"#;
        let m = LabeledJsonLoader.load(&mut text.as_bytes()).unwrap().matrix;
        assert!(m.get(0, 1).is_nan());
        assert_eq!(m.get(1, 0), 2.0);
    }

    #[test]
    fn non_object_entry_is_rejected() {
        let text = r#"{"a": [1, 2]}"#;
        let err = LabeledJsonLoader.load(&mut text.as_bytes()).unwrap_err();
        assert!(matches!(err, MatrixError::Layout(_)));
    }

    #[test]
    fn empty_mapping_is_empty_error() {
        let err = LabeledJsonLoader.load(&mut "{}".as_bytes()).unwrap_err();
        assert!(matches!(err, MatrixError::Empty));
    }
}
