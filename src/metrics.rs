use crate::error::MatrixError;
use crate::model::{LatencyMatrix, MatrixStats, MedianPolicy};

/// Smallest non-NaN value, or `None` when there is none.
pub fn nan_min(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
}

/// Largest non-NaN value, or `None` when there is none.
pub fn nan_max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// Median of the non-NaN values; an even count averages the two middle values.
pub fn nan_median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Compute min/median/max over a matrix.
///
/// Min and max always cover every populated cell. The median follows `policy`;
/// `Pairs` falls back to every cell when no pair below the diagonal is populated.
pub fn compute_stats(matrix: &LatencyMatrix, policy: MedianPolicy) -> Result<MatrixStats, MatrixError> {
    let min = nan_min(matrix.values()).ok_or(MatrixError::NoData)?;
    let max = nan_max(matrix.values()).ok_or(MatrixError::NoData)?;
    let populated = matrix.values().filter(|v| !v.is_nan()).count();

    let median = match policy {
        MedianPolicy::Full => nan_median(matrix.values()),
        MedianPolicy::Pairs => nan_median(matrix.lower_pairs()).or_else(|| nan_median(matrix.values())),
    }
    .ok_or(MatrixError::NoData)?;

    Ok(MatrixStats {
        min,
        median,
        max,
        populated,
    })
}

/// Populated cells strictly below the diagonal.
pub fn populated_pairs(matrix: &LatencyMatrix) -> usize {
    matrix.lower_pairs().filter(|v| !v.is_nan()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> LatencyMatrix {
        LatencyMatrix::from_ragged_rows(vec![
            vec![0.0],
            vec![10.0, 0.0],
            vec![20.0, 15.0, 0.0],
        ])
        .unwrap()
        .symmetrized()
    }

    #[test]
    fn extrema_ignore_nan() {
        let values = [f64::NAN, 3.0, -1.5, f64::NAN, 8.25];
        assert_eq!(nan_min(values), Some(-1.5));
        assert_eq!(nan_max(values), Some(8.25));
        assert_eq!(nan_min([f64::NAN]), None);
        assert_eq!(nan_max(std::iter::empty()), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(nan_median([3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(nan_median([4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(nan_median([f64::NAN, 5.0]), Some(5.0));
        assert_eq!(nan_median([f64::NAN]), None);
    }

    #[test]
    fn stats_match_true_extrema_without_nan() {
        let stats = compute_stats(&example(), MedianPolicy::Full).unwrap();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 20.0);
        assert_eq!(stats.populated, 9);
    }

    #[test]
    fn pairs_median_counts_each_pair_once() {
        let stats = compute_stats(&example(), MedianPolicy::Pairs).unwrap();
        assert_eq!(stats.median, 15.0);
    }

    #[test]
    fn full_median_includes_diagonal_and_duplicates() {
        // 0,0,0,10,10,15,15,20,20
        let stats = compute_stats(&example(), MedianPolicy::Full).unwrap();
        assert_eq!(stats.median, 10.0);
    }

    #[test]
    fn single_core_pairs_median_falls_back_to_diagonal() {
        let m = LatencyMatrix::from_rows(vec![vec![4.0]]).unwrap();
        let stats = compute_stats(&m, MedianPolicy::Pairs).unwrap();
        assert_eq!(stats.median, 4.0);
    }

    #[test]
    fn all_nan_matrix_has_no_stats() {
        let m = LatencyMatrix::from_ragged_rows(vec![vec![], vec![]]).unwrap();
        assert!(matches!(
            compute_stats(&m, MedianPolicy::Pairs),
            Err(MatrixError::NoData)
        ));
    }

    #[test]
    fn populated_pairs_skips_nan() {
        let m = LatencyMatrix::from_ragged_rows(vec![vec![], vec![1.0], vec![f64::NAN, 2.0]]).unwrap();
        assert_eq!(populated_pairs(&m), 2);
    }
}
