use crate::data::model::{ClassLabel, Dataset};

// ---------------------------------------------------------------------------
// Feature ↔ target correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient; 0.0 when either side has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n == 0 {
        return 0.0;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 { 0.0 } else { cov / denom }
}

/// Encode class labels as their ascending rank (0, 1, 2, ...).
fn class_codes(truth: &[ClassLabel]) -> Vec<f64> {
    let mut unique: Vec<&ClassLabel> = truth.iter().collect();
    unique.sort();
    unique.dedup();

    truth
        .iter()
        .map(|l| unique.binary_search(&l).unwrap_or(0) as f64)
        .collect()
}

/// Symmetric feature × feature Pearson correlation over every numeric
/// column of the dataset, for the overview heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// Numeric columns in file order; both axes of `values`.
    pub features: Vec<String>,
    /// `values[i][j]` is the signed r between columns `i` and `j`.
    pub values: Vec<Vec<f64>>,
}

pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let features: Vec<String> = dataset
        .numeric_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    let columns: Vec<Vec<f64>> = features
        .iter()
        .filter_map(|f| dataset.numeric_values(f))
        .collect();

    let n = features.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { features, values }
}

/// Absolute Pearson correlation of each feature column against the
/// rank-encoded target classes, strongest first. A ranking aid for the
/// analysis view, not part of the inference path.
pub fn target_correlations(
    dataset: &Dataset,
    features: &[String],
    truth: &[ClassLabel],
) -> Vec<(String, f64)> {
    let codes = class_codes(truth);

    let mut correlations: Vec<(String, f64)> = features
        .iter()
        .filter_map(|f| {
            let values = dataset.numeric_values(f)?;
            Some((f.clone(), pearson(&values, &codes).abs()))
        })
        .collect();

    correlations.sort_by(|a, b| b.1.total_cmp(&a.1));
    correlations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnData;

    #[test]
    fn pearson_detects_perfect_linear_relation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &up) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &down) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_yields_zero_not_nan() {
        let x = [5.0, 5.0, 5.0];
        let y = [1.0, 2.0, 3.0];
        assert_eq!(pearson(&x, &y), 0.0);
    }

    #[test]
    fn correlations_are_sorted_strongest_first() {
        let ds = Dataset::new(vec![
            ("noisy".into(), ColumnData::Float(vec![0.3, 0.1, 0.25, 0.15])),
            ("tracking".into(), ColumnData::Float(vec![1.0, 1.0, 2.0, 2.0])),
        ])
        .unwrap();
        let truth = vec![
            ClassLabel::Integer(3),
            ClassLabel::Integer(3),
            ClassLabel::Integer(100),
            ClassLabel::Integer(100),
        ];

        let corr = target_correlations(
            &ds,
            &["noisy".to_string(), "tracking".to_string()],
            &truth,
        );
        assert_eq!(corr[0].0, "tracking");
        assert!((corr[0].1 - 1.0).abs() < 1e-12);
        assert!(corr[1].1 < 1.0);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let ds = Dataset::new(vec![
            ("a".into(), ColumnData::Float(vec![1.0, 2.0, 3.0])),
            ("b".into(), ColumnData::Float(vec![6.0, 4.0, 2.0])),
            ("label".into(), ColumnData::Text(vec!["x".into(), "y".into(), "z".into()])),
        ])
        .unwrap();

        let matrix = correlation_matrix(&ds);
        // Text columns are not part of either axis.
        assert_eq!(matrix.features, vec!["a", "b"]);
        assert!((matrix.values[0][0] - 1.0).abs() < 1e-12);
        assert!((matrix.values[1][1] - 1.0).abs() < 1e-12);
        // a falls exactly as b rises.
        assert!((matrix.values[0][1] + 1.0).abs() < 1e-12);
        assert_eq!(matrix.values[0][1], matrix.values[1][0]);
    }

    #[test]
    fn codes_follow_ascending_label_order() {
        let truth = vec![
            ClassLabel::Integer(100),
            ClassLabel::Integer(3),
            ClassLabel::Integer(20),
        ];
        assert_eq!(class_codes(&truth), vec![2.0, 0.0, 1.0]);
    }
}
