use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClassLabel – a categorical class code of a condition target
// ---------------------------------------------------------------------------

/// A class code of a condition target, e.g. `100` (full cooler efficiency)
/// or `"severe"`. Classifier artifacts store these in JSON, hence the
/// untagged serde representation. Class axes are kept sorted downstream so
/// `ClassLabel` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Integer(i64),
    Text(String),
}

// -- Manual Ord: integers sort before text, each kind by natural order --

impl PartialOrd for ClassLabel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassLabel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use ClassLabel::*;
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Integer(_), Text(_)) => std::cmp::Ordering::Less,
            (Text(_), Integer(_)) => std::cmp::Ordering::Greater,
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Integer(i) => write!(f, "{i}"),
            ClassLabel::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnData – one typed column of the table
// ---------------------------------------------------------------------------

/// A single column of the dataset. `Float` and `Int` are the numeric-typed
/// columns eligible as classifier inputs; `Text` columns are categorical.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the column can be fed to a classifier as-is.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Float(_) | ColumnData::Int(_))
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset: one row per hydraulic cycle, columns in file
/// order. Read-only for the lifetime of the process once loaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column names in file order.
    pub column_names: Vec<String>,
    columns: BTreeMap<String, ColumnData>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from ordered `(name, column)` pairs. All columns
    /// must have the same length and names must be unique.
    pub fn new(ordered: Vec<(String, ColumnData)>) -> Result<Self> {
        let n_rows = ordered.first().map(|(_, c)| c.len()).unwrap_or(0);

        let mut column_names = Vec::with_capacity(ordered.len());
        let mut columns = BTreeMap::new();
        for (name, col) in ordered {
            if col.len() != n_rows {
                bail!("column '{name}' has {} rows, expected {n_rows}", col.len());
            }
            if columns.insert(name.clone(), col).is_some() {
                bail!("duplicate column name '{name}'");
            }
            column_names.push(name);
        }

        Ok(Dataset {
            column_names,
            columns,
            n_rows,
        })
    }

    /// Number of rows (hydraulic cycles).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.get(name)
    }

    /// Names of all numeric-typed columns, in file order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.column_names
            .iter()
            .filter(|n| self.columns[n.as_str()].is_numeric())
            .map(|n| n.as_str())
            .collect()
    }

    /// A numeric column widened to `f64`, or `None` if absent / non-numeric.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<f64>> {
        match self.columns.get(name)? {
            ColumnData::Float(v) => Some(v.clone()),
            ColumnData::Int(v) => Some(v.iter().map(|&i| i as f64).collect()),
            ColumnData::Text(_) => None,
        }
    }

    /// A column read as categorical class labels. Float columns are not
    /// valid condition targets.
    pub fn class_values(&self, name: &str) -> Option<Vec<ClassLabel>> {
        match self.columns.get(name)? {
            ColumnData::Int(v) => Some(v.iter().map(|&i| ClassLabel::Integer(i)).collect()),
            ColumnData::Text(v) => Some(v.iter().map(|s| ClassLabel::Text(s.clone())).collect()),
            ColumnData::Float(_) => None,
        }
    }

    /// Row-major feature matrix for the given (numeric) feature columns.
    /// Columns that are absent or non-numeric are skipped; callers are
    /// expected to have reconciled the feature list beforehand.
    pub fn feature_matrix(&self, features: &[String]) -> Vec<Vec<f64>> {
        let cols: Vec<Vec<f64>> = features
            .iter()
            .filter_map(|f| self.numeric_values(f))
            .collect();

        (0..self.n_rows)
            .map(|row| cols.iter().map(|c| c[row]).collect())
            .collect()
    }

    /// Per-class row counts of a categorical column, sorted by class label.
    pub fn class_counts(&self, name: &str) -> Option<BTreeMap<ClassLabel, usize>> {
        let values = self.class_values(name)?;
        let mut counts: BTreeMap<ClassLabel, usize> = BTreeMap::new();
        for v in values {
            *counts.entry(v).or_default() += 1;
        }
        Some(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            ("ps1".into(), ColumnData::Float(vec![1.0, 2.0, 3.0])),
            ("cycles".into(), ColumnData::Int(vec![10, 20, 30])),
            (
                "operator".into(),
                ColumnData::Text(vec!["a".into(), "b".into(), "a".into()]),
            ),
            ("Pump_Leak".into(), ColumnData::Int(vec![0, 2, 0])),
        ])
        .unwrap()
    }

    #[test]
    fn numeric_columns_preserve_file_order() {
        let ds = dataset();
        assert_eq!(ds.numeric_columns(), vec!["ps1", "cycles", "Pump_Leak"]);
    }

    #[test]
    fn int_columns_widen_to_f64() {
        let ds = dataset();
        assert_eq!(ds.numeric_values("cycles"), Some(vec![10.0, 20.0, 30.0]));
        assert_eq!(ds.numeric_values("operator"), None);
    }

    #[test]
    fn float_columns_are_not_class_targets() {
        let ds = dataset();
        assert!(ds.class_values("ps1").is_none());
        assert_eq!(
            ds.class_values("Pump_Leak").unwrap(),
            vec![
                ClassLabel::Integer(0),
                ClassLabel::Integer(2),
                ClassLabel::Integer(0)
            ]
        );
    }

    #[test]
    fn feature_matrix_is_row_major() {
        let ds = dataset();
        let m = ds.feature_matrix(&["ps1".into(), "cycles".into()]);
        assert_eq!(m, vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]]);
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let err = Dataset::new(vec![
            ("a".into(), ColumnData::Int(vec![1, 2])),
            ("b".into(), ColumnData::Int(vec![1])),
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn class_labels_sort_ascending() {
        let mut labels = vec![
            ClassLabel::Text("weak".into()),
            ClassLabel::Integer(100),
            ClassLabel::Integer(3),
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![
                ClassLabel::Integer(3),
                ClassLabel::Integer(100),
                ClassLabel::Text("weak".into())
            ]
        );
    }
}
