use crate::data::model::Dataset;

use super::TargetLabel;
use super::analysis::AnalysisError;
use super::classifier::Classifier;

// ---------------------------------------------------------------------------
// Feature reconciliation: classifier expectations vs dataset reality
// ---------------------------------------------------------------------------

/// Where the reconciled feature list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    /// The classifier's persisted feature names.
    Expected,
    /// The classifier exposes no feature names: every numeric dataset
    /// column except the known condition targets.
    Fallback,
}

/// Ephemeral result of matching a classifier's expected feature columns
/// against the columns actually present in the dataset. Recomputed on
/// every analysis request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAlignment {
    /// Feature columns to feed to the classifier, in the classifier's
    /// original order, restricted to numeric-typed columns.
    pub features: Vec<String>,
    /// Expected columns absent from the dataset (empty when exact).
    pub missing: Vec<String>,
    /// Whether the expected and available sets are identical.
    pub exact: bool,
    pub source: FeatureSource,
}

/// Reconcile the classifier's expected feature set with the dataset.
///
/// Fails fast with [`AnalysisError::TargetLeakage`] when the target column
/// itself appears among the expected features: that is a training-time
/// defect, not something to silently work around.
pub fn reconcile(
    dataset: &Dataset,
    target: TargetLabel,
    classifier: &Classifier,
) -> Result<FeatureAlignment, AnalysisError> {
    let Some(expected) = classifier.feature_names.as_deref() else {
        return Ok(fallback_alignment(dataset));
    };

    if expected.iter().any(|f| f == target.column_name()) {
        return Err(AnalysisError::TargetLeakage { target });
    }

    let missing: Vec<String> = expected
        .iter()
        .filter(|f| !dataset.has_column(f))
        .cloned()
        .collect();

    // Expected order preserved; present-but-non-numeric columns are dropped
    // from the usable set without counting as missing.
    let features: Vec<String> = expected
        .iter()
        .filter(|f| {
            dataset
                .column(f)
                .map(|c| c.is_numeric())
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    Ok(FeatureAlignment {
        features,
        exact: missing.is_empty(),
        missing,
        source: FeatureSource::Expected,
    })
}

fn fallback_alignment(dataset: &Dataset) -> FeatureAlignment {
    let features = dataset
        .numeric_columns()
        .into_iter()
        .filter(|c| TargetLabel::ALL.iter().all(|t| t.column_name() != *c))
        .map(str::to_string)
        .collect();

    FeatureAlignment {
        features,
        missing: Vec::new(),
        exact: true,
        source: FeatureSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ClassLabel, ColumnData};
    use crate::ml::classifier::{DecisionTree, TreeNode};

    fn dataset(columns: &[&str]) -> Dataset {
        Dataset::new(
            columns
                .iter()
                .map(|&name| (name.to_string(), ColumnData::Float(vec![1.0, 2.0])))
                .collect(),
        )
        .unwrap()
    }

    fn classifier(feature_names: Option<&[&str]>) -> Classifier {
        Classifier {
            target: "Cooler_Cond".into(),
            classes: vec![ClassLabel::Integer(3), ClassLabel::Integer(100)],
            feature_names: feature_names.map(|f| f.iter().map(|s| s.to_string()).collect()),
            trees: vec![DecisionTree {
                nodes: vec![TreeNode::Leaf { class: 0 }],
            }],
        }
    }

    #[test]
    fn exact_match_uses_expected_set_in_original_order() {
        let ds = dataset(&["c", "a", "b", "Cooler_Cond"]);
        let clf = classifier(Some(&["a", "b", "c"]));

        let alignment = reconcile(&ds, TargetLabel::CoolerCond, &clf).unwrap();
        assert!(alignment.exact);
        assert!(alignment.missing.is_empty());
        assert_eq!(alignment.features, vec!["a", "b", "c"]);
        assert_eq!(alignment.source, FeatureSource::Expected);
    }

    #[test]
    fn strict_subset_reports_exactly_the_missing_columns() {
        let ds = dataset(&["a", "b", "Cooler_Cond"]);
        let clf = classifier(Some(&["a", "b", "c"]));

        let alignment = reconcile(&ds, TargetLabel::CoolerCond, &clf).unwrap();
        assert!(!alignment.exact);
        assert_eq!(alignment.missing, vec!["c"]);
        assert_eq!(alignment.features, vec!["a", "b"]);
    }

    #[test]
    fn target_among_expected_features_is_leakage() {
        let ds = dataset(&["a", "b", "Cooler_Cond"]);
        let clf = classifier(Some(&["a", "b", "Cooler_Cond"]));

        let err = reconcile(&ds, TargetLabel::CoolerCond, &clf).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TargetLeakage {
                target: TargetLabel::CoolerCond
            }
        ));
    }

    #[test]
    fn leakage_fires_even_when_nothing_is_missing() {
        let ds = dataset(&["a", "Cooler_Cond"]);
        let clf = classifier(Some(&["a", "Cooler_Cond"]));
        assert!(reconcile(&ds, TargetLabel::CoolerCond, &clf).is_err());
    }

    #[test]
    fn non_numeric_expected_columns_are_dropped_but_not_missing() {
        let ds = Dataset::new(vec![
            ("a".into(), ColumnData::Float(vec![1.0])),
            ("note".into(), ColumnData::Text(vec!["x".into()])),
        ])
        .unwrap();
        let clf = classifier(Some(&["a", "note"]));

        let alignment = reconcile(&ds, TargetLabel::CoolerCond, &clf).unwrap();
        assert!(alignment.exact);
        assert!(alignment.missing.is_empty());
        assert_eq!(alignment.features, vec!["a"]);
    }

    #[test]
    fn fallback_uses_numeric_columns_minus_all_known_targets() {
        let ds = dataset(&["a", "Valve_Cond", "b", "Cooler_Cond"]);
        let clf = classifier(None);

        let alignment = reconcile(&ds, TargetLabel::CoolerCond, &clf).unwrap();
        assert_eq!(alignment.source, FeatureSource::Fallback);
        assert_eq!(alignment.features, vec!["a", "b"]);
    }
}
