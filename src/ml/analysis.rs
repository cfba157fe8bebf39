use thiserror::Error;

use crate::data::model::Dataset;

use super::TargetLabel;
use super::align::{self, FeatureAlignment, FeatureSource};
use super::classifier::Classifier;
use super::metrics::{ClassificationReport, ConfusionMatrix};
use super::stats;

// ---------------------------------------------------------------------------
// Feature-aligned inference
// ---------------------------------------------------------------------------

/// Why an analysis request could not produce a result. Every variant is
/// scoped to the single request that raised it; the session carries on and
/// the user can pick different inputs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("no dataset is loaded")]
    DatasetUnavailable,

    #[error("no classifier artifact found for {0}")]
    ClassifierUnavailable(TargetLabel),

    /// The artifact exists but could not be read, parsed or validated.
    /// Memoized like any other outcome; reselecting the target retries.
    #[error("classifier artifact for {target} could not be loaded: {message}")]
    ClassifierInvalid { target: TargetLabel, message: String },

    #[error("target column '{0}' is missing from the dataset or is not categorical")]
    TargetColumnMissing(&'static str),

    /// The classifier lists the column it predicts among its own inputs.
    /// A training-time defect; inference must not run.
    #[error("classifier for {target} lists the target among its expected features")]
    TargetLeakage { target: TargetLabel },

    /// Predict rejected the reconciled feature matrix. Both feature-name
    /// lists are carried for diagnosis; the caller may retry with
    /// different inputs, never automatically.
    #[error("prediction rejected the reconciled feature matrix: {message}")]
    FeatureShapeMismatch {
        message: String,
        expected: Vec<String>,
        available: Vec<String>,
    },
}

/// Everything the analysis view renders for one (dataset, target,
/// classifier) combination. A pure value: recomputing with the same
/// inputs yields an equal result.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnalysis {
    pub target: TargetLabel,
    pub alignment: FeatureAlignment,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
    /// Per-feature |Pearson r| against the target, strongest first.
    pub correlations: Vec<(String, f64)>,
    /// Human-readable notes about how the feature set was reconciled.
    pub diagnostics: Vec<String>,
}

/// Run feature-aligned inference for one target and summarize the result.
///
/// The dataset and classifier are read-only throughout; no partial state
/// survives an error.
pub fn analyze(
    dataset: &Dataset,
    target: TargetLabel,
    classifier: Option<&Classifier>,
) -> Result<ModelAnalysis, AnalysisError> {
    let classifier = classifier.ok_or(AnalysisError::ClassifierUnavailable(target))?;

    let truth = dataset
        .class_values(target.column_name())
        .ok_or(AnalysisError::TargetColumnMissing(target.column_name()))?;

    let alignment = align::reconcile(dataset, target, classifier)?;

    let mut diagnostics = Vec::new();
    match alignment.source {
        FeatureSource::Expected if alignment.exact => {
            diagnostics.push(format!(
                "using all {} features the classifier was trained on",
                alignment.features.len()
            ));
        }
        FeatureSource::Expected => {
            log::warn!(
                "{target}: dataset is missing expected features {:?}",
                alignment.missing
            );
            diagnostics.push(format!("missing features: {}", alignment.missing.join(", ")));
            diagnostics.push(format!(
                "continuing with {} of {} expected features (degraded inputs)",
                alignment.features.len(),
                alignment.features.len() + alignment.missing.len()
            ));
        }
        FeatureSource::Fallback => {
            diagnostics.push(format!(
                "classifier exposes no feature names; falling back to {} numeric columns",
                alignment.features.len()
            ));
        }
    }

    let matrix = dataset.feature_matrix(&alignment.features);
    let predicted = classifier
        .predict_rows(&alignment.features, &matrix)
        .map_err(|e| AnalysisError::FeatureShapeMismatch {
            message: e.to_string(),
            expected: classifier.expected_features(),
            available: alignment.features.clone(),
        })?;

    let confusion = ConfusionMatrix::from_pairs(&truth, &predicted);
    let report = ClassificationReport::from_confusion(&confusion);
    let correlations = stats::target_correlations(dataset, &alignment.features, &truth);

    Ok(ModelAnalysis {
        target,
        alignment,
        confusion,
        report,
        correlations,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ClassLabel, ColumnData};
    use crate::ml::classifier::{DecisionTree, TreeNode};

    /// Two separable classes of cooler condition driven by se_mean.
    fn dataset() -> Dataset {
        Dataset::new(vec![
            (
                "se_mean".into(),
                ColumnData::Float(vec![20.0, 22.0, 60.0, 58.0]),
            ),
            (
                "ts1_mean".into(),
                ColumnData::Float(vec![50.0, 51.0, 44.0, 45.0]),
            ),
            ("Cooler_Cond".into(), ColumnData::Int(vec![3, 3, 100, 100])),
        ])
        .unwrap()
    }

    fn classifier(feature_names: Option<Vec<&str>>) -> Classifier {
        Classifier {
            target: "Cooler_Cond".into(),
            classes: vec![ClassLabel::Integer(3), ClassLabel::Integer(100)],
            feature_names: feature_names.map(|f| f.into_iter().map(str::to_string).collect()),
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: "se_mean".into(),
                        threshold: 40.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { class: 0 },
                    TreeNode::Leaf { class: 1 },
                ],
            }],
        }
    }

    #[test]
    fn absent_classifier_reports_unavailable_without_predicting() {
        let err = analyze(&dataset(), TargetLabel::CoolerCond, None).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::ClassifierUnavailable(TargetLabel::CoolerCond)
        );
    }

    #[test]
    fn exact_feature_match_produces_a_perfect_report_here() {
        let clf = classifier(Some(vec!["se_mean", "ts1_mean"]));
        let analysis = analyze(&dataset(), TargetLabel::CoolerCond, Some(&clf)).unwrap();

        assert!(analysis.alignment.exact);
        assert_eq!(analysis.report.accuracy, 1.0);
        assert_eq!(
            analysis.confusion.classes,
            vec![ClassLabel::Integer(3), ClassLabel::Integer(100)]
        );
        // se_mean drives the target, so it ranks first.
        assert_eq!(analysis.correlations[0].0, "se_mean");
    }

    #[test]
    fn degraded_inputs_still_predict_when_the_missing_feature_is_unused() {
        // Classifier trained on three columns; ps1_mean is gone from the
        // dataset but no tree splits on it.
        let clf = classifier(Some(vec!["se_mean", "ts1_mean", "ps1_mean"]));
        let analysis = analyze(&dataset(), TargetLabel::CoolerCond, Some(&clf)).unwrap();

        assert!(!analysis.alignment.exact);
        assert_eq!(analysis.alignment.missing, vec!["ps1_mean"]);
        assert_eq!(analysis.report.accuracy, 1.0);
        assert!(
            analysis
                .diagnostics
                .iter()
                .any(|d| d.contains("ps1_mean"))
        );
    }

    #[test]
    fn shape_mismatch_reports_both_feature_lists() {
        // The only split feature is missing from the dataset entirely.
        let mut clf = classifier(Some(vec!["ts1_mean", "ps1_mean"]));
        clf.trees[0].nodes[0] = TreeNode::Split {
            feature: "ps1_mean".into(),
            threshold: 1.0,
            left: 1,
            right: 2,
        };

        let err = analyze(&dataset(), TargetLabel::CoolerCond, Some(&clf)).unwrap_err();
        let AnalysisError::FeatureShapeMismatch {
            expected,
            available,
            message,
        } = err
        else {
            panic!("expected FeatureShapeMismatch");
        };
        assert_eq!(expected, vec!["ts1_mean", "ps1_mean"]);
        assert_eq!(available, vec!["ts1_mean"]);
        assert!(message.contains("ps1_mean"));
    }

    #[test]
    fn leakage_aborts_before_any_prediction() {
        // Poisoned tree: a split on the target column would "succeed" if
        // predict ever ran, so reaching predict would not error out.
        let mut clf = classifier(Some(vec!["se_mean", "Cooler_Cond"]));
        clf.trees[0].nodes[0] = TreeNode::Split {
            feature: "Cooler_Cond".into(),
            threshold: 50.0,
            left: 1,
            right: 2,
        };

        let err = analyze(&dataset(), TargetLabel::CoolerCond, Some(&clf)).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::TargetLeakage {
                target: TargetLabel::CoolerCond
            }
        );
    }

    #[test]
    fn missing_target_column_halts_only_this_analysis() {
        let clf = classifier(Some(vec!["se_mean"]));
        let err = analyze(&dataset(), TargetLabel::PumpLeak, Some(&clf)).unwrap_err();
        assert_eq!(err, AnalysisError::TargetColumnMissing("Pump_Leak"));
    }

    #[test]
    fn repeated_invocations_are_value_identical() {
        let ds = dataset();
        let clf = classifier(Some(vec!["se_mean", "ts1_mean"]));
        let first = analyze(&ds, TargetLabel::CoolerCond, Some(&clf)).unwrap();
        let second = analyze(&ds, TargetLabel::CoolerCond, Some(&clf)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_path_runs_without_feature_names() {
        let clf = classifier(None);
        let analysis = analyze(&dataset(), TargetLabel::CoolerCond, Some(&clf)).unwrap();
        assert_eq!(analysis.alignment.source, FeatureSource::Fallback);
        // Fallback excludes the target column itself.
        assert_eq!(analysis.alignment.features, vec!["se_mean", "ts1_mean"]);
        assert_eq!(analysis.report.accuracy, 1.0);
    }
}
