use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::data::loader;
use crate::data::model::Dataset;
use crate::ml::TargetLabel;
use crate::ml::analysis::{self, AnalysisError, ModelAnalysis};
use crate::ml::registry::ModelRegistry;
use crate::ml::stats::{self, CorrelationMatrix};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. One user interaction
/// triggers at most one synchronous analysis; results are memoized per
/// target until a new dataset is loaded.
pub struct AppState {
    /// Loaded dataset (None until the user opens a file).
    pub dataset: Option<Dataset>,

    /// Path the dataset was loaded from (shown in the top bar).
    pub dataset_path: Option<PathBuf>,

    /// Persisted classifier lookup + cache.
    pub registry: ModelRegistry,

    /// Condition target currently shown in the analysis view.
    pub selected_target: TargetLabel,

    /// Memoized analysis outcome per target for the current dataset.
    pub analyses: BTreeMap<TargetLabel, Result<ModelAnalysis, AnalysisError>>,

    /// Feature × feature correlations of the current dataset.
    pub correlation_matrix: Option<CorrelationMatrix>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            dataset_path: None,
            registry: ModelRegistry::new("models"),
            selected_target: TargetLabel::CoolerCond,
            analyses: BTreeMap::new(),
            correlation_matrix: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and invalidate derived results.
    pub fn set_dataset(&mut self, dataset: Dataset, path: PathBuf) {
        log::info!(
            "loaded {} cycles with {} columns from {}",
            dataset.n_rows(),
            dataset.column_names.len(),
            path.display()
        );
        self.correlation_matrix = Some(stats::correlation_matrix(&dataset));
        self.dataset = Some(dataset);
        self.dataset_path = Some(path);
        self.analyses.clear();
        self.status_message = None;
    }

    /// Load a dataset from disk; a failure leaves the previous dataset in
    /// place and surfaces the error as a status message.
    pub fn load_dataset_from(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset, path.to_path_buf()),
            Err(e) => {
                log::error!("failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Dataset unavailable: {e:#}"));
            }
        }
    }

    pub fn select_target(&mut self, target: TargetLabel) {
        self.selected_target = target;
        // Reselecting a target retries a previously failed artifact load.
        if let Some(Err(AnalysisError::ClassifierInvalid { .. })) = self.analyses.get(&target) {
            self.analyses.remove(&target);
        }
    }

    /// Compute the selected target's analysis if it is not memoized yet.
    /// Classifier-artifact load failures are memoized too, so a broken
    /// file is read once, not on every frame; `select_target` drops that
    /// memo so the user can retry after repairing the artifact.
    pub fn ensure_analysis(&mut self) {
        let target = self.selected_target;
        if self.analyses.contains_key(&target) {
            return;
        }

        let Some(dataset) = &self.dataset else {
            self.analyses.insert(target, Err(AnalysisError::DatasetUnavailable));
            return;
        };

        let classifier = match self.registry.get(target) {
            Ok(c) => c,
            Err(e) => {
                log::error!("classifier load failed for {target}: {e:#}");
                self.analyses.insert(
                    target,
                    Err(AnalysisError::ClassifierInvalid {
                        target,
                        message: format!("{e:#}"),
                    }),
                );
                return;
            }
        };

        let result = analysis::analyze(dataset, target, classifier.as_deref());
        if let Err(e) = &result {
            log::warn!("analysis for {target} failed: {e}");
        }
        self.analyses.insert(target, result);
    }

    /// Memoized analysis outcome for the selected target, if computed.
    pub fn current_analysis(&self) -> Option<&Result<ModelAnalysis, AnalysisError>> {
        self.analyses.get(&self.selected_target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnData;

    fn state_with_dataset(dir: &Path) -> AppState {
        let mut state = AppState {
            registry: ModelRegistry::new(dir),
            ..AppState::default()
        };
        let dataset = Dataset::new(vec![
            ("se_mean".into(), ColumnData::Float(vec![20.0, 60.0])),
            ("Cooler_Cond".into(), ColumnData::Int(vec![3, 100])),
        ])
        .unwrap();
        state.set_dataset(dataset, PathBuf::from("test.csv"));
        state
    }

    #[test]
    fn no_dataset_memoizes_dataset_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState {
            registry: ModelRegistry::new(dir.path()),
            ..AppState::default()
        };
        state.ensure_analysis();
        assert_eq!(
            state.current_analysis(),
            Some(&Err(AnalysisError::DatasetUnavailable))
        );
    }

    #[test]
    fn missing_classifier_memoizes_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with_dataset(dir.path());
        state.ensure_analysis();
        assert_eq!(
            state.current_analysis(),
            Some(&Err(AnalysisError::ClassifierUnavailable(
                TargetLabel::CoolerCond
            )))
        );
    }

    #[test]
    fn new_dataset_clears_memoized_analyses() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with_dataset(dir.path());
        state.ensure_analysis();
        assert!(state.current_analysis().is_some());

        let replacement = Dataset::new(vec![(
            "Cooler_Cond".into(),
            ColumnData::Int(vec![3]),
        )])
        .unwrap();
        state.set_dataset(replacement, PathBuf::from("other.csv"));
        assert!(state.current_analysis().is_none());
    }

    #[test]
    fn corrupt_artifact_failure_is_memoized_until_reselect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model_cooler_cond.json");
        std::fs::write(&path, "not json").unwrap();
        let mut state = state_with_dataset(dir.path());

        state.ensure_analysis();
        assert!(matches!(
            state.current_analysis(),
            Some(Err(AnalysisError::ClassifierInvalid { .. }))
        ));

        // Repairing the file alone changes nothing mid-frame.
        let repaired = serde_json::json!({
            "target": "Cooler_Cond",
            "classes": [3, 100],
            "trees": [{ "nodes": [{ "kind": "leaf", "class": 0 }] }],
        });
        std::fs::write(&path, repaired.to_string()).unwrap();
        state.ensure_analysis();
        assert!(matches!(
            state.current_analysis(),
            Some(Err(AnalysisError::ClassifierInvalid { .. }))
        ));

        // Reselecting the target drops the memo and retries the load.
        state.select_target(TargetLabel::CoolerCond);
        state.ensure_analysis();
        assert!(matches!(state.current_analysis(), Some(Ok(_))));
    }

    #[test]
    fn dataset_load_computes_the_correlation_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dataset(dir.path());

        let matrix = state.correlation_matrix.as_ref().unwrap();
        assert_eq!(matrix.features, vec!["se_mean", "Cooler_Cond"]);

        let mut state = state;
        let replacement = Dataset::new(vec![(
            "ps1_mean".into(),
            ColumnData::Float(vec![1.0, 2.0]),
        )])
        .unwrap();
        state.set_dataset(replacement, PathBuf::from("other.csv"));
        let matrix = state.correlation_matrix.as_ref().unwrap();
        assert_eq!(matrix.features, vec!["ps1_mean"]);
    }

    #[test]
    fn failed_dataset_load_keeps_previous_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with_dataset(dir.path());
        state.load_dataset_from(Path::new("no_such_file.csv"));
        assert!(state.dataset.is_some());
        assert!(state.status_message.as_deref().unwrap().contains("unavailable"));
    }
}
