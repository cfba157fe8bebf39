use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use super::TargetLabel;
use super::classifier::Classifier;

// ---------------------------------------------------------------------------
// Model registry: deterministic artifact lookup + process-wide memoization
// ---------------------------------------------------------------------------

/// Locates the persisted classifier for each target and caches the loaded
/// artifacts for the lifetime of the process. An absent artifact is also
/// cached (as `None`): the single-threaded request model means nothing can
/// create one behind our back mid-session, and the cache is explicit state
/// rather than hidden framework behavior.
pub struct ModelRegistry {
    root: PathBuf,
    cache: BTreeMap<TargetLabel, Option<Arc<Classifier>>>,
}

impl ModelRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ModelRegistry {
            root: root.into(),
            cache: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic artifact path for a target.
    pub fn model_path(&self, target: TargetLabel) -> PathBuf {
        self.root
            .join(format!("best_model_{}.json", target.artifact_stem()))
    }

    /// Load (or return the cached) classifier for a target.
    ///
    /// * `Ok(None)` – no artifact on disk; reportable, non-fatal.
    /// * `Err(..)` – the artifact exists but could not be read or parsed;
    ///   not cached, so a repaired file is picked up on the next request.
    pub fn get(&mut self, target: TargetLabel) -> Result<Option<Arc<Classifier>>> {
        if let Some(cached) = self.cache.get(&target) {
            return Ok(cached.clone());
        }

        let path = self.model_path(target);
        if !path.exists() {
            log::info!("no classifier artifact for {target} at {}", path.display());
            self.cache.insert(target, None);
            return Ok(None);
        }

        let clf = Classifier::load(&path)
            .with_context(|| format!("loading classifier for {target} from {}", path.display()))?;
        if clf.target != target.column_name() {
            bail!(
                "artifact at {} is for target '{}', expected '{target}'",
                path.display(),
                clf.target
            );
        }

        log::info!(
            "loaded classifier for {target}: {} trees, {} classes",
            clf.trees.len(),
            clf.classes.len()
        );
        let clf = Arc::new(clf);
        self.cache.insert(target, Some(clf.clone()));
        Ok(Some(clf))
    }

    /// Drop all cached artifacts (e.g. after pointing at a new directory).
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
