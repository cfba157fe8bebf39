use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::model::ClassLabel;

// ---------------------------------------------------------------------------
// Persisted classifier artifact
// ---------------------------------------------------------------------------

/// One node of a decision tree. Split nodes reference features *by name*,
/// so a tree keeps working on a reduced feature set as long as none of its
/// splits touch a dropped column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Index into [`Classifier::classes`].
        class: usize,
    },
}

/// A single decision tree as a flat node array; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// A trained classifier for exactly one condition target, persisted as a
/// JSON artifact. Loaded on demand, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    /// Dataset column this model predicts.
    pub target: String,
    /// Class labels in the order leaf indices refer to them.
    pub classes: Vec<ClassLabel>,
    /// Ordered feature columns the model was trained on, when the
    /// training pipeline recorded them.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<DecisionTree>,
}

/// Rejection of a feature matrix by [`Classifier::predict_rows`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictError {
    #[error("feature '{0}' required by the classifier is not in the input matrix")]
    MissingFeature(String),
    #[error("non-finite value in feature '{feature}' at row {row}")]
    NonFiniteValue { feature: String, row: usize },
    #[error("classifier artifact is malformed: {0}")]
    Malformed(String),
}

impl Classifier {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Classifier> {
        let text = std::fs::read_to_string(path).context("reading classifier artifact")?;
        let clf: Classifier =
            serde_json::from_str(&text).context("parsing classifier artifact")?;
        clf.validate()?;
        Ok(clf)
    }

    fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            bail!("classifier has no classes");
        }
        if self.trees.is_empty() {
            bail!("classifier has no trees");
        }
        for (t, tree) in self.trees.iter().enumerate() {
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split { left, right, .. } => {
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            bail!("tree {t} node {n}: child index out of bounds");
                        }
                    }
                    TreeNode::Leaf { class } => {
                        if *class >= self.classes.len() {
                            bail!("tree {t} node {n}: class index out of bounds");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Sorted union of every feature name referenced by a split node.
    /// Used for diagnostics when `feature_names` was not persisted.
    pub fn referenced_features(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        for tree in &self.trees {
            for node in &tree.nodes {
                if let TreeNode::Split { feature, .. } = node {
                    set.insert(feature.clone());
                }
            }
        }
        set.into_iter().collect()
    }

    /// Feature names to report in shape-mismatch diagnostics.
    pub fn expected_features(&self) -> Vec<String> {
        self.feature_names
            .clone()
            .unwrap_or_else(|| self.referenced_features())
    }

    /// Predict a class label for every row of a row-major feature matrix.
    /// `feature_names` gives the column order of `rows`. Deterministic:
    /// majority vote across trees, ties broken toward the lowest class
    /// index.
    pub fn predict_rows(
        &self,
        feature_names: &[String],
        rows: &[Vec<f64>],
    ) -> Result<Vec<ClassLabel>, PredictError> {
        let positions: HashMap<&str, usize> = feature_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut predictions = Vec::with_capacity(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            let mut votes = vec![0usize; self.classes.len()];
            for tree in &self.trees {
                let class = walk_tree(tree, &positions, row, row_idx)?;
                votes[class] += 1;
            }
            // Strict `>` keeps the lowest class index on ties.
            let mut best = 0;
            for (class, &count) in votes.iter().enumerate() {
                if count > votes[best] {
                    best = class;
                }
            }
            predictions.push(self.classes[best].clone());
        }
        Ok(predictions)
    }
}

fn walk_tree(
    tree: &DecisionTree,
    positions: &HashMap<&str, usize>,
    row: &[f64],
    row_idx: usize,
) -> Result<usize, PredictError> {
    let mut node_idx = 0;
    // A well-formed tree terminates within `nodes.len()` steps.
    for _ in 0..=tree.nodes.len() {
        match tree.nodes.get(node_idx) {
            Some(TreeNode::Leaf { class }) => return Ok(*class),
            Some(TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                let pos = *positions
                    .get(feature.as_str())
                    .ok_or_else(|| PredictError::MissingFeature(feature.clone()))?;
                let value = row[pos];
                if !value.is_finite() {
                    return Err(PredictError::NonFiniteValue {
                        feature: feature.clone(),
                        row: row_idx,
                    });
                }
                node_idx = if value <= *threshold { *left } else { *right };
            }
            None => return Err(PredictError::Malformed("node index out of bounds".into())),
        }
    }
    Err(PredictError::Malformed("cycle in tree nodes".into()))
}
