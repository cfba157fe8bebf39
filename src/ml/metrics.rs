use std::collections::BTreeSet;

use crate::data::model::ClassLabel;

// ---------------------------------------------------------------------------
// Confusion matrix
// ---------------------------------------------------------------------------

/// Confusion matrix over the union of observed true and predicted labels,
/// sorted ascending. Rows are true classes, columns are predicted classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    pub classes: Vec<ClassLabel>,
    /// `counts[true_idx][pred_idx]`
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn from_pairs(truth: &[ClassLabel], predicted: &[ClassLabel]) -> ConfusionMatrix {
        debug_assert_eq!(truth.len(), predicted.len());

        let classes: Vec<ClassLabel> = truth
            .iter()
            .chain(predicted.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let index = |label: &ClassLabel| classes.binary_search(label).unwrap_or(0);

        let n = classes.len();
        let mut counts = vec![vec![0usize; n]; n];
        for (t, p) in truth.iter().zip(predicted) {
            counts[index(t)][index(p)] += 1;
        }

        ConfusionMatrix { classes, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Correctly classified rows (main diagonal).
    pub fn correct(&self) -> usize {
        (0..self.classes.len()).map(|i| self.counts[i][i]).sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Classification report
// ---------------------------------------------------------------------------

/// Precision / recall / F1 for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: ClassLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true instances of this class.
    pub support: usize,
}

/// Unweighted or support-weighted mean of the per-class metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Averages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class precision/recall/F1 plus accuracy and macro / weighted
/// averages, derived entirely from a confusion matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: Averages,
    pub weighted_avg: Averages,
}

/// Division that maps 0/0 to 0.0 (empty classes score zero rather than NaN).
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> ClassificationReport {
        let n = cm.classes.len();
        let total = cm.total();

        let mut per_class = Vec::with_capacity(n);
        for (i, label) in cm.classes.iter().enumerate() {
            let tp = cm.counts[i][i];
            let support: usize = cm.counts[i].iter().sum();
            let predicted: usize = (0..n).map(|r| cm.counts[r][i]).sum();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };

            per_class.push(ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1,
                support,
            });
        }

        let macro_avg = Averages {
            precision: mean(per_class.iter().map(|m| m.precision)),
            recall: mean(per_class.iter().map(|m| m.recall)),
            f1: mean(per_class.iter().map(|m| m.f1)),
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_class
                    .iter()
                    .map(|m| f(m) * m.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = Averages {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
        };

        ClassificationReport {
            accuracy: ratio(cm.correct(), total),
            per_class,
            macro_avg,
            weighted_avg,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        0.0
    } else {
        collected.iter().sum::<f64>() / collected.len() as f64
    }
}
