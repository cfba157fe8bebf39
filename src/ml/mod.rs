/// Model layer: persisted classifiers and the analysis pipeline.
///
/// Architecture:
/// ```text
///   models/best_model_<target>.json
///              │
///              ▼
///        ┌──────────┐
///        │ registry  │  locate + memoize Classifier artifacts
///        └──────────┘
///              │
///              ▼
///   ┌────────────────────┐
///   │ align → classifier  │  reconcile features, predict
///   └────────────────────┘
///              │
///              ▼
///   ┌────────────────────┐
///   │ metrics / stats     │  confusion matrix, report, correlations
///   └────────────────────┘
/// ```
/// Everything in this layer is independent of the rendering surface.
pub mod align;
pub mod analysis;
pub mod classifier;
pub mod metrics;
pub mod registry;
pub mod stats;

use std::fmt;

// ---------------------------------------------------------------------------
// TargetLabel – the fixed set of monitored condition variables
// ---------------------------------------------------------------------------

/// A condition variable of the hydraulic test rig that a classifier
/// predicts. The set is fixed; each target has its own persisted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetLabel {
    CoolerCond,
    ValveCond,
    PumpLeak,
    AccumulatorPress,
}

impl TargetLabel {
    pub const ALL: [TargetLabel; 4] = [
        TargetLabel::CoolerCond,
        TargetLabel::ValveCond,
        TargetLabel::PumpLeak,
        TargetLabel::AccumulatorPress,
    ];

    /// The dataset column holding this target's class codes.
    pub fn column_name(self) -> &'static str {
        match self {
            TargetLabel::CoolerCond => "Cooler_Cond",
            TargetLabel::ValveCond => "Valve_Cond",
            TargetLabel::PumpLeak => "Pump_Leak",
            TargetLabel::AccumulatorPress => "Accumulator_Press",
        }
    }

    /// Human-readable name for the UI.
    pub fn display_name(self) -> &'static str {
        match self {
            TargetLabel::CoolerCond => "Cooler condition",
            TargetLabel::ValveCond => "Valve condition",
            TargetLabel::PumpLeak => "Pump leakage",
            TargetLabel::AccumulatorPress => "Accumulator pressure",
        }
    }

    /// Stem used to derive the artifact file name.
    pub fn artifact_stem(self) -> String {
        self.column_name().to_ascii_lowercase()
    }
}

impl fmt::Display for TargetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
