/// Rendering surface. Pure consumer of [`crate::state::AppState`] and the
/// analysis values produced by the `ml` layer.
pub mod panels;
pub mod report;
