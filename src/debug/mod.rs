//! Debug visualization of tile grids and grass scatter.

pub mod gizmo;
pub mod overlay;

pub use gizmo::{GizmoColor, GizmoPrimitive, GizmoRecorder, GizmoSink};
pub use overlay::{DebugOverlay, OverlayStyle};
