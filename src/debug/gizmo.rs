//! Gizmo drawing primitives and sinks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GizmoColor(pub [f32; 4]);

impl GizmoColor {
    pub const RED: Self = Self([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Self = Self([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Self = Self([0.0, 0.0, 1.0, 1.0]);
}

/// Receives debug shapes. Implemented by renderers and recorders.
pub trait GizmoSink {
    fn line(&mut self, start: Vec3, end: Vec3, color: GizmoColor);
    fn sphere(&mut self, center: Vec3, radius: f32, color: GizmoColor);
}

/// One recorded shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GizmoPrimitive {
    Line { start: Vec3, end: Vec3, color: GizmoColor },
    Sphere { center: Vec3, radius: f32, color: GizmoColor },
}

/// Sink that keeps every shape, for export or inspection.
#[derive(Clone, Debug, Default)]
pub struct GizmoRecorder {
    primitives: Vec<GizmoPrimitive>,
}

impl GizmoRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[GizmoPrimitive] {
        &self.primitives
    }

    pub fn into_primitives(self) -> Vec<GizmoPrimitive> {
        self.primitives
    }

    pub fn line_count(&self) -> usize {
        self.primitives
            .iter()
            .filter(|p| matches!(p, GizmoPrimitive::Line { .. }))
            .count()
    }

    pub fn sphere_count(&self) -> usize {
        self.primitives.len() - self.line_count()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl GizmoSink for GizmoRecorder {
    fn line(&mut self, start: Vec3, end: Vec3, color: GizmoColor) {
        self.primitives.push(GizmoPrimitive::Line { start, end, color });
    }

    fn sphere(&mut self, center: Vec3, radius: f32, color: GizmoColor) {
        self.primitives.push(GizmoPrimitive::Sphere { center, radius, color });
    }
}
