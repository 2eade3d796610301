//! Grid lines and marker spheres for planner results.

use glam::Vec3;

use super::gizmo::{GizmoColor, GizmoSink};
use crate::compute::kernels::is_culled;
use crate::grass::GrassPositions;
use crate::grid::TileLayout;

/// Colors and marker sizes for the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub grid_color: GizmoColor,
    pub tile_color: GizmoColor,
    pub tile_radius: f32,
    pub grass_color: GizmoColor,
    pub grass_radius: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            grid_color: GizmoColor::GREEN,
            tile_color: GizmoColor::RED,
            tile_radius: 0.5,
            grass_color: GizmoColor::BLUE,
            grass_radius: 0.2,
        }
    }
}

/// Read-only visualization of a split result.
#[derive(Clone, Debug, Default)]
pub struct DebugOverlay {
    style: OverlayStyle,
}

impl DebugOverlay {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Draw grid lines, tile anchors and visible grass blades.
    ///
    /// Nothing is drawn until tile anchors exist.
    pub fn draw(&self, tiles: Option<&TileLayout>, grass: Option<&GrassPositions>, sink: &mut dyn GizmoSink) {
        let Some(tiles) = tiles.filter(|t| !t.positions().is_empty()) else {
            return;
        };

        let grid = tiles.grid();
        let size = grid.tile_size();
        let covered = grid.covered_extent();

        for z in 0..=grid.rows() {
            let depth = z as f32 * size;
            sink.line(Vec3::new(0.0, 0.0, depth), Vec3::new(covered.width, 0.0, depth), self.style.grid_color);
        }
        for x in 0..=grid.columns() {
            let across = x as f32 * size;
            sink.line(Vec3::new(across, 0.0, 0.0), Vec3::new(across, 0.0, covered.height), self.style.grid_color);
        }

        for &anchor in tiles.positions().iter() {
            sink.sphere(anchor, self.style.tile_radius, self.style.tile_color);
        }

        if let Some(grass) = grass {
            for &blade in grass.iter().filter(|p| !is_culled(**p)) {
                sink.sphere(blade, self.style.grass_radius, self.style.grass_color);
            }
        }
    }
}
