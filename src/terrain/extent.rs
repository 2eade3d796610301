//! Terrain extent and the source trait that provides it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Anything that can report a terrain's world-space size.
///
/// Only `x` (width) and `z` (height) are used; `y` is the vertical range
/// and is ignored by the planners.
pub trait TerrainSource {
    fn size(&self) -> Vec3;

    /// Horizontal extent of this terrain.
    fn extent(&self) -> TerrainExtent {
        let size = self.size();
        TerrainExtent::new(size.x, size.z)
    }
}

/// World-space size of a terrain along X (`width`) and Z (`height`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainExtent {
    pub width: f32,
    pub height: f32,
}

impl TerrainExtent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Reject sizes that cannot be tiled: negative, NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(Error::Configuration(format!(
                "terrain size must be finite and non-negative, got {} x {}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// True when either axis has zero length.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

impl TerrainSource for TerrainExtent {
    fn size(&self) -> Vec3 {
        Vec3::new(self.width, 0.0, self.height)
    }

    fn extent(&self) -> TerrainExtent {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Heightfield {
        size: Vec3,
    }

    impl TerrainSource for Heightfield {
        fn size(&self) -> Vec3 {
            self.size
        }
    }

    #[test]
    fn test_extent_uses_x_and_z() {
        let terrain = Heightfield { size: Vec3::new(95.0, 600.0, 42.0) };
        assert_eq!(terrain.extent(), TerrainExtent::new(95.0, 42.0));
    }

    #[test]
    fn test_validate() {
        assert!(TerrainExtent::new(10.0, 0.0).validate().is_ok());
        assert!(matches!(
            TerrainExtent::new(-1.0, 5.0).validate(),
            Err(Error::Configuration(_))
        ));
        assert!(TerrainExtent::new(f32::NAN, 5.0).validate().is_err());
        assert!(TerrainExtent::new(5.0, f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_is_empty() {
        assert!(TerrainExtent::new(0.0, 10.0).is_empty());
        assert!(!TerrainExtent::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_serde() {
        let extent: TerrainExtent =
            serde_json::from_str(r#"{"width": 95.0, "height": 42.0}"#).unwrap();
        assert_eq!(extent, TerrainExtent::new(95.0, 42.0));
    }
}
