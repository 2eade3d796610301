//! Start corner convention for tile indexing.

use serde::{Deserialize, Serialize};

use crate::core::Error;

/// Terrain corner that tile anchors are measured from.
///
/// Discriminants match the `StartCorner` value the split kernel receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum StartCorner {
    #[default]
    BottomLeft = 0,
    BottomRight = 1,
    TopLeft = 2,
    TopRight = 3,
}

impl StartCorner {
    pub const ALL: [StartCorner; 4] = [
        StartCorner::BottomLeft,
        StartCorner::BottomRight,
        StartCorner::TopLeft,
        StartCorner::TopRight,
    ];

    /// Value passed to the split kernel.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Anchors run from the right edge (max X) towards the left.
    pub fn mirrors_x(self) -> bool {
        matches!(self, StartCorner::BottomRight | StartCorner::TopRight)
    }

    /// Anchors run from the top edge (max Z) downwards.
    pub fn mirrors_z(self) -> bool {
        matches!(self, StartCorner::TopLeft | StartCorner::TopRight)
    }
}

impl TryFrom<u32> for StartCorner {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        StartCorner::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| Error::Configuration(format!("start corner must be 0-3, got {}", value)))
    }
}
