//! Terrasplit - terrain tiling and grass scatter planning
//!
//! A [`grid::GridPlanner`] splits a terrain into square tiles and places one
//! anchor per tile; a [`grass::GrassScatterPlanner`] fills each tile with
//! candidate blade positions. Both run their kernels on a
//! [`compute::ComputeDevice`], either [`compute::CpuDevice`] or
//! [`compute::GpuDevice`].

pub mod core;
pub mod terrain;
pub mod compute;
pub mod grid;
pub mod grass;
pub mod splitter;
pub mod debug;
