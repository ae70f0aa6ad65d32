//! Regular 2D sample grids and their local neighborhoods.
//!
//! `Grid<T>` stores samples in row-major order over a world-space bounding
//! box. Differential operators are available for `f32` grids.

mod field;
pub mod neighbors;

pub use field::{Grid, GridError};
pub use neighbors::{Cell, Topology};

pub(crate) use field::value_range;
