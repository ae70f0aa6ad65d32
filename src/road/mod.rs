//! Least-cost road routing and carving.
//!
//! A road query builds a weighted graph over the Diamond-16 stencil, solves a
//! single-source shortest path from the start cell, and cuts a shallow
//! corridor along the result.

mod carve;
mod config;
mod graph;

pub use carve::{carve_road, ROAD_DEPRESSION};
pub use config::{RoadConfig, RoadCost};
pub use graph::{Edge, Path, RoadGraph, ShortestPaths};

use thiserror::Error;

/// Errors that can occur while routing a road.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoadError {
    #[error("Cell ({i}, {j}) lies outside the {nx}x{ny} grid")]
    OutOfBounds {
        i: usize,
        j: usize,
        nx: usize,
        ny: usize,
    },
    #[error("No route from ({}, {}) to ({}, {})", .start.0, .start.1, .goal.0, .goal.1)]
    Unreachable {
        start: (usize, usize),
        goal: (usize, usize),
    },
}
