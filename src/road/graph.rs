//! Weighted cell graph and single-source shortest paths.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rayon::prelude::*;

use crate::grid::Topology;
use crate::terrain::TerrainField;

use super::{RoadCost, RoadError};

/// Directed edge to `target` (a flat cell index).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: usize,
    pub weight: f64,
}

/// Adjacency lists over every cell of a field, indexed like the grid.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    nx: usize,
    ny: usize,
    adjacency: Vec<Vec<Edge>>,
}

impl RoadGraph {
    /// Builds the Diamond-16 graph of `field` weighted by `cost`.
    ///
    /// The edge from `c` to `n` has weight
    /// `|point(n) - point(c)| * (1 + |slope(n)| * slope_cost + water_term(c))`.
    pub fn build(field: &TerrainField, cost: &RoadCost) -> Self {
        let heights = field.heights();
        let water = field.water();

        let adjacency = (0..heights.len())
            .into_par_iter()
            .map(|idx| {
                let (i, j) = heights.coords(idx);
                let origin = heights.point(i, j);
                let water_term = cost.water_term(water.data()[idx]);

                Topology::Diamond16
                    .offsets()
                    .iter()
                    .filter_map(|&(di, dj)| heights.offset(i, j, di, dj))
                    .map(|(ni, nj)| {
                        let length = origin.distance(heights.point(ni, nj));
                        let factor =
                            1.0 + heights.slope(ni, nj).abs() * cost.slope_cost + water_term;
                        Edge {
                            target: heights.index(ni, nj),
                            weight: (length * factor) as f64,
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            nx: heights.nx(),
            ny: heights.ny(),
            adjacency,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Outgoing edges of vertex `v`.
    pub fn edges(&self, v: usize) -> &[Edge] {
        &self.adjacency[v]
    }

    /// Dijkstra from `source` over the whole graph.
    pub fn shortest_paths(&self, source: usize) -> ShortestPaths {
        assert!(source < self.vertex_count(), "source vertex out of range");

        let n = self.vertex_count();
        let mut distance = vec![f64::INFINITY; n];
        let mut previous = vec![None; n];
        let mut heap = BinaryHeap::new();

        distance[source] = 0.0;
        heap.push(HeapItem {
            distance: 0.0,
            vertex: source,
        });

        while let Some(HeapItem { distance: d, vertex: u }) = heap.pop() {
            // stale entry
            if d > distance[u] {
                continue;
            }
            for edge in &self.adjacency[u] {
                let candidate = d + edge.weight;
                if candidate < distance[edge.target] {
                    distance[edge.target] = candidate;
                    previous[edge.target] = Some(u);
                    heap.push(HeapItem {
                        distance: candidate,
                        vertex: edge.target,
                    });
                }
            }
        }

        ShortestPaths {
            source,
            distance,
            previous,
        }
    }

    /// Cheapest path between two cells given as `(i, j)`.
    pub fn shortest_path(
        &self,
        start: (usize, usize),
        goal: (usize, usize),
    ) -> Result<Path, RoadError> {
        let source = self.vertex(start)?;
        let target = self.vertex(goal)?;

        let tree = self.shortest_paths(source);
        let vertices = tree
            .path_to(target)
            .ok_or(RoadError::Unreachable { start, goal })?;

        Ok(Path {
            cells: vertices.iter().map(|&v| (v % self.nx, v / self.nx)).collect(),
            costs: vertices.iter().map(|&v| tree.distance[v]).collect(),
        })
    }

    fn vertex(&self, (i, j): (usize, usize)) -> Result<usize, RoadError> {
        if i < self.nx && j < self.ny {
            Ok(j * self.nx + i)
        } else {
            Err(RoadError::OutOfBounds {
                i,
                j,
                nx: self.nx,
                ny: self.ny,
            })
        }
    }
}

/// Result of a single-source shortest path search.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    source: usize,
    /// Cheapest known cost from the source (`INFINITY` if unreached).
    pub distance: Vec<f64>,
    /// Predecessor on the cheapest path (`None` for the source and unreached vertices).
    pub previous: Vec<Option<usize>>,
}

impl ShortestPaths {
    pub fn source(&self) -> usize {
        self.source
    }

    /// Vertices from the source to `target`, inclusive.
    ///
    /// Returns `None` when the predecessor chain does not lead back to the
    /// source.
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.previous[current]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// A routed road: cells from start to goal with the cumulative cost at each.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub cells: Vec<(usize, usize)>,
    pub costs: Vec<f64>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.last().copied().unwrap_or(0.0)
    }
}

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    distance: f64,
    vertex: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Min-heap by (distance, vertex) via reversed ordering.
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}
