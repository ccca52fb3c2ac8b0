//! Bloom region discovery.
//!
//! Three steps feed the equation assembler:
//! 1. Find every pixel matching the bloom color (the sources, which become
//!    fixed-value boundary conditions).
//! 2. Expand the sources into their diamond-shaped neighborhood within
//!    Manhattan distance N (the unknowns of the linear system).
//! 3. Assign each neighborhood pixel a dense zero-based variable index.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::color::colors_match;
use crate::float_image::{in_bounds, FloatImage};

/// A (row, col) pixel position.
pub type PixelCoord = (usize, usize);

/// Scan the image for pixels whose color is within `delta` of `target`
/// on all three RGB components.
///
/// The scan is exact (no early exit) and row-parallel; an empty result is
/// valid and makes the whole bloom a no-op downstream.
pub fn find_matching_pixels(
    image: &FloatImage,
    target: [f64; 3],
    delta: f64,
) -> HashSet<PixelCoord> {
    let (rows, cols) = image.dims();
    (0..rows)
        .into_par_iter()
        .flat_map_iter(|i| {
            (0..cols)
                .filter(move |&j| colors_match(image.rgb((i, j)), target, delta))
                .map(move |j| (i, j))
        })
        .collect()
}

/// Integer offsets (di, dj) with Manhattan norm between 1 and `n` inclusive.
///
/// The zero offset is excluded, so the mask has exactly 2·n·(n+1) entries.
pub fn diamond_mask(n: u32) -> Vec<(i64, i64)> {
    let n = n as i64;
    let mut mask = Vec::with_capacity((2 * n * (n + 1)) as usize);
    for i in -n..=n {
        let k = n - i.abs();
        for j in -k..=k {
            if (i, j) != (0, 0) {
                mask.push((i, j));
            }
        }
    }
    mask
}

/// Collect the pixels within Manhattan distance `radius` of any source.
///
/// Out-of-bounds candidates and the sources themselves are excluded, so the
/// result is disjoint from `sources` and entirely inside the image.
pub fn expand_neighbors(
    sources: &HashSet<PixelCoord>,
    dims: (usize, usize),
    radius: u32,
) -> HashSet<PixelCoord> {
    let mask = diamond_mask(radius);
    let mut neighbors = HashSet::new();
    for &(si, sj) in sources {
        for &(di, dj) in &mask {
            let candidate = (si as i64 + di, sj as i64 + dj);
            if !in_bounds(candidate, dims) {
                continue;
            }
            let candidate = (candidate.0 as usize, candidate.1 as usize);
            if !sources.contains(&candidate) {
                neighbors.insert(candidate);
            }
        }
    }
    neighbors
}

/// Bijection from neighborhood pixels to linear-system variable indices
/// [0, n).
///
/// With `sort` enabled, coordinates are ordered lexicographically by
/// (row, col) before numbering, which pins the unknown ordering and makes
/// solves reproducible.
#[derive(Debug, Clone)]
pub struct VariableMap {
    coords: Vec<PixelCoord>,
    indices: HashMap<PixelCoord, usize>,
}

impl VariableMap {
    pub fn build(neighbors: &HashSet<PixelCoord>, sort: bool) -> Self {
        let mut coords: Vec<PixelCoord> = neighbors.iter().copied().collect();
        if sort {
            coords.sort_unstable();
        }
        let indices = coords
            .iter()
            .enumerate()
            .map(|(idx, &coord)| (coord, idx))
            .collect();
        Self { coords, indices }
    }

    /// Number of unknowns.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Variable index of a coordinate, if it is part of the neighborhood.
    pub fn index(&self, coord: PixelCoord) -> Option<usize> {
        self.indices.get(&coord).copied()
    }

    pub fn contains(&self, coord: PixelCoord) -> bool {
        self.indices.contains_key(&coord)
    }

    /// Iterate (coordinate, index) pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PixelCoord, usize)> + '_ {
        self.coords.iter().copied().enumerate().map(|(i, c)| (c, i))
    }
}
