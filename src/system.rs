//! Discrete Laplacian equation assembly.
//!
//! Each neighborhood pixel becomes one unknown of a sparse linear system
//! approximating the 5-point Laplacian stencil. Boundary handling per
//! stencil arm:
//!
//! - arm leaves the image: the arm is dropped and its opposite arm on the
//!   same axis is doubled (the missing point is mirrored across the edge);
//! - arm lands on a source pixel: Dirichlet condition, the coefficient is
//!   negated and folded into the right-hand side (the source value is taken
//!   as 1.0 here; the solver scales the rhs per color channel);
//! - arm lands on an in-bounds pixel outside the neighborhood: the arm is
//!   dropped with no mirroring. This asymmetric truncation at the outer rim
//!   is intentional and kept as-is;
//! - otherwise the arm references another unknown and becomes an
//!   off-diagonal entry.
//!
//! All four arms of an unknown share one coefficient table and must be
//! processed before the row is emitted, so that edge mirroring from one arm
//! is visible to its axis partner.

use std::collections::HashSet;

use nalgebra::DMatrix;

use crate::float_image::in_bounds;
use crate::region::{PixelCoord, VariableMap};

/// Growable row/col/value triplet store for a sparse matrix.
///
/// Duplicate positions accumulate when the matrix is materialized.
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
    shape: (usize, usize),
}

impl TripletMatrix {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
            shape,
        }
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .zip(self.values.iter())
            .map(|((&r, &c), &v)| (r, c, v))
    }

    /// Materialize into a dense matrix for the direct solve.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.shape.0, self.shape.1);
        for (r, c, v) in self.triplets() {
            dense[(r, c)] += v;
        }
        dense
    }
}

/// The four arms of the 5-point stencil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arm {
    RowNext,
    RowPrev,
    ColNext,
    ColPrev,
}

/// Processing order; both arms of one axis are adjacent so the mirroring
/// interplay stays easy to follow.
const ARM_ORDER: [Arm; 4] = [Arm::RowNext, Arm::RowPrev, Arm::ColNext, Arm::ColPrev];

impl Arm {
    fn opposite(self) -> Arm {
        match self {
            Arm::RowNext => Arm::RowPrev,
            Arm::RowPrev => Arm::RowNext,
            Arm::ColNext => Arm::ColPrev,
            Arm::ColPrev => Arm::ColNext,
        }
    }

    /// Signed coordinate one step along this arm.
    fn step(self, coord: PixelCoord) -> (i64, i64) {
        let (i, j) = (coord.0 as i64, coord.1 as i64);
        match self {
            Arm::RowNext => (i + 1, j),
            Arm::RowPrev => (i - 1, j),
            Arm::ColNext => (i, j + 1),
            Arm::ColPrev => (i, j - 1),
        }
    }
}

/// Per-unknown stencil coefficients with one named field per arm.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StencilCoefficients {
    row_next: f64,
    row_prev: f64,
    col_next: f64,
    col_prev: f64,
}

impl StencilCoefficients {
    fn new() -> Self {
        Self {
            row_next: 1.0,
            row_prev: 1.0,
            col_next: 1.0,
            col_prev: 1.0,
        }
    }

    fn get(&self, arm: Arm) -> f64 {
        match arm {
            Arm::RowNext => self.row_next,
            Arm::RowPrev => self.row_prev,
            Arm::ColNext => self.col_next,
            Arm::ColPrev => self.col_prev,
        }
    }

    fn set(&mut self, arm: Arm, value: f64) {
        match arm {
            Arm::RowNext => self.row_next = value,
            Arm::RowPrev => self.row_prev = value,
            Arm::ColNext => self.col_next = value,
            Arm::ColPrev => self.col_prev = value,
        }
    }
}

/// Resolve the stencil coefficients of one unknown against image bounds,
/// source pixels and the variable map.
fn stencil_coefficients(
    coord: PixelCoord,
    variables: &VariableMap,
    sources: &HashSet<PixelCoord>,
    dims: (usize, usize),
) -> StencilCoefficients {
    let mut coefs = StencilCoefficients::new();
    for arm in ARM_ORDER {
        let contiguous = arm.step(coord);
        if !in_bounds(contiguous, dims) {
            coefs.set(arm, 0.0);
            // mirror across the edge: the opposite arm counts double,
            // whatever its current sign
            coefs.set(arm.opposite(), 2.0 * coefs.get(arm.opposite()));
            continue;
        }
        let contiguous = (contiguous.0 as usize, contiguous.1 as usize);
        if sources.contains(&contiguous) {
            coefs.set(arm, -coefs.get(arm));
        } else if !variables.contains(contiguous) {
            // outside the bloom radius: drop the arm without mirroring
            coefs.set(arm, 0.0);
        }
    }
    coefs
}

/// Build the sparse system and its base right-hand side.
///
/// One equation per unknown: the diagonal carries the center coefficient
/// −4, positive arm coefficients become off-diagonal entries, and negative
/// ones (Dirichlet arms) accumulate into the rhs. The rhs assumes a unit
/// source value; the solver scales it by the channel's color component.
pub fn assemble_system(
    variables: &VariableMap,
    sources: &HashSet<PixelCoord>,
    dims: (usize, usize),
) -> (TripletMatrix, Vec<f64>) {
    let n = variables.len();
    let mut matrix = TripletMatrix::new((n, n));
    let mut rhs = vec![0.0; n];

    for (coord, row) in variables.iter() {
        matrix.push(row, row, -4.0);

        let coefs = stencil_coefficients(coord, variables, sources, dims);
        for arm in ARM_ORDER {
            let value = coefs.get(arm);
            if value < 0.0 {
                rhs[row] += value;
            } else if value > 0.0 {
                let contiguous = arm.step(coord);
                let contiguous = (contiguous.0 as usize, contiguous.1 as usize);
                if let Some(col) = variables.index(contiguous) {
                    matrix.push(row, col, value);
                }
            }
        }
    }

    (matrix, rhs)
}
