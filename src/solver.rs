//! Linear solves for the assembled bloom system.
//!
//! The matrix is square and generally non-symmetric (boundary truncation at
//! the bloom rim breaks symmetry), so the solve goes through an LU
//! decomposition. Problem sizes are small by design — the bloom radius is
//! a handful of pixels — which makes a dense direct solve adequate.
//!
//! The three color channels share one immutable system and differ only in
//! the rhs scaling, so they are solved in parallel and joined before
//! compositing.

use nalgebra::DVector;
use rayon::join;

use crate::error::{BloomError, Result};
use crate::system::TripletMatrix;

/// Solve `matrix * x = rhs` for one channel.
///
/// A zero-sized system is vacuously solved by an empty vector. A singular
/// matrix is a fatal condition reported to the caller, never retried.
pub fn solve(matrix: &TripletMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
    let (n, m) = matrix.shape();
    if n != m {
        return Err(BloomError::InvalidParameter(format!(
            "Equation system is not square: {}x{}",
            n, m
        )));
    }
    if rhs.len() != n {
        return Err(BloomError::InvalidParameter(format!(
            "Right-hand side length {} does not match {} unknowns",
            rhs.len(),
            n
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let dense = matrix.to_dense();
    let rhs = DVector::from_column_slice(rhs);
    let solution = dense
        .lu()
        .solve(&rhs)
        .ok_or_else(|| BloomError::SingularSystem(format!("LU solve failed, {} unknowns", n)))?;
    Ok(solution.iter().copied().collect())
}

/// Solve the system once per RGB channel.
///
/// The base rhs assumes a unit source value; each channel scales it by the
/// bloom color's component before solving. Any failed channel aborts the
/// run — compositing a partial subset of channels would skew color balance.
pub fn solve_channels(
    matrix: &TripletMatrix,
    base_rhs: &[f64],
    color: [f64; 3],
) -> Result<[Vec<f64>; 3]> {
    let scaled = |component: f64| -> Vec<f64> {
        base_rhs.iter().map(|v| v * component).collect()
    };
    let (rhs_r, rhs_g, rhs_b) = (scaled(color[0]), scaled(color[1]), scaled(color[2]));

    let (sol_r, (sol_g, sol_b)) = join(
        || solve(matrix, &rhs_r),
        || join(|| solve(matrix, &rhs_g), || solve(matrix, &rhs_b)),
    );
    Ok([sol_r?, sol_g?, sol_b?])
}
