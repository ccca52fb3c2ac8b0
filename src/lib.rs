//! bloom-toolkit: color bloom post-processing for still images.
//!
//! The bloom is synthesized by solving a discrete Laplace boundary-value
//! problem around every pixel matching a chosen color: matching pixels act
//! as fixed-value (Dirichlet) boundaries, their diamond-shaped neighborhood
//! becomes the unknowns of a sparse linear system, and the per-channel
//! solutions are added back onto the image as an additive glow. The HDR
//! result is then brought back into displayable range by clamping or by
//! Reinhard tone mapping.
//!
//! Pipeline: match → expand neighborhood → index unknowns → assemble
//! equations → solve per channel → composite → tone map.

pub mod bloom;
pub mod color;
pub mod error;
pub mod float_image;
pub mod region;
pub mod solver;
pub mod system;
pub mod tonemap;

pub use bloom::{apply_bloom, bloom_image, BloomResult, BloomSettings};
pub use error::{BloomError, Result};
pub use float_image::FloatImage;
pub use tonemap::ToneMapping;
