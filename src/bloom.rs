//! Bloom pipeline orchestration.
//!
//! Ties the stages together: match the bloom color, expand the diamond
//! neighborhood, index the unknowns, assemble the Laplacian system, solve
//! once per channel, composite the solutions back onto the image, and tone
//! map the HDR result. One call, one image, no state kept across runs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::color::color_to_float;
use crate::error::Result;
use crate::float_image::FloatImage;
use crate::region::{expand_neighbors, find_matching_pixels, VariableMap};
use crate::solver::solve_channels;
use crate::system::assemble_system;
use crate::tonemap::{tone_map, ToneMapping};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloomSettings {
    /// How far the bloom spreads, in pixels of Manhattan distance
    pub radius: u32,
    /// 8-bit RGB color whose pixels seed the bloom
    pub color: [u8; 3],
    /// Per-component match tolerance in float color space (default: 0.001)
    pub tolerance: f64,
    /// HDR-to-LDR strategy applied after compositing (default: clamp)
    pub tone_mapping: ToneMapping,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            radius: 3,
            color: [255, 255, 255],
            tolerance: 0.001,
            tone_mapping: ToneMapping::Clamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BloomResult {
    /// Pixels that matched the bloom color
    pub source_pixels: usize,
    /// Unknowns in the solved system (0 means the bloom was a no-op)
    pub unknowns: usize,
}

/// Run the full bloom on an in-memory image, mutating it in place.
///
/// An empty source set (or an empty neighborhood, e.g. radius 0) is a valid
/// no-op: the image passes straight through to tone mapping. A singular
/// system aborts the whole run before anything is composited.
pub fn apply_bloom(image: &mut FloatImage, settings: &BloomSettings) -> Result<BloomResult> {
    let dims = image.dims();
    let target = color_to_float(settings.color);

    let sources = find_matching_pixels(image, target, settings.tolerance);
    info!(matched = sources.len(), "Matched bloom source pixels");

    let mut unknowns = 0;
    if !sources.is_empty() {
        let neighbors = expand_neighbors(&sources, dims, settings.radius);
        let variables = VariableMap::build(&neighbors, true);
        unknowns = variables.len();

        if !variables.is_empty() {
            let (matrix, base_rhs) = assemble_system(&variables, &sources, dims);
            debug!(unknowns, nnz = matrix.nnz(), "Assembled equation system");

            let [sol_r, sol_g, sol_b] = solve_channels(&matrix, &base_rhs, target)?;
            info!(unknowns, "Solved all three channels");

            for (coord, idx) in variables.iter() {
                image.add_rgb(coord, [sol_r[idx], sol_g[idx], sol_b[idx]]);
            }
        }
    }

    // clamping applies everywhere; Reinhard leaves the sources untouched
    // so the bloomed color itself stays exact
    let excluded = match settings.tone_mapping {
        ToneMapping::Clamp => HashSet::new(),
        ToneMapping::Reinhard => sources.clone(),
    };
    tone_map(image, settings.tone_mapping, &excluded);

    Ok(BloomResult {
        source_pixels: sources.len(),
        unknowns,
    })
}

/// File-to-file bloom: decode, apply, encode.
pub fn bloom_image(
    input_path: PathBuf,
    output_path: PathBuf,
    settings: BloomSettings,
) -> Result<BloomResult> {
    let mut image = FloatImage::open(&input_path)?;
    let result = apply_bloom(&mut image, &settings)?;
    image.save(&output_path)?;
    Ok(result)
}

/// Default output location: `stem_out.ext` next to the input file.
pub fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_out", stem);
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_settings(radius: u32) -> BloomSettings {
        BloomSettings {
            radius,
            color: [255, 0, 0],
            ..Default::default()
        }
    }

    #[test]
    fn test_bloom_3x3_single_source() {
        // center source, N=1: each edge midpoint solves to half the source
        // color, corners stay untouched
        let mut img = FloatImage::new(3, 3, 3).unwrap();
        img.set_rgb((1, 1), [1.0, 0.0, 0.0]);

        let result = apply_bloom(&mut img, &red_settings(1)).unwrap();
        assert_eq!(result.source_pixels, 1);
        assert_eq!(result.unknowns, 4);

        for coord in [(0, 1), (1, 0), (1, 2), (2, 1)] {
            let rgb = img.rgb(coord);
            assert!((rgb[0] - 0.5).abs() < 1e-9, "{:?}: {:?}", coord, rgb);
            assert!(rgb[1].abs() < 1e-9);
            assert!(rgb[2].abs() < 1e-9);
        }
        for corner in [(0, 0), (0, 2), (2, 0), (2, 2)] {
            assert_eq!(img.rgb(corner), [0.0, 0.0, 0.0]);
        }
        assert_eq!(img.rgb((1, 1)), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bloom_no_match_is_noop() {
        let mut img = FloatImage::new(4, 4, 3).unwrap();
        img.set_rgb((2, 2), [0.2, 0.4, 0.6]);
        let before = img.clone();

        let result = apply_bloom(&mut img, &red_settings(3)).unwrap();
        assert_eq!(result.source_pixels, 0);
        assert_eq!(result.unknowns, 0);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(img.rgb((i, j)), before.rgb((i, j)));
            }
        }
    }

    #[test]
    fn test_bloom_radius_zero_is_noop() {
        let mut img = FloatImage::new(3, 3, 3).unwrap();
        img.set_rgb((1, 1), [1.0, 0.0, 0.0]);
        let before = img.clone();

        let result = apply_bloom(&mut img, &red_settings(0)).unwrap();
        assert_eq!(result.source_pixels, 1);
        assert_eq!(result.unknowns, 0);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(img.rgb((i, j)), before.rgb((i, j)));
            }
        }
    }

    #[test]
    fn test_bloom_reinhard_keeps_sources_exact() {
        let mut img = FloatImage::new(3, 3, 3).unwrap();
        img.set_rgb((1, 1), [1.0, 0.0, 0.0]);

        let settings = BloomSettings {
            radius: 1,
            color: [255, 0, 0],
            tone_mapping: ToneMapping::Reinhard,
            ..Default::default()
        };
        apply_bloom(&mut img, &settings).unwrap();

        // source excluded from the remap
        assert_eq!(img.rgb((1, 1)), [1.0, 0.0, 0.0]);
        for i in 0..3 {
            for j in 0..3 {
                for c in img.rgb((i, j)) {
                    assert!(c <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("shots/scene.png")),
            PathBuf::from("shots/scene_out.png")
        );
        assert_eq!(
            derive_output_path(Path::new("scene.jpg")),
            PathBuf::from("scene_out.jpg")
        );
        assert_eq!(
            derive_output_path(Path::new("scene")),
            PathBuf::from("scene_out")
        );
    }

    #[test]
    fn test_bloom_image_file_roundtrip() {
        use image::{Rgb, RgbImage};

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("in_out.png");

        let mut src = RgbImage::new(3, 3);
        src.put_pixel(1, 1, Rgb([255, 0, 0]));
        src.save(&input).unwrap();

        let result = bloom_image(input, output.clone(), red_settings(1)).unwrap();
        assert_eq!(result.source_pixels, 1);
        assert_eq!(result.unknowns, 4);

        let out = image::open(&output).unwrap().to_rgb8();
        assert_eq!(out.get_pixel(1, 1), &Rgb([255, 0, 0]));
        // 0.5 quantizes to round(127.5) = 128
        assert_eq!(out.get_pixel(1, 0), &Rgb([128, 0, 0]));
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }
}
