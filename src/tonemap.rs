//! HDR to LDR conversion after bloom compositing.
//!
//! Two strategies: plain per-component clamping, or the extended Reinhard
//! operator relative to the image's maximum luminance. Both accept an
//! exclusion set that is left untouched (the bloom sources, for Reinhard —
//! their colors are already displayable and define the bloom identity).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::color::{clamp_color, reinhard_map};
use crate::float_image::FloatImage;
use crate::region::PixelCoord;

/// Strategy for bringing blown-out colors back into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneMapping {
    #[default]
    Clamp,
    Reinhard,
}

/// Map every pixel of the image into displayable range, skipping the
/// excluded coordinates.
///
/// Reinhard scans the whole image (exclusions included) for the maximum
/// luminance before remapping.
pub fn tone_map(image: &mut FloatImage, mapping: ToneMapping, excluded: &HashSet<PixelCoord>) {
    match mapping {
        ToneMapping::Clamp => map_pixels(image, excluded, clamp_color),
        ToneMapping::Reinhard => {
            let max_lum = image.max_luminance();
            map_pixels(image, excluded, |color| reinhard_map(color, max_lum));
        }
    }
}

fn map_pixels<F>(image: &mut FloatImage, excluded: &HashSet<PixelCoord>, mapping: F)
where
    F: Fn([f64; 3]) -> [f64; 3],
{
    let (rows, cols) = image.dims();
    for i in 0..rows {
        for j in 0..cols {
            if !excluded.contains(&(i, j)) {
                image.set_rgb((i, j), mapping(image.rgb((i, j))));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_leaves_ldr_untouched() {
        let mut img = FloatImage::new(2, 2, 3).unwrap();
        img.set_rgb((0, 0), [0.3, 0.6, 0.9]);
        let before = img.clone();
        tone_map(&mut img, ToneMapping::Clamp, &HashSet::new());
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(img.rgb((i, j)), before.rgb((i, j)));
            }
        }
    }

    #[test]
    fn test_clamp_caps_hdr() {
        let mut img = FloatImage::new(1, 2, 3).unwrap();
        img.set_rgb((0, 0), [1.4, 0.5, 2.0]);
        tone_map(&mut img, ToneMapping::Clamp, &HashSet::new());
        assert_eq!(img.rgb((0, 0)), [1.0, 0.5, 1.0]);
    }

    #[test]
    fn test_excluded_pixels_untouched() {
        let mut img = FloatImage::new(1, 2, 3).unwrap();
        img.set_rgb((0, 0), [1.5, 1.5, 1.5]);
        img.set_rgb((0, 1), [1.5, 1.5, 1.5]);
        let excluded: HashSet<PixelCoord> = [(0, 0)].into_iter().collect();
        tone_map(&mut img, ToneMapping::Clamp, &excluded);
        assert_eq!(img.rgb((0, 0)), [1.5, 1.5, 1.5]);
        assert_eq!(img.rgb((0, 1)), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_reinhard_brings_image_into_range() {
        let mut img = FloatImage::new(2, 2, 3).unwrap();
        img.set_rgb((0, 0), [2.0, 1.5, 0.5]);
        img.set_rgb((1, 1), [0.8, 0.8, 0.8]);
        tone_map(&mut img, ToneMapping::Reinhard, &HashSet::new());
        for i in 0..2 {
            for j in 0..2 {
                for c in img.rgb((i, j)) {
                    assert!(c <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_reinhard_leaves_black_untouched() {
        // near-zero luminance short-circuits the luminance rescale
        let mut img = FloatImage::new(1, 2, 3).unwrap();
        img.set_rgb((0, 1), [1.0, 1.0, 1.0]);
        tone_map(&mut img, ToneMapping::Reinhard, &HashSet::new());
        assert_eq!(img.rgb((0, 0)), [0.0, 0.0, 0.0]);
    }
}
