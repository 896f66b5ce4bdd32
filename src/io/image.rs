//! PNG adapters turning class maps and quality maps into engine input
//!
//! A class map holds one unit per pixel: every distinct opaque colour is a class
//! and transparent pixels are units without mapped data. A quality map is a
//! grayscale image whose luminance becomes the per-cell measure value.
//!
//! A pixel carries one colour, so every unit decoded from a class map belongs
//! to at most one class with a count of 1. Tables built from PNG input therefore
//! always report zero shared classes and one data point per member cell.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use image::{GrayImage, RgbaImage};
use ndarray::Array2;

use crate::analysis::classes::ClassMembership;
use crate::io::error::{Result, SomGridError};
use crate::spatial::grid::Unit;

/// Units and class membership decoded from a class map image
#[derive(Debug, Clone)]
pub struct ClassMap {
    /// One unit per pixel, row-major
    pub units: Vec<Unit>,
    /// Class counts per unit with per-class centroids
    pub membership: ClassMembership,
    /// Colour of each class, indexed by class
    pub palette: Vec<[u8; 4]>,
}

/// Load a class map from a PNG file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_class_map(path: &Path) -> Result<ClassMap> {
    let img = image::open(path).map_err(|e| SomGridError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    class_map_from_rgba(&img.to_rgba8())
}

/// Decode a class map from an RGBA buffer
///
/// # Errors
///
/// Returns an error if the image has no pixels
pub fn class_map_from_rgba(img: &RgbaImage) -> Result<ClassMap> {
    if img.width() == 0 || img.height() == 0 {
        return Err(SomGridError::InvalidSourceData {
            reason: "class map image has no pixels".to_string(),
        });
    }

    // Sorted colours keep class indices reproducible
    let palette: Vec<[u8; 4]> = img
        .pixels()
        .map(|pixel| pixel.0)
        .filter(|rgba| rgba[3] > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let class_of: HashMap<[u8; 4], usize> = palette
        .iter()
        .enumerate()
        .map(|(class, &colour)| (colour, class))
        .collect();

    let pixel_count = img.width() as usize * img.height() as usize;
    let mut units = Vec::with_capacity(pixel_count);
    let mut counts = Array2::zeros((pixel_count, palette.len()));
    let mut sums = vec![[0.0_f64; 2]; palette.len()];
    let mut totals = vec![0_usize; palette.len()];

    for (unit, (x, y, pixel)) in img.enumerate_pixels().enumerate() {
        let class = class_of.get(&pixel.0).copied();
        units.push(Unit::new(x as i32, y as i32, usize::from(class.is_some())));

        let Some(class) = class else {
            continue;
        };
        if let Some(count) = counts.get_mut([unit, class]) {
            *count += 1;
        }
        if let (Some(sum), Some(total)) = (sums.get_mut(class), totals.get_mut(class)) {
            sum[0] += f64::from(x);
            sum[1] += f64::from(y);
            *total += 1;
        }
    }

    let centroids = sums
        .iter()
        .zip(&totals)
        .map(|(sum, &total)| {
            let n = total.max(1) as f64;
            [sum[0] / n, sum[1] / n]
        })
        .collect();

    Ok(ClassMap {
        units,
        membership: ClassMembership::new(counts, centroids)?,
        palette,
    })
}

/// Load a quality measure from a grayscale PNG file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_quality_map(path: &Path) -> Result<Array2<f64>> {
    let img = image::open(path).map_err(|e| SomGridError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(quality_from_luma(&img.to_luma8()))
}

/// Luminance scaled into [0, 1], indexed `[row, column]`
pub fn quality_from_luma(img: &GrayImage) -> Array2<f64> {
    Array2::from_shape_fn(
        (img.height() as usize, img.width() as usize),
        |(y, x)| {
            img.get_pixel_checked(x as u32, y as u32)
                .map_or(f64::NAN, |pixel| f64::from(pixel.0[0]) / 255.0)
        },
    )
}
