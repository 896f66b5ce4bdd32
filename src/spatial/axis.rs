//! One-dimensional partitioning of a grid axis into a middle band and two graded sides
//!
//! The middle band starts at the center (two cells for even lengths, one for odd)
//! and grows by a cell on each side while it stays within a quarter of the axis.
//! Cells outside the band receive strength levels 1..=8 that grow toward the border.

use std::iter;
use std::ops::Range;

use crate::io::configuration::STRENGTH_LEVELS;
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::region::{AxisSide, AxisStrength};

/// Inclusive bounds of the middle band of an axis
///
/// # Errors
///
/// Returns an error if `len` is zero
pub fn middle_band(len: usize) -> Result<(usize, usize)> {
    if len == 0 {
        return Err(invalid_parameter(
            "len",
            &len,
            &"axis length must be positive",
        ));
    }

    let (mut lo, mut hi) = if len % 2 == 0 {
        (len / 2 - 1, len / 2)
    } else {
        (len / 2, len / 2)
    };

    let limit = len / 4;
    while lo > 0 && hi + 1 < len && hi - lo + 3 <= limit {
        lo -= 1;
        hi += 1;
    }

    Ok((lo, hi))
}

/// Index ranges of the near side, middle band and far side of an axis
///
/// # Errors
///
/// Returns an error if `len` is zero
pub fn band_ranges(len: usize) -> Result<[Range<usize>; 3]> {
    let (lo, hi) = middle_band(len)?;
    Ok([0..lo, lo..hi + 1, hi + 1..len])
}

/// Strength levels for the `n` cells of one side of an axis
///
/// The near side is ordered from the border inward, the far side from the band
/// outward, so both read naturally when laid along the axis. Levels come in runs
/// of `n / 8` cells; leftover cells next to the band take level 1. Sides shorter
/// than eight cells use one cell per level, starting at 8.
pub fn side_partition(n: usize, side: AxisSide) -> Vec<u8> {
    if side == AxisSide::Middle {
        return vec![0; n];
    }

    let levels = usize::from(STRENGTH_LEVELS);
    let span = n / levels;

    let mut outward_in: Vec<u8> = if span == 0 {
        (0..n).map(|i| STRENGTH_LEVELS - i as u8).collect()
    } else {
        let mut graded = Vec::with_capacity(n);
        for level in (1..=STRENGTH_LEVELS).rev() {
            graded.extend(iter::repeat_n(level, span));
        }
        graded.extend(iter::repeat_n(1, n - span * levels));
        graded
    };

    if side == AxisSide::Far {
        outward_in.reverse();
    }
    outward_in
}

/// Strength of every cell along an axis of length `len`
///
/// # Errors
///
/// Returns an error if `len` is zero
pub fn strength_profile(len: usize) -> Result<Vec<AxisStrength>> {
    let [near, middle, far] = band_ranges(len)?;

    let near_levels = side_partition(near.len(), AxisSide::Near);
    let far_levels = side_partition(far.len(), AxisSide::Far);

    let profile = near_levels
        .into_iter()
        .map(|level| AxisStrength {
            side: AxisSide::Near,
            level,
        })
        .chain(iter::repeat_n(AxisStrength::MIDDLE, middle.len()))
        .chain(far_levels.into_iter().map(|level| AxisStrength {
            side: AxisSide::Far,
            level,
        }))
        .collect();

    Ok(profile)
}
