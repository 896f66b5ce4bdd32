//! Unit tests mirroring the `src` layout, plus shared map fixtures

mod analysis;
mod spatial;

use somgrid::analysis::classes::ClassMembership;
use somgrid::spatial::Unit;

/// Units of a fully populated `width x height` map in row-major order
pub fn square_units(width: usize, height: usize) -> Vec<Unit> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| Unit::new(x as i32, y as i32, 1)))
        .collect()
}

/// Units of a fully populated map whose coordinates start at `origin`
pub fn offset_units(width: usize, height: usize, origin: [i32; 2]) -> Vec<Unit> {
    square_units(width, height)
        .into_iter()
        .map(|unit| Unit::new(unit.x + origin[0], unit.y + origin[1], unit.hits))
        .collect()
}

/// Same counts with every centroid moved into a frame starting at `origin`
pub fn shift_centroids(table: &ClassMembership, origin: [i32; 2]) -> ClassMembership {
    let centroids = (0..table.class_count())
        .filter_map(|class| table.centroid(class))
        .map(|[x, y]| [x + f64::from(origin[0]), y + f64::from(origin[1])])
        .collect();
    ClassMembership::new(table.counts().clone(), centroids)
        .unwrap_or_else(|error| unreachable!("shifted centroids stay consistent: {error}"))
}

/// Membership table with one data point per listed `(x, y)` cell of each class
///
/// Centroids are the mean listed position of each class.
pub fn membership(width: usize, height: usize, classes: &[Vec<(usize, usize)>]) -> ClassMembership {
    let mut rows = vec![vec![0; classes.len()]; width * height];
    let mut centroids = Vec::with_capacity(classes.len());

    for (class, cells) in classes.iter().enumerate() {
        let mut sum = [0.0, 0.0];
        for &(x, y) in cells {
            if let Some(slot) = rows.get_mut(y * width + x).and_then(|row| row.get_mut(class)) {
                *slot += 1;
            }
            sum[0] += x as f64;
            sum[1] += y as f64;
        }
        let n = cells.len().max(1) as f64;
        centroids.push([sum[0] / n, sum[1] / n]);
    }

    ClassMembership::from_rows(&rows, centroids).unwrap_or_else(|error| {
        unreachable!("fixture membership must be consistent: {error}")
    })
}

/// All positions of an axis-aligned block
pub fn block(x0: usize, y0: usize, width: usize, height: usize) -> Vec<(usize, usize)> {
    (y0..y0 + height)
        .flat_map(|y| (x0..x0 + width).map(move |x| (x, y)))
        .collect()
}
