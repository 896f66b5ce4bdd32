//! Eight-neighbour adjacency and connected component grouping of grid cells

use std::collections::HashMap;

use bitvec::prelude::*;

use crate::spatial::grid::GridPos;

/// Anything that occupies a single grid position
pub trait Positioned {
    /// Grid position of the item
    fn position(&self) -> GridPos;
}

impl Positioned for GridPos {
    fn position(&self) -> GridPos {
        *self
    }
}

/// Two positions are adjacent when they differ by at most one step on both axes
pub const fn adjacent(a: GridPos, b: GridPos) -> bool {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    dx <= 1 && dy <= 1
}

/// Signed offset from `a` to `b` as `[dx, dy]`
pub const fn distance(a: GridPos, b: GridPos) -> [i64; 2] {
    [b.x as i64 - a.x as i64, b.y as i64 - a.y as i64]
}

const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The eight surrounding positions that fit inside a `width x height` grid
pub fn neighbours(pos: GridPos, width: usize, height: usize) -> impl Iterator<Item = GridPos> {
    NEIGHBOUR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(GridPos { x, y })
    })
}

/// Partition items into maximal connected components
///
/// Returns item indices per component. Components appear in the order of their
/// first item; indices inside a component are ascending. Items sharing a
/// position always land in the same component.
pub fn group_indices<T: Positioned>(items: &[T]) -> Vec<Vec<usize>> {
    let mut by_position: HashMap<GridPos, Vec<usize>> = HashMap::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        by_position.entry(item.position()).or_default().push(index);
    }

    let mut visited = bitvec![0; items.len()];
    let mut groups = Vec::new();

    for (start, item) in items.iter().enumerate() {
        if visited.get(start).as_deref() == Some(&true) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![item.position()];
        if let Some(indices) = by_position.get(&item.position()) {
            for &index in indices {
                visited.set(index, true);
            }
            component.extend_from_slice(indices);
        }

        while let Some(current) = stack.pop() {
            for neighbour in neighbours(current, usize::MAX, usize::MAX) {
                let Some(indices) = by_position.get(&neighbour) else {
                    continue;
                };
                let seen = indices
                    .first()
                    .is_none_or(|&first| visited.get(first).as_deref() == Some(&true));
                if seen {
                    continue;
                }
                for &index in indices {
                    visited.set(index, true);
                }
                component.extend_from_slice(indices);
                stack.push(neighbour);
            }
        }

        component.sort_unstable();
        groups.push(component);
    }

    groups
}

/// Partition items into maximal connected components, cloning the items
pub fn group<T: Positioned + Clone>(items: &[T]) -> Vec<Vec<T>> {
    group_indices(items)
        .into_iter()
        .map(|component| {
            component
                .into_iter()
                .filter_map(|index| items.get(index).cloned())
                .collect()
        })
        .collect()
}
