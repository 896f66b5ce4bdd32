//! Spatial statistics of labeled data classes mapped onto the grid
//!
//! For each class the analyzer collects the member cells, groups them into
//! connected partitions, measures compactness around the supplied centroid and
//! reports edge cells, region mix and the classes sharing its cells. Records are
//! computed on first request and memoised for the lifetime of the analyzer,
//! which borrows exactly one grid.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

use bitvec::prelude::*;
use log::{debug, info};
use ndarray::Array2;

use crate::io::configuration::{AnalysisConfig, REGION_COUNT};
use crate::io::error::{Result, SomGridError, invalid_parameter, shape_mismatch};
use crate::spatial::adjacency::{Positioned, group_indices};
use crate::spatial::grid::{Grid, GridPos};
use crate::spatial::region::Region;

/// Per-unit class membership counts with one centroid per class
#[derive(Debug, Clone)]
pub struct ClassMembership {
    /// Counts indexed `[unit, class]`
    counts: Array2<usize>,
    /// Mean unit coordinates `[x, y]` of each class's data points
    centroids: Vec<[f64; 2]>,
}

impl ClassMembership {
    /// Create a membership table from a `[unit, class]` count matrix
    ///
    /// Centroids are in unit coordinates, the frame of [`Unit`](crate::spatial::Unit),
    /// not zero-based grid positions.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of centroids differs from the number of classes
    pub fn new(counts: Array2<usize>, centroids: Vec<[f64; 2]>) -> Result<Self> {
        if centroids.len() != counts.ncols() {
            return Err(shape_mismatch(
                "class centroids",
                (counts.ncols(), 1),
                (centroids.len(), 1),
            ));
        }
        if let Some(bad) = centroids
            .iter()
            .find(|c| !c[0].is_finite() || !c[1].is_finite())
        {
            return Err(invalid_parameter(
                "centroids",
                &format!("{bad:?}"),
                &"centroid coordinates must be finite",
            ));
        }
        Ok(Self { counts, centroids })
    }

    /// Create a membership table from one row of class counts per unit
    ///
    /// # Errors
    ///
    /// Returns an error if rows have different lengths or centroids don't match
    pub fn from_rows(rows: &[Vec<usize>], centroids: Vec<[f64; 2]>) -> Result<Self> {
        let class_count = centroids.len();
        let mut counts = Array2::zeros((rows.len(), class_count));
        for (unit, row) in rows.iter().enumerate() {
            if row.len() != class_count {
                return Err(shape_mismatch(
                    "class membership row",
                    (class_count, 1),
                    (row.len(), 1),
                ));
            }
            for (class, &count) in row.iter().enumerate() {
                if let Some(slot) = counts.get_mut([unit, class]) {
                    *slot = count;
                }
            }
        }
        Self::new(counts, centroids)
    }

    /// Number of units covered
    pub fn unit_count(&self) -> usize {
        self.counts.nrows()
    }

    /// Number of classes
    pub fn class_count(&self) -> usize {
        self.counts.ncols()
    }

    /// Membership count of a class on a unit
    pub fn count(&self, unit: usize, class: usize) -> usize {
        self.counts.get([unit, class]).copied().unwrap_or(0)
    }

    /// Classes present on a unit with their counts
    pub fn classes_at(&self, unit: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.class_count())
            .map(move |class| (class, self.count(unit, class)))
            .filter(|&(_, count)| count > 0)
    }

    /// Supplied centroid of a class
    pub fn centroid(&self, class: usize) -> Option<[f64; 2]> {
        self.centroids.get(class).copied()
    }

    /// Raw `[unit, class]` counts
    pub const fn counts(&self) -> &Array2<usize> {
        &self.counts
    }
}

/// A cell holding data points of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassMember {
    /// Cell position
    pub position: GridPos,
    /// Coordinates of the unit filling the cell
    pub coordinates: [i32; 2],
    /// Data points of the class on the cell
    pub count: usize,
    /// Region of the cell
    pub region: Option<Region>,
}

impl Positioned for ClassMember {
    fn position(&self) -> GridPos {
        self.position
    }
}

/// Anything with a location in the frame class centroids are given in
pub trait MapPoint {
    /// Location `[x, y]` compared against a centroid
    fn map_coordinates(&self) -> [f64; 2];
}

impl MapPoint for GridPos {
    fn map_coordinates(&self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl MapPoint for ClassMember {
    fn map_coordinates(&self) -> [f64; 2] {
        [f64::from(self.coordinates[0]), f64::from(self.coordinates[1])]
    }
}

/// A connected group of member cells, stored as ascending member indices
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    members: Vec<usize>,
}

impl Partition {
    /// Indices into the owning record's member list
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of member cells in the partition
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the partition holds no cells
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Compactness of a point set around a centroid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compactness {
    /// Fraction of members within the radius on both axes
    pub value: f64,
    /// Half the mean Manhattan distance, rounded with halves toward zero
    pub radius: f64,
}

/// Share of members lying within half their mean Manhattan distance of the centroid
///
/// A single member is compact by definition; an empty set has compactness 0.
/// Members and centroid must share a frame: grid positions for [`GridPos`],
/// unit coordinates for [`ClassMember`].
pub fn compactness<T: MapPoint>(members: &[T], centroid: [f64; 2]) -> Compactness {
    match members.len() {
        0 => Compactness {
            value: 0.0,
            radius: 0.0,
        },
        1 => Compactness {
            value: 1.0,
            radius: 0.0,
        },
        n => {
            let offsets: Vec<(f64, f64)> = members
                .iter()
                .map(|member| axis_offsets(member.map_coordinates(), centroid))
                .collect();
            let mean = offsets.iter().map(|(dx, dy)| dx + dy).sum::<f64>() / n as f64;
            let radius = round_half_down(mean / 2.0);
            let within = offsets
                .iter()
                .filter(|&&(dx, dy)| dx <= radius && dy <= radius)
                .count();
            Compactness {
                value: within as f64 / n as f64,
                radius,
            }
        }
    }
}

fn axis_offsets(point: [f64; 2], centroid: [f64; 2]) -> (f64, f64) {
    (
        (point[0] - centroid[0]).abs(),
        (point[1] - centroid[1]).abs(),
    )
}

// Nearest integer, exact halves go toward zero
fn round_half_down(value: f64) -> f64 {
    (value - 0.5).ceil().max(0.0)
}

/// Spatial statistics of one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    /// Class index
    pub index: usize,
    /// Member cells in row-major order
    pub members: Vec<ClassMember>,
    /// Supplied centroid `[x, y]` in unit coordinates
    pub centroid: [f64; 2],
    /// Connected partitions of the member cells
    pub partitions: Vec<Partition>,
    /// Compactness around the centroid and the radius used
    pub compactness: Compactness,
    /// Index of the member furthest from the centroid
    pub furthest: Option<usize>,
    /// Member cells per region, in region reading order
    pub region_mix: [usize; REGION_COUNT],
    /// Percentage of the class's data points per region
    pub concentration_mix: [f64; REGION_COUNT],
    /// Member cells bordering a non-member cell inside the grid
    pub edge_cells: Vec<GridPos>,
    /// Other classes sharing at least one cell
    pub shared_classes: BTreeSet<usize>,
}

impl ClassRecord {
    /// Number of member cells
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Total data points of the class
    pub fn total_count(&self) -> usize {
        self.members.iter().map(|member| member.count).sum()
    }

    /// Number of connected partitions
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Number of edge cells
    pub fn edge_count(&self) -> usize {
        self.edge_cells.len()
    }

    /// Number of other classes sharing a cell
    pub fn shared_class_count(&self) -> usize {
        self.shared_classes.len()
    }

    /// Member furthest from the centroid
    pub fn furthest_member(&self) -> Option<&ClassMember> {
        self.furthest.and_then(|index| self.members.get(index))
    }

    /// Region holding most member cells, first in reading order on ties
    pub fn dominant_region(&self) -> Option<Region> {
        let mut best: Option<(Region, usize)> = None;
        for (&region, &count) in Region::ALL.iter().zip(&self.region_mix) {
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((region, count));
            }
        }
        best.map(|(region, _)| region)
    }
}

/// Memoising per-class analyzer bound to one grid
pub struct ClassAnalyzer<'g> {
    grid: &'g Grid,
    membership: &'g ClassMembership,
    config: AnalysisConfig,
    cache: HashMap<usize, ClassRecord>,
}

impl<'g> ClassAnalyzer<'g> {
    /// Create an analyzer with an empty record cache
    pub fn new(grid: &'g Grid, membership: &'g ClassMembership, config: AnalysisConfig) -> Self {
        Self {
            grid,
            membership,
            config,
            cache: HashMap::new(),
        }
    }

    /// Record of a class, computed on first request
    ///
    /// # Errors
    ///
    /// Returns an error if the class index is not in the membership table
    pub fn record(&mut self, class: usize) -> Result<&ClassRecord> {
        let class_count = self.membership.class_count();
        if class >= class_count {
            return Err(SomGridError::InvalidClassIndex {
                index: class,
                class_count,
            });
        }
        Ok(self.ensure(class))
    }

    /// Number of records computed so far
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Records of all classes passing the configured compactness bounds, by index
    pub fn filtered(&mut self) -> Vec<&ClassRecord> {
        for class in 0..self.membership.class_count() {
            self.ensure(class);
        }

        let config = self.config;
        let mut records: Vec<&ClassRecord> = self
            .cache
            .values()
            .filter(|record| config.accepts(record.compactness.value))
            .collect();
        records.sort_by_key(|record| record.index);
        records
    }

    fn ensure(&mut self, class: usize) -> &ClassRecord {
        let grid = self.grid;
        let membership = self.membership;
        match self.cache.entry(class) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(compute_record(grid, membership, class)),
        }
    }
}

/// Analyze every class, or nothing when no class information is available
pub fn analyze_classes(
    grid: &Grid,
    membership: Option<&ClassMembership>,
    config: AnalysisConfig,
) -> Vec<ClassRecord> {
    let Some(membership) = membership else {
        info!("no class information supplied, skipping class analysis");
        return Vec::new();
    };

    let mut analyzer = ClassAnalyzer::new(grid, membership, config);
    analyzer.filtered().into_iter().cloned().collect()
}

fn compute_record(grid: &Grid, membership: &ClassMembership, class: usize) -> ClassRecord {
    let centroid = membership.centroid(class).unwrap_or_default();

    let members: Vec<ClassMember> = grid
        .iter()
        .take(grid.unit_count())
        .enumerate()
        .filter_map(|(unit, cell)| {
            let count = membership.count(unit, class);
            let coordinates = cell.coordinates?;
            (count > 0).then_some(ClassMember {
                position: cell.position,
                coordinates,
                count,
                region: cell.region,
            })
        })
        .collect();

    let mut seen = HashSet::new();
    let partitions: Vec<Partition> = group_indices(&members)
        .into_iter()
        .filter(|indices| seen.insert(indices.clone()))
        .map(|indices| Partition { members: indices })
        .collect();

    let record = ClassRecord {
        index: class,
        centroid,
        partitions,
        compactness: compactness(&members, centroid),
        furthest: furthest_member(&members, centroid),
        region_mix: region_mix(&members),
        concentration_mix: concentration_mix(&members),
        edge_cells: edge_cells(grid, &members),
        shared_classes: shared_classes(grid, membership, class, &members),
        members,
    };

    debug!(
        "class {class}: {} members, {} partitions, compactness {:.3}",
        record.member_count(),
        record.partition_count(),
        record.compactness.value
    );
    record
}

fn furthest_member(members: &[ClassMember], centroid: [f64; 2]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, member) in members.iter().enumerate() {
        let (dx, dy) = axis_offsets(member.map_coordinates(), centroid);
        let distance = dx + dy;
        if best.is_none_or(|(_, furthest)| distance > furthest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

fn region_mix(members: &[ClassMember]) -> [usize; REGION_COUNT] {
    let mut mix = [0; REGION_COUNT];
    for region in members.iter().filter_map(|member| member.region) {
        if let Some(slot) = mix.get_mut(region.index()) {
            *slot += 1;
        }
    }
    mix
}

fn concentration_mix(members: &[ClassMember]) -> [f64; REGION_COUNT] {
    let total: usize = members.iter().map(|member| member.count).sum();
    let mut mix = [0.0; REGION_COUNT];
    if total == 0 {
        return mix;
    }
    for member in members {
        if let Some(slot) = member.region.and_then(|region| mix.get_mut(region.index())) {
            *slot += member.count as f64 * 100.0 / total as f64;
        }
    }
    mix
}

const AXIS_STEPS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

fn edge_cells(grid: &Grid, members: &[ClassMember]) -> Vec<GridPos> {
    let mut mask = bitvec![0; grid.len()];
    for member in members {
        if let Some(index) = grid.index_of(member.position) {
            mask.set(index, true);
        }
    }

    members
        .iter()
        .map(|member| member.position)
        .filter(|&pos| {
            AXIS_STEPS.iter().any(|&(dx, dy)| {
                let next = pos
                    .x
                    .checked_add_signed(dx)
                    .zip(pos.y.checked_add_signed(dy))
                    .and_then(|(x, y)| grid.index_of(GridPos::new(x, y)));
                next.is_some_and(|index| mask.get(index).as_deref() != Some(&true))
            })
        })
        .collect()
}

fn shared_classes(
    grid: &Grid,
    membership: &ClassMembership,
    class: usize,
    members: &[ClassMember],
) -> BTreeSet<usize> {
    members
        .iter()
        .filter_map(|member| grid.index_of(member.position))
        .flat_map(|unit| membership.classes_at(unit))
        .map(|(other, _)| other)
        .filter(|&other| other != class)
        .collect()
}
