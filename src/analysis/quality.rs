//! Five-level bucketing of per-cell quality measures and their region occurrence

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use log::{debug, info};
use ndarray::Array2;

use crate::io::configuration::{BUCKET_COUNT, DEFAULT_BUCKET_THRESHOLDS, REGION_COUNT};
use crate::io::error::{Result, invalid_parameter, shape_mismatch};
use crate::spatial::grid::{Grid, GridPos};
use crate::spatial::region::Region;

/// Ordered strength category of a quality value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrengthBucket {
    /// Bucket 1
    VeryWeak,
    /// Bucket 2
    Weak,
    /// Bucket 3
    Moderate,
    /// Bucket 4
    Strong,
    /// Bucket 5
    VeryStrong,
}

impl StrengthBucket {
    /// All buckets from weakest to strongest
    pub const ALL: [Self; BUCKET_COUNT] = [
        Self::VeryWeak,
        Self::Weak,
        Self::Moderate,
        Self::Strong,
        Self::VeryStrong,
    ];

    /// Bucket id in 1..=5
    pub const fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Zero-based position from weakest to strongest
    pub const fn index(self) -> usize {
        match self {
            Self::VeryWeak => 0,
            Self::Weak => 1,
            Self::Moderate => 2,
            Self::Strong => 3,
            Self::VeryStrong => 4,
        }
    }

    /// Look up a bucket by its id in 1..=5
    pub fn from_id(id: u8) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        }
    }
}

impl fmt::Display for StrengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Four ascending cut points separating the five buckets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketThresholds {
    cuts: [f64; BUCKET_COUNT - 1],
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            cuts: DEFAULT_BUCKET_THRESHOLDS,
        }
    }
}

impl BucketThresholds {
    /// Create thresholds from explicit cut points
    ///
    /// # Errors
    ///
    /// Returns an error if a cut point is not finite or the cuts are not strictly ascending
    pub fn new(cuts: [f64; BUCKET_COUNT - 1]) -> Result<Self> {
        if cuts.iter().any(|cut| !cut.is_finite()) {
            return Err(invalid_parameter(
                "thresholds",
                &format!("{cuts:?}"),
                &"cut points must be finite",
            ));
        }
        if cuts.windows(2).any(|pair| pair.first() >= pair.get(1)) {
            return Err(invalid_parameter(
                "thresholds",
                &format!("{cuts:?}"),
                &"cut points must be strictly ascending",
            ));
        }
        Ok(Self { cuts })
    }

    /// Evenly spaced cut points between a minimum and maximum value
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or not finite
    pub fn spanning(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) || min >= max {
            return Err(invalid_parameter(
                "range",
                &format!("{min}..{max}"),
                &"range must be finite and non-empty",
            ));
        }
        let step = (max - min) / BUCKET_COUNT as f64;
        Self::new(std::array::from_fn(|i| min + step * (i + 1) as f64))
    }

    /// Cut points in ascending order
    pub const fn cuts(&self) -> &[f64; BUCKET_COUNT - 1] {
        &self.cuts
    }

    /// Bucket of a value; non-finite values have none
    pub fn classify(&self, value: f64) -> Option<StrengthBucket> {
        if !value.is_finite() {
            return None;
        }
        let passed = self.cuts.iter().filter(|&&cut| value >= cut).count();
        StrengthBucket::ALL.get(passed).copied()
    }
}

/// Cells that fall in chosen buckets of two measures at once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    /// Matching cells in row-major order
    pub cells: Vec<GridPos>,
    /// Matching cells per region
    pub per_region: [usize; REGION_COUNT],
}

/// Bucketed quality measure with per-region occurrence lists
#[derive(Debug, Clone)]
pub struct QualityBucketMap {
    name: String,
    buckets: Array2<Option<StrengthBucket>>,
    regions: Array2<Option<Region>>,
    occurrences: [[Vec<GridPos>; REGION_COUNT]; BUCKET_COUNT],
    counts: [usize; BUCKET_COUNT],
}

impl QualityBucketMap {
    /// Classify a `[row, column]` value matrix over the filled cells of a grid
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix shape differs from the grid
    pub fn classify(
        grid: &Grid,
        name: &str,
        values: &Array2<f64>,
        thresholds: &BucketThresholds,
    ) -> Result<Self> {
        let found = (values.ncols(), values.nrows());
        if found != grid.dimensions() {
            return Err(shape_mismatch("quality measure", grid.dimensions(), found));
        }

        let mut buckets = Array2::from_elem(values.dim(), None);
        let regions = grid.cells().map(|cell| cell.region);
        let mut occurrences: [[Vec<GridPos>; REGION_COUNT]; BUCKET_COUNT] =
            std::array::from_fn(|_| std::array::from_fn(|_| Vec::new()));
        let mut counts = [0; BUCKET_COUNT];

        for cell in grid.iter().filter(|cell| cell.is_filled()) {
            let index = [cell.position.y, cell.position.x];
            let Some(bucket) = values
                .get(index)
                .and_then(|&value| thresholds.classify(value))
            else {
                continue;
            };

            if let Some(slot) = buckets.get_mut(index) {
                *slot = Some(bucket);
            }
            if let Some(count) = counts.get_mut(bucket.index()) {
                *count += 1;
            }
            if let Some(list) = cell.region.and_then(|region| {
                occurrences
                    .get_mut(bucket.index())
                    .and_then(|per_region| per_region.get_mut(region.index()))
            }) {
                list.push(cell.position);
            }
        }

        let map = Self {
            name: name.to_string(),
            buckets,
            regions,
            occurrences,
            counts,
        };
        debug!("quality measure '{name}' bucket counts {:?}", map.counts);
        for outlier in map.outliers() {
            info!("quality measure '{name}': {outlier} bucket has no buffer level");
        }
        Ok(map)
    }

    /// Measure name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bucket per cell, indexed `[row, column]`
    pub const fn buckets(&self) -> &Array2<Option<StrengthBucket>> {
        &self.buckets
    }

    /// Bucket of one cell
    pub fn bucket_at(&self, pos: GridPos) -> Option<StrengthBucket> {
        self.buckets.get([pos.y, pos.x]).copied().flatten()
    }

    /// Cells of a bucket listed per region
    pub fn region_occurrence(&self, bucket: StrengthBucket) -> &[Vec<GridPos>; REGION_COUNT] {
        static EMPTY: [Vec<GridPos>; REGION_COUNT] = [const { Vec::new() }; REGION_COUNT];
        self.occurrences.get(bucket.index()).unwrap_or(&EMPTY)
    }

    /// Number of cells of a bucket per region
    pub fn region_counts(&self, bucket: StrengthBucket) -> [usize; REGION_COUNT] {
        let occurrence = self.region_occurrence(bucket);
        std::array::from_fn(|region| occurrence.get(region).map_or(0, Vec::len))
    }

    /// Number of cells in a bucket across the whole grid
    pub fn bucket_count(&self, bucket: StrengthBucket) -> usize {
        self.counts.get(bucket.index()).copied().unwrap_or(0)
    }

    /// An extreme bucket is an outlier when its neighbouring bucket is empty
    pub fn is_outlier(&self, bucket: StrengthBucket) -> bool {
        let buffer = match bucket {
            StrengthBucket::VeryStrong => StrengthBucket::Strong,
            StrengthBucket::VeryWeak => StrengthBucket::Weak,
            _ => return false,
        };
        self.bucket_count(bucket) > 0 && self.bucket_count(buffer) == 0
    }

    /// Extreme buckets flagged as outliers
    pub fn outliers(&self) -> Vec<StrengthBucket> {
        [StrengthBucket::VeryWeak, StrengthBucket::VeryStrong]
            .into_iter()
            .filter(|&bucket| self.is_outlier(bucket))
            .collect()
    }
}

/// Cells in `bucket_a` of measure `a` and `bucket_b` of measure `b`
///
/// # Errors
///
/// Returns an error if the two maps were built over grids of different shape
pub fn intersection(
    a: &QualityBucketMap,
    bucket_a: StrengthBucket,
    b: &QualityBucketMap,
    bucket_b: StrengthBucket,
) -> Result<Intersection> {
    if a.buckets.dim() != b.buckets.dim() {
        let (rows_a, cols_a) = a.buckets.dim();
        let (rows_b, cols_b) = b.buckets.dim();
        return Err(shape_mismatch(
            "measure intersection",
            (cols_a, rows_a),
            (cols_b, rows_b),
        ));
    }

    let mut cells = Vec::new();
    let mut per_region = [0; REGION_COUNT];
    for ((y, x), &bucket) in a.buckets.indexed_iter() {
        if bucket != Some(bucket_a) || b.buckets.get([y, x]).copied().flatten() != Some(bucket_b)
        {
            continue;
        }
        cells.push(GridPos::new(x, y));
        if let Some(count) = a
            .regions
            .get([y, x])
            .copied()
            .flatten()
            .and_then(|region| per_region.get_mut(region.index()))
        {
            *count += 1;
        }
    }

    Ok(Intersection { cells, per_region })
}

/// Result that may carry no data, reported to the caller instead of failing
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation<T> {
    /// Data is available
    Data(T),
    /// Nothing to interpret
    NoData {
        /// Why no data is available
        reason: String,
    },
}

impl<T> Interpretation<T> {
    /// The data, if any
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Data(data) => Some(data),
            Self::NoData { .. } => None,
        }
    }

    /// Check if nothing is available
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Registry of bucketed quality measures over one grid
pub struct QualityMapper<'g> {
    grid: &'g Grid,
    maps: BTreeMap<String, QualityBucketMap>,
}

impl<'g> QualityMapper<'g> {
    /// Create an empty registry for a grid
    pub const fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            maps: BTreeMap::new(),
        }
    }

    /// Bucket and register a measure, replacing any measure of the same name
    ///
    /// # Errors
    ///
    /// Returns an error if the value matrix does not match the grid shape
    pub fn add_measure(
        &mut self,
        name: &str,
        values: &Array2<f64>,
        thresholds: &BucketThresholds,
    ) -> Result<&QualityBucketMap> {
        let map = QualityBucketMap::classify(self.grid, name, values, thresholds)?;
        let stored = match self.maps.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(map);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(map),
        };
        Ok(stored)
    }

    /// Registered measure names in sorted order
    pub fn measures(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    /// Number of registered measures
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Check if no measures are registered
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Bucket map of a measure
    pub fn lookup(&self, name: &str) -> Interpretation<&QualityBucketMap> {
        self.maps
            .get(name)
            .map_or_else(|| no_data(name), Interpretation::Data)
    }

    /// Intersection of buckets from two registered measures
    pub fn compare(
        &self,
        name_a: &str,
        bucket_a: StrengthBucket,
        name_b: &str,
        bucket_b: StrengthBucket,
    ) -> Interpretation<Intersection> {
        let (Some(a), Some(b)) = (self.maps.get(name_a), self.maps.get(name_b)) else {
            let missing = if self.maps.contains_key(name_a) {
                name_b
            } else {
                name_a
            };
            return no_data(missing);
        };

        match intersection(a, bucket_a, b, bucket_b) {
            Ok(found) => Interpretation::Data(found),
            Err(error) => Interpretation::NoData {
                reason: error.to_string(),
            },
        }
    }
}

fn no_data<T>(name: &str) -> Interpretation<T> {
    info!("no data to interpret for quality measure '{name}'");
    Interpretation::NoData {
        reason: format!("no data to interpret for quality measure '{name}'"),
    }
}
