//! Labeled cell grid built from map units with nine-region decomposition
//!
//! Units fill the grid row-major. Grids of at least 10x10 cells are split along
//! the middle bands of both axes into nine sub-grids whose labels are spliced back
//! into the master. Smaller grids project the axis strength profiles directly.
//! Every filled cell ends up with exactly one region and a global descriptor.

use std::collections::BTreeMap;

use log::debug;
use ndarray::Array2;

use crate::analysis::classes::ClassMembership;
use crate::io::configuration::{MAX_GRID_DIMENSION, RECURSION_THRESHOLD};
use crate::io::error::{Result, SomGridError, invalid_parameter, shape_mismatch};
use crate::spatial::adjacency::{Positioned, neighbours};
use crate::spatial::axis::{band_ranges, strength_profile};
use crate::spatial::region::{Annotation, Descriptor, Orientation, Region};

/// A trained map unit supplied by the map reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    /// Column coordinate on the trained map
    pub x: i32,
    /// Row coordinate on the trained map
    pub y: i32,
    /// Number of data points mapped onto the unit
    pub hits: usize,
}

impl Unit {
    /// Create a unit at map coordinates with a hit count
    pub const fn new(x: i32, y: i32, hits: usize) -> Self {
        Self { x, y, hits }
    }
}

/// Zero-based cell address inside a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl GridPos {
    /// Create a position from column and row
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    const fn index(self) -> [usize; 2] {
        [self.y, self.x]
    }
}

/// Identifier of a node in the decomposition tree (the master grid is node 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The master grid
    pub const MASTER: Self = Self(0);
}

/// Sub-rectangle of the master grid created by one decomposition step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubGrid {
    /// Node id of this sub-grid
    pub id: NodeId,
    /// Node id of the grid it was cut from
    pub father: NodeId,
    /// Region label stamped onto its cells
    pub region: Region,
    /// Top-left cell inside the father grid
    pub origin: GridPos,
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl SubGrid {
    /// Check if a father-grid position falls inside this sub-grid
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.origin.x
            && pos.x < self.origin.x + self.width
            && pos.y >= self.origin.y
            && pos.y < self.origin.y + self.height
    }
}

/// Labels computed for one sub-grid, ready to be spliced into its father
#[derive(Debug, Clone)]
pub struct ChildLabels {
    /// Placement of the sub-grid
    pub sub_grid: SubGrid,
    /// Descriptor of each sub-grid cell relative to the sub-grid itself
    pub local: Array2<Descriptor>,
}

impl ChildLabels {
    /// Project axis strengths over the extent of a sub-grid
    ///
    /// # Errors
    ///
    /// Returns an error if the sub-grid has a zero-length side
    pub fn project(sub_grid: SubGrid) -> Result<Self> {
        let horizontal = strength_profile(sub_grid.width)?;
        let vertical = strength_profile(sub_grid.height)?;

        let local = Array2::from_shape_fn((sub_grid.height, sub_grid.width), |(y, x)| {
            match (horizontal.get(x), vertical.get(y)) {
                (Some(&h), Some(&v)) => Descriptor::new(h, v),
                _ => Descriptor::CENTER,
            }
        });

        Ok(Self { sub_grid, local })
    }
}

/// Per-position record of the labeled grid
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Address inside the grid
    pub position: GridPos,
    /// Coordinates of the unit filling the cell, `None` for unfilled cells
    pub coordinates: Option<[i32; 2]>,
    /// Data points mapped onto the unit
    pub hits: usize,
    /// Assigned region, `None` while unlabeled
    pub region: Option<Region>,
    /// Direction and strength relative to the map center
    pub descriptor: Option<Descriptor>,
    /// Direction and strength relative to the enclosing sub-grid
    pub local: Option<Descriptor>,
    /// Transition marker set during splicing
    pub annotation: Option<Annotation>,
    /// No class has members on this cell
    pub empty: bool,
    /// Class index to membership count
    pub classes: BTreeMap<usize, usize>,
}

impl Cell {
    fn blank(position: GridPos) -> Self {
        Self {
            position,
            coordinates: None,
            hits: 0,
            region: None,
            descriptor: None,
            local: None,
            annotation: None,
            empty: true,
            classes: BTreeMap::new(),
        }
    }

    /// Check if a unit fills this cell
    pub const fn is_filled(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Combined orientation code of the global descriptor
    pub fn orientation(&self) -> Option<Orientation> {
        self.descriptor.map(|descriptor| descriptor.orientation())
    }

    /// Check if the cell borders another region
    pub const fn is_near_boundary(&self) -> bool {
        matches!(self.annotation, Some(Annotation::NearBoundary { .. }))
    }
}

impl Positioned for Cell {
    fn position(&self) -> GridPos {
        self.position
    }
}

/// Bounding box of unit coordinates
#[derive(Debug, Clone, Copy)]
struct UnitBounds {
    min: [i32; 2],
    max: [i32; 2],
}

impl UnitBounds {
    fn of(units: &[Unit]) -> Option<Self> {
        let first = units.first()?;
        let mut bounds = Self {
            min: [first.x, first.y],
            max: [first.x, first.y],
        };
        for unit in units {
            bounds.min = [bounds.min[0].min(unit.x), bounds.min[1].min(unit.y)];
            bounds.max = [bounds.max[0].max(unit.x), bounds.max[1].max(unit.y)];
        }
        Some(bounds)
    }

    const fn dimensions(&self) -> (usize, usize) {
        let width = (self.max[0] as i64 - self.min[0] as i64) as usize + 1;
        let height = (self.max[1] as i64 - self.min[1] as i64) as usize + 1;
        (width, height)
    }
}

/// Immutable labeled grid of map cells
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Array2<Cell>,
    sub_grids: Vec<SubGrid>,
    origin: [i32; 2],
    unit_count: usize,
}

impl Grid {
    /// Build and label the grid for a unit array
    ///
    /// Units are placed row-major in input order; cells left over when the
    /// array is shorter than its bounding box stay unlabeled.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The unit array is empty
    /// - The bounding box exceeds the maximum grid dimension
    pub fn build(units: &[Unit]) -> Result<Self> {
        let bounds = UnitBounds::of(units).ok_or_else(|| SomGridError::InvalidSourceData {
            reason: "no units to place".to_string(),
        })?;
        let (width, height) = bounds.dimensions();

        if width > MAX_GRID_DIMENSION || height > MAX_GRID_DIMENSION {
            return Err(invalid_parameter(
                "units",
                &format!("{width}x{height}"),
                &format!("grid dimensions exceed {MAX_GRID_DIMENSION}"),
            ));
        }

        let unit_count = units.len().min(width * height);
        if unit_count < units.len() {
            debug!(
                "{} units exceed the {width}x{height} bounding box, extra units ignored",
                units.len() - unit_count
            );
        } else if unit_count < width * height {
            debug!(
                "sparse map: {unit_count} units for {} cells",
                width * height
            );
        }

        let mut cells = place_units(units, width, height);
        stamp_descriptors(&mut cells, width, height)?;

        let (cells, sub_grids) = if width >= RECURSION_THRESHOLD && height >= RECURSION_THRESHOLD
        {
            debug!("decomposing {width}x{height} grid into nine regions");
            decompose(cells)?
        } else {
            debug!("{width}x{height} grid below recursion threshold, projecting axes");
            (project_regions(cells), Vec::new())
        };

        Ok(Self {
            cells,
            sub_grids,
            origin: bounds.min,
            unit_count,
        })
    }

    /// Copy of the grid with class membership recorded on each filled cell
    ///
    /// Membership rows are matched to units in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the membership table has fewer rows than filled cells
    pub fn with_membership(&self, membership: &ClassMembership) -> Result<Self> {
        if membership.unit_count() < self.unit_count {
            return Err(shape_mismatch(
                "class membership",
                (self.unit_count, 1),
                (membership.unit_count(), 1),
            ));
        }

        let mut grid = self.clone();
        for (unit, cell) in grid
            .cells
            .iter_mut()
            .take(self.unit_count)
            .enumerate()
        {
            cell.classes = membership.classes_at(unit).collect();
            cell.empty = cell.classes.is_empty();
        }
        Ok(grid)
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Dimensions as (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells filled by a unit
    pub const fn unit_count(&self) -> usize {
        self.unit_count
    }

    /// Minimum unit coordinates of the bounding box
    pub const fn origin(&self) -> [i32; 2] {
        self.origin
    }

    /// Cell at a position
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.cells.get(pos.index())
    }

    /// All cells, indexed `[row, column]`
    pub const fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// Cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Sub-grids created by decomposition, empty for projected grids
    pub fn sub_grids(&self) -> &[SubGrid] {
        &self.sub_grids
    }

    /// Check if the nine-region decomposition ran
    pub fn is_decomposed(&self) -> bool {
        !self.sub_grids.is_empty()
    }

    /// Region assigned to a position
    pub fn region_of(&self, pos: GridPos) -> Option<Region> {
        self.cell(pos).and_then(|cell| cell.region)
    }

    /// Row-major index of a position
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        (pos.x < self.width() && pos.y < self.height()).then(|| pos.y * self.width() + pos.x)
    }

    /// Position of a row-major index
    pub fn position_of(&self, index: usize) -> Option<GridPos> {
        let width = self.width();
        (index < self.len()).then(|| GridPos::new(index % width, index / width))
    }

    /// Positions of all cells labeled with a region
    pub fn region_cells(&self, region: Region) -> Vec<GridPos> {
        self.iter()
            .filter(|cell| cell.region == Some(region))
            .map(|cell| cell.position)
            .collect()
    }
}

fn place_units(units: &[Unit], width: usize, height: usize) -> Array2<Cell> {
    let mut cells = Array2::from_shape_fn((height, width), |(y, x)| Cell::blank(GridPos { x, y }));
    for (cell, unit) in cells.iter_mut().zip(units) {
        cell.coordinates = Some([unit.x, unit.y]);
        cell.hits = unit.hits;
    }
    cells
}

fn stamp_descriptors(cells: &mut Array2<Cell>, width: usize, height: usize) -> Result<()> {
    let horizontal = strength_profile(width)?;
    let vertical = strength_profile(height)?;

    for cell in cells.iter_mut().filter(|cell| cell.is_filled()) {
        if let (Some(&h), Some(&v)) = (
            horizontal.get(cell.position.x),
            vertical.get(cell.position.y),
        ) {
            cell.descriptor = Some(Descriptor::new(h, v));
        }
    }
    Ok(())
}

fn project_regions(mut cells: Array2<Cell>) -> Array2<Cell> {
    for cell in cells.iter_mut() {
        cell.region = cell.descriptor.map(|descriptor| descriptor.region());
    }
    cells
}

fn decompose(cells: Array2<Cell>) -> Result<(Array2<Cell>, Vec<SubGrid>)> {
    let (height, width) = cells.dim();
    let columns = band_ranges(width)?;
    let rows = band_ranges(height)?;

    let mut children = Vec::with_capacity(Region::ALL.len());
    for (row, row_range) in rows.iter().enumerate() {
        for (column, column_range) in columns.iter().enumerate() {
            if row_range.is_empty() || column_range.is_empty() {
                continue;
            }
            let Some(&region) = Region::ALL.get(row * 3 + column) else {
                continue;
            };
            let sub_grid = SubGrid {
                id: NodeId(children.len() + 1),
                father: NodeId::MASTER,
                region,
                origin: GridPos::new(column_range.start, row_range.start),
                width: column_range.len(),
                height: row_range.len(),
            };
            children.push(ChildLabels::project(sub_grid)?);
        }
    }

    let merged = annotate_boundaries(splice(&cells, &children));
    let sub_grids = children.into_iter().map(|child| child.sub_grid).collect();
    Ok((merged, sub_grids))
}

/// Merge child labels into a copy of the father's cells
///
/// Only filled cells receive a region and local descriptor.
pub fn splice(father: &Array2<Cell>, children: &[ChildLabels]) -> Array2<Cell> {
    let mut merged = father.clone();
    for child in children {
        let origin = child.sub_grid.origin;
        for ((y, x), descriptor) in child.local.indexed_iter() {
            if let Some(cell) = merged.get_mut([origin.y + y, origin.x + x]) {
                if cell.is_filled() {
                    cell.region = Some(child.sub_grid.region);
                    cell.local = Some(*descriptor);
                }
            }
        }
    }
    merged
}

fn annotate_boundaries(mut cells: Array2<Cell>) -> Array2<Cell> {
    let (height, width) = cells.dim();
    let regions = cells.map(|cell| cell.region);

    for cell in cells.iter_mut() {
        let Some(own) = cell.region else {
            continue;
        };
        let mut others: Vec<Region> = neighbours(cell.position, width, height)
            .filter_map(|pos| regions.get(pos.index()).copied().flatten())
            .filter(|&region| region != own)
            .collect();
        others.sort_unstable();
        others.dedup();

        if !others.is_empty() {
            cell.annotation = Some(Annotation::NearBoundary { regions: others });
        }
    }
    cells
}
