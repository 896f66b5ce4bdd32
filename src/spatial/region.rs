//! Named regions, axis strengths and the directional descriptor vocabulary

use std::fmt;

/// One of the nine canonical areas covering a grid, in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    /// Upper-left area
    NorthWest,
    /// Upper-middle area
    North,
    /// Upper-right area
    NorthEast,
    /// Middle-left area
    West,
    /// Central area
    Center,
    /// Middle-right area
    East,
    /// Lower-left area
    SouthWest,
    /// Lower-middle area
    South,
    /// Lower-right area
    SouthEast,
}

impl Region {
    /// All regions in reading order (NW, N, NE, W, C, E, SW, S, SE)
    pub const ALL: [Self; 9] = [
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::West,
        Self::Center,
        Self::East,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];

    /// Region id in 1..=9
    pub const fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Zero-based position in reading order, used to index 9-length arrays
    pub const fn index(self) -> usize {
        match self {
            Self::NorthWest => 0,
            Self::North => 1,
            Self::NorthEast => 2,
            Self::West => 3,
            Self::Center => 4,
            Self::East => 5,
            Self::SouthWest => 6,
            Self::South => 7,
            Self::SouthEast => 8,
        }
    }

    /// Look up a region by its id in 1..=9
    pub fn from_id(id: u8) -> Option<Self> {
        id.checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
    }

    /// Region at a row and column of the 3x3 layout
    pub fn from_sides(vertical: AxisSide, horizontal: AxisSide) -> Self {
        let row = vertical.band_index();
        let col = horizontal.band_index();
        Self::ALL
            .get(row * 3 + col)
            .copied()
            .unwrap_or(Self::Center)
    }

    /// Human readable name
    pub const fn name(self) -> &'static str {
        match self {
            Self::NorthWest => "north-west",
            Self::North => "north",
            Self::NorthEast => "north-east",
            Self::West => "west",
            Self::Center => "center",
            Self::East => "east",
            Self::SouthWest => "south-west",
            Self::South => "south",
            Self::SouthEast => "south-east",
        }
    }

    /// Compass abbreviation
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::NorthWest => "NW",
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::West => "W",
            Self::Center => "C",
            Self::East => "E",
            Self::SouthWest => "SW",
            Self::South => "S",
            Self::SouthEast => "SE",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which part of an axis a cell lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSide {
    /// Before the middle band (west or north)
    Near,
    /// Inside the middle band
    Middle,
    /// After the middle band (east or south)
    Far,
}

impl AxisSide {
    const fn band_index(self) -> usize {
        match self {
            Self::Near => 0,
            Self::Middle => 1,
            Self::Far => 2,
        }
    }
}

/// Strength of a cell's pull toward one end of an axis
///
/// Levels run 1..=8 on the sides (8 at the border); middle band cells carry 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisStrength {
    /// Side of the axis
    pub side: AxisSide,
    /// Distance level from the middle band
    pub level: u8,
}

impl AxisStrength {
    /// Strength of a middle band cell
    pub const MIDDLE: Self = Self {
        side: AxisSide::Middle,
        level: 0,
    };

    /// Adjective from the fixed vocabulary
    pub const fn adjective(self) -> &'static str {
        match self.level {
            0 => "central",
            1 | 2 => "slightly",
            3 | 4 => "moderately",
            5 | 6 => "strongly",
            _ => "far",
        }
    }
}

/// Axis a strength value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// West to east
    Horizontal,
    /// North to south
    Vertical,
}

impl Axis {
    /// Direction word for a side of this axis
    pub const fn direction(self, side: AxisSide) -> &'static str {
        match (self, side) {
            (Self::Horizontal, AxisSide::Near) => "west",
            (Self::Horizontal, AxisSide::Far) => "east",
            (Self::Vertical, AxisSide::Near) => "north",
            (Self::Vertical, AxisSide::Far) => "south",
            (_, AxisSide::Middle) => "center",
        }
    }
}

/// Combined orientation of a cell relative to the map center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Dominated by the northern half
    NorthOfCenter,
    /// Dominated by the southern half
    SouthOfCenter,
    /// Dominated by the western half
    WestOfCenter,
    /// Dominated by the eastern half
    EastOfCenter,
    /// Inside both middle bands
    ExactCenter,
}

/// Human independent directional description of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    /// West/East strength
    pub horizontal: AxisStrength,
    /// North/South strength
    pub vertical: AxisStrength,
}

impl Descriptor {
    /// Descriptor of a cell lying in both middle bands
    pub const CENTER: Self = Self {
        horizontal: AxisStrength::MIDDLE,
        vertical: AxisStrength::MIDDLE,
    };

    /// Combine two axis strengths
    pub const fn new(horizontal: AxisStrength, vertical: AxisStrength) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Dominant orientation; ties between non-central axes go to the vertical axis
    pub const fn orientation(&self) -> Orientation {
        let h = self.horizontal;
        let v = self.vertical;
        if h.level == 0 && v.level == 0 {
            return Orientation::ExactCenter;
        }
        if h.level > v.level {
            match h.side {
                AxisSide::Far => Orientation::EastOfCenter,
                _ => Orientation::WestOfCenter,
            }
        } else {
            match v.side {
                AxisSide::Far => Orientation::SouthOfCenter,
                _ => Orientation::NorthOfCenter,
            }
        }
    }

    /// Region implied by the two axis sides
    pub fn region(&self) -> Region {
        Region::from_sides(self.vertical.side, self.horizontal.side)
    }

    fn ordered(&self) -> [(Axis, AxisStrength); 2] {
        let vertical = (Axis::Vertical, self.vertical);
        let horizontal = (Axis::Horizontal, self.horizontal);
        match self.orientation() {
            Orientation::WestOfCenter | Orientation::EastOfCenter => [horizontal, vertical],
            _ => [vertical, horizontal],
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orientation() == Orientation::ExactCenter {
            return f.write_str("center");
        }

        let [dominant, secondary] = self.ordered();
        write!(
            f,
            "{} {}",
            dominant.1.adjective(),
            dominant.0.direction(dominant.1.side)
        )?;
        if secondary.1.level > 0 {
            write!(
                f,
                ", {} {}",
                secondary.1.adjective(),
                secondary.0.direction(secondary.1.side)
            )?;
        }
        Ok(())
    }
}

/// Extra labels attached to cells during splicing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Cell touches cells of other regions
    NearBoundary {
        /// Neighbouring regions, sorted and deduplicated
        regions: Vec<Region>,
    },
}
