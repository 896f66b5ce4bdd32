//! Tests for region ids, axis vocabulary and descriptor rendering

#[cfg(test)]
mod tests {
    use somgrid::spatial::region::{
        Axis, AxisSide, AxisStrength, Descriptor, Orientation, Region,
    };

    const fn strength(side: AxisSide, level: u8) -> AxisStrength {
        AxisStrength { side, level }
    }

    // Tests ids run 1..=9 in reading order and round-trip
    #[test]
    fn test_region_ids() {
        for (index, region) in Region::ALL.iter().enumerate() {
            assert_eq!(region.index(), index);
            assert_eq!(usize::from(region.id()), index + 1);
            assert_eq!(Region::from_id(region.id()), Some(*region));
        }
        assert_eq!(Region::from_id(0), None);
        assert_eq!(Region::from_id(10), None);
    }

    // Tests the 3x3 layout maps sides to the expected regions
    #[test]
    fn test_region_from_sides() {
        assert_eq!(
            Region::from_sides(AxisSide::Near, AxisSide::Near),
            Region::NorthWest
        );
        assert_eq!(
            Region::from_sides(AxisSide::Near, AxisSide::Far),
            Region::NorthEast
        );
        assert_eq!(
            Region::from_sides(AxisSide::Middle, AxisSide::Middle),
            Region::Center
        );
        assert_eq!(
            Region::from_sides(AxisSide::Far, AxisSide::Middle),
            Region::South
        );
        assert_eq!(
            Region::from_sides(AxisSide::Middle, AxisSide::Near),
            Region::West
        );
    }

    #[test]
    fn test_region_names() {
        assert_eq!(Region::NorthWest.to_string(), "north-west");
        assert_eq!(Region::Center.name(), "center");
        assert_eq!(Region::SouthEast.abbreviation(), "SE");

        let abbreviations: Vec<&str> = Region::ALL.iter().map(|r| r.abbreviation()).collect();
        assert_eq!(
            abbreviations,
            vec!["NW", "N", "NE", "W", "C", "E", "SW", "S", "SE"]
        );
    }

    // Tests adjective bands of the fixed vocabulary
    // Verified by shifting the strongly band down one level
    #[test]
    fn test_adjective_vocabulary() {
        let words: Vec<&str> = (0..=8)
            .map(|level| strength(AxisSide::Near, level).adjective())
            .collect();
        assert_eq!(
            words,
            vec![
                "central",
                "slightly",
                "slightly",
                "moderately",
                "moderately",
                "strongly",
                "strongly",
                "far",
                "far"
            ]
        );
    }

    #[test]
    fn test_axis_directions() {
        assert_eq!(Axis::Horizontal.direction(AxisSide::Near), "west");
        assert_eq!(Axis::Horizontal.direction(AxisSide::Far), "east");
        assert_eq!(Axis::Vertical.direction(AxisSide::Near), "north");
        assert_eq!(Axis::Vertical.direction(AxisSide::Far), "south");
        assert_eq!(Axis::Vertical.direction(AxisSide::Middle), "center");
    }

    // Tests the stronger axis decides the orientation
    #[test]
    fn test_orientation_dominant_axis() {
        let east = Descriptor::new(strength(AxisSide::Far, 6), strength(AxisSide::Near, 2));
        assert_eq!(east.orientation(), Orientation::EastOfCenter);

        let west = Descriptor::new(strength(AxisSide::Near, 3), AxisStrength::MIDDLE);
        assert_eq!(west.orientation(), Orientation::WestOfCenter);

        let south = Descriptor::new(strength(AxisSide::Near, 1), strength(AxisSide::Far, 4));
        assert_eq!(south.orientation(), Orientation::SouthOfCenter);

        assert_eq!(Descriptor::CENTER.orientation(), Orientation::ExactCenter);
    }

    // Tests equal levels resolve to the vertical axis
    // Verified by resolving ties horizontally
    #[test]
    fn test_orientation_tie_goes_vertical() {
        let north = Descriptor::new(strength(AxisSide::Far, 5), strength(AxisSide::Near, 5));
        assert_eq!(north.orientation(), Orientation::NorthOfCenter);

        let south = Descriptor::new(strength(AxisSide::Near, 8), strength(AxisSide::Far, 8));
        assert_eq!(south.orientation(), Orientation::SouthOfCenter);
    }

    // Tests the dominant axis is written first and a central secondary is omitted
    #[test]
    fn test_descriptor_display() {
        let corner = Descriptor::new(strength(AxisSide::Near, 8), strength(AxisSide::Near, 8));
        assert_eq!(corner.to_string(), "far north, far west");

        let edge = Descriptor::new(strength(AxisSide::Near, 8), AxisStrength::MIDDLE);
        assert_eq!(edge.to_string(), "far west");

        let mixed = Descriptor::new(strength(AxisSide::Far, 6), strength(AxisSide::Far, 2));
        assert_eq!(mixed.to_string(), "strongly east, slightly south");

        assert_eq!(Descriptor::CENTER.to_string(), "center");
    }

    #[test]
    fn test_descriptor_region() {
        let descriptor = Descriptor::new(strength(AxisSide::Far, 3), AxisStrength::MIDDLE);
        assert_eq!(descriptor.region(), Region::East);
        assert_eq!(Descriptor::CENTER.region(), Region::Center);
    }
}
