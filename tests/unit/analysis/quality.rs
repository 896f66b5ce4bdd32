//! Tests for quality bucketing, region occurrence, outliers and measure comparison

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use somgrid::SomGridError;
    use somgrid::analysis::quality::{
        BucketThresholds, Interpretation, QualityBucketMap, QualityMapper, StrengthBucket,
        intersection,
    };
    use somgrid::spatial::{Grid, GridPos, Region};

    use crate::square_units;

    fn grid(width: usize, height: usize) -> Grid {
        Grid::build(&square_units(width, height))
            .unwrap_or_else(|error| unreachable!("square maps always build: {error}"))
    }

    /// Values rising from 0 at the west edge to 1 at the east edge
    fn east_gradient(width: usize, height: usize) -> Array2<f64> {
        Array2::from_shape_fn((height, width), |(_, x)| x as f64 / (width - 1) as f64)
    }

    /// Values rising from 0 at the north edge to 1 at the south edge
    fn south_gradient(width: usize, height: usize) -> Array2<f64> {
        Array2::from_shape_fn((height, width), |(y, _)| y as f64 / (height - 1) as f64)
    }

    fn classify(grid: &Grid, name: &str, values: &Array2<f64>) -> QualityBucketMap {
        QualityBucketMap::classify(grid, name, values, &BucketThresholds::default())
            .unwrap_or_else(|error| unreachable!("matching shapes classify: {error}"))
    }

    #[test]
    fn test_bucket_ids() {
        for bucket in StrengthBucket::ALL {
            assert_eq!(StrengthBucket::from_id(bucket.id()), Some(bucket));
        }
        assert_eq!(StrengthBucket::from_id(0), None);
        assert_eq!(StrengthBucket::from_id(6), None);
        assert_eq!(StrengthBucket::VeryStrong.to_string(), "very strong");
    }

    // Tests cut points are inclusive lower bounds of the next bucket
    // Verified by using strict comparison at the cut
    #[test]
    fn test_threshold_classification() {
        let thresholds = BucketThresholds::default();
        assert_eq!(thresholds.classify(0.0), Some(StrengthBucket::VeryWeak));
        assert_eq!(thresholds.classify(0.2), Some(StrengthBucket::Weak));
        assert_eq!(thresholds.classify(0.5), Some(StrengthBucket::Moderate));
        assert_eq!(thresholds.classify(0.79), Some(StrengthBucket::Strong));
        assert_eq!(thresholds.classify(1.0), Some(StrengthBucket::VeryStrong));
        assert_eq!(thresholds.classify(f64::NAN), None);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(BucketThresholds::new([0.1, 0.2, 0.3, 0.4]).is_ok());
        assert!(BucketThresholds::new([0.1, 0.3, 0.3, 0.4]).is_err());
        assert!(BucketThresholds::new([0.4, 0.3, 0.2, 0.1]).is_err());
        assert!(BucketThresholds::new([0.1, f64::INFINITY, 0.3, 0.4]).is_err());
    }

    // Tests spanning thresholds split the range into five equal parts
    #[test]
    fn test_threshold_spanning() {
        let Ok(thresholds) = BucketThresholds::spanning(0.0, 10.0) else {
            unreachable!("range is valid");
        };
        let expected = [2.0, 4.0, 6.0, 8.0];
        for (cut, want) in thresholds.cuts().iter().zip(expected) {
            assert!((cut - want).abs() < 1e-12);
        }
        assert!(BucketThresholds::spanning(1.0, 1.0).is_err());
    }

    // Tests bucket counts and per-region occurrence for a horizontal gradient
    #[test]
    fn test_gradient_buckets() {
        let grid = grid(12, 12);
        let map = classify(&grid, "gradient", &east_gradient(12, 12));

        let counts: Vec<usize> = StrengthBucket::ALL
            .iter()
            .map(|&bucket| map.bucket_count(bucket))
            .collect();
        assert_eq!(counts, vec![36, 24, 24, 24, 36]);
        assert!(map.outliers().is_empty());

        let weak = map.region_counts(StrengthBucket::VeryWeak);
        assert_eq!(weak, [15, 0, 0, 6, 0, 0, 15, 0, 0]);

        let occurrence = map.region_occurrence(StrengthBucket::VeryStrong);
        assert_eq!(
            occurrence.get(Region::SouthEast.index()).map(Vec::len),
            Some(15)
        );
        assert_eq!(
            map.bucket_at(GridPos::new(0, 7)),
            Some(StrengthBucket::VeryWeak)
        );
    }

    // Tests an extreme bucket without its buffer bucket is an outlier
    // Verified by checking the opposite neighbour bucket
    #[test]
    fn test_outliers() {
        let grid = grid(10, 10);
        let values = Array2::from_shape_fn((10, 10), |(_, x)| if x == 0 { 0.95 } else { 0.5 });
        let map = classify(&grid, "spiky", &values);

        assert!(map.is_outlier(StrengthBucket::VeryStrong));
        assert!(!map.is_outlier(StrengthBucket::VeryWeak));
        assert!(!map.is_outlier(StrengthBucket::Moderate));
        assert_eq!(map.outliers(), vec![StrengthBucket::VeryStrong]);
    }

    #[test]
    fn test_shape_mismatch() {
        let grid = grid(12, 12);
        let values = east_gradient(12, 10);
        let result =
            QualityBucketMap::classify(&grid, "short", &values, &BucketThresholds::default());
        assert!(matches!(result, Err(SomGridError::ShapeMismatch { .. })));
    }

    // Tests non-finite values are left without a bucket
    #[test]
    fn test_nan_values_skipped() {
        let grid = grid(10, 10);
        let values = Array2::from_shape_fn((10, 10), |(y, x)| {
            if x == y { f64::NAN } else { 0.5 }
        });
        let map = classify(&grid, "holes", &values);
        assert_eq!(map.bucket_count(StrengthBucket::Moderate), 90);
        assert_eq!(map.bucket_at(GridPos::new(3, 3)), None);
    }

    // Tests the corner where both gradients are very strong
    #[test]
    fn test_intersection_corner() {
        let grid = grid(12, 12);
        let east = classify(&grid, "east", &east_gradient(12, 12));
        let south = classify(&grid, "south", &south_gradient(12, 12));

        let Ok(found) = intersection(
            &east,
            StrengthBucket::VeryStrong,
            &south,
            StrengthBucket::VeryStrong,
        ) else {
            unreachable!("maps share a grid");
        };
        assert_eq!(found.cells.len(), 9);
        assert_eq!(found.per_region.get(Region::SouthEast.index()), Some(&9));
        assert_eq!(found.per_region.iter().sum::<usize>(), 9);
    }

    #[test]
    fn test_intersection_shape_mismatch() {
        let small = grid(10, 10);
        let large = grid(12, 12);
        let a = classify(&small, "a", &east_gradient(10, 10));
        let b = classify(&large, "b", &east_gradient(12, 12));
        assert!(intersection(&a, StrengthBucket::Weak, &b, StrengthBucket::Weak).is_err());
    }

    // Tests unknown measures are reported as no data instead of failing
    #[test]
    fn test_mapper_no_data() {
        let grid = grid(12, 12);
        let mut mapper = QualityMapper::new(&grid);
        assert!(mapper.is_empty());
        assert!(mapper.lookup("missing").is_no_data());

        let added = mapper.add_measure("east", &east_gradient(12, 12), &BucketThresholds::default());
        assert!(added.is_ok());
        assert_eq!(mapper.len(), 1);

        let compared = mapper.compare(
            "east",
            StrengthBucket::Weak,
            "south",
            StrengthBucket::Weak,
        );
        let Interpretation::NoData { reason } = compared else {
            unreachable!("south was never added");
        };
        assert!(reason.contains("south"));
    }

    // Tests re-adding a measure replaces the earlier buckets
    #[test]
    fn test_mapper_replaces_measure() {
        let grid = grid(10, 10);
        let mut mapper = QualityMapper::new(&grid);
        let thresholds = BucketThresholds::default();

        let low = Array2::from_elem((10, 10), 0.1);
        let high = Array2::from_elem((10, 10), 0.9);
        assert!(mapper.add_measure("level", &low, &thresholds).is_ok());
        assert!(mapper.add_measure("level", &high, &thresholds).is_ok());

        assert_eq!(mapper.measures().collect::<Vec<_>>(), vec!["level"]);
        let stored = mapper.lookup("level").into_data();
        assert_eq!(
            stored.map(|map| map.bucket_count(StrengthBucket::VeryStrong)),
            Some(100)
        );
    }

    #[test]
    fn test_mapper_compare() {
        let grid = grid(12, 12);
        let mut mapper = QualityMapper::new(&grid);
        let thresholds = BucketThresholds::default();
        assert!(mapper.add_measure("east", &east_gradient(12, 12), &thresholds).is_ok());
        assert!(mapper.add_measure("south", &south_gradient(12, 12), &thresholds).is_ok());

        let found = mapper
            .compare(
                "east",
                StrengthBucket::VeryWeak,
                "south",
                StrengthBucket::VeryWeak,
            )
            .into_data();
        assert_eq!(
            found.map(|cells| cells.per_region),
            Some([9, 0, 0, 0, 0, 0, 0, 0, 0])
        );
    }
}
