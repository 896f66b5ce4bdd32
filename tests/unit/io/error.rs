//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use somgrid::SomGridError;
    use somgrid::io::error::{WithPath, invalid_parameter, shape_mismatch};
    use std::error::Error;
    use std::path::{Path, PathBuf};

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = SomGridError::FileSystem {
            path: "/tmp/map.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(shape_mismatch("x", (1, 1), (2, 2)).source().is_none());
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("thresholds", &"0.5,0.1", &"must ascend");

        let message = error.to_string();
        assert!(message.contains("thresholds"));
        assert!(message.contains("0.5,0.1"));
        assert!(message.contains("must ascend"));
    }

    // Tests shape mismatches print both dimensions as width x height
    #[test]
    fn test_shape_mismatch_error() {
        let message = shape_mismatch("quality measure", (12, 10), (10, 12)).to_string();
        assert!(message.contains("quality measure"));
        assert!(message.contains("expected 12x10"));
        assert!(message.contains("found 10x12"));
    }

    #[test]
    fn test_invalid_class_index_error() {
        let error = SomGridError::InvalidClassIndex {
            index: 7,
            class_count: 3,
        };
        let message = error.to_string();
        assert!(message.contains("Class index 7"));
        assert!(message.contains("3 classes"));
    }

    #[test]
    fn test_invalid_source_data_error() {
        let error = SomGridError::InvalidSourceData {
            reason: "no units to place".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid unit data: no units to place");
    }

    // Tests ImageLoad error with IO source
    // Verified by excluding source error from message
    #[test]
    fn test_image_load_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        let error = SomGridError::ImageLoad {
            path: PathBuf::from("/maps/classes.png"),
            source: image_error,
        };

        let message = error.to_string();
        assert!(message.contains("/maps/classes.png"));
        assert!(message.contains("access denied"));
        assert!(error.source().is_some());
    }

    // Tests I/O errors converted with a path keep it
    #[test]
    fn test_with_path_conversion() {
        let result: std::io::Result<()> = Err(std::io::Error::other("disk full"));
        let error = result.with_path(Path::new("out/map_semantics.tsv"), "write summary");

        let Err(SomGridError::FileSystem {
            path, operation, ..
        }) = error
        else {
            unreachable!("expected a file system error");
        };
        assert_eq!(path, PathBuf::from("out/map_semantics.tsv"));
        assert_eq!(operation, "write summary");
    }

    #[test]
    fn test_from_io_error() {
        let error: SomGridError = std::io::Error::other("boom").into();
        assert!(error.to_string().contains("boom"));
        assert!(matches!(error, SomGridError::FileSystem { .. }));
    }
}
