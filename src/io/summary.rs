//! Tab-separated statistics table handed to the report generator

use std::fs;
use std::path::Path;

use crate::analysis::classes::ClassRecord;
use crate::analysis::quality::{QualityBucketMap, StrengthBucket};
use crate::io::error::{Result, WithPath};
use crate::spatial::grid::Grid;
use crate::spatial::region::Region;

/// Everything one analysis run produced
pub struct Summary<'a> {
    /// The labeled grid
    pub grid: &'a Grid,
    /// Class records passing the configured filter
    pub classes: &'a [ClassRecord],
    /// Bucketed quality measures
    pub measures: Vec<&'a QualityBucketMap>,
}

fn region_header(prefix: &str) -> String {
    Region::ALL
        .iter()
        .map(|region| format!("{prefix}{}", region.abbreviation()))
        .collect::<Vec<_>>()
        .join("\t")
}

fn join_counts<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\t")
}

fn join_shares(values: &[f64]) -> String {
    values
        .iter()
        .map(|share| format!("{share:.2}"))
        .collect::<Vec<_>>()
        .join("\t")
}

fn class_row(record: &ClassRecord) -> String {
    let dominant = record
        .dominant_region()
        .map_or("-", |region| region.abbreviation());
    let furthest = record
        .furthest_member()
        .map_or_else(|| "-".to_string(), |member| {
            format!("{},{}", member.coordinates[0], member.coordinates[1])
        });
    format!(
        "class\t{}\t{}\t{}\t{}\t{:.4}\t{}\t{}\t{}\t{dominant}\t{furthest}\t{}\t{}",
        record.index,
        record.member_count(),
        record.total_count(),
        record.partition_count(),
        record.compactness.value,
        record.compactness.radius,
        record.edge_count(),
        record.shared_class_count(),
        join_counts(&record.region_mix),
        join_shares(&record.concentration_mix)
    )
}

fn quality_rows(map: &QualityBucketMap) -> impl Iterator<Item = String> + '_ {
    StrengthBucket::ALL.into_iter().map(move |bucket| {
        format!(
            "quality\t{}\t{}\t{}\t{}\t{}",
            map.name(),
            bucket.id(),
            map.bucket_count(bucket),
            map.is_outlier(bucket),
            join_counts(&map.region_counts(bucket))
        )
    })
}

impl Summary<'_> {
    /// Render the table: a grid row, one row per class and one per measure bucket
    ///
    /// Class rows end with the member cells per region followed by the share of
    /// data points per region in percent. The furthest member is written in unit
    /// coordinates.
    pub fn render(&self) -> String {
        let regions = region_header("");
        let mut lines = vec![
            "#grid\twidth\theight\tunits\tdecomposed\tsub_grids".to_string(),
            format!(
                "grid\t{}\t{}\t{}\t{}\t{}",
                self.grid.width(),
                self.grid.height(),
                self.grid.unit_count(),
                self.grid.is_decomposed(),
                self.grid.sub_grids().len()
            ),
            format!(
                "#class\tindex\tmembers\tdata_points\tpartitions\tcompactness\tradius\tedges\tshared\tdominant\tfurthest\t{regions}\t{}",
                region_header("%")
            ),
        ];
        lines.extend(self.classes.iter().map(class_row));

        lines.push(format!("#quality\tmeasure\tbucket\tcells\toutlier\t{regions}"));
        lines.extend(self.measures.iter().copied().flat_map(quality_rows));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Write a summary table to disk, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written
pub fn write_summary(path: &Path, summary: &Summary<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_path(parent, "create directory")?;
        }
    }
    fs::write(path, summary.render()).with_path(path, "write summary")
}
