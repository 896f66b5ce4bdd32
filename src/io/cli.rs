//! Command-line interface for batch interpretation of PNG class maps

use crate::analysis::classes::analyze_classes;
use crate::analysis::quality::{BucketThresholds, Interpretation, QualityMapper};
use crate::io::configuration::{
    AnalysisConfig, BUCKET_COUNT, DEFAULT_BUCKET_THRESHOLDS, OUTPUT_EXTENSION, OUTPUT_SUFFIX,
};
use crate::io::error::{Result, SomGridError, invalid_parameter};
use crate::io::image::{load_class_map, load_quality_map};
use crate::io::progress::{ProgressLogger, ProgressManager};
use crate::io::summary::{Summary, write_summary};
use crate::spatial::grid::Grid;
use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "somgrid")]
#[command(
    author,
    version,
    about = "Interpret trained SOM class maps: regions, descriptors and class statistics"
)]
/// Command-line arguments for the interpretation tool
pub struct Cli {
    /// Class map PNG file or directory of class maps
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Grayscale PNG quality measure, named after its file stem (repeatable)
    #[arg(short = 'Q', long = "quality", value_name = "PNG")]
    pub quality: Vec<PathBuf>,

    /// Four ascending bucket cut points for quality values in [0, 1]
    #[arg(short, long, value_delimiter = ',')]
    pub thresholds: Option<Vec<f64>>,

    /// Drop classes less compact than this
    #[arg(long)]
    pub min_compactness: Option<f64>,

    /// Drop classes more compact than this
    #[arg(long)]
    pub max_compactness: Option<f64>,

    /// Log every class and measure while processing
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Compactness filter from the bound flags
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is outside [0, 1] or min exceeds max
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        AnalysisConfig::with_bounds(self.min_compactness, self.max_compactness)
    }

    /// Bucket thresholds from the flag, or the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the cut points are not four strictly ascending values
    pub fn bucket_thresholds(&self) -> Result<BucketThresholds> {
        let Some(values) = &self.thresholds else {
            return BucketThresholds::new(DEFAULT_BUCKET_THRESHOLDS);
        };
        let cuts: [f64; BUCKET_COUNT - 1] = values.as_slice().try_into().map_err(|error| {
            invalid_parameter(
                "thresholds",
                &format!("{values:?}"),
                &format!("expected {} cut points: {error}", BUCKET_COUNT - 1),
            )
        })?;
        BucketThresholds::new(cuts)
    }
}

/// Orchestrates batch processing of class maps with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    ///
    /// Installs the progress-aware logger unless output is suppressed.
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        if let Some(pm) = &progress_manager {
            let level = if cli.verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            if let Err(error) = ProgressLogger::new(pm.multi_progress(), level).install() {
                debug!("keeping the logger installed earlier: {error}");
            }
        }

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process maps according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if argument validation, target collection or any map fails
    pub fn process(&mut self) -> Result<()> {
        let config = self.cli.analysis_config()?;
        let thresholds = self.cli.bucket_thresholds()?;
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(file, index, config, &thresholds)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Output path of the statistics table for a class map
    pub fn output_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!(
            "{}{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}",
            stem.to_string_lossy()
        );

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !is_png(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &"target file must be a PNG image",
                ));
            }
            Ok(if self.should_process_file(target) {
                vec![target.clone()]
            } else {
                Vec::new()
            })
        } else if target.is_dir() {
            let mut files = Vec::new();
            let entries = std::fs::read_dir(target).map_err(|source| SomGridError::FileSystem {
                path: target.clone(),
                operation: "read directory",
                source,
            })?;
            for entry in entries {
                let path = entry?.path();
                if is_png(&path) && !self.is_quality_input(&path) && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"target must be a PNG file or directory",
            ))
        }
    }

    fn is_quality_input(&self, path: &Path) -> bool {
        self.cli.quality.iter().any(|quality| quality == path)
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        if Self::output_path(input_path).exists() {
            info!("skipping {} (output exists)", input_path.display());
            false
        } else {
            true
        }
    }

    fn advance(&mut self, index: usize) {
        if let Some(ref mut pm) = self.progress_manager {
            pm.advance(index);
        }
    }

    fn process_file(
        &mut self,
        input_path: &Path,
        index: usize,
        config: AnalysisConfig,
        thresholds: &BucketThresholds,
    ) -> Result<()> {
        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path);
        }

        let class_map = load_class_map(input_path)?;
        self.advance(index);

        let grid = Grid::build(&class_map.units)?.with_membership(&class_map.membership)?;
        self.advance(index);

        let classes = analyze_classes(&grid, Some(&class_map.membership), config);
        self.advance(index);

        let mut mapper = QualityMapper::new(&grid);
        for quality_path in &self.cli.quality {
            let name = quality_path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let values = load_quality_map(quality_path)?;
            match mapper.add_measure(&name, &values, thresholds) {
                Ok(_) => {}
                Err(SomGridError::ShapeMismatch { .. }) => {
                    warn!(
                        "quality map {} does not match {}, ignored",
                        quality_path.display(),
                        input_path.display()
                    );
                }
                Err(error) => return Err(error),
            }
        }
        let measures = mapper
            .measures()
            .filter_map(|name| match mapper.lookup(name) {
                Interpretation::Data(map) => Some(map),
                Interpretation::NoData { .. } => None,
            })
            .collect();
        self.advance(index);

        let summary = Summary {
            grid: &grid,
            classes: &classes,
            measures,
        };
        write_summary(&Self::output_path(input_path), &summary)?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index);
        }

        Ok(())
    }
}

fn is_png(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("png")
}
