//! Identify command - match query images against the reference flags.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use flag_id_adapters::{FsCorpusSource, FsImageSource};
use flag_id_core::{
    BucketCount, CorpusSource, IdentifyResult, ImageDimensions, ImageSource, MatchConfig,
    MatchEngine, MatchStatus, ProgressEvent, ProgressSink, ResultOutput, RetrievalPolicy,
    Tolerance,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Hardcoded default values for matching.
mod defaults {
    pub const BUCKETS: u16 = 8;
    pub const NEIGHBOR_RADIUS: u8 = 1;
    pub const TOLERANCE: f32 = 0.006;
}

/// Parse and validate a bucket count (power of two, 1-256).
fn parse_buckets(s: &str) -> Result<u16, String> {
    let value: u16 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    BucketCount::new(value)
        .map(BucketCount::get)
        .map_err(|_| format!("{value} is not a power of two in 1..=256"))
}

/// Parse and validate a tolerance (finite, >= 0).
fn parse_tolerance(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a finite value >= 0"))
    }
}

/// Shared arguments for identification.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct IdentifyArgs {
    /// Query images or directories
    pub paths: Vec<PathBuf>,

    /// Directory of reference flag images (file stem = flag name)
    #[arg(long, value_name = "DIR")]
    pub corpus: Option<PathBuf>,

    /// Read reference flags from subdirectories of the corpus too
    #[arg(long)]
    pub corpus_recursive: bool,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Buckets per color channel (power of two, 1-256)
    #[arg(long, value_parser = parse_buckets)]
    pub buckets: Option<u16>,

    /// Also retrieve flags from buckets within this distance (0 = exact)
    #[arg(long)]
    pub neighbor_radius: Option<u8>,

    /// Retrieve only from the query's own bucket
    #[arg(long, conflicts_with = "neighbor_radius")]
    pub exact: bool,

    /// Dominant-color ratio tolerance
    #[arg(long, value_parser = parse_tolerance)]
    pub ratio_tolerance: Option<f32>,

    /// Edge-density tolerance
    #[arg(long, value_parser = parse_tolerance)]
    pub edge_tolerance: Option<f32>,

    /// Treat tolerances as fractions of the query value
    #[arg(long)]
    pub relative_tolerance: bool,

    /// Resize images to this height before edge detection
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    pub normalize_height: Option<u32>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl IdentifyArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if !args.corpus_recursive {
            args.corpus_recursive = config.corpus.recursive.unwrap_or(false);
        }
        if args.corpus.is_none() {
            args.corpus.clone_from(&config.corpus.dir);
        }

        // Matching: CLI > config (accessors provide hardcoded fallback)
        args.buckets = args.buckets.or(config.matching.buckets_per_dimension);
        if !args.exact {
            args.neighbor_radius = args.neighbor_radius.or(config.matching.neighbor_radius);
        }
        args.ratio_tolerance = args.ratio_tolerance.or(config.matching.ratio_tolerance);
        args.edge_tolerance = args.edge_tolerance.or(config.matching.edge_tolerance);
        if !args.relative_tolerance {
            args.relative_tolerance = config.matching.tolerance_mode.as_deref() == Some("relative");
        }
        args.normalize_height = args.normalize_height.or(config.matching.normalize_height);

        // Output format: CLI > config (accessor provides fallback)
        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        // Boolean output options: CLI flag wins, then config
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        // Store config for match_config to access edge settings
        args.config = Some(config.clone());

        args
    }

    /// Get retrieval policy with fallback to the hardcoded radius.
    fn retrieval(&self) -> RetrievalPolicy {
        if self.exact {
            RetrievalPolicy::Exact
        } else {
            RetrievalPolicy::from_radius(
                self.neighbor_radius.unwrap_or(defaults::NEIGHBOR_RADIUS),
            )
        }
    }

    fn tolerance(&self, value: Option<f32>) -> Tolerance {
        let value = value.unwrap_or(defaults::TOLERANCE);
        if self.relative_tolerance {
            Tolerance::Relative(value)
        } else {
            Tolerance::Absolute(value)
        }
    }

    /// Build the engine configuration from merged args.
    fn match_config(&self) -> MatchConfig {
        let config = self.config.clone().unwrap_or_default();
        MatchConfig {
            buckets_per_dimension: self.buckets.unwrap_or(defaults::BUCKETS),
            retrieval: self.retrieval(),
            ratio_tolerance: self.tolerance(self.ratio_tolerance),
            edge_tolerance: self.tolerance(self.edge_tolerance),
            edges: config.edge_config(self.normalize_height),
        }
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// Result of running the identify command.
#[derive(Debug, Default)]
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct IdentifySummary {
    /// Number of images run through the cascade.
    pub processed: usize,
    /// Number of images matched to exactly one flag.
    pub identified: usize,
    /// Number of images left with several candidates.
    pub ambiguous: usize,
    /// Number of images with no candidate.
    pub unmatched: usize,
    /// Number of images skipped.
    pub skipped: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the identify command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &IdentifyArgs) -> Result<IdentifySummary> {
    info!("Running identify command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let corpus_dir = args.corpus.as_deref().context(
        "No reference corpus specified. Use --corpus DIR or set [corpus] dir in a config file",
    )?;
    let corpus = FsCorpusSource::new(corpus_dir)
        .recursive(args.corpus_recursive)
        .load_corpus()
        .with_context(|| format!("Failed to load reference corpus {}", corpus_dir.display()))?;
    if corpus.is_empty() {
        warn!("Reference corpus {} holds no flags", corpus_dir.display());
    }

    let config = args.match_config();
    debug!("Match config: {config:?}");
    let engine = MatchEngine::new(corpus, config)?;

    // Initialize image source
    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    // Determine if we should show progress
    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    // Initialize output adapter
    let output = JsonOutput::stdout();
    let format = args.format();
    let mut batch: Vec<IdentifyResult> = Vec::new();

    let summary = process_images(&source, &engine, &progress_bar, |result| match format {
        OutputFormat::Jsonl => output.write(&result),
        OutputFormat::Json => {
            batch.push(result);
            Ok(())
        }
    })?;

    // For JSON format, output all results as array via adapter
    if format == OutputFormat::Json {
        output.write_array(&batch, args.pretty)?;
    }
    output.flush()?;

    Ok(summary)
}

/// Runs every image from `source` through the engine, handing each result to `emit`.
pub fn process_images(
    source: &dyn ImageSource,
    engine: &MatchEngine,
    progress: &dyn ProgressSink,
    mut emit: impl FnMut(IdentifyResult) -> Result<()>,
) -> Result<IdentifySummary> {
    let total = source.count_hint();
    let mut summary = IdentifySummary::default();

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                // Note: error message contains the path via the load error
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                summary.skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: image.id.clone(),
            index,
            total,
        });

        let outcome = engine.identify(&image);
        let result = IdentifyResult::from_outcome(
            image.id.clone(),
            iso_timestamp(),
            ImageDimensions::new(image.width, image.height),
            outcome,
            engine.buckets(),
        );

        match result.status {
            MatchStatus::Identified => summary.identified += 1,
            MatchStatus::Ambiguous => summary.ambiguous += 1,
            MatchStatus::Unmatched => summary.unmatched += 1,
            other => warn!("{}: unrecognized match status {other:?}", result.path),
        }

        progress.on_event(ProgressEvent::Completed {
            result: result.clone(),
        });
        emit(result)?;
        summary.processed += 1;
    }

    progress.on_event(ProgressEvent::Finished {
        processed: summary.processed,
        skipped: summary.skipped,
    });

    // Anything short of one flag per readable image is unresolved.
    summary.exit_code = if summary.identified < summary.processed || summary.skipped > 0 {
        ExitCode::Unresolved
    } else {
        ExitCode::Success
    };

    Ok(summary)
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;
    use flag_id_core::ReferenceCorpus;
    use flag_id_test_support::{
        colors, MockImageSource, MockProgressSink, MockResultOutput, SyntheticFlagBuilder,
    };

    fn parse(argv: &[&str]) -> IdentifyArgs {
        let mut full = vec!["flag-id", "identify"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Some(Commands::Identify(args)) => args,
            _ => unreachable!("identify subcommand expected"),
        }
    }

    fn config(toml: &str) -> AppConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_defaults_without_config() {
        let args = IdentifyArgs::with_config(parse(&["q.png"]), &AppConfig::default());
        let match_config = args.match_config();
        assert_eq!(match_config, MatchConfig::default());
        assert_eq!(args.format(), OutputFormat::Jsonl);
        assert!(args.corpus.is_none());
    }

    #[test]
    fn test_config_fills_unset_args() {
        let config = config(
            r"
[corpus]
dir = 'flags'
recursive = true

[matching]
buckets_per_dimension = 16
neighbor_radius = 2
ratio_tolerance = 0.1
tolerance_mode = 'relative'

[edges]
kernel_size = 5

[output]
format = 'json'
",
        );
        let args = IdentifyArgs::with_config(parse(&["q.png"]), &config);
        let match_config = args.match_config();

        assert_eq!(args.corpus, Some(PathBuf::from("flags")));
        assert!(args.corpus_recursive);
        assert!(!args.recursive, "corpus recursion must not leak into query paths");
        assert_eq!(match_config.buckets_per_dimension, 16);
        assert_eq!(match_config.retrieval, RetrievalPolicy::Neighbors { radius: 2 });
        assert_eq!(match_config.ratio_tolerance, Tolerance::Relative(0.1));
        assert_eq!(match_config.edge_tolerance, Tolerance::Relative(0.006));
        assert_eq!(match_config.edges.kernel_size, 5);
        assert_eq!(args.format(), OutputFormat::Json);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = config(
            r"
[corpus]
dir = 'flags'

[matching]
buckets_per_dimension = 16
neighbor_radius = 2
ratio_tolerance = 0.1
",
        );
        let args = IdentifyArgs::with_config(
            parse(&[
                "q.png",
                "--corpus",
                "other",
                "--buckets",
                "4",
                "--exact",
                "--ratio-tolerance",
                "0.02",
            ]),
            &config,
        );
        let match_config = args.match_config();

        assert_eq!(args.corpus, Some(PathBuf::from("other")));
        assert_eq!(match_config.buckets_per_dimension, 4);
        assert_eq!(match_config.retrieval, RetrievalPolicy::Exact);
        assert_eq!(match_config.ratio_tolerance, Tolerance::Absolute(0.02));
    }

    #[test]
    fn test_zero_radius_is_exact() {
        let args = IdentifyArgs::with_config(
            parse(&["q.png", "--neighbor-radius", "0"]),
            &AppConfig::default(),
        );
        assert_eq!(args.retrieval(), RetrievalPolicy::Exact);
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_buckets("16"), Ok(16));
        assert!(parse_buckets("12").is_err());
        assert!(parse_buckets("512").is_err());
        assert!(parse_tolerance("-0.1").is_err());
        assert!(parse_tolerance("NaN").is_err());
        assert!(parse_tolerance("0").is_ok());
    }

    #[test]
    fn test_process_images_reports_every_outcome() {
        let red = SyntheticFlagBuilder::solid("Red", 50, 50, colors::RED);
        let green = SyntheticFlagBuilder::solid("Green", 50, 50, colors::GREEN);
        let corpus = ReferenceCorpus::from_flags(vec![red.clone(), green]).unwrap();
        let engine = MatchEngine::new(corpus, MatchConfig::default()).unwrap();

        let source = MockImageSource::new(vec![
            SyntheticFlagBuilder::renamed(&red, "red.png"),
            SyntheticFlagBuilder::solid("blue.png", 50, 50, colors::BLUE),
        ])
        .with_failure("broken.png: not an image");
        let progress = MockProgressSink::new();
        let output = MockResultOutput::new();

        let summary =
            process_images(&source, &engine, &progress, |result| output.write(&result)).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.identified, 1);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.exit_code, ExitCode::Unresolved);

        let results = output.results();
        assert_eq!(results[0].candidates, ["Red"]);
        assert_eq!(results[1].status, MatchStatus::Unmatched);

        assert_eq!(progress.started_count(), 2);
        assert_eq!(progress.completed_count(), 2);
        assert_eq!(progress.skipped_count(), 1);
        assert_eq!(progress.finished_counts(), Some((2, 1)));
    }

    #[test]
    fn test_all_identified_is_success() {
        let red = SyntheticFlagBuilder::solid("Red", 50, 50, colors::RED);
        let corpus = ReferenceCorpus::from_flags(vec![red.clone()]).unwrap();
        let engine = MatchEngine::new(corpus, MatchConfig::default()).unwrap();
        let source = MockImageSource::new(vec![SyntheticFlagBuilder::renamed(&red, "q.png")]);

        let summary =
            process_images(&source, &engine, &MockProgressSink::new(), |_| Ok(())).unwrap();
        assert_eq!(summary.exit_code, ExitCode::Success);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_unmatched_query_is_unresolved() {
        let red = SyntheticFlagBuilder::solid("Red", 50, 50, colors::RED);
        let corpus = ReferenceCorpus::from_flags(vec![red]).unwrap();
        let engine = MatchEngine::new(corpus, MatchConfig::default()).unwrap();
        let source = MockImageSource::new(vec![SyntheticFlagBuilder::solid(
            "blue.png",
            50,
            50,
            colors::BLUE,
        )]);

        let summary =
            process_images(&source, &engine, &MockProgressSink::new(), |_| Ok(())).unwrap();
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.identified + summary.ambiguous, 0);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.exit_code, ExitCode::Unresolved);
    }
}
