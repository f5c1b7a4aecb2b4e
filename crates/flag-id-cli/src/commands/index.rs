//! Index command - show how the reference flags are bucketed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flag_id_adapters::FsCorpusSource;
use flag_id_core::matching::FlagIndex;
use flag_id_core::{BucketCoord, BucketCount, CorpusSource, ResultOutput};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::output::JsonOutput;

/// Arguments for the index command
#[derive(Args)]
pub struct IndexArgs {
    /// Directory of reference flag images
    #[arg(long, value_name = "DIR")]
    pub corpus: Option<PathBuf>,

    /// Read reference flags from subdirectories of the corpus too
    #[arg(long)]
    pub corpus_recursive: bool,

    /// Buckets per color channel (power of two, 1-256)
    #[arg(long)]
    pub buckets: Option<u16>,
}

/// One reference flag's dominant color.
#[derive(Debug, Serialize)]
struct IndexRecord<'a> {
    flag: &'a str,
    bucket: BucketCoord,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio: Option<f32>,
    hex: String,
}

/// Run the index command.
pub fn run(args: &IndexArgs, config: &AppConfig) -> Result<()> {
    let corpus_dir = args
        .corpus
        .as_ref()
        .or(config.corpus.dir.as_ref())
        .context("No reference corpus specified. Use --corpus DIR or set [corpus] dir in a config file")?;
    let buckets = BucketCount::new(
        args.buckets
            .or(config.matching.buckets_per_dimension)
            .unwrap_or_else(|| BucketCount::default().get()),
    )?;

    let recursive = args.corpus_recursive || config.corpus.recursive.unwrap_or(false);
    let corpus = FsCorpusSource::new(corpus_dir)
        .recursive(recursive)
        .load_corpus()
        .with_context(|| format!("Failed to load reference corpus {}", corpus_dir.display()))?;
    let (index, bucket_map) = FlagIndex::build(corpus.iter(), buckets);
    info!("Indexed {} flags", index.len());

    let output = JsonOutput::stdout();
    for flag in corpus.iter() {
        let Some(bucket) = bucket_map.get(&flag.id) else {
            continue;
        };
        output.write_record(&IndexRecord {
            flag: &flag.id,
            bucket: bucket.coord,
            count: bucket.count,
            ratio: bucket.ratio,
            hex: bucket.hex(buckets),
        })?;
    }
    output.flush()?;

    eprintln!(
        "{} flags in {} of {} buckets",
        index.len(),
        index.bucket_count(),
        usize::from(buckets.get()).pow(3)
    );
    Ok(())
}
