//! Progress reporting on stderr, as an indicatif bar or one line per query.

use std::sync::atomic::{AtomicUsize, Ordering};

use flag_id_core::{IdentifyResult, MatchStatus, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use tracing::warn;

/// Progress bar adapter for CLI output.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
    identified: AtomicUsize,
}

impl ProgressBar {
    /// Creates a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of queries, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show a bar whose message is the latest verdict;
    ///   otherwise print each verdict on its own line
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        let bar = (show_bar && !quiet).then(|| {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        });

        Self {
            bar,
            quiet,
            identified: AtomicUsize::new(0),
        }
    }
}

/// Short verdict for a result, with the stage that settled it.
///
/// `None` for a status this reporter does not know how to describe.
fn verdict(result: &IdentifyResult) -> Option<String> {
    let stage = result.decided_at.label();
    let flags = result.candidates.join(", ");
    match result.status {
        MatchStatus::Identified => Some(format!("{flags} [{stage}]")),
        MatchStatus::Ambiguous => Some(format!("ambiguous ({flags}) [{stage}]")),
        MatchStatus::Unmatched => Some(format!("no match [{stage}]")),
        _ => None,
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { result } => {
                if result.status == MatchStatus::Identified {
                    self.identified.fetch_add(1, Ordering::Relaxed);
                }
                let Some(verdict) = verdict(&result) else {
                    warn!("{}: unrecognized match status {:?}", result.path, result.status);
                    if let Some(bar) = &self.bar {
                        bar.inc(1);
                    }
                    return;
                };
                let line = format!("{}: {verdict}", result.path);
                match &self.bar {
                    Some(bar) => {
                        bar.inc(1);
                        bar.set_message(line);
                    }
                    None => eprintln!("{line}"),
                }
            }
            ProgressEvent::Skipped { path, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                eprintln!("WARN: Skipping {path}: {reason}");
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Some(bar) = &self.bar {
                    let identified = self.identified.load(Ordering::Relaxed);
                    bar.finish_with_message(format!(
                        "Done: {identified} of {processed} identified, {skipped} skipped"
                    ));
                }
            }
        }
    }
}
