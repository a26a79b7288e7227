//! Sequential batch conversion engine.
//!
//! One item is fully processed (decoded, resized, encoded for every profile,
//! buffer dropped) before the next begins. A bad file never takes the batch
//! down; the single exception is a full storage device, which halts the run
//! and marks the report as aborted.

use crate::discovery::{discover_sources, SourceItem};
use crate::encode::{encode_within_budget, flatten_to_rgb, resize_for_width};
use crate::errors::ConvertError;
use crate::profiles::Profile;
use crate::report::{ConversionReport, OversizedOutput};
use std::fs;
use std::path::PathBuf;

/// Inputs for one batch run, constructed once by the shell and passed in.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub profiles: Vec<Profile>,
    /// Recursive mode mirrors the source subtree under each profile
    /// directory; flat mode scans only the top level of the source root.
    pub recursive: bool,
}

/// One-way progress notifications. The engine never waits on the sink.
pub trait ProgressSink {
    /// Fired before an item is processed; `index` is 1-based.
    fn item_started(&self, index: usize, total: usize, filename: &str);
}

/// Sink for headless runs.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn item_started(&self, _index: usize, _total: usize, _filename: &str) {}
}

/// Runs the whole batch and always returns a report: per-item failures,
/// oversized best-effort outputs and early abort are all expressed there
/// rather than as errors.
///
/// The profile catalog is assumed validated (see
/// [`crate::profiles::validate_catalog`]).
pub fn run_batch(options: &BatchOptions, progress: &dyn ProgressSink) -> ConversionReport {
    let items = discover_sources(&options.source_root, options.recursive);
    let total = items.len();
    let mut report = ConversionReport::new(total);

    tracing::info!(
        source = %options.source_root.display(),
        destination = %options.destination_root.display(),
        profiles = options.profiles.len(),
        recursive = options.recursive,
        total,
        "starting batch conversion"
    );

    for (index, item) in items.iter().enumerate() {
        progress.item_started(index + 1, total, &item.file_name());
        tracing::debug!(
            item = %item.relative_path.display(),
            index = index + 1,
            total,
            "processing image"
        );

        let outcome = process_item(item, options, &mut report);
        if record_outcome(&mut report, item, outcome) {
            break;
        }
    }

    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed(),
        oversized = report.oversized.len(),
        aborted = report.aborted,
        "batch finished"
    );
    report
}

/// Folds one item's outcome into the report. Returns true when the batch
/// must halt (device full).
fn record_outcome(
    report: &mut ConversionReport,
    item: &SourceItem,
    outcome: Result<(), ConvertError>,
) -> bool {
    match outcome {
        Ok(()) => {
            report.success();
            false
        }
        Err(err) => {
            let halt = err.halts_batch();
            if halt {
                tracing::error!(item = %item.absolute_path.display(), %err, "storage device full, aborting batch");
            } else {
                tracing::warn!(item = %item.absolute_path.display(), %err, "skipping image");
            }
            report.fail(&item.absolute_path, &err);
            if halt {
                report.aborted = true;
            }
            halt
        }
    }
}

/// Decode once, then produce every profile's rendition. Any error inside the
/// profile loop fails the whole item; remaining profiles are not attempted.
fn process_item(
    item: &SourceItem,
    options: &BatchOptions,
    report: &mut ConversionReport,
) -> Result<(), ConvertError> {
    let decoded = image::open(&item.absolute_path)
        .map_err(|e| ConvertError::from_image(&item.absolute_path, e))?;
    let rgb = flatten_to_rgb(decoded);

    for profile in &options.profiles {
        let out_dir = profile_dir(options, profile, item);
        fs::create_dir_all(&out_dir).map_err(|e| ConvertError::from_io(&out_dir, e))?;
        let out_path = out_dir.join(output_file_name(item));

        let scaled = resize_for_width(&rgb, profile.target_width);
        let frame = scaled.as_ref().unwrap_or(&rgb);

        let outcome = encode_within_budget(frame, profile.max_size_kb, &out_path)?;
        if outcome.within_budget {
            tracing::debug!(
                profile = %profile.name,
                out = %out_path.display(),
                quality = outcome.quality,
                size_kb = format_args!("{:.1}", outcome.size_kb()),
                attempts = outcome.attempts,
                "variant written"
            );
        } else {
            tracing::warn!(
                profile = %profile.name,
                out = %out_path.display(),
                size_kb = format_args!("{:.1}", outcome.size_kb()),
                budget_kb = profile.max_size_kb,
                "size budget missed at floor quality, keeping best-effort output"
            );
            report.oversized.push(OversizedOutput {
                path: out_path,
                profile: profile.name.clone(),
                size_kb: outcome.size_kb(),
                budget_kb: profile.max_size_kb,
            });
        }
    }

    Ok(())
}

/// `destination_root/<profile>/[<relative_subdir>]`. In flat mode the
/// relative path is a bare filename, so this collapses to the profile dir.
fn profile_dir(options: &BatchOptions, profile: &Profile, item: &SourceItem) -> PathBuf {
    let base = options.destination_root.join(&profile.name);
    match item.relative_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => base.join(parent),
        _ => base,
    }
}

fn output_file_name(item: &SourceItem) -> String {
    let stem = item
        .relative_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    format!("{}.avif", stem)
}
