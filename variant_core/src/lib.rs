//! Core library for the img-variants tool.
//!
//! This crate provides everything the shell needs to batch-convert a folder
//! tree of images into resized, size-budgeted AVIF renditions:
//! - Output profile catalog (name, target width, size budget)
//! - Deterministic source file discovery (recursive or flat)
//! - Sequential conversion engine with quality search and progress events
//! - Per-item error taxonomy and the final conversion report
//! - Logging setup shared by all frontends

pub mod discovery;
pub mod encode;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod profiles;
pub mod report;

pub use discovery::{discover_sources, SourceItem, SUPPORTED_SOURCE_EXTENSIONS};
pub use encode::{
    quality_ladder, EncodeOutcome, QUALITY_FLOOR, QUALITY_START, QUALITY_STEP,
};
pub use engine::{run_batch, BatchOptions, NoProgress, ProgressSink};
pub use errors::{ConvertError, FailureKind};
pub use profiles::{default_profiles, validate_catalog, Profile, ProfileError};
pub use report::{
    format_duration, print_summary_report, ConversionReport, ItemFailure, OversizedOutput,
};
