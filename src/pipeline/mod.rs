// LogCorral - pipeline/mod.rs
//
// Pipeline orchestration layer: stage sequencing, per-file failure
// accumulation, progress events.

pub mod run;

pub use run::{list_source_files, run_pipeline, PipelineConfig};
