// src/results/mod.rs
// =============================================================================
// This module contains everything about scan results.
//
// Submodules:
// - record: The ScanResult struct, one per fetch attempt
// - report: Prints results as they arrive and a summary at the end
//
// Workers send ScanResult values into a tokio mpsc channel; the Reporter
// owns the receiving end.
// =============================================================================

mod record;
mod report;

pub use record::ScanResult;
pub use report::{Reporter, Summary};

/// The sending half workers emit results into
pub type ResultSink = tokio::sync::mpsc::Sender<ScanResult>;
