//! Shared data structures for drive-test fault analysis
//!
//! This module defines the core types flowing through the pipeline:
//! - Stage 0: Sample (immutable drive-test measurement)
//! - Stage 1: AreaId (segmentation output)
//! - Stage 2: FaultFlags, OverlapReport (fault detector outputs)
//! - Stage 3: AreaStats, AreaProfile (aggregator outputs)
//! - Stage 4: DominantLabel, AreaAnnotation (resolver output side-table)

mod sample;
mod fault;
mod area;
mod capacity;

pub use sample::*;
pub use fault::*;
pub use area::*;
pub use capacity::*;
