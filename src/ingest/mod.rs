//! Detection sources.
//!
//! This module provides the sources of per-frame detections consumed by the
//! engine:
//! - Annotation files written by an upstream detector/tracker (JSON lines)
//! - Stub source (deterministic scripted scene for tests and demos)
//!
//! Sources own the configuration concerns the core never sees: confidence
//! thresholds, frame rate, and timestamp assignment. Boxes below threshold
//! are dropped here; the engine receives only accepted detections.
//!
//! Sources MUST yield frames strictly in arrival order and signal end of
//! stream by returning `Ok(None)`.

pub mod file;
pub mod stub;

pub use file::FileSource;
pub use stub::StubSource;

use anyhow::Result;

use crate::FrameDetections;

/// Per-frame detection supplier.
pub trait DetectionSource {
    /// Next frame of detections, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<FrameDetections>>;
}
