//! ppe-watch
//!
//! This crate implements the core engine for helmet-compliance monitoring on
//! tracked video streams.
//!
//! # Architecture
//!
//! Per frame, an upstream detector/tracker supplies anonymous helmet boxes and
//! person boxes carrying persistent track identifiers. The engine:
//!
//! 1. **Associates** helmets to persons with a head-band heuristic (`associate`).
//! 2. **Tracks** one compliance boolean per track id and detects changes (`tracker`).
//! 3. **Compacts** the run into a change log: only frames where some person's
//!    state is first established or flips are recorded (`session`).
//!
//! The engine holds by construction:
//!
//! - At most one state entry per track id; the state map never evicts.
//! - At most one event per (track id, frame); duplicate ids within a frame are
//!   reduced to their first occurrence.
//! - Event order in the session log is frame order, then encounter order.
//! - The core performs no I/O; decoding, inference, and rendering live in the
//!   collaborators behind `ingest` and `sink`.
//!
//! # Module Structure
//!
//! - `associate`: head-band helmet association
//! - `tracker`: per-track compliance state and change detection
//! - `session`: frame record assembly and the session change log
//! - `ingest`: detection sources (annotation files, stub scenes)
//! - `sink`: downstream consumers of per-frame compliance decisions
//! - `config`: application configuration surface

use serde::{Deserialize, Serialize};

pub mod associate;
pub mod config;
pub mod ingest;
pub mod session;
pub mod sink;
pub mod tracker;

pub use associate::has_helmet;
pub use ingest::{DetectionSource, FileSource, StubSource};
pub use session::{FrameRecord, Session, SessionLog};
pub use sink::{ComplianceSink, LogSink, NullSink};
pub use tracker::ComplianceTracker;

// -------------------- Geometry --------------------

/// Axis-aligned detector box, pixel coordinates, `x_min < x_max` and
/// `y_min < y_max`. Immutable once produced by a detector; the engine never
/// validates geometry, a degenerate box simply never satisfies the head-band
/// condition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) as f64 / 2.0,
            (self.y_min + self.y_max) as f64 / 2.0,
        )
    }
}

// -------------------- Detections --------------------

/// Person box with the identifier assigned by the upstream tracker.
///
/// `track_id` is `None` when tracking failed for this box; such detections
/// contribute to no state, no event, and no count.
#[derive(Clone, Copy, Debug)]
pub struct PersonDetection {
    pub track_id: Option<u32>,
    pub bbox: BoundingBox,
}

/// One frame's worth of upstream detections, already thresholded by the
/// source that produced them.
#[derive(Clone, Debug, Default)]
pub struct FrameDetections {
    /// 1-based frame index.
    pub frame: u64,
    /// Seconds since start of stream.
    pub timestamp: f64,
    pub helmets: Vec<BoundingBox>,
    pub persons: Vec<PersonDetection>,
}

// -------------------- Events --------------------

/// A compliance transition (or first sighting) for one track id.
///
/// Serialized field names match the persisted log format consumed by
/// downstream tooling; `casco` carries the compliance boolean.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComplianceEvent {
    pub id: u32,
    pub bbox: BoundingBox,
    pub casco: bool,
    pub timestamp: f64,
    pub frame: u64,
}

// -------------------- Per-frame reporting --------------------

/// Current classification of one person in one frame, for overlay rendering.
#[derive(Clone, Copy, Debug)]
pub struct PersonStatus {
    pub track_id: u32,
    pub bbox: BoundingBox,
    pub has_helmet: bool,
}

/// Frame-level aggregate over the deduplicated person set. Reflects the
/// current classification regardless of whether any event was emitted.
#[derive(Clone, Debug, Default)]
pub struct FrameSummary {
    pub frame: u64,
    pub timestamp: f64,
    pub total: usize,
    pub with_helmet: usize,
    pub without_helmet: usize,
    pub statuses: Vec<PersonStatus>,
    /// Events emitted for this frame (empty on no-change frames).
    pub events: Vec<ComplianceEvent>,
}
