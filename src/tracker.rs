//! Per-track compliance state and change detection.
//!
//! The tracker owns the only mutable state in the engine: one boolean per
//! track id, created on first sighting and never evicted for the lifetime of
//! a session. No other component writes to it.
//!
//! There is no notion of frame recency: a track id that disappears for many
//! frames and later reappears is treated as continuously known. If the
//! upstream tracker reuses an identifier for a different physical person
//! after a long absence, the reused id inherits the old state. Known
//! limitation, kept for parity with the deployed heuristic.

use std::collections::HashMap;

use crate::{BoundingBox, ComplianceEvent};

/// Track-id keyed compliance state. One instance per session.
#[derive(Debug, Default)]
pub struct ComplianceTracker {
    states: HashMap<u32, bool>,
}

impl ComplianceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `has_helmet` against the stored state for `track_id`.
    ///
    /// First sighting and state flips store the new value and produce an
    /// event; an unchanged state produces nothing and mutates nothing.
    pub fn evaluate(
        &mut self,
        track_id: u32,
        has_helmet: bool,
        frame: u64,
        timestamp: f64,
        bbox: BoundingBox,
    ) -> Option<ComplianceEvent> {
        match self.states.get(&track_id) {
            Some(&known) if known == has_helmet => None,
            _ => {
                self.states.insert(track_id, has_helmet);
                Some(ComplianceEvent {
                    id: track_id,
                    bbox,
                    casco: has_helmet,
                    timestamp,
                    frame,
                })
            }
        }
    }

    /// Number of track ids seen so far in this session.
    pub fn known_tracks(&self) -> usize {
        self.states.len()
    }

    /// Last known state for a track id, if it has been sighted.
    pub fn state(&self, track_id: u32) -> Option<bool> {
        self.states.get(&track_id).copied()
    }
}
