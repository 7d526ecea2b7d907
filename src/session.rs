//! Frame record assembly and the session change log.
//!
//! A session owns one tracker and one log, covering a single run over one
//! stream from first frame to end of stream. Per frame it deduplicates person
//! detections, classifies each unique track id, collects any change events
//! into a `FrameRecord`, and appends the record to the log only when the
//! event list is non-empty. The log is a change log, not a per-frame
//! snapshot log; no-change frames leave no trace in it.
//!
//! Serialization produces the full log once, at end of stream. The core
//! returns JSON bytes and performs no file I/O itself.

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    associate, ComplianceEvent, ComplianceTracker, FrameDetections, FrameSummary, PersonStatus,
};

/// One retained frame of the session log: the frame's change events.
///
/// `timestamp` is rounded to 2 decimals at the frame level; event timestamps
/// are kept unrounded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FrameRecord {
    pub frame: u64,
    pub timestamp: f64,
    pub detections: Vec<ComplianceEvent>,
}

/// Append-only ordered sequence of frame records, insertion order = frame
/// order. Past entries are never mutated.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SessionLog {
    records: Vec<FrameRecord>,
}

impl SessionLog {
    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the full log as a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.records)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let records: Vec<FrameRecord> = serde_json::from_slice(bytes)?;
        Ok(Self { records })
    }
}

/// One monitoring run: tracker state plus the accumulated change log.
#[derive(Debug, Default)]
pub struct Session {
    tracker: ComplianceTracker,
    log: SessionLog,
    frames_processed: u64,
    events_emitted: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame of detections, in arrival order.
    ///
    /// Persons without a track id are excluded entirely. Duplicate track ids
    /// within the frame are reduced to their first occurrence. The returned
    /// summary reflects the current per-frame classification of the
    /// deduplicated set, independent of event emission.
    pub fn process_frame(&mut self, detections: &FrameDetections) -> FrameSummary {
        let mut summary = FrameSummary {
            frame: detections.frame,
            timestamp: detections.timestamp,
            ..FrameSummary::default()
        };
        let mut seen_ids: HashSet<u32> = HashSet::new();

        for person in &detections.persons {
            let Some(track_id) = person.track_id else {
                continue;
            };
            if !seen_ids.insert(track_id) {
                continue;
            }

            let has_helmet = associate::has_helmet(&person.bbox, &detections.helmets);
            summary.total += 1;
            if has_helmet {
                summary.with_helmet += 1;
            } else {
                summary.without_helmet += 1;
            }
            summary.statuses.push(PersonStatus {
                track_id,
                bbox: person.bbox,
                has_helmet,
            });

            if let Some(event) = self.tracker.evaluate(
                track_id,
                has_helmet,
                detections.frame,
                detections.timestamp,
                person.bbox,
            ) {
                summary.events.push(event);
            }
        }

        self.frames_processed += 1;
        if !summary.events.is_empty() {
            self.events_emitted += summary.events.len() as u64;
            self.log.records.push(FrameRecord {
                frame: detections.frame,
                timestamp: round2(detections.timestamp),
                detections: summary.events.clone(),
            });
        }
        summary
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn tracker(&self) -> &ComplianceTracker {
        &self.tracker
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted
    }

    /// End of stream: hand the accumulated log to the caller for persistence.
    pub fn finish(self) -> SessionLog {
        self.log
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, PersonDetection};

    fn person_box() -> BoundingBox {
        BoundingBox::new(100, 50, 200, 250)
    }

    fn helmet_in_band() -> BoundingBox {
        BoundingBox::new(140, 60, 170, 90)
    }

    fn frame(index: u64, helmets: Vec<BoundingBox>, persons: Vec<PersonDetection>) -> FrameDetections {
        FrameDetections {
            frame: index,
            timestamp: index as f64 / 25.0,
            helmets,
            persons,
        }
    }

    #[test]
    fn duplicate_track_ids_are_evaluated_once() {
        let mut session = Session::new();
        let persons = vec![
            PersonDetection {
                track_id: Some(7),
                bbox: person_box(),
            },
            PersonDetection {
                track_id: Some(7),
                bbox: BoundingBox::new(105, 55, 205, 255),
            },
        ];
        let summary = session.process_frame(&frame(1, vec![helmet_in_band()], persons));

        assert_eq!(summary.total, 1);
        assert_eq!(summary.events.len(), 1);
        assert_eq!(summary.events[0].id, 7);
        // snapshot comes from the first occurrence
        assert_eq!(summary.events[0].bbox, person_box());
    }

    #[test]
    fn missing_track_id_contributes_nothing() {
        let mut session = Session::new();
        let persons = vec![PersonDetection {
            track_id: None,
            bbox: person_box(),
        }];
        let summary = session.process_frame(&frame(1, vec![helmet_in_band()], persons));

        assert_eq!(summary.total, 0);
        assert!(summary.events.is_empty());
        assert!(session.log().is_empty());
        assert_eq!(session.tracker().known_tracks(), 0);
    }

    #[test]
    fn no_change_frames_are_dropped_from_log() {
        let mut session = Session::new();
        let persons = vec![PersonDetection {
            track_id: Some(7),
            bbox: person_box(),
        }];

        session.process_frame(&frame(1, vec![helmet_in_band()], persons.clone()));
        let summary = session.process_frame(&frame(2, vec![helmet_in_band()], persons));

        assert_eq!(summary.total, 1);
        assert_eq!(summary.with_helmet, 1);
        assert!(summary.events.is_empty());
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.frames_processed(), 2);
    }

    #[test]
    fn counts_reflect_current_classification_without_events() {
        let mut session = Session::new();
        let persons = vec![
            PersonDetection {
                track_id: Some(1),
                bbox: person_box(),
            },
            PersonDetection {
                track_id: Some(2),
                bbox: BoundingBox::new(300, 50, 400, 250),
            },
        ];

        session.process_frame(&frame(1, vec![helmet_in_band()], persons.clone()));
        // frame 2: same classification, no events, counts still reported
        let summary = session.process_frame(&frame(2, vec![helmet_in_band()], persons));

        assert_eq!(summary.total, 2);
        assert_eq!(summary.with_helmet, 1);
        assert_eq!(summary.without_helmet, 1);
        assert!(summary.events.is_empty());
    }

    #[test]
    fn frame_record_timestamp_is_rounded() {
        let mut session = Session::new();
        let persons = vec![PersonDetection {
            track_id: Some(7),
            bbox: person_box(),
        }];
        let mut detections = frame(1, vec![], persons);
        detections.timestamp = 1.0 / 3.0;
        session.process_frame(&detections);

        let record = &session.log().records()[0];
        assert_eq!(record.timestamp, 0.33);
        // event timestamp stays unrounded
        assert_eq!(record.detections[0].timestamp, 1.0 / 3.0);
    }
}
