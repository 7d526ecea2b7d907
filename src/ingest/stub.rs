//! Stub detection source.
//!
//! Deterministic scripted scene for tests and demos: a worker on a fixed
//! walk who removes their helmet mid-stream and puts it back on, joined by a
//! second, never-compliant worker. Replaying the source always yields the
//! same detections, which makes session-log determinism directly testable.

use anyhow::Result;

use super::DetectionSource;
use crate::{BoundingBox, FrameDetections, PersonDetection};

/// Configuration for the stub scene.
#[derive(Clone, Debug)]
pub struct StubConfig {
    /// Total frames before end of stream.
    pub frames: u64,
    /// Frame rate used to derive timestamps.
    pub fps: u32,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self { frames: 75, fps: 25 }
    }
}

/// Deterministic scripted detection source.
#[derive(Debug)]
pub struct StubSource {
    config: StubConfig,
    frame_count: u64,
}

impl StubSource {
    pub fn new(config: StubConfig) -> Self {
        Self {
            config,
            frame_count: 0,
        }
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frame_count
    }
}

impl DetectionSource for StubSource {
    fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        if self.frame_count >= self.config.frames {
            return Ok(None);
        }
        self.frame_count += 1;
        let frame = self.frame_count;

        // worker 1 walks right 2px per frame
        let walk = (frame * 2) as i32;
        let worker = BoundingBox::new(100 + walk, 50, 200 + walk, 250);
        let mut persons = vec![PersonDetection {
            track_id: Some(1),
            bbox: worker,
        }];

        // worker 2 enters at frame 20, never wears a helmet
        if frame >= 20 {
            persons.push(PersonDetection {
                track_id: Some(2),
                bbox: BoundingBox::new(400, 60, 490, 260),
            });
        }

        // worker 1's helmet is off during the middle third of the stream
        let third = self.config.frames / 3;
        let helmets = if frame > third && frame <= 2 * third {
            vec![]
        } else {
            vec![BoundingBox::new(130 + walk, 60, 170 + walk, 90)]
        };

        Ok(Some(FrameDetections {
            frame,
            timestamp: frame as f64 / self.config.fps as f64,
            helmets,
            persons,
        }))
    }
}
