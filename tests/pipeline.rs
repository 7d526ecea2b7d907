use anyhow::Result;

use ppe_watch::ingest::stub::{StubConfig, StubSource};
use ppe_watch::{
    BoundingBox, DetectionSource, FrameDetections, PersonDetection, Session, SessionLog,
};

/// In-memory detection source for scripted scenarios.
struct VecSource {
    frames: std::vec::IntoIter<FrameDetections>,
}

impl VecSource {
    fn new(frames: Vec<FrameDetections>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl DetectionSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        Ok(self.frames.next())
    }
}

fn person_box() -> BoundingBox {
    BoundingBox::new(100, 50, 200, 250)
}

fn helmet_box() -> BoundingBox {
    BoundingBox::new(140, 60, 170, 90)
}

fn tracked_person(id: u32) -> PersonDetection {
    PersonDetection {
        track_id: Some(id),
        bbox: person_box(),
    }
}

fn scenario_frames() -> Vec<FrameDetections> {
    let fps = 25.0;
    vec![
        // frame 1: helmet present in the head band
        FrameDetections {
            frame: 1,
            timestamp: 1.0 / fps,
            helmets: vec![helmet_box()],
            persons: vec![tracked_person(7)],
        },
        // frame 2: unchanged
        FrameDetections {
            frame: 2,
            timestamp: 2.0 / fps,
            helmets: vec![helmet_box()],
            persons: vec![tracked_person(7)],
        },
        // frame 3: helmet gone
        FrameDetections {
            frame: 3,
            timestamp: 3.0 / fps,
            helmets: vec![],
            persons: vec![tracked_person(7)],
        },
    ]
}

fn run(mut source: impl DetectionSource) -> Result<SessionLog> {
    let mut session = Session::new();
    while let Some(detections) = source.next_frame()? {
        session.process_frame(&detections);
    }
    Ok(session.finish())
}

#[test]
fn end_to_end_change_log() -> Result<()> {
    let log = run(VecSource::new(scenario_frames()))?;

    // frames 1 and 3 only; frame 2 carried no change
    assert_eq!(log.len(), 2);

    let first = &log.records()[0];
    assert_eq!(first.frame, 1);
    assert_eq!(first.detections.len(), 1);
    let event = &first.detections[0];
    assert_eq!(event.id, 7);
    assert!(event.casco);
    assert_eq!(event.bbox, person_box());
    assert_eq!(event.frame, 1);

    let second = &log.records()[1];
    assert_eq!(second.frame, 3);
    assert_eq!(second.detections.len(), 1);
    assert_eq!(second.detections[0].id, 7);
    assert!(!second.detections[0].casco);
    Ok(())
}

#[test]
fn persisted_format_field_names() -> Result<()> {
    let log = run(VecSource::new(scenario_frames()))?;
    let json: serde_json::Value = serde_json::from_slice(&log.to_json()?)?;

    let record = &json[0];
    assert!(record.get("frame").is_some());
    assert!(record.get("timestamp").is_some());
    let event = &record["detections"][0];
    assert_eq!(event["id"], 7);
    assert_eq!(event["casco"], true);
    assert_eq!(event["bbox"]["x_min"], 100);
    assert_eq!(event["bbox"]["y_min"], 50);
    assert_eq!(event["bbox"]["x_max"], 200);
    assert_eq!(event["bbox"]["y_max"], 250);
    Ok(())
}

#[test]
fn replay_produces_byte_identical_logs() -> Result<()> {
    let first = run(VecSource::new(scenario_frames()))?.to_json()?;
    let second = run(VecSource::new(scenario_frames()))?.to_json()?;
    assert_eq!(first, second);

    let stub_a = run(StubSource::new(StubConfig::default()))?.to_json()?;
    let stub_b = run(StubSource::new(StubConfig::default()))?.to_json()?;
    assert_eq!(stub_a, stub_b);
    Ok(())
}

#[test]
fn stub_scene_yields_expected_transitions() -> Result<()> {
    let log = run(StubSource::new(StubConfig { frames: 75, fps: 25 }))?;

    // worker 1: first sighting (frame 1), helmet off (frame 26), helmet back
    // on (frame 51); worker 2: first sighting (frame 20). four events total.
    let events: Vec<_> = log
        .records()
        .iter()
        .flat_map(|r| r.detections.iter())
        .collect();
    assert_eq!(events.len(), 4);

    assert_eq!((events[0].id, events[0].frame, events[0].casco), (1, 1, true));
    assert_eq!((events[1].id, events[1].frame, events[1].casco), (2, 20, false));
    assert_eq!((events[2].id, events[2].frame, events[2].casco), (1, 26, false));
    assert_eq!((events[3].id, events[3].frame, events[3].casco), (1, 51, true));
    Ok(())
}

#[test]
fn log_roundtrips_through_json() -> Result<()> {
    let log = run(VecSource::new(scenario_frames()))?;
    let parsed = SessionLog::from_json(&log.to_json()?)?;
    assert_eq!(parsed, log);
    Ok(())
}

#[test]
fn session_with_no_transitions_after_first_frame_stays_compact() -> Result<()> {
    let fps = 25.0;
    let frames: Vec<FrameDetections> = (1..=50)
        .map(|i| FrameDetections {
            frame: i,
            timestamp: i as f64 / fps,
            helmets: vec![helmet_box()],
            persons: vec![tracked_person(7)],
        })
        .collect();

    let log = run(VecSource::new(frames))?;
    // only the first sighting is retained
    assert_eq!(log.len(), 1);
    assert_eq!(log.records()[0].frame, 1);
    Ok(())
}
