//! Annotation file detection source.
//!
//! `FileSource` reads per-frame detections from a local JSON-lines file
//! produced by an upstream detector/tracker: one JSON object per line with
//! `helmets` and `persons` arrays, each box carrying an optional confidence.
//!
//! The file source is responsible for:
//! - Reading annotation lines from a local file (no network access)
//! - Dropping boxes below the configured confidence thresholds
//! - Assigning 1-based frame indices and `frame / fps` timestamps
//!
//! Confidence thresholds live here, not in the engine: raising a threshold
//! trades recall for precision entirely inside this collaborator.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use anyhow::{anyhow, Result};
use serde::Deserialize;

use super::stub::{StubConfig, StubSource};
use super::DetectionSource;
use crate::{BoundingBox, FrameDetections, PersonDetection};

const DEFAULT_FPS: u32 = 25;
const DEFAULT_CONFIDENCE: f32 = 0.3;

/// Configuration for an annotation file source.
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path (e.g., "/var/lib/ppewatch/annotations.jsonl").
    pub path: String,
    /// Frame rate used to derive timestamps.
    pub fps: u32,
    /// Minimum confidence for person boxes.
    pub person_confidence: f32,
    /// Minimum confidence for helmet boxes.
    pub helmet_confidence: f32,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            fps: DEFAULT_FPS,
            person_confidence: DEFAULT_CONFIDENCE,
            helmet_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Annotation file detection source.
#[derive(Debug)]
pub struct FileSource {
    path: String,
    backend: FileBackend,
}

#[derive(Debug)]
enum FileBackend {
    Annotations(AnnotationFileSource),
    Stub(StubSource),
}

impl FileSource {
    pub fn new(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(
                "annotation ingestion only supports local paths (no URL schemes)"
            ));
        }
        let path = config.path.clone();
        if config.path.starts_with("stub://") {
            Ok(Self {
                path,
                backend: FileBackend::Stub(StubSource::new(StubConfig {
                    fps: config.fps,
                    ..StubConfig::default()
                })),
            })
        } else {
            Ok(Self {
                path,
                backend: FileBackend::Annotations(AnnotationFileSource::open(config)?),
            })
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> FileStats {
        let frames_read = match &self.backend {
            FileBackend::Annotations(source) => source.frame_count,
            FileBackend::Stub(source) => source.frames_emitted(),
        };
        FileStats {
            frames_read,
            path: self.path.clone(),
        }
    }
}

impl DetectionSource for FileSource {
    fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        match &mut self.backend {
            FileBackend::Annotations(source) => source.next_frame(),
            FileBackend::Stub(source) => source.next_frame(),
        }
    }
}

/// Statistics for a file source.
#[derive(Clone, Debug)]
pub struct FileStats {
    pub frames_read: u64,
    pub path: String,
}

// ----------------------------------------------------------------------------
// JSON-lines annotation reader
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FrameLine {
    #[serde(default)]
    helmets: Vec<HelmetLine>,
    #[serde(default)]
    persons: Vec<PersonLine>,
}

#[derive(Debug, Deserialize)]
struct HelmetLine {
    bbox: BoundingBox,
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct PersonLine {
    id: Option<u32>,
    bbox: BoundingBox,
    confidence: Option<f32>,
}

#[derive(Debug)]
struct AnnotationFileSource {
    config: FileConfig,
    lines: Lines<BufReader<File>>,
    frame_count: u64,
}

impl AnnotationFileSource {
    fn open(config: FileConfig) -> Result<Self> {
        let file = File::open(&config.path)
            .map_err(|e| anyhow!("failed to open annotation file {}: {}", config.path, e))?;
        log::info!("FileSource: reading annotations from {}", config.path);
        Ok(Self {
            config,
            lines: BufReader::new(file).lines(),
            frame_count: 0,
        })
    }

    fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        let line = loop {
            match self.lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Ok(None),
            }
        };

        self.frame_count += 1;
        let parsed: FrameLine = serde_json::from_str(&line).map_err(|e| {
            anyhow!(
                "invalid annotation line {} in {}: {}",
                self.frame_count,
                self.config.path,
                e
            )
        })?;

        let helmets = parsed
            .helmets
            .into_iter()
            .filter(|h| accepted(h.confidence, self.config.helmet_confidence))
            .map(|h| h.bbox)
            .collect();
        let persons = parsed
            .persons
            .into_iter()
            .filter(|p| accepted(p.confidence, self.config.person_confidence))
            .map(|p| PersonDetection {
                track_id: p.id,
                bbox: p.bbox,
            })
            .collect();

        Ok(Some(FrameDetections {
            frame: self.frame_count,
            timestamp: self.frame_count as f64 / self.config.fps as f64,
            helmets,
            persons,
        }))
    }
}

fn accepted(confidence: Option<f32>, threshold: f32) -> bool {
    confidence.map_or(true, |c| c >= threshold)
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.starts_with("stub://") {
        return true;
    }
    !path.contains("://")
}
