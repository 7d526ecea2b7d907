//! ppewatchd - helmet-compliance session runner
//!
//! This runner:
//! 1. Ingests per-frame detections from the configured source
//! 2. Classifies each tracked person with the head-band heuristic
//! 3. Detects per-track compliance changes and accumulates the change log
//! 4. Hands frame summaries to the compliance sink
//! 5. Writes the session log once, at end of stream (or on Ctrl-C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};

use ppe_watch::ingest::file::FileConfig;
use ppe_watch::{
    config::WatchConfig, ComplianceSink, DetectionSource, FileSource, LogSink, Session,
};

const HEALTH_LOG_EVERY_FRAMES: u64 = 250;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = WatchConfig::load()?;
    log::info!(
        "ppewatchd running. input={} output={} fps={}",
        cfg.input,
        cfg.output,
        cfg.fps
    );
    log::info!(
        "confidence thresholds: person={:.2} helmet={:.2}",
        cfg.person_confidence,
        cfg.helmet_confidence
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .map_err(|e| anyhow!("failed to install Ctrl-C handler: {}", e))?;
    }

    let mut source = FileSource::new(FileConfig {
        path: cfg.input.clone(),
        fps: cfg.fps,
        person_confidence: cfg.person_confidence,
        helmet_confidence: cfg.helmet_confidence,
    })?;

    let mut session = Session::new();
    let mut sink = LogSink::default();
    let started = Instant::now();

    while let Some(detections) = source.next_frame()? {
        let summary = session.process_frame(&detections);
        sink.consume(&summary)?;

        if detections.frame % HEALTH_LOG_EVERY_FRAMES == 0 {
            let stats = source.stats();
            log::info!(
                "source frames={} path={} tracks={} log_records={}",
                stats.frames_read,
                stats.path,
                session.tracker().known_tracks(),
                session.log().len()
            );
        }

        if stop.load(Ordering::SeqCst) {
            log::warn!("interrupt received, flushing session log early");
            break;
        }
    }

    let frames = session.frames_processed();
    let events = session.events_emitted();
    let log = session.finish();
    std::fs::write(&cfg.output, log.to_json()?)
        .map_err(|e| anyhow!("failed to write session log {}: {}", cfg.output, e))?;

    let elapsed = started.elapsed();
    log::info!(
        "processing finished in {:.2}s: {} frames, {} events, {} log records",
        elapsed.as_secs_f64(),
        frames,
        events,
        log.len()
    );
    println!("session log written to {}", cfg.output);
    Ok(())
}
