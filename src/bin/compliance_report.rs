//! compliance_report - per-track summary of a session log

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use clap::Parser;

use ppe_watch::SessionLog;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a session log written by ppewatchd.
    #[arg(long, default_value = "detections.json")]
    log: String,
}

#[derive(Debug)]
struct TrackSummary {
    first_frame: u64,
    first_state: bool,
    last_state: bool,
    transitions: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bytes = std::fs::read(&args.log)
        .map_err(|e| anyhow!("failed to read session log {}: {}", args.log, e))?;
    let log = SessionLog::from_json(&bytes)
        .map_err(|e| anyhow!("invalid session log {}: {}", args.log, e))?;

    let mut tracks: BTreeMap<u32, TrackSummary> = BTreeMap::new();
    let mut total_events = 0u64;

    for record in log.records() {
        for event in &record.detections {
            total_events += 1;
            tracks
                .entry(event.id)
                .and_modify(|summary| {
                    summary.transitions += 1;
                    summary.last_state = event.casco;
                })
                .or_insert(TrackSummary {
                    first_frame: event.frame,
                    first_state: event.casco,
                    last_state: event.casco,
                    transitions: 0,
                });
        }
    }

    println!(
        "{}: {} frame records, {} events, {} tracks",
        args.log,
        log.len(),
        total_events,
        tracks.len()
    );
    for (id, summary) in &tracks {
        println!(
            "track {:>5}: first seen frame {} ({}), {} transition(s), final state {}",
            id,
            summary.first_frame,
            state_label(summary.first_state),
            summary.transitions,
            state_label(summary.last_state)
        );
    }

    let non_compliant = tracks.values().filter(|t| !t.last_state).count();
    if non_compliant > 0 {
        println!("{} track(s) ended the session without a helmet", non_compliant);
    }
    Ok(())
}

fn state_label(has_helmet: bool) -> &'static str {
    if has_helmet {
        "helmet"
    } else {
        "no helmet"
    }
}
