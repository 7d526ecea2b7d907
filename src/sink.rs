//! Downstream consumers of per-frame compliance decisions.
//!
//! A sink receives, per frame, the aggregate counts and each person's current
//! box, track id, and compliance boolean. An overlay renderer plugs in here;
//! actual drawing and video encoding are out of engine scope.

use anyhow::Result;

use crate::FrameSummary;

/// Per-frame consumer of compliance decisions.
pub trait ComplianceSink {
    fn consume(&mut self, summary: &FrameSummary) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl ComplianceSink for NullSink {
    fn consume(&mut self, _summary: &FrameSummary) -> Result<()> {
        Ok(())
    }
}

/// Logs frame summaries and emitted events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink {
    events_seen: u64,
}

impl ComplianceSink for LogSink {
    fn consume(&mut self, summary: &FrameSummary) -> Result<()> {
        for event in &summary.events {
            self.events_seen += 1;
            log::info!(
                "event #{}: track={} helmet={} frame={} t={:.2}s",
                self.events_seen,
                event.id,
                event.casco,
                event.frame,
                event.timestamp
            );
        }
        log::debug!(
            "frame {}: persons={} with_helmet={} without_helmet={}",
            summary.frame,
            summary.total,
            summary.with_helmet,
            summary.without_helmet
        );
        Ok(())
    }
}
