//! # Progress Reporting
//!
//! Progress is not an actor of its own. Each actor builds a
//! [`ProgressRecord`] at the end of a unit of work and hands it to the
//! injected [`ProgressSink`].
//!
//! Two sinks ship with the crate:
//! - [`TracingSink`]: structured `info!` events (the default).
//! - [`JsonLinesSink`]: one JSON object per line on stdout.
//!
//! Tests use [`RecordingSink`](crate::framework::mock::RecordingSink).

use crate::model::PipelineStats;
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;
use tracing::{info, warn};

/// One status update from an actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProgressRecord {
    /// A batch finished (or was cut short by shutdown).
    Producer {
        elapsed_seconds: f64,
        buffers: usize,
    },
    /// A worker finished transforming one buffer.
    Consumer {
        worker_id: usize,
        sequence: u64,
        average: f64,
        sample_count: usize,
        elapsed_seconds: f64,
    },
    /// Final accounting, emitted once after every actor has stopped.
    Summary(PipelineStats),
}

/// Destination for progress records. Shared by every actor.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, record: ProgressRecord);
}

/// Logs each record as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, record: ProgressRecord) {
        match record {
            ProgressRecord::Producer {
                elapsed_seconds,
                buffers,
            } => {
                info!(
                    role = "producer",
                    buffers,
                    elapsed_seconds,
                    "Data produced"
                );
            }
            ProgressRecord::Consumer {
                worker_id,
                sequence,
                average,
                sample_count,
                elapsed_seconds,
            } => {
                info!(
                    role = "consumer",
                    worker_id,
                    sequence,
                    average,
                    sample_count,
                    elapsed_seconds,
                    "Calculated average"
                );
            }
            ProgressRecord::Summary(stats) => {
                info!(
                    role = "summary",
                    produced = stats.produced,
                    consumed = stats.consumed,
                    abandoned = stats.abandoned,
                    "Run complete"
                );
            }
        }
    }
}

/// Writes each record as a single JSON line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ProgressSink for JsonLinesSink<W> {
    fn emit(&self, record: ProgressRecord) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Progress output is best-effort; a closed stdout must not stop the pipeline.
        if let Err(e) = write_line(&mut *writer, &record) {
            warn!(error = %e, "Failed to write progress record");
        }
    }
}

fn write_line<W: Write>(writer: &mut W, record: &ProgressRecord) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines_sink_tags_role() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(ProgressRecord::Producer {
            elapsed_seconds: 0.5,
            buffers: 3,
        });
        sink.emit(ProgressRecord::Consumer {
            worker_id: 2,
            sequence: 7,
            average: 0.25,
            sample_count: 22050,
            elapsed_seconds: 0.001,
        });

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["role"], "producer");
        assert_eq!(lines[0]["buffers"], 3);
        assert_eq!(lines[1]["role"], "consumer");
        assert_eq!(lines[1]["worker_id"], 2);
        assert_eq!(lines[1]["sample_count"], 22050);
    }

    #[test]
    fn test_summary_record_flattens_stats() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(ProgressRecord::Summary(PipelineStats {
            produced: 6,
            consumed: 6,
            abandoned: 0,
        }));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(line["role"], "summary");
        assert_eq!(line["produced"], 6);
        assert_eq!(line["abandoned"], 0);
    }
}
