use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::advisors::RejectReason;
use crate::buildable::BuildKind;
use crate::query::{CityId, PlayerId, PurchaseCurrency};

/// One structured decision record. Formatting and storage are the sink's
/// business; the engine only emits these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub turn: u32,
    pub player: PlayerId,
    pub city: CityId,
    pub event: LogEvent,
}

/// A single weighted candidate as it appeared in a dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedCandidate {
    pub kind: BuildKind,
    pub name: String,
    pub weight: i32,
    pub turns: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    Production,
    Hurry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpStage {
    Pre,
    Post,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    FlavorChange {
        flavor: String,
        /// Accumulator value after the change.
        value: i32,
        change: i32,
        source: String,
        start: bool,
    },
    StrategyStarted {
        strategy: String,
    },
    StrategyEnded {
        strategy: String,
    },
    SpecializationChanged {
        specialization: Option<String>,
    },
    CandidateRejected {
        kind: BuildKind,
        name: String,
        weight: i32,
        reason: RejectReason,
    },
    WeightDump {
        pipeline: Pipeline,
        stage: DumpStage,
        candidates: Vec<LoggedCandidate>,
    },
    ProductionChosen {
        kind: BuildKind,
        name: String,
        weight: i32,
        turns: i32,
        rush: bool,
        continued: bool,
    },
    HurryChosen {
        kind: BuildKind,
        name: String,
        weight: i32,
        currency: PurchaseCurrency,
    },
}

/// Structured-record sink. Entirely optional; absence must not affect
/// decision outcomes.
pub trait DecisionLog {
    fn record(&mut self, record: &LogRecord);
}

/// Sink that drops everything.
pub struct NullLog;

impl DecisionLog for NullLog {
    fn record(&mut self, _record: &LogRecord) {}
}

/// Sink collecting records in memory, mostly for tests and debugging.
#[derive(Default)]
pub struct MemoryLog {
    pub records: Vec<LogRecord>,
}

impl DecisionLog for MemoryLog {
    fn record(&mut self, record: &LogRecord) {
        self.records.push(record.clone());
    }
}

/// Sink writing one JSON object per line.
pub struct JsonlLog {
    writer: BufWriter<File>,
}

impl JsonlLog {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(JsonlLog {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl DecisionLog for JsonlLog {
    fn record(&mut self, record: &LogRecord) {
        // Decision outcomes may never depend on the sink, so a failed write
        // is reported but not propagated.
        if let Err(err) = serde_json::to_writer(&mut self.writer, record)
            .map_err(io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
        {
            tracing::warn!("decision log write failed: {err}");
        }
    }
}

impl Drop for JsonlLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
