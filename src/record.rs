//! JSON-lines recording of applied metrics polls.
//!
//! Each line is the snapshot as received plus a `ts` field (Unix seconds),
//! so a run can be replayed or plotted offline.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sdnwatch_types::MetricsSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLine {
    pub ts: f64,
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
}

impl RecordLine {
    pub fn new(snapshot: MetricsSnapshot, at: DateTime<Utc>) -> Self {
        Self {
            ts: at.timestamp_millis() as f64 / 1_000.0,
            snapshot,
        }
    }
}

#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
}

impl Recorder {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open record file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    pub fn record(&mut self, snapshot: &MetricsSnapshot, at: DateTime<Utc>) -> Result<()> {
        let line = RecordLine::new(snapshot.clone(), at);
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.lines += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines written by this recorder.
    pub fn lines(&self) -> u64 {
        self.lines
    }
}

/// Read a recording back. Blank lines are skipped.
pub fn read_records(path: &Path) -> Result<Vec<RecordLine>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed record", path.display(), idx + 1))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sdnwatch_types::BackendState;

    #[test]
    fn test_record_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let at = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();

        let mut recorder = Recorder::open(&path).unwrap();
        let snapshot = MetricsSnapshot {
            throughput: Some(42.0),
            state: Some(BackendState::Congested),
            ..Default::default()
        };
        recorder.record(&snapshot, at).unwrap();
        recorder.record(&MetricsSnapshot::default(), at).unwrap();
        assert_eq!(recorder.lines(), 2);

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ts, 1_700_000_000.25);
        assert_eq!(records[0].snapshot.throughput, Some(42.0));
        assert_eq!(records[0].snapshot.state, Some(BackendState::Congested));
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let at = Utc::now();

        Recorder::open(&path)
            .unwrap()
            .record(&MetricsSnapshot::default(), at)
            .unwrap();
        let mut second = Recorder::open(&path).unwrap();
        second.record(&MetricsSnapshot::default(), at).unwrap();
        assert_eq!(second.path(), path.as_path());

        assert_eq!(read_records(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"ts\": 1.0}\n\nnot json\n").unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(format!("{:#}", err).contains(":3:"));
    }
}
