use chrono::{DateTime, Local};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

/// Finished Tracking session, one CSV row. Append-only; rows are never
/// rewritten.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingRecord {
    pub timestamp: DateTime<Local>,
    /// Time-on-target percentage, 0..=100.
    pub t0_rate: f64,
    pub duration_secs: f64,
}

/// Finished Flicking session, one CSV row. Reaction fields are `None` when
/// the session had no hits and serialize as empty cells.
#[derive(Clone, Debug, PartialEq)]
pub struct FlickingRecord {
    pub timestamp: DateTime<Local>,
    /// Hit percentage, 0..=100.
    pub accuracy: f64,
    pub avg_reaction_ms: Option<f64>,
    pub min_reaction_ms: Option<f64>,
    pub hits: usize,
    pub total: usize,
}

const TRACKING_HEADER: [&str; 4] = ["timestamp", "mode", "t0_rate", "duration"];
const FLICKING_HEADER: [&str; 7] = [
    "timestamp",
    "mode",
    "accuracy",
    "avg_reaction_ms",
    "min_reaction_ms",
    "hits",
    "total",
];

/// Append-only per-mode session history. Each mode gets its own CSV file;
/// a header row is written only when the file is first created. Loads are
/// fail-soft: a missing or damaged file yields an empty or partial list,
/// never an error, so a history problem cannot take down a live session.
#[derive(Clone, Debug)]
pub struct SessionLog {
    dir: PathBuf,
}

impl SessionLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = AppDirs::sessions_dir().unwrap_or_else(|| PathBuf::from("flik_sessions"));
        Self { dir }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn mode_path(&self, mode: &str) -> PathBuf {
        self.dir.join(format!("{mode}.csv"))
    }

    fn open_appender(&self, mode: &str, header: &[&str]) -> io::Result<csv::Writer<std::fs::File>> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.mode_path(mode);
        let needs_header = !path.exists();

        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(header)?;
        }

        Ok(writer)
    }

    pub fn append_tracking(&self, record: &TrackingRecord) -> io::Result<()> {
        let mut writer = self.open_appender("tracking", &TRACKING_HEADER)?;
        writer.write_record([
            record.timestamp.to_rfc3339(),
            "tracking".to_string(),
            format!("{:.2}", record.t0_rate),
            format!("{:.1}", record.duration_secs),
        ])?;
        writer.flush()?;
        Ok(())
    }

    pub fn append_flicking(&self, record: &FlickingRecord) -> io::Result<()> {
        let mut writer = self.open_appender("flicking", &FLICKING_HEADER)?;
        writer.write_record([
            record.timestamp.to_rfc3339(),
            "flicking".to_string(),
            format!("{:.1}", record.accuracy),
            record
                .avg_reaction_ms
                .map_or(String::new(), |ms| format!("{ms:.0}")),
            record
                .min_reaction_ms
                .map_or(String::new(), |ms| format!("{ms:.0}")),
            record.hits.to_string(),
            record.total.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Last `limit` Tracking records in chronological order (oldest first).
    pub fn load_tracking(&self, limit: usize) -> Vec<TrackingRecord> {
        let mut records = Vec::new();

        let reader = ReaderBuilder::new().from_path(self.mode_path("tracking"));
        let Ok(mut reader) = reader else {
            return records;
        };

        for row in reader.records().flatten() {
            let (Some(ts), Some(t0), Some(duration)) = (row.get(0), row.get(2), row.get(3)) else {
                continue;
            };
            let Ok(timestamp) = DateTime::parse_from_rfc3339(ts) else {
                continue;
            };
            let (Ok(t0_rate), Ok(duration_secs)) = (t0.parse(), duration.parse()) else {
                continue;
            };
            records.push(TrackingRecord {
                timestamp: timestamp.with_timezone(&Local),
                t0_rate,
                duration_secs,
            });
        }

        truncate_to_tail(&mut records, limit);
        records
    }

    /// Last `limit` Flicking records in chronological order (oldest first).
    pub fn load_flicking(&self, limit: usize) -> Vec<FlickingRecord> {
        let mut records = Vec::new();

        let reader = ReaderBuilder::new().from_path(self.mode_path("flicking"));
        let Ok(mut reader) = reader else {
            return records;
        };

        for row in reader.records().flatten() {
            let (Some(ts), Some(acc), Some(hits), Some(total)) =
                (row.get(0), row.get(2), row.get(5), row.get(6))
            else {
                continue;
            };
            let Ok(timestamp) = DateTime::parse_from_rfc3339(ts) else {
                continue;
            };
            let (Ok(accuracy), Ok(hits), Ok(total)) = (acc.parse(), hits.parse(), total.parse())
            else {
                continue;
            };
            records.push(FlickingRecord {
                timestamp: timestamp.with_timezone(&Local),
                accuracy,
                avg_reaction_ms: parse_optional_ms(row.get(3)),
                min_reaction_ms: parse_optional_ms(row.get(4)),
                hits,
                total,
            });
        }

        truncate_to_tail(&mut records, limit);
        records
    }
}

fn parse_optional_ms(field: Option<&str>) -> Option<f64> {
    field.filter(|s| !s.is_empty()).and_then(|s| s.parse().ok())
}

fn truncate_to_tail<T>(records: &mut Vec<T>, limit: usize) {
    let excess = records.len().saturating_sub(limit);
    if excess > 0 {
        records.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tracking_record(t0: f64) -> TrackingRecord {
        TrackingRecord {
            timestamp: Local::now(),
            t0_rate: t0,
            duration_secs: 30.0,
        }
    }

    #[test]
    fn tracking_roundtrip() {
        let dir = tempdir().unwrap();
        let log = SessionLog::with_dir(dir.path());

        log.append_tracking(&tracking_record(61.25)).unwrap();
        log.append_tracking(&tracking_record(70.5)).unwrap();

        let loaded = log.load_tracking(10);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].t0_rate, 61.25);
        assert_eq!(loaded[1].t0_rate, 70.5);
        assert_eq!(loaded[0].duration_secs, 30.0);
    }

    #[test]
    fn flicking_roundtrip_with_and_without_hits() {
        let dir = tempdir().unwrap();
        let log = SessionLog::with_dir(dir.path());

        log.append_flicking(&FlickingRecord {
            timestamp: Local::now(),
            accuracy: 70.0,
            avg_reaction_ms: Some(412.0),
            min_reaction_ms: Some(218.0),
            hits: 7,
            total: 10,
        })
        .unwrap();
        log.append_flicking(&FlickingRecord {
            timestamp: Local::now(),
            accuracy: 0.0,
            avg_reaction_ms: None,
            min_reaction_ms: None,
            hits: 0,
            total: 10,
        })
        .unwrap();

        let loaded = log.load_flicking(10);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].avg_reaction_ms, Some(412.0));
        assert_eq!(loaded[0].min_reaction_ms, Some(218.0));
        assert_eq!(loaded[1].avg_reaction_ms, None);
        assert_eq!(loaded[1].min_reaction_ms, None);
        assert_eq!(loaded[1].hits, 0);
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempdir().unwrap();
        let log = SessionLog::with_dir(dir.path());

        log.append_tracking(&tracking_record(10.0)).unwrap();
        log.append_tracking(&tracking_record(20.0)).unwrap();
        log.append_tracking(&tracking_record(30.0)).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("tracking.csv")).unwrap();
        let header_count = raw.lines().filter(|l| l.starts_with("timestamp")).count();
        assert_eq!(header_count, 1);
        assert_eq!(raw.lines().count(), 4);
    }

    #[test]
    fn load_truncates_to_most_recent() {
        let dir = tempdir().unwrap();
        let log = SessionLog::with_dir(dir.path());

        for i in 0..8 {
            log.append_tracking(&tracking_record(i as f64)).unwrap();
        }

        let loaded = log.load_tracking(3);
        assert_eq!(loaded.len(), 3);
        // Chronological: oldest of the kept tail first.
        assert_eq!(loaded[0].t0_rate, 5.0);
        assert_eq!(loaded[2].t0_rate, 7.0);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let log = SessionLog::with_dir(dir.path());
        assert!(log.load_tracking(10).is_empty());
        assert!(log.load_flicking(10).is_empty());
    }

    #[test]
    fn damaged_rows_are_skipped() {
        let dir = tempdir().unwrap();
        let log = SessionLog::with_dir(dir.path());

        log.append_tracking(&tracking_record(55.0)).unwrap();
        let path = dir.path().join("tracking.csv");
        let mut raw = std::fs::read_to_string(&path).unwrap();
        raw.push_str("not-a-date,tracking,abc,def\n");
        std::fs::write(&path, raw).unwrap();
        log.append_tracking(&tracking_record(66.0)).unwrap();

        let loaded = log.load_tracking(10);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].t0_rate, 55.0);
        assert_eq!(loaded[1].t0_rate, 66.0);
    }
}
