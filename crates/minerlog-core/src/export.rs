//! Buffer export.
//!
//! Always exports everything currently retained. Filters only affect what
//! is shown, never what is saved.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::buffer::LineBuffer;
use crate::error::CoreError;

/// MIME type of the export artifact.
pub const EXPORT_MIME: &str = "text/plain";

/// A rendered export, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogExport {
    /// `miner-logs-<YYYY-MM-DD>_<HH-MM-SS>.txt`
    pub file_name: String,
    /// Every retained line, oldest first, joined by `\n`.
    pub contents: String,
    pub mime: &'static str,
}

impl LogExport {
    /// Write the export into `dir` and return the file's path.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, CoreError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents).map_err(|source| CoreError::Export {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = self.contents.len(), "Log export written");
        Ok(path)
    }
}

/// Export the full buffer, named after the current local time.
///
/// The stamp is the operator's wall clock (`YYYY-MM-DD_HH-MM-SS`, no
/// offset), not UTC, so it matches the times they see on screen.
pub fn export_snapshot(buffer: &LineBuffer) -> LogExport {
    export_snapshot_at(buffer, Local::now().naive_local())
}

/// Export the full buffer with an explicit timestamp (truncated to seconds).
pub fn export_snapshot_at(buffer: &LineBuffer, at: NaiveDateTime) -> LogExport {
    let contents = buffer
        .iter()
        .map(|line| line.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    LogExport {
        file_name: format!("miner-logs-{}.txt", at.format("%Y-%m-%d_%H-%M-%S")),
        contents,
        mime: EXPORT_MIME,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::filter::{LineFilter, visible};
    use crate::sanitize::sanitize_text;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_milli_opt(8, 5, 9, 750)
            .unwrap()
    }

    fn buffer_of(lines: &[&str]) -> LineBuffer {
        let mut buffer = LineBuffer::new(10);
        for text in lines {
            buffer.append(sanitize_text(text).unwrap());
        }
        buffer
    }

    #[test]
    fn file_name_uses_whole_seconds() {
        let export = export_snapshot_at(&LineBuffer::default(), timestamp());
        assert_eq!(export.file_name, "miner-logs-2026-10-19_08-05-09.txt");
        assert_eq!(export.mime, "text/plain");
    }

    #[test]
    fn contents_are_the_full_buffer_joined_by_newlines() {
        let buffer = buffer_of(&["ready", "error: timeout", "ok"]);
        let filter = LineFilter::new("error");
        assert_eq!(visible(&buffer, &filter).count(), 1);

        let export = export_snapshot_at(&buffer, timestamp());
        assert_eq!(export.contents, "ready\nerror: timeout\nok");
    }

    #[test]
    fn empty_buffer_exports_empty_file() {
        let export = export_snapshot(&LineBuffer::default());
        assert_eq!(export.contents, "");
        assert!(export.file_name.starts_with("miner-logs-"));
        assert!(export.file_name.ends_with(".txt"));
    }

    #[test]
    fn save_writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let export = export_snapshot_at(&buffer_of(&["a", "b"]), timestamp());

        let path = export.save_to(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("miner-logs-2026-10-19_08-05-09.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb");
    }

    #[test]
    fn save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = export_snapshot_at(&buffer_of(&["a"]), timestamp())
            .save_to(&missing)
            .unwrap_err();
        assert!(matches!(err, CoreError::Export { .. }), "{err}");
    }
}
