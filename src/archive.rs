use crate::error::Result;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Completed-items marker store backing the resume/skip guarantee.
///
/// One identifier per completed download, appended after the fact. The
/// store decides what can be skipped on a re-run, independently of the
/// executor's own existing-file checks.

/// File name of the on-disk archive, kept next to the downloaded files.
pub const ARCHIVE_FILE_NAME: &str = ".downloaded.txt";

/// Marker store contract: membership checks plus at-least-once idempotent
/// appends. Appending an identifier that is already present is a no-op.
pub trait ArchiveStore: Send {
    fn contains(&self, id: &str) -> bool;
    fn append(&mut self, id: &str) -> Result<()>;
}

/// Append-only archive file, one identifier per line.
pub struct FileArchive {
    path: PathBuf,
    entries: HashSet<String>,
}

impl FileArchive {
    /// Opens (or lazily creates on first append) the archive inside `dir`.
    /// Existing entries are loaded up front; a missing file means an empty
    /// archive, not an error.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(ARCHIVE_FILE_NAME);
        let mut entries = HashSet::new();

        match File::open(&path) {
            Ok(file) => {
                for line in BufReader::new(file).lines() {
                    let line = line?;
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        entries.insert(trimmed.to_string());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        debug!(path = %path.display(), entries = entries.len(), "archive opened");
        Ok(Self { path, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArchiveStore for FileArchive {
    fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    fn append(&mut self, id: &str) -> Result<()> {
        if !self.entries.insert(id.to_string()) {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{id}")?;
        file.flush()?;
        Ok(())
    }
}

/// In-memory archive for tests and dry runs.
#[derive(Default)]
pub struct MemoryArchive {
    entries: HashSet<String>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I: IntoIterator<Item = String>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ArchiveStore for MemoryArchive {
    fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    fn append(&mut self, id: &str) -> Result<()> {
        self.entries.insert(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FileArchive::open(dir.path()).unwrap();
        assert!(archive.is_empty());
        assert!(!archive.contains("anything"));
    }

    #[test]
    fn append_then_reopen_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut archive = FileArchive::open(dir.path()).unwrap();
            archive.append("lesson-a").unwrap();
            archive.append("lesson-b").unwrap();
        }
        let archive = FileArchive::open(dir.path()).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.contains("lesson-a"));
        assert!(archive.contains("lesson-b"));
    }

    #[test]
    fn duplicate_append_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = FileArchive::open(dir.path()).unwrap();
        archive.append("lesson-a").unwrap();
        archive.append("lesson-a").unwrap();
        archive.append("lesson-a").unwrap();

        let contents =
            std::fs::read_to_string(dir.path().join(ARCHIVE_FILE_NAME)).unwrap();
        assert_eq!(contents.lines().filter(|l| *l == "lesson-a").count(), 1);

        let reopened = FileArchive::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn blank_lines_are_ignored_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ARCHIVE_FILE_NAME), "a\n\n  \nb\n").unwrap();
        let archive = FileArchive::open(dir.path()).unwrap();
        assert_eq!(archive.len(), 2);
    }
}
