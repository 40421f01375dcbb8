//! Struct archiving functionality
//!
//! Archives are CSV files inside the session's `arch` directory, one row per record. Records must
//! be flat structs (no nested structs or sequences) since that is what the CSV writer supports.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// A default-constructed archiver has no file attached and silently drops records, which allows
/// modules to archive unconditionally whether or not they were given a session.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Could not open the archive file: {0}")]
    FileError(std::io::Error),

    #[error("Could not write the record: {0}")]
    WriteError(csv::Error),

    #[error("Could not flush the archive: {0}")]
    FlushError(std::io::Error)
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a csv.
///
/// Implementors hold an `Archiver` which is set up in their `init` or `new` functions.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    ///
    /// An existing file at that path is truncated.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(session_path)
            .map_err(ArchiveError::FileError)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        if let Some(ref mut w) = self.writer {
            w.serialize(record).map_err(ArchiveError::WriteError)?;
            w.flush().map_err(ArchiveError::FlushError)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        tick: u64,
        bearing_rad: f64
    }

    #[test]
    fn test_inactive_archiver_drops_records() {
        let mut a = Archiver::default();
        assert!(a.writer.is_none());
        assert!(a.serialise(Row { tick: 0, bearing_rad: 0.1 }).is_ok());
    }

    #[test]
    fn test_archive_rows() {
        let parent = std::env::temp_dir().join("util_archive_test");
        let session = Session::new_in("archive_test", &parent).unwrap();

        let mut a = Archiver::from_path(&session, "rows.csv").unwrap();
        a.serialise(Row { tick: 0, bearing_rad: 0.5 }).unwrap();
        a.serialise(Row { tick: 1, bearing_rad: -0.25 }).unwrap();

        let text = std::fs::read_to_string(session.arch_root.join("rows.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["tick,bearing_rad", "0,0.5", "1,-0.25"]);

        let root = session.session_root.clone();
        session.exit();
        std::fs::remove_dir_all(root).ok();
    }
}
