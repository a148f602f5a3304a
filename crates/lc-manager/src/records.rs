//! Persisted connection records and their CSV form.
//!
//! # CSV format
//!
//! One row per enabled edge.  Order carries no meaning.
//!
//! ```csv
//! source_lane,target_lane,source_start_node,group,legacy_bidirectional
//! 0,2,false,road,false
//! 7,7,true,track,false
//! 3,5,false,,true
//! ```
//!
//! | Column                 | Meaning                                          |
//! |------------------------|--------------------------------------------------|
//! | `group`                | `road`, `track`, or empty for pre-group records  |
//! | `legacy_bidirectional` | old records that stood for both directions       |
//!
//! Rows with an empty `group` or `legacy_bidirectional = true` are replayed
//! in both directions on load.
//!
//! A row that fails to parse is logged and skipped so one bad entry cannot
//! take the rest of the file down with it.  I/O failures are errors.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use lc_core::{ConnectionGroup, LaneId};

use crate::PersistResult;

/// One persisted directed connection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub source_lane:          LaneId,
    pub target_lane:          LaneId,
    pub source_start_node:    bool,
    /// `None` on records written before groups existed.
    #[serde(default)]
    pub group:                Option<ConnectionGroup>,
    #[serde(default)]
    pub legacy_bidirectional: bool,
}

impl ConnectionRecord {
    pub fn new(
        source_lane:       LaneId,
        target_lane:       LaneId,
        source_start_node: bool,
        group:             ConnectionGroup,
    ) -> Self {
        Self {
            source_lane,
            target_lane,
            source_start_node,
            group: Some(group),
            legacy_bidirectional: false,
        }
    }

    /// Whether loading should also replay `target → source`.
    #[inline]
    pub fn replays_reverse(&self) -> bool {
        self.group.is_none() || self.legacy_bidirectional
    }

    /// Whether the sub-manager for `group` should look at this record.
    #[inline]
    pub fn applies_to(&self, group: ConnectionGroup) -> bool {
        self.group.is_none_or(|g| g == group)
    }
}

// ── Writing ───────────────────────────────────────────────────────────────────

/// Write `records` as CSV, header first.
pub fn write_records<W: Write>(writer: W, records: &[ConnectionRecord]) -> PersistResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Like [`write_records`] but creates (or truncates) the file at `path`.
pub fn write_records_path(path: &Path, records: &[ConnectionRecord]) -> PersistResult<()> {
    let file = std::fs::File::create(path)?;
    write_records(file, records)?;
    tracing::info!(path = %path.display(), records = records.len(), "connection records written");
    Ok(())
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// Read records from any CSV source.  Malformed rows are skipped.
///
/// Useful for testing (pass a `std::io::Cursor`) or for save blobs that do
/// not live in a file.
pub fn read_records<R: Read>(reader: R) -> PersistResult<Vec<ConnectionRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (row, result) in csv_reader.deserialize::<ConnectionRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => tracing::warn!(row = row + 1, error = %e, "skipping malformed connection record"),
        }
    }
    Ok(records)
}

/// Like [`read_records`] but opens the file at `path`.
pub fn read_records_path(path: &Path) -> PersistResult<Vec<ConnectionRecord>> {
    let file = std::fs::File::open(path)?;
    let records = read_records(file)?;
    tracing::info!(path = %path.display(), records = records.len(), "connection records read");
    Ok(records)
}
