use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use crate::error::Result;

pub const FIELDNAMES: [&str; 5] = ["id", "date", "amount", "category", "note"];

pub type ExpenseID = u32;

/// One row of the expense file. Date and amount keep the text the user typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseID,
    pub date: String,
    pub amount: String,
    pub category: String,
    pub note: String,
}

/// Reads every record of the file in file order.
/// A row that fails to parse fails the whole read, since the next rewrite would drop it.
pub fn read_records(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let file = File::open(path)?;
    let records = csv::ReaderBuilder::new()
        .from_reader(file)
        .into_deserialize()
        .collect::<std::result::Result<Vec<ExpenseRecord>, csv::Error>>()?;
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Replaces the file with the header followed by `records`, in order.
pub fn write_records(path: &Path, records: &[ExpenseRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Written next to the target so the rename stays on one filesystem.
    let temp_path = temp_path_for(path);
    if let Err(e) = write_to(&temp_path, records) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    if let Err(e) = fs::rename(&temp_path, path) {
        warn!("Failed to move {} into place: {}", temp_path.display(), e);
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn write_to(path: &Path, records: &[ExpenseRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(FIELDNAMES)?;
    for record in records {
        writer.serialize(record)?;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
