use std::path::Path;

use csv::StringRecord;

use super::PickerError;

pub fn find_column(headers: &StringRecord, column: &str, file: &Path) -> Result<usize, PickerError> {
    headers.iter().position(|h| h.trim() == column).ok_or_else(|| PickerError::MissingColumn {
        column: column.to_string(),
        file: file.display().to_string(),
    })
}

/// Non-empty, trimmed cell value. Blank cells count as missing.
pub fn cell<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|v| !v.is_empty())
}

pub fn ensure_exists(path: &Path) -> Result<(), PickerError> {
    if !path.exists() {
        return Err(PickerError::Custom(format!(
            "Could not find required file: {}",
            path.display()
        )));
    }
    Ok(())
}
