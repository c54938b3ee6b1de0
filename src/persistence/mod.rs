pub mod recent_decks;

use std::{
    fs,
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

pub use recent_decks::{
    RecentDeckEntry,
    RecentDecks,
};

use crate::core::PickerError;

const APP_NAME: &str = "pictopick";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

/// Replaces `path` with `contents` so a crash mid-write never leaves a
/// truncated file: the data goes to a sibling temp file which is then
/// renamed over the target. On error the original file is untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PickerError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PickerError::Custom(format!("Invalid file path: {}", path.display())))?;
    let tmp_path = dir.join(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

pub fn save_json<T: Serialize>(data: &T, filename: &str) -> Result<(), PickerError> {
    save_json_to(data, &get_data_file_path(filename))
}

pub fn save_json_to<T: Serialize>(data: &T, path: &Path) -> Result<(), PickerError> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, json.as_bytes())?;
    debug!("Data saved to: {}", path.display());
    Ok(())
}

pub fn load_json_from<T: for<'de> Deserialize<'de> + Default>(
    path: &Path,
) -> Result<T, PickerError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&json)?;
    debug!("Data loaded from: {}", path.display());
    Ok(data)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(filename: &str) -> T {
    match load_json_from::<T>(&get_data_file_path(filename)) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to load {}: {}. Using defaults.", filename, e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.csv");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new contents").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new contents");
        assert!(!dir.path().join(".deck.csv.tmp").exists());
    }

    #[test]
    fn atomic_write_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("deck.csv");
        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn json_round_trip_and_missing_file_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let missing: HashMap<String, u32> = load_json_from(&path).unwrap();
        assert!(missing.is_empty());

        let mut data = HashMap::new();
        data.insert("decks".to_string(), 3u32);
        save_json_to(&data, &path).unwrap();
        let loaded: HashMap<String, u32> = load_json_from(&path).unwrap();
        assert_eq!(loaded, data);
    }
}
