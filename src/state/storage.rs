// File system operations for photos and database backups
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to get app data directory")]
    NoAppDataDir,
    #[error("File not found: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("Invalid file name: {}", .0.display())]
    InvalidFileName(PathBuf),
    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

pub const DATABASE_FILE: &str = "hembygdsmuseum.db";
const IMAGES_DIR: &str = "images";
const BACKUP_DIR: &str = "backup";

/// Get the default data directory for the catalogue
pub fn get_app_data_dir() -> StorageResult<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(StorageError::NoAppDataDir)?;
    Ok(data_dir.join("hembygd"))
}

/// Locations of everything the catalogue keeps on disk
#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub database: PathBuf,
    pub images: PathBuf,
    pub backup: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            database: root.join(DATABASE_FILE),
            images: root.join(IMAGES_DIR),
            backup: root.join(BACKUP_DIR),
            root,
        }
    }

    /// Create the data, images and backup directories if missing
    pub fn ensure(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(&self.images)?;
        fs::create_dir_all(&self.backup)?;
        Ok(())
    }
}

/// Name under which an incoming photo is stored:
/// `{artifact_id}_{YYYYmmdd_HHMMSS_micros}_{original}`.
/// `attempt` > 0 adds a counter after the timestamp.
pub fn photo_file_name(
    artifact_id: i64,
    original_name: &str,
    at: NaiveDateTime,
    attempt: u32,
) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S_%6f");
    if attempt == 0 {
        format!("{}_{}_{}", artifact_id, stamp, original_name)
    } else {
        format!("{}_{}-{}_{}", artifact_id, stamp, attempt, original_name)
    }
}

/// Copy a photo into the images directory under a collision-free name
/// and return the destination path
pub fn store_photo(images_dir: &Path, artifact_id: i64, source: &Path) -> StorageResult<PathBuf> {
    if !source.is_file() {
        return Err(StorageError::SourceMissing(source.to_path_buf()));
    }

    let original_name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StorageError::InvalidFileName(source.to_path_buf()))?;

    fs::create_dir_all(images_dir)?;

    let now = Local::now().naive_local();
    let mut attempt = 0;
    let mut destination = images_dir.join(photo_file_name(artifact_id, original_name, now, attempt));
    while destination.exists() {
        attempt += 1;
        destination = images_dir.join(photo_file_name(artifact_id, original_name, now, attempt));
    }

    fs::copy(source, &destination).map_err(|source_err| StorageError::Copy {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: source_err,
    })?;

    Ok(destination)
}

/// Name of a database backup taken at `at`:
/// `hembygdsmuseum_backup_{YYYYmmdd_HHMMSS}.db`.
/// `attempt` > 0 adds a counter before the extension.
pub fn backup_file_name(at: NaiveDateTime, attempt: u32) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    if attempt == 0 {
        format!("hembygdsmuseum_backup_{}.db", stamp)
    } else {
        format!("hembygdsmuseum_backup_{}_{}.db", stamp, attempt)
    }
}

/// Copy the live database file into the backup directory with a timestamped name
pub fn backup_database(paths: &AppPaths) -> StorageResult<PathBuf> {
    backup_database_at(paths, Local::now().naive_local())
}

/// Same as `backup_database`, stamped with `at`
pub fn backup_database_at(paths: &AppPaths, at: NaiveDateTime) -> StorageResult<PathBuf> {
    if !paths.database.is_file() {
        return Err(StorageError::SourceMissing(paths.database.clone()));
    }
    fs::create_dir_all(&paths.backup)?;

    let mut attempt = 0;
    let mut target = paths.backup.join(backup_file_name(at, attempt));
    while target.exists() {
        attempt += 1;
        target = paths.backup.join(backup_file_name(at, attempt));
    }

    fs::copy(&paths.database, &target).map_err(|source| StorageError::Copy {
        from: paths.database.clone(),
        to: target.clone(),
        source,
    })?;

    log::info!("Database backed up to {}", target.display());
    Ok(target)
}
