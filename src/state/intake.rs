// Artifact registration workflow
// Saves the artifact row, then copies and records each photo. Photo problems
// are collected as warnings and never undo the saved artifact.
use std::fmt;
use std::path::{Path, PathBuf};

use super::db::{DbConnection, DbResult};
use super::models::ArtifactDraft;
use super::queries::{add_artifact, add_photo};
use super::storage::store_photo;

/// A photo that could not be attached, and why
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for PhotoWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Result of attaching a batch of photos
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoAttachment {
    /// Ids of the photo rows created, in input order
    pub attached: Vec<i64>,
    pub warnings: Vec<PhotoWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    pub artifact_id: i64,
    pub photos: PhotoAttachment,
}

/// Save a filled-in registration form along with its photos.
///
/// Fails only when the artifact row itself cannot be saved (for example a
/// duplicate accession number), in which case no photo is copied.
pub fn register_artifact(
    db: &DbConnection,
    images_dir: &Path,
    draft: &ArtifactDraft,
    photos: &[PathBuf],
) -> DbResult<RegistrationOutcome> {
    let artifact_id = add_artifact(db, draft)?;
    let photos = attach_photos(db, images_dir, artifact_id, photos, None, None);

    Ok(RegistrationOutcome { artifact_id, photos })
}

/// Copy each file into `images_dir` and record it against the artifact.
/// A failed copy skips the row; a failed insert after a copy is reported the
/// same way.
pub fn attach_photos(
    db: &DbConnection,
    images_dir: &Path,
    artifact_id: i64,
    sources: &[PathBuf],
    description: Option<&str>,
    photographer: Option<&str>,
) -> PhotoAttachment {
    let mut outcome = PhotoAttachment::default();

    for source in sources {
        let stored = match store_photo(images_dir, artifact_id, source) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Skipping photo {}: {}", source.display(), e);
                outcome.warnings.push(PhotoWarning {
                    path: source.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let stored_path = stored.to_string_lossy();
        match add_photo(db, artifact_id, &stored_path, description, photographer) {
            Ok(photo_id) => {
                log::info!(
                    "Attached photo {} to artifact {} as {}",
                    stored.display(),
                    artifact_id,
                    photo_id
                );
                outcome.attached.push(photo_id);
            }
            Err(e) => {
                log::warn!(
                    "Copied {} but could not record it: {}",
                    stored.display(),
                    e
                );
                outcome.warnings.push(PhotoWarning {
                    path: source.clone(),
                    reason: format!("copied to {} but not recorded: {}", stored.display(), e),
                });
            }
        }
    }

    outcome
}

/// Parse a free-text numeric form field. Blank, malformed or non-finite
/// input is treated as absent; a decimal comma is accepted.
pub fn parse_optional_number(input: Option<&str>) -> Option<f64> {
    let text = input?.trim();
    if text.is_empty() {
        return None;
    }

    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
