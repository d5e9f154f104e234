// Report generation module
// Renders catalogue data as self-contained HTML documents and hands them to
// the default browser for printing

pub mod html;
pub mod images;
pub mod pages;

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{AppConfig, DEFAULT_MAX_IMAGE_WIDTH};

pub use pages::{
    artifact_list_report, artifact_report, category_list_report, donor_list_report,
    location_list_report, statistics_report,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Could not open {} in a browser: {source}", .path.display())]
    Viewer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    pub max_image_width: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_image_width: DEFAULT_MAX_IMAGE_WIDTH,
        }
    }
}

impl From<&AppConfig> for ReportOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_image_width: config.max_image_width,
        }
    }
}

/// File name friendly version of a report title
fn slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .take(40)
        .collect();
    slug.trim_matches('_').to_string()
}

/// Write a report to a uniquely named `.html` file in the system temp
/// directory. The file is kept after the process exits.
pub fn write_report(html: &str, title: &str) -> ReportResult<PathBuf> {
    write_report_in(&std::env::temp_dir(), html, title)
}

/// Same as `write_report`, inside `dir`
pub fn write_report_in(dir: &Path, html: &str, title: &str) -> ReportResult<PathBuf> {
    let prefix = format!("hembygd_{}_", slug(title));
    let mut file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".html")
        .tempfile_in(dir)?;

    file.write_all(html.as_bytes())?;
    file.flush()?;

    let (_, path) = file.keep().map_err(|e| e.error)?;
    log::info!("Wrote report '{}' to {}", title, path.display());
    Ok(path)
}

/// Absolute path handed to the browser. webbrowser turns local paths into
/// properly encoded `file:` URLs itself.
fn viewer_target(path: &Path) -> ReportResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Open a written report in the default browser
pub fn open_in_viewer(path: &Path) -> ReportResult<()> {
    let target = viewer_target(path)?;
    webbrowser::open(&target.to_string_lossy()).map_err(|source| ReportError::Viewer {
        path: target.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Artifact list"), "artifact_list");
        assert_eq!(slug("2026.001 Vävstol"), "2026_001_vävstol");
        assert_eq!(slug("***"), "");
    }

    #[test]
    fn test_write_report_persists_unique_files() {
        let temp_dir = TempDir::new().unwrap();
        let html = "<!DOCTYPE html><html><body>Hej</body></html>";

        let first = write_report_in(temp_dir.path(), html, "Donor list").unwrap();
        let second = write_report_in(temp_dir.path(), html, "Donor list").unwrap();

        assert_ne!(first, second);
        for path in [&first, &second] {
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
            assert_eq!(fs::read_to_string(path).unwrap(), html);
        }
        let name = first.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("hembygd_donor_list_"));
    }

    #[test]
    fn test_viewer_target_is_plain_absolute_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rapport #1 vävstol.html");

        let target = viewer_target(&path).unwrap();
        assert_eq!(target, path);
        assert!(!target.to_string_lossy().starts_with("file:"));

        let relative = viewer_target(Path::new("report.html")).unwrap();
        assert!(relative.is_absolute());
        assert!(relative.ends_with("report.html"));
    }

    #[test]
    fn test_options_follow_config() {
        let config = AppConfig {
            max_image_width: 320,
            ..Default::default()
        };
        assert_eq!(ReportOptions::from(&config).max_image_width, 320);
        assert_eq!(ReportOptions::default().max_image_width, 800);
    }
}
