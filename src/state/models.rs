// Data models for the artifact catalogue
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Physical condition of an artifact at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Excellent,
    Good,
    Poor,
}

impl Condition {
    pub fn to_string(&self) -> String {
        match self {
            Condition::Excellent => "excellent".to_string(),
            Condition::Good => "good".to_string(),
            Condition::Poor => "poor".to_string(),
        }
    }

    /// Unknown values read back as no condition at all
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "excellent" => Some(Condition::Excellent),
            "good" => Some(Condition::Good),
            "poor" => Some(Condition::Poor),
            _ => None,
        }
    }

    /// Human-facing label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Poor => "Poor",
        }
    }
}

/// Everything the registration form collects for a new artifact.
///
/// The draft is owned by whoever fills it in and handed to
/// `add_artifact` / `register_artifact` in one piece; the id and the
/// registration timestamp are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDraft {
    pub accession_number: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub material: Option<String>,
    pub manufacture_year: Option<String>,
    pub manufacture_place: Option<String>,
    pub maker: Option<String>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_g: Option<f64>,
    pub condition: Option<Condition>,
    pub location_id: Option<i64>,
    pub registered_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: i64,
    pub accession_number: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub material: Option<String>,
    pub manufacture_year: Option<String>,
    pub manufacture_place: Option<String>,
    pub maker: Option<String>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_g: Option<f64>,
    pub condition: Option<Condition>,
    pub location_id: Option<i64>,
    pub registered_at: NaiveDateTime,
    pub registered_by: Option<String>,
}

/// One row of a search result: the artifact plus where it lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub artifact: Artifact,
    pub category_name: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDetail {
    pub artifact: Artifact,
    pub category_name: Option<String>,
    pub location: Option<StorageLocation>,
}

/// An artifact with everything attached to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDossier {
    pub detail: ArtifactDetail,
    pub photos: Vec<Photo>,
    pub donors: Vec<DonorLinkDetail>,
    pub conservation: Vec<ConservationRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Declared in the schema; nothing walks the hierarchy yet
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: i64,
    pub building: String,
    pub room: Option<String>,
    pub shelf: Option<String>,
    pub notes: Option<String>,
}

impl StorageLocation {
    /// "Building - Room - Shelf", skipping the parts that are missing
    pub fn display_name(&self) -> String {
        let mut parts = vec![self.building.as_str()];
        parts.extend(self.room.as_deref());
        parts.extend(self.shelf.as_deref());
        parts.join(" - ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorLink {
    pub id: i64,
    pub artifact_id: i64,
    pub donor_id: i64,
    pub donated_on: Option<NaiveDate>,
    pub acquisition_type: Option<String>,
    pub notes: Option<String>,
}

/// A donor link joined with the donor's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorLinkDetail {
    pub link: DonorLink,
    pub donor_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub artifact_id: i64,
    pub file_path: String,
    pub description: Option<String>,
    pub photographer: Option<String>,
    pub taken_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibition {
    pub id: i64,
    pub name: String,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservationRecord {
    pub id: i64,
    pub artifact_id: i64,
    pub performed_on: NaiveDate,
    pub action: String,
    pub performed_by: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category_id: i64,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentArtifact {
    pub id: i64,
    pub accession_number: String,
    pub name: String,
    pub registered_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: i64,
    pub per_category: Vec<CategoryCount>,
    pub recent: Vec<RecentArtifact>,
}
