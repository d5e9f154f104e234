// State management module
// Handles SQLite persistence and file system operations

pub mod accession;
pub mod db;
pub mod intake;
pub mod models;
pub mod queries;
pub mod search;
pub mod storage;

pub use accession::{current_year, next_accession_number};
pub use db::{init_db, open_in_memory, DbConnection, DbError, DbResult};
pub use intake::{attach_photos, parse_optional_number, register_artifact, RegistrationOutcome};
pub use models::{
    Artifact, ArtifactDetail, ArtifactDossier, ArtifactDraft, ArtifactSummary, Category,
    Condition, Donor, Exhibition, Photo, Statistics, StorageLocation,
};
pub use search::ArtifactQuery;
pub use storage::{backup_database, get_app_data_dir, AppPaths, StorageError};
