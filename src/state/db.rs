// SQLite database setup and migrations
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} '{value}' already exists")]
    UniquenessViolation { entity: &'static str, value: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Map a failed insert to `UniquenessViolation` when SQLite rejected it
    /// for a duplicate key, otherwise keep the SQLite error
    pub(crate) fn from_insert(err: rusqlite::Error, entity: &'static str, value: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            let code = failure.extended_code;
            if code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            {
                return DbError::UniquenessViolation {
                    entity,
                    value: value.to_string(),
                };
            }
        }
        DbError::Sqlite(err)
    }

    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, DbError::UniquenessViolation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Categories every new catalogue starts with
pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "Household",
    "Agriculture",
    "Textiles",
    "Tools",
    "Furniture",
    "Documents",
    "Art",
    "Toys",
    "Clothing",
    "Kitchenware",
    "Crafts",
    "Other",
];

// Shared database connection handle
pub struct DbConnection {
    conn: Arc<Mutex<Connection>>,
}

impl DbConnection {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Only one thread ever touches the catalogue, a poisoned lock still holds a usable connection
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clone for DbConnection {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Open (or create) the catalogue database at `db_path`
pub fn init_db(db_path: &Path) -> DbResult<DbConnection> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    initialize(&conn)?;

    log::info!("Opened catalogue database at {}", db_path.display());
    Ok(DbConnection::new(conn))
}

/// Open a throwaway catalogue, used by tests and dry runs
pub fn open_in_memory() -> DbResult<DbConnection> {
    let conn = Connection::open_in_memory()?;
    initialize(&conn)?;
    Ok(DbConnection::new(conn))
}

/// Prepare a fresh connection: pragmas, SQL functions, schema and seed data.
/// Safe to call repeatedly on the same database.
pub fn initialize(conn: &Connection) -> DbResult<()> {
    // Enable foreign keys, needed for ON DELETE SET NULL
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    register_functions(conn)?;
    run_migrations(conn)?;
    seed_default_categories(conn)?;
    Ok(())
}

/// `fold_case(text)` lowercases with full Unicode rules; SQLite's own
/// `lower()` and `LIKE` only fold ASCII
fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )?;
    Ok(())
}

fn seed_default_categories(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO categories (name) VALUES (?1)")?;
    let mut inserted = 0;
    for name in DEFAULT_CATEGORIES {
        inserted += stmt.execute(params![name])?;
    }

    if inserted > 0 {
        log::info!("Seeded {} default categories", inserted);
    }
    Ok(())
}

fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Get current version
    let current_version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    // Apply migrations
    if current_version < 1 {
        migration_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [1])?;
        log::info!("Applied schema migration v1");
    }

    Ok(())
}

fn migration_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            parent_id INTEGER,
            FOREIGN KEY (parent_id) REFERENCES categories(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS locations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            building TEXT NOT NULL,
            room TEXT,
            shelf TEXT,
            notes TEXT
        );

        CREATE TABLE IF NOT EXISTS artifacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            accession_number TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT,
            category_id INTEGER,
            material TEXT,
            manufacture_year TEXT,
            manufacture_place TEXT,
            maker TEXT,
            length_cm REAL,
            width_cm REAL,
            height_cm REAL,
            weight_g REAL,
            condition TEXT,
            location_id INTEGER,
            registered_at TEXT NOT NULL,
            registered_by TEXT,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL,
            FOREIGN KEY (location_id) REFERENCES locations(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_artifacts_category_id ON artifacts(category_id);
        CREATE INDEX IF NOT EXISTS idx_artifacts_location_id ON artifacts(location_id);
        CREATE INDEX IF NOT EXISTS idx_artifacts_registered_at ON artifacts(registered_at DESC);

        CREATE TABLE IF NOT EXISTS donors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            address TEXT,
            phone TEXT,
            email TEXT,
            notes TEXT
        );

        CREATE TABLE IF NOT EXISTS artifact_donors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artifact_id INTEGER NOT NULL,
            donor_id INTEGER NOT NULL,
            donated_on TEXT,
            acquisition_type TEXT,
            notes TEXT,
            FOREIGN KEY (artifact_id) REFERENCES artifacts(id),
            FOREIGN KEY (donor_id) REFERENCES donors(id)
        );

        CREATE INDEX IF NOT EXISTS idx_artifact_donors_artifact_id ON artifact_donors(artifact_id);

        CREATE TABLE IF NOT EXISTS photos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artifact_id INTEGER NOT NULL,
            file_path TEXT NOT NULL,
            description TEXT,
            photographer TEXT,
            taken_on TEXT NOT NULL,
            FOREIGN KEY (artifact_id) REFERENCES artifacts(id)
        );

        CREATE INDEX IF NOT EXISTS idx_photos_artifact_id ON photos(artifact_id);

        CREATE TABLE IF NOT EXISTS exhibitions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            starts_on TEXT,
            ends_on TEXT,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS artifact_exhibitions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artifact_id INTEGER NOT NULL,
            exhibition_id INTEGER NOT NULL,
            FOREIGN KEY (artifact_id) REFERENCES artifacts(id),
            FOREIGN KEY (exhibition_id) REFERENCES exhibitions(id)
        );

        CREATE TABLE IF NOT EXISTS conservation_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artifact_id INTEGER NOT NULL,
            performed_on TEXT NOT NULL,
            action TEXT NOT NULL,
            performed_by TEXT,
            cost REAL,
            notes TEXT,
            FOREIGN KEY (artifact_id) REFERENCES artifacts(id)
        );

        CREATE INDEX IF NOT EXISTS idx_conservation_records_artifact_id ON conservation_records(artifact_id);
        ",
    )?;

    Ok(())
}
