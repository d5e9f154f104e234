// Database CRUD operations
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, Row};

use super::db::{DbConnection, DbError, DbResult};
use super::models::{
    Artifact, ArtifactDetail, ArtifactDossier, ArtifactDraft, ArtifactSummary, Category,
    CategoryCount, Condition, ConservationRecord, Donor, DonorLink, DonorLinkDetail, Exhibition,
    Photo, RecentArtifact, Statistics, StorageLocation,
};
use super::search::ArtifactQuery;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How many registrations `compute_statistics` lists
const RECENT_LIMIT: i64 = 10;

// Column list shared by every artifact query, indexes 0..=16
macro_rules! artifact_columns {
    () => {
        "a.id, a.accession_number, a.name, a.description, a.category_id, a.material, \
         a.manufacture_year, a.manufacture_place, a.maker, a.length_cm, a.width_cm, \
         a.height_cm, a.weight_g, a.condition, a.location_id, a.registered_at, a.registered_by"
    };
}

const SUMMARY_SELECT: &str = concat!(
    "SELECT ",
    artifact_columns!(),
    ", c.name, l.building, l.room
     FROM artifacts a
     LEFT JOIN categories c ON a.category_id = c.id
     LEFT JOIN locations l ON a.location_id = l.id"
);

const DETAIL_SELECT: &str = concat!(
    "SELECT ",
    artifact_columns!(),
    ", c.name, l.id, l.building, l.room, l.shelf, l.notes
     FROM artifacts a
     LEFT JOIN categories c ON a.category_id = c.id
     LEFT JOIN locations l ON a.location_id = l.id
     WHERE a.id = ?1"
);

// ==================== ROW HELPERS ====================

fn conversion_error(idx: usize, err: chrono::ParseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn optional_date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(Some)
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn artifact_from_row(row: &Row<'_>) -> rusqlite::Result<Artifact> {
    Ok(Artifact {
        id: row.get(0)?,
        accession_number: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        category_id: row.get(4)?,
        material: row.get(5)?,
        manufacture_year: row.get(6)?,
        manufacture_place: row.get(7)?,
        maker: row.get(8)?,
        length_cm: row.get(9)?,
        width_cm: row.get(10)?,
        height_cm: row.get(11)?,
        weight_g: row.get(12)?,
        condition: row
            .get::<_, Option<String>>(13)?
            .as_deref()
            .and_then(Condition::from_string),
        location_id: row.get(14)?,
        registered_at: timestamp_at(row, 15)?,
        registered_by: row.get(16)?,
    })
}

fn location_from_row(row: &Row<'_>) -> rusqlite::Result<StorageLocation> {
    Ok(StorageLocation {
        id: row.get(0)?,
        building: row.get(1)?,
        room: row.get(2)?,
        shelf: row.get(3)?,
        notes: row.get(4)?,
    })
}

fn donor_from_row(row: &Row<'_>) -> rusqlite::Result<Donor> {
    Ok(Donor {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        notes: row.get(5)?,
    })
}

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        artifact_id: row.get(1)?,
        file_path: row.get(2)?,
        description: row.get(3)?,
        photographer: row.get(4)?,
        taken_on: date_at(row, 5)?,
    })
}

fn exhibition_from_row(row: &Row<'_>) -> rusqlite::Result<Exhibition> {
    Ok(Exhibition {
        id: row.get(0)?,
        name: row.get(1)?,
        starts_on: optional_date_at(row, 2)?,
        ends_on: optional_date_at(row, 3)?,
        description: row.get(4)?,
    })
}

/// `Ok(None)` when the query matched no row
fn optional<T>(result: rusqlite::Result<T>) -> DbResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn row_exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table),
        params![id],
        |row| row.get(0),
    )
}

fn require_artifact(conn: &Connection, artifact_id: i64) -> DbResult<()> {
    if row_exists(conn, "artifacts", artifact_id)? {
        Ok(())
    } else {
        Err(DbError::NotFound {
            entity: "Artifact",
            id: artifact_id,
        })
    }
}

// ==================== ARTIFACT QUERIES ====================

/// Register a new artifact, stamped with the current local time.
/// Returns the generated id.
pub fn add_artifact(db: &DbConnection, draft: &ArtifactDraft) -> DbResult<i64> {
    add_artifact_at(db, draft, Local::now().naive_local())
}

/// Register a new artifact with an explicit registration time (second precision)
pub fn add_artifact_at(
    db: &DbConnection,
    draft: &ArtifactDraft,
    registered_at: NaiveDateTime,
) -> DbResult<i64> {
    let conn = db.lock();
    conn.execute(
        "INSERT INTO artifacts (
            accession_number, name, description, category_id, material,
            manufacture_year, manufacture_place, maker,
            length_cm, width_cm, height_cm, weight_g, condition,
            location_id, registered_at, registered_by
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            draft.accession_number,
            draft.name,
            draft.description,
            draft.category_id,
            draft.material,
            draft.manufacture_year,
            draft.manufacture_place,
            draft.maker,
            draft.length_cm,
            draft.width_cm,
            draft.height_cm,
            draft.weight_g,
            draft.condition.map(|c| c.to_string()),
            draft.location_id,
            registered_at.format(TIMESTAMP_FORMAT).to_string(),
            draft.registered_by,
        ],
    )
    .map_err(|e| DbError::from_insert(e, "Accession number", &draft.accession_number))?;

    let id = conn.last_insert_rowid();
    log::info!("Registered artifact {} as id {}", draft.accession_number, id);
    Ok(id)
}

/// Get an artifact with its category name and full location
pub fn get_artifact(db: &DbConnection, id: i64) -> DbResult<Option<ArtifactDetail>> {
    let conn = db.lock();
    let result = conn.query_row(DETAIL_SELECT, params![id], |row| {
        let location = match row.get::<_, Option<i64>>(18)? {
            Some(location_id) => Some(StorageLocation {
                id: location_id,
                building: row.get(19)?,
                room: row.get(20)?,
                shelf: row.get(21)?,
                notes: row.get(22)?,
            }),
            None => None,
        };

        Ok(ArtifactDetail {
            artifact: artifact_from_row(row)?,
            category_name: row.get(17)?,
            location,
        })
    });

    optional(result)
}

/// Search artifacts. Results are ordered by accession number descending,
/// compared as strings ("2026.010" sorts after "2026.009", "2026.10" after "2026.099").
pub fn search_artifacts(db: &DbConnection, query: &ArtifactQuery) -> DbResult<Vec<ArtifactSummary>> {
    let (sql, values) = query.build(SUMMARY_SELECT, "a.accession_number DESC");

    let conn = db.lock();
    let mut stmt = conn.prepare(&sql)?;
    let summaries = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            Ok(ArtifactSummary {
                artifact: artifact_from_row(row)?,
                category_name: row.get(17)?,
                building: row.get(18)?,
                room: row.get(19)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summaries)
}

/// Get an artifact together with its photos, donors and conservation history
pub fn get_artifact_dossier(db: &DbConnection, id: i64) -> DbResult<Option<ArtifactDossier>> {
    let detail = match get_artifact(db, id)? {
        Some(d) => d,
        None => return Ok(None),
    };

    let photos = list_photos(db, id)?;
    let donors = donors_for_artifact(db, id)?;
    let conservation = conservation_history(db, id)?;

    Ok(Some(ArtifactDossier {
        detail,
        photos,
        donors,
        conservation,
    }))
}

// ==================== CATEGORY QUERIES ====================

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
    })
}

/// Create a category; names are unique
pub fn add_category(db: &DbConnection, name: &str) -> DbResult<i64> {
    let conn = db.lock();
    conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name])
        .map_err(|e| DbError::from_insert(e, "Category", name))?;
    Ok(conn.last_insert_rowid())
}

/// List all categories by name
pub fn list_categories(db: &DbConnection) -> DbResult<Vec<Category>> {
    let conn = db.lock();
    let mut stmt = conn.prepare("SELECT id, name, parent_id FROM categories ORDER BY name")?;

    let categories = stmt
        .query_map([], category_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(categories)
}

/// Look a category up by its exact name
pub fn find_category_by_name(db: &DbConnection, name: &str) -> DbResult<Option<Category>> {
    let conn = db.lock();
    optional(conn.query_row(
        "SELECT id, name, parent_id FROM categories WHERE name = ?1",
        params![name],
        category_from_row,
    ))
}

// ==================== LOCATION QUERIES ====================

/// Create a storage location
pub fn add_location(
    db: &DbConnection,
    building: &str,
    room: Option<&str>,
    shelf: Option<&str>,
    notes: Option<&str>,
) -> DbResult<i64> {
    let conn = db.lock();
    conn.execute(
        "INSERT INTO locations (building, room, shelf, notes) VALUES (?1, ?2, ?3, ?4)",
        params![building, room, shelf, notes],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a location by ID
pub fn get_location(db: &DbConnection, id: i64) -> DbResult<Option<StorageLocation>> {
    let conn = db.lock();
    optional(conn.query_row(
        "SELECT id, building, room, shelf, notes FROM locations WHERE id = ?1",
        params![id],
        location_from_row,
    ))
}

/// List all locations by building, then room
pub fn list_locations(db: &DbConnection) -> DbResult<Vec<StorageLocation>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT id, building, room, shelf, notes
         FROM locations
         ORDER BY building, room",
    )?;

    let locations = stmt
        .query_map([], location_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(locations)
}

/// Number of artifacts currently stored at a location
pub fn count_artifacts_at_location(db: &DbConnection, location_id: i64) -> DbResult<i64> {
    let conn = db.lock();
    let count = conn.query_row(
        "SELECT COUNT(*) FROM artifacts WHERE location_id = ?1",
        params![location_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Delete a location. Artifacts stored there keep existing but lose their
/// location. Returns how many artifacts were affected.
pub fn delete_location(db: &DbConnection, id: i64) -> DbResult<i64> {
    let affected = count_artifacts_at_location(db, id)?;

    let conn = db.lock();
    let deleted = conn.execute("DELETE FROM locations WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::NotFound {
            entity: "Location",
            id,
        });
    }

    log::info!("Deleted location {} ({} artifacts unplaced)", id, affected);
    Ok(affected)
}

// ==================== DONOR QUERIES ====================

/// Create a donor
pub fn add_donor(
    db: &DbConnection,
    name: &str,
    address: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
    notes: Option<&str>,
) -> DbResult<i64> {
    let conn = db.lock();
    conn.execute(
        "INSERT INTO donors (name, address, phone, email, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![name, address, phone, email, notes],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a donor by ID
pub fn get_donor(db: &DbConnection, id: i64) -> DbResult<Option<Donor>> {
    let conn = db.lock();
    optional(conn.query_row(
        "SELECT id, name, address, phone, email, notes FROM donors WHERE id = ?1",
        params![id],
        donor_from_row,
    ))
}

/// List all donors by name
pub fn list_donors(db: &DbConnection) -> DbResult<Vec<Donor>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT id, name, address, phone, email, notes
         FROM donors
         ORDER BY name",
    )?;

    let donors = stmt
        .query_map([], donor_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(donors)
}

/// Record that a donor contributed an artifact
pub fn link_artifact_donor(
    db: &DbConnection,
    artifact_id: i64,
    donor_id: i64,
    donated_on: Option<NaiveDate>,
    acquisition_type: Option<&str>,
    notes: Option<&str>,
) -> DbResult<i64> {
    let conn = db.lock();
    require_artifact(&conn, artifact_id)?;
    if !row_exists(&conn, "donors", donor_id)? {
        return Err(DbError::NotFound {
            entity: "Donor",
            id: donor_id,
        });
    }

    conn.execute(
        "INSERT INTO artifact_donors (artifact_id, donor_id, donated_on, acquisition_type, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            artifact_id,
            donor_id,
            format_date(donated_on),
            acquisition_type,
            notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Donors of an artifact, oldest donation first
pub fn donors_for_artifact(db: &DbConnection, artifact_id: i64) -> DbResult<Vec<DonorLinkDetail>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT ad.id, ad.artifact_id, ad.donor_id, ad.donated_on, ad.acquisition_type, ad.notes, d.name
         FROM artifact_donors ad
         JOIN donors d ON ad.donor_id = d.id
         WHERE ad.artifact_id = ?1
         ORDER BY ad.donated_on, ad.id",
    )?;

    let links = stmt
        .query_map(params![artifact_id], |row| {
            Ok(DonorLinkDetail {
                link: DonorLink {
                    id: row.get(0)?,
                    artifact_id: row.get(1)?,
                    donor_id: row.get(2)?,
                    donated_on: optional_date_at(row, 3)?,
                    acquisition_type: row.get(4)?,
                    notes: row.get(5)?,
                },
                donor_name: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(links)
}

// ==================== PHOTO QUERIES ====================

/// Attach an already stored photo file to an artifact, dated today
pub fn add_photo(
    db: &DbConnection,
    artifact_id: i64,
    file_path: &str,
    description: Option<&str>,
    photographer: Option<&str>,
) -> DbResult<i64> {
    let conn = db.lock();
    require_artifact(&conn, artifact_id)?;

    let taken_on = Local::now().date_naive();
    conn.execute(
        "INSERT INTO photos (artifact_id, file_path, description, photographer, taken_on)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            artifact_id,
            file_path,
            description,
            photographer,
            taken_on.format(DATE_FORMAT).to_string()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Photos of an artifact, newest first
pub fn list_photos(db: &DbConnection, artifact_id: i64) -> DbResult<Vec<Photo>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT id, artifact_id, file_path, description, photographer, taken_on
         FROM photos
         WHERE artifact_id = ?1
         ORDER BY taken_on DESC, id DESC",
    )?;

    let photos = stmt
        .query_map(params![artifact_id], photo_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(photos)
}

/// Get a photo by ID
pub fn get_photo(db: &DbConnection, id: i64) -> DbResult<Option<Photo>> {
    let conn = db.lock();
    optional(conn.query_row(
        "SELECT id, artifact_id, file_path, description, photographer, taken_on
         FROM photos WHERE id = ?1",
        params![id],
        photo_from_row,
    ))
}

/// Remove a photo row. The image file stays on disk.
pub fn delete_photo(db: &DbConnection, id: i64) -> DbResult<()> {
    let conn = db.lock();
    let deleted = conn.execute("DELETE FROM photos WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::NotFound { entity: "Photo", id });
    }
    Ok(())
}

// ==================== EXHIBITION QUERIES ====================

/// Create an exhibition
pub fn add_exhibition(
    db: &DbConnection,
    name: &str,
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
    description: Option<&str>,
) -> DbResult<i64> {
    let conn = db.lock();
    conn.execute(
        "INSERT INTO exhibitions (name, starts_on, ends_on, description) VALUES (?1, ?2, ?3, ?4)",
        params![name, format_date(starts_on), format_date(ends_on), description],
    )?;
    Ok(conn.last_insert_rowid())
}

/// List all exhibitions, latest start first
pub fn list_exhibitions(db: &DbConnection) -> DbResult<Vec<Exhibition>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT id, name, starts_on, ends_on, description
         FROM exhibitions
         ORDER BY starts_on DESC, name",
    )?;

    let exhibitions = stmt
        .query_map([], exhibition_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(exhibitions)
}

/// Put an artifact in an exhibition
pub fn link_artifact_exhibition(
    db: &DbConnection,
    artifact_id: i64,
    exhibition_id: i64,
) -> DbResult<i64> {
    let conn = db.lock();
    require_artifact(&conn, artifact_id)?;
    if !row_exists(&conn, "exhibitions", exhibition_id)? {
        return Err(DbError::NotFound {
            entity: "Exhibition",
            id: exhibition_id,
        });
    }

    conn.execute(
        "INSERT INTO artifact_exhibitions (artifact_id, exhibition_id) VALUES (?1, ?2)",
        params![artifact_id, exhibition_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Exhibitions an artifact has been part of
pub fn exhibitions_for_artifact(db: &DbConnection, artifact_id: i64) -> DbResult<Vec<Exhibition>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT e.id, e.name, e.starts_on, e.ends_on, e.description
         FROM exhibitions e
         JOIN artifact_exhibitions ae ON ae.exhibition_id = e.id
         WHERE ae.artifact_id = ?1
         ORDER BY e.starts_on DESC, e.name",
    )?;

    let exhibitions = stmt
        .query_map(params![artifact_id], exhibition_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(exhibitions)
}

// ==================== CONSERVATION QUERIES ====================

/// Append a conservation record to an artifact's history
pub fn add_conservation_record(
    db: &DbConnection,
    artifact_id: i64,
    performed_on: NaiveDate,
    action: &str,
    performed_by: Option<&str>,
    cost: Option<f64>,
    notes: Option<&str>,
) -> DbResult<i64> {
    let conn = db.lock();
    require_artifact(&conn, artifact_id)?;

    conn.execute(
        "INSERT INTO conservation_records (artifact_id, performed_on, action, performed_by, cost, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            artifact_id,
            performed_on.format(DATE_FORMAT).to_string(),
            action,
            performed_by,
            cost,
            notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Conservation history of an artifact in chronological order
pub fn conservation_history(
    db: &DbConnection,
    artifact_id: i64,
) -> DbResult<Vec<ConservationRecord>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(
        "SELECT id, artifact_id, performed_on, action, performed_by, cost, notes
         FROM conservation_records
         WHERE artifact_id = ?1
         ORDER BY performed_on, id",
    )?;

    let records = stmt
        .query_map(params![artifact_id], |row| {
            Ok(ConservationRecord {
                id: row.get(0)?,
                artifact_id: row.get(1)?,
                performed_on: date_at(row, 2)?,
                action: row.get(3)?,
                performed_by: row.get(4)?,
                cost: row.get(5)?,
                notes: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

// ==================== STATISTICS ====================

/// Collection totals, counts for every category (zeros included) and the
/// latest registrations
pub fn compute_statistics(db: &DbConnection) -> DbResult<Statistics> {
    let conn = db.lock();

    let total: i64 = conn.query_row("SELECT COUNT(*) FROM artifacts", [], |row| row.get(0))?;

    let mut per_category_stmt = conn.prepare(
        "SELECT c.id, c.name, COUNT(a.id) AS artifact_count
         FROM categories c
         LEFT JOIN artifacts a ON a.category_id = c.id
         GROUP BY c.id, c.name
         ORDER BY artifact_count DESC, c.name",
    )?;
    let per_category = per_category_stmt
        .query_map([], |row| {
            Ok(CategoryCount {
                category_id: row.get(0)?,
                name: row.get(1)?,
                count: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut recent_stmt = conn.prepare(
        "SELECT id, accession_number, name, registered_at
         FROM artifacts
         ORDER BY registered_at DESC, id DESC
         LIMIT ?1",
    )?;
    let recent = recent_stmt
        .query_map(params![RECENT_LIMIT], |row| {
            Ok(RecentArtifact {
                id: row.get(0)?,
                accession_number: row.get(1)?,
                name: row.get(2)?,
                registered_at: timestamp_at(row, 3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Statistics {
        total,
        per_category,
        recent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::db::{open_in_memory, DEFAULT_CATEGORIES};

    fn draft(accession_number: &str, name: &str) -> ArtifactDraft {
        ArtifactDraft {
            accession_number: accession_number.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_artifact_round_trip() {
        let db = open_in_memory().unwrap();
        let tools = find_category_by_name(&db, "Tools").unwrap().unwrap();
        let shed = add_location(&db, "Smedjan", Some("Verkstad"), Some("Hylla 2"), None).unwrap();

        let submitted = ArtifactDraft {
            accession_number: "2026.001".to_string(),
            name: "Hammare".to_string(),
            description: Some("Smideshammare med askskaft".to_string()),
            category_id: Some(tools.id),
            material: Some("Järn, trä".to_string()),
            manufacture_year: Some("ca 1890".to_string()),
            manufacture_place: Some("Gränna".to_string()),
            maker: Some("Okänd smed".to_string()),
            length_cm: Some(32.5),
            width_cm: Some(11.0),
            height_cm: None,
            weight_g: Some(850.25),
            condition: Some(Condition::Good),
            location_id: Some(shed),
            registered_by: Some("Karin".to_string()),
        };
        let registered_at = at(3, 14);
        let id = add_artifact_at(&db, &submitted, registered_at).unwrap();

        let detail = get_artifact(&db, id).unwrap().unwrap();
        let artifact = &detail.artifact;
        assert_eq!(artifact.id, id);
        assert_eq!(artifact.accession_number, submitted.accession_number);
        assert_eq!(artifact.name, submitted.name);
        assert_eq!(artifact.description, submitted.description);
        assert_eq!(artifact.category_id, submitted.category_id);
        assert_eq!(artifact.material, submitted.material);
        assert_eq!(artifact.manufacture_year, submitted.manufacture_year);
        assert_eq!(artifact.manufacture_place, submitted.manufacture_place);
        assert_eq!(artifact.maker, submitted.maker);
        assert_eq!(artifact.length_cm, submitted.length_cm);
        assert_eq!(artifact.width_cm, submitted.width_cm);
        assert_eq!(artifact.height_cm, submitted.height_cm);
        assert_eq!(artifact.weight_g, submitted.weight_g);
        assert_eq!(artifact.condition, submitted.condition);
        assert_eq!(artifact.location_id, submitted.location_id);
        assert_eq!(artifact.registered_by, submitted.registered_by);
        assert_eq!(artifact.registered_at, registered_at);

        assert_eq!(detail.category_name.as_deref(), Some("Tools"));
        let location = detail.location.unwrap();
        assert_eq!(location.building, "Smedjan");
        assert_eq!(location.shelf.as_deref(), Some("Hylla 2"));
    }

    #[test]
    fn test_get_missing_artifact() {
        let db = open_in_memory().unwrap();
        assert!(get_artifact(&db, 42).unwrap().is_none());
        assert!(get_artifact_dossier(&db, 42).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_accession_number() {
        let db = open_in_memory().unwrap();
        let first = add_artifact(&db, &draft("2026.001", "Hammare")).unwrap();

        let err = add_artifact(&db, &draft("2026.001", "Tång")).unwrap_err();
        assert!(err.is_uniqueness_violation());

        let kept = get_artifact(&db, first).unwrap().unwrap();
        assert_eq!(kept.artifact.name, "Hammare");
        assert_eq!(search_artifacts(&db, &ArtifactQuery::all()).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_category_name() {
        let db = open_in_memory().unwrap();
        let id = add_category(&db, "Musical instruments").unwrap();
        assert!(id > 0);

        let err = add_category(&db, "Musical instruments").unwrap_err();
        assert!(err.is_uniqueness_violation());
        assert!(add_category(&db, "Tools").unwrap_err().is_uniqueness_violation());
    }

    #[test]
    fn test_list_categories_sorted() {
        let db = open_in_memory().unwrap();
        let names: Vec<String> = list_categories(&db)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        let mut expected: Vec<String> = DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let db = open_in_memory().unwrap();
        add_artifact(&db, &draft("2026.001", "Hammare")).unwrap();
        add_artifact(&db, &draft("2026.002", "Tång")).unwrap();

        let hits = search_artifacts(&db, &ArtifactQuery::all().with_term("hammar")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].artifact.name, "Hammare");

        let hits = search_artifacts(&db, &ArtifactQuery::all().with_term("TÅNG")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].artifact.name, "Tång");
    }

    #[test]
    fn test_search_matches_description_and_accession_number() {
        let db = open_in_memory().unwrap();
        let mut with_description = draft("2025.014", "Skål");
        with_description.description = Some("Träskål i björk".to_string());
        add_artifact(&db, &with_description).unwrap();
        add_artifact(&db, &draft("2026.003", "Kanna")).unwrap();

        let hits = search_artifacts(&db, &ArtifactQuery::all().with_term("BJÖRK")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].artifact.accession_number, "2025.014");

        let hits = search_artifacts(&db, &ArtifactQuery::all().with_term("2026.")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].artifact.name, "Kanna");
    }

    #[test]
    fn test_search_all_ordered_by_accession_number_desc() {
        let db = open_in_memory().unwrap();
        for (number, name) in [("2025.010", "Spinnrock"), ("2026.002", "Tång"), ("2026.001", "Hammare")] {
            add_artifact(&db, &draft(number, name)).unwrap();
        }

        let numbers: Vec<String> = search_artifacts(&db, &ArtifactQuery::all().with_term(""))
            .unwrap()
            .into_iter()
            .map(|s| s.artifact.accession_number)
            .collect();
        assert_eq!(numbers, vec!["2026.002", "2026.001", "2025.010"]);
    }

    #[test]
    fn test_search_order_is_lexicographic() {
        let db = open_in_memory().unwrap();
        add_artifact(&db, &draft("2026.99", "Short suffix")).unwrap();
        add_artifact(&db, &draft("2026.100", "Long suffix")).unwrap();

        let hits = search_artifacts(&db, &ArtifactQuery::all()).unwrap();
        // "2026.99" > "2026.100" as strings
        assert_eq!(hits[0].artifact.accession_number, "2026.99");
    }

    #[test]
    fn test_search_by_category() {
        let db = open_in_memory().unwrap();
        let tools = find_category_by_name(&db, "Tools").unwrap().unwrap();
        let toys = find_category_by_name(&db, "Toys").unwrap().unwrap();

        let mut hammer = draft("2026.001", "Hammare");
        hammer.category_id = Some(tools.id);
        add_artifact(&db, &hammer).unwrap();
        let mut horse = draft("2026.002", "Dalahäst");
        horse.category_id = Some(toys.id);
        add_artifact(&db, &horse).unwrap();

        let hits = search_artifacts(&db, &ArtifactQuery::all().with_category(toys.id)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].artifact.name, "Dalahäst");
        assert_eq!(hits[0].category_name.as_deref(), Some("Toys"));

        let none = search_artifacts(
            &db,
            &ArtifactQuery::all().with_term("hammar").with_category(toys.id),
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_includes_location() {
        let db = open_in_memory().unwrap();
        let loft = add_location(&db, "Huvudbyggnad", Some("Vinden"), None, None).unwrap();
        let mut chest = draft("2026.001", "Kista");
        chest.location_id = Some(loft);
        add_artifact(&db, &chest).unwrap();

        let hits = search_artifacts(&db, &ArtifactQuery::all()).unwrap();
        assert_eq!(hits[0].building.as_deref(), Some("Huvudbyggnad"));
        assert_eq!(hits[0].room.as_deref(), Some("Vinden"));
    }

    #[test]
    fn test_delete_location_clears_references() {
        let db = open_in_memory().unwrap();
        let barn = add_location(&db, "Ladan", None, None, None).unwrap();
        let other = add_location(&db, "Magasin A", None, None, None).unwrap();

        let mut ids = Vec::new();
        for n in 1..=3 {
            let mut d = draft(&format!("2026.00{}", n), &format!("Redskap {}", n));
            d.location_id = Some(barn);
            ids.push(add_artifact(&db, &d).unwrap());
        }
        let mut elsewhere = draft("2026.004", "Harv");
        elsewhere.location_id = Some(other);
        let elsewhere_id = add_artifact(&db, &elsewhere).unwrap();

        assert_eq!(count_artifacts_at_location(&db, barn).unwrap(), 3);
        assert_eq!(delete_location(&db, barn).unwrap(), 3);

        for id in ids {
            let detail = get_artifact(&db, id).unwrap().expect("artifact survives");
            assert_eq!(detail.artifact.location_id, None);
            assert!(detail.location.is_none());
        }
        let untouched = get_artifact(&db, elsewhere_id).unwrap().unwrap();
        assert_eq!(untouched.artifact.location_id, Some(other));
        assert!(get_location(&db, barn).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_location() {
        let db = open_in_memory().unwrap();
        assert!(delete_location(&db, 99).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_locations_sorted() {
        let db = open_in_memory().unwrap();
        add_location(&db, "Magasin B", None, None, None).unwrap();
        add_location(&db, "Huvudbyggnad", Some("Utställningssal"), None, None).unwrap();
        add_location(&db, "Huvudbyggnad", Some("Förråd"), None, Some("Fuktigt")).unwrap();

        let names: Vec<String> = list_locations(&db)
            .unwrap()
            .iter()
            .map(StorageLocation::display_name)
            .collect();
        assert_eq!(
            names,
            vec!["Huvudbyggnad - Förråd", "Huvudbyggnad - Utställningssal", "Magasin B"]
        );
    }

    #[test]
    fn test_statistics_on_empty_catalogue() {
        let db = open_in_memory().unwrap();
        let stats = compute_statistics(&db).unwrap();

        assert_eq!(stats.total, 0);
        assert!(stats.recent.is_empty());
        assert_eq!(stats.per_category.len(), DEFAULT_CATEGORIES.len());
        for name in DEFAULT_CATEGORIES {
            let entry = stats
                .per_category
                .iter()
                .find(|c| c.name == name)
                .expect("seeded category listed");
            assert_eq!(entry.count, 0);
        }
    }

    #[test]
    fn test_statistics_counts_and_recent() {
        let db = open_in_memory().unwrap();
        let textiles = find_category_by_name(&db, "Textiles").unwrap().unwrap();

        for n in 1..=12u32 {
            let mut d = draft(&format!("2026.{:03}", n), &format!("Föremål {}", n));
            if n % 4 == 0 {
                d.category_id = Some(textiles.id);
            }
            add_artifact_at(&db, &d, at(n, 10)).unwrap();
        }

        let stats = compute_statistics(&db).unwrap();
        assert_eq!(stats.total, 12);
        assert_eq!(stats.per_category[0].name, "Textiles");
        assert_eq!(stats.per_category[0].count, 3);
        assert_eq!(stats.per_category.len(), DEFAULT_CATEGORIES.len());

        assert_eq!(stats.recent.len(), 10);
        assert_eq!(stats.recent[0].accession_number, "2026.012");
        assert_eq!(stats.recent[9].accession_number, "2026.003");
        assert_eq!(stats.recent[0].registered_at, at(12, 10));
    }

    #[test]
    fn test_photos() {
        let db = open_in_memory().unwrap();
        let id = add_artifact(&db, &draft("2026.001", "Kista")).unwrap();

        let first = add_photo(&db, id, "/images/1_a.jpg", Some("Framsida"), None).unwrap();
        let second = add_photo(&db, id, "/images/1_b.jpg", None, Some("Per")).unwrap();

        let photos = list_photos(&db, id).unwrap();
        assert_eq!(photos.len(), 2);
        // Same date, newest insert first
        assert_eq!(photos[0].id, second);
        assert_eq!(photos[0].taken_on, Local::now().date_naive());
        assert_eq!(photos[1].description.as_deref(), Some("Framsida"));

        delete_photo(&db, first).unwrap();
        assert!(get_photo(&db, first).unwrap().is_none());
        assert_eq!(list_photos(&db, id).unwrap().len(), 1);
        assert!(delete_photo(&db, first).unwrap_err().is_not_found());
    }

    #[test]
    fn test_photo_requires_artifact() {
        let db = open_in_memory().unwrap();
        let err = add_photo(&db, 5, "/images/x.jpg", None, None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_donors_and_links() {
        let db = open_in_memory().unwrap();
        let id = add_artifact(&db, &draft("2026.001", "Vävstol")).unwrap();
        let anna = add_donor(&db, "Anna Berg", Some("Storgatan 1"), None, None, None).unwrap();
        let erik = add_donor(&db, "Erik Lund", None, Some("070-123"), Some("erik@example.se"), None)
            .unwrap();

        let spring = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let winter = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        link_artifact_donor(&db, id, erik, Some(spring), Some("Purchase"), None).unwrap();
        link_artifact_donor(&db, id, anna, Some(winter), Some("Gift"), Some("Dödsbo")).unwrap();

        let links = donors_for_artifact(&db, id).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].donor_name, "Anna Berg");
        assert_eq!(links[0].link.donated_on, Some(winter));
        assert_eq!(links[1].link.acquisition_type.as_deref(), Some("Purchase"));

        let names: Vec<String> = list_donors(&db).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Anna Berg", "Erik Lund"]);
        assert_eq!(get_donor(&db, erik).unwrap().unwrap().phone.as_deref(), Some("070-123"));

        assert!(link_artifact_donor(&db, id, 999, None, None, None)
            .unwrap_err()
            .is_not_found());
        assert!(link_artifact_donor(&db, 999, anna, None, None, None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_exhibitions() {
        let db = open_in_memory().unwrap();
        let id = add_artifact(&db, &draft("2026.001", "Brudkrona")).unwrap();
        let summer = add_exhibition(
            &db,
            "Sommarutställning",
            NaiveDate::from_ymd_opt(2026, 6, 1),
            NaiveDate::from_ymd_opt(2026, 8, 31),
            Some("Högtider förr"),
        )
        .unwrap();
        add_exhibition(&db, "Vinter", None, None, None).unwrap();

        link_artifact_exhibition(&db, id, summer).unwrap();

        let linked = exhibitions_for_artifact(&db, id).unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].name, "Sommarutställning");
        assert_eq!(linked[0].ends_on, NaiveDate::from_ymd_opt(2026, 8, 31));
        assert_eq!(list_exhibitions(&db).unwrap().len(), 2);
        assert!(link_artifact_exhibition(&db, id, 77).unwrap_err().is_not_found());
    }

    #[test]
    fn test_conservation_history_and_dossier() {
        let db = open_in_memory().unwrap();
        let id = add_artifact(&db, &draft("2026.001", "Skåp")).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();

        add_conservation_record(&db, id, later, "Ytbehandling", Some("Konservator AB"), Some(1200.0), None)
            .unwrap();
        add_conservation_record(&db, id, earlier, "Rengöring", None, None, Some("Damm")).unwrap();
        add_photo(&db, id, "/images/skap.jpg", None, None).unwrap();

        let history = conservation_history(&db, id).unwrap();
        assert_eq!(history[0].action, "Rengöring");
        assert_eq!(history[1].cost, Some(1200.0));

        let dossier = get_artifact_dossier(&db, id).unwrap().unwrap();
        assert_eq!(dossier.detail.artifact.name, "Skåp");
        assert_eq!(dossier.photos.len(), 1);
        assert_eq!(dossier.conservation.len(), 2);
        assert!(dossier.donors.is_empty());

        assert!(add_conservation_record(&db, 31, later, "x", None, None, None)
            .unwrap_err()
            .is_not_found());
    }
}
