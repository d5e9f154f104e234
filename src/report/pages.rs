// Printable reports over catalogue query results
use std::path::Path;

use super::html::{
    document, escape, escape_attribute, format_dimensions, format_weight, labelled, table,
    text_or_placeholder,
};
use super::images::embed_image;
use super::ReportOptions;
use crate::state::models::{
    ArtifactDossier, ArtifactSummary, Category, Donor, Statistics, StorageLocation,
};
use crate::state::queries::{DATE_FORMAT, TIMESTAMP_FORMAT};

fn section(heading: &str, content: &str) -> String {
    format!(
        "<h2>{}</h2>\n<div class=\"info-section\">\n{}</div>\n",
        escape(heading),
        content
    )
}

fn count_line(label: &str, count: usize) -> String {
    format!("<p>{}: {}</p>\n", escape(label), count)
}

/// Full record of one artifact with its photos embedded
pub fn artifact_report(dossier: &ArtifactDossier, options: &ReportOptions) -> String {
    let detail = &dossier.detail;
    let artifact = &detail.artifact;
    let mut body = String::from("<h1>Artifact record</h1>\n");

    body.push_str("<div class=\"info-section\">\n");
    body.push_str(&labelled("ID", &artifact.id.to_string()));
    body.push_str(&labelled("Accession number", &escape(&artifact.accession_number)));
    body.push_str(&labelled("Name", &escape(&artifact.name)));
    body.push_str("</div>\n");

    body.push_str(&section(
        "Description",
        &format!("    <p>{}</p>\n", text_or_placeholder(artifact.description.as_deref())),
    ));

    if !dossier.photos.is_empty() {
        let mut photos = String::new();
        for photo in &dossier.photos {
            let data_uri = match embed_image(Path::new(&photo.file_path), options.max_image_width) {
                Ok(uri) => uri,
                Err(e) => {
                    log::warn!("Skipping photo {} in report: {}", photo.file_path, e);
                    continue;
                }
            };
            let caption = photo.description.as_deref().unwrap_or_else(|| {
                Path::new(&photo.file_path)
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(&photo.file_path)
            });
            photos.push_str(&format!(
                "    <div class=\"photo\">\n        <img src=\"{}\" alt=\"{}\">\n        <p class=\"caption\">{}</p>\n    </div>\n",
                data_uri,
                escape_attribute(caption),
                escape(caption)
            ));
        }
        body.push_str(&section("Photos", &photos));
    }

    let mut classification = labelled("Category", &text_or_placeholder(detail.category_name.as_deref()));
    classification.push_str(&labelled("Material", &text_or_placeholder(artifact.material.as_deref())));
    body.push_str(&section("Classification", &classification));

    let mut manufacture = labelled("Year", &text_or_placeholder(artifact.manufacture_year.as_deref()));
    manufacture.push_str(&labelled("Place", &text_or_placeholder(artifact.manufacture_place.as_deref())));
    manufacture.push_str(&labelled("Maker", &text_or_placeholder(artifact.maker.as_deref())));
    body.push_str(&section("Manufacture", &manufacture));

    let mut physical = labelled(
        "Dimensions (L × W × H)",
        &format_dimensions(artifact.length_cm, artifact.width_cm, artifact.height_cm),
    );
    physical.push_str(&labelled("Weight", &format_weight(artifact.weight_g)));
    physical.push_str(&labelled(
        "Condition",
        &text_or_placeholder(artifact.condition.map(|c| c.label())),
    ));
    body.push_str(&section("Physical properties", &physical));

    let location = detail.location.as_ref();
    let mut storage = labelled("Building", &text_or_placeholder(location.map(|l| l.building.as_str())));
    storage.push_str(&labelled("Room", &text_or_placeholder(location.and_then(|l| l.room.as_deref()))));
    storage.push_str(&labelled("Shelf", &text_or_placeholder(location.and_then(|l| l.shelf.as_deref()))));
    body.push_str(&section("Storage", &storage));

    if !dossier.donors.is_empty() {
        let rows: Vec<Vec<String>> = dossier
            .donors
            .iter()
            .map(|d| {
                vec![
                    escape(&d.donor_name),
                    text_or_placeholder(
                        d.link
                            .donated_on
                            .map(|date| date.format(DATE_FORMAT).to_string())
                            .as_deref(),
                    ),
                    text_or_placeholder(d.link.acquisition_type.as_deref()),
                    text_or_placeholder(d.link.notes.as_deref()),
                ]
            })
            .collect();
        body.push_str("<h2>Provenance</h2>\n");
        body.push_str(&table(&["Donor", "Date", "Acquisition", "Notes"], &rows));
    }

    if !dossier.conservation.is_empty() {
        let rows: Vec<Vec<String>> = dossier
            .conservation
            .iter()
            .map(|record| {
                vec![
                    record.performed_on.format(DATE_FORMAT).to_string(),
                    escape(&record.action),
                    text_or_placeholder(record.performed_by.as_deref()),
                    text_or_placeholder(record.cost.map(|cost| format!("{:.2}", cost)).as_deref()),
                    text_or_placeholder(record.notes.as_deref()),
                ]
            })
            .collect();
        body.push_str("<h2>Conservation history</h2>\n");
        body.push_str(&table(&["Date", "Action", "Performed by", "Cost", "Notes"], &rows));
    }

    let mut registration = labelled(
        "Date",
        &artifact.registered_at.format(TIMESTAMP_FORMAT).to_string(),
    );
    registration.push_str(&labelled(
        "Registered by",
        &text_or_placeholder(artifact.registered_by.as_deref()),
    ));
    body.push_str(&section("Registration", &registration));

    let title = format!("{} {}", artifact.accession_number, artifact.name);
    document(&title, &body)
}

/// Table of search results
pub fn artifact_list_report(artifacts: &[ArtifactSummary]) -> String {
    let rows: Vec<Vec<String>> = artifacts
        .iter()
        .map(|summary| {
            let place = match (&summary.building, &summary.room) {
                (Some(building), Some(room)) => Some(format!("{} - {}", building, room)),
                (Some(building), None) => Some(building.clone()),
                _ => None,
            };
            vec![
                escape(&summary.artifact.accession_number),
                escape(&summary.artifact.name),
                text_or_placeholder(summary.category_name.as_deref()),
                text_or_placeholder(summary.artifact.material.as_deref()),
                text_or_placeholder(place.as_deref()),
            ]
        })
        .collect();

    let mut body = String::from("<h1>Artifact list</h1>\n");
    body.push_str(&count_line("Number of artifacts", artifacts.len()));
    body.push_str(&table(
        &["Acc. no", "Name", "Category", "Material", "Location"],
        &rows,
    ));
    document("Artifact list", &body)
}

/// Collection totals. Categories without artifacts are left out of the table.
pub fn statistics_report(stats: &Statistics) -> String {
    let category_rows: Vec<Vec<String>> = stats
        .per_category
        .iter()
        .filter(|category| category.count > 0)
        .map(|category| vec![escape(&category.name), category.count.to_string()])
        .collect();

    let recent_rows: Vec<Vec<String>> = stats
        .recent
        .iter()
        .map(|artifact| {
            vec![
                escape(&artifact.accession_number),
                escape(&artifact.name),
                artifact.registered_at.format(TIMESTAMP_FORMAT).to_string(),
            ]
        })
        .collect();

    let mut body = String::from("<h1>Museum statistics</h1>\n");
    body.push_str(&format!(
        "<div class=\"info-section\">\n    <h2>Total number of artifacts: {}</h2>\n</div>\n",
        stats.total
    ));
    body.push_str("<h2>Artifacts per category</h2>\n");
    body.push_str(&table(&["Category", "Count"], &category_rows));
    body.push_str("<h2>Latest registrations</h2>\n");
    body.push_str(&table(&["Accession number", "Name", "Date"], &recent_rows));
    document("Museum statistics", &body)
}

pub fn location_list_report(locations: &[StorageLocation]) -> String {
    let rows: Vec<Vec<String>> = locations
        .iter()
        .map(|location| {
            vec![
                escape(&location.building),
                text_or_placeholder(location.room.as_deref()),
                text_or_placeholder(location.shelf.as_deref()),
            ]
        })
        .collect();

    let mut body = String::from("<h1>Location list</h1>\n");
    body.push_str(&count_line("Number of locations", locations.len()));
    body.push_str(&table(&["Building", "Room", "Shelf"], &rows));
    document("Location list", &body)
}

pub fn category_list_report(categories: &[Category]) -> String {
    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|category| vec![escape(&category.name)])
        .collect();

    let mut body = String::from("<h1>Category list</h1>\n");
    body.push_str(&count_line("Number of categories", categories.len()));
    body.push_str(&table(&["Category"], &rows));
    document("Category list", &body)
}

pub fn donor_list_report(donors: &[Donor]) -> String {
    let rows: Vec<Vec<String>> = donors
        .iter()
        .map(|donor| {
            vec![
                escape(&donor.name),
                text_or_placeholder(donor.address.as_deref()),
                text_or_placeholder(donor.phone.as_deref()),
                text_or_placeholder(donor.email.as_deref()),
                text_or_placeholder(donor.notes.as_deref()),
            ]
        })
        .collect();

    let mut body = String::from("<h1>Donor list</h1>\n");
    body.push_str(&count_line("Number of donors", donors.len()));
    body.push_str(&table(&["Name", "Address", "Phone", "Email", "Notes"], &rows));
    document("Donor list", &body)
}
