// Command-line interface
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, AppConfig};
use crate::report::{self, ReportOptions};
use crate::state::{
    self, current_year, init_db, next_accession_number, parse_optional_number, queries,
    register_artifact, AppPaths, ArtifactDraft, ArtifactQuery, Condition, DbConnection,
};

#[derive(Debug)]
pub struct CommandError {
    message: String,
}

impl<E: std::fmt::Display> From<E> for CommandError {
    fn from(error: E) -> Self {
        CommandError {
            message: error.to_string(),
        }
    }
}

impl CommandError {
    fn new(message: impl Into<String>) -> Self {
        CommandError {
            message: message.into(),
        }
    }

    fn not_found(entity: &str, id: i64) -> Self {
        CommandError::new(format!("{} {} not found", entity, id))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type CommandResult<T> = Result<T, CommandError>;

#[derive(Parser, Debug)]
#[command(name = "hembygd", author, version, about = "Artifact catalogue for a local heritage museum", long_about = None)]
pub struct Cli {
    /// Directory holding the database, images and backups
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and database
    Init,
    /// Register a new artifact
    Register(RegisterArgs),
    /// Print the next free accession number
    NextAccession {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Search artifacts by name, description or accession number
    Search {
        term: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show everything recorded about one artifact
    Show { id: i64 },
    #[command(subcommand)]
    Category(CategoryCommand),
    #[command(subcommand)]
    Location(LocationCommand),
    #[command(subcommand)]
    Donor(DonorCommand),
    #[command(subcommand)]
    Photo(PhotoCommand),
    #[command(subcommand)]
    Exhibition(ExhibitionCommand),
    #[command(subcommand)]
    Conservation(ConservationCommand),
    /// Collection statistics
    Stats,
    /// Copy the database into the backup directory
    Backup,
    /// Write a printable HTML report and open it in the browser
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    /// Defaults to the next number for the current year
    #[arg(long)]
    pub accession: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Category name
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub material: Option<String>,
    /// Year of manufacture, free text ("ca 1890")
    #[arg(long)]
    pub year: Option<String>,
    /// Place of manufacture
    #[arg(long)]
    pub place: Option<String>,
    #[arg(long)]
    pub maker: Option<String>,
    /// Length in cm
    #[arg(long)]
    pub length: Option<String>,
    /// Width in cm
    #[arg(long)]
    pub width: Option<String>,
    /// Height in cm
    #[arg(long)]
    pub height: Option<String>,
    /// Weight in grams
    #[arg(long)]
    pub weight: Option<String>,
    #[arg(long, value_parser = parse_condition)]
    pub condition: Option<Condition>,
    /// Storage location id
    #[arg(long)]
    pub location: Option<i64>,
    #[arg(long)]
    pub registered_by: Option<String>,
    /// Photo file to attach; repeat for several
    #[arg(long = "photo", value_name = "PATH")]
    pub photos: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Add a category
    Add { name: String },
    /// List categories
    List,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommand {
    /// Add a storage location
    Add {
        building: String,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        shelf: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List storage locations
    List,
    /// Delete a location; its artifacts become unplaced
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum DonorCommand {
    /// Add a donor
    Add {
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List donors
    List,
    /// Record that a donor contributed an artifact
    Link {
        artifact: i64,
        donor: i64,
        /// Donation date, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Gift, purchase, loan...
        #[arg(long = "type")]
        acquisition_type: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommand {
    /// Attach photos to an artifact
    Add {
        artifact: i64,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        photographer: Option<String>,
    },
    /// Remove a photo from the catalogue (the file is kept)
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ExhibitionCommand {
    /// Add an exhibition
    Add {
        name: String,
        #[arg(long)]
        starts: Option<NaiveDate>,
        #[arg(long)]
        ends: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List exhibitions
    List,
    /// Put an artifact in an exhibition
    Link { artifact: i64, exhibition: i64 },
}

#[derive(Subcommand, Debug)]
pub enum ConservationCommand {
    /// Record a conservation action
    Add {
        artifact: i64,
        #[arg(long)]
        action: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long = "by")]
        performed_by: Option<String>,
        #[arg(long)]
        cost: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub kind: ReportKind,
    /// Only write the file, do not open a browser
    #[arg(long, global = true)]
    pub no_open: bool,
}

#[derive(Subcommand, Debug)]
pub enum ReportKind {
    /// Full record of one artifact, photos included
    Artifact { id: i64 },
    /// List of artifacts matching a search
    Artifacts {
        term: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    Statistics,
    Locations,
    Categories,
    Donors,
}

fn parse_condition(value: &str) -> Result<Condition, String> {
    Condition::from_string(value)
        .ok_or_else(|| format!("unknown condition '{}', expected excellent, good or poor", value))
}

/// Trim free text; blank becomes absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Everything a command needs: configuration, paths and an open catalogue
struct Context {
    config: AppConfig,
    paths: AppPaths,
    db: DbConnection,
}

impl Context {
    fn open(data_dir: Option<&Path>) -> CommandResult<Self> {
        let (config, paths) = config::load(data_dir)?;
        paths.ensure()?;
        let db = init_db(&paths.database)?;
        Ok(Context { config, paths, db })
    }

    fn category_id(&self, name: Option<&str>) -> CommandResult<Option<i64>> {
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => return Ok(None),
        };
        match queries::find_category_by_name(&self.db, name)? {
            Some(category) => Ok(Some(category.id)),
            None => Err(CommandError::new(format!("Unknown category '{}'", name))),
        }
    }
}

/// Parse arguments and run the chosen command
pub fn execute(cli: Cli) -> CommandResult<()> {
    let ctx = Context::open(cli.data_dir.as_deref())?;

    match cli.command {
        Command::Init => {
            println!("Catalogue ready at {}", ctx.paths.root.display());
            Ok(())
        }
        Command::Register(args) => register(&ctx, args),
        Command::NextAccession { year } => {
            let year = year.unwrap_or_else(current_year);
            println!("{}", next_accession_number(&ctx.db, year)?);
            Ok(())
        }
        Command::Search { term, category } => search(&ctx, term, category.as_deref()),
        Command::Show { id } => show(&ctx, id),
        Command::Category(command) => category(&ctx, command),
        Command::Location(command) => location(&ctx, command),
        Command::Donor(command) => donor(&ctx, command),
        Command::Photo(command) => photo(&ctx, command),
        Command::Exhibition(command) => exhibition(&ctx, command),
        Command::Conservation(command) => conservation(&ctx, command),
        Command::Stats => stats(&ctx),
        Command::Backup => {
            let path = state::backup_database(&ctx.paths)?;
            println!("Backup written to {}", path.display());
            Ok(())
        }
        Command::Report(args) => print_report(&ctx, args),
    }
}

// ==================== ARTIFACT COMMANDS ====================

fn register(ctx: &Context, args: RegisterArgs) -> CommandResult<()> {
    let name = args.name.trim().to_string();
    if name.is_empty() {
        return Err(CommandError::new("Name is required"));
    }

    let accession_number = match non_blank(args.accession) {
        Some(number) => number,
        None => next_accession_number(&ctx.db, current_year())?,
    };

    let draft = ArtifactDraft {
        accession_number,
        name,
        description: non_blank(args.description),
        category_id: ctx.category_id(args.category.as_deref())?,
        material: non_blank(args.material),
        manufacture_year: non_blank(args.year),
        manufacture_place: non_blank(args.place),
        maker: non_blank(args.maker),
        length_cm: parse_optional_number(args.length.as_deref()),
        width_cm: parse_optional_number(args.width.as_deref()),
        height_cm: parse_optional_number(args.height.as_deref()),
        weight_g: parse_optional_number(args.weight.as_deref()),
        condition: args.condition,
        location_id: args.location,
        registered_by: non_blank(args.registered_by)
            .or_else(|| ctx.config.default_registrant.clone()),
    };

    let outcome = register_artifact(&ctx.db, &ctx.paths.images, &draft, &args.photos)?;

    println!(
        "Registered {} '{}' as artifact {}",
        draft.accession_number, draft.name, outcome.artifact_id
    );
    if !outcome.photos.attached.is_empty() {
        println!("Attached {} photo(s)", outcome.photos.attached.len());
    }
    for warning in &outcome.photos.warnings {
        println!("Warning: {}", warning);
    }
    Ok(())
}

fn search(ctx: &Context, term: Option<String>, category: Option<&str>) -> CommandResult<()> {
    let query = ArtifactQuery {
        term,
        category_id: ctx.category_id(category)?,
    };
    let results = queries::search_artifacts(&ctx.db, &query)?;

    for summary in &results {
        let artifact = &summary.artifact;
        println!(
            "{:>5}  {:<12}  {:<30}  {:<14}  {} {}",
            artifact.id,
            artifact.accession_number,
            artifact.name,
            or_dash(summary.category_name.as_deref()),
            or_dash(summary.building.as_deref()),
            summary.room.as_deref().unwrap_or(""),
        );
    }
    println!("{} artifact(s)", results.len());
    Ok(())
}

fn show(ctx: &Context, id: i64) -> CommandResult<()> {
    let dossier = queries::get_artifact_dossier(&ctx.db, id)?
        .ok_or_else(|| CommandError::not_found("Artifact", id))?;
    let exhibitions = queries::exhibitions_for_artifact(&ctx.db, id)?;
    let artifact = &dossier.detail.artifact;

    println!("{}  {}", artifact.accession_number, artifact.name);
    println!("  Description:  {}", or_dash(artifact.description.as_deref()));
    println!("  Category:     {}", or_dash(dossier.detail.category_name.as_deref()));
    println!("  Material:     {}", or_dash(artifact.material.as_deref()));
    println!(
        "  Made:         {} {} {}",
        or_dash(artifact.manufacture_year.as_deref()),
        or_dash(artifact.manufacture_place.as_deref()),
        or_dash(artifact.maker.as_deref()),
    );
    println!(
        "  Dimensions:   {}",
        report::html::format_dimensions(artifact.length_cm, artifact.width_cm, artifact.height_cm)
    );
    println!("  Weight:       {}", report::html::format_weight(artifact.weight_g));
    println!("  Condition:    {}", or_dash(artifact.condition.map(|c| c.label())));
    let location = dossier.detail.location.as_ref().map(|l| l.display_name());
    println!("  Location:     {}", or_dash(location.as_deref()));
    println!(
        "  Registered:   {} by {}",
        artifact.registered_at.format(queries::TIMESTAMP_FORMAT),
        or_dash(artifact.registered_by.as_deref())
    );

    for photo in &dossier.photos {
        println!("  Photo {}:      {} ({})", photo.id, photo.file_path, photo.taken_on);
    }
    for donor in &dossier.donors {
        println!(
            "  Donor:        {} {} {}",
            donor.donor_name,
            donor.link.donated_on.map(|d| d.to_string()).unwrap_or_default(),
            donor.link.acquisition_type.as_deref().unwrap_or("")
        );
    }
    for record in &dossier.conservation {
        println!("  Conserved:    {} {}", record.performed_on, record.action);
    }
    for exhibition in &exhibitions {
        println!("  Exhibited:    {}", exhibition.name);
    }
    Ok(())
}

// ==================== REFERENCE DATA COMMANDS ====================

fn category(ctx: &Context, command: CategoryCommand) -> CommandResult<()> {
    match command {
        CategoryCommand::Add { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CommandError::new("Category name is required"));
            }
            let id = queries::add_category(&ctx.db, name)?;
            println!("Added category '{}' ({})", name, id);
        }
        CategoryCommand::List => {
            for category in queries::list_categories(&ctx.db)? {
                println!("{:>4}  {}", category.id, category.name);
            }
        }
    }
    Ok(())
}

fn location(ctx: &Context, command: LocationCommand) -> CommandResult<()> {
    match command {
        LocationCommand::Add {
            building,
            room,
            shelf,
            notes,
        } => {
            let building = building.trim();
            if building.is_empty() {
                return Err(CommandError::new("Building is required"));
            }
            let (room, shelf, notes) = (non_blank(room), non_blank(shelf), non_blank(notes));
            let id = queries::add_location(
                &ctx.db,
                building,
                room.as_deref(),
                shelf.as_deref(),
                notes.as_deref(),
            )?;
            println!("Added location {}", id);
        }
        LocationCommand::List => {
            for location in queries::list_locations(&ctx.db)? {
                let count = queries::count_artifacts_at_location(&ctx.db, location.id)?;
                println!(
                    "{:>4}  {:<40}  {} artifact(s)",
                    location.id,
                    location.display_name(),
                    count
                );
            }
        }
        LocationCommand::Delete { id } => {
            let unplaced = queries::delete_location(&ctx.db, id)?;
            println!(
                "Deleted location {}; {} artifact(s) no longer have a location",
                id, unplaced
            );
        }
    }
    Ok(())
}

fn donor(ctx: &Context, command: DonorCommand) -> CommandResult<()> {
    match command {
        DonorCommand::Add {
            name,
            address,
            phone,
            email,
            notes,
        } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CommandError::new("Donor name is required"));
            }
            let (address, phone, email, notes) = (
                non_blank(address),
                non_blank(phone),
                non_blank(email),
                non_blank(notes),
            );
            let id = queries::add_donor(
                &ctx.db,
                name,
                address.as_deref(),
                phone.as_deref(),
                email.as_deref(),
                notes.as_deref(),
            )?;
            println!("Added donor {}", id);
        }
        DonorCommand::List => {
            for donor in queries::list_donors(&ctx.db)? {
                println!(
                    "{:>4}  {:<30}  {}  {}",
                    donor.id,
                    donor.name,
                    or_dash(donor.phone.as_deref()),
                    or_dash(donor.email.as_deref())
                );
            }
        }
        DonorCommand::Link {
            artifact,
            donor,
            date,
            acquisition_type,
            notes,
        } => {
            let (acquisition_type, notes) = (non_blank(acquisition_type), non_blank(notes));
            queries::link_artifact_donor(
                &ctx.db,
                artifact,
                donor,
                date,
                acquisition_type.as_deref(),
                notes.as_deref(),
            )?;
            println!("Linked donor {} to artifact {}", donor, artifact);
        }
    }
    Ok(())
}

fn photo(ctx: &Context, command: PhotoCommand) -> CommandResult<()> {
    match command {
        PhotoCommand::Add {
            artifact,
            paths,
            description,
            photographer,
        } => {
            if queries::get_artifact(&ctx.db, artifact)?.is_none() {
                return Err(CommandError::not_found("Artifact", artifact));
            }
            let (description, photographer) = (non_blank(description), non_blank(photographer));
            let outcome = state::attach_photos(
                &ctx.db,
                &ctx.paths.images,
                artifact,
                &paths,
                description.as_deref(),
                photographer.as_deref(),
            );
            println!("Attached {} photo(s)", outcome.attached.len());
            for warning in &outcome.warnings {
                println!("Warning: {}", warning);
            }
        }
        PhotoCommand::Delete { id } => {
            queries::delete_photo(&ctx.db, id)?;
            println!("Removed photo {}", id);
        }
    }
    Ok(())
}

fn exhibition(ctx: &Context, command: ExhibitionCommand) -> CommandResult<()> {
    match command {
        ExhibitionCommand::Add {
            name,
            starts,
            ends,
            description,
        } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CommandError::new("Exhibition name is required"));
            }
            let description = non_blank(description);
            let id = queries::add_exhibition(&ctx.db, name, starts, ends, description.as_deref())?;
            println!("Added exhibition {}", id);
        }
        ExhibitionCommand::List => {
            for exhibition in queries::list_exhibitions(&ctx.db)? {
                let dates = match (exhibition.starts_on, exhibition.ends_on) {
                    (Some(starts), Some(ends)) => format!("{} - {}", starts, ends),
                    (Some(starts), None) => format!("from {}", starts),
                    (None, Some(ends)) => format!("until {}", ends),
                    (None, None) => String::new(),
                };
                println!("{:>4}  {:<30}  {}", exhibition.id, exhibition.name, dates);
            }
        }
        ExhibitionCommand::Link {
            artifact,
            exhibition,
        } => {
            queries::link_artifact_exhibition(&ctx.db, artifact, exhibition)?;
            println!("Added artifact {} to exhibition {}", artifact, exhibition);
        }
    }
    Ok(())
}

fn conservation(ctx: &Context, command: ConservationCommand) -> CommandResult<()> {
    match command {
        ConservationCommand::Add {
            artifact,
            action,
            date,
            performed_by,
            cost,
            notes,
        } => {
            let action = action.trim();
            if action.is_empty() {
                return Err(CommandError::new("Action is required"));
            }
            let performed_on = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let (performed_by, notes) = (non_blank(performed_by), non_blank(notes));
            let id = queries::add_conservation_record(
                &ctx.db,
                artifact,
                performed_on,
                action,
                performed_by.as_deref(),
                parse_optional_number(cost.as_deref()),
                notes.as_deref(),
            )?;
            println!("Recorded conservation {} for artifact {}", id, artifact);
        }
    }
    Ok(())
}

fn stats(ctx: &Context) -> CommandResult<()> {
    let stats = queries::compute_statistics(&ctx.db)?;

    println!("Total artifacts: {}", stats.total);
    println!();
    println!("Per category:");
    for category in &stats.per_category {
        println!("  {:<20} {}", category.name, category.count);
    }
    println!();
    println!("Latest registrations:");
    for artifact in &stats.recent {
        println!(
            "  {:<12} {:<30} {}",
            artifact.accession_number,
            artifact.name,
            artifact.registered_at.format(queries::TIMESTAMP_FORMAT)
        );
    }
    Ok(())
}

// ==================== REPORT COMMANDS ====================

fn print_report(ctx: &Context, args: ReportArgs) -> CommandResult<()> {
    let (html, title) = match args.kind {
        ReportKind::Artifact { id } => {
            let dossier = queries::get_artifact_dossier(&ctx.db, id)?
                .ok_or_else(|| CommandError::not_found("Artifact", id))?;
            let title = format!(
                "{} {}",
                dossier.detail.artifact.accession_number, dossier.detail.artifact.name
            );
            (
                report::artifact_report(&dossier, &ReportOptions::from(&ctx.config)),
                title,
            )
        }
        ReportKind::Artifacts { term, category } => {
            let query = ArtifactQuery {
                term,
                category_id: ctx.category_id(category.as_deref())?,
            };
            let artifacts = queries::search_artifacts(&ctx.db, &query)?;
            (
                report::artifact_list_report(&artifacts),
                "Artifact list".to_string(),
            )
        }
        ReportKind::Statistics => (
            report::statistics_report(&queries::compute_statistics(&ctx.db)?),
            "Museum statistics".to_string(),
        ),
        ReportKind::Locations => (
            report::location_list_report(&queries::list_locations(&ctx.db)?),
            "Location list".to_string(),
        ),
        ReportKind::Categories => (
            report::category_list_report(&queries::list_categories(&ctx.db)?),
            "Category list".to_string(),
        ),
        ReportKind::Donors => (
            report::donor_list_report(&queries::list_donors(&ctx.db)?),
            "Donor list".to_string(),
        ),
    };

    let path = report::write_report(&html, &title)?;
    println!("Report written to {}", path.display());

    if !args.no_open {
        if let Err(e) = report::open_in_viewer(&path) {
            log::warn!("{}", e);
            println!("Open the file in a browser to print it");
        }
    }
    Ok(())
}
