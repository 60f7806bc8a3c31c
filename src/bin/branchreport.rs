use std::io::Read;
use std::path::PathBuf;

use branchreport::{
    editor, ActivityList, BranchReports, EntryEdit, PhotoFile, ReportSession, SectionKey,
    SectionUpdate,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "branchreport", about = "Quarterly branch report builder")]
struct Cli {
    /// Database path (default: ~/.branchreport/reports.db)
    #[arg(long)]
    db: Option<String>,

    /// Directory for uploaded photos (default: ~/.branchreport/photos)
    #[arg(long)]
    photos: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List reports, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start a new report and store it as a draft
    New {
        #[arg(long)]
        branch: Option<String>,
        /// Reporting quarter, e.g. "Q2 2025"
        #[arg(long)]
        quarter: Option<String>,
        #[arg(long)]
        leader: Option<String>,
    },
    /// Show a report with its section completion
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace one section with JSON read from a file (or stdin)
    Edit {
        id: String,
        /// Section key, e.g. generalInfo, membership, offerings
        section: SectionKey,
        /// JSON file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Manage entries of a list section
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Manage additional leaders
    Leader {
        #[command(subcommand)]
        action: LeaderAction,
    },
    /// Attach or remove entry photos
    Photo {
        #[command(subcommand)]
        action: PhotoAction,
    },
    /// Mark a report submitted. Submitted reports can no longer be edited.
    Submit { id: String },
    /// Delete a report and its photos
    Delete { id: String },
    /// Print the stored report as JSON
    Export { id: String },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct EntryFields {
    /// Date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
    /// Participants, or attendance for divine services
    #[arg(long)]
    count: Option<i64>,
    /// Description, or activities for youth entries
    #[arg(long)]
    text: Option<String>,
    /// Service type for divine services, training needs for youth entries
    #[arg(long)]
    kind: Option<String>,
}

impl From<EntryFields> for EntryEdit {
    fn from(f: EntryFields) -> Self {
        EntryEdit {
            date: f.date,
            count: f.count,
            text: f.text,
            kind: f.kind,
        }
    }
}

#[derive(Subcommand)]
enum EntryAction {
    /// Append an entry
    Add {
        id: String,
        /// youthActivities, divineServices, bibleStudies, layActivities,
        /// visitation, prayerWalks, womensMinistry or facilities
        list: ActivityList,
        #[command(flatten)]
        fields: EntryFields,
    },
    /// Change fields of an entry
    Set {
        id: String,
        list: ActivityList,
        entry: String,
        #[command(flatten)]
        fields: EntryFields,
    },
    /// Remove an entry
    Remove {
        id: String,
        list: ActivityList,
        entry: String,
    },
}

#[derive(Subcommand)]
enum LeaderAction {
    /// Add a leader record
    Add {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        contact: String,
    },
    /// Remove a leader record
    Remove { id: String, leader: String },
}

#[derive(Subcommand)]
enum PhotoAction {
    /// Upload photos to an entry
    Add {
        id: String,
        list: ActivityList,
        entry: String,
        files: Vec<PathBuf>,
    },
    /// Remove the photo at INDEX (0-based) from an entry
    Remove {
        id: String,
        list: ActivityList,
        entry: String,
        index: usize,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// Remove a config value
    Unset { key: String },
    /// List all config values
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => branchreport::Database::open_at(path).await?,
        None => branchreport::Database::open().await?,
    };
    let photo_root = match cli.photos {
        Some(dir) => dir,
        None => branchreport::storage::data_dir()?.join("photos"),
    };
    let app = BranchReports::open(db, photo_root).await?;

    match cli.command {
        Commands::List { json } => handle_list(&app, json).await?,
        Commands::New {
            branch,
            quarter,
            leader,
        } => {
            let mut session = app.new_session();
            let mut info = session.data().general_info.clone();
            if let Some(branch) = branch {
                info.branch_name = branch;
            }
            if let Some(quarter) = quarter {
                info.reporting_quarter = quarter;
            }
            if let Some(leader) = leader {
                info.leader_name = leader;
            }
            session.update_section(SectionUpdate::GeneralInfo(info));
            session.save().await?;
            println!("{}", session.report_id().unwrap_or_default());
        }
        Commands::Show { id, json } => handle_show(&app, &id, json).await?,
        Commands::Edit { id, section, file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            let update = SectionUpdate::from_json(section, value)
                .map_err(|e| anyhow::anyhow!("{section} does not match the section shape: {e}"))?;

            let mut session = app.open_session(&id).await?;
            session.update_section(update);
            save_and_report(&mut session).await?;
        }
        Commands::Entry { action } => handle_entry(&app, action).await?,
        Commands::Leader { action } => handle_leader(&app, action).await?,
        Commands::Photo { action } => handle_photo(&app, action).await?,
        Commands::Submit { id } => {
            let mut session = app.open_session(&id).await?;
            session.submit().await?;
            println!("Submitted {id}.");
        }
        Commands::Delete { id } => {
            app.delete_report(&id).await?;
            println!("Deleted {id}.");
        }
        Commands::Export { id } => {
            let report = app.get_report(&id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config { action } => handle_config(&app, action).await?,
    }

    Ok(())
}

/// Save and print the session's completion line.
async fn save_and_report(session: &mut ReportSession) -> anyhow::Result<()> {
    if let Err(e) = session.save().await {
        if e.is_retryable() {
            eprintln!("Nothing was lost; run the same command again to retry.");
        }
        return Err(e.into());
    }
    println!("Saved. {}", session.completion());
    Ok(())
}

async fn handle_list(app: &BranchReports, json: bool) -> anyhow::Result<()> {
    let reports = app.list_reports().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    if reports.is_empty() {
        println!("No reports.");
        return Ok(());
    }

    for r in &reports {
        let gi = &r.data.general_info;
        let completion = branchreport::CompletionSummary::evaluate(Some(&r.data));
        println!(
            "{}  {:<20} {:<8} {:<20} {:<9} {}  {:>3}%",
            r.id,
            or_dash(&gi.branch_name),
            or_dash(&gi.reporting_quarter),
            or_dash(&gi.leader_name),
            r.data.status.as_str(),
            r.updated_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            completion.percent()
        );
    }
    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

async fn handle_show(app: &BranchReports, id: &str, json: bool) -> anyhow::Result<()> {
    let report = app.get_report(id).await?;
    let completion = branchreport::CompletionSummary::evaluate(Some(&report.data));

    if json {
        let out = serde_json::json!({
            "report": report,
            "completion": completion,
            "ratio": completion.ratio(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let gi = &report.data.general_info;
    println!("Report {} ({})", report.id, report.data.status);
    println!("  Branch:  {}", or_dash(&gi.branch_name));
    println!("  Quarter: {}", or_dash(&gi.reporting_quarter));
    println!("  Leader:  {}", or_dash(&gi.leader_name));
    println!(
        "  Updated: {}",
        report
            .updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
    );
    println!();
    for s in &completion.sections {
        let mark = if s.complete { "x" } else { " " };
        println!("  [{mark}] {}", s.title);
    }
    println!();
    println!("{completion} ({}%)", completion.percent());
    Ok(())
}

async fn handle_entry(app: &BranchReports, action: EntryAction) -> anyhow::Result<()> {
    match action {
        EntryAction::Add { id, list, fields } => {
            let mut session = app.open_session(&id).await?;
            let entry_id = session.add_entry(list);
            session.edit_entry(list, &entry_id, fields.into())?;
            session.save().await?;
            println!("{entry_id}");
        }
        EntryAction::Set {
            id,
            list,
            entry,
            fields,
        } => {
            let mut session = app.open_session(&id).await?;
            session.edit_entry(list, &entry, fields.into())?;
            save_and_report(&mut session).await?;
        }
        EntryAction::Remove { id, list, entry } => {
            let mut session = app.open_session(&id).await?;
            session.remove_entry(list, &entry);
            save_and_report(&mut session).await?;
        }
    }
    Ok(())
}

async fn handle_leader(app: &BranchReports, action: LeaderAction) -> anyhow::Result<()> {
    match action {
        LeaderAction::Add {
            id,
            name,
            position,
            contact,
        } => {
            let mut session = app.open_session(&id).await?;
            let (added, leader_id) = editor::add_leader(&session.data().leaders);
            session.update_section(added);
            let update = editor::update_leader(&session.data().leaders, &leader_id, |l| {
                l.name = name;
                l.position = position;
                l.contact = contact;
            })
            .ok_or_else(|| anyhow::anyhow!("leader {leader_id} was not added"))?;
            session.update_section(update);
            session.save().await?;
            println!("{leader_id}");
        }
        LeaderAction::Remove { id, leader } => {
            let mut session = app.open_session(&id).await?;
            let update = editor::remove_leader(&session.data().leaders, &leader);
            session.update_section(update);
            save_and_report(&mut session).await?;
        }
    }
    Ok(())
}

async fn handle_photo(app: &BranchReports, action: PhotoAction) -> anyhow::Result<()> {
    match action {
        PhotoAction::Add {
            id,
            list,
            entry,
            files,
        } => {
            let mut picked = Vec::with_capacity(files.len());
            for path in &files {
                picked.push(PhotoFile::read(path).await?);
            }
            let mut session = app.open_session(&id).await?;
            let urls = session.attach_photos(list, &entry, picked).await?;
            session.save().await?;
            if urls.len() < files.len() {
                eprintln!(
                    "Entry holds at most {} photos; {} file(s) skipped.",
                    app.settings().max_photos_per_entry,
                    files.len() - urls.len()
                );
            }
            for url in urls {
                println!("{url}");
            }
        }
        PhotoAction::Remove {
            id,
            list,
            entry,
            index,
        } => {
            let mut session = app.open_session(&id).await?;
            session.remove_photo(list, &entry, index).await?;
            save_and_report(&mut session).await?;
        }
    }
    Ok(())
}

async fn handle_config(app: &BranchReports, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => match app.config_get(&key).await? {
            Some(v) => println!("{key} = {v}"),
            None => println!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            app.config_set(&key, &value).await?;
            println!("Config updated.");
        }
        ConfigAction::Unset { key } => {
            if app.config_unset(&key).await? {
                println!("Removed {key}.");
            } else {
                println!("{key} is not set");
            }
        }
        ConfigAction::List => {
            let items = app.config_list().await?;
            if items.is_empty() {
                println!("No configuration set.");
            } else {
                for (k, v) in items {
                    println!("{k} = {v}");
                }
            }
        }
    }
    Ok(())
}
