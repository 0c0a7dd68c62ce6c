// src/main.rs

use clap::Parser;
use indexmap::IndexMap;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion2tasks::{
    mapping_candidates, parse_database_id, sorted_by_name, sync_work_plan, AppError, Command,
    CommandLineInput, ConnectionSettings, DatabaseId, InMemoryDirectory, MappingCandidate,
    NotionSession, SyncArgs, SyncRequest, TargetField,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion2tasks.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // Logs go to stderr so stdout carries only JSON.
    let stderr_appender = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// One line of the `databases` listing.
#[derive(Serialize)]
struct DatabaseListing<'a> {
    id: &'a DatabaseId,
    name: &'a str,
    properties: usize,
}

/// Runs the selected subcommand and returns its JSON output.
async fn execute(cli: &CommandLineInput) -> Result<String, AppError> {
    let settings = ConnectionSettings::resolve(cli)?;
    let session = NotionSession::connect(
        settings.base_url.clone(),
        settings.client.clone(),
        &settings.credential,
    )?;

    match &cli.command {
        Command::Databases => {
            let databases = sorted_by_name(&session.list_databases().await?);
            let listing: Vec<DatabaseListing<'_>> = databases
                .iter()
                .map(|db| DatabaseListing {
                    id: &db.id,
                    name: &db.name,
                    properties: db.properties.len(),
                })
                .collect();
            Ok(serde_json::to_string_pretty(&listing)?)
        }
        Command::Properties { database } => {
            let database = session.database(&parse_database_id(database)?).await?;
            let candidates: IndexMap<&str, Vec<MappingCandidate>> = TargetField::ALL
                .iter()
                .map(|field| (field.label(), mapping_candidates(&database, *field)))
                .collect();
            Ok(serde_json::to_string_pretty(&candidates)?)
        }
        Command::Sync(args) => {
            let plan = sync_database(&session, &settings, args).await?;
            if !plan.warnings.is_empty() {
                eprintln!(
                    "⚠️  {} field(s) could not be translated; see \"warnings\" in the output.",
                    plan.warnings.len()
                );
            }
            Ok(serde_json::to_string_pretty(&plan)?)
        }
    }
}

async fn sync_database(
    session: &NotionSession,
    settings: &ConnectionSettings,
    args: &SyncArgs,
) -> Result<notion2tasks::WorkPlan, AppError> {
    let request = SyncRequest {
        database_id: parse_database_id(&args.database)?,
        mapping: args.field_mapping()?,
    };
    let directory = match &args.directory {
        Some(path) => InMemoryDirectory::from_json_file(path)?,
        None => InMemoryDirectory::default(),
    };
    if request.mapping.resources.is_some() && directory.is_empty() {
        log::warn!("No --directory given; resources will not resolve to users");
    }

    sync_work_plan(session, &settings.credential, &request, &directory).await
}

fn write_output(json: &str, path: Option<&Path>) -> Result<(), AppError> {
    match path {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("✓ Output saved to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let json = match execute(&cli).await {
        Ok(json) => json,
        Err(AppError::RemoteRequest(e))
            if e.code.as_ref().is_some_and(|c| c.is_credential_problem()) =>
        {
            eprintln!("❌ Notion rejected the token; check NOTION_API_KEY or NOTION_USER_TOKEN.");
            return Err(AppError::RemoteRequest(e).into());
        }
        Err(e) => return Err(e.into()),
    };
    write_output(&json, cli.output.as_deref())?;

    Ok(())
}
