//! Command handlers for CLI subcommands.

use std::collections::HashMap;
use std::path::Path;

use chrono::Local;
use serde_json::Value;
use tracing::{info, warn};

use sitebook_client::BackendClient;
use sitebook_finance::{FinancialAggregator, Scope};
use sitebook_models::{
    Owner, Project, ProjectId, ProjectStatus, RecordStore, TimelineEntry, TimelineId,
};
use sitebook_persistence::LocalStore;

use crate::cli::{Commands, OutputFormat, ProjectCommand, ProjectDetails, TimelineAdd, TimelineCommand};
use crate::config::{load_rates, Settings};
use crate::render;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command against the backend, or the local store when no
/// backend is configured.
pub fn execute(command: Commands, settings: &Settings) -> Result<()> {
    match &settings.backend {
        Some(config) => {
            let client = BackendClient::new(config.clone())?;
            run(command, &client, settings)
        }
        None => {
            let store = LocalStore::open(&settings.state_dir);
            run(command, &store, settings)
        }
    }
}

/// Execute a CLI command against any record store.
pub fn run<S: RecordStore>(command: Commands, store: &S, settings: &Settings) -> Result<()> {
    match command {
        Commands::Project { action } => match action {
            ProjectCommand::List { format } => cmd_project_list(store, format),
            ProjectCommand::Add {
                code,
                name,
                details,
            } => cmd_project_add(store, code, name, details),
            ProjectCommand::Show { project } => cmd_project_show(store, &project, settings),
            ProjectCommand::Update {
                project,
                name,
                details,
            } => cmd_project_update(store, &project, name, details),
            ProjectCommand::SetStatus { project, status } => {
                cmd_project_set_status(store, &project, status)
            }
            ProjectCommand::Remove { project } => cmd_project_remove(store, &project),
        },
        Commands::Timeline { action } => match action {
            TimelineCommand::List { project, format } => {
                cmd_timeline_list(store, project.as_deref(), format, settings)
            }
            TimelineCommand::Add(add) => cmd_timeline_add(store, add),
            TimelineCommand::Import { file } => cmd_timeline_import(store, &file),
            TimelineCommand::Remove { id } => cmd_timeline_remove(store, &id),
        },
        Commands::Dashboard {
            project,
            from,
            to,
            format,
            rates,
        } => {
            let mut scope = Scope::all();
            if let Some(key) = project.as_deref() {
                scope = scope.with_project_id(resolve_project(store, key)?.id);
            }
            if let Some(from) = from {
                scope = scope.with_from(from);
            }
            if let Some(to) = to {
                scope = scope.with_to(to);
            }
            let aggregator = aggregator_for(settings, rates.as_deref())?;
            cmd_dashboard(store, &scope, &aggregator, format)
        }
    }
}

/// Finds a project by ID or code, or fails with a readable message.
fn resolve_project<S: RecordStore>(store: &S, key: &str) -> Result<Project> {
    store
        .find_project(key)?
        .ok_or_else(|| format!("Project not found: {}", key).into())
}

/// Builds the aggregator from an explicit rates file or the default one.
fn aggregator_for(settings: &Settings, rates: Option<&Path>) -> Result<FinancialAggregator> {
    let rates = match rates {
        Some(path) => load_rates(path, true)?,
        None => load_rates(&settings.rates_path(), false)?,
    };
    Ok(FinancialAggregator::new(rates))
}

fn apply_details(project: &mut Project, details: ProjectDetails) {
    if let Some(project_type) = details.project_type {
        project.project_type = project_type;
    }
    if let Some(priority) = details.priority {
        project.priority = priority;
    }
    if let Some(budget) = details.budget {
        project.budget = sitebook_models::lenient::sanitize(budget);
    }
    if let Some(status) = details.status {
        project.status = status;
    }
    if details.owner.is_some() || details.email.is_some() || details.phone.is_some() {
        let previous = std::mem::take(&mut project.owner);
        project.owner = Owner {
            name: details.owner.or(previous.name),
            email: details.email.or(previous.email),
            phone: details.phone.or(previous.phone),
        };
    }
    if let Some(issues) = details.issues {
        project.issues = issues;
    }
    if let Some(observations) = details.observations {
        project.observations = observations;
    }
}

fn cmd_project_list<S: RecordStore>(store: &S, format: OutputFormat) -> Result<()> {
    let projects = store.list_projects()?;

    match format {
        OutputFormat::Table => println!("{}", render::project_table(&projects)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&projects)?),
        OutputFormat::Brief => {
            if !projects.is_empty() {
                println!("{}", render::project_brief(&projects));
            }
        }
    }
    Ok(())
}

fn cmd_project_add<S: RecordStore>(
    store: &S,
    code: String,
    name: String,
    details: ProjectDetails,
) -> Result<()> {
    let code = code.trim().to_string();
    if code.is_empty() {
        return Err("Project code must not be empty".into());
    }
    if store.find_project(&code)?.is_some() {
        return Err(format!("A project with code '{}' already exists", code).into());
    }

    let mut project = Project::new(code, name.trim());
    apply_details(&mut project, details);
    let project = store.create_project(&project)?;

    info!(project_id = %project.id, code = %project.code, "Project created");
    println!("Created project '{}' ({})", project.name, project.id);
    Ok(())
}

fn cmd_project_show<S: RecordStore>(store: &S, key: &str, settings: &Settings) -> Result<()> {
    let project = resolve_project(store, key)?;
    let entries = store.list_timelines(Some(&project.id))?;
    let aggregator = aggregator_for(settings, None)?;

    let rollup = aggregator.project_rollup(&project, &entries);
    println!("{}", render::project_detail(&project, &rollup));
    Ok(())
}

fn cmd_project_update<S: RecordStore>(
    store: &S,
    key: &str,
    name: Option<String>,
    details: ProjectDetails,
) -> Result<()> {
    let mut project = resolve_project(store, key)?;
    if let Some(name) = name {
        project.name = name.trim().to_string();
    }
    apply_details(&mut project, details);
    project.touch();

    let project = store.update_project(&project)?;
    println!("Updated project '{}' ({})", project.name, project.id);
    Ok(())
}

fn cmd_project_set_status<S: RecordStore>(store: &S, key: &str, status: ProjectStatus) -> Result<()> {
    let mut project = resolve_project(store, key)?;
    let previous = project.status;
    project.set_status(status);
    store.update_project(&project)?;

    info!(project_id = %project.id, from = %previous, to = %status, "Project status changed");
    println!("Project '{}': {} -> {}", project.label(), previous, status);
    Ok(())
}

fn cmd_project_remove<S: RecordStore>(store: &S, key: &str) -> Result<()> {
    let project = resolve_project(store, key)?;
    store.delete_project(&project.id)?;

    info!(project_id = %project.id, "Project removed");
    println!("Removed project '{}' ({})", project.name, project.id);
    Ok(())
}

fn cmd_timeline_list<S: RecordStore>(
    store: &S,
    project: Option<&str>,
    format: OutputFormat,
    settings: &Settings,
) -> Result<()> {
    let projects = store.list_projects()?;
    let filter = match project {
        Some(key) => Some(
            projects
                .iter()
                .find(|p| p.matches_key(key))
                .map(|p| p.id.clone())
                .ok_or_else(|| format!("Project not found: {}", key))?,
        ),
        None => None,
    };
    let entries = store.list_timelines(filter.as_ref())?;

    match format {
        OutputFormat::Table => {
            let labels: HashMap<ProjectId, String> = projects
                .iter()
                .map(|p| (p.id.clone(), p.label().to_string()))
                .collect();
            let aggregator = aggregator_for(settings, None)?;
            println!("{}", render::timeline_table(&entries, &labels, &aggregator));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Brief => {
            if !entries.is_empty() {
                println!("{}", render::timeline_brief(&entries));
            }
        }
    }
    Ok(())
}

fn cmd_timeline_add<S: RecordStore>(store: &S, add: TimelineAdd) -> Result<()> {
    let project = resolve_project(store, &add.project)?;
    let date = add.date.unwrap_or_else(|| Local::now().date_naive());

    let mut entry = TimelineEntry::new(project.id.clone(), date);
    entry.workers = add.workers;
    entry.engineers = add.engineers;
    entry.architects = add.architects;
    entry.project_managers = add.managers;
    entry.materials = add.materials;
    entry.tools = add.tools;
    entry.expenses = add.expenses;
    entry.notes = add.notes.unwrap_or_default();

    if entry.is_empty() {
        return Err("Nothing to record: add workers, materials, tools, expenses or notes".into());
    }

    let entry = store.create_timeline(&entry)?;
    info!(timeline_id = %entry.id, project_id = %project.id, %date, "Timeline entry recorded");
    println!("Recorded {} for '{}' ({})", date, project.label(), entry.id);
    Ok(())
}

/// Reads entries from a JSON file holding an array or a `{"data": [...]}`
/// envelope. Project references may be IDs or codes.
fn cmd_timeline_import<S: RecordStore>(store: &S, file: &Path) -> Result<()> {
    let data = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let value: Value = serde_json::from_str(&data)
        .map_err(|e| format!("Invalid JSON in {}: {}", file.display(), e))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(format!("{}: expected an array of entries", file.display()).into()),
        },
        _ => return Err(format!("{}: expected an array of entries", file.display()).into()),
    };

    let projects = store.list_projects()?;
    let mut imported = 0;
    let mut skipped = 0;

    for (index, item) in items.into_iter().enumerate() {
        let mut entry: TimelineEntry = match serde_json::from_value(item) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(index, error = %e, "Skipping entry that is not a record");
                skipped += 1;
                continue;
            }
        };

        if let Some(reference) = entry.project_id.take() {
            match projects.iter().find(|p| p.matches_key(reference.as_str())) {
                Some(project) => entry.project_id = Some(project.id.clone()),
                None => {
                    warn!(index, project = %reference, "Skipping entry for unknown project");
                    skipped += 1;
                    continue;
                }
            }
        }

        store.create_timeline(&entry)?;
        imported += 1;
    }

    info!(imported, skipped, file = %file.display(), "Import finished");
    println!("Imported {} entry(ies), skipped {}", imported, skipped);
    Ok(())
}

fn cmd_timeline_remove<S: RecordStore>(store: &S, id: &str) -> Result<()> {
    let id = TimelineId::from(id.trim());
    store.delete_timeline(&id)?;
    println!("Removed timeline entry {}", id);
    Ok(())
}

fn cmd_dashboard<S: RecordStore>(
    store: &S,
    scope: &Scope,
    aggregator: &FinancialAggregator,
    format: OutputFormat,
) -> Result<()> {
    let projects = store.list_projects()?;
    let entries = store.list_timelines(scope.project_id.as_ref())?;
    let dashboard = aggregator.aggregate(&entries, &projects, scope);

    match format {
        OutputFormat::Table => println!("{}", render::dashboard(&dashboard)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
        OutputFormat::Brief => println!("{}", render::dashboard_brief(&dashboard)),
    }
    Ok(())
}
