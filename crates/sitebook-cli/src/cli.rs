//! Command-line interface definition using clap.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use sitebook_models::{
    Architect, Engineer, Expense, Material, ProjectManager, ProjectPriority, ProjectStatus, Tool,
    Worker,
};

use crate::config::STATE_DIR_ENV;
use crate::parse;

/// SiteBook - construction project cost ledger
#[derive(Parser, Debug)]
#[command(name = "sitebook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = STATE_DIR_ENV, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Backend base URL; the local store is used when unset
    #[arg(short, long, global = true)]
    pub backend: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, inspect and update projects
    Project {
        #[command(subcommand)]
        action: ProjectCommand,
    },

    /// Record and list daily timeline entries
    Timeline {
        #[command(subcommand)]
        action: TimelineCommand,
    },

    /// Show the financial dashboard
    Dashboard {
        /// Only this project (ID or code)
        #[arg(short, long)]
        project: Option<String>,

        /// First day included (YYYY-MM-DD)
        #[arg(long, value_parser = parse::date)]
        from: Option<NaiveDate>,

        /// Last day included (YYYY-MM-DD)
        #[arg(long, value_parser = parse::date)]
        to: Option<NaiveDate>,

        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Labor rates file (default: <state-dir>/config/rates.json)
        #[arg(long)]
        rates: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List all projects
    List {
        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a project
    Add {
        /// Short project code, e.g. TWR-01
        #[arg(short, long)]
        code: String,

        /// Project name
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        details: ProjectDetails,
    },

    /// Show a project with its spend against budget
    Show {
        /// Project ID or code
        project: String,
    },

    /// Change some fields of a project
    Update {
        /// Project ID or code
        project: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        details: ProjectDetails,
    },

    /// Change a project's status
    SetStatus {
        /// Project ID or code
        project: String,

        /// planning, in_progress, on_hold, completed or cancelled
        status: ProjectStatus,
    },

    /// Delete a project
    Remove {
        /// Project ID or code
        project: String,
    },
}

/// Optional project fields shared by `add` and `update`.
#[derive(Args, Debug, Default)]
pub struct ProjectDetails {
    /// Kind of work (residential, commercial, roadworks, ...)
    #[arg(short = 't', long = "type")]
    pub project_type: Option<String>,

    /// low, medium, high or critical
    #[arg(long)]
    pub priority: Option<ProjectPriority>,

    /// Approved budget
    #[arg(long, value_parser = parse::amount)]
    pub budget: Option<Decimal>,

    /// planning, in_progress, on_hold, completed or cancelled
    #[arg(long)]
    pub status: Option<ProjectStatus>,

    /// Owner name
    #[arg(long)]
    pub owner: Option<String>,

    /// Owner email
    #[arg(long)]
    pub email: Option<String>,

    /// Owner phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Known problems on site
    #[arg(long)]
    pub issues: Option<String>,

    #[arg(long)]
    pub observations: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TimelineCommand {
    /// List timeline entries
    List {
        /// Only this project (ID or code)
        #[arg(short, long)]
        project: Option<String>,

        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Record one day on a project
    Add(TimelineAdd),

    /// Import entries from a JSON file (array or {"data": [...]})
    Import {
        file: PathBuf,
    },

    /// Delete a timeline entry
    Remove {
        /// Timeline entry ID
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct TimelineAdd {
    /// Project ID or code
    #[arg(short, long)]
    pub project: String,

    /// Day of the entry (default: today)
    #[arg(short, long, value_parser = parse::date)]
    pub date: Option<NaiveDate>,

    /// name:role:hours[:cost]
    #[arg(long = "worker", value_parser = parse::worker)]
    pub workers: Vec<Worker>,

    /// name:specialty:hours[:cost]
    #[arg(long = "engineer", value_parser = parse::engineer)]
    pub engineers: Vec<Engineer>,

    /// name:specialty:hours[:cost]
    #[arg(long = "architect", value_parser = parse::architect)]
    pub architects: Vec<Architect>,

    /// name[:contact]
    #[arg(long = "manager", value_parser = parse::manager)]
    pub managers: Vec<ProjectManager>,

    /// name:quantity:unit:cost
    #[arg(long = "material", value_parser = parse::material)]
    pub materials: Vec<Material>,

    /// name:quantity:status[:cost]
    #[arg(long = "tool", value_parser = parse::tool)]
    pub tools: Vec<Tool>,

    /// description:amount
    #[arg(long = "expense", value_parser = parse::expense)]
    pub expenses: Vec<Expense>,

    /// Free-text notes for the day
    #[arg(short, long)]
    pub notes: Option<String>,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Brief,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
