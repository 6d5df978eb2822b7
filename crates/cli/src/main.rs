//! # Headroom
//!
//! Headless command layer over JSON building models.
//!
//! ## Usage
//!
//! ```bash
//! # Clear height for every placed room
//! headroom clearance model.json --config headroom.toml
//!
//! # Same run, nothing kept
//! headroom clearance model.json --dry-run
//!
//! # Provision the door attributes, then fill them
//! headroom schema model.json --category doors
//! headroom doors update model.json
//! headroom doors update model.json --selected 40,41
//!
//! # Door number options and automatic updates
//! headroom doors configure --extra-attribute Mark --separator /
//! headroom doors preview model.json
//! headroom updater toggle
//!
//! # Apply edits with the door updater in the loop
//! headroom apply model.json changes.json
//! ```
//!
//! Exit status is 0 for success, 1 for failure and 2 for a cancelled command.
//! Reports go to stdout, logs to stderr.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use headroom_model::{Category, ElementId};
use headroom_propagation::OptionsStore;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::{OptionsChange, Report};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "headroom")]
#[command(about = "Room clearance and door attribute propagation for building models")]
#[command(version)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Door options file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "HEADROOM_OPTIONS")]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate room clearance heights
    Clearance {
        model: PathBuf,
        /// Configuration file (defaults to ./headroom.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Run everything, then roll back and leave the file untouched
        #[arg(long)]
        dry_run: bool,
    },
    /// Add missing attributes required by a command
    Schema {
        model: PathBuf,
        /// rooms or doors
        #[arg(long)]
        category: Category,
        /// Attribute definition file (defaults to the built-in definitions)
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Door attribute propagation
    Doors {
        #[command(subcommand)]
        command: DoorsCommand,
    },
    /// Automatic door updates
    Updater {
        #[command(subcommand)]
        command: UpdaterCommand,
    },
    /// Apply a JSON change set, running registered updaters
    Apply { model: PathBuf, changes: PathBuf },
}

#[derive(Subcommand, Debug)]
enum DoorsCommand {
    /// Update all doors, or only the selected ones
    Update {
        model: PathBuf,
        /// Element ids, comma separated
        #[arg(long, value_delimiter = ',')]
        selected: Vec<u64>,
    },
    /// Change the stored door number options
    Configure {
        #[arg(long)]
        extra_attribute: Option<String>,
        #[arg(long)]
        separator: Option<String>,
        #[arg(long)]
        number_attribute: Option<String>,
        #[arg(long)]
        auto_update: Option<bool>,
        /// Renumber all doors of this model with the new options
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Show the number the first door would get
    Preview { model: PathBuf },
}

#[derive(Subcommand, Debug)]
enum UpdaterCommand {
    /// Switch automatic door updates on or off
    Toggle,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(?args, "Starting");

    match dispatch(args) {
        Ok(report) => {
            println!("{}", report.message);
            ExitCode::from(report.code as u8)
        }
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(args: Args) -> anyhow::Result<Report> {
    let options = args.options;
    run_command(args.command, move || match options {
        Some(path) => Ok(OptionsStore::new(path)),
        None => Ok(OptionsStore::user()?),
    })
}

/// Run one subcommand. `store` is resolved only by commands that read or
/// write door options.
fn run_command(command: Command, store: impl FnOnce() -> anyhow::Result<OptionsStore>) -> anyhow::Result<Report> {
    match command {
        Command::Clearance { model, config, dry_run } => commands::clearance(&model, config.as_deref(), dry_run),
        Command::Schema { model, category, schema } => commands::schema(&model, category, schema.as_deref()),
        Command::Doors { command } => match command {
            DoorsCommand::Update { model, selected } => {
                let selected: Vec<ElementId> = selected.into_iter().map(ElementId).collect();
                commands::doors_update(&model, &selected, &store()?)
            }
            DoorsCommand::Configure {
                extra_attribute,
                separator,
                number_attribute,
                auto_update,
                model,
            } => {
                let change = OptionsChange {
                    extra_attribute,
                    separator,
                    number_attribute,
                    auto_update,
                };
                commands::doors_configure(change, model.as_deref(), &store()?)
            }
            DoorsCommand::Preview { model } => commands::doors_preview(&model, &store()?),
        },
        Command::Updater {
            command: UpdaterCommand::Toggle,
        } => commands::updater_toggle(&store()?),
        Command::Apply { model, changes } => commands::apply(&model, &changes, &store()?),
    }
}
