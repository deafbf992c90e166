/// Command line front end for the habit tracker
///
/// This file sets up logging, parses command line arguments, restores the
/// saved habits and runs a single command against them.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use habit_tracker::commands::{
    self, CreateHabitParams, ListHabitsParams, UpdateHabitParams,
};
use habit_tracker::{CustomSchedule, HabitTracker, TrackerConfig, DEFAULT_STORAGE_KEY};

/// File holding the key-value slots
const DATABASE_FILE: &str = "habit-store.db";

/// Directory for the key-value database
const APP_DIR: &str = "habit_tracker";

/// Whether `dir` exists (or can be created) and accepts new files
fn is_writable_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe_file = dir.join(".write_check");
    let writable = std::fs::write(&probe_file, b"").is_ok();
    let _ = std::fs::remove_file(&probe_file);
    writable
}

/// Pick where the key-value database lives when `--database` is not given
///
/// Platform data directory first, then the home directory, then the working
/// directory. Falls back to the temp directory, where habits will not
/// survive a reboot.
fn default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let candidates = [
        dirs::data_local_dir().map(|p| p.join(APP_DIR)),
        dirs::home_dir().map(|p| p.join(format!(".{}", APP_DIR))),
        std::env::current_dir().ok().map(|p| p.join(format!(".{}", APP_DIR))),
    ];

    if let Some(dir) = candidates.into_iter().flatten().find(|dir| is_writable_dir(dir)) {
        return Ok(dir.join(DATABASE_FILE));
    }

    let temp_dir = std::env::temp_dir().join(APP_DIR);
    std::fs::create_dir_all(&temp_dir)?;
    let path = temp_dir.join(DATABASE_FILE);
    tracing::warn!(
        "No writable data directory found; saving habits to {}",
        path.display()
    );
    Ok(path)
}

/// How every-N-days habits count their days
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScheduleArg {
    /// N days after the last completion
    SinceLastCompletion,
    /// Every Nth day from creation
    SinceCreation,
}

impl From<ScheduleArg> for CustomSchedule {
    fn from(value: ScheduleArg) -> Self {
        match value {
            ScheduleArg::SinceLastCompletion => CustomSchedule::SinceLastCompletion,
            ScheduleArg::SinceCreation => CustomSchedule::SinceCreation,
        }
    }
}

/// Command line arguments for the habit tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses habit-store.db in the platform data directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// How every-N-days habits are scheduled
    #[arg(long, value_enum, default_value = "since-last-completion", global = true)]
    schedule: ScheduleArg,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a habit
    Add {
        title: String,
        /// Category id, e.g. mental, physical, spiritual, accountability
        #[arg(short, long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
        /// daily, weekdays, weekends, weekly:1,3,5 or every:N
        #[arg(short, long)]
        frequency: Option<String>,
    },
    /// Change fields of a habit
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Pass an empty string to clear
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Mark a habit done, or undo it
    Toggle { id: String },
    /// Delete a habit
    Delete { id: String },
    /// List habits
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show the habits due today
    Today,
    /// Show completion progress per category
    Progress,
    /// Delete every habit
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_tracker={}", log_level))
        .with_writer(std::io::stderr) // Keep stdout for command output
        .init();

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let config = TrackerConfig {
        storage_key: DEFAULT_STORAGE_KEY.to_string(),
        custom_schedule: args.schedule.into(),
    };
    let mut tracker = HabitTracker::open(db_path, config).await?;
    tracker.hydrate().await;

    let store = tracker.store_mut();
    let message = match args.command {
        Command::Add { title, category, description, frequency } => {
            let params = CreateHabitParams { title, description, category, frequency };
            commands::create_habit(store, params)?.message
        }
        Command::Update { id, title, description, category, frequency } => {
            let params = UpdateHabitParams {
                habit_id: id,
                title,
                description,
                category,
                frequency,
            };
            commands::update_habit(store, params)?.message
        }
        Command::Toggle { id } => commands::toggle_habit(store, &id).message,
        Command::Delete { id } => commands::delete_habit(store, &id).message,
        Command::List { category } => {
            commands::list_habits(store, ListHabitsParams { category }).message
        }
        Command::Today => commands::habits_due_today(store).message,
        Command::Progress => commands::category_progress(store).message,
        Command::Clear => commands::clear_habits(store).message,
    };

    println!("{}", message);

    // Flush the snapshot written by this command before exiting
    tracker.shutdown().await?;
    Ok(())
}
