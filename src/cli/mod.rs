pub mod prompt;
pub mod week;
pub mod when;

use std::{
    io::{IsTerminal, Read},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::info;

use crate::{
    ledger::{
        storage::{LedgerFileStorage, LedgerStorage},
        tracker::HabitTracker,
        HabitId,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, LogSettings},
    },
};

use prompt::confirm;
use week::render_week;
use when::{parse_day, DateStyle};

#[derive(Parser, Debug)]
#[command(name = "habitgrid", version, long_about = None)]
#[command(about = "Track daily habits over a rolling week", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/habitgrid or $HOME/.local/state/habitgrid"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to stderr")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Add a new habit")]
    Add {
        #[arg(required = true, num_args = 1.., help = "Name of the habit")]
        name: Vec<String>,
    },
    #[command(about = "Flip completion of a day. Defaults to today")]
    Toggle {
        #[arg(help = "Habit id or exact name")]
        habit: String,
        #[arg(
            long,
            short,
            help = "Day to flip. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\", \"2025-03-15\""
        )]
        date: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Mark today as completed")]
    Tick {
        #[arg(help = "Habit id or exact name")]
        habit: String,
    },
    #[command(about = "Delete a habit with all of its history")]
    Delete {
        #[arg(help = "Habit id or exact name")]
        habit: String,
        #[arg(long, short, help = "Don't ask for confirmation")]
        yes: bool,
    },
    #[command(about = "Show the last 7 days with current streaks")]
    Show {},
    #[command(about = "Write all habits as a JSON document")]
    Export {
        #[arg(long, short, help = "File to write into. Prints to stdout by default")]
        output: Option<PathBuf>,
    },
    #[command(about = "Replace all habits with the ones from an exported document")]
    Import {
        #[arg(help = "Exported document. Use - for stdin")]
        file: PathBuf,
        #[arg(long, short, help = "Don't ask for confirmation")]
        yes: bool,
    },
    #[command(about = "Delete every habit")]
    Reset {
        #[arg(long, short, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    enable_logging(&LogSettings::for_app_dir(&app_dir, args.log))?;

    let storage = LedgerFileStorage::new(app_dir)?;
    let mut tracker = HabitTracker::open(storage, Box::new(DefaultClock)).await;

    match args.commands.unwrap_or(Commands::Show {}) {
        Commands::Add { name } => {
            let name = name.join(" ");
            match tracker.add_habit(&name).await? {
                Some(id) => println!("Added {:?} as {id}", name.trim()),
                None => return Err(usage_error("Habit name can't be empty")),
            }
        }
        Commands::Toggle {
            habit,
            date,
            date_style,
        } => {
            let id = resolve(&tracker, &habit)?;
            let day = match date {
                Some(date) => parse_day(&date, Local::now(), date_style)
                    .map_err(|e| usage_error(e.to_string()))?,
                None => tracker.today(),
            };
            if let Some(completed) = tracker.toggle_completion(&id, day).await? {
                let state = if completed { "completed" } else { "not completed" };
                println!("{habit} is {state} on {day}");
            }
        }
        Commands::Tick { habit } => {
            let id = resolve(&tracker, &habit)?;
            tracker.tick_today(&id).await?;
        }
        Commands::Delete { habit, yes } => {
            let id = resolve(&tracker, &habit)?;
            if !yes && !confirm(&format!("Delete {habit:?} and its whole history?"))? {
                println!("Nothing deleted");
                return Ok(());
            }
            tracker.remove_habit(&id).await?;
        }
        Commands::Show {} => {}
        Commands::Export { output } => {
            let document = tracker.export_document()?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, document).await?;
                    info!("Exported into {path:?}");
                    println!("Exported {} habits into {}", tracker.ledger().len(), path.display());
                }
                None => println!("{document}"),
            }
            return Ok(());
        }
        Commands::Import { file, yes } => {
            let text = read_input(&file).await?;
            if !yes && !confirm("Replace all current habits with the imported ones?")? {
                println!("Nothing imported");
                return Ok(());
            }
            let count = tracker.import_document(&text).await?;
            println!("Imported {count} habits");
        }
        Commands::Reset { yes } => {
            if !yes && !confirm("Delete every habit and all history?")? {
                println!("Nothing reset");
                return Ok(());
            }
            tracker.reset().await?;
        }
    }

    print!(
        "{}",
        render_week(
            tracker.ledger(),
            tracker.today(),
            std::io::stdout().is_terminal()
        )
    );
    Ok(())
}

fn resolve<S: LedgerStorage>(
    tracker: &HabitTracker<S>,
    selector: &str,
) -> Result<HabitId> {
    tracker
        .ledger()
        .find(selector)
        .map(|habit| habit.id().clone())
        .ok_or_else(|| usage_error(format!("No habit with id or name {selector:?}")))
}

async fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        tokio::fs::read_to_string(file)
            .await
            .map_err(|e| anyhow!("Can't read {}: {e}", file.display()))
    }
}

fn usage_error(message: impl Into<String>) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message.into())
        .into()
}
