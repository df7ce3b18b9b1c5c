mod config;
mod error;
mod logging;
mod render;

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tzpro_core::{
    AddOutcome, ChronoTzDatabase, Clock, Dashboard, Registry, ResetOutcome, Resolver, Settings,
    SystemClock, REFRESH_INTERVAL,
};
use tzpro_rocks::RocksStore;

use crate::config::{load_config, resolve_store_path, resolve_timezone};
use crate::error::TzproError;

type App = Dashboard<RocksStore, ChronoTzDatabase, SystemClock>;

#[derive(Parser)]
#[command(name = "tzpro")]
#[command(about = "World clock for a chosen set of timezones", long_about = None)]
struct Cli {
    /// Path to the settings store
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Your own timezone (defaults to TZPRO_TIMEZONE, the config file, then the system zone)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current time panel and every displayed timezone
    Show,
    /// Add a timezone to the dashboard
    Add { timezone: String },
    /// Remove a timezone from the dashboard
    Remove { timezone: String },
    /// Set the display order
    Reorder {
        #[arg(required = true)]
        timezones: Vec<String>,
    },
    /// Pin the dashboard to a date and time in your own timezone
    SetTime {
        /// YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// HH:MM (defaults to 00:00)
        #[arg(long)]
        time: Option<String>,
    },
    /// Freeze at the current time, or return to live time
    Toggle,
    /// Return to live time
    Live,
    /// Export displayed timezones as CSV
    ExportCsv {
        /// Output file (prints to stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a shareable summary
    Share,
    /// List every known timezone, west to east
    Catalog,
    /// Save the current timezones as your default
    SaveDefault,
    /// Reset to your saved default
    Reset {
        /// Ignore the saved default and restore the built-in list
        #[arg(long)]
        builtin: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Collapse or expand the navigation panel
    Nav { state: NavState },
    /// Keep refreshing the dashboard every second
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum NavState {
    Collapse,
    Expand,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = load_config();
    let store_path = resolve_store_path(cli.store, &config);
    let ambient = resolve_timezone(cli.timezone, &config);
    tracing::debug!(store = %store_path.display(), %ambient, "starting");

    let store = RocksStore::open(&store_path)?;
    let mut app = Dashboard::new(
        Registry::load(Settings::new(store), ambient),
        Resolver::new(ChronoTzDatabase::new()),
        SystemClock::new(),
    );

    run(&mut app, cli.command.unwrap_or(Command::Show))?;
    Ok(())
}

fn run(app: &mut App, command: Command) -> Result<(), TzproError> {
    match command {
        Command::Show => show(app),
        Command::Add { timezone } => {
            let now = app.clock().now();
            if app.resolver().utc_offset(&timezone, now).is_err() {
                return Err(TzproError::UnknownTimezone(timezone));
            }
            match app.registry_mut().add_timezone(timezone.as_str()) {
                AddOutcome::Added => println!("Added {}", timezone),
                AddOutcome::AlreadyPresent => println!("{} is already displayed", timezone),
            }
        }
        Command::Remove { timezone } => {
            if !app.registry_mut().remove_timezone(&timezone) {
                return Err(TzproError::NotDisplayed(timezone));
            }
            println!("Removed {}", timezone);
        }
        Command::Reorder { timezones } => {
            if let Some(stranger) = timezones.iter().find(|tz| !app.registry().contains(tz)) {
                return Err(TzproError::NotDisplayed(stranger.clone()));
            }
            let registry = app.registry_mut();
            let mut order = timezones;
            // Zones left out keep their relative order after the given ones.
            let rest: Vec<_> = registry
                .order()
                .iter()
                .filter(|tz| !order.contains(tz))
                .cloned()
                .collect();
            order.extend(rest);
            let mut seen = HashSet::new();
            order.retain(|tz| seen.insert(tz.clone()));
            registry.reorder(order);
            show(app);
        }
        Command::SetTime { date, time } => {
            if let Some(date) = date {
                app.registry_mut().stage_date_edit(date);
            }
            if let Some(time) = time {
                app.registry_mut().stage_time_edit(time);
            }
            match app.commit_pending_edit()? {
                Some(_) => show(app),
                None => println!("Nothing to set: pass --date and/or --time"),
            }
        }
        Command::Toggle => {
            app.toggle_custom_instant();
            show(app);
        }
        Command::Live => {
            app.registry_mut().clear_custom_instant();
            show(app);
        }
        Command::ExportCsv { out } => {
            let csv = app.export_csv();
            match out {
                Some(path) => {
                    std::fs::write(&path, csv.content)?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", csv.content),
            }
        }
        Command::Share => println!("{}", app.share_text()),
        Command::Catalog => {
            for entry in app.catalog() {
                println!("{}", render::catalog_line(&entry));
            }
        }
        Command::SaveDefault => {
            let settings = app.registry().settings();
            let expanded = !settings.nav_collapsed();
            app.registry().save_current_as_user_default(expanded)?;
            println!("Saved current timezones as your default");
        }
        Command::Reset { builtin, yes } => {
            let prompt = if builtin {
                "Reset to the built-in timezones? This clears your saved default."
            } else {
                "Reset to your saved default?"
            };
            if !yes && !confirm(prompt)? {
                println!("Cancelled");
                return Ok(());
            }
            if builtin {
                app.registry_mut().reset_to_builtin_defaults();
                println!("Restored built-in timezones");
            } else {
                match app.registry_mut().reset_to_user_default() {
                    ResetOutcome::UserDefault => println!("Restored your default"),
                    ResetOutcome::Builtin => {
                        println!("No saved default; restored built-in timezones")
                    }
                }
            }
        }
        Command::Nav { state } => {
            let collapsed = matches!(state, NavState::Collapse);
            app.registry().settings().set_nav_collapsed(collapsed)?;
        }
        Command::Watch => watch(app, &mut std::io::stdout().lock())?,
    }
    Ok(())
}

fn show(app: &App) {
    println!("{}\n", app.location_label());
    print!("{}", render::refresh(&app.refresh()));
    if let Some((date, time)) = app.custom_inputs() {
        println!("\nPinned to {} {} (run `tzpro live` to resume)", date, time);
    }
}

/// Redraws until interrupted or until stdout goes away.
fn watch(app: &App, out: &mut impl Write) -> Result<(), TzproError> {
    match draw_loop(app, out) {
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => {
            tracing::debug!("output closed, stopping watch");
            Ok(())
        }
        result => Ok(result?),
    }
}

fn draw_loop(app: &App, out: &mut impl Write) -> std::io::Result<()> {
    if !app.is_ticking() {
        write!(out, "{}", render::refresh(&app.refresh()))?;
        tracing::info!("custom time set, not refreshing");
        return out.flush();
    }
    loop {
        if let Some(refresh) = app.tick() {
            // Clear screen and home cursor.
            write!(out, "\x1b[2J\x1b[H{}", render::refresh(&refresh))?;
            out.flush()?;
        }
        std::thread::sleep(REFRESH_INTERVAL);
    }
}

fn confirm(prompt: &str) -> Result<bool, TzproError> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
