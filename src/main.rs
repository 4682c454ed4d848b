use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tourguide::config::Settings;
use tourguide::logging;
use tourguide::page::{Page, SharedWriter};
use tourguide::store::Persistence;
use tourguide::tour::{Configuration, Tour, TourStatus, CURRENT_STEP_KEY, END_KEY};

mod terminal;

use terminal::{TerminalGuard, TourInput};

#[derive(Parser)]
#[command(name = "tourguide")]
#[command(about = "Walk through guided tours with resumable progress")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Options selecting which persisted tour to act on
#[derive(clap::Args)]
struct TourArgs {
    /// Tour name (default from config: "tour")
    #[arg(short, long)]
    name: Option<String>,

    /// Where tour state is persisted: Cookie, LocalStorage or Memory
    #[arg(short, long)]
    persistence: Option<Persistence>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the tour described by a page file
    Run {
        /// Page description (TOML)
        page: PathBuf,

        #[command(flatten)]
        tour: TourArgs,

        /// Show the tour even if it already ended
        #[arg(short, long)]
        force: bool,

        /// Forget previous progress and start from the first step
        #[arg(long)]
        restart: bool,
    },

    /// Show persisted progress for a tour
    State {
        #[command(flatten)]
        tour: TourArgs,
    },

    /// Clear persisted progress for a tour
    Reset {
        #[command(flatten)]
        tour: TourArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;

    // A running tour owns the terminal, so its logs go to a file
    let interactive = matches!(cli.command, Commands::Run { .. });
    let logging_handle = logging::init_logging(&settings, interactive, cli.debug)?;

    match cli.command {
        Commands::Run {
            page,
            tour,
            force,
            restart,
        } => {
            cmd_run(&settings, &page, &tour, force, restart)?;
        }
        Commands::State { tour } => {
            cmd_state(&settings, &tour);
        }
        Commands::Reset { tour } => {
            cmd_reset(&settings, &tour);
        }
    }

    if let Some(log_path) = logging_handle.log_file_path {
        if log_path.metadata().map(|m| m.len() > 0).unwrap_or(false) {
            eprintln!("Session log: {}", log_path.display());
        }
    }

    Ok(())
}

fn configuration(settings: &Settings, args: &TourArgs) -> Configuration {
    let mut config = Configuration::from(settings);
    if let Some(name) = &args.name {
        config.name.clone_from(name);
    }
    if let Some(persistence) = args.persistence {
        config.persistence = persistence;
    }
    config
}

fn cmd_run(
    settings: &Settings,
    page_path: &Path,
    args: &TourArgs,
    force: bool,
    restart: bool,
) -> Result<()> {
    let out: SharedWriter = Arc::new(Mutex::new(Box::new(io::stdout())));
    let page = Arc::new(
        Page::load(page_path, out)
            .with_context(|| format!("Failed to load page {}", page_path.display()))?,
    );

    let mut tour = Tour::new(configuration(settings, args))
        .with_document(page.clone())
        .with_navigator(page.clone());
    for step in page.steps() {
        tour.add_step(step);
    }

    if tour.ended() && !force && !restart {
        println!(
            "Tour '{}' already ended. Use --force to show it again or --restart to start over.",
            tour.name()
        );
        return Ok(());
    }

    let _guard = TerminalGuard::new()?;

    if restart {
        tour.restart();
    } else {
        tour.start(force);
    }

    loop {
        // Navigation loads another page; the tour resumes there
        if let Some(path) = page.take_navigation() {
            tracing::info!(path = %path, "Page changed");
            tour.start(force);
            continue;
        }

        if !matches!(tour.status(), TourStatus::Showing(_)) {
            break;
        }

        if let Event::Key(key) = event::read()? {
            match TourInput::from_key(key) {
                TourInput::Quit => break,
                TourInput::Next => tour.next(),
                TourInput::Prev => tour.prev(),
                TourInput::Key(code) => {
                    tour.handle_key(code);
                }
                TourInput::Ignore => {}
            }
        }
    }

    Ok(())
}

fn cmd_state(settings: &Settings, args: &TourArgs) {
    let config = configuration(settings, args);
    let persistence = config.persistence;
    let tour = Tour::new(config);

    println!("Tour '{}' ({persistence})", tour.name());
    println!("{}", "─".repeat(40));
    println!(
        "current step: {}",
        tour.get_state(CURRENT_STEP_KEY)
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "ended:        {}",
        if tour.ended() { "yes" } else { "no" }
    );
    if !persistence.is_durable() {
        println!("(Memory state does not outlive a single run)");
    }
}

fn cmd_reset(settings: &Settings, args: &TourArgs) {
    let tour = Tour::new(configuration(settings, args));
    tour.set_state(CURRENT_STEP_KEY, None);
    tour.set_state(END_KEY, None);
    println!("Cleared progress for tour '{}'", tour.name());
}
