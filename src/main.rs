//! PlantCare — command-line host
//!
//! Wires the hexagonal core to real adapters and exposes it as a CLI.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SqliteStore    KvAdapter     LogNotifier        SystemClock   │
//! │  (StorePort)    (KvPort)      (NotificationPort) (ClockPort)   │
//! │  LogEventSink (EventSink)                                      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Repository · WateringScheduler · Settings             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Daemon loop: ScanCadence → periodic scan → deliver reminders  │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use log::{info, warn};

use plantcare::adapters::kv::KvAdapter;
use plantcare::adapters::log_sink::LogEventSink;
use plantcare::adapters::notifier::LogNotifier;
use plantcare::adapters::sqlite::SqliteStore;
use plantcare::adapters::time::{FixedClock, SystemClock};
use plantcare::app::commands::AppCommand;
use plantcare::app::ports::ClockPort;
use plantcare::app::service::{AppService, CommandReply, MutationOutcome, ReminderStatus};
use plantcare::config::AppConfig;
use plantcare::model::{PlantDraft, PlantId, format_date, parse_date};
use plantcare::repository::PlantRepository;
use plantcare::scheduler::{DueStatus, ScanCadence, ScanOutcome, next_watering_date};
use plantcare::settings::{SettingKey, SettingsStore};

// ── CLI definition ────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "plantcare", version, about = "Track plants and their watering schedule")]
struct Cli {
    /// JSON configuration file (defaults apply when missing)
    #[arg(short, long, default_value = "plantcare.json")]
    config: PathBuf,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List plants, soonest watering first
    List,
    /// Show one plant
    Show { id: i64 },
    /// Add a plant
    Add(PlantArgs),
    /// Replace every field of a plant
    Update {
        id: i64,
        #[command(flatten)]
        plant: PlantArgs,
    },
    /// Record that a plant was watered today
    Water { id: i64 },
    /// Delete a plant
    Delete { id: i64 },
    /// Run the periodic due-plant scan once
    Scan,
    /// Keep running and scan on the configured cadence
    Daemon,
    /// Read or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(clap::Args, Debug)]
struct PlantArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    location: String,
    /// Days between waterings
    #[arg(long)]
    interval: i64,
    /// Date last watered (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_cli_date)]
    last_watered: Option<NaiveDate>,
    #[arg(long)]
    image: Option<String>,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print all settings
    Get,
    /// Set one setting (darkMode | notifications)
    Set {
        key: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

// ── Clock selection ───────────────────────────────────────────

/// `--today` pins the clock; otherwise the wall clock is used.
enum HostClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl ClockPort for HostClock {
    fn now(&self) -> NaiveDateTime {
        match self {
            Self::System(c) => c.now(),
            Self::Fixed(c) => c.now(),
        }
    }
}

type Service = AppService<SqliteStore, KvAdapter, LogNotifier, HostClock>;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path.display()))?;
    let repo = PlantRepository::open(store).context("initialising plant table")?;

    let kv = match KvAdapter::open(&config.settings_path) {
        Ok(kv) => kv,
        Err(e) => {
            warn!("Settings file unusable ({}), running with defaults in memory", e);
            KvAdapter::in_memory()
        }
    };
    let settings = SettingsStore::load(kv);

    let clock = match cli.today {
        Some(date) => HostClock::Fixed(FixedClock::on(date)),
        None => HostClock::System(SystemClock),
    };

    let mut app: Service = AppService::new(&config, repo, settings, LogNotifier::new(), clock);
    let mut sink = LogEventSink::new();

    match cli.command {
        Command::List => print_list(&app),
        Command::Show { id } => {
            let id = PlantId(id);
            let Some(plant) = app.get(id) else {
                bail!("plant {} not found", id);
            };
            let due = DueStatus::for_plant(&plant, app.today());
            println!("{}", serde_json::to_string_pretty(&plant)?);
            println!("next watering: {} ({})", format_date(next_watering_date(&plant)), due);
        }
        Command::Add(args) => {
            let draft = args.into_draft(app.today());
            let reply = app.handle_command(AppCommand::AddPlant(draft), &mut sink)?;
            print_reply(&reply);
        }
        Command::Update { id, plant } => {
            let draft = plant.into_draft(app.today());
            let reply = app.handle_command(AppCommand::UpdatePlant { id: PlantId(id), draft }, &mut sink)?;
            print_reply(&reply);
        }
        Command::Water { id } => {
            let reply = app.handle_command(AppCommand::WaterPlant(PlantId(id)), &mut sink)?;
            print_reply(&reply);
        }
        Command::Delete { id } => {
            let reply = app.handle_command(AppCommand::DeletePlant(PlantId(id)), &mut sink)?;
            print_reply(&reply);
        }
        Command::Scan => {
            let reply = app.handle_command(AppCommand::RunScan, &mut sink)?;
            print_reply(&reply);
            if let CommandReply::Scan(report) = &reply {
                if report.outcome() == ScanOutcome::Failed {
                    bail!("scan failed");
                }
            }
        }
        Command::Daemon => run_daemon(&mut app, &config, &mut sink),
        Command::Settings { action } => match action {
            SettingsAction::Get => {
                for (key, value) in app.settings().as_map() {
                    println!("{key} = {value}");
                }
            }
            SettingsAction::Set { key, value } => {
                let key: SettingKey = key.parse()?;
                let reply = app.handle_command(AppCommand::SetSetting { key, value }, &mut sink)?;
                print_reply(&reply);
            }
        },
    }
    Ok(())
}

impl PlantArgs {
    fn into_draft(self, today: NaiveDate) -> PlantDraft {
        let mut draft = PlantDraft::new(self.name, self.interval, self.last_watered.unwrap_or(today))
            .location(self.location);
        if let Some(uri) = self.image {
            draft = draft.image_uri(uri);
        }
        draft
    }
}

// ── Daemon loop ───────────────────────────────────────────────

fn run_daemon(app: &mut Service, config: &AppConfig, sink: &mut LogEventSink) -> ! {
    info!(
        "Daemon started: scan every {}s, poll every {}s",
        config.scan_interval_secs, config.daemon_poll_secs
    );
    let mut cadence = ScanCadence::new(config.scan_interval_secs);
    let poll = Duration::from_secs(u64::from(config.daemon_poll_secs));

    // Reminders scheduled by earlier CLI invocations died with them.
    if app.settings().notifications {
        app.reschedule_all(sink);
    }

    loop {
        let now = app.now();
        if cadence.should_run(now) {
            let report = app.run_periodic_scan(sink);
            if let Some(e) = &report.aborted {
                warn!("Scan aborted: {}", e);
            }
            for failure in &report.failures {
                match failure.plant_id {
                    Some(id) => warn!("Scan failure on plant {}: {}", id, failure.error),
                    None => warn!("Scan failure on unreadable row: {}", failure.error),
                }
            }
            cadence.mark_ran(now);
        }
        let delivered = app.notifier_mut().deliver_due(now);
        if delivered > 0 {
            info!("Delivered {} timed reminder(s)", delivered);
        }
        std::thread::sleep(poll);
    }
}

// ── Output ────────────────────────────────────────────────────

fn print_list(app: &Service) {
    let views = app.list_by_due();
    if views.is_empty() {
        println!("No plants yet.");
        return;
    }
    for view in views {
        let p = &view.plant;
        println!(
            "{:>4}  {:<20} {:<16} every {:>3}d  next {}  ({})",
            p.id,
            p.name,
            p.location,
            p.watering_interval,
            format_date(view.next_watering),
            view.due
        );
    }
}

fn print_reply(reply: &CommandReply) {
    match reply {
        CommandReply::Plant(MutationOutcome { plant, reminder }) => {
            println!(
                "{} '{}' next watering {}",
                plant.id,
                plant.name,
                format_date(next_watering_date(plant))
            );
            match reminder {
                ReminderStatus::Scheduled(handle) => println!("reminder scheduled ({})", handle.0),
                ReminderStatus::Disabled => println!("reminders disabled"),
                ReminderStatus::AlreadyNotified => println!("already reminded today"),
                ReminderStatus::Failed(e) => println!("reminder not scheduled: {}", e),
            }
        }
        CommandReply::Deleted(id) => println!("deleted {}", id),
        CommandReply::Scan(report) => {
            let s = report.summary();
            println!(
                "scan {}: examined {}, reminded {}, already notified {}, failed {} ({:?})",
                format_date(s.date),
                s.examined,
                s.reminded,
                s.already_notified,
                s.failed,
                report.outcome()
            );
        }
        CommandReply::Setting { key, value, changed } => {
            if *changed {
                println!("{key} = {value}");
            } else {
                println!("{key} already {value}");
            }
        }
    }
}
