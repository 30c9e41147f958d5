use roundbell::{
    app_dirs::AppDirs,
    calories::MetCalorieEstimator,
    config::{Config, ConfigStore, FileConfigStore},
    controller::{Collaborators, PlaybackController},
    custom::{CustomWorkoutStore, FileCustomWorkoutStore},
    feedback::TerminalFeedback,
    library::WorkoutCatalog,
    logging,
    progress::ProgressDb,
    runtime::{CoachEvent, CrosstermEventSource, IntervalTicker, Runner},
    util::pluralize,
    workout::Level,
};

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};
use time_humanize::{Accuracy, HumanTime, Tense};
use tracing::{debug, warn};

const FRAME_RATE_MS: u64 = 100;
const HISTORY_LEN: usize = 10;

/// timed boxing rounds in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Plays boxing workouts round by round: a 3-2-1 countdown, timed rounds with coaching calls, rest periods between rounds and a progress log of every finished session."
)]
pub struct Cli {
    /// workout to play (see --list)
    workout: Option<String>,

    /// level for generated workouts
    #[clap(short = 'l', long, value_enum)]
    level: Option<Level>,

    /// list every workout id and exit
    #[clap(long)]
    list: bool,

    /// show recent sessions, totals and streak, then exit
    #[clap(long)]
    history: bool,

    /// write all recorded sessions to a CSV file and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// seed for generated rounds, for repeatable workouts
    #[clap(long)]
    seed: Option<u64>,

    /// don't play instruction audio cues
    #[clap(long)]
    no_sound: bool,

    /// don't ring the bell on round changes
    #[clap(long)]
    no_haptics: bool,

    /// body weight in kg, used for calorie estimates
    #[clap(short = 'w', long)]
    weight: Option<f64>,

    /// log filter, e.g. `debug` or `roundbell=trace`
    #[clap(long)]
    log_level: Option<String>,

    /// persist the given options as new defaults
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Layer command-line options over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if self.level.is_some() {
            config.level = self.level;
        }
        if let Some(weight) = self.weight {
            config.body_weight_kg = weight;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if self.no_sound {
            config.sound = false;
        }
        if self.no_haptics {
            config.haptics = false;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save {
        config_store.save(&config)?;
        println!("saved defaults to {}", config_store.path().display());
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&config.log_level, &path) {
            eprintln!("warning: logging disabled: {e}");
        }
    }

    let custom = FileCustomWorkoutStore::new().load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring custom workouts");
        eprintln!("warning: ignoring custom workouts: {e}");
        Vec::new()
    });
    let mut catalog = WorkoutCatalog::builtin(config.seed)?.with_level(config.level);

    if cli.list {
        print_list(&catalog, &custom, &mut io::stdout())?;
        return Ok(());
    }
    if cli.history {
        print_history(&ProgressDb::new()?, &mut io::stdout())?;
        return Ok(());
    }
    if let Some(path) = &cli.export {
        let count = ProgressDb::new()?.export_csv(File::create(path)?)?;
        println!("exported {} to {}", pluralize(count as u32, "session"), path.display());
        return Ok(());
    }

    let Some(workout_id) = cli.workout.as_deref() else {
        if cli.save {
            return Ok(());
        }
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "a workout id is required (see --list)",
        )
        .exit();
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut controller = PlaybackController::load(
        workout_id,
        &mut catalog,
        Some(custom.as_slice()),
        Collaborators {
            ticker: Box::new(IntervalTicker::every_second()),
            feedback: Box::new(TerminalFeedback::stdout(config.sound, config.haptics)),
            progress: Box::new(ProgressDb::new()?),
            calories: Box::new(MetCalorieEstimator::new(config.body_weight_kg)),
        },
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut controller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    if let Some(record) = controller.completion() {
        println!(
            "{}: {}, {} kcal, {}",
            record.workout_id,
            pluralize(record.total_minutes, "minute"),
            record.calories_burned,
            pluralize(record.rounds_completed, "round")
        );
    }

    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut PlaybackController,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(FRAME_RATE_MS),
    );

    if let Err(e) = controller.start() {
        debug!(error = %e, "not starting playback");
    }

    loop {
        terminal.draw(|f| ui(controller, f))?;

        match runner.step() {
            CoachEvent::Frame => {
                controller.pump();
            }
            CoachEvent::Resize => {}
            CoachEvent::Key(key) => {
                if controller.handle_key(key) {
                    break;
                }
            }
        }
    }

    controller.exit();
    Ok(())
}

fn ui(controller: &PlaybackController, f: &mut Frame) {
    f.render_widget(&controller.view(), f.area());
}

fn print_list<R: rand::Rng, W: Write>(
    catalog: &WorkoutCatalog<R>,
    custom: &[roundbell::custom::CustomWorkout],
    out: &mut W,
) -> io::Result<()> {
    for entry in catalog.entries(custom) {
        writeln!(
            out,
            "{:<24} {:<28} {:<12} {:>2} rounds  ({})",
            entry.id, entry.title, entry.level, entry.rounds, entry.source
        )?;
    }
    Ok(())
}

fn print_history<W: Write>(db: &ProgressDb, out: &mut W) -> Result<(), Box<dyn Error>> {
    let summary = db.summary()?;
    let streak = db.streak_days(Local::now().date_naive())?;
    writeln!(
        out,
        "{} | {} | {} kcal | {} | streak: {}",
        pluralize(summary.workouts, "workout"),
        pluralize(summary.minutes, "minute"),
        summary.calories,
        pluralize(summary.rounds, "round"),
        pluralize(streak, "day")
    )?;

    let now = Local::now();
    for record in db.recent(HISTORY_LEN)? {
        let ago = (now - record.completed_at).to_std().unwrap_or_default();
        writeln!(
            out,
            "  {:<16} {:<24} {:>3} min {:>5} kcal {:>2} rounds",
            HumanTime::from(ago).to_text_en(Accuracy::Rough, Tense::Past),
            record.workout_id,
            record.total_minutes,
            record.calories_burned,
            record.rounds_completed
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use rand::{rngs::StdRng, SeedableRng};
    use roundbell::progress::CompletionRecord;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["roundbell"]);
        assert_eq!(cli.workout, None);
        assert_eq!(cli.level, None);
        assert!(!cli.list);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "roundbell",
            "classic-six",
            "--level",
            "advanced",
            "-w",
            "80",
            "--seed",
            "4",
            "--no-sound",
        ]);
        assert_eq!(cli.workout.as_deref(), Some("classic-six"));
        let cfg = cli.apply(Config::default());
        assert_eq!(cfg.level, Some(Level::Advanced));
        assert_eq!(cfg.body_weight_kg, 80.0);
        assert_eq!(cfg.seed, Some(4));
        assert!(!cfg.sound);
        assert!(cfg.haptics);
    }

    #[test]
    fn test_list_output() {
        let catalog = WorkoutCatalog::builtin_with_rng(StdRng::seed_from_u64(1)).unwrap();
        let mut out = Vec::new();
        print_list(&catalog, &[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("jab-cross-fundamentals"));
        assert!(text.contains("(generated)"));
    }

    #[test]
    fn test_history_output() {
        let db = ProgressDb::open_in_memory().unwrap();
        db.record(&CompletionRecord {
            workout_id: "classic-six".into(),
            total_minutes: 24,
            calories_burned: 230,
            rounds_completed: 6,
            completed_at: Local::now() - ChronoDuration::hours(2),
        })
        .unwrap();
        let mut out = Vec::new();
        print_history(&db, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("1 workout | 24 minutes | 230 kcal | 6 rounds | streak: 1 day"));
        assert!(text.contains("classic-six"));
    }
}
