use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use hasi::{
    app::{App, Flow},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::Difficulty,
    runtime::{CrosstermEventSource, FixedTicker, HasiEvent, Runner},
    scene::Scene,
    session::Session,
    sources::{RngSource, SystemClock},
    ui, TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::Mutex,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// find the hidden hasi: click where it hides before you give up
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A hide and seek game for the terminal. A hasi hides somewhere in the forest; click on it with the mouse to win, or give up to see where it was."
)]
pub struct Cli {
    /// difficulty from 1 (largest hit area) to 5 (smallest); out of range values are clamped
    #[clap(short = 'd', long, allow_negative_numbers = true)]
    difficulty: Option<i64>,

    /// do not draw the faint marker over the hasi while searching
    #[clap(long)]
    no_hint: bool,

    /// seed for reproducible hiding places
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Command line values take precedence over the stored config
    fn apply(&self, cfg: &Config) -> Config {
        Config {
            difficulty: self
                .difficulty
                .map(|d| Difficulty::clamped(d).level())
                .unwrap_or(cfg.difficulty),
            hint: cfg.hint && !self.no_hint,
            seed: self.seed.or(cfg.seed),
        }
    }
}

fn new_session(settings: &Config) -> Session {
    let mut session = match settings.seed {
        Some(seed) => Session::new(SystemClock, RngSource::seeded(seed)),
        None => Session::new(SystemClock, RngSource::thread()),
    };
    session.set_difficulty(settings.difficulty as i64);
    session
}

/// Logs go to a file; the terminal belongs to the TUI.
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("HASI_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = FileConfigStore::new();
    let stored = store.load();
    let settings = cli.apply(&stored);
    let scenes = Scene::all()?;
    info!(difficulty = settings.difficulty, hint = settings.hint, seed = ?settings.seed, "starting");

    let mut app = App::new(new_session(&settings), scenes, settings.hint);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;

    let cfg = Config {
        difficulty: app.session.state().difficulty().level(),
        ..stored
    };
    if let Err(e) = store.save(&cfg) {
        warn!(path = %store.path().display(), error = %e, "could not save config");
    }

    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let event = runner.step();
        // Idle ticks only need a frame while the celebration plays
        let redraw = !matches!(event, HasiEvent::Tick) || app.is_animating();

        if app.handle_event(event) == Flow::Quit {
            break;
        }

        if redraw {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}
