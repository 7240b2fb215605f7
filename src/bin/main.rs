use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use clap::Parser;
use embassy_executor::Spawner;
use embassy_time::{Duration, Instant, Timer};
use log::{info, warn};
use owo_colors::OwoColorize;
use pacer_core::{
    engine::{EngineError, Phase, ReaderConfig, Step},
    input::{ControlEvent, ControlProvider, SpeedInputError, coerce_wpm},
    persist::SessionStore,
    render::PresentationMode,
    scheduler::DeadlineScheduler,
    session::{self, SessionError},
};

use file_store::{FileStore, FileStoreError};
use stdin_controls::{ControlsClosed, StdinControls};
use terminal::TerminalSurface;

#[path = "main/file_store.rs"]
mod file_store;
#[path = "main/stdin_controls.rs"]
mod stdin_controls;
#[path = "main/terminal.rs"]
mod terminal;

const REPORT_INTERVAL_SECS: u64 = 5;

/// Read text one word at a time at a fixed pace.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Text file to import. Without it the stored session is resumed.
    file: Option<PathBuf>,

    /// Reading speed in words per minute.
    #[arg(short, long)]
    wpm: Option<String>,

    /// How each word is emphasised.
    #[arg(short, long, default_value_t = PresentationMode::Pivot)]
    mode: PresentationMode,

    /// Session file holding the text and chapters. The reading position is
    /// kept beside it with a `.progress` extension.
    #[arg(long, default_value = ".pacer-session.json")]
    store: PathBuf,
}

#[derive(Debug)]
enum RunError {
    Read { path: PathBuf, err: io::Error },
    Store(FileStoreError),
    Speed(SpeedInputError),
    Session(SessionError<FileStoreError>),
    Controls(io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, err } => write!(f, "cannot read {}: {}", path.display(), err),
            Self::Store(err) => fmt::Display::fmt(err, f),
            Self::Speed(err) => write!(f, "--wpm: {}", err),
            Self::Session(err) => fmt::Display::fmt(err, f),
            Self::Controls(err) => write!(f, "cannot listen for controls: {}", err),
        }
    }
}

impl std::error::Error for RunError {}

impl From<FileStoreError> for RunError {
    fn from(err: FileStoreError) -> Self {
        Self::Store(err)
    }
}

impl From<SessionError<FileStoreError>> for RunError {
    fn from(err: SessionError<FileStoreError>) -> Self {
        Self::Session(err)
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn config_from(cli: &Cli) -> Result<ReaderConfig, RunError> {
    let mut config = ReaderConfig {
        mode: cli.mode,
        ..ReaderConfig::default()
    };
    if let Some(raw) = cli.wpm.as_deref() {
        config.wpm = coerce_wpm(raw, &config).map_err(RunError::Speed)?;
    }
    Ok(config)
}

fn open_store(cli: &Cli) -> Result<SessionStore<FileStore>, RunError> {
    let mut store = SessionStore::new(FileStore::open(&cli.store)?);

    if let Some(path) = cli.file.as_deref() {
        let raw = read_text(path)?;
        let summary = session::import_text(&mut store, &raw)?;
        info!(
            "import: {} words={} chapters={}",
            path.display(),
            summary.words,
            summary.chapters
        );
    }

    Ok(store)
}

fn read_text(path: &Path) -> Result<String, RunError> {
    fs::read_to_string(path).map_err(|err| RunError::Read {
        path: path.to_path_buf(),
        err,
    })
}

fn report(result: Result<Step, EngineError>, surface: &mut TerminalSurface<io::Stdout>) {
    match result {
        Ok(Step::Paused) => surface.notice("paused"),
        Ok(_) => {}
        Err(err) => surface.notice(&format!("{} (paused)", err)),
    }
}

async fn run(cli: Cli) -> Result<(), RunError> {
    let config = config_from(&cli)?;
    let store = open_store(&cli)?;

    let clock = Instant::now();
    let scheduler = DeadlineScheduler::new(clock.elapsed().as_millis());
    let resumed = session::resume(store, scheduler, &config)?;
    let mut engine = resumed.engine;

    for chapter in &resumed.chapters {
        info!("chapter: line={} {:?}", chapter.line_index, chapter.title);
    }

    let mut surface = TerminalSurface::new(io::stdout(), config.mode);
    let mut controls = StdinControls::spawn(config).map_err(RunError::Controls)?;
    let mut controls_open = true;

    surface.notice(stdin_controls::HELP);
    if !resumed.chapters.is_empty() {
        surface.notice(&format!("{} chapters", resumed.chapters.len()));
    }
    report(engine.start(&mut surface), &mut surface);

    let mut report_words = 0u64;
    let mut report_start = Instant::now();

    'ui: loop {
        let now_ms = clock.elapsed().as_millis();
        report(engine.poll(now_ms, &mut surface), &mut surface);

        while controls_open {
            match controls.poll_event() {
                Ok(Some(ControlEvent::Quit)) => break 'ui,
                Ok(Some(ControlEvent::SetMode(mode))) => surface.set_mode(mode),
                Ok(Some(event)) => report(engine.apply(event, &mut surface), &mut surface),
                Ok(None) => break,
                Err(ControlsClosed) => {
                    info!("controls: stdin closed, playing to the end");
                    controls_open = false;
                }
            }
        }

        if engine.phase() == Phase::Finished {
            break;
        }

        report_words = report_words.saturating_add(u64::from(engine.drain_word_updates()));

        let elapsed = report_start.elapsed();
        if elapsed >= Duration::from_secs(REPORT_INTERVAL_SECS) {
            let elapsed_ms = elapsed.as_millis().max(1);
            let wpm_x100 = report_words * 6_000_000 / elapsed_ms;

            info!(
                "effective_wpm={}.{:02} words={} elapsed_ms={}",
                wpm_x100 / 100,
                wpm_x100 % 100,
                report_words,
                elapsed_ms
            );

            report_words = 0;
            report_start = Instant::now();
        }

        Timer::after_millis(1).await;
    }

    let state = engine.state();
    let total = engine.words().len();
    let failed_writes = engine.failed_writes();
    if failed_writes > 0 {
        warn!("session: {} position writes failed during playback", failed_writes);
    }

    let (_, store) = engine.close();
    if store.load_progress().ok().flatten() != Some(state.current_index as i64) {
        warn!("session: position {} may not have been saved", state.current_index);
    }
    info!(
        "session: closed at {}/{} paused={}",
        state.current_index,
        total,
        state.paused()
    );

    Ok(())
}
