use std::{
    fmt,
    io::{self, BufRead},
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use log::{debug, warn};
use pacer_core::{
    engine::ReaderConfig,
    input::{ControlEvent, ControlProvider, SpeedInputError, coerce_wpm},
    render::{PresentationMode, UnknownMode},
};

pub(super) const HELP: &str = "controls: <enter> pause/resume | pause | resume | w <wpm> | \
m <highlight|underline|pivot> | q";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum CommandError {
    Unknown,
    Speed(SpeedInputError),
    Mode(UnknownMode),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str(HELP),
            Self::Speed(err) => fmt::Display::fmt(err, f),
            Self::Mode(err) => fmt::Display::fmt(err, f),
        }
    }
}

/// Map one line typed by the reader to a control event.
pub(super) fn parse_command(
    line: &str,
    config: &ReaderConfig,
) -> Result<ControlEvent, CommandError> {
    let line = line.trim();
    let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));

    match verb {
        "" | "p" | "toggle" => Ok(ControlEvent::TogglePause),
        "pause" => Ok(ControlEvent::Pause),
        "r" | "resume" => Ok(ControlEvent::Resume),
        "q" | "quit" | "exit" => Ok(ControlEvent::Quit),
        "w" | "wpm" | "speed" => coerce_wpm(arg, config)
            .map(ControlEvent::SetSpeed)
            .map_err(CommandError::Speed),
        "m" | "mode" => arg
            .parse::<PresentationMode>()
            .map(ControlEvent::SetMode)
            .map_err(CommandError::Mode),
        _ if verb.starts_with(|c: char| c.is_ascii_digit()) => coerce_wpm(verb, config)
            .map(ControlEvent::SetSpeed)
            .map_err(CommandError::Speed),
        _ => Err(CommandError::Unknown),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct ControlsClosed;

/// Reads stdin on a helper thread and hands events to the UI loop.
pub(super) struct StdinControls {
    events: Receiver<ControlEvent>,
}

impl StdinControls {
    pub(super) fn spawn(config: ReaderConfig) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("stdin-controls".into())
            .spawn(move || forward_commands(io::stdin().lock(), &config, &tx))?;

        Ok(Self { events: rx })
    }
}

/// Parse each line of `reader` and send the accepted events. Returns on EOF,
/// on a read error, or once the receiving side is gone.
fn forward_commands<R: BufRead>(reader: R, config: &ReaderConfig, tx: &Sender<ControlEvent>) {
    for line in reader.split(b'\n') {
        let bytes = match line {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("controls: stdin read failed: {}", err);
                break;
            }
        };

        let line = String::from_utf8_lossy(&bytes);
        match parse_command(&line, config) {
            Ok(event) => {
                debug!("controls: {:?}", event);
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(err) => warn!("controls: {:?} rejected: {}", line.trim(), err),
        }
    }
}

impl ControlProvider for StdinControls {
    type Error = ControlsClosed;

    fn poll_event(&mut self) -> Result<Option<ControlEvent>, Self::Error> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ControlsClosed),
        }
    }
}
