//! Playback state machine that paces a word sequence.
//!
//! The engine owns the reading position and at most one pending timer. Every
//! path that schedules or stops playback cancels the outstanding timer first,
//! and a timer that fires after being cancelled is recognised by its token and
//! ignored.

mod runtime;

pub use runtime::{SENTENCE_END_FACTOR, word_delay, word_delay_ms};

use core::fmt;

use log::{info, warn};

use crate::{
    content::WordSequence,
    input::ControlEvent,
    persist::{KeyValueStore, SessionStore, clamp_index},
    progress::{ProgressReporter, ProgressSnapshot, snapshot},
    render::{PresentationMode, ReaderSurface},
    scheduler::{Scheduler, TimerToken},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub wpm: u32,
    pub min_wpm: u32,
    pub max_wpm: u32,
    pub mode: PresentationMode,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            wpm: 300,
            min_wpm: 60,
            max_wpm: 1_200,
            mode: PresentationMode::Pivot,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    /// Terminal. The whole sequence has been shown.
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlaybackState {
    /// Next word to show, in `0..=len`.
    pub current_index: usize,
    pub phase: Phase,
    pub wpm: u32,
}

impl PlaybackState {
    pub fn paused(&self) -> bool {
        matches!(self.phase, Phase::Paused | Phase::Finished)
    }
}

/// What a call into the engine did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// Nothing changed.
    Unchanged,
    /// Word `index` was presented and the next tick is due after `delay_ms`.
    Shown { index: usize, delay_ms: u32 },
    Paused,
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// The speed yields no finite, positive delay. Playback is paused.
    InvalidSpeed { wpm: u32 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpeed { wpm } => {
                write!(f, "cannot pace playback at {} words per minute", wpm)
            }
        }
    }
}

impl core::error::Error for EngineError {}

pub struct PacingEngine<S, K>
where
    S: Scheduler,
    K: KeyValueStore,
{
    words: WordSequence,
    state: PlaybackState,
    scheduler: S,
    reporter: ProgressReporter<K>,
    pending: Option<TimerToken>,
    words_since_drain: u32,
}

impl<S, K> PacingEngine<S, K>
where
    S: Scheduler,
    K: KeyValueStore,
{
    /// Build an idle engine. `start_index` comes from persisted progress and
    /// is clamped into `[0, words.len()]`.
    pub fn new(
        words: WordSequence,
        start_index: i64,
        wpm: u32,
        scheduler: S,
        reporter: ProgressReporter<K>,
    ) -> Self {
        let current_index = clamp_index(start_index, words.len());
        if current_index as i64 != start_index {
            warn!(
                "engine: resume index {} out of range for {} words, using {}",
                start_index,
                words.len(),
                current_index
            );
        }

        Self {
            words,
            state: PlaybackState {
                current_index,
                phase: Phase::Idle,
                wpm,
            },
            scheduler,
            reporter,
            pending: None,
            words_since_drain: 0,
        }
    }

    pub fn words(&self) -> &WordSequence {
        &self.words
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn wpm(&self) -> u32 {
        self.state.wpm
    }

    pub fn progress(&self) -> ProgressSnapshot {
        snapshot(self.state.current_index, self.words.len())
    }

    pub fn pending_token(&self) -> Option<TimerToken> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn store(&self) -> &SessionStore<K> {
        self.reporter.store()
    }

    /// Position writes that failed since the engine was built.
    pub fn failed_writes(&self) -> u32 {
        self.reporter.failed_writes()
    }

    /// Words shown since the previous call.
    pub fn drain_word_updates(&mut self) -> u32 {
        core::mem::take(&mut self.words_since_drain)
    }

    /// Leave `Idle`. Shows the first word right away, or finishes at once when
    /// there is nothing left to show.
    pub fn start<V: ReaderSurface>(&mut self, surface: &mut V) -> Result<Step, EngineError> {
        if self.state.phase != Phase::Idle {
            return Ok(Step::Unchanged);
        }

        if self.state.current_index >= self.words.len() {
            return Ok(self.finish(surface));
        }

        info!(
            "engine: start index={} words={} wpm={}",
            self.state.current_index,
            self.words.len(),
            self.state.wpm
        );
        self.state.phase = Phase::Running;
        self.tick(surface)
    }

    /// Stop advancing and remember where. Calling it again changes nothing.
    pub fn pause(&mut self) -> Step {
        if self.state.phase != Phase::Running {
            return Step::Unchanged;
        }

        self.cancel_pending();
        self.state.phase = Phase::Paused;
        self.reporter.persist(self.state.current_index);
        info!("engine: paused index={}", self.state.current_index);
        Step::Paused
    }

    /// Continue from the word after the last one shown, without waiting a
    /// full delay period.
    pub fn resume<V: ReaderSurface>(&mut self, surface: &mut V) -> Result<Step, EngineError> {
        if self.state.phase != Phase::Paused {
            return Ok(Step::Unchanged);
        }

        if self.state.current_index >= self.words.len() {
            return Ok(self.finish(surface));
        }

        info!(
            "engine: resumed index={} wpm={}",
            self.state.current_index, self.state.wpm
        );
        self.state.phase = Phase::Running;
        self.tick(surface)
    }

    pub fn toggle_pause<V: ReaderSurface>(&mut self, surface: &mut V) -> Result<Step, EngineError> {
        match self.state.phase {
            Phase::Running => Ok(self.pause()),
            Phase::Paused => self.resume(surface),
            Phase::Idle | Phase::Finished => Ok(Step::Unchanged),
        }
    }

    /// Change speed from the next scheduled word on. The timer already in
    /// flight keeps its delay.
    pub fn set_speed(&mut self, wpm: u32) {
        if wpm != self.state.wpm {
            info!("engine: speed {} -> {} wpm", self.state.wpm, wpm);
        }
        self.state.wpm = wpm;
    }

    /// Route a user control. Mode changes and quitting belong to the host and
    /// report [`Step::Unchanged`].
    pub fn apply<V: ReaderSurface>(
        &mut self,
        event: ControlEvent,
        surface: &mut V,
    ) -> Result<Step, EngineError> {
        match event {
            ControlEvent::TogglePause => self.toggle_pause(surface),
            ControlEvent::Pause => Ok(self.pause()),
            ControlEvent::Resume => self.resume(surface),
            ControlEvent::SetSpeed(wpm) => {
                self.set_speed(wpm);
                Ok(Step::Unchanged)
            }
            ControlEvent::SetMode(_) | ControlEvent::Quit => Ok(Step::Unchanged),
        }
    }

    /// End the session: cancel the pending timer, persist the position, and
    /// hand back the scheduler and store.
    pub fn close(mut self) -> (S, SessionStore<K>) {
        self.cancel_pending();
        self.reporter.persist(self.state.current_index);
        info!(
            "engine: closed index={} phase={:?}",
            self.state.current_index, self.state.phase
        );
        (self.scheduler, self.reporter.into_store())
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel(token);
        }
    }

    fn finish<V: ReaderSurface>(&mut self, surface: &mut V) -> Step {
        self.cancel_pending();
        self.state.phase = Phase::Finished;

        let total = self.words.len();
        self.state.current_index = total;
        let progress = self.reporter.snapshot(total, total);
        self.reporter.persist(total);
        surface.finished(progress);

        info!("engine: finished words={}", total);
        Step::Finished
    }
}
