use log::{debug, warn};

use super::{EngineError, PacingEngine, Phase, Step};
use crate::{
    content::ends_sentence,
    persist::KeyValueStore,
    render::{Frame, ReaderSurface, render},
    scheduler::{Scheduler, TimerSource, TimerToken},
};

/// Delay multiplier after a word that closes a sentence.
pub const SENTENCE_END_FACTOR: f64 = 2.2;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Exact delay in milliseconds to hold `word` on screen at `wpm`.
pub fn word_delay(word: &str, wpm: u32) -> Result<f64, EngineError> {
    let base = MS_PER_MINUTE / wpm as f64;
    let delay = if ends_sentence(word) {
        base * SENTENCE_END_FACTOR
    } else {
        base
    };

    if !delay.is_finite() || delay <= 0.0 {
        return Err(EngineError::InvalidSpeed { wpm });
    }
    Ok(delay)
}

/// [`word_delay`] rounded to the nearest whole millisecond. A delay that
/// rounds to zero is rejected like any other unusable speed.
pub fn word_delay_ms(word: &str, wpm: u32) -> Result<u32, EngineError> {
    let delay_ms = (word_delay(word, wpm)? + 0.5) as u32;
    if delay_ms == 0 {
        return Err(EngineError::InvalidSpeed { wpm });
    }
    Ok(delay_ms)
}

impl<S, K> PacingEngine<S, K>
where
    S: Scheduler,
    K: KeyValueStore,
{
    /// Deliver a timer that came due. Only the pending token advances playback.
    pub fn fire<V: ReaderSurface>(
        &mut self,
        token: TimerToken,
        surface: &mut V,
    ) -> Result<Step, EngineError> {
        if self.pending != Some(token) {
            debug!("engine: ignoring stale token={}", token.raw());
            return Ok(Step::Unchanged);
        }

        self.pending = None;
        self.tick(surface)
    }

    /// Fire the pending timer if the scheduler reports it due at `now_ms`.
    pub fn poll<V: ReaderSurface>(
        &mut self,
        now_ms: u64,
        surface: &mut V,
    ) -> Result<Step, EngineError>
    where
        S: TimerSource,
    {
        match self.scheduler.poll_due(now_ms) {
            Some(token) => self.fire(token, surface),
            None => Ok(Step::Unchanged),
        }
    }

    pub(super) fn tick<V: ReaderSurface>(&mut self, surface: &mut V) -> Result<Step, EngineError> {
        if self.state.phase != Phase::Running {
            return Ok(Step::Unchanged);
        }

        let index = self.state.current_index;
        let total = self.words.len();
        let Some(word) = self.words.get(index) else {
            return Ok(self.finish(surface));
        };

        let mode = surface.mode();
        let progress = self.reporter.snapshot(index, total);
        surface.present(Frame {
            unit: render(word, mode),
            progress,
            wpm: self.state.wpm,
        });
        let delay = word_delay_ms(word, self.state.wpm);
        debug!(
            "engine: show index={}/{} word={:?} delay={:?}",
            index, total, word, delay
        );

        self.reporter.persist(index);
        self.state.current_index = index + 1;
        self.words_since_drain = self.words_since_drain.saturating_add(1);

        self.cancel_pending();
        let delay_ms = match delay {
            Ok(delay_ms) => delay_ms,
            Err(err) => {
                warn!("engine: {}; pausing at index={}", err, self.state.current_index);
                self.state.phase = Phase::Paused;
                return Err(err);
            }
        };

        self.pending = Some(self.scheduler.schedule_after(delay_ms));
        Ok(Step::Shown { index, delay_ms })
    }
}
