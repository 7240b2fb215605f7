//! Session import and resumption over a key-value store.

use alloc::vec::Vec;
use core::fmt;

use log::info;

use crate::{
    content::{
        chapters::{ChapterMarker, detect_chapters},
        normalize, tokenize,
    },
    engine::{PacingEngine, ReaderConfig},
    persist::{KeyValueStore, SessionStore},
    progress::ProgressReporter,
    scheduler::Scheduler,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionError<E> {
    /// No text was supplied, or none is stored to resume.
    InputMissing,
    Storage(E),
}

impl<E: fmt::Display> fmt::Display for SessionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputMissing => f.write_str("no text to read: supply a text file first"),
            Self::Storage(err) => write!(f, "session storage failed: {}", err),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for SessionError<E> {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImportSummary {
    pub words: usize,
    pub chapters: usize,
}

/// Store a new text as the current session and rewind progress to zero.
///
/// Chapters are detected on the raw line structure before the text is
/// normalized.
pub fn import_text<K: KeyValueStore>(
    store: &mut SessionStore<K>,
    raw: &str,
) -> Result<ImportSummary, SessionError<K::Error>> {
    let text = normalize(raw);
    if text.is_empty() {
        return Err(SessionError::InputMissing);
    }

    let chapters = detect_chapters(raw);
    let words = tokenize(&text).len();

    store.save_text(&text).map_err(SessionError::Storage)?;
    store
        .save_chapters(&chapters)
        .map_err(SessionError::Storage)?;
    store.save_progress(0).map_err(SessionError::Storage)?;

    info!(
        "session: imported words={} chapters={}",
        words,
        chapters.len()
    );
    Ok(ImportSummary {
        words,
        chapters: chapters.len(),
    })
}

pub struct ResumedSession<S, K>
where
    S: Scheduler,
    K: KeyValueStore,
{
    pub engine: PacingEngine<S, K>,
    pub chapters: Vec<ChapterMarker>,
}

/// Rebuild an idle engine from the stored text and position.
pub fn resume<S, K>(
    store: SessionStore<K>,
    scheduler: S,
    config: &ReaderConfig,
) -> Result<ResumedSession<S, K>, SessionError<K::Error>>
where
    S: Scheduler,
    K: KeyValueStore,
{
    let Some(text) = store.load_text().map_err(SessionError::Storage)? else {
        return Err(SessionError::InputMissing);
    };
    let chapters = store.load_chapters().map_err(SessionError::Storage)?;
    let start_index = store
        .load_progress()
        .map_err(SessionError::Storage)?
        .unwrap_or(0);

    let words = tokenize(&text);
    info!(
        "session: resuming words={} chapters={} stored_index={}",
        words.len(),
        chapters.len(),
        start_index
    );

    let engine = PacingEngine::new(
        words,
        start_index,
        config.wpm,
        scheduler,
        ProgressReporter::new(store),
    );
    Ok(ResumedSession { engine, chapters })
}
