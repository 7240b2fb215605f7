//! Key-value persistence port and the session record stored through it.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::{convert::Infallible, fmt::Write as _};

use heapless::String as HeaplessString;
use log::warn;

use crate::content::chapters::{self, ChapterMarker};

pub const TEXT_KEY: &str = "rsvp_text";
pub const CHAPTERS_KEY: &str = "rsvp_chapters";
pub const PROGRESS_KEY: &str = "rsvp_progress";

/// Enough room for any `usize` in decimal.
const INDEX_DIGITS: usize = 20;

/// Abstract string key-value backend.
pub trait KeyValueStore {
    type Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    type Error = T::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }
}

/// Volatile store for tests and for hosts without durable storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries.insert(String::from(key), String::from(value));
        Ok(())
    }
}

/// Typed view over the three persisted session values.
#[derive(Debug)]
pub struct SessionStore<K> {
    store: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub const fn new(store: K) -> Self {
        Self { store }
    }

    pub fn get_ref(&self) -> &K {
        &self.store
    }

    pub fn into_inner(self) -> K {
        self.store
    }

    pub fn load_text(&self) -> Result<Option<String>, K::Error> {
        self.store.get(TEXT_KEY)
    }

    pub fn save_text(&mut self, text: &str) -> Result<(), K::Error> {
        self.store.set(TEXT_KEY, text)
    }

    /// Stored chapter list; an undecodable list reads as empty.
    pub fn load_chapters(&self) -> Result<Vec<ChapterMarker>, K::Error> {
        let Some(encoded) = self.store.get(CHAPTERS_KEY)? else {
            return Ok(Vec::new());
        };

        match chapters::decode_chapters(&encoded) {
            Ok(list) => Ok(list),
            Err(err) => {
                warn!("persist: ignoring undecodable chapter list: {}", err);
                Ok(Vec::new())
            }
        }
    }

    pub fn save_chapters(&mut self, list: &[ChapterMarker]) -> Result<(), K::Error> {
        match chapters::encode_chapters(list) {
            Ok(encoded) => self.store.set(CHAPTERS_KEY, &encoded),
            Err(err) => {
                warn!("persist: chapter list not encodable, storing empty: {}", err);
                self.store.set(CHAPTERS_KEY, "[]")
            }
        }
    }

    /// Raw stored progress, possibly out of range. `None` when absent or unparsable.
    pub fn load_progress(&self) -> Result<Option<i64>, K::Error> {
        Ok(self
            .store
            .get(PROGRESS_KEY)?
            .and_then(|raw| parse_index(&raw)))
    }

    pub fn save_progress(&mut self, index: usize) -> Result<(), K::Error> {
        self.store.set(PROGRESS_KEY, &encode_index(index))
    }
}

pub fn encode_index(index: usize) -> HeaplessString<INDEX_DIGITS> {
    let mut out = HeaplessString::new();
    // Cannot overflow: INDEX_DIGITS covers usize::MAX.
    let _ = write!(out, "{}", index);
    out
}

/// Leading-integer parse: optional sign, then digits; trailing junk is ignored.
pub fn parse_index(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Clamp a persisted index into `[0, len]`.
pub fn clamp_index(raw: i64, len: usize) -> usize {
    if raw <= 0 {
        0
    } else {
        usize::try_from(raw).map_or(len, |index| index.min(len))
    }
}
