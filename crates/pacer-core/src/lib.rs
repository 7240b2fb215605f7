//! Pacing core for rapid serial visual presentation reading.
//!
//! Text comes in through [`session`], is split by [`content`], and is played
//! back one word at a time by [`engine::PacingEngine`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod content;
pub mod engine;
pub mod input;
pub mod persist;
pub mod pivot;
pub mod progress;
pub mod render;
pub mod scheduler;
pub mod session;
