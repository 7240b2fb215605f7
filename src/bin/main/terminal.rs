use std::io::Write;

use log::warn;
use owo_colors::OwoColorize;
use pacer_core::{
    progress::ProgressSnapshot,
    render::{Frame, PresentationMode, ReaderSurface, RenderUnit, WordStyle},
};

const WORD_COLUMNS: usize = 40;
const ORP_ANCHOR_PERCENT: usize = 42;
const BAR_CELLS: usize = 20;

/// Single-line RSVP view redrawn in place on a terminal.
pub(super) struct TerminalSurface<W: Write> {
    out: W,
    mode: PresentationMode,
    anchor_col: usize,
    write_fault_logged: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub(super) fn new(out: W, mode: PresentationMode) -> Self {
        Self {
            out,
            mode,
            anchor_col: WORD_COLUMNS * ORP_ANCHOR_PERCENT / 100,
            write_fault_logged: false,
        }
    }

    pub(super) fn set_mode(&mut self, mode: PresentationMode) {
        if mode != self.mode {
            self.notice(&format!("mode: {}", mode));
        }
        self.mode = mode;
    }

    /// Print a message on its own line, below the word line.
    pub(super) fn notice(&mut self, message: &str) {
        let result = writeln!(self.out, "\r\x1b[2K{}", message.dimmed()).and_then(|_| self.out.flush());
        self.check(result);
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn check(&mut self, result: std::io::Result<()>) {
        if let Err(err) = result
            && !self.write_fault_logged
        {
            warn!("terminal: write failed: {}", err);
            self.write_fault_logged = true;
        }
    }

    fn draw(&mut self, frame: &Frame<'_>) -> std::io::Result<()> {
        write!(self.out, "\r\x1b[2K")?;

        let width = match frame.unit {
            RenderUnit::Styled { style, text } => {
                let len = text.chars().count();
                let pad = self.anchor_col.saturating_sub(len / 2);
                write!(self.out, "{:pad$}", "")?;
                match style {
                    WordStyle::Highlight => write!(self.out, "{}", text.reversed())?,
                    WordStyle::Underline => write!(self.out, "{}", text.underline())?,
                }
                pad + len
            }
            RenderUnit::Pivot { left, pivot, right } => {
                let pad = self.anchor_col.saturating_sub(left.chars().count());
                write!(
                    self.out,
                    "{:pad$}{}{}{}",
                    "",
                    left,
                    pivot.red().bold(),
                    right
                )?;
                pad + left.chars().count() + pivot.chars().count() + right.chars().count()
            }
        };

        let trailing = WORD_COLUMNS.saturating_sub(width) + 2;
        write!(
            self.out,
            "{:trailing$}{} {:>3}% {} wpm",
            "",
            progress_bar(frame.progress).dimmed(),
            frame.progress.whole_percent(),
            frame.wpm
        )?;
        self.out.flush()
    }
}

impl<W: Write> ReaderSurface for TerminalSurface<W> {
    fn mode(&self) -> PresentationMode {
        self.mode
    }

    fn present(&mut self, frame: Frame<'_>) {
        let result = self.draw(&frame);
        self.check(result);
    }

    fn finished(&mut self, progress: ProgressSnapshot) {
        let result = writeln!(
            self.out,
            "\r\x1b[2K{:pad$}{} {:>3}%",
            "",
            progress_bar(progress).green(),
            progress.whole_percent(),
            pad = WORD_COLUMNS + 2
        )
        .and_then(|_| writeln!(self.out, "{}", "finished".bold()))
        .and_then(|_| self.out.flush());
        self.check(result);
    }
}

fn progress_bar(progress: ProgressSnapshot) -> String {
    let filled = usize::from(progress.whole_percent()) * BAR_CELLS / 100;
    let mut bar = String::with_capacity(BAR_CELLS + 2);
    bar.push('[');
    bar.extend(core::iter::repeat_n('#', filled));
    bar.extend(core::iter::repeat_n('-', BAR_CELLS - filled));
    bar.push(']');
    bar
}

#[cfg(test)]
mod tests {
    use pacer_core::{progress::snapshot, render::render};

    use super::*;

    fn frame(word: &str, mode: PresentationMode) -> Frame<'_> {
        Frame {
            unit: render(word, mode),
            progress: snapshot(1, 2),
            wpm: 300,
        }
    }

    fn drawn(surface: TerminalSurface<Vec<u8>>) -> String {
        String::from_utf8(surface.into_inner()).unwrap()
    }

    #[test]
    fn progress_bar_fills_by_percent() {
        assert_eq!(progress_bar(snapshot(0, 4)), "[--------------------]");
        assert_eq!(progress_bar(snapshot(1, 2)), "[##########----------]");
        assert_eq!(progress_bar(snapshot(0, 0)), "[####################]");
    }

    #[test]
    fn pivot_frame_keeps_word_pieces_and_status() {
        let mut surface = TerminalSurface::new(Vec::new(), PresentationMode::Pivot);
        surface.present(frame("reading", PresentationMode::Pivot));

        let out = drawn(surface);
        assert!(out.contains("re"));
        assert!(out.contains("ding"));
        assert!(out.contains(" 50% 300 wpm"));
    }

    #[test]
    fn styled_frame_contains_whole_word() {
        let mut surface = TerminalSurface::new(Vec::new(), PresentationMode::Underline);
        surface.present(frame("world.", PresentationMode::Underline));

        assert!(drawn(surface).contains("world."));
    }

    #[test]
    fn mode_changes_are_announced_once() {
        let mut surface = TerminalSurface::new(Vec::new(), PresentationMode::Pivot);
        surface.set_mode(PresentationMode::Pivot);
        surface.set_mode(PresentationMode::Highlight);
        assert_eq!(surface.mode(), PresentationMode::Highlight);

        let out = drawn(surface);
        assert_eq!(out.matches("mode:").count(), 1);
        assert!(out.contains("highlight"));
    }

    #[test]
    fn finish_line_reports_full_progress() {
        let mut surface = TerminalSurface::new(Vec::new(), PresentationMode::Pivot);
        surface.finished(snapshot(2, 2));

        let out = drawn(surface);
        assert!(out.contains("100%"));
        assert!(out.contains("finished"));
    }
}
