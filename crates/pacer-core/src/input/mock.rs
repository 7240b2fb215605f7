use super::{ControlEvent, ControlProvider};

/// Replays a fixed list of events, one per poll.
#[derive(Debug, Clone)]
pub struct ScriptedControls<'a> {
    events: &'a [ControlEvent],
    cursor: usize,
}

impl<'a> ScriptedControls<'a> {
    pub const fn new(events: &'a [ControlEvent]) -> Self {
        Self { events, cursor: 0 }
    }
}

impl ControlProvider for ScriptedControls<'_> {
    type Error = core::convert::Infallible;

    fn poll_event(&mut self) -> Result<Option<ControlEvent>, Self::Error> {
        let Some(event) = self.events.get(self.cursor).copied() else {
            return Ok(None);
        };
        self.cursor = self.cursor.saturating_add(1);
        Ok(Some(event))
    }
}
