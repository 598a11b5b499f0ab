use super::app_logic::TuiApp;
use crate::model::TreeModel;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

/// Poll for one terminal event. Returns `true` when the screen needs redrawing.
pub(super) fn handle_events<M: TreeModel>(app: &mut TuiApp<M>) -> Result<bool> {
    if !event::poll(Duration::from_millis(50))? {
        return Ok(false);
    }
    match event::read()? {
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            app.handle_key(key_event);
            Ok(true)
        }
        Event::Resize(_, _) => Ok(true),
        _ => Ok(false),
    }
}
