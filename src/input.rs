use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    Pause,
    Step,
    Strike,
    Clear,
    HudToggle,
    FloorToggle,
}

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(ev: &InputEvent) -> Option<Action> {
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(Action::Quit);
    }
    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::Pause),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::Step),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Strike),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Clear),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::HudToggle),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Action::FloorToggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> InputEvent {
        InputEvent { key: code, mods }
    }

    #[test]
    fn ctrl_c_quits_plain_c_clears() {
        assert_eq!(
            map_event_to_action(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(
            map_event_to_action(&key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Action::Clear)
        );
    }

    #[test]
    fn space_strikes() {
        assert_eq!(
            map_event_to_action(&key(KeyCode::Char(' '), KeyModifiers::NONE)),
            Some(Action::Strike)
        );
        assert_eq!(map_event_to_action(&key(KeyCode::Tab, KeyModifiers::NONE)), None);
    }
}
