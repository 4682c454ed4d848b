//! Terminal handling for `tourguide run`.
//!
//! The tour owns the terminal while it runs: raw mode so single key presses
//! drive it, the alternate screen so callouts do not litter the shell.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};

/// What a key press asks the running tour to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourInput {
    /// Leave without ending the tour; progress is kept
    Quit,
    Next,
    Prev,
    /// Hand the key to the tour's own bindings
    Key(KeyCode),
    Ignore,
}

impl TourInput {
    pub fn from_key(key: KeyEvent) -> Self {
        if key.kind != KeyEventKind::Press {
            return TourInput::Ignore;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => TourInput::Quit,
            KeyCode::Char('q') => TourInput::Quit,
            KeyCode::Char('n') | KeyCode::Enter => TourInput::Next,
            KeyCode::Char('p') => TourInput::Prev,
            code => TourInput::Key(code),
        }
    }
}

/// Keeps the terminal in tour mode until dropped
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self { _private: () })
    }

    fn restore() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        Self::restore();
    }
}

/// Restore the terminal before the default panic output is printed
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        TerminalGuard::restore();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(TourInput::from_key(press(KeyCode::Char('n'))), TourInput::Next);
        assert_eq!(TourInput::from_key(press(KeyCode::Enter)), TourInput::Next);
        assert_eq!(TourInput::from_key(press(KeyCode::Char('p'))), TourInput::Prev);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(TourInput::from_key(press(KeyCode::Char('q'))), TourInput::Quit);
        assert_eq!(
            TourInput::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            TourInput::Quit
        );
    }

    #[test]
    fn test_other_keys_go_to_the_tour() {
        assert_eq!(
            TourInput::from_key(press(KeyCode::Right)),
            TourInput::Key(KeyCode::Right)
        );
        assert_eq!(
            TourInput::from_key(press(KeyCode::Esc)),
            TourInput::Key(KeyCode::Esc)
        );
        assert_eq!(
            TourInput::from_key(press(KeyCode::Char('c'))),
            TourInput::Key(KeyCode::Char('c'))
        );
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(TourInput::from_key(release), TourInput::Ignore);
    }
}
