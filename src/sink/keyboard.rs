//! Real input synthesis backed by the `enigo` crate.
//!
//! Mapping:
//!
//! | Action            | Effect                                         |
//! |-------------------|------------------------------------------------|
//! | confirm           | Return key down+up                             |
//! | switcher-start    | hold the switcher modifier, tap Tab            |
//! | switcher-cycle    | tap Tab while the modifier is held             |
//! | switcher-drop     | release the modifier                           |
//! | scroll-up/down    | vertical scroll-wheel ticks                    |
//!
//! The switcher modifier is ⌘ on macOS (⌘Tab) and Alt elsewhere (Alt+Tab).
//!
//! A new [`Enigo`] instance is created for each call because `Enigo` is not
//! `Send` and the handle is cheap to construct; the only state carried
//! across calls is whether the modifier is currently held.

use enigo::{Axis, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use crate::config::SinkConfig;
use crate::dispatcher::AppAction;

use super::{ActionSink, SinkError};

/// The modifier held down for the duration of an app-switcher interaction.
#[cfg(target_os = "macos")]
const SWITCHER_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const SWITCHER_MODIFIER: Key = Key::Alt;

// ---------------------------------------------------------------------------
// KeyboardSink
// ---------------------------------------------------------------------------

/// Executes actions as real OS input events.
pub struct KeyboardSink {
    config: SinkConfig,
    /// Whether the switcher modifier is currently held down.
    modifier_held: bool,
}

impl KeyboardSink {
    pub fn new(config: SinkConfig) -> Self {
        Self {
            config,
            modifier_held: false,
        }
    }

    fn enigo() -> Result<Enigo, SinkError> {
        Enigo::new(&Settings::default()).map_err(|e| SinkError::Backend(e.to_string()))
    }

    fn key(enigo: &mut Enigo, key: Key, direction: Direction) -> Result<(), SinkError> {
        enigo
            .key(key, direction)
            .map_err(|e| SinkError::KeySimulation(e.to_string()))
    }

    fn scroll(enigo: &mut Enigo, lines: i32) -> Result<(), SinkError> {
        enigo
            .scroll(lines, Axis::Vertical)
            .map_err(|e| SinkError::ScrollSimulation(e.to_string()))
    }
}

impl ActionSink for KeyboardSink {
    fn execute(&mut self, action: AppAction) -> Result<(), SinkError> {
        let mut enigo = Self::enigo()?;

        match action {
            AppAction::Confirm => {
                Self::key(&mut enigo, Key::Return, Direction::Click)?;
            }

            AppAction::AppSwitcherStart => {
                if self.modifier_held {
                    // A duplicate start means the dispatcher and sink
                    // disagree about the switcher phase; fold it into a
                    // cycle rather than stacking modifier presses.
                    log::warn!("keyboard sink: start while modifier already held");
                    Self::key(&mut enigo, Key::Tab, Direction::Click)?;
                } else {
                    Self::key(&mut enigo, SWITCHER_MODIFIER, Direction::Press)?;
                    self.modifier_held = true;
                    Self::key(&mut enigo, Key::Tab, Direction::Click)?;
                }
            }

            AppAction::AppSwitcherCycle => {
                Self::key(&mut enigo, Key::Tab, Direction::Click)?;
            }

            AppAction::AppSwitcherDrop => {
                if self.modifier_held {
                    self.modifier_held = false;
                    Self::key(&mut enigo, SWITCHER_MODIFIER, Direction::Release)?;
                } else {
                    log::warn!("keyboard sink: drop while modifier not held");
                }
            }

            // enigo's positive vertical scroll moves content down.
            AppAction::ScrollUp => {
                Self::scroll(&mut enigo, -self.config.scroll_lines)?;
            }
            AppAction::ScrollDown => {
                Self::scroll(&mut enigo, self.config.scroll_lines)?;
            }
        }

        Ok(())
    }
}

impl Drop for KeyboardSink {
    /// Best-effort modifier release so a crash mid-interaction never leaves
    /// the OS with a stuck ⌘/Alt key.
    fn drop(&mut self) {
        if self.modifier_held {
            if let Ok(mut enigo) = Self::enigo() {
                let _ = enigo.key(SWITCHER_MODIFIER, Direction::Release);
            }
        }
    }
}
