//! Keystroke decoder.
//!
//! Finite-state machine turning a stream of codepoints into logical [`Key`]s:
//!
//! ```text
//! Idle ──ESC──▶ AwaitEscapeBracket ──'['──▶ AwaitEscapeCode ──D/C──▶ Idle (CursorLeft/Right)
//!   │                  │                          └──other──▶ Idle (nothing)
//!   │                  └──other──▶ error: non-CSI escape
//!   └──control / printable──▶ Idle (named key / Insert)
//! ```
//!
//! The same decoder serves the main key loop and prompt sessions; only the
//! consumer of the produced keys differs.

use core_events::Key;

const CTRL_A: char = '\x01';
const CTRL_C: char = '\x03';
const CTRL_E: char = '\x05';
const LINE_FEED: char = '\x0a';
const CARRIAGE_RETURN: char = '\x0d';
const CTRL_W: char = '\x17';
const ESC: char = '\x1b';
const DELETE: char = '\x7f';

const CSI: char = '[';
const CSI_LEFT: char = 'D';
const CSI_RIGHT: char = 'C';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    #[default]
    Idle,
    AwaitEscapeBracket,
    AwaitEscapeCode,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("non-CSI escape sequence (ESC followed by {0:?})")]
    NonCsiEscape(char),
}

#[derive(Debug, Default)]
pub struct Decoder {
    state: DecodeState,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Advance the machine by one codepoint, returning the completed key if any.
    ///
    /// On error the machine is back in `Idle`; callers treat the error as fatal.
    pub fn feed(&mut self, ch: char) -> Result<Option<Key>, DecodeError> {
        match self.state {
            DecodeState::Idle => Ok(Some(match ch {
                ESC => {
                    self.state = DecodeState::AwaitEscapeBracket;
                    return Ok(None);
                }
                DELETE => Key::Backspace,
                CTRL_A => Key::Home,
                CTRL_E => Key::End,
                CTRL_W => Key::DeleteWord,
                LINE_FEED | CARRIAGE_RETURN => Key::Enter,
                CTRL_C => Key::Interrupt,
                other => Key::Insert(other),
            })),
            DecodeState::AwaitEscapeBracket => {
                self.state = DecodeState::Idle;
                if ch == CSI {
                    self.state = DecodeState::AwaitEscapeCode;
                    Ok(None)
                } else {
                    Err(DecodeError::NonCsiEscape(ch))
                }
            }
            DecodeState::AwaitEscapeCode => {
                self.state = DecodeState::Idle;
                Ok(match ch {
                    CSI_LEFT => Some(Key::CursorLeft),
                    CSI_RIGHT => Some(Key::CursorRight),
                    _ => None,
                })
            }
        }
    }
}
