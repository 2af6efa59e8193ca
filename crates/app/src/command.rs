use std::fmt;

use order_core::model::LevelId;

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Levels,
    Play(LevelId),
    /// Player slots as typed, 1-based.
    Move { from: usize, to: usize },
    Check,
    Hint,
    Retry,
    Next,
    Exit,
    Status,
    Reset,
    Sound(bool),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str },
    InvalidNumber { raw: String },
    InvalidSound { raw: String },
    SlotOutOfRange { slot: usize, len: usize },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "type a command, or `help`"),
            CommandError::Unknown(word) => write!(f, "unknown command: {word}"),
            CommandError::MissingArgument { command } => {
                write!(f, "{command} needs more arguments (see `help`)")
            }
            CommandError::InvalidNumber { raw } => write!(f, "not a valid number: {raw}"),
            CommandError::InvalidSound { raw } => write!(f, "sound is `on` or `off`, not {raw}"),
            CommandError::SlotOutOfRange { slot, len } => {
                write!(f, "there is no slot {slot}, the board has {len} cards")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  levels            list levels with lock and completion state
  play <id>         start a level
  move <from> <to>  move the card in slot <from> to slot <to> (1-based)
  check             check the current order
  hint              show the solution (-30 points)
  retry             replay a level after time ran out
  next              continue after a win
  exit              leave the level
  status            show the board again
  reset             wipe score, medals and completed levels
  sound on|off      toggle sound cues
  quit              close the game";

fn number(raw: Option<&str>, command: &'static str) -> Result<u32, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument { command })?;
    raw.parse().map_err(|_| CommandError::InvalidNumber {
        raw: raw.to_string(),
    })
}

fn slot(raw: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    let value = number(raw, command)?;
    if value == 0 {
        return Err(CommandError::InvalidNumber {
            raw: value.to_string(),
        });
    }
    usize::try_from(value).map_err(|_| CommandError::InvalidNumber {
        raw: value.to_string(),
    })
}

/// Turn 1-based player slots into a zero-based source and list-move
/// destination for a board of `len` cards.
///
/// # Errors
///
/// Returns `CommandError::SlotOutOfRange` naming the first slot past the end
/// of the board.
pub fn list_move(from: usize, to: usize, len: usize) -> Result<(usize, usize), CommandError> {
    for slot in [from, to] {
        if slot == 0 || slot > len {
            return Err(CommandError::SlotOutOfRange { slot, len });
        }
    }
    let (from, to) = (from - 1, to - 1);
    // Moving down has to insert after the card now at `to` so the moved card
    // ends up in that slot.
    let destination = if to > from { to + 1 } else { to };
    Ok((from, destination))
}

impl Command {
    /// Parse a line typed by the player.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for blank lines, unknown words, and missing or
    /// malformed arguments.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "levels" | "l" => Command::Levels,
            "play" | "p" => Command::Play(LevelId::new(number(words.next(), "play")?)),
            "move" | "m" => {
                let from = slot(words.next(), "move")?;
                let to = slot(words.next(), "move")?;
                Command::Move { from, to }
            }
            "check" | "c" => Command::Check,
            "hint" => Command::Hint,
            "retry" | "r" => Command::Retry,
            "next" | "n" => Command::Next,
            "exit" => Command::Exit,
            "status" | "s" => Command::Status,
            "reset" => Command::Reset,
            "sound" => match words.next().map(str::to_ascii_lowercase).as_deref() {
                Some("on") => Command::Sound(true),
                Some("off") => Command::Sound(false),
                Some(other) => {
                    return Err(CommandError::InvalidSound {
                        raw: other.to_string(),
                    });
                }
                None => return Err(CommandError::MissingArgument { command: "sound" }),
            },
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" => Command::Quit,
            _ => return Err(CommandError::Unknown(head.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_words() {
        assert_eq!(Command::parse("check"), Ok(Command::Check));
        assert_eq!(Command::parse("  NEXT "), Ok(Command::Next));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
        assert_eq!(Command::parse("sound off"), Ok(Command::Sound(false)));
    }

    #[test]
    fn play_takes_level_id() {
        assert_eq!(
            Command::parse("play 101"),
            Ok(Command::Play(LevelId::new(101)))
        );
        assert_eq!(
            Command::parse("play"),
            Err(CommandError::MissingArgument { command: "play" })
        );
    }

    #[test]
    fn move_keeps_player_slots() {
        assert_eq!(
            Command::parse("move 1 3"),
            Ok(Command::Move { from: 1, to: 3 })
        );
        assert!(matches!(
            Command::parse("move 0 2"),
            Err(CommandError::InvalidNumber { .. })
        ));
        assert!(matches!(
            Command::parse("move 1"),
            Err(CommandError::MissingArgument { command: "move" })
        ));
    }

    #[test]
    fn slots_convert_to_list_move() {
        assert_eq!(list_move(1, 3, 5), Ok((0, 3)));
        assert_eq!(list_move(4, 2, 5), Ok((3, 1)));
        assert_eq!(list_move(2, 5, 5), Ok((1, 5)));
        assert_eq!(list_move(3, 3, 5), Ok((2, 2)));
    }

    #[test]
    fn slot_past_the_board_is_reported_one_based() {
        let Ok(Command::Move { from, to }) = Command::parse("move 1 6") else {
            panic!("move 1 6 should parse");
        };
        let err = list_move(from, to, 5).unwrap_err();
        assert_eq!(err, CommandError::SlotOutOfRange { slot: 6, len: 5 });
        assert_eq!(err.to_string(), "there is no slot 6, the board has 5 cards");
        assert_eq!(
            list_move(7, 2, 5),
            Err(CommandError::SlotOutOfRange { slot: 7, len: 5 })
        );
    }

    #[test]
    fn sound_argument_ignores_case() {
        assert_eq!(Command::parse("sound ON"), Ok(Command::Sound(true)));
        assert_eq!(Command::parse("Sound Off"), Ok(Command::Sound(false)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".into()))
        );
        assert!(matches!(
            Command::parse("sound loud"),
            Err(CommandError::InvalidSound { .. })
        ));
    }
}
