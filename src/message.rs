//! Operator commands for the native front end.
//!
//! Each stdin line parses into one [`Message`]; [`crate::handlers`] applies it to
//! the session.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Commands an operator can issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Select the class subsequent clicks assign
    SelectClass(String),
    /// Click at a surface position (origin at the surface's top-left)
    Click { x: f32, y: f32 },
    /// Navigate to next image
    NextImage,
    /// Navigate to previous image
    PrevImage,
    /// Jump to an image by zero-based index
    GoTo(usize),
    /// Write the current frame as PNG
    Render(PathBuf),
    /// Print session summary
    Status,
    /// Send annotations to the sink
    Submit,
    /// Leave, unless unsaved work exists
    Quit,
    /// Leave and discard unsaved work
    ForceQuit,
    /// List commands
    Help,
}

/// Errors produced while parsing a command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Blank input
    #[error("Empty command")]
    Empty,

    /// First word isn't a known command
    #[error("Unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    /// Required argument is absent
    #[error("'{command}' expects {argument}")]
    MissingArgument {
        /// Command being parsed
        command: &'static str,
        /// Description of the expected argument
        argument: &'static str,
    },

    /// Argument could not be parsed
    #[error("Invalid {argument}: '{value}'")]
    InvalidArgument {
        /// Description of the expected argument
        argument: &'static str,
        /// The offending text
        value: String,
    },
}

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  class <name>    select the class to assign
  click <x> <y>   toggle the cell under surface pixel (x, y)
  next | prev     move between images
  goto <index>    jump to image by zero-based index
  render <path>   write the current frame as PNG
  status          show session summary
  submit          send annotations to the sink
  quit            leave (refused while unsaved work exists)
  quit!           leave and discard unsaved work";

fn parse_arg<T: FromStr>(
    value: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<T, MessageError> {
    let value = value.ok_or(MessageError::MissingArgument { command, argument })?;
    value.parse().map_err(|_| MessageError::InvalidArgument {
        argument,
        value: value.to_string(),
    })
}

impl FromStr for Message {
    type Err = MessageError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(MessageError::Empty)?;

        let message = match command.to_ascii_lowercase().as_str() {
            "class" => {
                let name = words.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    return Err(MessageError::MissingArgument {
                        command: "class",
                        argument: "a class name",
                    });
                }
                Message::SelectClass(name)
            }
            "click" => Message::Click {
                x: parse_arg(words.next(), "click", "an x coordinate")?,
                y: parse_arg(words.next(), "click", "a y coordinate")?,
            },
            "next" | "n" => Message::NextImage,
            "prev" | "p" => Message::PrevImage,
            "goto" => Message::GoTo(parse_arg(words.next(), "goto", "an image index")?),
            "render" => Message::Render(parse_arg(words.next(), "render", "an output path")?),
            "status" => Message::Status,
            "submit" => Message::Submit,
            "quit" | "exit" => Message::Quit,
            "quit!" => Message::ForceQuit,
            "help" | "?" => Message::Help,
            _ => return Err(MessageError::UnknownCommand(command.to_string())),
        };
        Ok(message)
    }
}
