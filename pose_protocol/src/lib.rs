//! Wire contract for the pose link.
//!
//! Holds the typed pose commands and the pipe-delimited text codec shared by
//! the listener-side runtime in `pose_link` and the sender tooling, without
//! depending on Bevy.

mod command_text;
mod commands;
pub mod frames;

pub use command_text::{
    parse_command_token, parse_message, parse_message_report, CommandParseError, ParseReport,
    RejectedToken,
};
pub use commands::{encode_batch, PoseCommand, COMMAND_DELIMITER, SET_POSITION, SET_QUAT};
