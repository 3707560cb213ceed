use std::num::ParseFloatError;

use thiserror::Error;

use crate::commands::{PoseCommand, COMMAND_DELIMITER, SET_POSITION, SET_QUAT};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandParseError {
    #[error("{keyword} expects {expected} fields, got {found}")]
    FieldCount {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid float '{value}' for {context}: {source}")]
    InvalidFloat {
        value: String,
        context: &'static str,
        source: ParseFloatError,
    },
    #[error("non-finite value '{value}' for {context}")]
    NonFinite {
        value: String,
        context: &'static str,
    },
}

/// A token that carried a known keyword but could not be turned into a command.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedToken {
    pub token: String,
    pub error: CommandParseError,
}

/// Outcome of parsing one message, keeping the rejected tokens alongside the
/// commands so callers can count and log drops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub commands: Vec<PoseCommand>,
    pub rejected: Vec<RejectedToken>,
    pub unknown: usize,
}

/// Parse a raw message into the commands it carries, in order.
///
/// Malformed tokens and unknown keywords are dropped individually; the valid
/// siblings in the same message are still returned.
pub fn parse_message(raw: &str) -> Vec<PoseCommand> {
    parse_message_report(raw).commands
}

pub fn parse_message_report(raw: &str) -> ParseReport {
    let mut report = ParseReport::default();
    for token in raw.split(COMMAND_DELIMITER) {
        if token.trim().is_empty() {
            continue;
        }
        match parse_command_token(token) {
            Ok(Some(command)) => report.commands.push(command),
            Ok(None) => report.unknown += 1,
            Err(error) => report.rejected.push(RejectedToken {
                token: token.to_string(),
                error,
            }),
        }
    }
    report
}

/// Parse a single pipe-free token.
///
/// Returns `Ok(None)` when the token does not start with a known keyword.
pub fn parse_command_token(token: &str) -> Result<Option<PoseCommand>, CommandParseError> {
    let token = token.trim_start();
    if let Some(rest) = token.strip_prefix(SET_POSITION) {
        let [x, y, z] = parse_fields::<3>(rest, SET_POSITION)?;
        return Ok(Some(PoseCommand::SetPosition { x, y, z }));
    }
    if let Some(rest) = token.strip_prefix(SET_QUAT) {
        let [qw, qx, qy, qz] = parse_fields::<4>(rest, SET_QUAT)?;
        return Ok(Some(PoseCommand::SetOrientation { qx, qy, qz, qw }));
    }
    Ok(None)
}

fn parse_fields<const N: usize>(
    rest: &str,
    keyword: &'static str,
) -> Result<[f64; N], CommandParseError> {
    let fields: Vec<&str> = rest.trim().split(',').collect();
    if fields.len() != N {
        return Err(CommandParseError::FieldCount {
            keyword,
            expected: N,
            found: fields.len(),
        });
    }

    let mut values = [0.0; N];
    for (slot, field) in values.iter_mut().zip(fields) {
        *slot = parse_f64(field.trim(), keyword)?;
    }
    Ok(values)
}

fn parse_f64(value: &str, context: &'static str) -> Result<f64, CommandParseError> {
    let parsed = value
        .parse::<f64>()
        .map_err(|source| CommandParseError::InvalidFloat {
            value: value.to_string(),
            context,
            source,
        })?;
    if !parsed.is_finite() {
        return Err(CommandParseError::NonFinite {
            value: value.to_string(),
            context,
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(x: f64, y: f64, z: f64) -> PoseCommand {
        PoseCommand::SetPosition { x, y, z }
    }

    #[test]
    fn position_token_yields_one_command() {
        assert_eq!(
            parse_message("SET_POSITION 1.0,2.5,-3.0"),
            vec![position(1.0, 2.5, -3.0)]
        );
    }

    #[test]
    fn quaternion_fields_are_reordered_from_wire() {
        assert_eq!(
            parse_message("SET_QUAT 0.5,0.1,0.2,0.3"),
            vec![PoseCommand::SetOrientation {
                qx: 0.1,
                qy: 0.2,
                qz: 0.3,
                qw: 0.5,
            }]
        );
    }

    #[test]
    fn batch_preserves_order() {
        let commands = parse_message("SET_POSITION 1,2,3|SET_QUAT 1,0,0,0|SET_POSITION 4,5,6");
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], position(1.0, 2.0, 3.0));
        assert_eq!(commands[2], position(4.0, 5.0, 6.0));
    }

    #[test]
    fn wrong_arity_drops_only_that_token() {
        let report = parse_message_report("SET_POSITION 1,2|SET_POSITION 7,8,9");
        assert_eq!(report.commands, vec![position(7.0, 8.0, 9.0)]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(
            report.rejected[0].error,
            CommandParseError::FieldCount {
                keyword: SET_POSITION,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn non_numeric_field_drops_token() {
        let report = parse_message_report("SET_QUAT 1,0,zero,0|SET_POSITION 1,1,1");
        assert_eq!(report.commands, vec![position(1.0, 1.0, 1.0)]);
        assert!(matches!(
            report.rejected[0].error,
            CommandParseError::InvalidFloat { .. }
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(matches!(
            parse_command_token("SET_POSITION NaN,0,0"),
            Err(CommandParseError::NonFinite { .. })
        ));
        assert!(parse_message("SET_POSITION inf,0,0").is_empty());
    }

    #[test]
    fn unknown_keywords_are_skipped() {
        let report = parse_message_report("SET_ROTATION 10,20,30|SET_POSITION 0,0,1");
        assert_eq!(report.commands, vec![position(0.0, 0.0, 1.0)]);
        assert_eq!(report.unknown, 1);
        assert!(report.rejected.is_empty());
        assert_eq!(parse_command_token("PING"), Ok(None));
    }

    #[test]
    fn empty_tokens_are_ignored() {
        assert_eq!(
            parse_message("||SET_POSITION 1,2,3|| |"),
            vec![position(1.0, 2.0, 3.0)]
        );
        assert!(parse_message("").is_empty());
    }

    #[test]
    fn whitespace_around_fields_is_tolerated() {
        assert_eq!(
            parse_message(" SET_POSITION  1.0, 2.0 ,3.0\r\n"),
            vec![position(1.0, 2.0, 3.0)]
        );
    }

    #[test]
    fn trailing_comma_counts_as_extra_field() {
        assert!(parse_message("SET_POSITION 1,2,3,").is_empty());
    }
}
