use serde::{Deserialize, Serialize};

/// Keyword that prefixes a position command on the wire.
pub const SET_POSITION: &str = "SET_POSITION";
/// Keyword that prefixes a quaternion command on the wire.
pub const SET_QUAT: &str = "SET_QUAT";
/// Separator between commands batched into a single message.
pub const COMMAND_DELIMITER: char = '|';

/// A fully validated instruction to mutate the controlled pose.
///
/// Quaternion components are held in `(x, y, z, w)` order even though the wire
/// carries them as `w,x,y,z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PoseCommand {
    SetPosition {
        x: f64,
        y: f64,
        z: f64,
    },
    SetOrientation {
        qx: f64,
        qy: f64,
        qz: f64,
        qw: f64,
    },
}

impl PoseCommand {
    pub fn keyword(&self) -> &'static str {
        match self {
            PoseCommand::SetPosition { .. } => SET_POSITION,
            PoseCommand::SetOrientation { .. } => SET_QUAT,
        }
    }

    /// Render the command in its wire form, e.g. `SET_QUAT 1,0,0,0`.
    pub fn to_wire(&self) -> String {
        let keyword = self.keyword();
        match *self {
            PoseCommand::SetPosition { x, y, z } => format!("{keyword} {x},{y},{z}"),
            PoseCommand::SetOrientation { qx, qy, qz, qw } => {
                format!("{keyword} {qw},{qx},{qy},{qz}")
            }
        }
    }
}

/// Join several commands into one pipe-delimited message.
pub fn encode_batch(commands: &[PoseCommand]) -> String {
    commands
        .iter()
        .map(PoseCommand::to_wire)
        .collect::<Vec<_>>()
        .join(COMMAND_DELIMITER.to_string().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quaternion_is_written_scalar_first() {
        let command = PoseCommand::SetOrientation {
            qx: 0.1,
            qy: 0.2,
            qz: 0.3,
            qw: 0.9,
        };
        assert_eq!(command.to_wire(), "SET_QUAT 0.9,0.1,0.2,0.3");
    }

    #[test]
    fn batch_uses_pipe_delimiter() {
        let message = encode_batch(&[
            PoseCommand::SetPosition {
                x: 1.0,
                y: 2.5,
                z: -3.0,
            },
            PoseCommand::SetOrientation {
                qx: 0.0,
                qy: 0.0,
                qz: 0.0,
                qw: 1.0,
            },
        ]);
        assert_eq!(message, "SET_POSITION 1,2.5,-3|SET_QUAT 1,0,0,0");
    }

    #[test]
    fn keyword_matches_wire_prefix() {
        let position = PoseCommand::SetPosition {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        };
        assert_eq!(position.keyword(), SET_POSITION);
        assert!(position.to_wire().starts_with(position.keyword()));
    }

    #[test]
    fn json_keeps_quaternion_components_by_name() {
        let command = PoseCommand::SetOrientation {
            qx: 0.1,
            qy: 0.2,
            qz: 0.3,
            qw: 0.9,
        };
        let json = serde_json::to_value(command).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "SetOrientation": { "qx": 0.1, "qy": 0.2, "qz": 0.3, "qw": 0.9 }
            })
        );

        let decoded: PoseCommand = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn empty_batch_encodes_to_empty_message() {
        assert_eq!(encode_batch(&[]), "");
    }
}
