use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;
use pose_protocol::PoseCommand;

/// Marks an entity whose [`ControlledPose`] follows remote pose commands.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct RemoteControlled;

/// Double-precision pose driven by the link.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ControlledPose {
    pub position: DVec3,
    pub orientation: DQuat,
}

impl Default for ControlledPose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
        }
    }
}

impl ControlledPose {
    /// Replace the field the command targets. The quaternion is stored as sent,
    /// without normalizing.
    pub fn apply(&mut self, command: &PoseCommand) {
        match *command {
            PoseCommand::SetPosition { x, y, z } => {
                self.position = DVec3::new(x, y, z);
            }
            PoseCommand::SetOrientation { qx, qy, qz, qw } => {
                self.orientation = DQuat::from_xyzw(qx, qy, qz, qw);
            }
        }
    }

    pub fn translation(&self) -> Vec3 {
        self.position.as_vec3()
    }

    pub fn rotation(&self) -> Quat {
        let q = self.orientation;
        Quat::from_xyzw(q.x as f32, q.y as f32, q.z as f32, q.w as f32)
    }

    pub fn write_to(&self, transform: &mut Transform) {
        transform.translation = self.translation();
        transform.rotation = self.rotation();
    }
}
