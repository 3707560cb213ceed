//! Frame conventions between pose sources and the engine camera.
//!
//! Odometry sources publish in a right-handed, z-up frame (x forward, y left).
//! The engine camera is left-handed and y-up (z forward, x right).

use crate::commands::PoseCommand;

/// Remap a z-up odometry position into the y-up engine frame.
pub fn ros_to_engine_position(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    (-y, z, x)
}

/// Remap a z-up odometry quaternion `(w, x, y, z)` into the engine frame,
/// returned in the same scalar-first order.
pub fn ros_to_engine_quat(w: f64, x: f64, y: f64, z: f64) -> (f64, f64, f64, f64) {
    (w, y, -z, -x)
}

/// Build the position and orientation commands for an odometry pose.
pub fn ros_pose_commands(position: [f64; 3], orientation_wxyz: [f64; 4]) -> [PoseCommand; 2] {
    let (x, y, z) = ros_to_engine_position(position[0], position[1], position[2]);
    let [w, qx, qy, qz] = orientation_wxyz;
    let (qw, qx, qy, qz) = ros_to_engine_quat(w, qx, qy, qz);
    [
        PoseCommand::SetPosition { x, y, z },
        PoseCommand::SetOrientation { qx, qy, qz, qw },
    ]
}
