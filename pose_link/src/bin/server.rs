use bevy::prelude::*;
use tracing::info;

use pose_link::{build_headless_app, load_link_config_from_env, ControlledPose};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, config_path) = load_link_config_from_env();
    info!(
        bind = %config.bind,
        config = ?config_path,
        "Pose link headless host ready"
    );

    let mut app = build_headless_app(config);
    app.add_systems(PostUpdate, report_pose_changes);
    app.run();
}

fn report_pose_changes(poses: Query<(&Name, &ControlledPose), Changed<ControlledPose>>) {
    for (name, pose) in poses.iter() {
        let p = pose.position;
        let q = pose.orientation;
        info!(
            target: "pose_link::frame",
            entity = %name,
            x = p.x,
            y = p.y,
            z = p.z,
            qx = q.x,
            qy = q.y,
            qz = q.z,
            qw = q.w,
            "pose.updated"
        );
    }
}
