//! Network-driven pose control for a frame-stepped host.
//!
//! A listener thread accepts one-shot TCP connections and queues the text it
//! reads; the host drains that queue once per frame and applies the parsed
//! [`PoseCommand`]s to the entity it owns. The entity state is never touched
//! off the frame thread.

mod components;
pub mod config;
mod link;
pub mod metrics;
pub mod network;
mod queue;
mod systems;

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

pub use components::{ControlledPose, RemoteControlled};
pub use config::{load_link_config_from_env, LinkConfig, LinkConfigError};
pub use link::PoseLink;
pub use metrics::LinkMetrics;
pub use network::{start_listener, ListenerError, ListenerHandle, ListenerState};
pub use pose_protocol::PoseCommand;
pub use queue::{MessageQueue, RawMessage};
pub use systems::{drain_into, DrainStats};

/// Registers the listener at `Startup`, the drain in `Update` and the
/// shutdown hook in `Last`.
///
/// Without an explicit config the plugin reads `POSE_LINK_CONFIG_PATH`.
#[derive(Debug, Default, Clone)]
pub struct PoseLinkPlugin {
    config: Option<LinkConfig>,
}

impl PoseLinkPlugin {
    pub fn with_config(config: LinkConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Plugin for PoseLinkPlugin {
    fn build(&self, app: &mut App) {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => load_link_config_from_env().0,
        };

        app.insert_resource(config)
            .init_resource::<MessageQueue>()
            .init_resource::<LinkMetrics>()
            .add_systems(Startup, systems::start_link_listener)
            .add_systems(
                Update,
                (systems::drain_pose_commands, systems::sync_pose_transforms).chain(),
            )
            .add_systems(Last, systems::stop_listener_on_exit);
    }
}

/// Frame pacing used when the headless app is driven by [`App::run`].
pub const HEADLESS_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Construct a headless Bevy [`App`] with one remote-controlled camera.
pub fn build_headless_app(config: LinkConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
        HEADLESS_FRAME_INTERVAL,
    )))
        .add_plugins(PoseLinkPlugin::with_config(config))
        .add_systems(Startup, spawn_controlled_camera);
    app
}

fn spawn_controlled_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("remote_camera"),
        RemoteControlled,
        ControlledPose::default(),
        TransformBundle::default(),
    ));
}

/// Advance the host by one frame.
pub fn run_frame(app: &mut App) {
    app.update();
}
