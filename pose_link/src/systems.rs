use bevy::app::AppExit;
use bevy::prelude::*;
use pose_protocol::{parse_message_report, PoseCommand};
use tracing::{debug, warn};

use crate::components::{ControlledPose, RemoteControlled};
use crate::config::LinkConfig;
use crate::metrics::LinkMetrics;
use crate::network::{start_listener, ListenerHandle};
use crate::queue::MessageQueue;

/// Counts for one drain pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainStats {
    pub messages: usize,
    pub commands_parsed: usize,
    pub commands_applied: usize,
    pub tokens_rejected: usize,
    pub unknown_tokens: usize,
}

impl DrainStats {
    pub fn is_empty(&self) -> bool {
        self.messages == 0
    }
}

/// Empty the queue, handing every parsed command to `apply` in arrival order.
///
/// `apply` reports whether the command reached any pose. Never blocks;
/// malformed tokens are logged and skipped.
pub fn drain_into(
    queue: &MessageQueue,
    mut apply: impl FnMut(&PoseCommand) -> bool,
) -> DrainStats {
    let mut stats = DrainStats::default();
    for message in queue.drain() {
        stats.messages += 1;
        let report = parse_message_report(message.text());
        for rejected in &report.rejected {
            debug!(
                target: "pose_link::frame",
                peer = ?message.peer(),
                token = %rejected.token.trim(),
                error = %rejected.error,
                "frame.token_rejected"
            );
        }
        stats.tokens_rejected += report.rejected.len();
        stats.unknown_tokens += report.unknown;
        stats.commands_parsed += report.commands.len();
        for command in &report.commands {
            if apply(command) {
                stats.commands_applied += 1;
            }
        }
    }
    stats
}

pub fn start_link_listener(
    mut commands: Commands,
    config: Res<LinkConfig>,
    queue: Res<MessageQueue>,
) {
    match start_listener(&config, MessageQueue::clone(&queue)) {
        Ok(handle) => commands.insert_resource(handle),
        Err(err) => warn!(
            target: "pose_link::listener",
            error = %err,
            "listener.disabled"
        ),
    }
}

pub fn drain_pose_commands(
    queue: Res<MessageQueue>,
    mut metrics: ResMut<LinkMetrics>,
    mut poses: Query<&mut ControlledPose, With<RemoteControlled>>,
) {
    let stats = drain_into(&queue, |command| {
        let mut applied = false;
        for mut pose in poses.iter_mut() {
            pose.apply(command);
            applied = true;
        }
        applied
    });
    if !stats.is_empty() {
        debug!(
            target: "pose_link::frame",
            messages = stats.messages,
            parsed = stats.commands_parsed,
            applied = stats.commands_applied,
            rejected = stats.tokens_rejected,
            "frame.drained"
        );
    }
    metrics.record(&stats);
}

pub fn sync_pose_transforms(
    mut poses: Query<(&ControlledPose, &mut Transform), Changed<ControlledPose>>,
) {
    for (pose, mut transform) in poses.iter_mut() {
        pose.write_to(&mut transform);
    }
}

pub fn stop_listener_on_exit(
    mut exits: EventReader<AppExit>,
    listener: Option<ResMut<ListenerHandle>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut listener) = listener {
        listener.stop();
    }
}
