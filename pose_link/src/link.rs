use std::net::SocketAddr;

use tracing::warn;

use crate::components::ControlledPose;
use crate::config::LinkConfig;
use crate::network::{start_listener, ListenerHandle, ListenerState};
use crate::queue::MessageQueue;
use crate::systems::{drain_into, DrainStats};

/// Pose link for hosts that drive their own frame loop instead of a Bevy
/// schedule.
///
/// ```no_run
/// use pose_link::{ControlledPose, LinkConfig, PoseLink};
///
/// let mut link = PoseLink::start(&LinkConfig::default());
/// let mut camera = ControlledPose::default();
/// for _frame in 0..600 {
///     link.per_frame_tick(&mut camera);
/// }
/// link.stop();
/// ```
#[derive(Debug)]
pub struct PoseLink {
    queue: MessageQueue,
    listener: Option<ListenerHandle>,
}

impl PoseLink {
    /// Bind and spawn the listener. A bind failure is logged and leaves the
    /// link inert: frames keep ticking, nothing arrives.
    pub fn start(config: &LinkConfig) -> Self {
        let queue = MessageQueue::new();
        let listener = match start_listener(config, queue.clone()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(
                    target: "pose_link::listener",
                    error = %err,
                    "listener.disabled"
                );
                None
            }
        };
        Self { queue, listener }
    }

    pub fn is_listening(&self) -> bool {
        self.listener
            .as_ref()
            .is_some_and(ListenerHandle::is_running)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(ListenerHandle::local_addr)
    }

    pub fn listener_state(&self) -> ListenerState {
        self.listener
            .as_ref()
            .map_or(ListenerState::Stopped, ListenerHandle::state)
    }

    pub fn queue(&self) -> &MessageQueue {
        &self.queue
    }

    /// Apply everything received since the previous tick.
    pub fn per_frame_tick(&mut self, pose: &mut ControlledPose) -> DrainStats {
        drain_into(&self.queue, |command| {
            pose.apply(command);
            true
        })
    }

    /// Stop and join the listener thread. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::math::DVec3;

    use super::*;
    use crate::queue::RawMessage;

    #[test]
    fn inert_link_still_ticks() {
        let holder = PoseLink::start(&LinkConfig::ephemeral());
        let taken = holder.local_addr().unwrap();

        let mut link = PoseLink::start(&LinkConfig::ephemeral().with_bind(taken));
        assert!(!link.is_listening());
        assert_eq!(link.local_addr(), None);
        assert_eq!(link.listener_state(), ListenerState::Stopped);

        link.queue().enqueue(RawMessage::new("SET_POSITION 3,2,1"));
        let mut pose = ControlledPose::default();
        let stats = link.per_frame_tick(&mut pose);
        assert_eq!(stats.commands_applied, 1);
        assert_eq!(pose.position, DVec3::new(3.0, 2.0, 1.0));
        link.stop();
    }

    #[test]
    fn stop_is_idempotent() {
        let mut link = PoseLink::start(&LinkConfig::ephemeral());
        assert!(link.is_listening());
        link.stop();
        link.stop();
        assert!(!link.is_listening());
        assert_eq!(link.listener_state(), ListenerState::Stopped);
    }
}
