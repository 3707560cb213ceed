use std::net::SocketAddr;

use bevy::prelude::Resource;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Unparsed text received on one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    text: String,
    peer: Option<SocketAddr>,
}

impl RawMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            peer: None,
        }
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Unbounded FIFO handing messages from the listener thread to the frame loop.
///
/// Clones share the same underlying channel.
#[derive(Resource, Debug, Clone)]
pub struct MessageQueue {
    sender: Sender<RawMessage>,
    receiver: Receiver<RawMessage>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, message: RawMessage) {
        // Cannot fail: this handle keeps a receiver alive.
        let _ = self.sender.send(message);
    }

    pub fn try_dequeue(&self) -> Option<RawMessage> {
        self.receiver.try_recv().ok()
    }

    /// Yield queued messages until the queue reports empty.
    pub fn drain(&self) -> impl Iterator<Item = RawMessage> + '_ {
        self.receiver.try_iter()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
