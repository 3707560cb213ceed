use bevy::prelude::*;

use crate::systems::DrainStats;

#[derive(Resource, Default, Debug, Clone)]
pub struct LinkMetrics {
    pub frames: u64,
    pub messages_drained: u64,
    pub commands_parsed: u64,
    pub commands_applied: u64,
    pub tokens_rejected: u64,
    pub unknown_tokens: u64,
    pub last_drain: usize,
}

impl LinkMetrics {
    pub fn record(&mut self, stats: &DrainStats) {
        self.frames += 1;
        self.messages_drained += stats.messages as u64;
        self.commands_parsed += stats.commands_parsed as u64;
        self.commands_applied += stats.commands_applied as u64;
        self.tokens_rejected += stats.tokens_rejected as u64;
        self.unknown_tokens += stats.unknown_tokens as u64;
        self.last_drain = stats.messages;
    }
}
