use std::collections::VecDeque;

use bevy::prelude::*;
use serde::Serialize;

use crate::snapshot::FrameEvent;

const MAX_EVENTS: usize = 500;

#[derive(Serialize, Clone)]
pub struct GameEvent {
    pub name: String,
    pub data: serde_json::Value,
    pub frame: u64,
}

/// Recent gameplay events, newest last. Bounded; overflow is counted.
#[derive(Resource, Default)]
pub struct GameEventBus {
    pub recent: VecDeque<GameEvent>,
    pub frame: u64,
    /// Bumped once per `publish`, including paused frames that still carried events.
    pub batches: u64,
    pub dropped_events: u64,
    last_batch_len: usize,
    last_overflow_log_frame: u64,
}

impl GameEventBus {
    pub fn emit(&mut self, name: impl Into<String>, data: serde_json::Value) {
        self.recent.push_back(GameEvent {
            name: name.into(),
            data,
            frame: self.frame,
        });
        if self.recent.len() > MAX_EVENTS {
            let excess = self.recent.len() - MAX_EVENTS;
            for _ in 0..excess {
                self.recent.pop_front();
            }
            self.dropped_events = self.dropped_events.saturating_add(excess as u64);
            if self.frame.saturating_sub(self.last_overflow_log_frame) >= 60 {
                self.last_overflow_log_frame = self.frame;
                warn!(
                    "[Claire events] Dropped {} buffered events (total dropped: {})",
                    excess, self.dropped_events
                );
            }
        }
    }

    pub fn publish(&mut self, frame: u64, events: &[FrameEvent]) {
        self.frame = frame;
        self.batches = self.batches.wrapping_add(1);
        self.last_batch_len = events.len();
        for event in events {
            self.emit(event.name(), event.payload());
        }
    }

    /// Events from the most recent `publish`, newest first.
    pub fn latest_batch(&self) -> impl Iterator<Item = &GameEvent> {
        self.recent.iter().rev().take(self.last_batch_len)
    }
}
