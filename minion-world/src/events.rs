//! HUD text for minion notifications.
//!
//! The core emits structured [`MinionEvent`]s; this module turns them into
//! the short lines a host shows on screen and keeps a bounded feed.

use std::collections::VecDeque;

use minion_core::MinionEvent;

/// English HUD line for a notification.
#[must_use]
pub fn hud_text(event: &MinionEvent) -> String {
    match event {
        MinionEvent::Following { .. } => "Following.".to_string(),
        MinionEvent::Staying { .. } => "Not following.".to_string(),
        MinionEvent::FollowDenied { .. } => {
            "You lack the willpower to control another follower.".to_string()
        }
        MinionEvent::Renegade { name, .. } => format!("{name} has broken free of your control!"),
        MinionEvent::TookItem { name, item, .. } => format!("{name} picked up {item}."),
        MinionEvent::EquippedItem { name, item, .. } => format!("{name} equipped {item}."),
    }
}

/// A bounded feed of rendered HUD lines, newest last.
#[derive(Debug, Clone)]
pub struct HudFeed {
    lines: VecDeque<String>,
    capacity: usize,
}

impl HudFeed {
    /// A feed keeping at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Render and append events, dropping the oldest lines past capacity.
    pub fn extend<'a>(&mut self, events: impl IntoIterator<Item = &'a MinionEvent>) {
        for event in events {
            self.lines.push_back(hud_text(event));
            while self.lines.len() > self.capacity {
                self.lines.pop_front();
            }
        }
    }

    /// Current lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Number of lines shown.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the feed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
