//! Transition events reported to the owner of the coordinator.
//!
//! The coordinator never calls back into its owner. Instead it records
//! lifecycle notifications in an [`EventQueue`] that the owner drains after
//! each call, typically once per frame.
//!
//! ```ignore
//! coordinator.step(frame_time);
//! for event in coordinator.drain_events() {
//!     match event {
//!         TransitionEvent::Finished { category: Category::Remove, item, .. } => {
//!             container.recycle(item);
//!         }
//!         TransitionEvent::AllFinished => container.animations_settled(),
//!         _ => {}
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{Category, ItemId, Occupant};

/// Lifecycle notification for the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionEvent {
    /// The tween for an item has started running.
    Starting {
        category: Category,
        item: ItemId,
        occupant: Occupant,
    },
    /// The item's animation in this category reached a terminal outcome.
    Finished {
        category: Category,
        item: ItemId,
        occupant: Occupant,
    },
    /// Every category went idle. Reported once per drain.
    AllFinished,
}

impl TransitionEvent {
    /// Item this event concerns, if any.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::Starting { item, .. } | Self::Finished { item, .. } => Some(*item),
            Self::AllFinished => None,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Starting { category, .. } | Self::Finished { category, .. } => Some(*category),
            Self::AllFinished => None,
        }
    }

    pub fn is_starting(&self) -> bool {
        matches!(self, Self::Starting { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Queue for collecting transition events between drains.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<TransitionEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TransitionEvent) {
        self.events.push_back(event);
    }

    pub(crate) fn starting(&mut self, category: Category, item: ItemId, occupant: Occupant) {
        self.push(TransitionEvent::Starting {
            category,
            item,
            occupant,
        });
    }

    pub(crate) fn finished(&mut self, category: Category, item: ItemId, occupant: Occupant) {
        self.push(TransitionEvent::Finished {
            category,
            item,
            occupant,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<TransitionEvent> {
        self.events.pop_front()
    }

    /// Drain all events in the order they were recorded.
    pub fn drain(&mut self) -> impl Iterator<Item = TransitionEvent> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransitionEvent> {
        self.events.iter()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events that concern a specific item.
    pub fn events_for_item(&self, item: ItemId) -> Vec<&TransitionEvent> {
        self.events
            .iter()
            .filter(|e| e.item() == Some(item))
            .collect()
    }
}
