//! Event domain model.
//!
//! An Event is the top of the containment hierarchy: a named activity that
//! Tasks plan concretely. It carries no time range of its own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for events.
pub type EventId = Uuid;

/// Named activity definition, optionally a reusable template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Ordinal priority, nominally 1-5. Not validated.
    pub priority: i32,
    pub category: String,
    /// Marks the event as a reusable template.
    pub is_template: bool,
}

impl Event {
    /// Creates an event with a generated ID and empty optional fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates an event with a caller-provided ID.
    pub fn with_id(id: EventId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            location: String::new(),
            priority: 0,
            category: String::new(),
            is_template: false,
        }
    }
}
