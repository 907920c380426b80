//! Tabular records produced by a run.
//!
//! [`EventRecord`] is the flattened form of one scheduled event and
//! [`MetricRecord`] summarises every event sharing a name. Field order is
//! the CSV column order.

use serde::{Deserialize, Serialize};

/// One scheduled event, flattened for the raw extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// The scheduled event URI.
    pub event_id: String,
    /// Display name of the event.
    pub name: String,
    /// ISO-8601 start timestamp as returned by the API.
    pub start_time: String,
    /// ISO-8601 end timestamp as returned by the API.
    pub end_time: String,
    /// URI of the event type this event belongs to.
    pub event_type: String,
    /// Event status (`active`, `canceled`, ...).
    pub status: String,
    /// Total invitee count; empty cell when the API omitted it.
    pub invitees: Option<u64>,
    /// Join URL of the meeting location.
    pub location: String,
}

impl EventRecord {
    /// Creates a record with the given id and name and empty other fields.
    pub fn new(event_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder method to set start and end timestamps.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = start.into();
        self.end_time = end.into();
        self
    }

    /// Builder method to set the invitee count.
    pub fn with_invitees(mut self, invitees: u64) -> Self {
        self.invitees = Some(invitees);
        self
    }

    /// Builder method to set the event type URI.
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

/// Per-name summary of the raw extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// The event name this row summarises.
    pub name: String,
    /// Number of events with this name.
    pub scheduled_events: u64,
    /// Sum of invitees; missing counts contribute 0.
    pub total_invitees: u64,
    /// Mean event duration in minutes.
    pub avg_duration: f64,
}
