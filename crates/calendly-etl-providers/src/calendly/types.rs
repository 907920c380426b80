//! Resource shapes returned by the Calendly API.
//!
//! Only the fields the extractor reads are modelled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Deserializer};

/// `{"resource": {...}}` wrapper used by single-resource endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceEnvelope<T> {
    pub resource: T,
}

/// One page of a collection endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionPage<T> {
    pub collection: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Cursor information attached to collection pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub count: Option<u64>,
    pub next_page: Option<String>,
    pub next_page_token: Option<String>,
    pub previous_page: Option<String>,
    pub previous_page_token: Option<String>,
}

impl Pagination {
    /// Returns the cursor for the following page, if there is one.
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// The authenticated user (`GET users/me`).
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub uri: Option<String>,
    pub name: Option<String>,
    pub current_organization: String,
}

/// A bookable meeting category.
#[derive(Debug, Clone, Deserialize)]
pub struct EventType {
    pub uri: String,
    pub name: Option<String>,
    pub active: Option<bool>,
}

/// One booked occurrence of an event type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduledEvent {
    pub uri: Option<String>,
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub invitees_counter: Option<InviteesCounter>,
    pub location: Option<Location>,
}

/// Invitee counts of a scheduled event.
///
/// A count that is not a non-negative JSON integer reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InviteesCounter {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub active: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u64>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_u64()))
}

/// Where a scheduled event takes place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<String>,
    pub join_url: Option<String>,
}
