//! Scheduled event extraction.
//!
//! The extractor resolves the current organization once, lists its event
//! types, then fetches scheduled events type by type, in order, and
//! flattens them into [`EventRecord`]s. Any API failure aborts the whole
//! extraction; no partial result is returned.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use calendly_etl_core::{EtlResult, EventRecord, parse_timestamp};

use super::client::CalendlyClient;
use super::types::ScheduledEvent;

/// Start-time based exclusion of scheduled events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecencyFilter {
    /// Keep every event. Matches the output of earlier extracts.
    #[default]
    PassThrough,
    /// Drop events that started before the reference instant.
    ExcludePast,
    /// Drop events that start after the reference instant.
    ExcludeUpcoming,
}

impl RecencyFilter {
    /// Returns a stable name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassThrough => "pass-through",
            Self::ExcludePast => "exclude-past",
            Self::ExcludeUpcoming => "exclude-upcoming",
        }
    }

    /// Returns true if an event starting at `start_time` is kept.
    ///
    /// Events without a parseable start time are always kept.
    pub fn keeps(&self, start_time: Option<&str>, now: DateTime<Utc>) -> bool {
        if *self == Self::PassThrough {
            return true;
        }

        let Some(start) = start_time.and_then(parse_timestamp) else {
            warn!(
                start_time = start_time.unwrap_or_default(),
                filter = self.as_str(),
                "cannot apply recency filter to event without a valid start_time; keeping it"
            );
            return true;
        };

        match self {
            Self::PassThrough => true,
            Self::ExcludePast => start >= now,
            Self::ExcludeUpcoming => start <= now,
        }
    }
}

impl FromStr for RecencyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pass-through" | "passthrough" | "none" => Ok(Self::PassThrough),
            "exclude-past" => Ok(Self::ExcludePast),
            "exclude-upcoming" => Ok(Self::ExcludeUpcoming),
            other => Err(format!("unknown recency filter `{}`", other)),
        }
    }
}

/// Walks organization → event types → scheduled events.
#[derive(Debug)]
pub struct EventExtractor<'a> {
    client: &'a CalendlyClient,
    filter: RecencyFilter,
    now: DateTime<Utc>,
}

impl<'a> EventExtractor<'a> {
    /// Creates an extractor with the pass-through filter.
    pub fn new(client: &'a CalendlyClient) -> Self {
        Self {
            client,
            filter: RecencyFilter::PassThrough,
            now: DateTime::<Utc>::default(),
        }
    }

    /// Builder method to set the recency filter and its reference instant.
    pub fn with_recency_filter(mut self, filter: RecencyFilter, now: DateTime<Utc>) -> Self {
        self.filter = filter;
        self.now = now;
        self
    }

    /// Extracts every scheduled event of every event type of the current
    /// organization.
    ///
    /// Records are ordered by event type (API order), then by the API's
    /// order within each type.
    pub async fn extract_events(&self) -> EtlResult<Vec<EventRecord>> {
        let organization = self.client.get_current_organization().await?;
        let event_types = self.client.get_event_types(&organization).await?;
        info!(
            organization = %organization,
            event_types = event_types.len(),
            "resolved event types"
        );

        let mut records = Vec::new();
        for event_type in &event_types {
            let events = self
                .client
                .get_scheduled_events(&event_type.uri, &organization)
                .await?;

            let fetched = events.len();
            let before = records.len();
            records.extend(
                events
                    .iter()
                    .filter(|event| self.filter.keeps(event.start_time.as_deref(), self.now))
                    .map(to_event_record),
            );
            debug!(
                event_type = %event_type.uri,
                fetched,
                kept = records.len() - before,
                "fetched scheduled events"
            );
        }

        info!(records = records.len(), "extracted scheduled events");
        Ok(records)
    }
}

/// Flattens one scheduled event into an [`EventRecord`].
///
/// Absent strings become empty. The location is the join URL with every
/// literal `None` removed.
pub fn to_event_record(event: &ScheduledEvent) -> EventRecord {
    let location = event
        .location
        .as_ref()
        .and_then(|l| l.join_url.as_deref())
        .unwrap_or_default()
        .replace("None", "");

    EventRecord {
        event_id: event.uri.clone().unwrap_or_default(),
        name: event.name.clone().unwrap_or_default(),
        start_time: event.start_time.clone().unwrap_or_default(),
        end_time: event.end_time.clone().unwrap_or_default(),
        event_type: event.event_type.clone().unwrap_or_default(),
        status: event.status.clone().unwrap_or_default(),
        invitees: event.invitees_counter.as_ref().and_then(|c| c.total),
        location,
    }
}
