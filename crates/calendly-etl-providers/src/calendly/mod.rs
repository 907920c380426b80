//! Calendly scheduling API.
//!
//! This module provides the [`CalendlyClient`] that issues authenticated
//! read requests against `https://api.calendly.com/`, and the
//! [`EventExtractor`] that walks organization → event types → scheduled
//! events and flattens the result into [`EventRecord`]s.
//!
//! # Example
//!
//! ```ignore
//! use calendly_etl_providers::calendly::{CalendlyClient, CalendlyConfig, EventExtractor};
//!
//! let client = CalendlyClient::new(CalendlyConfig::default(), credentials)?;
//! let records = EventExtractor::new(&client).extract_events().await?;
//! ```
//!
//! [`EventRecord`]: calendly_etl_core::EventRecord

mod client;
mod config;
mod extract;
mod types;

pub use client::CalendlyClient;
pub use config::CalendlyConfig;
pub use extract::{EventExtractor, RecencyFilter, to_event_record};
pub use types::{
    CollectionPage, EventType, InviteesCounter, Location, Pagination, ResourceEnvelope,
    ScheduledEvent, User,
};
