//! Secret stores, the Calendly API client, the event extractor and the
//! object storage sink.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────────┐
//! │ SecretStore  │──▶│ CredentialProvider │──▶│CalendlyClient│
//! └──────────────┘   └────────────────────┘   └──────┬───────┘
//!                                                    │
//!                                                    ▼
//!                                           ┌────────────────┐
//!                                           │ EventExtractor │
//!                                           └───────┬────────┘
//!                                                   │ Vec<EventRecord>
//!                                                   ▼
//!                     ┌─────────────┐       ┌──────────────┐
//!                     │ ObjectStore │◀──────│ StorageSink  │
//!                     └─────────────┘       └──────────────┘
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod calendly;
pub mod secret;
pub mod storage;

pub use calendly::{CalendlyClient, CalendlyConfig, EventExtractor, RecencyFilter};
pub use secret::{CredentialBundle, CredentialProvider, SecretStore};
pub use storage::{FsObjectStore, MemoryObjectStore, ObjectStore, StorageSink, UploadOutcome};

/// A boxed future for trait methods that must stay object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
