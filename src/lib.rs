//! Routes application-defined triggers to analytics channels.
//!
//! ```text
//!   trigger + runtime props
//!            │
//!            ▼
//!   ┌──────────────────┐  trigger → channel → overrides
//!   │      Router      │◀──────────────── OverrideTable
//!   └────────┬─────────┘
//!            │ per channel
//!            ▼
//!   ┌──────────────────┐  channel → trigger → csv cells
//!   │   materialize    │◀──────────────── SchemaTable
//!   └────────┬─────────┘
//!            │ path::get / path::set
//!            ▼
//!     strict policy ──▶ AnalyticsClient::send_event
//! ```

pub mod clients;
pub mod config;
pub mod csv_loader;
pub mod diagnostics;
pub mod error;
pub mod logger;
pub mod manager;
pub mod materializer;
pub mod overrides;
pub mod path;
pub mod router;
pub mod schema;

pub use analytics_client::{AnalyticsClient, PropertyMap, Value};

pub type Channel = String;
pub type Trigger = String;
pub type EventKey = String;
/// Dot-separated path into a nested property map.
pub type PropertyPath = String;
