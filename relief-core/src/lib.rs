pub mod demo;
pub mod display;
pub mod error;
pub mod feed;
pub mod incident;
pub mod reconciler;
pub mod report;
pub mod route;
pub mod session;
pub mod stats;
#[cfg(feature = "store")]
pub mod store;
pub mod style;

pub use error::{FeedError, ValidationError};
pub use feed::{Delivery, FeedState, SnapshotSink};
pub use incident::{Coordinates, Incident, IncidentPatch, IncidentType, NewIncident, Severity, Status};
