//! Core types and services for finding waste collection points.

/// Region and item catalogs.
pub mod catalog;
/// Runtime configuration.
pub mod config;
/// Contact links for collection points.
pub mod contact;
/// Error taxonomy.
pub mod error;
/// Session state driving the region → points → detail flow.
pub mod explorer;
/// Generation-tagged request tickets.
pub mod gate;
/// Domain models and identifiers.
pub mod model;
/// Traits describing the provider interfaces.
pub mod ports;
/// Map viewport and markers.
pub mod projector;
/// Bundle of provider ports.
pub mod providers;
/// Collection point retrieval.
pub mod repository;
/// Validated navigation targets.
pub mod route;
/// Selection state machine.
pub mod selection;
/// High-level service facade used by clients.
pub mod service;

pub use catalog::*;
pub use config::*;
pub use contact::*;
pub use error::*;
pub use explorer::*;
pub use gate::*;
pub use model::*;
pub use ports::*;
pub use projector::*;
pub use providers::*;
pub use repository::*;
pub use route::*;
pub use selection::*;
pub use service::*;
