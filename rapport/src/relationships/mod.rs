//! Relationship Dynamics
//!
//! Tracks the bond between pairs of characters and evolves it through interactions
//! and conflicts:
//!
//! - `types`: records, events and their enums
//! - `store`: per-record locked storage (`RelationshipStore`, in-memory default)
//! - `registry`: create / get / update / list
//! - `simulator`: interaction events
//! - `conflict`: conflict creation, resolution and strategy suggestions
//! - `analytics`: health, predictions, network statistics and arcs

pub mod analytics;
pub mod conflict;
pub mod registry;
pub mod simulator;
pub mod store;
pub mod types;

pub use analytics::{ArcShape, HealthReport, NetworkSummary, RelationshipAnalytics, RelationshipArc};
pub use conflict::{ConflictResolver, RESOLUTION_STRATEGIES};
pub use registry::RelationshipRegistry;
pub use simulator::InteractionSimulator;
pub use store::{InMemoryRelationshipStore, RecordHandle, RelationshipStore};
pub use types::{
    CommunicationStyle, EventType, FuturePotential, PowerDynamic, RelationshipEvent,
    RelationshipKey, RelationshipPatch, RelationshipRecord, RelationshipStatus, RelationshipType,
};
