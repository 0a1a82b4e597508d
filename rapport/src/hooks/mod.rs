//! Conversation hooks
//!
//! Callbacks fired by the orchestrator after each committed turn and whenever a turn
//! talks about relationships. Relationship state is never touched by the orchestrator
//! directly; register an [`InteractionSimulatorHook`] to let conversations drive the
//! interaction simulator.
//!
//! - `traits.rs`: `ConversationHook`, `HookResult` and `RelationshipSignal`
//! - `registry.rs`: `HookRegistry`, priority ordering and per-hook timeouts
//! - `simulator.rs`: `InteractionSimulatorHook`

pub mod registry;
pub mod simulator;
pub mod traits;

pub use registry::HookRegistry;
pub use simulator::InteractionSimulatorHook;
pub use traits::{ConversationHook, HookResult, RelationshipSignal};
