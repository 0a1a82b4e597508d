//! Hook registry for conversation hooks
//!
//! The registry handles:
//! - Hook registration
//! - Priority-based hook ordering
//! - Timeout enforcement for individual hooks
//! - Safe failure handling (failed hooks don't stop turns)

use super::traits::{ConversationHook, HookResult, RelationshipSignal};
use crate::conversation::{ConversationFlow, ConversationTurn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::error::Elapsed;
use tracing::{debug, warn};

/// Entry in the hook registry
#[derive(Debug)]
struct HookEntry {
    hook: Arc<dyn ConversationHook>,
    priority: i32,
}

/// Registry for conversation hooks
///
/// Hooks are executed in priority order (higher priority first); equal priorities
/// run in name order. Clones share the same hook list.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: Arc<RwLock<Vec<HookEntry>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new hook
    pub async fn register(&self, hook: Arc<dyn ConversationHook>) {
        let priority = hook.priority();
        let name = hook.name().to_string();
        let mut hooks = self.hooks.write().await;

        hooks.push(HookEntry { hook, priority });
        hooks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.hook.name().cmp(b.hook.name()))
        });

        debug!("Hook registered: {} (priority: {})", name, priority);
    }

    /// Run `on_turn_completed` on every hook
    pub async fn execute_turn_completed(&self, flow: &ConversationFlow, turn: &ConversationTurn) {
        let hooks = self.hooks.read().await;

        for entry in hooks.iter() {
            let hook = &entry.hook;
            let timeout_ms = hook.timeout_ms();
            let outcome = tokio::time::timeout(
                Duration::from_millis(timeout_ms),
                hook.on_turn_completed(flow, turn),
            )
            .await;
            report(hook.name(), timeout_ms, outcome);
        }
    }

    /// Run `on_relationship_signal` on every hook
    pub async fn execute_relationship_signal(&self, signal: &RelationshipSignal) {
        let hooks = self.hooks.read().await;

        for entry in hooks.iter() {
            let hook = &entry.hook;
            let timeout_ms = hook.timeout_ms();
            let outcome = tokio::time::timeout(
                Duration::from_millis(timeout_ms),
                hook.on_relationship_signal(signal),
            )
            .await;
            report(hook.name(), timeout_ms, outcome);
        }
    }

    pub async fn hook_count(&self) -> usize {
        self.hooks.read().await.len()
    }

    pub async fn clear(&self) {
        self.hooks.write().await.clear();
        debug!("All hooks cleared from registry");
    }

    /// Hook names and priorities in execution order
    pub async fn list_hooks(&self) -> Vec<(String, i32)> {
        self.hooks
            .read()
            .await
            .iter()
            .map(|entry| (entry.hook.name().to_string(), entry.priority))
            .collect()
    }
}

fn report(name: &str, timeout_ms: u64, outcome: Result<HookResult, Elapsed>) {
    match outcome {
        Ok(HookResult::Continue) => debug!("Hook '{}' completed successfully", name),
        Ok(HookResult::Failed(reason)) => warn!("Hook '{}' failed: {}", name, reason),
        Err(_) => warn!("Hook '{}' timed out after {}ms", name, timeout_ms),
    }
}
