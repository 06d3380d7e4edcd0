//! Cycle state machine and the memory carried between cycles.

use crate::{dedup::DedupGuard, event::MarketEvent};
use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a discovery cycle is currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CycleState {
    Idle,
    Running,
}

/// Reentrancy guard for discovery cycles.
#[derive(Debug, Default)]
pub struct CycleGate {
    running: AtomicBool,
}

impl CycleGate {
    pub fn state(&self) -> CycleState {
        if self.running.load(Ordering::Acquire) {
            CycleState::Running
        } else {
            CycleState::Idle
        }
    }

    /// Move `Idle -> Running`, or `None` if a cycle is already running.
    ///
    /// The returned permit moves the gate back to `Idle` when dropped.
    pub fn try_enter(&self) -> Option<CyclePermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CyclePermit { gate: self })
    }
}

/// Held for the duration of one cycle.
#[derive(Debug)]
pub struct CyclePermit<'a> {
    gate: &'a CycleGate,
}

impl Drop for CyclePermit<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
    }
}

/// Identifier churn of one venue between two consecutive cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierDiff {
    pub added: Vec<SmolStr>,
    pub removed: Vec<SmolStr>,
}

impl IdentifierDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Identifiers a venue listed in the previous cycle.
#[derive(Debug, Clone, Default)]
pub struct IdentifierSnapshot {
    ids: FnvHashSet<SmolStr>,
}

impl IdentifierSnapshot {
    /// Replace the snapshot with `events` and report what changed.
    ///
    /// `added` keeps the order of `events`; `removed` is sorted.
    pub fn replace(&mut self, events: &[MarketEvent]) -> IdentifierDiff {
        let current: FnvHashSet<SmolStr> = events.iter().map(|e| e.id.clone()).collect();

        let mut added = Vec::new();
        let mut listed: FnvHashSet<&SmolStr> = FnvHashSet::default();
        for event in events {
            if !self.ids.contains(&event.id) && listed.insert(&event.id) {
                added.push(event.id.clone());
            }
        }

        let mut removed: Vec<SmolStr> = self.ids.difference(&current).cloned().collect();
        removed.sort();

        self.ids = current;
        IdentifierDiff { added, removed }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// All state that survives from one cycle to the next.
///
/// Created with the coordinator, mutated only inside a cycle, never persisted.
#[derive(Debug, Clone, Default)]
pub struct CycleMemory {
    pub dedup: DedupGuard,
    pub previous_source: IdentifierSnapshot,
    pub previous_target: IdentifierSnapshot,
}
