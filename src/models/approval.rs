use serde::{Deserialize, Serialize};

use super::enums::Priority;

/// A solution card awaiting approval, shaped for the queue list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedApproval {
    pub id: String,
    /// The requesting (destination) facility.
    pub facility: String,
    pub request_summary: String,
    pub reason_summary: String,
    pub solution_summary: String,
    pub logistics_summary: String,
    pub priority: Priority,
    /// Raw score behind `priority`, kept for explicit sorting.
    pub priority_score: f64,
}

/// The approval queue currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApprovalQueue {
    items: Vec<NormalizedApproval>,
}

impl ApprovalQueue {
    pub fn new(items: Vec<NormalizedApproval>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[NormalizedApproval] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop an actioned card without waiting for the next fetch.
    /// Returns the removed card, if it was present.
    pub fn remove(&mut self, id: &str) -> Option<NormalizedApproval> {
        let pos = self.items.iter().position(|a| a.id == id)?;
        Some(self.items.remove(pos))
    }

    /// First card in queue order (the focus-mode card).
    pub fn head(&self) -> Option<&NormalizedApproval> {
        self.items.first()
    }
}
