use uuid::Uuid;

use super::error::ValidationErrors;
use super::scenarios::{Scenario, ScenarioBook};
use super::types::SavingsPlan;

pub const NOTES_MAX_CHARS: usize = 500;

/// In-memory state of one user session: the active plan, saved scenarios and
/// free-text notes. Nothing here outlives the process.
#[derive(Debug, Clone, Default)]
pub struct Session {
    plan: SavingsPlan,
    book: ScenarioBook,
    notes: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> SavingsPlan {
        self.plan
    }

    /// Replaces the active plan. Unvalidated plans are allowed; the boundary
    /// reports their violations instead of projecting them.
    pub fn set_plan(&mut self, plan: SavingsPlan) {
        self.plan = plan;
    }

    pub fn book(&self) -> &ScenarioBook {
        &self.book
    }

    pub fn save_scenario(&mut self) -> Result<&Scenario, ValidationErrors> {
        self.book.add(self.plan)
    }

    pub fn remove_scenario(&mut self, id: Uuid) -> Option<Scenario> {
        self.book.remove(id)
    }

    /// Copies the scenario's plan into the active plan.
    pub fn load_scenario(&mut self, id: Uuid) -> Option<SavingsPlan> {
        let plan = self.book.load(id)?;
        self.plan = plan;
        Some(plan)
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Stores notes, truncated to [`NOTES_MAX_CHARS`] characters.
    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.chars().take(NOTES_MAX_CHARS).collect();
    }

    /// Back to the default plan with no scenarios and no notes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
