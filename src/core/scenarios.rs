use log::debug;
use serde::Serialize;
use uuid::Uuid;

use super::engine::project;
use super::error::{ProjectionError, ValidationErrors};
use super::types::{ProjectionResult, SavingsPlan};
use super::validation::validate_plan;

/// Display colors handed out to saved scenarios, cycling by count.
pub const SCENARIO_PALETTE: [&str; 6] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub plan: SavingsPlan,
}

impl Scenario {
    pub fn new(name: impl Into<String>, color: impl Into<String>, plan: SavingsPlan) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            plan,
        }
    }
}

/// One slot of a comparison: the scenario and its own projection outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioProjection {
    pub scenario: Scenario,
    pub outcome: Result<ProjectionResult, ProjectionError>,
}

/// Projects every scenario independently, preserving input order. A failing
/// scenario carries its error in its own slot.
pub fn compare(scenarios: &[Scenario]) -> Vec<ScenarioProjection> {
    scenarios
        .iter()
        .map(|scenario| {
            let outcome = project(&scenario.plan.to_parameters());
            if let Err(err) = &outcome {
                debug!("scenario {} ({}) failed: {err}", scenario.name, scenario.id);
            }
            ScenarioProjection {
                scenario: scenario.clone(),
                outcome,
            }
        })
        .collect()
}

/// Saved scenarios for one session plus the marker of the last one loaded.
#[derive(Debug, Clone, Default)]
pub struct ScenarioBook {
    scenarios: Vec<Scenario>,
    active: Option<Uuid>,
}

impl ScenarioBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn active(&self) -> Option<Uuid> {
        self.active
    }

    pub fn get(&self, id: Uuid) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Snapshots `plan` as `Scenario N`. Plans that fail validation are refused.
    pub fn add(&mut self, plan: SavingsPlan) -> Result<&Scenario, ValidationErrors> {
        validate_plan(&plan)?;

        let count = self.scenarios.len();
        let scenario = Scenario::new(
            format!("Scenario {}", count + 1),
            SCENARIO_PALETTE[count % SCENARIO_PALETTE.len()],
            plan,
        );
        debug!("saved {} as {}", scenario.name, scenario.id);
        self.scenarios.push(scenario);
        Ok(&self.scenarios[count])
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Scenario> {
        let index = self.scenarios.iter().position(|s| s.id == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.scenarios.remove(index))
    }

    /// Returns a copy of the scenario's plan and marks it active.
    pub fn load(&mut self, id: Uuid) -> Option<SavingsPlan> {
        let plan = self.get(id)?.plan;
        self.active = Some(id);
        Some(plan)
    }

    pub fn clear(&mut self) {
        self.scenarios.clear();
        self.active = None;
    }

    pub fn compare(&self) -> Vec<ScenarioProjection> {
        compare(&self.scenarios)
    }
}
