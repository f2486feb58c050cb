use anyhow::{bail, ensure};
use chrono::{DateTime, Utc};
use mazeduel_constraints::{ACTION_COUNT, Action, FEATURE_COUNT};
use mazeduel_training::Policy;
use serde::{Deserialize, Serialize};

/// Trained policy as written by `train` and read by `choose`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f32,
    /// One entry per scoreable action, in weight-row order.
    pub actions: Vec<TrainedAction>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainedAction {
    pub action: Action,
    pub weights: [f32; FEATURE_COUNT],
}

impl PolicyModel {
    pub fn new(name: String, final_fitness: f32, policy: &Policy) -> Self {
        let actions = Action::PRIMARY
            .into_iter()
            .zip(policy.rows())
            .map(|(action, weights)| TrainedAction {
                action,
                weights: *weights,
            })
            .collect();
        Self {
            name,
            trained_at: Utc::now(),
            final_fitness,
            actions,
        }
    }

    /// Rebuilds the policy. Entries may come in any order, but every
    /// scoreable action must appear exactly once.
    pub fn to_policy(&self) -> anyhow::Result<Policy> {
        let mut rows = [[0.0; FEATURE_COUNT]; ACTION_COUNT];
        let mut seen = [false; ACTION_COUNT];
        for entry in &self.actions {
            let Some(index) = entry.action.index() else {
                bail!("action {} in model cannot be scored", entry.action);
            };
            ensure!(!seen[index], "action {} appears twice in model", entry.action);
            seen[index] = true;
            rows[index] = entry.weights;
        }
        if let Some(missing) = Action::PRIMARY.into_iter().find(|a| a.index().is_some_and(|i| !seen[i])) {
            bail!("action {missing} missing from model");
        }
        Ok(Policy::from_rows(rows))
    }
}
