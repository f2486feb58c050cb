//! On-disk format of constraint logs.
//!
//! ```json
//! {
//!   "constraints": [
//!     { "state": [0.4, 1.0, 0.0, 0.0, 0.9], "chosenAction": "blocking", "timestamp": 12.5, "epsilon": 0.01 }
//!   ]
//! }
//! ```
//!
//! Records keep the action as a free string so that one bad entry does not
//! make the whole file unreadable; see [`ConstraintFile::into_constraints`].

use serde::{Deserialize, Serialize};

use crate::{Constraint, ConstraintError, DEFAULT_EPSILON, StateVector};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintFile {
    #[serde(default)]
    pub constraints: Vec<ConstraintRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintRecord {
    pub state: Vec<f32>,
    pub chosen_action: String,
    pub timestamp: f64,
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
}

fn default_epsilon() -> f32 {
    DEFAULT_EPSILON
}

impl From<&Constraint> for ConstraintRecord {
    fn from(c: &Constraint) -> Self {
        Self {
            state: c.state().values().to_vec(),
            chosen_action: c.action().label().to_owned(),
            timestamp: c.timestamp(),
            epsilon: c.epsilon(),
        }
    }
}

impl TryFrom<&ConstraintRecord> for Constraint {
    type Error = ConstraintError;

    fn try_from(record: &ConstraintRecord) -> Result<Self, Self::Error> {
        let state = StateVector::from_slice(&record.state)?;
        let action = record.chosen_action.parse()?;
        Ok(Constraint::new(state, action, record.timestamp).with_epsilon(record.epsilon))
    }
}

impl ConstraintFile {
    #[must_use]
    pub fn from_constraints(constraints: &[Constraint]) -> Self {
        Self {
            constraints: constraints.iter().map(ConstraintRecord::from).collect(),
        }
    }

    /// Converts every well-formed record, skipping (and logging) the rest.
    #[must_use]
    pub fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
            .iter()
            .enumerate()
            .filter_map(|(i, record)| match Constraint::try_from(record) {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::warn!(index = i, error = %e, "skipping malformed constraint record");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;

    #[test]
    fn test_record_format() {
        let c = Constraint::new(
            StateVector::new([0.5, 1.0, 0.0, 0.0, 0.25]),
            Action::ShowingUp,
            2.5,
        );
        let json = serde_json::to_string(&ConstraintFile::from_constraints(&[c])).unwrap();
        assert_eq!(
            json,
            r#"{"constraints":[{"state":[0.5,1.0,0.0,0.0,0.25],"chosenAction":"showingUp","timestamp":2.5,"epsilon":0.01}]}"#
        );
    }

    #[test]
    fn test_epsilon_defaults() {
        let json = r#"{"constraints":[{"state":[0,0,0,0,0],"chosenAction":"Laser","timestamp":1}]}"#;
        let file: ConstraintFile = serde_json::from_str(json).unwrap();
        let constraints = file.into_constraints();
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].epsilon(), DEFAULT_EPSILON);
        assert_eq!(constraints[0].action(), Action::Laser);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let json = r#"{"constraints":[
            {"state":[0,0,0,0],"chosenAction":"Laser","timestamp":1},
            {"state":[0,0,0,0,0],"chosenAction":"dancing","timestamp":2},
            {"state":[0,0,0,0,0],"chosenAction":"Teleport","timestamp":3}
        ]}"#;
        let file: ConstraintFile = serde_json::from_str(json).unwrap();
        let constraints = file.into_constraints();
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].action(), Action::Teleport);
        assert!((constraints[0].timestamp() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_constraints_field() {
        let file: ConstraintFile = serde_json::from_str("{}").unwrap();
        assert!(file.constraints.is_empty());
    }
}
