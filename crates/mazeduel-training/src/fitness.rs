//! Margin-ranking fitness of a policy against observed constraints.
//!
//! For each constraint, the chosen action's score is compared with every
//! alternative action's score in the same state. The difference minus the
//! constraint's epsilon is the margin; margins add up as they are, except
//! that violations (negative margins) count [`VIOLATION_PENALTY`] times.
//! A policy that ranks every chosen action first by at least its epsilon
//! therefore has positive fitness.

use mazeduel_constraints::{ACTION_COUNT, Constraint};

use crate::Policy;

/// Multiplier applied to negative margins.
pub const VIOLATION_PENALTY: f32 = 10.0;

/// Scores `policy` against `constraints`; higher is better.
///
/// Constraints with unscored actions (wall-destruction events) are ignored.
#[must_use]
pub fn evaluate(policy: &Policy, constraints: &[Constraint]) -> f32 {
    let rows = policy.rows();
    let mut score = 0.0;
    for c in constraints {
        let Some(chosen) = c.action().index() else {
            continue;
        };
        let state = c.state().values();
        for alt in (0..ACTION_COUNT).filter(|&i| i != chosen) {
            let diff: f32 = rows[chosen]
                .iter()
                .zip(&rows[alt])
                .zip(state)
                .map(|((wc, wa), s)| (wc - wa) * s)
                .sum();
            let margin = diff - c.epsilon();
            score += if margin >= 0.0 {
                margin
            } else {
                VIOLATION_PENALTY * margin
            };
        }
    }
    score
}
