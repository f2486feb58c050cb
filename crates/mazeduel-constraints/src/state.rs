use serde::{Deserialize, Serialize};

use crate::ConstraintError;

/// Number of features in a [`StateVector`].
pub const FEATURE_COUNT: usize = 5;

/// How long after a hit the hit flags stay raised, in game time units.
pub const HIT_WINDOW: f64 = 0.2;

/// Named positions of a [`StateVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Feature {
    #[display("distanceRatio")]
    DistanceRatio,
    #[display("mutualVisibility")]
    MutualVisibility,
    #[display("recentlyHitOpponent")]
    RecentlyHitOpponent,
    #[display("recentlyHitBySelf")]
    RecentlyHitBySelf,
    #[display("resourceRatio")]
    ResourceRatio,
}

impl Feature {
    pub const ALL: [Self; FEATURE_COUNT] = [
        Self::DistanceRatio,
        Self::MutualVisibility,
        Self::RecentlyHitOpponent,
        Self::RecentlyHitBySelf,
        Self::ResourceRatio,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Normalized description of the situation an action was chosen in.
///
/// Serializes as a plain array of five numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector([f32; FEATURE_COUNT]);

impl StateVector {
    #[must_use]
    pub const fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Builds a state from a slice, which must hold exactly five values.
    pub fn from_slice(values: &[f32]) -> Result<Self, ConstraintError> {
        let values: [f32; FEATURE_COUNT] = values
            .try_into()
            .map_err(|_| ConstraintError::InvalidStateLength { len: values.len() })?;
        Ok(Self(values))
    }

    #[must_use]
    pub const fn values(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    #[must_use]
    pub const fn get(&self, feature: Feature) -> f32 {
        self.0[feature.index()]
    }

    /// Dot product with one row of feature weights.
    #[must_use]
    pub fn dot(&self, weights: &[f32; FEATURE_COUNT]) -> f32 {
        self.0.iter().zip(weights).map(|(s, w)| s * w).sum()
    }
}

impl TryFrom<&[f32]> for StateVector {
    type Error = ConstraintError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

/// Raw observations a decision-maker gathers before scoring actions.
///
/// [`FeatureInputs::to_state`] normalizes them into a [`StateVector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureInputs {
    /// Distance between the two agents' cells.
    pub distance: f32,
    /// Largest possible distance, usually [`grid_diagonal`].
    pub max_distance: f32,
    pub mutually_visible: bool,
    /// When this agent last hit its opponent.
    pub last_hit_opponent_at: Option<f64>,
    /// When this agent was last hit by its opponent.
    pub last_hit_by_opponent_at: Option<f64>,
    pub resource: f32,
    pub max_resource: f32,
    pub now: f64,
}

impl FeatureInputs {
    #[must_use]
    pub fn to_state(&self) -> StateVector {
        let ratio = |value: f32, max: f32| {
            if max > 0.0 {
                (value / max).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        let recent = |at: Option<f64>| {
            let hit = at.is_some_and(|t| self.now - t <= HIT_WINDOW);
            if hit { 1.0 } else { 0.0 }
        };
        StateVector([
            ratio(self.distance, self.max_distance),
            if self.mutually_visible { 1.0 } else { 0.0 },
            recent(self.last_hit_opponent_at),
            recent(self.last_hit_by_opponent_at),
            ratio(self.resource, self.max_resource),
        ])
    }
}

/// Length of the diagonal of a `rows × cols` grid.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn grid_diagonal(rows: usize, cols: usize) -> f32 {
    (rows as f32).hypot(cols as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_length() {
        assert!(StateVector::from_slice(&[0.0; 5]).is_ok());
        for len in [0, 4, 6] {
            let values = vec![0.5; len];
            assert_eq!(
                StateVector::from_slice(&values),
                Err(ConstraintError::InvalidStateLength { len })
            );
        }
    }

    #[test]
    fn test_serializes_as_array() {
        let state = StateVector::new([0.5, 1.0, 0.0, 0.0, 0.25]);
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            "[0.5,1.0,0.0,0.0,0.25]"
        );
        assert!(serde_json::from_str::<StateVector>("[1,2,3]").is_err());
    }

    #[test]
    fn test_dot() {
        let state = StateVector::new([1.0, 0.0, 2.0, 0.0, 0.5]);
        assert!((state.dot(&[1.0, 9.0, 0.5, 9.0, 2.0]) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_feature_inputs() {
        let inputs = FeatureInputs {
            distance: 5.0,
            max_distance: grid_diagonal(6, 8),
            mutually_visible: true,
            last_hit_opponent_at: Some(9.9),
            last_hit_by_opponent_at: Some(9.0),
            resource: 150.0,
            max_resource: 100.0,
            now: 10.0,
        };
        let state = inputs.to_state();
        assert!((state.get(Feature::DistanceRatio) - 0.5).abs() < 1e-6);
        assert_eq!(state.get(Feature::MutualVisibility), 1.0);
        assert_eq!(state.get(Feature::RecentlyHitOpponent), 1.0);
        assert_eq!(state.get(Feature::RecentlyHitBySelf), 0.0);
        assert_eq!(state.get(Feature::ResourceRatio), 1.0);
    }

    #[test]
    fn test_feature_inputs_never_hit() {
        let inputs = FeatureInputs {
            distance: 0.0,
            max_distance: 0.0,
            mutually_visible: false,
            last_hit_opponent_at: None,
            last_hit_by_opponent_at: None,
            resource: 0.0,
            max_resource: 100.0,
            now: 0.0,
        };
        assert_eq!(inputs.to_state(), StateVector::new([0.0; 5]));
    }
}
