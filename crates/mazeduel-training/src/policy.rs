use mazeduel_constraints::{ACTION_COUNT, Action, FEATURE_COUNT, StateVector};

/// Number of weights in a [`Policy`]: one row per scoreable action.
pub const WEIGHT_COUNT: usize = ACTION_COUNT * FEATURE_COUNT;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PolicyError {
    #[display("policy must have {} weights, got {len}", WEIGHT_COUNT)]
    InvalidLength { len: usize },
}

/// Linear action-scoring policy.
///
/// Holds a 7×5 weight matrix, one row per [`Action::PRIMARY`] entry. An
/// action's score in a state is the dot product of its row with the state.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    rows: [[f32; FEATURE_COUNT]; ACTION_COUNT],
}

impl Policy {
    /// Builds a policy from a flat, row-major list of 35 weights.
    ///
    /// # Example
    ///
    /// ```
    /// use mazeduel_training::{Policy, PolicyError};
    ///
    /// assert!(Policy::new(vec![0.0; 35]).is_ok());
    /// assert_eq!(Policy::new(vec![0.0; 34]), Err(PolicyError::InvalidLength { len: 34 }));
    /// ```
    pub fn new(weights: Vec<f32>) -> Result<Self, PolicyError> {
        let len = weights.len();
        if len != WEIGHT_COUNT {
            return Err(PolicyError::InvalidLength { len });
        }
        let mut policy = Self::zeros();
        policy.weights_mut().copy_from_slice(&weights);
        Ok(policy)
    }

    #[must_use]
    pub const fn zeros() -> Self {
        Self {
            rows: [[0.0; FEATURE_COUNT]; ACTION_COUNT],
        }
    }

    #[must_use]
    pub const fn from_rows(rows: [[f32; FEATURE_COUNT]; ACTION_COUNT]) -> Self {
        Self { rows }
    }

    /// Flat, row-major view of the weights.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        self.rows.as_flattened()
    }

    pub fn weights_mut(&mut self) -> &mut [f32] {
        self.rows.as_flattened_mut()
    }

    #[must_use]
    pub fn rows(&self) -> &[[f32; FEATURE_COUNT]; ACTION_COUNT] {
        &self.rows
    }

    /// Weights of `action`, `None` for actions that are never scored.
    #[must_use]
    pub fn row(&self, action: Action) -> Option<&[f32; FEATURE_COUNT]> {
        action.index().map(|i| &self.rows[i])
    }

    #[must_use]
    pub fn score(&self, action: Action, state: &StateVector) -> Option<f32> {
        self.row(action).map(|row| state.dot(row))
    }

    /// Highest-scoring action in `state`. Ties go to the action listed first
    /// in [`Action::PRIMARY`].
    #[must_use]
    pub fn choose_action(&self, state: &StateVector) -> Action {
        let mut best = (Action::PRIMARY[0], state.dot(&self.rows[0]));
        for (action, row) in Action::PRIMARY.into_iter().zip(&self.rows).skip(1) {
            let score = state.dot(row);
            if score > best.1 {
                best = (action, score);
            }
        }
        best.0
    }
}
