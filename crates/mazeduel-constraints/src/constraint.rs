use crate::{Action, FEATURE_COUNT, StateVector, UnknownActionError};

/// Margin a chosen action must clear over each alternative unless a
/// constraint says otherwise.
pub const DEFAULT_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConstraintError {
    #[display("state vector must have {} features, got {len}", FEATURE_COUNT)]
    InvalidStateLength { len: usize },
    #[display("{source}")]
    UnknownAction { source: UnknownActionError },
}

impl From<UnknownActionError> for ConstraintError {
    fn from(source: UnknownActionError) -> Self {
        Self::UnknownAction { source }
    }
}

/// One observation: `action` was chosen in `state` at `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    state: StateVector,
    action: Action,
    timestamp: f64,
    epsilon: f32,
}

impl Constraint {
    #[must_use]
    pub const fn new(state: StateVector, action: Action, timestamp: f64) -> Self {
        Self {
            state,
            action,
            timestamp,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Builds a constraint from raw parts, validating the state length.
    ///
    /// # Example
    ///
    /// ```
    /// use mazeduel_constraints::{Action, Constraint, ConstraintError};
    ///
    /// let c = Constraint::from_slice(&[0.1, 1.0, 0.0, 0.0, 0.8], Action::Laser, 3.5).unwrap();
    /// assert_eq!(c.action(), Action::Laser);
    ///
    /// let err = Constraint::from_slice(&[0.1, 1.0, 0.0, 0.0], Action::Laser, 3.5).unwrap_err();
    /// assert_eq!(err, ConstraintError::InvalidStateLength { len: 4 });
    /// ```
    pub fn from_slice(state: &[f32], action: Action, timestamp: f64) -> Result<Self, ConstraintError> {
        Ok(Self::new(StateVector::from_slice(state)?, action, timestamp))
    }

    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &StateVector {
        &self.state
    }

    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub const fn timestamp(&self) -> f64 {
        self.timestamp
    }

    #[must_use]
    pub const fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Whether this constraint was recorded within `window` of `timestamp`
    /// (inclusive).
    #[must_use]
    pub fn is_within(&self, timestamp: f64, window: f64) -> bool {
        (self.timestamp - timestamp).abs() <= window
    }
}
