use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A labelled behavior an agent can be observed performing.
///
/// The first seven variants are the scoreable actions, in the order that
/// lays out the rows of a policy's weight matrix. [`Action::WallBetweenDestroyed`]
/// is a bookkeeping event: it is recorded so it can cancel a matching
/// [`Action::ShowingUp`], but it is never scored.
///
/// Labels written by older recorders (`"showing up"`, `"Teleport"`,
/// `"wall in between is destroyed"`) are accepted when parsing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Action {
    #[serde(rename = "Laser")]
    Laser,
    #[serde(rename = "blocking")]
    Blocking,
    #[serde(rename = "hindering")]
    Hindering,
    #[serde(rename = "escaping")]
    Escaping,
    #[serde(rename = "showingUp", alias = "showing up")]
    ShowingUp,
    #[serde(rename = "teleport", alias = "Teleport")]
    Teleport,
    #[serde(rename = "charging")]
    Charging,
    #[serde(rename = "wallBetweenDestroyed", alias = "wall in between is destroyed")]
    WallBetweenDestroyed,
}

/// Number of scoreable actions.
pub const ACTION_COUNT: usize = 7;

impl Action {
    /// Scoreable actions in weight-row order.
    pub const PRIMARY: [Self; ACTION_COUNT] = [
        Self::Laser,
        Self::Blocking,
        Self::Hindering,
        Self::Escaping,
        Self::ShowingUp,
        Self::Teleport,
        Self::Charging,
    ];

    /// Row of this action in a policy weight matrix, `None` for bookkeeping
    /// events.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Laser => Some(0),
            Self::Blocking => Some(1),
            Self::Hindering => Some(2),
            Self::Escaping => Some(3),
            Self::ShowingUp => Some(4),
            Self::Teleport => Some(5),
            Self::Charging => Some(6),
            Self::WallBetweenDestroyed => None,
        }
    }

    #[must_use]
    pub const fn is_scored(self) -> bool {
        self.index().is_some()
    }

    /// Canonical label used in constraint logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Laser => "Laser",
            Self::Blocking => "blocking",
            Self::Hindering => "hindering",
            Self::Escaping => "escaping",
            Self::ShowingUp => "showingUp",
            Self::Teleport => "teleport",
            Self::Charging => "charging",
            Self::WallBetweenDestroyed => "wallBetweenDestroyed",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown action label {label:?}")]
pub struct UnknownActionError {
    pub label: String,
}

impl FromStr for Action {
    type Err = UnknownActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s {
            "Laser" | "laser" => Self::Laser,
            "blocking" => Self::Blocking,
            "hindering" => Self::Hindering,
            "escaping" => Self::Escaping,
            "showingUp" | "showing up" => Self::ShowingUp,
            "teleport" | "Teleport" => Self::Teleport,
            "charging" => Self::Charging,
            "wallBetweenDestroyed" | "wall in between is destroyed" => Self::WallBetweenDestroyed,
            _ => {
                return Err(UnknownActionError {
                    label: s.to_owned(),
                });
            }
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_order_matches_index() {
        for (i, action) in Action::PRIMARY.into_iter().enumerate() {
            assert_eq!(action.index(), Some(i));
        }
        assert_eq!(Action::WallBetweenDestroyed.index(), None);
        assert!(!Action::WallBetweenDestroyed.is_scored());
    }

    #[test]
    fn test_label_roundtrip() {
        for action in Action::PRIMARY
            .into_iter()
            .chain([Action::WallBetweenDestroyed])
        {
            assert_eq!(action.label().parse::<Action>(), Ok(action));
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.label()));
        }
    }

    #[test]
    fn test_legacy_labels() {
        assert_eq!("showing up".parse(), Ok(Action::ShowingUp));
        assert_eq!("Teleport".parse(), Ok(Action::Teleport));
        assert_eq!(
            "wall in between is destroyed".parse(),
            Ok(Action::WallBetweenDestroyed)
        );
        let action: Action = serde_json::from_str("\"showing up\"").unwrap();
        assert_eq!(action, Action::ShowingUp);
    }

    #[test]
    fn test_unknown_label() {
        let err = "dancing".parse::<Action>().unwrap_err();
        assert_eq!(err.label, "dancing");
        assert_eq!(err.to_string(), "unknown action label \"dancing\"");
    }
}
