use serde::{Deserialize, Serialize};

/// One of the two observers recording constraints for a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    #[display("server")]
    Server,
    #[display("client")]
    Client,
}

impl Role {
    /// Both roles, in merge order.
    pub const ALL: [Self; 2] = [Self::Server, Self::Client];

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Server => Self::Client,
            Self::Client => Self::Server,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Server => 0,
            Self::Client => 1,
        }
    }
}

/// What stood between the two agents when an `escaping` was recorded.
///
/// Line-of-sight and distance measurements happen in the scene; the store
/// only consumes the resolved fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum Obstruction {
    #[default]
    Clear,
    /// A wall blocked the line of sight and `closer` stood nearer to it.
    Wall { closer: Role },
}

impl Obstruction {
    /// Resolves which role stands closer to a blocking wall.
    ///
    /// Equal distances go to [`Role::Server`].
    #[must_use]
    pub fn wall_between(server_distance: f32, client_distance: f32) -> Self {
        let closer = if server_distance <= client_distance {
            Role::Server
        } else {
            Role::Client
        };
        Self::Wall { closer }
    }

    #[must_use]
    pub const fn closer(self) -> Option<Role> {
        match self {
            Self::Clear => None,
            Self::Wall { closer } => Some(closer),
        }
    }
}
