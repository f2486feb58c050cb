//! Observed-behavior constraints and their per-session store.
//!
//! A [`Constraint`] records that an agent in a given [`StateVector`] chose an
//! [`Action`] at some time. During a session, the server and the client each
//! record what they observe into their own log; [`ConstraintStore`]
//! reconciles the two logs as entries arrive and merges them into a
//! cumulative training set at the end of the session.
//!
//! # Example
//!
//! ```
//! use mazeduel_constraints::{
//!     Action, Constraint, ConstraintStore, Obstruction, Role, StateVector,
//!     storage::MemoryStorage,
//! };
//!
//! let mut store = ConstraintStore::start_session(MemoryStorage::new()).unwrap();
//! let state = StateVector::new([0.3, 1.0, 0.0, 0.0, 0.6]);
//!
//! store
//!     .add_constraint(Role::Server, Constraint::new(state, Action::Escaping, 5.0), Obstruction::Clear)
//!     .unwrap();
//! // the client teleported away at nearly the same time, so the escape never happened
//! store
//!     .add_constraint(Role::Client, Constraint::new(state, Action::Teleport, 5.2), Obstruction::Clear)
//!     .unwrap();
//!
//! assert!(store.log(Role::Server).is_empty());
//! assert_eq!(store.merge().unwrap(), 1);
//! ```

pub use self::{action::*, constraint::*, role::*, state::*, store::*};

mod action;
mod constraint;
mod role;
pub mod schema;
mod state;
pub mod storage;
mod store;
