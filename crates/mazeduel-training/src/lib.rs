//! Policy learning from recorded constraints.
//!
//! A [`Policy`] scores each action as the dot product of its weight row with
//! the current state. Training searches the 35-dimensional weight space with
//! a genetic algorithm whose fitness ([`fitness::evaluate`]) rewards ranking
//! each recorded choice above every alternative by a margin.
//!
//! # Architecture
//!
//! ```text
//! merged constraint log (mazeduel-constraints)
//!     ↓ scored by
//! fitness::evaluate
//!     ↓ guides
//! GeneticOptimizer (selection, crossover, mutation)
//!     ↓ produces
//! best Policy → Policy::choose_action at play time
//! ```
//!
//! See the [`genetic`] module for the algorithm and the [`weights`] module
//! for the operators.

pub use self::{genetic::*, policy::*, statistics::*};

pub mod fitness;
pub mod genetic;
mod policy;
mod statistics;
pub mod weights;
