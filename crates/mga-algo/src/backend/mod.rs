//! Reference capacity-expansion model behind [`mga_core::NetworkAdapter`].
//!
//! [`model`] holds the plain network data; [`lp`] turns it into a linear
//! program and solves it with one of the good_lp backends enabled at build
//! time (`solver-clarabel` by default, `solver-highs` optionally).

pub mod model;

#[cfg(any(feature = "solver-clarabel", feature = "solver-highs"))]
pub mod lp;

#[cfg(any(feature = "solver-clarabel", feature = "solver-highs"))]
pub use lp::{LpNetwork, LpSolution, ZERO_TOLERANCE};
pub use model::{Bus, CapacityNetwork, Generator, Line, Load, ModelError, TRANSMISSION_CARRIER};
