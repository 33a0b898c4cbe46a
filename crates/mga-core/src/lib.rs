//! # mga-core: Near-Optimal Alternatives Core Types
//!
//! Shared vocabulary for generating alternative solutions to an
//! energy-system capacity planning problem:
//!
//! - [`ComponentId`] - identity of a scored decision variable
//! - [`LinearObjective`] - replacement objective over those variables
//! - [`CostCeiling`] - `total cost <= (1 + slack) * reference cost`
//! - [`NetworkAdapter`] - the four-operation contract a model must offer
//! - [`MgaError`] / [`SolveFailure`] - fatal errors vs. recoverable solver outcomes
//!
//! The algorithms that drive an adapter live in `mga-algo`.

pub mod adapter;
pub mod component;
pub mod error;
pub mod objective;
pub mod options;

pub use adapter::NetworkAdapter;
pub use component::ComponentId;
pub use error::{MgaError, MgaResult, SolveFailure};
pub use objective::{CostCeiling, LinearObjective, BUDGET_CONSTRAINT_NAME};
pub use options::{OptionMap, OptionValue, SolverOptions};
