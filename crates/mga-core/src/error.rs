//! Unified error types for the MGA workspace
//!
//! [`MgaError`] is what the public entry points return. Solver outcomes that
//! the SPORES loop recovers from are reported separately as [`SolveFailure`],
//! so a caller can never mistake an infeasible spore for a broken setup.
//!
//! # Example
//!
//! ```ignore
//! use mga_core::{MgaError, MgaResult};
//!
//! fn load_and_run(path: &str) -> MgaResult<()> {
//!     let config = load_config(path)?;
//!     run_spores(&mut network, &config, &options)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all MGA operations.
#[derive(Error, Debug)]
pub enum MgaError {
    /// Invalid run parameters, raised before any solve is attempted
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The network adapter returned missing or malformed values
    #[error("Adapter contract violation: {0}")]
    AdapterContract(String),

    /// I/O errors (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Solver errors outside the SPORES loop (e.g. the least-cost solve)
    #[error("Solver error: {0}")]
    Solver(#[from] SolveFailure),
}

/// Convenience type alias for Results using MgaError.
pub type MgaResult<T> = Result<T, MgaError>;

/// Why a re-solve produced no usable solution.
///
/// Adapters must report these explicitly instead of leaving stale values
/// behind for the caller to read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveFailure {
    /// No point satisfies the constraints (including the cost ceiling)
    #[error("problem infeasible: {0}")]
    Infeasible(String),

    /// The objective can be improved without bound
    #[error("problem unbounded")]
    Unbounded,

    /// Backend error, unsupported solver, numerical breakdown
    #[error("solver failed: {0}")]
    Solver(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MgaError::Configuration("slack must be >= 0".into());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("slack"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MgaError = io_err.into();
        assert!(matches!(err, MgaError::Io(_)));
    }

    #[test]
    fn test_solve_failure_wraps_into_solver_error() {
        fn inner() -> Result<(), SolveFailure> {
            Err(SolveFailure::Infeasible("cost ceiling too tight".into()))
        }

        fn outer() -> MgaResult<()> {
            inner()?;
            Ok(())
        }

        let err = outer().unwrap_err();
        assert!(matches!(err, MgaError::Solver(SolveFailure::Infeasible(_))));
        assert!(err.to_string().contains("cost ceiling too tight"));
    }
}
