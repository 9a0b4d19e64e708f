// SPDX-License-Identifier: Apache-2.0

/// Errors surfaced by the checking engine.
///
/// A "not equivalent" answer is never an error; it is reported through
/// [`crate::verdict::Verdict`]. These variants cover infrastructure failures
/// only: the solver giving up, the diagnostic sink failing to write, or a
/// malformed options file.
#[derive(Debug)]
pub enum LecError {
    Solver(varisat::solver::SolverError),
    Io(std::io::Error),
    Config(String),
}

impl std::fmt::Display for LecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LecError::Solver(e) => write!(f, "lec solver error: {:?}", e),
            LecError::Io(e) => write!(f, "lec i/o error: {}", e),
            LecError::Config(msg) => write!(f, "lec config error: {}", msg),
        }
    }
}

impl std::error::Error for LecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LecError::Io(e) => Some(e),
            LecError::Solver(_) | LecError::Config(_) => None,
        }
    }
}

impl From<varisat::solver::SolverError> for LecError {
    fn from(e: varisat::solver::SolverError) -> Self {
        LecError::Solver(e)
    }
}

impl From<std::io::Error> for LecError {
    fn from(e: std::io::Error) -> Self {
        LecError::Io(e)
    }
}
