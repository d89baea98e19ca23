use std::num::ParseIntError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single `px, py, pz @ vx, vy, vz` line could not be read.
#[derive(Debug, Error)]
pub enum ParseHailstoneError {
    #[error("missing `@` between position and velocity")]
    MissingSeparator,

    #[error("expected 3 components, found {found}")]
    Arity { found: usize },

    #[error("invalid integer {token:?}: {source}")]
    Int {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: ParseHailstoneError,
    },

    #[error("need 3 hailstones to aim the rock, got {found}")]
    NotEnoughHailstones { found: usize },

    #[error("solver error: {0}")]
    Solver(String),
}
