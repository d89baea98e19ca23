pub mod crossing;
pub mod error;
pub mod hailstone;
pub mod rock;

pub use crossing::{count_xy_crossings, xy_crossing};
pub use error::{Error, ParseHailstoneError, Result};
pub use hailstone::{parse_hailstones, Hailstone, Vec3};
pub use rock::{build_equations, solve, Axis, Equation, Outcome, Solution, SolverOptions};
