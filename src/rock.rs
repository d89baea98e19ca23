use std::fmt;

use itertools::Itertools;
use tracing::{debug, info, warn};
use z3::{
    ast::{Ast, Bool, Int},
    Config, Context, Model, Params, SatResult, Solver,
};

use crate::{
    error::{Error, Result},
    hailstone::{Hailstone, Vec3},
};

/// How many hailstones pin down the rock: 9 equations for 9 unknowns.
pub const SELECTED: usize = 3;

const LINE_NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn of(self, v: Vec3) -> i64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Index of this axis' velocity unknown in `a..f`; its position follows.
    fn line_index(self) -> usize {
        self as usize * 2
    }

    /// Names of the (velocity, position) unknowns for this axis.
    fn names(self) -> (&'static str, &'static str) {
        let i = self.line_index();
        (LINE_NAMES[i], LINE_NAMES[i + 1])
    }
}

/// `coefficient * t_i + offset = position + velocity * t_i` for one axis of
/// hailstone `i`, where `(coefficient, offset)` is `(a, b)`, `(c, d)` or `(e, f)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equation {
    pub hailstone: usize,
    pub axis: Axis,
    pub position: i64,
    pub velocity: i64,
}

impl Equation {
    pub fn holds(&self, solution: &Solution) -> bool {
        let t = solution.times[self.hailstone] as i128;
        let coefficient = self.axis.of(solution.velocity) as i128;
        let offset = self.axis.of(solution.position) as i128;

        coefficient * t + offset == self.position as i128 + self.velocity as i128 * t
    }

    fn assertion<'ctx>(&self, ctx: &'ctx Context, unknowns: &Unknowns<'ctx>) -> Bool<'ctx> {
        let t = &unknowns.times[self.hailstone];
        let (coefficient, offset) = unknowns.line(self.axis);

        let lhs = Int::add(ctx, &[&Int::mul(ctx, &[coefficient, t]), offset]);
        let rhs = Int::add(
            ctx,
            &[
                &Int::from_i64(ctx, self.position),
                &Int::mul(ctx, &[&Int::from_i64(ctx, self.velocity), t]),
            ],
        );

        lhs._eq(&rhs)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (coefficient, offset) = self.axis.names();
        let t = format!("t{}", self.hailstone);
        write!(
            f,
            "{coefficient} * {t} + {offset} = {} + {} * {t}",
            self.position, self.velocity
        )
    }
}

/// Emits the x, y and z equation for each of the first three hailstones.
pub fn build_equations(hailstones: &[Hailstone]) -> Result<Vec<Equation>> {
    if hailstones.len() < SELECTED {
        return Err(Error::NotEnoughHailstones {
            found: hailstones.len(),
        });
    }

    Ok(hailstones[..SELECTED]
        .iter()
        .enumerate()
        .flat_map(|(i, hailstone)| {
            Axis::ALL.map(|axis| Equation {
                hailstone: i,
                axis,
                position: axis.of(hailstone.position),
                velocity: axis.of(hailstone.velocity),
            })
        })
        .collect())
}

/// An integer assignment for the rock's line and the three collision times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// `(a, c, e)`
    pub velocity: Vec3,
    /// `(b, d, f)`, the rock's location at `t = 0`
    pub position: Vec3,
    pub times: [i64; SELECTED],
}

impl Solution {
    pub fn position_sum(&self) -> i64 {
        self.position.x + self.position.y + self.position.z
    }

    /// Values in declaration order: `a..f`, then `t0..t2`.
    fn values(&self) -> [i64; 9] {
        let (v, p, t) = (self.velocity, self.position, self.times);
        [v.x, p.x, v.y, p.y, v.z, p.z, t[0], t[1], t[2]]
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = LINE_NAMES
            .iter()
            .map(|name| name.to_string())
            .chain((0..SELECTED).map(|i| format!("t{i}")));

        let entries = names
            .zip(self.values())
            .map(|(name, value)| format!("{name}: {value}"))
            .join(", ");

        write!(f, "{{{entries}}}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Unique(Solution),
    /// At least two distinct assignments satisfy the system.
    Ambiguous(Vec<Solution>),
    /// Satisfiable, but the solver could not settle whether another
    /// assignment exists.
    Unconfirmed(Solution),
    Unsatisfiable,
    Unknown(String),
}

impl Outcome {
    pub fn solutions(&self) -> &[Solution] {
        match self {
            Outcome::Unique(solution) | Outcome::Unconfirmed(solution) => {
                std::slice::from_ref(solution)
            }
            Outcome::Ambiguous(solutions) => solutions,
            Outcome::Unsatisfiable | Outcome::Unknown(_) => &[],
        }
    }

    pub fn unique(&self) -> Option<&Solution> {
        match self {
            Outcome::Unique(solution) => Some(solution),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Unknown(reason) => write!(f, "unknown: {reason}"),
            _ => write!(f, "[{}]", self.solutions().iter().join(", ")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Applies to the whole solve; none by default.
    pub timeout_ms: Option<u64>,
    /// Budget for proving no second assignment exists.
    pub uniqueness_timeout_ms: u32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            timeout_ms: None,
            uniqueness_timeout_ms: 10_000,
        }
    }
}

struct Unknowns<'ctx> {
    line: [Int<'ctx>; 6],
    times: [Int<'ctx>; SELECTED],
}

impl<'ctx> Unknowns<'ctx> {
    fn new(ctx: &'ctx Context) -> Self {
        Unknowns {
            line: LINE_NAMES.map(|name| Int::new_const(ctx, name)),
            times: [0, 1, 2].map(|i| Int::new_const(ctx, format!("t{i}"))),
        }
    }

    fn line(&self, axis: Axis) -> (&Int<'ctx>, &Int<'ctx>) {
        let i = axis.line_index();
        (&self.line[i], &self.line[i + 1])
    }

    fn all(&self) -> impl Iterator<Item = &Int<'ctx>> {
        self.line.iter().chain(self.times.iter())
    }

    fn read(&self, model: &Model<'ctx>) -> Result<Solution> {
        let values = self
            .all()
            .map(|int| {
                model
                    .eval(int, true)
                    .and_then(|value| value.as_i64())
                    .ok_or_else(|| Error::Solver(format!("no integer value for {int}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Solution {
            velocity: Vec3::new(values[0], values[2], values[4]),
            position: Vec3::new(values[1], values[3], values[5]),
            times: [values[6], values[7], values[8]],
        })
    }

    /// Rules out exactly this assignment.
    fn exclude(&self, ctx: &'ctx Context, solution: &Solution) -> Bool<'ctx> {
        let differs = self
            .all()
            .zip(solution.values())
            .map(|(int, value)| int._eq(&Int::from_i64(ctx, value)).not())
            .collect::<Vec<_>>();

        Bool::or(ctx, &differs.iter().collect::<Vec<_>>())
    }
}

fn model_solution<'ctx>(solver: &Solver<'ctx>, unknowns: &Unknowns<'ctx>) -> Result<Solution> {
    let model = solver
        .get_model()
        .ok_or_else(|| Error::Solver("satisfiable but no model".to_string()))?;
    debug!("model:\n{model}");

    unknowns.read(&model)
}

fn reason_unknown(solver: &Solver) -> String {
    solver
        .get_reason_unknown()
        .unwrap_or_else(|| "unknown".to_string())
}

/// Asks Z3 for an integer rock line meeting the first three hailstones at
/// non-negative times, then checks whether a second assignment exists.
pub fn solve(hailstones: &[Hailstone], options: &SolverOptions) -> Result<Outcome> {
    let equations = build_equations(hailstones)?;

    let mut cfg = Config::new();
    cfg.set_model_generation(true);
    if let Some(ms) = options.timeout_ms {
        cfg.set_timeout_msec(ms);
    }

    let ctx = Context::new(&cfg);
    let solver = Solver::new(&ctx);
    let unknowns = Unknowns::new(&ctx);

    for equation in &equations {
        debug!(%equation, "assert");
        solver.assert(&equation.assertion(&ctx, &unknowns));
    }

    let zero = Int::from_i64(&ctx, 0);
    for t in &unknowns.times {
        solver.assert(&t.ge(&zero));
    }

    let first = match solver.check() {
        SatResult::Unsat => return Ok(Outcome::Unsatisfiable),
        SatResult::Unknown => return Ok(Outcome::Unknown(reason_unknown(&solver))),
        SatResult::Sat => model_solution(&solver, &unknowns)?,
    };
    info!(%first, "found rock");

    let mut params = Params::new(&ctx);
    params.set_u32("timeout", options.uniqueness_timeout_ms);
    solver.set_params(&params);
    solver.assert(&unknowns.exclude(&ctx, &first));

    match solver.check() {
        SatResult::Unsat => Ok(Outcome::Unique(first)),
        SatResult::Sat => {
            let second = model_solution(&solver, &unknowns)?;
            warn!(%second, "rock is not uniquely determined");
            Ok(Outcome::Ambiguous(vec![first, second]))
        }
        SatResult::Unknown => {
            warn!(
                reason = %reason_unknown(&solver),
                "could not confirm the rock is unique"
            );
            Ok(Outcome::Unconfirmed(first))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Vec<Hailstone> {
        crate::parse_hailstones(
            "19, 13, 30 @ -2,  1, -2
18, 19, 22 @ -1, -1, -2
20, 25, 34 @ -2, -2, -4",
        )
        .unwrap()
    }

    fn sample_rock() -> Solution {
        Solution {
            velocity: Vec3::new(-3, 1, 2),
            position: Vec3::new(24, 13, 10),
            times: [5, 3, 4],
        }
    }

    #[test]
    fn builds_nine_equations_in_ray_then_axis_order() {
        let equations = build_equations(&sample()).unwrap();

        assert_eq!(equations.len(), 9);
        assert_eq!(
            equations[0],
            Equation {
                hailstone: 0,
                axis: Axis::X,
                position: 19,
                velocity: -2
            }
        );
        assert_eq!(
            equations[5],
            Equation {
                hailstone: 1,
                axis: Axis::Z,
                position: 22,
                velocity: -2
            }
        );
        assert_eq!(equations[8].to_string(), "e * t2 + f = 34 + -4 * t2");
    }

    #[test]
    fn ignores_hailstones_past_the_third() {
        let mut hailstones = sample();
        hailstones.push("12, 31, 28 @ -1, -2, -1".parse().unwrap());

        assert_eq!(build_equations(&hailstones).unwrap().len(), 9);
    }

    #[test]
    fn needs_three_hailstones() {
        let err = build_equations(&sample()[..2]).unwrap_err();
        assert!(matches!(err, Error::NotEnoughHailstones { found: 2 }));
    }

    #[test]
    fn sample_rock_satisfies_every_equation() {
        let rock = sample_rock();
        assert!(build_equations(&sample())
            .unwrap()
            .iter()
            .all(|equation| equation.holds(&rock)));

        let off_by_one = Solution {
            times: [5, 3, 5],
            ..rock
        };
        assert!(!build_equations(&sample())
            .unwrap()
            .iter()
            .all(|equation| equation.holds(&off_by_one)));
    }

    #[test]
    fn displays_like_an_assignment_map() {
        assert_eq!(
            Outcome::Unique(sample_rock()).to_string(),
            "[{a: -3, b: 24, c: 1, d: 13, e: 2, f: 10, t0: 5, t1: 3, t2: 4}]"
        );
        assert_eq!(Outcome::Unsatisfiable.to_string(), "[]");
        assert_eq!(
            Outcome::Unknown("timeout".to_string()).to_string(),
            "unknown: timeout"
        );
        assert_eq!(sample_rock().position_sum(), 47);
    }

    #[test]
    fn unconfirmed_rock_is_shown_but_not_unique() {
        let outcome = Outcome::Unconfirmed(sample_rock());

        assert_eq!(outcome.unique(), None);
        assert_eq!(outcome.solutions(), &[sample_rock()]);
        assert_eq!(
            outcome.to_string(),
            "[{a: -3, b: 24, c: 1, d: 13, e: 2, f: 10, t0: 5, t1: 3, t2: 4}]"
        );
    }

    fn vec3(range: std::ops::Range<i64>) -> impl Strategy<Value = Vec3> {
        (range.clone(), range.clone(), range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn rays_through_a_known_line_satisfy_it(
            rock_position in vec3(-1_000_000..1_000_000),
            rock_velocity in vec3(-1_000..1_000),
            velocities in prop::array::uniform3(vec3(-1_000..1_000)),
            times in prop::array::uniform3(0i64..10_000),
        ) {
            let rock = Hailstone::new(rock_position, rock_velocity);
            let hailstones = velocities
                .iter()
                .zip(times)
                .map(|(&velocity, t)| {
                    let hit = rock.location(t);
                    let position = Vec3::new(
                        hit.x - t * velocity.x,
                        hit.y - t * velocity.y,
                        hit.z - t * velocity.z,
                    );
                    Hailstone::new(position, velocity)
                })
                .collect::<Vec<_>>();

            let solution = Solution { velocity: rock_velocity, position: rock_position, times };
            for equation in build_equations(&hailstones).unwrap() {
                prop_assert!(equation.holds(&solution), "{equation} fails");
            }
        }
    }
}
