use itertools::Itertools;
use tracing::debug;

use crate::hailstone::Hailstone;

pub const PUZZLE_MIN: f64 = 200000000000000.0;
pub const PUZZLE_MAX: f64 = 400000000000000.0;

/// Where the XY paths of two hailstones cross, if both get there in the future.
pub fn xy_crossing(a: &Hailstone, b: &Hailstone) -> Option<(f64, f64)> {
    let (ax, ay) = (a.position.x as f64, a.position.y as f64);
    let (adx, ady) = (a.velocity.x as f64, a.velocity.y as f64);
    let (bx, by) = (b.position.x as f64, b.position.y as f64);
    let (bdx, bdy) = (b.velocity.x as f64, b.velocity.y as f64);

    let det = bdx * ady - adx * bdy;
    if det == 0.0 {
        // parallel
        return None;
    }

    let (ex, ey) = (bx - ax, by - ay);
    let ta = (bdx * ey - ex * bdy) / det;
    let tb = (adx * ey - ady * ex) / det;

    if ta < 0.0 || tb < 0.0 {
        return None;
    }

    Some((ax + ta * adx, ay + ta * ady))
}

/// Counts pairs whose future XY paths cross inside `[min, max]` on both axes.
pub fn count_xy_crossings(hailstones: &[Hailstone], min: f64, max: f64) -> usize {
    hailstones
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| match xy_crossing(a, b) {
            Some((x, y)) => {
                debug!(%a, %b, x, y, "paths cross");
                min <= x && x <= max && min <= y && y <= max
            }
            None => false,
        })
        .count()
}
