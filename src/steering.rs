use crate::distance::euclidean_distance;
use crate::point::Point;
use crate::space::SearchSpace;
use crate::Coord;

/// Returns the point `step` away from `start` along the ray through `goal`,
/// clamped per-axis into the space bounds.
///
/// The full step is always taken, even when `goal` is closer than `step`;
/// callers detect arrival separately. When `start` equals `goal` the result
/// is `start`, so callers must not rely on progress.
pub fn steer<F: Coord, const N: usize>(
    space: &SearchSpace<F, N>,
    start: &Point<F, N>,
    goal: &Point<F, N>,
    step: F,
) -> Point<F, N> {
    let dist = euclidean_distance(start, goal);
    if dist == F::zero() {
        return *start;
    }
    let steered = start + &((goal - start) / dist * step);
    let mut coords = *steered.coords();
    for (i, (lo, hi)) in space.dimension_lengths().iter().enumerate() {
        coords[i] = <F as num_traits::Float>::min(<F as num_traits::Float>::max(coords[i], *lo), *hi);
    }
    Point::new(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_space() -> SearchSpace<f64, 2> {
        SearchSpace::new([(0.0, 100.0); 2], Vec::new()).unwrap()
    }

    #[test]
    fn moves_exactly_one_step() {
        let space = open_space();
        let start = Point::new([10.0, 10.0]);
        let goal = Point::new([70.0, 90.0]);
        let out = steer(&space, &start, &goal, 5.0);
        assert!((euclidean_distance(&start, &out) - 5.0).abs() < 1e-9);
        // Collinear with the start-goal ray.
        let d = &out - &start;
        let g = &goal - &start;
        let cross = d[0] * g[1] - d[1] * g[0];
        assert!(cross.abs() < 1e-9);
    }

    #[test]
    fn overshoots_a_near_goal() {
        let space = open_space();
        let start = Point::new([10.0, 10.0]);
        let goal = Point::new([11.0, 10.0]);
        let out = steer(&space, &start, &goal, 5.0);
        assert!((out[0] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn clamps_into_bounds() {
        let space = open_space();
        let start = Point::new([98.0, 50.0]);
        let goal = Point::new([200.0, 50.0]);
        let out = steer(&space, &start, &goal, 10.0);
        assert_eq!(out, Point::new([100.0, 50.0]));
    }

    #[test]
    fn identity_when_start_is_goal() {
        let space = open_space();
        let p = Point::new([42.0, 17.0]);
        assert_eq!(steer(&space, &p, &p, 10.0), p);
    }
}
