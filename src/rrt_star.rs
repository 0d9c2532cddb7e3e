use crate::base::{Path, Planner, RRTBase};
use crate::error::ConfigError;
use crate::point::Point;
use crate::space::SearchSpace;
use crate::tree::Tree;
use crate::Coord;

/// The asymptotically-optimal RRT* planner.
///
/// Extends the baseline loop with a choose-parent pass over a nearby set
/// (cheapest collision-free candidate wins) and a rewire pass re-parenting
/// nearby vertices through the new one whenever that lowers their
/// cost-to-come.
///
/// Based on: Karaman & Frazzoli, "Incremental Sampling-based Algorithms for
/// Optimal Motion Planning".
pub struct RRTStar<F: Coord, const N: usize> {
    base: RRTBase<F, N>,
}

impl<F: Coord, const N: usize> RRTStar<F, N> {
    /// Constructs the planner.
    ///
    /// Parameters:
    /// - `space`: The configuration space, owned for the whole plan.
    /// - `x_init`: The start location.
    /// - `x_goal`: The goal location.
    /// - `q`: The edge-length schedule as `(length, attempts)` pairs.
    /// - `r`: The collision sampling resolution along edges.
    /// - `prc`: The probability per iteration of probing the goal.
    /// - `max_samples`: The sample budget.
    /// - `rewire_count`: Bound on the nearby set used for choose-parent and
    ///   rewiring; unbounded when `None`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        space: SearchSpace<F, N>,
        x_init: Point<F, N>,
        x_goal: Point<F, N>,
        q: Vec<(F, usize)>,
        r: F,
        prc: f64,
        max_samples: usize,
        rewire_count: Option<usize>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base: RRTBase::new(space, x_init, x_goal, q, r, prc, max_samples, rewire_count, 1)?,
        })
    }

    /// Seeds the planner's random generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base.seed(seed);
        self
    }

    /// Cost of the best goal path found so far, infinite until one exists.
    /// Never increases over the lifetime of a run.
    pub fn best_cost(&self) -> F {
        self.base.c_best
    }
}

impl<F: Coord, const N: usize> Planner<F, N> for RRTStar<F, N> {
    fn search(&mut self) -> Option<Path<F, N>> {
        if self.base.x_init == self.base.x_goal {
            return Some(vec![self.base.x_init]);
        }
        let root = self.base.add_vertex(0, self.base.x_init);
        self.base.add_edge(0, root, None);

        loop {
            for qi in 0..self.base.q.len() {
                let (step, attempts) = self.base.q[qi];
                for _ in 0..attempts {
                    let (x_new, _) = self.base.new_and_near(0, step);
                    let x_new = match x_new {
                        Some(x) => x,
                        None => continue,
                    };

                    let count = self.base.current_rewire_count(0);
                    let l_near = self.base.get_nearby_vertices(0, &x_new, count);

                    if let Some(new_id) = self.base.connect_shortest_valid(0, x_new, &l_near) {
                        self.base.rewire(0, new_id, &l_near);
                    }

                    if let Some(result) = self.base.check_solution() {
                        return result;
                    }
                }
            }
        }
    }

    fn trees(&self) -> &[Tree<F, N>] {
        &self.base.trees
    }

    fn samples_taken(&self) -> usize {
        self.base.samples_taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::euclidean_distance;

    fn base_with_chain() -> RRTBase<f64, 2> {
        let space = SearchSpace::new([(0.0, 100.0); 2], Vec::new()).unwrap();
        let mut base = RRTBase::new(
            space,
            Point::new([0.0, 0.0]),
            Point::new([100.0, 100.0]),
            vec![(10.0, 4)],
            1.0,
            0.0,
            100,
            None,
            1,
        )
        .unwrap();
        // A deliberately wasteful dog-leg: 0 -> (10, 0) -> (10, 10).
        let root = base.add_vertex(0, Point::new([0.0, 0.0]));
        base.add_edge(0, root, None);
        let a = base.add_vertex(0, Point::new([10.0, 0.0]));
        base.add_edge(0, a, Some(root));
        let b = base.add_vertex(0, Point::new([10.0, 10.0]));
        base.add_edge(0, b, Some(a));
        base
    }

    #[test]
    fn rewire_never_raises_costs() {
        let mut base = base_with_chain();
        // Insert a vertex close to the root that offers every nearby vertex
        // a cheaper route.
        let x_new = Point::new([5.0, 5.0]);
        let l_near = base.get_nearby_vertices(0, &x_new, base.current_rewire_count(0));
        let new_id = base
            .connect_shortest_valid(0, x_new, &l_near)
            .expect("open space, candidate always qualifies");

        let before: Vec<f64> = (0..base.trees[0].len()).map(|v| base.path_cost(0, v)).collect();
        base.rewire(0, new_id, &l_near);
        for v in 0..base.trees[0].len() {
            assert!(base.path_cost(0, v) <= before[v] + 1e-9);
        }
    }

    #[test]
    fn rewire_adopts_cheaper_parent() {
        let mut base = base_with_chain();
        let x_new = Point::new([5.0, 5.0]);
        let l_near = base.get_nearby_vertices(0, &x_new, base.current_rewire_count(0));
        let new_id = base.connect_shortest_valid(0, x_new, &l_near).unwrap();
        base.rewire(0, new_id, &l_near);

        // (10, 10) is cheaper through (5, 5) than through the dog-leg.
        let b = base.trees[0].find(&Point::new([10.0, 10.0])).unwrap();
        assert_eq!(base.trees[0].parent(b), Some(new_id));
        let expected = euclidean_distance(&Point::new([0.0, 0.0]), &x_new)
            + euclidean_distance(&x_new, &Point::new([10.0, 10.0]));
        assert!((base.path_cost(0, b) - expected).abs() < 1e-9);
    }

    #[test]
    fn choose_parent_prefers_cheapest_candidate() {
        let mut base = base_with_chain();
        // Nearest vertex by distance is (10, 0) via the dog-leg, but the
        // root offers the cheaper total route to (6, 2).
        let x_new = Point::new([6.0, 2.0]);
        let l_near = base.get_nearby_vertices(0, &x_new, 3);
        let new_id = base.connect_shortest_valid(0, x_new, &l_near).unwrap();
        assert_eq!(base.trees[0].parent(new_id), Some(0));
    }
}
