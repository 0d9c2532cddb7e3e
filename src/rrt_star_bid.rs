use crate::base::{Path, Planner, RRTBase};
use crate::error::ConfigError;
use crate::point::Point;
use crate::space::SearchSpace;
use crate::tree::Tree;
use crate::Coord;

/// The bidirectional RRT* planner.
///
/// Runs the RRT* iteration on the active tree and, after every successful
/// insertion and rewire, tries to attach the new vertex into the opposite
/// tree. A successful cross-tree connection yields a candidate goal path;
/// the cheapest one seen so far is kept. Trees and endpoints swap after
/// every sweep of the edge-length schedule.
pub struct RRTStarBidirectional<F: Coord, const N: usize> {
    base: RRTBase<F, N>,
}

impl<F: Coord, const N: usize> RRTStarBidirectional<F, N> {
    /// Constructs the planner. Parameters as [`crate::RRTStar::new`];
    /// tree 0 roots at `x_init` and tree 1 at `x_goal`.
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
            base: RRTBase::new(space, x_init, x_goal, q, r, prc, max_samples, rewire_count, 2)?,
        })
    }

    /// Seeds the planner's random generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base.seed(seed);
        self
    }

    /// Cost of the best goal path found so far, infinite until one exists.
    pub fn best_cost(&self) -> F {
        self.base.c_best
    }
}

impl<F: Coord, const N: usize> Planner<F, N> for RRTStarBidirectional<F, N> {
    fn search(&mut self) -> Option<Path<F, N>> {
        if self.base.x_init == self.base.x_goal {
            return Some(vec![self.base.x_init]);
        }
        let root_a = self.base.add_vertex(0, self.base.x_init);
        self.base.add_edge(0, root_a, None);
        let root_b = self.base.add_vertex(1, self.base.x_goal);
        self.base.add_edge(1, root_b, None);

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

                        let count_opp = self.base.current_rewire_count(1);
                        let l_near_opp = self.base.get_nearby_vertices(1, &x_new, count_opp);
                        self.base.connect_trees(new_id, x_new, &l_near_opp);
                    }

                    if let Some(result) = self.base.check_solution_bidirectional() {
                        return result;
                    }
                }
            }
            self.base.swap_trees();
            self.base.swap_endpoints();
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
    use crate::distance::path_length;

    #[test]
    fn cross_tree_connection_records_the_full_cost() {
        let space: SearchSpace<f64, 2> = SearchSpace::new([(0.0, 100.0); 2], Vec::new()).unwrap();
        let mut planner = RRTStarBidirectional::new(
            space,
            Point::new([0.0, 0.0]),
            Point::new([30.0, 0.0]),
            vec![(10.0, 4)],
            1.0,
            0.0,
            100,
            None,
        )
        .unwrap()
        .with_seed(15);

        let base = &mut planner.base;
        let root_a = base.add_vertex(0, Point::new([0.0, 0.0]));
        base.add_edge(0, root_a, None);
        let mid = base.add_vertex(0, Point::new([10.0, 0.0]));
        base.add_edge(0, mid, Some(root_a));
        let root_b = base.add_vertex(1, Point::new([30.0, 0.0]));
        base.add_edge(1, root_b, None);

        let x_new = Point::new([20.0, 0.0]);
        let new_id = base.add_vertex(0, x_new);
        base.add_edge(0, new_id, Some(mid));
        let l_near_opp = base.get_nearby_vertices(1, &x_new, 1);
        base.connect_trees(new_id, x_new, &l_near_opp);

        // The recorded cost sums both root paths and the joining segment.
        let sigma = base.sigma_best.clone().expect("line of sight is clear");
        assert_eq!(
            sigma,
            vec![
                Point::new([0.0, 0.0]),
                Point::new([10.0, 0.0]),
                Point::new([20.0, 0.0]),
                Point::new([30.0, 0.0]),
            ]
        );
        assert_eq!(base.c_best, 30.0);
        assert!((base.c_best - path_length(&sigma)).abs() < 1e-12);
        // The joining vertex now lives in both trees.
        assert!(base.trees[1].contains(&x_new));
    }

    #[test]
    fn cross_tree_connection_respects_the_best_cost_gate() {
        let space = SearchSpace::new([(0.0, 100.0); 2], Vec::new()).unwrap();
        let mut planner = RRTStarBidirectional::new(
            space,
            Point::new([0.0, 0.0]),
            Point::new([30.0, 0.0]),
            vec![(10.0, 4)],
            1.0,
            0.0,
            100,
            None,
        )
        .unwrap()
        .with_seed(16);

        let base = &mut planner.base;
        let root_a = base.add_vertex(0, Point::new([0.0, 0.0]));
        base.add_edge(0, root_a, None);
        let root_b = base.add_vertex(1, Point::new([30.0, 0.0]));
        base.add_edge(1, root_b, None);
        let x_new = Point::new([20.0, 0.0]);
        let new_id = base.add_vertex(0, x_new);
        base.add_edge(0, new_id, Some(root_a));

        // A better solution is already known; the candidate must not win.
        base.c_best = 25.0;
        let l_near_opp = base.get_nearby_vertices(1, &x_new, 1);
        base.connect_trees(new_id, x_new, &l_near_opp);
        assert_eq!(base.sigma_best, None);
        assert_eq!(base.c_best, 25.0);
        assert!(!base.trees[1].contains(&x_new));
    }
}
