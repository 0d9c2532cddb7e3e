use crate::base::{Path, Planner, RRTBase};
use crate::distance::{euclidean_distance, path_length};
use crate::error::ConfigError;
use crate::point::Point;
use crate::space::SearchSpace;
use crate::tree::Tree;
use crate::Coord;
use rand::Rng;
use tracing::debug;

/// The heuristic-accelerated bidirectional RRT* planner.
///
/// Two accelerations on top of [`crate::RRTStarBidirectional`]:
///
/// - Until a first solution exists, the nearby set is capped at one vertex
///   so the trees race towards each other; afterwards the configured rewire
///   count applies and optimisation takes over.
/// - After every iteration a random segment of the best path is lazily
///   contracted: two non-adjacent path vertices with a collision-free
///   direct edge are linked and the vertices between them dropped, which
///   strictly shortens the path.
pub struct RRTStarBidirectionalHeuristic<F: Coord, const N: usize> {
    base: RRTBase<F, N>,
}

impl<F: Coord, const N: usize> RRTStarBidirectionalHeuristic<F, N> {
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

    /// Attempts one random contraction of the best path: draws two
    /// non-adjacent positions and, when the direct edge between them is
    /// collision-free, re-links the trees so the two vertices become
    /// adjacent and splices the path.
    fn contract_best_path(&mut self) {
        let len = match &self.base.sigma_best {
            Some(sigma) if sigma.len() > 2 => sigma.len(),
            _ => return,
        };
        let (a, b) = loop {
            let a = self.base.rng.gen_range(0..len);
            let b = self.base.rng.gen_range(0..len);
            if a.abs_diff(b) > 1 {
                break (a, b);
            }
        };
        let sigma = self.base.sigma_best.as_ref().expect("checked above");
        let v_a = sigma[a];
        let v_b = sigma[b];
        if !self.base.space.collision_free(&v_a, &v_b, self.base.r) {
            return;
        }

        self.relink(v_a, v_b);

        let (lo, hi) = (a.min(b), a.max(b));
        let sigma = self.base.sigma_best.as_mut().expect("checked above");
        let removed = path_length(&sigma[lo..=hi]);
        let added = euclidean_distance(&sigma[lo], &sigma[hi]);
        sigma.drain(lo + 1..hi);
        self.base.c_best = self.base.c_best - removed + added;
        debug!(cost = ?self.base.c_best, "contracted best path");
    }

    /// Re-points parent links so `v_a` and `v_b` are directly adjacent,
    /// leaving both trees valid forests rooted at their respective roots.
    ///
    /// When one vertex lies on the other's root path inside a single tree,
    /// the descendant is re-parented straight to the ancestor. Otherwise
    /// `v_b` is (re-)parented under `v_a` in whichever tree holds `v_a`,
    /// inserting `v_b` there first if needed.
    fn relink(&mut self, v_a: Point<F, N>, v_b: Point<F, N>) {
        let a_in_0 = self.base.trees[0].find(&v_a);
        let a_in_1 = self.base.trees[1].find(&v_a);
        let b_in_0 = self.base.trees[0].find(&v_b);
        let b_in_1 = self.base.trees[1].find(&v_b);

        if let (Some(a0), Some(b0)) = (a_in_0, b_in_0) {
            if self.base.is_ancestor(0, b0, a0) {
                self.base.trees[0].add_edge(a0, Some(b0));
                return;
            }
        }
        if let (Some(a1), Some(b1)) = (a_in_1, b_in_1) {
            if self.base.is_ancestor(1, b1, a1) {
                self.base.trees[1].add_edge(a1, Some(b1));
                return;
            }
        }
        if let (Some(a0), Some(b0)) = (a_in_0, b_in_0) {
            if self.base.is_ancestor(0, a0, b0) {
                self.base.trees[0].add_edge(b0, Some(a0));
                return;
            }
        }
        if let (Some(a1), Some(b1)) = (a_in_1, b_in_1) {
            if self.base.is_ancestor(1, a1, b1) {
                self.base.trees[1].add_edge(b1, Some(a1));
                return;
            }
        }
        if let Some(a0) = a_in_0 {
            let b0 = b_in_0.unwrap_or_else(|| self.base.trees[0].add_vertex(v_b));
            self.base.trees[0].add_edge(b0, Some(a0));
            return;
        }
        let a1 = a_in_1.expect("best-path vertex belongs to one of the trees");
        let b1 = b_in_1.unwrap_or_else(|| self.base.trees[1].add_vertex(v_b));
        self.base.trees[1].add_edge(b1, Some(a1));
    }
}

impl<F: Coord, const N: usize> Planner<F, N> for RRTStarBidirectionalHeuristic<F, N> {
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

                    // Grow greedily until a first solution exists, then
                    // optimise with the configured nearby-set size.
                    let count = if self.base.sigma_best.is_some() {
                        self.base.current_rewire_count(0)
                    } else {
                        1
                    };
                    let l_near = self.base.get_nearby_vertices(0, &x_new, count);

                    if let Some(new_id) = self.base.connect_shortest_valid(0, x_new, &l_near) {
                        self.base.rewire(0, new_id, &l_near);

                        let count_opp = if self.base.sigma_best.is_some() {
                            self.base.current_rewire_count(1)
                        } else {
                            1
                        };
                        let l_near_opp = self.base.get_nearby_vertices(1, &x_new, count_opp);
                        self.base.connect_trees(new_id, x_new, &l_near_opp);
                    }

                    self.contract_best_path();

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
