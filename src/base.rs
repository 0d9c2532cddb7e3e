use crate::distance::{euclidean_distance, path_length};
use crate::error::ConfigError;
use crate::point::Point;
use crate::space::SearchSpace;
use crate::steering::steer;
use crate::tree::Tree;
use crate::Coord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// An ordered vertex sequence from start to goal, both inclusive.
pub type Path<F, const N: usize> = Vec<Point<F, N>>;

/// Common interface of the planners.
pub trait Planner<F: Coord, const N: usize> {
    /// Runs the search until a path is found or the sample budget is
    /// exhausted. Exhaustion is not an error; it surfaces as `None`.
    fn search(&mut self) -> Option<Path<F, N>>;

    /// The tree(s) grown so far, for visualisation and invariant checks.
    fn trees(&self) -> &[Tree<F, N>];

    /// Number of samples drawn so far.
    fn samples_taken(&self) -> usize;
}

/// Shared planner state and primitives.
///
/// Each planner owns one of these with one tree (single-tree variants) or
/// two (bidirectional variants, tree 0 rooted at `x_init` and tree 1 at
/// `x_goal`). All randomness of a run flows through the single `rng`, so a
/// fixed seed reproduces the run exactly.
pub(crate) struct RRTBase<F: Coord, const N: usize> {
    pub space: SearchSpace<F, N>,
    pub trees: Vec<Tree<F, N>>,
    pub x_init: Point<F, N>,
    pub x_goal: Point<F, N>,
    pub q: Vec<(F, usize)>,
    pub r: F,
    pub prc: f64,
    pub max_samples: usize,
    pub samples_taken: usize,
    pub rewire_count: Option<usize>,
    pub c_best: F,
    pub sigma_best: Option<Path<F, N>>,
    pub swapped: bool,
    pub rng: StdRng,
}

impl<F: Coord, const N: usize> RRTBase<F, N> {
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
        tree_count: usize,
    ) -> Result<Self, ConfigError> {
        if r <= F::zero() {
            return Err(ConfigError::NonPositiveResolution);
        }
        if !(0.0..=1.0).contains(&prc) {
            return Err(ConfigError::ProbabilityOutOfRange);
        }
        if q.is_empty() || q.iter().any(|(length, count)| *length <= F::zero() || *count == 0) {
            return Err(ConfigError::DegenerateSchedule);
        }
        Ok(Self {
            space,
            trees: (0..tree_count).map(|_| Tree::new()).collect(),
            x_init,
            x_goal,
            q,
            r,
            prc,
            max_samples,
            samples_taken: 0,
            rewire_count,
            c_best: <F as num_traits::Float>::infinity(),
            sigma_best: None,
            swapped: false,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// The longest edge length in the schedule; the goal is only probed
    /// from vertices within this distance.
    pub fn max_edge_length(&self) -> F {
        self.q.iter().map(|(length, _)| *length).fold(F::zero(), <F as num_traits::Float>::max)
    }

    pub fn add_vertex(&mut self, tree: usize, point: Point<F, N>) -> usize {
        self.trees[tree].add_vertex(point)
    }

    pub fn add_edge(&mut self, tree: usize, child: usize, parent: Option<usize>) {
        self.trees[tree].add_edge(child, parent);
    }

    /// Draws a free sample, steers a bounded step from the nearest vertex
    /// towards it and screens the result.
    ///
    /// Returns the steered point (or `None` when it is already a vertex or
    /// sits inside an obstacle) together with the nearest vertex id.
    pub fn new_and_near(&mut self, tree: usize, step: F) -> (Option<Point<F, N>>, usize) {
        let x_rand = self.space.sample_free(&mut self.rng);
        let nearest = self.trees[tree]
            .nearest_one(&x_rand)
            .expect("tree has a root before sampling starts");
        let x_new = steer(&self.space, self.trees[tree].point(nearest), &x_rand, step);
        self.samples_taken += 1;
        if self.trees[tree].contains(&x_new) || !self.space.obstacle_free(&x_new) {
            return (None, nearest);
        }
        (Some(x_new), nearest)
    }

    /// Inserts `b` as a child of vertex `a` when the edge between them is
    /// collision-free and `b` is not yet a vertex. Returns the new id.
    pub fn connect_to_point(&mut self, tree: usize, a: usize, b: Point<F, N>) -> Option<usize> {
        if self.trees[tree].contains(&b) {
            return None;
        }
        let a_point = *self.trees[tree].point(a);
        if !self.space.collision_free(&a_point, &b, self.r) {
            return None;
        }
        let id = self.trees[tree].add_vertex(b);
        self.trees[tree].add_edge(id, Some(a));
        Some(id)
    }

    /// Cost of the unique parent chain from the vertex up to its root.
    pub fn path_cost(&self, tree: usize, id: usize) -> F {
        let t = &self.trees[tree];
        let mut cost = F::zero();
        let mut cur = id;
        while let Some(parent) = t.parent(cur) {
            cost = cost + euclidean_distance(t.point(cur), t.point(parent));
            cur = parent;
        }
        cost
    }

    /// The root-to-leaf vertex sequence obtained by walking parent links.
    pub fn reconstruct_path(&self, tree: usize, leaf: usize) -> Path<F, N> {
        let t = &self.trees[tree];
        let mut path = vec![*t.point(leaf)];
        let mut cur = leaf;
        let mut steps = 0usize;
        while let Some(parent) = t.parent(cur) {
            path.push(*t.point(parent));
            cur = parent;
            steps += 1;
            assert!(steps <= t.len(), "parent chain does not reach the root");
        }
        path.reverse();
        path
    }

    /// Whether `descendant`'s parent chain passes through `ancestor`
    /// (a vertex counts as its own ancestor).
    pub fn is_ancestor(&self, tree: usize, ancestor: usize, descendant: usize) -> bool {
        let mut cur = Some(descendant);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.trees[tree].parent(id);
        }
        false
    }

    /// Size of the nearby set considered for re-parenting: every vertex
    /// when no rewire count was configured, otherwise at most the
    /// configured count.
    pub fn current_rewire_count(&self, tree: usize) -> usize {
        match self.rewire_count {
            None => self.trees[tree].len(),
            Some(k) => k.min(self.trees[tree].len()),
        }
    }

    /// The `count` vertices nearest to `x_new` paired with their
    /// cost-to-come through the tree plus the connecting segment, sorted
    /// ascending by that cost.
    pub fn get_nearby_vertices(
        &self,
        tree: usize,
        x_new: &Point<F, N>,
        count: usize,
    ) -> Vec<(F, usize)> {
        let mut candidates: Vec<(F, usize)> = self.trees[tree]
            .nearest(x_new, count)
            .into_iter()
            .map(|id| {
                let segment = euclidean_distance(self.trees[tree].point(id), x_new);
                (self.path_cost(tree, id) + segment, id)
            })
            .collect();
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("costs are never NaN"));
        candidates
    }

    /// Choose-parent step: connects `x_new` to the first candidate whose
    /// total-cost lower bound beats the best known solution and whose edge
    /// is collision-free. Returns the inserted id, or `None` when no
    /// candidate qualifies (in which case `x_new` is discarded).
    pub fn connect_shortest_valid(
        &mut self,
        tree: usize,
        x_new: Point<F, N>,
        l_near: &[(F, usize)],
    ) -> Option<usize> {
        for &(cost, near) in l_near {
            let near_point = *self.trees[tree].point(near);
            if cost + euclidean_distance(&near_point, &self.x_goal) < self.c_best
                && self.space.collision_free(&near_point, &x_new, self.r)
            {
                let id = self.trees[tree].add_vertex(x_new);
                self.trees[tree].add_edge(id, Some(near));
                return Some(id);
            }
        }
        None
    }

    /// Rewire step: re-parents each nearby vertex through the new vertex
    /// whenever that shortens its cost-to-come and the edge is
    /// collision-free. Segment validity is re-checked every time, never
    /// cached.
    pub fn rewire(&mut self, tree: usize, new_id: usize, l_near: &[(F, usize)]) {
        let x_new = *self.trees[tree].point(new_id);
        for &(_, near) in l_near {
            let near_point = *self.trees[tree].point(near);
            let through_new =
                self.path_cost(tree, new_id) + euclidean_distance(&x_new, &near_point);
            if through_new < self.path_cost(tree, near)
                && self.space.collision_free(&x_new, &near_point, self.r)
            {
                self.trees[tree].add_edge(near, Some(new_id));
            }
        }
    }

    /// Cross-tree connection step of the bidirectional planners: attaches
    /// `x_new` (already a vertex of tree 0) into tree 1 through the first
    /// candidate improving on the best known solution, and records the new
    /// best path.
    pub fn connect_trees(
        &mut self,
        x_new_id: usize,
        x_new: Point<F, N>,
        l_near_opp: &[(F, usize)],
    ) {
        for &(cost, near) in l_near_opp {
            let c_tent = cost + self.path_cost(0, x_new_id);
            if c_tent >= self.c_best {
                continue;
            }
            let near_point = *self.trees[1].point(near);
            if !self.space.collision_free(&near_point, &x_new, self.r) {
                continue;
            }
            let id_in_opp = self.trees[1].add_vertex(x_new);
            self.trees[1].add_edge(id_in_opp, Some(near));
            self.c_best = c_tent;
            let sigma_a = self.reconstruct_path(0, x_new_id);
            let mut sigma_b = self.reconstruct_path(1, id_in_opp);
            sigma_b.pop();
            sigma_b.reverse();
            let mut sigma = sigma_a;
            sigma.extend(sigma_b);
            self.sigma_best = Some(sigma);
            break;
        }
    }

    /// Whether the goal is within steering range of the tree and reachable
    /// without collision. Returns the id of the vertex to connect through.
    pub fn can_connect_to_goal(&self, tree: usize) -> Option<usize> {
        let nearest = self.trees[tree].nearest_one(&self.x_goal)?;
        let nearest_point = self.trees[tree].point(nearest);
        if euclidean_distance(nearest_point, &self.x_goal) > self.max_edge_length() {
            return None;
        }
        if !self.space.collision_free(nearest_point, &self.x_goal, self.r) {
            return None;
        }
        Some(nearest)
    }

    /// Attaches the goal to the tree if reachable and returns the full
    /// path, updating the best known cost.
    fn try_goal_path(&mut self) -> Option<Path<F, N>> {
        let nearest = self.can_connect_to_goal(0)?;
        let goal_id = self.trees[0].add_vertex(self.x_goal);
        self.trees[0].add_edge(goal_id, Some(nearest));
        let path = self.reconstruct_path(0, goal_id);
        let cost = path_length(&path);
        if cost < self.c_best {
            self.c_best = cost;
        }
        Some(path)
    }

    /// Single-tree termination check: with probability `prc` probe the
    /// goal, and once the sample budget is spent probe it unconditionally.
    /// `Some(result)` means the search loop must stop.
    pub fn check_solution(&mut self) -> Option<Option<Path<F, N>>> {
        if self.prc > 0.0 && self.rng.gen_bool(self.prc) {
            debug!(samples = self.samples_taken, "probing goal connection");
            if let Some(path) = self.try_goal_path() {
                debug!(samples = self.samples_taken, "goal connected");
                return Some(Some(path));
            }
        }
        if self.samples_taken >= self.max_samples {
            debug!(samples = self.samples_taken, "sample budget exhausted");
            return Some(self.try_goal_path());
        }
        None
    }

    /// Bidirectional termination check: the probe inspects the recorded
    /// best path instead of attempting a fresh goal connection.
    pub fn check_solution_bidirectional(&mut self) -> Option<Option<Path<F, N>>> {
        if self.prc > 0.0 && self.rng.gen_bool(self.prc) {
            debug!(samples = self.samples_taken, "probing for a recorded solution");
            if self.sigma_best.is_some() {
                self.unswap_bidirectional();
                return Some(self.sigma_best.clone());
            }
        }
        if self.samples_taken >= self.max_samples {
            debug!(samples = self.samples_taken, "sample budget exhausted");
            self.unswap_bidirectional();
            return Some(self.sigma_best.clone());
        }
        None
    }

    /// Swaps the two trees. Endpoints are swapped separately because
    /// RRT-Connect keeps them fixed while the starred variants swap both.
    pub fn swap_trees(&mut self) {
        self.trees.swap(0, 1);
        self.swapped = !self.swapped;
    }

    pub fn swap_endpoints(&mut self) {
        std::mem::swap(&mut self.x_init, &mut self.x_goal);
    }

    /// Restores tree order for RRT-Connect before a path is assembled.
    pub fn unswap(&mut self) {
        if self.swapped {
            self.swap_trees();
        }
    }

    /// Restores tree order and endpoints for the bidirectional starred
    /// variants, re-orienting the best path to start at `x_init`.
    pub fn unswap_bidirectional(&mut self) {
        if self.swapped {
            self.swap_trees();
            self.swap_endpoints();
        }
        if let Some(sigma) = &mut self.sigma_best {
            if sigma.first() != Some(&self.x_init) {
                sigma.reverse();
            }
        }
    }
}
