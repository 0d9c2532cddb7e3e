use crate::base::{Path, Planner, RRTBase};
use crate::distance::l1_distance;
use crate::error::ConfigError;
use crate::point::Point;
use crate::space::SearchSpace;
use crate::steering::steer;
use crate::tree::Tree;
use crate::Coord;

/// Outcome of a single extension attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The edge to the steered point was blocked or a duplicate.
    Trapped,
    /// A step was taken but the target is still ahead.
    Advanced,
    /// The steered point landed on the target.
    Reached,
}

/// The bidirectional RRT-Connect planner.
///
/// Grows one tree from the start and one from the goal, alternating roles
/// every iteration: the active tree extends one step towards a random
/// sample, then the other tree greedily extends towards the new vertex
/// until it reaches it or gets trapped. A reach joins the trees.
///
/// The step length is a single scalar; RRT-Connect takes no edge-length
/// schedule.
pub struct RRTConnect<F: Coord, const N: usize> {
    base: RRTBase<F, N>,
}

impl<F: Coord, const N: usize> RRTConnect<F, N> {
    /// Constructs the planner.
    ///
    /// Parameters:
    /// - `space`: The configuration space, owned for the whole plan.
    /// - `x_init`: The start location, root of tree 0.
    /// - `x_goal`: The goal location, root of tree 1.
    /// - `step`: The extension step length.
    /// - `r`: The collision sampling resolution along edges.
    /// - `max_samples`: The sample budget (outer iterations).
    pub fn new(
        space: SearchSpace<F, N>,
        x_init: Point<F, N>,
        x_goal: Point<F, N>,
        step: F,
        r: F,
        max_samples: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base: RRTBase::new(
                space,
                x_init,
                x_goal,
                vec![(step, 1)],
                r,
                0.0,
                max_samples,
                None,
                2,
            )?,
        })
    }

    /// Seeds the planner's random generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base.seed(seed);
        self
    }

    fn step(&self) -> F {
        self.base.q[0].0
    }

    // Arrival is judged in L1 with a hard 1e-2 tolerance, a coarse test
    // kept from the reference behaviour of this planner family.
    fn reached_tolerance() -> F {
        F::from(1e-2).expect("tolerance fits in the coordinate type")
    }

    /// One bounded step of `tree` towards `x_rand`.
    fn extend(&mut self, tree: usize, x_rand: &Point<F, N>) -> (Point<F, N>, Status) {
        let nearest = self.base.trees[tree]
            .nearest_one(x_rand)
            .expect("tree has a root before extension starts");
        let nearest_point = *self.base.trees[tree].point(nearest);
        let x_new = steer(&self.base.space, &nearest_point, x_rand, self.step());
        if self.base.connect_to_point(tree, nearest, x_new).is_some() {
            if l1_distance(&x_new, x_rand) < Self::reached_tolerance() {
                return (x_new, Status::Reached);
            }
            return (x_new, Status::Advanced);
        }
        (x_new, Status::Trapped)
    }

    /// Greedy extension of `tree` towards `x` until it reaches or traps.
    fn connect(&mut self, tree: usize, x: &Point<F, N>) -> (Point<F, N>, Status) {
        loop {
            let (x_new, status) = self.extend(tree, x);
            if status != Status::Advanced {
                return (x_new, status);
            }
        }
    }
}

impl<F: Coord, const N: usize> Planner<F, N> for RRTConnect<F, N> {
    fn search(&mut self) -> Option<Path<F, N>> {
        if self.base.x_init == self.base.x_goal {
            return Some(vec![self.base.x_init]);
        }
        let root_a = self.base.add_vertex(0, self.base.x_init);
        self.base.add_edge(0, root_a, None);
        let root_b = self.base.add_vertex(1, self.base.x_goal);
        self.base.add_edge(1, root_b, None);

        while self.base.samples_taken < self.base.max_samples {
            let x_rand = self.base.space.sample_free(&mut self.base.rng);
            let (x_new, status) = self.extend(0, &x_rand);
            if status != Status::Trapped {
                let (x_meet, connect_status) = self.connect(1, &x_new);
                if connect_status == Status::Reached {
                    self.base.unswap();
                    let leaf_a = self.base.trees[0]
                        .nearest_one(&x_meet)
                        .expect("tree has a root");
                    let leaf_b = self.base.trees[1]
                        .nearest_one(&x_meet)
                        .expect("tree has a root");
                    let mut path = self.base.reconstruct_path(0, leaf_a);
                    let mut second = self.base.reconstruct_path(1, leaf_b);
                    second.reverse();
                    path.extend(second);
                    return Some(path);
                }
            }
            self.base.swap_trees();
            self.base.samples_taken += 1;
        }
        None
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
    use crate::collision::Hyperrect;

    fn open_connect() -> RRTConnect<f64, 2> {
        let space = SearchSpace::new([(0.0, 100.0); 2], Vec::new()).unwrap();
        RRTConnect::new(
            space,
            Point::new([0.0, 0.0]),
            Point::new([100.0, 0.0]),
            5.0,
            1.0,
            100,
        )
        .unwrap()
        .with_seed(13)
    }

    #[test]
    fn extend_advances_by_one_step() {
        let mut planner = open_connect();
        let root = planner.base.add_vertex(0, Point::new([0.0, 0.0]));
        planner.base.add_edge(0, root, None);

        let target = Point::new([20.0, 0.0]);
        let (x_new, status) = planner.extend(0, &target);
        assert_eq!(status, Status::Advanced);
        assert_eq!(x_new, Point::new([5.0, 0.0]));
        assert_eq!(planner.base.trees[0].len(), 2);
    }

    #[test]
    fn connect_reaches_an_aligned_target() {
        let mut planner = open_connect();
        let root = planner.base.add_vertex(0, Point::new([0.0, 0.0]));
        planner.base.add_edge(0, root, None);

        // The target sits an exact multiple of the step away, so the walk
        // lands on it.
        let target = Point::new([20.0, 0.0]);
        let (x_new, status) = planner.connect(0, &target);
        assert_eq!(status, Status::Reached);
        assert_eq!(x_new, target);
    }

    #[test]
    fn connect_traps_on_a_wall() {
        let wall = Hyperrect::new([8.0, 0.0], [12.0, 100.0]).unwrap();
        let space = SearchSpace::new([(0.0, 100.0); 2], vec![wall]).unwrap();
        let mut planner = RRTConnect::new(
            space,
            Point::new([0.0, 50.0]),
            Point::new([100.0, 50.0]),
            5.0,
            1.0,
            100,
        )
        .unwrap()
        .with_seed(14);
        let root = planner.base.add_vertex(0, Point::new([0.0, 50.0]));
        planner.base.add_edge(0, root, None);

        let (_, status) = planner.connect(0, &Point::new([20.0, 50.0]));
        assert_eq!(status, Status::Trapped);
    }
}
