use crate::base::{Path, Planner, RRTBase};
use crate::error::ConfigError;
use crate::point::Point;
use crate::space::SearchSpace;
use crate::tree::Tree;
use crate::Coord;

/// The baseline single-tree Rapidly-exploring Random Tree planner.
///
/// Grows one tree from the start, cycling through the edge-length schedule,
/// until the goal can be connected or the sample budget runs out.
pub struct RRT<F: Coord, const N: usize> {
    base: RRTBase<F, N>,
}

impl<F: Coord, const N: usize> RRT<F, N> {
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
    pub fn new(
        space: SearchSpace<F, N>,
        x_init: Point<F, N>,
        x_goal: Point<F, N>,
        q: Vec<(F, usize)>,
        r: F,
        prc: f64,
        max_samples: usize,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base: RRTBase::new(space, x_init, x_goal, q, r, prc, max_samples, None, 1)?,
        })
    }

    /// Seeds the planner's random generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base.seed(seed);
        self
    }
}

impl<F: Coord, const N: usize> Planner<F, N> for RRT<F, N> {
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
                    let (x_new, nearest) = self.base.new_and_near(0, step);
                    let x_new = match x_new {
                        Some(x) => x,
                        None => continue,
                    };

                    self.base.connect_to_point(0, nearest, x_new);

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
