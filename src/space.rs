use crate::collision::Hyperrect;
use crate::distance::euclidean_distance;
use crate::error::ConfigError;
use crate::point::Point;
use crate::Coord;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rstar::{RTree, AABB};

/// A bounded axis-aligned configuration space with hyperrectangular
/// obstacles.
///
/// The space is immutable once built. Sampling draws from an external
/// generator so that a planner owning the space stays deterministic under a
/// fixed seed.
pub struct SearchSpace<F: Coord, const N: usize> {
    dimension_lengths: [(F, F); N],
    obstacles: RTree<Hyperrect<F, N>>,
    uniforms: [Uniform<F>; N],
}

impl<F: Coord, const N: usize> SearchSpace<F, N> {
    /// Constructs a search space from per-dimension bounds and an obstacle
    /// list.
    ///
    /// Parameters:
    /// - `dimension_lengths`: The `(lo, hi)` range of each dimension.
    /// - `obstacles`: The obstacles to index. Obstacles may clip the bounds.
    ///
    /// Returns:
    /// The search space, or an error if fewer than two dimensions are given
    /// or some range is empty or inverted.
    pub fn new(
        dimension_lengths: [(F, F); N],
        obstacles: Vec<Hyperrect<F, N>>,
    ) -> Result<Self, ConfigError> {
        if N < 2 {
            return Err(ConfigError::TooFewDimensions);
        }
        for (i, (lo, hi)) in dimension_lengths.iter().enumerate() {
            if lo >= hi {
                return Err(ConfigError::MalformedBounds(i));
            }
        }
        let uniforms: [Uniform<F>; N] = std::array::from_fn(|i| {
            Uniform::new_inclusive(dimension_lengths[i].0, dimension_lengths[i].1)
        });
        Ok(Self {
            dimension_lengths,
            obstacles: RTree::bulk_load(obstacles),
            uniforms,
        })
    }

    /// The `(lo, hi)` range of each dimension.
    pub fn dimension_lengths(&self) -> &[(F, F); N] {
        &self.dimension_lengths
    }

    /// Returns a random location within the space, not necessarily free.
    /// Each coordinate is drawn uniformly and independently from its range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point<F, N> {
        Point::new(std::array::from_fn(|i| self.uniforms[i].sample(rng)))
    }

    /// Whether no indexed obstacle contains the location. A point on an
    /// obstacle boundary counts as contained.
    pub fn obstacle_free(&self, x: &Point<F, N>) -> bool {
        self.obstacles
            .locate_in_envelope_intersecting(&AABB::from_point(*x.coords()))
            .next()
            .is_none()
    }

    /// Rejection-samples until a location outside every obstacle is found.
    /// Terminates almost surely as long as free space has positive volume.
    pub fn sample_free<R: Rng + ?Sized>(&self, rng: &mut R) -> Point<F, N> {
        loop {
            let x = self.sample(rng);
            if self.obstacle_free(&x) {
                return x;
            }
        }
    }

    /// Whether the straight segment between two points stays out of every
    /// obstacle, tested at `ceil(dist / r)` equispaced locations including
    /// both endpoints.
    ///
    /// Parameters:
    /// - `start`: The start point of the segment.
    /// - `end`: The end point of the segment.
    /// - `r`: The spacing between consecutive test locations. Must be
    ///   positive; smaller values trade speed for fidelity.
    pub fn collision_free(&self, start: &Point<F, N>, end: &Point<F, N>, r: F) -> bool {
        let dist = euclidean_distance(start, end);
        let samples = <F as num_traits::Float>::ceil(dist / r)
            .to_usize()
            .expect("collision sample count fits in usize");
        match samples {
            0 => true,
            1 => self.obstacle_free(start),
            m => {
                let last = <F as num_traits::NumCast>::from(m - 1)
                    .expect("sample count fits in the coordinate type");
                (0..m).all(|i| {
                    let t = <F as num_traits::NumCast>::from(i)
                        .expect("sample index fits in the coordinate type")
                        / last;
                    self.obstacle_free(&start.lerp(end, t))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn four_block_space() -> SearchSpace<f64, 2> {
        let obstacles = [
            [20.0, 20.0, 40.0, 40.0],
            [20.0, 60.0, 40.0, 80.0],
            [60.0, 20.0, 80.0, 40.0],
            [60.0, 60.0, 80.0, 80.0],
        ]
        .iter()
        .map(|o| Hyperrect::from_flat(o).unwrap())
        .collect();
        SearchSpace::new([(0.0, 100.0); 2], obstacles).unwrap()
    }

    #[test]
    fn rejects_bad_bounds() {
        let result = SearchSpace::<f64, 2>::new([(0.0, 100.0), (50.0, 50.0)], Vec::new());
        assert_eq!(result.err(), Some(ConfigError::MalformedBounds(1)));
    }

    #[test]
    fn samples_stay_in_bounds() {
        let space = four_block_space();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let x = space.sample(&mut rng);
            assert!((0.0..=100.0).contains(&x[0]));
            assert!((0.0..=100.0).contains(&x[1]));
        }
    }

    #[test]
    fn free_samples_avoid_obstacles() {
        let space = four_block_space();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let x = space.sample_free(&mut rng);
            assert!(space.obstacle_free(&x));
            assert!(!(20.0..=40.0).contains(&x[0]) || !(20.0..=40.0).contains(&x[1]));
        }
    }

    #[test]
    fn boundary_is_occupied() {
        let space = four_block_space();
        assert!(!space.obstacle_free(&Point::new([20.0, 20.0])));
        assert!(!space.obstacle_free(&Point::new([40.0, 30.0])));
        assert!(space.obstacle_free(&Point::new([50.0, 50.0])));
    }

    #[test]
    fn segment_sweep() {
        let space = four_block_space();
        // Crosses the lower-left block.
        assert!(!space.collision_free(&Point::new([10.0, 30.0]), &Point::new([50.0, 30.0]), 1.0));
        // Runs through the central corridor.
        assert!(space.collision_free(&Point::new([50.0, 0.0]), &Point::new([50.0, 100.0]), 1.0));
        // Zero-length segments are vacuously free.
        assert!(space.collision_free(&Point::new([30.0, 30.0]), &Point::new([30.0, 30.0]), 1.0));
    }

    #[test]
    fn sweep_is_symmetric() {
        let space = four_block_space();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let a = space.sample(&mut rng);
            let b = space.sample(&mut rng);
            assert_eq!(
                space.collision_free(&a, &b, 1.0),
                space.collision_free(&b, &a, 1.0)
            );
        }
    }
}
