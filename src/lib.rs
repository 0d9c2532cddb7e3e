//! Sampling-based motion planning in bounded axis-aligned configuration
//! spaces with hyperrectangular obstacles.
//!
//! Five planners share one skeleton: the baseline [`RRT`], the
//! asymptotically-optimal [`RRTStar`], the bidirectional [`RRTConnect`],
//! the bidirectional [`RRTStarBidirectional`] and the heuristic-accelerated
//! [`RRTStarBidirectionalHeuristic`] with lazy path contraction.
//!
//! ```
//! use rrt_planners::{Hyperrect, Planner, Point, SearchSpace, RRT};
//!
//! let obstacle = Hyperrect::new([20.0, 20.0], [40.0, 40.0]).unwrap();
//! let space = SearchSpace::new([(0.0, 100.0); 2], vec![obstacle]).unwrap();
//! let mut planner = RRT::new(
//!     space,
//!     Point::new([0.0, 0.0]),
//!     Point::new([100.0, 100.0]),
//!     vec![(10.0, 4)],
//!     1.0,
//!     0.1,
//!     5000,
//! )
//! .unwrap()
//! .with_seed(7);
//! let path = planner.search().expect("open space is always solvable");
//! assert_eq!(path[0], Point::new([0.0, 0.0]));
//! ```

pub mod base;
pub mod collision;
pub mod distance;
pub mod error;
pub mod point;
pub mod rrt;
pub mod rrt_connect;
pub mod rrt_star;
pub mod rrt_star_bid;
pub mod rrt_star_bid_h;
pub mod smoothing;
pub mod space;
pub mod steering;
pub mod tree;

// Re-export symbols in submodules for convenience.
pub use crate::base::{Path, Planner};
pub use crate::collision::Hyperrect;
pub use crate::error::ConfigError;
pub use crate::point::Point;
pub use crate::rrt::RRT;
pub use crate::rrt_connect::{RRTConnect, Status};
pub use crate::rrt_star::RRTStar;
pub use crate::rrt_star_bid::RRTStarBidirectional;
pub use crate::rrt_star_bid_h::RRTStarBidirectionalHeuristic;
pub use crate::space::SearchSpace;
pub use crate::tree::{Node, Tree};

use kiddo::float::kdtree::Axis;
use num_traits::float::Float;
use rand::distributions::uniform::SampleUniform;
use rstar::RTreeNum;
use std::fmt::Debug;

/// Scalar coordinate type accepted by every planner; `f32` and `f64` in
/// practice. Bundles the float, kd-tree axis, R-tree scalar and uniform
/// sampling requirements of the underlying indexes.
pub trait Coord: Float + Axis + RTreeNum + SampleUniform + Debug {}

impl<T> Coord for T where T: Float + Axis + RTreeNum + SampleUniform + Debug {}
