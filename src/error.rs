/// Construction-time validation failure.
///
/// Planning itself never fails: an exhausted sample budget surfaces as a
/// `None` result from `search`, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    /// The configuration space must have at least two dimensions.
    #[display(fmt = "search space must have at least 2 dimensions")]
    TooFewDimensions,
    /// A dimension range with lower bound not strictly below the upper bound.
    #[display(fmt = "dimension {} has an empty or inverted range", _0)]
    MalformedBounds(#[error(not(source))] usize),
    /// An obstacle whose min corner is not strictly below its max corner on
    /// some axis.
    #[display(fmt = "obstacle has an empty or inverted extent on axis {}", _0)]
    MalformedObstacle(#[error(not(source))] usize),
    /// An obstacle described by a flat corner list of the wrong length.
    #[display(fmt = "obstacle does not match the space dimension")]
    ObstacleDimension,
    /// The collision sampling resolution must be positive.
    #[display(fmt = "collision resolution must be positive")]
    NonPositiveResolution,
    /// The goal probe probability must lie in [0, 1].
    #[display(fmt = "goal probe probability must lie in [0, 1]")]
    ProbabilityOutOfRange,
    /// The edge-length schedule must be non-empty with positive lengths and
    /// non-zero attempt counts.
    #[display(fmt = "edge-length schedule is empty or degenerate")]
    DegenerateSchedule,
}
