use std::time::Duration;

/// Errors raised while validating a fit's configuration, before any
/// optimization step runs. These are never retried and always surfaced
/// to the caller as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum ConfigError {
    /// The damping option must be positive.
    #[error("The damping option must be a positive number, got {damping}")]
    NonPositiveDamping {
        /// The rejected damping value.
        damping: f64,
    },
    /// Each data series needs at least two sample points.
    #[error("Each data series must hold at least 2 points, got {points}")]
    NotEnoughPoints {
        /// How many points the data actually held.
        points: usize,
    },
    /// `x` and `y` must have the same number of coordinate series.
    #[error("Data x and y must have the same number of series ({x} vs {y})")]
    SeriesCountMismatch {
        /// How many x series were given.
        x: usize,
        /// How many y series were given.
        y: usize,
    },
    /// Every series must have the same number of points.
    #[error("Every data series must have the same length (expected {expected}, got {actual})")]
    RaggedSeries {
        /// The length of the first series.
        expected: usize,
        /// The length of the offending series.
        actual: usize,
    },
    /// Initial parameter values are mandatory.
    #[error("The initial_values option is mandatory and must be non-empty")]
    MissingInitialValues,
    /// Bounds arrays must be sized to the parameter count.
    #[error(
        "min_values and max_values must both have one entry per parameter (got {min} and {max} for {parameters} parameters)"
    )]
    BoundsSize {
        /// How many lower bounds were given.
        min: usize,
        /// How many upper bounds were given.
        max: usize,
        /// How many parameters the fit has.
        parameters: usize,
    },
    /// A per-parameter gradient step array must be sized to the parameter
    /// count.
    #[error(
        "gradient_difference must be a number or an array with one entry per parameter (expected {expected}, got {actual})"
    )]
    GradientStepSize {
        /// How many parameters the fit has.
        expected: usize,
        /// How many step sizes were given.
        actual: usize,
    },
    /// A per-point weights array must be sized to the sample count.
    #[error(
        "weights must be a number or an array with one entry per data point (expected {expected}, got {actual})"
    )]
    WeightsSize {
        /// How many sample points the data has.
        expected: usize,
        /// How many weights were given.
        actual: usize,
    },
}

/// Anything that can stop a fit from producing a result.
#[derive(thiserror::Error, Debug)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum Error {
    /// The configuration was rejected before any iteration ran.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The wall-clock budget ran out mid-optimization. The best-so-far
    /// result is discarded, not returned.
    #[error("The optimization ran past its time limit of {}s", .limit.as_secs_f64())]
    Timeout {
        /// The configured limit.
        limit: Duration,
    },
}
