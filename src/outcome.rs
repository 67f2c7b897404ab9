/// Data from a successful fit.
///
/// Carries the best parameters seen across the whole run, not necessarily
/// the last ones tried, so a late divergent step never regresses the
/// reported result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub struct FitOutcome {
    /// The best-fit parameter values.
    pub parameter_values: Vec<f64>,
    /// The weighted squared residual of those parameter values.
    pub parameter_error: f64,
    /// How many iterations the solver ran.
    pub iterations: usize,
}
