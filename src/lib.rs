//! Levenberg-Marquardt curve fitting.
//! Fits a parametric model to sampled data by minimizing the weighted
//! sum of squared residuals with damped Gauss-Newton iteration.

pub use crate::dataset::Dataset;
pub use crate::error::{ConfigError, Error};
pub use crate::model::ParametricModel;
pub use crate::options::{GradientStep, Options, Weights};
pub use crate::outcome::FitOutcome;
pub use crate::solver::IterationStats;

/// Weighted sum-of-squared-residuals cost.
mod cost;
/// Sampled data the model is fitted against.
mod dataset;
/// Wall-clock budget for a single fit.
mod deadline;
/// Errors from validating options or running a fit.
mod error;
/// Finite-difference Jacobian approximation.
mod jacobian;
/// The parametric model being fitted.
mod model;
/// Tuning options and their normalized form.
mod options;
/// The result of a successful fit.
mod outcome;
/// The damped Gauss-Newton iteration loop.
mod solver;
/// The damped normal-equation step.
mod step;
/// Unit tests
#[cfg(test)]
mod tests;

/// Fit `model` to `data`, starting from `options.initial_values`.
///
/// Returns the best parameters seen over the whole run, their weighted
/// squared residual, and how many iterations ran. Fails up front with a
/// [`ConfigError`] if the options or data are malformed, or mid-run with
/// [`Error::Timeout`] if a configured time limit expires.
pub fn fit<M: ParametricModel>(
    data: &Dataset,
    model: &M,
    options: Options,
) -> Result<FitOutcome, Error> {
    fit_with_observer(data, model, options, |_| {})
}

/// Like [`fit`], but calls `on_iteration` with a read-only snapshot after
/// every completed iteration. Useful for logging or convergence studies.
pub fn fit_with_observer<M: ParametricModel>(
    data: &Dataset,
    model: &M,
    options: Options,
    on_iteration: impl FnMut(&IterationStats<'_>),
) -> Result<FitOutcome, Error> {
    let config = options.normalize(data)?;
    solver::iterate(data, model, config, on_iteration)
}
