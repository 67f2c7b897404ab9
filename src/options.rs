use std::time::Duration;

use crate::{ConfigError, Dataset, deadline::Deadline};

/// Inverse-variance weighting for the sample points.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    /// The same weight for every sample point.
    Uniform(f64),
    /// One weight per sample point, shared across that point's series.
    PerPoint(Vec<f64>),
}

impl Default for Weights {
    fn default() -> Self {
        Weights::Uniform(1.0)
    }
}

/// Step sizes for the finite-difference Jacobian approximation.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientStep {
    /// The same step for every parameter.
    Uniform(f64),
    /// One step per parameter, for parameters with heterogeneous scales.
    PerParameter(Vec<f64>),
}

impl Default for GradientStep {
    fn default() -> Self {
        GradientStep::Uniform(1e-1)
    }
}

/// Tuning options for a fit.
///
/// Build one with [`Options::new`] and adjust individual knobs through the
/// `with_*` methods. All fields are public, so struct update syntax works
/// too.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Where the parameter search starts. Mandatory, non-empty.
    pub initial_values: Vec<f64>,
    /// Per-parameter lower bounds. `None` means effectively unbounded.
    pub min_values: Option<Vec<f64>>,
    /// Per-parameter upper bounds. `None` means effectively unbounded.
    pub max_values: Option<Vec<f64>>,
    /// Inverse-variance weights for the sample points.
    pub weights: Weights,
    /// Initial Levenberg-Marquardt damping. Small values give Gauss-Newton
    /// updates, large values gradient descent. Must be positive.
    pub damping: f64,
    /// Factor the damping grows by when an update fails to improve.
    pub damping_step_up: f64,
    /// Factor the damping shrinks by when an update improves.
    pub damping_step_down: f64,
    /// Hard cap on the number of iterations.
    pub max_iterations: usize,
    /// Cost at or below this counts as converged; also the margin a new
    /// cost must beat the best-so-far by before it replaces it.
    pub error_tolerance: f64,
    /// Approximate the Jacobian by central differences instead of forward
    /// differences: second-order accuracy at twice the evaluation cost.
    pub central_difference: bool,
    /// Step sizes for the finite-difference Jacobian.
    pub gradient_difference: GradientStep,
    /// The improvement ratio an update must exceed for the step to count
    /// as trusting the local quadratic model.
    pub improvement_threshold: f64,
    /// Wall-clock limit for the whole fit, checked once per iteration.
    pub timeout: Option<Duration>,
}

impl Options {
    /// Options starting the search at `initial_values`, with every other
    /// knob at its default.
    pub fn new(initial_values: impl Into<Vec<f64>>) -> Self {
        Self {
            initial_values: initial_values.into(),
            min_values: None,
            max_values: None,
            weights: Weights::default(),
            damping: 1e-2,
            damping_step_up: 11.0,
            damping_step_down: 9.0,
            max_iterations: 100,
            error_tolerance: 1e-7,
            central_difference: false,
            gradient_difference: GradientStep::default(),
            improvement_threshold: 1e-3,
            timeout: None,
        }
    }

    /// Set per-parameter lower bounds.
    pub fn with_min_values(mut self, min_values: Vec<f64>) -> Self {
        self.min_values = Some(min_values);
        self
    }

    /// Set per-parameter upper bounds.
    pub fn with_max_values(mut self, max_values: Vec<f64>) -> Self {
        self.max_values = Some(max_values);
        self
    }

    /// Set the sample-point weights.
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the initial damping.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set how fast damping grows on a failed update.
    pub fn with_damping_step_up(mut self, factor: f64) -> Self {
        self.damping_step_up = factor;
        self
    }

    /// Set how fast damping shrinks on a successful update.
    pub fn with_damping_step_down(mut self, factor: f64) -> Self {
        self.damping_step_down = factor;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_error_tolerance(mut self, error_tolerance: f64) -> Self {
        self.error_tolerance = error_tolerance;
        self
    }

    /// Use central instead of forward differences for the Jacobian.
    pub fn with_central_difference(mut self, enabled: bool) -> Self {
        self.central_difference = enabled;
        self
    }

    /// Set the finite-difference step sizes.
    pub fn with_gradient_difference(mut self, step: GradientStep) -> Self {
        self.gradient_difference = step;
        self
    }

    /// Set the improvement-ratio threshold for damping adaptation.
    pub fn with_improvement_threshold(mut self, threshold: f64) -> Self {
        self.improvement_threshold = threshold;
        self
    }

    /// Set a wall-clock limit for the fit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate these options against `data` and expand every
    /// scalar-or-array field into its full per-parameter/per-point form.
    ///
    /// All configuration errors are raised here, before the solver takes a
    /// single step.
    pub(crate) fn normalize(&self, data: &Dataset) -> Result<Config, ConfigError> {
        if self.damping <= 0.0 {
            return Err(ConfigError::NonPositiveDamping {
                damping: self.damping,
            });
        }

        let points = data.point_count();
        if points < 2 {
            return Err(ConfigError::NotEnoughPoints { points });
        }
        if data.x_series().len() != data.y_series().len() {
            return Err(ConfigError::SeriesCountMismatch {
                x: data.x_series().len(),
                y: data.y_series().len(),
            });
        }
        for series in data.x_series().iter().chain(data.y_series()) {
            if series.len() != points {
                return Err(ConfigError::RaggedSeries {
                    expected: points,
                    actual: series.len(),
                });
            }
        }

        if self.initial_values.is_empty() {
            return Err(ConfigError::MissingInitialValues);
        }
        let par_len = self.initial_values.len();

        let min_values = self
            .min_values
            .clone()
            .unwrap_or_else(|| vec![f64::MIN; par_len]);
        let max_values = self
            .max_values
            .clone()
            .unwrap_or_else(|| vec![f64::MAX; par_len]);
        if min_values.len() != max_values.len() || min_values.len() != par_len {
            return Err(ConfigError::BoundsSize {
                min: min_values.len(),
                max: max_values.len(),
                parameters: par_len,
            });
        }

        let gradient_difference = match &self.gradient_difference {
            GradientStep::Uniform(step) => vec![*step; par_len],
            GradientStep::PerParameter(steps) if steps.len() == par_len => steps.clone(),
            GradientStep::PerParameter(steps) => {
                return Err(ConfigError::GradientStepSize {
                    expected: par_len,
                    actual: steps.len(),
                });
            }
        };

        let weight_square = match &self.weights {
            Weights::Uniform(weight) => vec![1.0 / (weight * weight); points],
            Weights::PerPoint(weights) if weights.len() == points => {
                weights.iter().map(|w| 1.0 / (w * w)).collect()
            }
            Weights::PerPoint(weights) => {
                return Err(ConfigError::WeightsSize {
                    expected: points,
                    actual: weights.len(),
                });
            }
        };

        Ok(Config {
            deadline: self.timeout.map(Deadline::starting_now),
            min_values,
            max_values,
            parameters: self.initial_values.clone(),
            weight_square,
            damping: self.damping,
            damping_step_up: self.damping_step_up,
            damping_step_down: self.damping_step_down,
            max_iterations: self.max_iterations,
            error_tolerance: self.error_tolerance,
            central_difference: self.central_difference,
            gradient_difference,
            improvement_threshold: self.improvement_threshold,
        })
    }
}

/// The fully-expanded configuration the solver loop runs on. Produced once
/// by [`Options::normalize`] before the loop starts; immutable afterwards.
pub(crate) struct Config {
    pub deadline: Option<Deadline>,
    pub min_values: Vec<f64>,
    pub max_values: Vec<f64>,
    pub parameters: Vec<f64>,
    /// `1 / weight²` per sample point.
    pub weight_square: Vec<f64>,
    pub damping: f64,
    pub damping_step_up: f64,
    pub damping_step_down: f64,
    pub max_iterations: usize,
    pub error_tolerance: f64,
    pub central_difference: bool,
    /// One finite-difference step per parameter.
    pub gradient_difference: Vec<f64>,
    pub improvement_threshold: f64,
}
