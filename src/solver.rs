use libm::{fmax, fmin};

use crate::{
    Dataset, Error, FitOutcome, ParametricModel, cost, jacobian, options::Config, step,
    step::StepResult,
};

/// Damping is clamped into this range after every adaptation, preventing
/// numerical blow-up on one side and permanent stagnation on the other.
const MIN_DAMPING: f64 = 1e-7;
const MAX_DAMPING: f64 = 1e7;

/// Read-only snapshot handed to a fit observer after each completed
/// iteration.
#[derive(Debug)]
pub struct IterationStats<'a> {
    /// How many iterations have completed, including this one.
    pub iteration: usize,
    /// Cost after this iteration's parameter update.
    pub error: f64,
    /// Best cost seen so far.
    pub optimal_error: f64,
    /// Damping after this iteration's adaptation.
    pub damping: f64,
    /// Parameters after this iteration's clamped update.
    pub parameters: &'a [f64],
}

/// Everything the loop mutates while it runs. Owned by [`iterate`]; nothing
/// else writes to it.
struct OptimizationState {
    parameters: Vec<f64>,
    error: f64,
    optimal_parameters: Vec<f64>,
    optimal_error: f64,
    damping: f64,
    iteration: usize,
}

/// The Levenberg-Marquardt control loop.
///
/// Each iteration: approximate the Jacobian, solve the damped normal
/// equations, apply the clamped update, re-evaluate the cost, adapt the
/// damping from the improvement ratio, and check divergence, timeout and
/// convergence. Runs until convergence, divergence, the iteration cap, or
/// deadline expiry.
pub(crate) fn iterate<M: ParametricModel>(
    data: &Dataset,
    model: &M,
    config: Config,
    mut on_iteration: impl FnMut(&IterationStats<'_>),
) -> Result<FitOutcome, Error> {
    let Config {
        deadline,
        min_values,
        max_values,
        parameters,
        weight_square,
        damping,
        damping_step_up,
        damping_step_down,
        max_iterations,
        error_tolerance,
        central_difference,
        gradient_difference,
        improvement_threshold,
    } = config;

    let m = data.point_count();
    let n = data.series_count();

    // One weight per flattened sample, aligned with the Jacobian's columns
    // and the residual vector. Point weights repeat across series.
    let mut flat_weights = Vec::with_capacity(n * m);
    for _ in 0..n {
        flat_weights.extend_from_slice(&weight_square);
    }

    let error = cost::weighted_squared_error(data, &parameters, model, &weight_square);
    let mut state = OptimizationState {
        optimal_parameters: parameters.clone(),
        parameters,
        optimal_error: error,
        error,
        damping,
        iteration: 0,
    };

    let mut converged = state.error <= error_tolerance;

    while state.iteration < max_iterations && !converged {
        let previous_error = state.error;

        // Evaluate the model once at the current parameters; the result
        // feeds both the residual vector and the forward-difference rows
        // of the Jacobian.
        let predict = model.parameterize(&state.parameters);
        let mut evaluated = Vec::with_capacity(n * m);
        let mut residuals = Vec::with_capacity(n * m);
        for series in 0..n {
            for point in 0..m {
                let predicted = predict(data.x(series, point));
                evaluated.push(predicted);
                residuals.push(data.y(series, point) - predicted);
            }
        }

        let jacobian = jacobian::approximate(
            data,
            &evaluated,
            &state.parameters,
            &gradient_difference,
            model,
            central_difference,
        );
        let StepResult {
            perturbation,
            gradient,
        } = step::damped_step(&jacobian, &residuals, &flat_weights, state.damping);

        // The Jacobian's residual sign convention makes subtracting the
        // perturbation a descent step. fmin/fmax keep the clamp from
        // panicking if a caller hands over inverted bounds.
        for k in 0..state.parameters.len() {
            state.parameters[k] = fmin(
                fmax(min_values[k], state.parameters[k] - perturbation[k]),
                max_values[k],
            );
        }

        state.error = cost::weighted_squared_error(data, &state.parameters, model, &weight_square);

        // A NaN cost means the step left the model's domain (or the damped
        // system was singular). Stop and report the best point tracked so
        // far; the caller sees a normal result, not an error.
        if state.error.is_nan() {
            break;
        }

        if state.error < state.optimal_error - error_tolerance {
            state.optimal_error = state.error;
            state.optimal_parameters.copy_from_slice(&state.parameters);
        }

        // Actual cost reduction over the reduction the local quadratic
        // model predicted for this step: δᵗ·(λ·δ + b).
        let predicted_reduction: f64 = perturbation
            .iter()
            .zip(&gradient)
            .map(|(&delta, &b)| delta * (state.damping * delta + b))
            .sum();
        let improvement_metric = (previous_error - state.error) / predicted_reduction;

        if improvement_metric > improvement_threshold {
            state.damping = fmax(state.damping / damping_step_down, MIN_DAMPING);
        } else {
            state.damping = fmin(state.damping * damping_step_up, MAX_DAMPING);
        }

        if let Some(deadline) = &deadline
            && deadline.has_elapsed()
        {
            return Err(Error::Timeout {
                limit: deadline.limit(),
            });
        }

        converged = state.error <= error_tolerance;
        state.iteration += 1;

        on_iteration(&IterationStats {
            iteration: state.iteration,
            error: state.error,
            optimal_error: state.optimal_error,
            damping: state.damping,
            parameters: &state.parameters,
        });
    }

    Ok(FitOutcome {
        parameter_values: state.optimal_parameters,
        parameter_error: state.optimal_error,
        iterations: state.iteration,
    })
}
