use faer::{Mat, prelude::Solve};

/// Output of one damped normal-equation solve.
pub(crate) struct StepResult {
    /// The parameter perturbation `A⁻¹·b`. The solver loop subtracts it
    /// from the current parameters.
    pub perturbation: Vec<f64>,
    /// The weighted residual-gradient `b = J·diag(W)·r`, reused by the
    /// solver loop to compute the improvement ratio.
    pub gradient: Vec<f64>,
}

/// Solve `(λ·I + J·diag(W)·Jᵗ) · δ = J·diag(W)·r` for the perturbation `δ`.
///
/// `A` is symmetric and ridge-regularized by the damping term, so a direct
/// LU solve beats explicit inversion for robustness. If `A` is singular
/// anyway, the solution comes back non-finite and the solver loop's NaN
/// guard absorbs it on the next cost evaluation; there are no retries here.
pub(crate) fn damped_step(
    jacobian: &Mat<f64>,
    residuals: &[f64],
    weights: &[f64],
    damping: f64,
) -> StepResult {
    let params = jacobian.nrows();
    let samples = jacobian.ncols();

    // J·diag(W): scale each column by its sample's weight.
    let mut weighted = jacobian.clone();
    for sample in 0..samples {
        for param in 0..params {
            weighted[(param, sample)] *= weights[sample];
        }
    }

    // A = λ·I + J·diag(W)·Jᵗ
    let mut a = &weighted * jacobian.transpose();
    for k in 0..params {
        a[(k, k)] += damping;
    }

    // b = J·diag(W)·r
    let r = Mat::from_fn(samples, 1, |sample, _| residuals[sample]);
    let b = &weighted * &r;

    let factored = a.full_piv_lu();
    let delta = factored.solve(&b);

    StepResult {
        perturbation: (0..params).map(|k| delta[(k, 0)]).collect(),
        gradient: (0..params).map(|k| b[(k, 0)]).collect(),
    }
}
