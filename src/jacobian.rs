use faer::Mat;

use crate::{Dataset, ParametricModel};

/// Finite-difference approximation of the model's sensitivity to each
/// parameter.
///
/// Returns a `p × (n·m)` matrix: one row per parameter, one column per
/// flattened sample (series `j`, point `i` lands in column `j·m + i`, the
/// same layout the residual and weight vectors use). Row `k` holds
/// `(f(params) - f(params + h_k·e_k)) / h_k`, the *negative* partial
/// derivative; the solver loop subtracts the resulting perturbation, so the
/// signs cancel into a descent step.
///
/// `evaluated` is the model's output at the unperturbed parameters, one
/// entry per flattened sample, computed by the caller and shared with the
/// residual calculation.
pub(crate) fn approximate<M: ParametricModel>(
    data: &Dataset,
    evaluated: &[f64],
    parameters: &[f64],
    gradient_difference: &[f64],
    model: &M,
    central_difference: bool,
) -> Mat<f64> {
    let m = data.point_count();
    let n = data.series_count();
    let mut jacobian = Mat::zeros(parameters.len(), n * m);

    for (k, &h) in gradient_difference.iter().enumerate() {
        // A zero step would divide by zero. Leave the row zero instead:
        // the damped solve then assigns this parameter a zero perturbation.
        if h == 0.0 {
            continue;
        }

        if central_difference {
            // Perturb by ±h/2 symmetrically, second-order accurate.
            let mut aux = parameters.to_vec();
            aux[k] = parameters[k] - h / 2.0;
            let predict_below = model.parameterize(&aux);
            aux[k] = parameters[k] + h / 2.0;
            let predict_above = model.parameterize(&aux);
            for series in 0..n {
                for point in 0..m {
                    let x = data.x(series, point);
                    jacobian[(k, series * m + point)] = (predict_below(x) - predict_above(x)) / h;
                }
            }
        } else {
            let mut aux = parameters.to_vec();
            aux[k] += h;
            let predict_above = model.parameterize(&aux);
            for series in 0..n {
                for point in 0..m {
                    let column = series * m + point;
                    jacobian[(k, column)] =
                        (evaluated[column] - predict_above(data.x(series, point))) / h;
                }
            }
        }
    }

    jacobian
}
