use crate::{Dataset, ParametricModel};

/// Total weighted squared residual of `parameters` against the data.
///
/// Sums `(y - predicted)² / weight_square[i]` over every sample point of
/// every series. Non-finite predictions flow straight through: a NaN cost
/// is the divergence signal the solver loop watches for.
pub(crate) fn weighted_squared_error<M: ParametricModel>(
    data: &Dataset,
    parameters: &[f64],
    model: &M,
    weight_square: &[f64],
) -> f64 {
    let predict = model.parameterize(parameters);
    let mut error = 0.0;
    for point in 0..data.point_count() {
        for series in 0..data.series_count() {
            let residual = data.y(series, point) - predict(data.x(series, point));
            error += residual * residual / weight_square[point];
        }
    }
    error
}
